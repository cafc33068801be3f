//! Classify transfer errors into retry policy error kinds.

use super::policy::ErrorKind;
use crate::transfer::TransferError;

/// Classify an FTP reply code for retry decisions.
///
/// 4xx replies are transient by definition; 421 (service not available),
/// 425/426 (data connection trouble), 450/451/452 (busy, local error, no
/// space). 5xx replies are permanent.
pub fn classify_ftp_reply(code: u32) -> ErrorKind {
    match code {
        421 | 425 | 426 | 450 | 451 | 452 => ErrorKind::Transient(code),
        _ => ErrorKind::Other,
    }
}

/// Classify a transfer error into an ErrorKind.
pub fn classify(e: &TransferError) -> ErrorKind {
    match e {
        TransferError::NoResponse(ce) if ce.is_operation_timedout() => ErrorKind::Timeout,
        TransferError::NoResponse(_) => ErrorKind::Connection,
        TransferError::Reply { code, .. } => classify_ftp_reply(*code),
        TransferError::Curl(ce) if ce.is_operation_timedout() => ErrorKind::Timeout,
        TransferError::Curl(ce)
            if ce.is_read_error() || ce.is_recv_error() || ce.is_send_error() || ce.is_partial_file() =>
        {
            ErrorKind::Connection
        }
        TransferError::Expired { .. }
        | TransferError::Curl(_)
        | TransferError::Sink(_)
        | TransferError::NotOpen => ErrorKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_replies() {
        assert_eq!(classify_ftp_reply(421), ErrorKind::Transient(421));
        assert_eq!(classify_ftp_reply(426), ErrorKind::Transient(426));
        assert_eq!(classify_ftp_reply(451), ErrorKind::Transient(451));
    }

    #[test]
    fn permanent_replies() {
        assert_eq!(classify_ftp_reply(530), ErrorKind::Other);
        assert_eq!(classify_ftp_reply(550), ErrorKind::Other);
        assert_eq!(classify_ftp_reply(554), ErrorKind::Other);
    }

    #[test]
    fn expired_is_never_retried() {
        let e = TransferError::Expired {
            path: "/EQ/20240101/a.zip".to_string(),
        };
        assert_eq!(classify(&e), ErrorKind::Other);
    }

    #[test]
    fn silent_server_is_connection_or_timeout() {
        // CURLE_COULDNT_CONNECT, CURLE_OPERATION_TIMEDOUT
        assert_eq!(
            classify(&TransferError::NoResponse(curl::Error::new(7))),
            ErrorKind::Connection
        );
        assert_eq!(
            classify(&TransferError::NoResponse(curl::Error::new(28))),
            ErrorKind::Timeout
        );
    }
}
