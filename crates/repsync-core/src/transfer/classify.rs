//! Map libcurl failures and FTP reply codes onto `TransferError`.

use super::error::TransferError;

/// "Requested action not taken; file unavailable": the archive answers this
/// for objects purged by its retention policy.
pub const FTP_FILE_UNAVAILABLE: u32 = 550;

/// True when the curl error means the server never answered.
pub fn is_silent_failure(e: &curl::Error) -> bool {
    e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_operation_timedout()
        || e.is_got_nothing()
        || e.is_recv_error()
        || e.is_send_error()
}

/// Classify a failed `perform` given the last reply code the server sent
/// (0 when nothing was received).
pub fn classify_failure(path: &str, err: curl::Error, reply_code: u32) -> TransferError {
    if reply_code == FTP_FILE_UNAVAILABLE || err.code() == curl_sys::CURLE_REMOTE_FILE_NOT_FOUND {
        return TransferError::Expired {
            path: path.to_string(),
        };
    }
    if reply_code == 0 || is_silent_failure(&err) {
        return TransferError::NoResponse(err);
    }
    if reply_code >= 400 {
        return TransferError::Reply {
            path: path.to_string(),
            code: reply_code,
        };
    }
    TransferError::Curl(err)
}

/// Classify a `perform` that succeeded but whose final reply is not a success.
pub fn classify_reply(path: &str, reply_code: u32) -> Option<TransferError> {
    match reply_code {
        FTP_FILE_UNAVAILABLE => Some(TransferError::Expired {
            path: path.to_string(),
        }),
        400..=599 => Some(TransferError::Reply {
            path: path.to_string(),
            code: reply_code,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::FailureReason;

    // Raw CURLcode values.
    const COULDNT_CONNECT: u32 = 7;
    const FTP_COULDNT_RETR_FILE: u32 = 19;
    const OPERATION_TIMEDOUT: u32 = 28;
    const LOGIN_DENIED: u32 = 67;
    const REMOTE_FILE_NOT_FOUND: u32 = 78;

    fn err(code: u32) -> curl::Error {
        curl::Error::new(code as _)
    }

    #[test]
    fn reply_550_is_expired() {
        let e = classify_failure("/EQ/20240301/a.zip", err(FTP_COULDNT_RETR_FILE), 550);
        assert_eq!(e.reason(), FailureReason::Expired);
    }

    #[test]
    fn remote_file_not_found_is_expired_without_reply() {
        let e = classify_failure("/a", err(REMOTE_FILE_NOT_FOUND), 0);
        assert_eq!(e.reason(), FailureReason::Expired);
    }

    #[test]
    fn connect_failure_is_no_response() {
        let e = classify_failure("/a", err(COULDNT_CONNECT), 0);
        assert_eq!(e.reason(), FailureReason::NoResponse);
        let e = classify_failure("/a", err(OPERATION_TIMEDOUT), 150);
        assert_eq!(e.reason(), FailureReason::NoResponse);
    }

    #[test]
    fn login_denied_keeps_reply_code() {
        match classify_failure("/a", err(LOGIN_DENIED), 530) {
            TransferError::Reply { code, .. } => assert_eq!(code, 530),
            other => panic!("expected Reply, got {:?}", other),
        }
    }

    #[test]
    fn successful_replies_are_not_errors() {
        assert!(classify_reply("/a", 226).is_none());
        assert!(classify_reply("/a", 213).is_none());
        assert!(classify_reply("/a", 550).unwrap().is_expired());
        assert!(matches!(
            classify_reply("/a", 451),
            Some(TransferError::Reply { code: 451, .. })
        ));
    }
}
