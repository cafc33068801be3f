//! Transfer error type and its failure reason.

use thiserror::Error;

/// Coarse outcome class of a failed transfer-client call.
///
/// Callers branch on this rather than on protocol details: an expired object
/// is expected steady-state behavior, no response means the run should be
/// skipped, anything else is a genuine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The server reports the object as unavailable (purged by retention policy).
    Expired,
    /// No reply was received at all (connect, resolve, timeout, empty reply).
    NoResponse,
    /// Any other failure.
    Other,
}

/// Error returned by a single transfer-client call.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Server answered "file unavailable" (FTP 550) for this path.
    #[error("{path}: file unavailable on server (removed by retention policy)")]
    Expired { path: String },

    /// The server never answered.
    #[error("no response from server: {0}")]
    NoResponse(curl::Error),

    /// The server answered with a non-success reply code.
    #[error("{path}: server replied {code}")]
    Reply { path: String, code: u32 },

    /// libcurl reported an error after the server had replied (TLS, login, protocol).
    #[error(transparent)]
    Curl(#[from] curl::Error),

    /// Writing received bytes to the local sink failed.
    #[error("local write failed: {0}")]
    Sink(std::io::Error),

    /// A request was issued before `open` or after `close`.
    #[error("session is not open")]
    NotOpen,
}

impl TransferError {
    pub fn reason(&self) -> FailureReason {
        match self {
            TransferError::Expired { .. } => FailureReason::Expired,
            TransferError::NoResponse(_) => FailureReason::NoResponse,
            TransferError::Reply { .. }
            | TransferError::Curl(_)
            | TransferError::Sink(_)
            | TransferError::NotOpen => FailureReason::Other,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.reason() == FailureReason::Expired
    }

    pub fn is_no_response(&self) -> bool {
        self.reason() == FailureReason::NoResponse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons() {
        let expired = TransferError::Expired {
            path: "/EQ/20240301/a.zip".to_string(),
        };
        assert_eq!(expired.reason(), FailureReason::Expired);
        assert!(expired.is_expired());

        // CURLE_COULDNT_CONNECT
        let silent = TransferError::NoResponse(curl::Error::new(7));
        assert_eq!(silent.reason(), FailureReason::NoResponse);
        assert!(silent.is_no_response());

        let reply = TransferError::Reply {
            path: "/x".to_string(),
            code: 530,
        };
        assert_eq!(reply.reason(), FailureReason::Other);
        assert_eq!(TransferError::NotOpen.reason(), FailureReason::Other);
    }

    #[test]
    fn display_names_path_and_code() {
        let reply = TransferError::Reply {
            path: "/UpdateHistory.txt".to_string(),
            code: 451,
        };
        assert_eq!(reply.to_string(), "/UpdateHistory.txt: server replied 451");
    }
}
