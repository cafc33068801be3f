//! Retry and backoff policy.
//!
//! Classifies transfer failures (timeouts, dropped connections, transient
//! FTP replies) and decides exponential backoff, so the file fetcher and the
//! manifest download share one policy. Retention expiry is never retried.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_ftp_reply};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
