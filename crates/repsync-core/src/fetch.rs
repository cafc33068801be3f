//! File fetcher: download one remote file, resuming a partial local copy
//! when asked to, and classify the outcome.
//!
//! Bytes are streamed to disk as they arrive. A full download goes to a
//! `.part` file that replaces the local copy only once complete. The
//! destination handle is owned by a single `fetch` call and closed on every
//! exit path.

use std::path::{Path, PathBuf};

use crate::config::RepsyncConfig;
use crate::paths;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::storage::{self, Destination};
use crate::transfer::{FailureReason, TransferClient, TransferError};

/// Per-file outcome of a fetch.
#[derive(Debug)]
pub enum TransferResult {
    /// The file was written; `bytes` were received by this call.
    Downloaded { bytes: u64 },
    /// The server no longer has the file (retention). Counted as success.
    SkippedExpired,
    /// Any other failure. The run continues with the next file.
    Failed(TransferError),
}

impl TransferResult {
    /// Whether this outcome counts toward the success tally.
    pub fn is_success(&self) -> bool {
        !matches!(self, TransferResult::Failed(_))
    }

    pub fn bytes(&self) -> u64 {
        match self {
            TransferResult::Downloaded { bytes } => *bytes,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileFetcher {
    download_dir: PathBuf,
    retry: RetryPolicy,
}

impl FileFetcher {
    pub fn new(download_dir: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            download_dir: download_dir.into(),
            retry,
        }
    }

    pub fn from_config(cfg: &RepsyncConfig) -> Self {
        Self::new(cfg.mirror.download_dir.clone(), cfg.retry_policy())
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Where `remote_path` lands when no explicit local path is given.
    pub fn default_local_path(&self, remote_path: &str) -> PathBuf {
        paths::default_local_path(&self.download_dir, remote_path)
    }

    /// Download `remote_path` to `local_path` (default: its basename under the
    /// download directory).
    ///
    /// With `resume` and an existing destination, only the bytes past the
    /// local length are requested and appended. Otherwise the whole file is
    /// requested into a temp file, and an existing local copy is replaced
    /// only on success. A retried attempt always continues from the bytes
    /// already on disk.
    pub fn fetch(
        &self,
        client: &mut dyn TransferClient,
        remote_path: &str,
        local_path: Option<&Path>,
        resume: bool,
    ) -> TransferResult {
        let local_path = match local_path {
            Some(p) => p.to_path_buf(),
            None => self.default_local_path(remote_path),
        };

        let result = match storage::open_destination(&local_path, resume) {
            Ok(dest) => self.transfer(client, remote_path, dest),
            Err(e) => Err(TransferError::Sink(e)),
        };

        match result {
            Ok(bytes) => {
                tracing::info!(path = %remote_path, bytes, "downloaded {}", local_path.display());
                TransferResult::Downloaded { bytes }
            }
            Err(e) => match e.reason() {
                FailureReason::Expired => {
                    tracing::info!(path = %remote_path, "skipped: expired on server");
                    TransferResult::SkippedExpired
                }
                FailureReason::NoResponse | FailureReason::Other => {
                    tracing::warn!(path = %remote_path, "download failed: {}", e);
                    TransferResult::Failed(e)
                }
            },
        }
    }

    /// Run the transfer into `dest`. Returns the bytes appended by this call.
    fn transfer(
        &self,
        client: &mut dyn TransferClient,
        remote_path: &str,
        mut dest: Destination,
    ) -> Result<u64, TransferError> {
        let start = dest.start();
        if start > 0 {
            tracing::debug!(path = %remote_path, offset = start, "resuming partial file");
        }

        let outcome = run_with_retry(&self.retry, |attempt| {
            let offset = if attempt == 1 {
                start
            } else {
                dest.len().map_err(TransferError::Sink)?
            };
            client.read_from(remote_path, offset, &mut dest)
        });

        match outcome {
            Ok(_) => {
                let end = dest.len().map_err(TransferError::Sink)?;
                dest.finish().map_err(TransferError::Sink)?;
                Ok(end.saturating_sub(start))
            }
            Err(e) => {
                if let Err(io) = dest.abandon() {
                    tracing::debug!("cannot clean up destination: {}", io);
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::MemoryClient;
    use std::time::Duration;

    const REPORT: &str = "/EQ/20240314/EQ_daily_20240314.zip";

    fn fetcher(dir: &Path) -> FileFetcher {
        FileFetcher::new(
            dir,
            RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::ZERO,
                max_delay: Duration::ZERO,
            },
        )
    }

    fn client_with(path: &str, body: &[u8]) -> MemoryClient {
        let mut client = MemoryClient::new().with_file(path, body);
        client.open().unwrap();
        client
    }

    #[test]
    fn default_destination_is_basename_under_download_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = client_with(REPORT, b"report");
        let result = fetcher(dir.path()).fetch(&mut client, REPORT, None, false);
        assert!(matches!(result, TransferResult::Downloaded { bytes: 6 }));
        let local = dir.path().join("EQ_daily_20240314.zip");
        assert_eq!(std::fs::read(local).unwrap(), b"report");
    }

    #[test]
    fn fresh_fetch_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.zip");
        std::fs::write(&local, b"stale stale stale").unwrap();
        let mut client = client_with(REPORT, b"new");
        let result = fetcher(dir.path()).fetch(&mut client, REPORT, Some(&local), false);
        assert!(result.is_success());
        assert_eq!(std::fs::read(&local).unwrap(), b"new");
        assert_eq!(client.reads(), vec![(REPORT.to_string(), 0)]);
        assert!(!storage::temp_path(&local).exists());
    }

    #[test]
    fn failed_fetch_leaves_existing_copy_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.zip");
        std::fs::write(&local, b"good copy").unwrap();
        let mut client = client_with(REPORT, b"replacement");
        client.fail(REPORT, 530);

        let result = fetcher(dir.path()).fetch(&mut client, REPORT, Some(&local), false);

        assert!(!result.is_success());
        assert_eq!(std::fs::read(&local).unwrap(), b"good copy");
        assert!(!storage::temp_path(&local).exists());
    }

    #[test]
    fn expired_fetch_leaves_existing_copy_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.zip");
        std::fs::write(&local, b"good copy").unwrap();
        let mut client = client_with(REPORT, b"replacement");
        client.expire(REPORT);

        let result = fetcher(dir.path()).fetch(&mut client, REPORT, Some(&local), false);

        assert!(matches!(result, TransferResult::SkippedExpired));
        assert_eq!(std::fs::read(&local).unwrap(), b"good copy");
        assert!(!storage::temp_path(&local).exists());
    }

    #[test]
    fn interrupted_fetch_keeps_existing_copy_until_complete() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.zip");
        std::fs::write(&local, b"good copy").unwrap();
        let mut client = client_with(REPORT, b"0123456789");
        client.interrupt_once(REPORT, 4, 530);

        let result = fetcher(dir.path()).fetch(&mut client, REPORT, Some(&local), false);

        assert!(!result.is_success());
        assert_eq!(std::fs::read(&local).unwrap(), b"good copy");
        assert!(!storage::temp_path(&local).exists());
    }

    #[test]
    fn resume_requests_only_the_missing_tail() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.zip");
        let remote: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&local, &remote[..3_000]).unwrap();

        let mut client = client_with(REPORT, &remote);
        let result = fetcher(dir.path()).fetch(&mut client, REPORT, Some(&local), true);

        assert_eq!(result.bytes(), 7_000);
        assert_eq!(std::fs::read(&local).unwrap(), remote);
        assert_eq!(client.reads(), vec![(REPORT.to_string(), 3_000)]);
    }

    #[test]
    fn resume_without_local_copy_downloads_everything() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = client_with(REPORT, b"whole");
        let result = fetcher(dir.path()).fetch(&mut client, REPORT, None, true);
        assert_eq!(result.bytes(), 5);
        assert_eq!(client.reads(), vec![(REPORT.to_string(), 0)]);
    }

    #[test]
    fn expired_is_a_successful_skip() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = client_with(REPORT, b"x");
        client.expire(REPORT);
        let result = fetcher(dir.path()).fetch(&mut client, REPORT, None, false);
        assert!(matches!(result, TransferResult::SkippedExpired));
        assert!(result.is_success());
        assert!(!dir.path().join("EQ_daily_20240314.zip").exists());
    }

    #[test]
    fn permanent_failure_is_reported_and_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = client_with(REPORT, b"x");
        client.fail(REPORT, 530);
        let result = fetcher(dir.path()).fetch(&mut client, REPORT, None, false);
        match &result {
            TransferResult::Failed(TransferError::Reply { code, .. }) => assert_eq!(*code, 530),
            other => panic!("expected Failed, got {:?}", other),
        }
        assert!(!result.is_success());
        assert_eq!(client.reads().len(), 1);
        assert!(!dir.path().join("EQ_daily_20240314.zip").exists());
    }

    #[test]
    fn failed_resume_keeps_partial_copy() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.zip");
        std::fs::write(&local, b"0123").unwrap();
        let mut client = client_with(REPORT, b"0123456789");
        client.fail(REPORT, 530);
        let result = fetcher(dir.path()).fetch(&mut client, REPORT, Some(&local), true);
        assert!(!result.is_success());
        assert_eq!(std::fs::read(&local).unwrap(), b"0123");
    }

    #[test]
    fn interrupted_transfer_retries_from_bytes_written() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.zip");
        let mut client = client_with(REPORT, b"0123456789");
        client.interrupt_once(REPORT, 4, 426);

        let result = fetcher(dir.path()).fetch(&mut client, REPORT, Some(&local), false);

        assert_eq!(result.bytes(), 10);
        assert_eq!(std::fs::read(&local).unwrap(), b"0123456789");
        assert_eq!(
            client.reads(),
            vec![(REPORT.to_string(), 0), (REPORT.to_string(), 4)]
        );
    }

    #[test]
    fn unwritable_destination_fails_without_transfer() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("missing-dir").join("a.zip");
        let mut client = client_with(REPORT, b"x");
        let result = fetcher(dir.path()).fetch(&mut client, REPORT, Some(&local), false);
        assert!(matches!(result, TransferResult::Failed(TransferError::Sink(_))));
        assert!(client.reads().is_empty());
    }
}
