//! Manifest synchronizer: bring the local manifest up to date and decide
//! which remote paths to download.

use chrono::NaiveDate;
use std::path::{Path, PathBuf};

use super::{appended_lines, parse_entries, split_lines, DateWindow, ManifestEntry};
use crate::compare::{compare_sizes, SizeComparison};
use crate::config::RepsyncConfig;
use crate::error::SyncError;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::storage;
use crate::transfer::TransferClient;

/// What a manifest update did, and the entries it selected for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestUpdate {
    /// Sizes match, or the server could not be asked: nothing to download.
    Unchanged,
    /// The remote manifest grew. Only the bytes after `from_offset` were
    /// transferred; `entries` are exactly the newly appended lines.
    Appended {
        from_offset: u64,
        added_bytes: u64,
        entries: Vec<ManifestEntry>,
    },
    /// The local copy was missing or the remote shrank. The local manifest
    /// was rewritten in full and `entries` come from the date window.
    Rebuilt {
        total_entries: usize,
        cutoff: String,
        entries: Vec<ManifestEntry>,
    },
}

impl ManifestUpdate {
    pub fn entries(&self) -> &[ManifestEntry] {
        match self {
            ManifestUpdate::Unchanged => &[],
            ManifestUpdate::Appended { entries, .. } | ManifestUpdate::Rebuilt { entries, .. } => {
                entries
            }
        }
    }

    pub fn into_entries(self) -> Vec<ManifestEntry> {
        match self {
            ManifestUpdate::Unchanged => Vec::new(),
            ManifestUpdate::Appended { entries, .. } | ManifestUpdate::Rebuilt { entries, .. } => {
                entries
            }
        }
    }

    /// Short name of the branch taken, for logs and reports.
    pub fn label(&self) -> &'static str {
        match self {
            ManifestUpdate::Unchanged => "unchanged",
            ManifestUpdate::Appended { .. } => "appended",
            ManifestUpdate::Rebuilt { .. } => "rebuilt",
        }
    }
}

/// Owns the lifecycle of the local manifest copy.
#[derive(Debug, Clone)]
pub struct ManifestSync {
    remote_path: String,
    local_path: PathBuf,
    window: DateWindow,
    retry: RetryPolicy,
}

impl ManifestSync {
    pub fn new(
        remote_path: impl Into<String>,
        local_path: impl Into<PathBuf>,
        window: DateWindow,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            remote_path: remote_path.into(),
            local_path: local_path.into(),
            window,
            retry,
        }
    }

    pub fn from_config(cfg: &RepsyncConfig) -> Self {
        Self::new(
            cfg.server.remote_manifest.clone(),
            cfg.manifest_path(),
            DateWindow::new(cfg.mirror.lookback_days),
            cfg.retry_policy(),
        )
    }

    pub fn remote_path(&self) -> &str {
        &self.remote_path
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    /// Compare sizes and take the matching branch. `today` anchors the date
    /// window used when the manifest has to be rebuilt.
    pub fn update(
        &self,
        client: &mut dyn TransferClient,
        today: NaiveDate,
    ) -> Result<ManifestUpdate, SyncError> {
        match compare_sizes(client, &self.remote_path, &self.local_path) {
            SizeComparison::Unchanged => {
                tracing::debug!(path = %self.local_path.display(), "manifest unchanged");
                Ok(ManifestUpdate::Unchanged)
            }
            SizeComparison::RemoteLarger => self.append(client),
            SizeComparison::RemoteSmallerOrMissingLocal => self.rebuild(client, today),
        }
    }

    fn write_error(&self, source: std::io::Error) -> SyncError {
        SyncError::ManifestWrite {
            path: self.local_path.clone(),
            source,
        }
    }

    /// Download `remote_path` from `offset` into memory, retrying transient failures.
    fn stage(&self, client: &mut dyn TransferClient, offset: u64) -> Result<Vec<u8>, SyncError> {
        let mut staged = Vec::new();
        run_with_retry(&self.retry, |_| {
            staged.clear();
            client.read_from(&self.remote_path, offset, &mut staged)
        })
        .map_err(|source| SyncError::ManifestTransfer {
            path: self.remote_path.clone(),
            source,
        })?;
        Ok(staged)
    }

    fn append(&self, client: &mut dyn TransferClient) -> Result<ManifestUpdate, SyncError> {
        let from_offset = std::fs::metadata(&self.local_path)
            .map_err(|e| self.write_error(e))?
            .len();
        let tail = storage::trailing_partial_line(&self.local_path, from_offset)
            .map_err(|e| self.write_error(e))?;

        let staged = self.stage(client, from_offset)?;
        if !staged.is_empty() {
            storage::append_or_rollback(&self.local_path, from_offset, &staged)
                .map_err(|e| self.write_error(e))?;
        }

        let entries = parse_entries(appended_lines(&tail, &staged));
        tracing::info!(
            from_offset,
            added_bytes = staged.len() as u64,
            "manifest updated: {} new entries",
            entries.len()
        );
        Ok(ManifestUpdate::Appended {
            from_offset,
            added_bytes: staged.len() as u64,
            entries,
        })
    }

    fn rebuild(
        &self,
        client: &mut dyn TransferClient,
        today: NaiveDate,
    ) -> Result<ManifestUpdate, SyncError> {
        let staged = self.stage(client, 0)?;
        storage::replace_atomically(&self.local_path, &staged).map_err(|e| self.write_error(e))?;

        let all = parse_entries(split_lines(&staged));
        let cutoff = self.window.cutoff(today);
        let entries = self.window.select(&all, today);
        tracing::info!(
            lookback_days = self.window.lookback_days(),
            cutoff = %cutoff,
            "manifest rebuilt ({} entries); replaying {} entries after the cutoff",
            all.len(),
            entries.len()
        );
        Ok(ManifestUpdate::Rebuilt {
            total_entries: all.len(),
            cutoff,
            entries,
        })
    }
}
