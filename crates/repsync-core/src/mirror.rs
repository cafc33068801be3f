//! One synchronization run: open the session, update the manifest, fetch
//! every selected entry, close the session.

use chrono::NaiveDate;
use std::fmt;

use crate::config::RepsyncConfig;
use crate::error::SyncError;
use crate::fetch::{FileFetcher, TransferResult};
use crate::manifest::{ManifestSync, ManifestUpdate};
use crate::transfer::TransferClient;

/// How the run went at the manifest level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The server did not answer; nothing was attempted.
    Unreachable,
    Unchanged,
    Appended,
    Rebuilt,
}

impl RunOutcome {
    fn of(update: &ManifestUpdate) -> Self {
        match update {
            ManifestUpdate::Unchanged => RunOutcome::Unchanged,
            ManifestUpdate::Appended { .. } => RunOutcome::Appended,
            ManifestUpdate::Rebuilt { .. } => RunOutcome::Rebuilt,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RunOutcome::Unreachable => "unreachable",
            RunOutcome::Unchanged => "unchanged",
            RunOutcome::Appended => "appended",
            RunOutcome::Rebuilt => "rebuilt",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Counters for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Entries the manifest update selected for download.
    pub selected: usize,
    pub downloaded: usize,
    pub skipped_expired: usize,
    pub failed: usize,
    /// Bytes received across all file downloads.
    pub bytes: u64,
}

impl RunReport {
    fn new(outcome: RunOutcome, selected: usize) -> Self {
        Self {
            outcome,
            selected,
            downloaded: 0,
            skipped_expired: 0,
            failed: 0,
            bytes: 0,
        }
    }

    pub fn unreachable() -> Self {
        Self::new(RunOutcome::Unreachable, 0)
    }

    /// The success tally: downloads plus expired skips.
    pub fn transferred(&self) -> usize {
        self.downloaded + self.skipped_expired
    }

    fn record(&mut self, result: &TransferResult) {
        match result {
            TransferResult::Downloaded { bytes } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            TransferResult::SkippedExpired => self.skipped_expired += 1,
            TransferResult::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "manifest {}: {} selected, {} transferred ({} downloaded, {} expired), {} failed, {} bytes",
            self.outcome,
            self.selected,
            self.transferred(),
            self.downloaded,
            self.skipped_expired,
            self.failed,
            self.bytes
        )
    }
}

/// The synchronization run over one session.
#[derive(Debug, Clone)]
pub struct Mirror {
    manifest: ManifestSync,
    fetcher: FileFetcher,
}

impl Mirror {
    pub fn new(manifest: ManifestSync, fetcher: FileFetcher) -> Self {
        Self { manifest, fetcher }
    }

    pub fn from_config(cfg: &RepsyncConfig) -> Self {
        Self::new(ManifestSync::from_config(cfg), FileFetcher::from_config(cfg))
    }

    pub fn manifest(&self) -> &ManifestSync {
        &self.manifest
    }

    pub fn fetcher(&self) -> &FileFetcher {
        &self.fetcher
    }

    /// Run once. `today` anchors the date window for a manifest rebuild.
    ///
    /// Per-file failures are counted, not returned. An error means the run
    /// was aborted: the session was refused or the local manifest could not
    /// be brought up to date. The session is closed on every path.
    pub fn run(
        &self,
        client: &mut dyn TransferClient,
        today: NaiveDate,
    ) -> Result<RunReport, SyncError> {
        if let Err(e) = client.open() {
            client.close();
            if e.is_no_response() {
                tracing::warn!("server unreachable, skipping run: {}", e);
                return Ok(RunReport::unreachable());
            }
            return Err(SyncError::Session(e));
        }

        let result = self.run_open(client, today);
        client.close();

        let report = result?;
        tracing::info!(
            outcome = %report.outcome,
            selected = report.selected,
            transferred = report.transferred(),
            failed = report.failed,
            bytes = report.bytes,
            "run complete"
        );
        Ok(report)
    }

    fn run_open(
        &self,
        client: &mut dyn TransferClient,
        today: NaiveDate,
    ) -> Result<RunReport, SyncError> {
        let update = self.manifest.update(client, today)?;
        let outcome = RunOutcome::of(&update);
        let entries = update.into_entries();
        let mut report = RunReport::new(outcome, entries.len());

        for (i, entry) in entries.iter().enumerate() {
            tracing::debug!(code = entry.code(), "[{}/{}] {}", i + 1, entries.len(), entry);
            let result = self.fetcher.fetch(client, entry.path(), None, false);
            report.record(&result);
        }
        Ok(report)
    }
}
