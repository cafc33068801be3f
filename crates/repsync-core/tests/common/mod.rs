//! Shared fixtures: an in-memory report archive and a mirror rooted in a temp dir.

#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use std::path::{Path, PathBuf};
use std::time::Duration;

use repsync_core::fetch::FileFetcher;
use repsync_core::manifest::{DateWindow, ManifestSync};
use repsync_core::retry::RetryPolicy;
use repsync_core::transfer::MemoryClient;
use repsync_core::Mirror;

pub const MANIFEST: &str = "/UpdateHistory.txt";

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    }
}

pub fn local_manifest(root: &Path) -> PathBuf {
    root.join("UpdateHistory.txt")
}

/// A mirror rooted at `root` with a 14-day window.
pub fn mirror(root: &Path) -> Mirror {
    Mirror::new(
        ManifestSync::new(MANIFEST, local_manifest(root), DateWindow::new(14), fast_retry()),
        FileFetcher::new(root, fast_retry()),
    )
}

/// `/<code>/<YYYYMMDD>/<code>_<n>.zip`
pub fn report(code: &str, date: NaiveDate, n: usize) -> String {
    format!("/{}/{}/{}_{}.zip", code, date.format("%Y%m%d"), code, n)
}

/// `count` reports, four per day, starting at `first_day`.
pub fn reports(first_day: NaiveDate, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let day = first_day
                .checked_add_days(Days::new((i / 4) as u64))
                .unwrap();
            report("EQ", day, i)
        })
        .collect()
}

pub fn manifest_text(lines: &[String]) -> String {
    lines.iter().map(|l| format!("{}\n", l)).collect()
}

/// Body served for a report path.
pub fn body_of(path: &str) -> Vec<u8> {
    format!("contents of {}", path).into_bytes()
}

/// An open client serving `lines` as the manifest, with a body for every line.
pub fn archive(lines: &[String]) -> MemoryClient {
    let mut client = MemoryClient::new().with_file(MANIFEST, manifest_text(lines));
    for line in lines {
        client.put(line, body_of(line));
    }
    client
}

pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
