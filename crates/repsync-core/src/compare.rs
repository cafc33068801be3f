//! Size comparison between a remote object and its local copy.
//!
//! Uses a metadata-only request (FTP SIZE), never the data channel. Probe
//! failures are folded into the result instead of being returned: an expired
//! object or a silent server means "nothing to do this run", anything else
//! means "rebuild from scratch".

use std::path::Path;

use crate::transfer::{FailureReason, TransferClient};

/// Three-way result of comparing remote and local sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeComparison {
    /// Sizes are equal, or the probe was inconclusive in a benign way.
    Unchanged,
    /// Remote is strictly larger and the local file exists: append-only
    /// growth, resuming at the local length is safe.
    RemoteLarger,
    /// Local file missing, local larger than remote, or the probe failed
    /// with an answer from the server. Callers rebuild from scratch.
    RemoteSmallerOrMissingLocal,
}

impl SizeComparison {
    /// Compare known sizes. `local` is `None` when there is no local file.
    pub fn from_sizes(remote: u64, local: Option<u64>) -> Self {
        match local {
            None => SizeComparison::RemoteSmallerOrMissingLocal,
            Some(l) if remote == l => SizeComparison::Unchanged,
            Some(l) if remote > l => SizeComparison::RemoteLarger,
            Some(_) => SizeComparison::RemoteSmallerOrMissingLocal,
        }
    }

    /// 0 = unchanged, 1 = remote larger, -1 = rebuild.
    pub fn signum(self) -> i8 {
        match self {
            SizeComparison::Unchanged => 0,
            SizeComparison::RemoteLarger => 1,
            SizeComparison::RemoteSmallerOrMissingLocal => -1,
        }
    }
}

/// Local file length, or `None` if there is no regular file at `path`.
pub fn local_size(path: &Path) -> Option<u64> {
    match std::fs::metadata(path) {
        Ok(m) if m.is_file() => Some(m.len()),
        _ => None,
    }
}

/// Probe `remote_path` and compare with the file at `local_path`.
pub fn compare_sizes(
    client: &mut dyn TransferClient,
    remote_path: &str,
    local_path: &Path,
) -> SizeComparison {
    let remote = match client.remote_size(remote_path) {
        Ok(n) => n,
        Err(e) => {
            return match e.reason() {
                FailureReason::NoResponse => {
                    tracing::warn!(path = remote_path, "no response to size probe, skipping: {}", e);
                    SizeComparison::Unchanged
                }
                FailureReason::Expired => {
                    tracing::info!(path = remote_path, "{}", e);
                    SizeComparison::Unchanged
                }
                FailureReason::Other => {
                    tracing::warn!(path = remote_path, "size probe failed: {}", e);
                    SizeComparison::RemoteSmallerOrMissingLocal
                }
            };
        }
    };

    let local = local_size(local_path);
    let result = SizeComparison::from_sizes(remote, local);
    tracing::debug!(
        path = remote_path,
        remote,
        local = ?local,
        result = result.signum(),
        "size comparison"
    );
    result
}
