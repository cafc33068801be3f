//! Errors that abort a synchronization run.
//!
//! Only failures that would leave persisted state unusable end a run: the
//! session cannot be established, or the local manifest (the durable
//! bookmark of what has been fetched) cannot be brought up to date. Per-file
//! failures are outcomes, not errors; see `fetch::TransferResult`.

use std::path::PathBuf;
use thiserror::Error;

use crate::transfer::TransferError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The server answered but refused the session (login, TLS).
    #[error("cannot open session")]
    Session(#[source] TransferError),

    /// Downloading the manifest failed; the local copy is unchanged.
    #[error("cannot download manifest {path}")]
    ManifestTransfer {
        path: String,
        #[source]
        source: TransferError,
    },

    /// Writing the local manifest failed; the local copy is unchanged.
    #[error("cannot write local manifest {}", path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
