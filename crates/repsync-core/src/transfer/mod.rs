//! Transfer client abstraction.
//!
//! The sync engine never speaks FTP itself; it orchestrates a `TransferClient`
//! and interprets its typed failures. `FtpsClient` is the libcurl-backed
//! implementation used in production, `MemoryClient` serves an in-memory
//! archive for tests and dry runs.
//!
//! A client holds one session. Calls are serial: `open`, then any number of
//! `remote_size` / `read_from`, then `close`.

mod classify;
mod error;
mod ftps;
mod memory;

pub use classify::{classify_failure, classify_reply, is_silent_failure, FTP_FILE_UNAVAILABLE};
pub use error::{FailureReason, TransferError};
pub use ftps::{remote_url, FtpsClient};
pub use memory::{MemoryClient, Request};

use std::io::Write;

/// Session-oriented access to the remote archive.
pub trait TransferClient {
    /// Open the session (connect, negotiate TLS, log in).
    fn open(&mut self) -> Result<(), TransferError>;

    /// Size in bytes of `remote_path`, using a metadata-only request.
    fn remote_size(&mut self, remote_path: &str) -> Result<u64, TransferError>;

    /// Stream `remote_path` starting at byte `offset` into `sink`.
    /// Returns the number of bytes delivered to the sink.
    fn read_from(
        &mut self,
        remote_path: &str,
        offset: u64,
        sink: &mut dyn Write,
    ) -> Result<u64, TransferError>;

    /// Close the session. Safe to call more than once.
    fn close(&mut self);
}

