pub mod compare;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod mirror;
pub mod paths;
pub mod retry;
pub mod storage;
pub mod transfer;

pub use config::RepsyncConfig;
pub use error::SyncError;
pub use fetch::{FileFetcher, TransferResult};
pub use mirror::{Mirror, RunOutcome, RunReport};
