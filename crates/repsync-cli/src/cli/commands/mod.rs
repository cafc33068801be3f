//! CLI command handlers. Each command is in its own file.

mod check;
mod fetch;
mod sync;

pub use check::run_check;
pub use fetch::run_fetch;
pub use sync::run_sync;

use anyhow::{Context, Result};
use repsync_core::config::RepsyncConfig;
use repsync_core::transfer::FtpsClient;
use std::fs;

/// Create the download directory and the local manifest's parent.
pub(crate) fn prepare_dirs(cfg: &RepsyncConfig) -> Result<()> {
    let download_dir = &cfg.mirror.download_dir;
    fs::create_dir_all(download_dir)
        .with_context(|| format!("cannot create download dir {}", download_dir.display()))?;
    let manifest = cfg.manifest_path();
    if let Some(parent) = manifest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create manifest dir {}", parent.display()))?;
    }
    Ok(())
}

pub(crate) fn ftps_client(cfg: &RepsyncConfig) -> Result<FtpsClient> {
    let client = FtpsClient::new(&cfg.server, cfg.proxy.as_ref())?;
    tracing::debug!("server {}", client.base_url());
    Ok(client)
}
