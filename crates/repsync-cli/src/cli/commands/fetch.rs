//! `repsync fetch` – download a single remote file.

use anyhow::Result;
use repsync_core::config::RepsyncConfig;
use repsync_core::fetch::{FileFetcher, TransferResult};
use repsync_core::transfer::TransferClient;
use std::path::Path;

use super::{ftps_client, prepare_dirs};

pub fn run_fetch(
    cfg: &RepsyncConfig,
    remote: &str,
    output: Option<&Path>,
    resume: bool,
) -> Result<()> {
    prepare_dirs(cfg)?;
    let mut client = ftps_client(cfg)?;
    client.open()?;

    let fetcher = FileFetcher::from_config(cfg);
    let result = fetcher.fetch(&mut client, remote, output, resume);
    client.close();

    match result {
        TransferResult::Downloaded { bytes } => {
            println!("downloaded {} ({} bytes)", remote, bytes);
            Ok(())
        }
        TransferResult::SkippedExpired => {
            println!("{} is no longer available on the server", remote);
            Ok(())
        }
        TransferResult::Failed(e) => Err(anyhow::Error::new(e).context(format!("cannot fetch {}", remote))),
    }
}
