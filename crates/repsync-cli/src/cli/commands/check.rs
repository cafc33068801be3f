//! `repsync check` – connectivity and manifest diagnostics. Downloads nothing.

use anyhow::{Context, Result};
use repsync_core::compare::{compare_sizes, local_size, SizeComparison};
use repsync_core::config::RepsyncConfig;
use repsync_core::transfer::TransferClient;

use super::ftps_client;

pub fn run_check(cfg: &RepsyncConfig) -> Result<()> {
    let mut client = ftps_client(cfg)?;
    println!("server:          {}", client.base_url());

    client
        .open()
        .with_context(|| format!("cannot log in as {}", cfg.server.username))?;
    println!("session:         ok");

    let remote_path = &cfg.server.remote_manifest;
    match client.remote_size(remote_path) {
        Ok(n) => println!("remote manifest: {} ({} bytes)", remote_path, n),
        Err(e) => println!("remote manifest: {} ({})", remote_path, e),
    }

    let local_path = cfg.manifest_path();
    match local_size(&local_path) {
        Some(n) => println!("local manifest:  {} ({} bytes)", local_path.display(), n),
        None => println!("local manifest:  {} (missing)", local_path.display()),
    }

    let next = match compare_sizes(&mut client, remote_path, &local_path) {
        SizeComparison::Unchanged => "nothing to do",
        SizeComparison::RemoteLarger => "append new entries",
        SizeComparison::RemoteSmallerOrMissingLocal => "rebuild manifest and replay date window",
    };
    println!("next sync:       {}", next);

    client.close();
    Ok(())
}
