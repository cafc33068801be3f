//! `repsync sync` – one synchronization run.

use anyhow::Result;
use chrono::Local;
use repsync_core::config::RepsyncConfig;
use repsync_core::{Mirror, RunOutcome};

use super::{ftps_client, prepare_dirs};

pub fn run_sync(cfg: &RepsyncConfig, lookback_days: Option<u32>) -> Result<()> {
    let mut cfg = cfg.clone();
    if let Some(days) = lookback_days {
        cfg.mirror.lookback_days = days;
    }
    prepare_dirs(&cfg)?;

    let mut client = ftps_client(&cfg)?;
    let mirror = Mirror::from_config(&cfg);
    let report = mirror.run(&mut client, Local::now().date_naive())?;

    if report.outcome == RunOutcome::Unreachable {
        println!("server unreachable; run skipped");
    } else {
        println!("{}", report);
    }
    Ok(())
}
