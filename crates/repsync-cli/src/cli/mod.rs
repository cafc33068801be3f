//! CLI for repsync, the FTPS report archive mirror.

mod commands;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use repsync_core::config::{self, RepsyncConfig};
use repsync_core::logging;
use std::path::PathBuf;

use commands::{run_check, run_fetch, run_sync};

/// Configuration missing or invalid; nothing was attempted.
pub const EXIT_CONFIG: i32 = 1;
/// The run started but was aborted.
pub const EXIT_ABORTED: i32 = 3;

/// Top-level CLI for repsync.
#[derive(Debug, Parser)]
#[command(name = "repsync")]
#[command(about = "repsync: incremental mirror of an FTPS report archive", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/repsync/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug-level logging for repsync itself.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Bring the local mirror up to date (one run).
    Sync {
        /// Days of history to replay when the manifest has to be rebuilt.
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
        lookback_days: Option<u32>,
    },

    /// Log in, probe the remote manifest and show what the next sync would do.
    Check,

    /// Download a single remote file.
    Fetch {
        /// Remote path, e.g. /EQ/20240314/EQ_daily.zip
        remote: String,

        /// Local destination (default: basename under the download directory).
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Continue a partial local copy instead of starting over.
        #[arg(long)]
        resume: bool,
    },
}

impl Cli {
    fn load_config(&self) -> Result<RepsyncConfig> {
        match &self.config {
            Some(path) => Ok(config::load_from(path)?),
            None => config::load_or_init(),
        }
    }
}

impl CliCommand {
    /// Returns the process exit code.
    pub fn run_from_args() -> i32 {
        let cli = Cli::parse();

        let cfg = match cli.load_config() {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("repsync error: {:#}", err);
                return EXIT_CONFIG;
            }
        };

        if let Err(err) = logging::init_logging(&cfg, cli.verbose, Local::now().naive_local()) {
            logging::init_logging_stderr(cli.verbose || cfg.verbose);
            tracing::warn!("file logging unavailable, logging to stderr: {:#}", err);
        }
        tracing::debug!("loaded config from {:?}", cli.config);

        match cli.command.dispatch(&cfg) {
            Ok(()) => 0,
            Err(err) => {
                tracing::error!("{:#}", err);
                eprintln!("repsync error: {:#}", err);
                EXIT_ABORTED
            }
        }
    }

    fn dispatch(self, cfg: &RepsyncConfig) -> Result<()> {
        match self {
            CliCommand::Sync { lookback_days } => run_sync(cfg, lookback_days)?,
            CliCommand::Check => run_check(cfg)?,
            CliCommand::Fetch {
                remote,
                output,
                resume,
            } => run_fetch(cfg, &remote, output.as_deref(), resume)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
