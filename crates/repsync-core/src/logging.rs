//! Logging init: a log file (dated if the configured path has strftime
//! specifiers, else under the XDG state dir), optionally echoed to stderr,
//! with a graceful fallback to stderr only.

use anyhow::{Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::RepsyncConfig;

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(std::fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileMakeWriter(std::fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,repsync_core=debug,repsync=debug"
    } else {
        "info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)))
}

/// True if every `%` specifier in `template` is one chrono understands.
pub fn is_valid_log_template(template: &str) -> bool {
    !StrftimeItems::new(template).any(|item| matches!(item, Item::Error))
}

/// Expand strftime specifiers in a log file template (e.g. `/var/log/repsync/%Y%m%d.log`).
pub fn resolve_log_path(template: &str, now: NaiveDateTime) -> Result<PathBuf> {
    let mut out = String::new();
    write!(out, "{}", now.format(template))
        .map_err(|_| anyhow::anyhow!("bad date specifier in log_file {:?}", template))?;
    Ok(PathBuf::from(out))
}

fn default_log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("repsync")?;
    Ok(xdg_dirs.get_state_home().join("repsync").join("repsync.log"))
}

/// Initialize structured logging to the configured log file, or
/// `~/.local/state/repsync/repsync.log`. With `log_to_console`, lines are
/// also written to stderr. `verbose` is or-ed with the config setting.
///
/// On failure (e.g. log dir unwritable), returns Err so the caller can fall
/// back to stderr. Returns the log file path.
pub fn init_logging(cfg: &RepsyncConfig, verbose: bool, now: NaiveDateTime) -> Result<PathBuf> {
    let log_file_path = match &cfg.log_file {
        Some(template) => resolve_log_path(template, now)?,
        None => default_log_path()?,
    };
    if let Some(dir) = log_file_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    }

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("cannot open log file {}", log_file_path.display()))?;

    let writer: BoxMakeWriter = if cfg.log_to_console {
        BoxMakeWriter::new(FileMakeWriter(file).and(io::stderr))
    } else {
        BoxMakeWriter::new(FileMakeWriter(file))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose || cfg.verbose))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    tracing::info!("repsync logging initialized at {}", log_file_path.display());

    Ok(log_file_path)
}

/// Initialize logging to stderr only (no file). Use when init_logging() fails so the CLI doesn't crash.
pub fn init_logging_stderr(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
