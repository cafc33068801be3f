//! Tests for the sync, check and fetch subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_sync() {
    match parse(&["repsync", "sync"]) {
        CliCommand::Sync { lookback_days } => assert!(lookback_days.is_none()),
        _ => panic!("expected Sync"),
    }
}

#[test]
fn cli_parse_sync_lookback_days() {
    match parse(&["repsync", "sync", "--lookback-days", "30"]) {
        CliCommand::Sync { lookback_days } => assert_eq!(lookback_days, Some(30)),
        _ => panic!("expected Sync with --lookback-days"),
    }
}

#[test]
fn cli_rejects_zero_lookback_days() {
    assert!(Cli::try_parse_from(["repsync", "sync", "--lookback-days", "0"]).is_err());
}

#[test]
fn cli_parse_check() {
    match parse(&["repsync", "check"]) {
        CliCommand::Check => {}
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_fetch() {
    match parse(&["repsync", "fetch", "/EQ/20240314/EQ_daily.zip"]) {
        CliCommand::Fetch {
            remote,
            output,
            resume,
        } => {
            assert_eq!(remote, "/EQ/20240314/EQ_daily.zip");
            assert!(output.is_none());
            assert!(!resume);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn cli_parse_fetch_output_resume() {
    match parse(&[
        "repsync",
        "fetch",
        "/EQ/20240314/EQ_daily.zip",
        "--output",
        "/tmp/x.zip",
        "--resume",
    ]) {
        CliCommand::Fetch {
            remote,
            output,
            resume,
        } => {
            assert_eq!(remote, "/EQ/20240314/EQ_daily.zip");
            assert_eq!(output.as_deref(), Some(std::path::Path::new("/tmp/x.zip")));
            assert!(resume);
        }
        _ => panic!("expected Fetch with --output and --resume"),
    }
}

#[test]
fn cli_fetch_requires_remote_path() {
    assert!(Cli::try_parse_from(["repsync", "fetch"]).is_err());
}
