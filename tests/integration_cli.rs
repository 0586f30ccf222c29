// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for CLI parsing.
//!
//! Tests the CLI module with realistic command-line argument patterns.

use std::path::PathBuf;

use snapmirror::cli::{self, Command};
use snapmirror::config::types::SnapshotMode;

// =============================================================================
// Version Command
// =============================================================================

#[test]
fn cli_version_command() {
    let cli = cli::try_parse_from(["snapmirror", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn cli_version_alias() {
    let cli = cli::try_parse_from(["snapmirror", "-v"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
}

#[test]
fn cli_no_command() {
    let cli = cli::try_parse_from(["snapmirror"]).unwrap();
    assert!(cli.command.is_none());
}

// =============================================================================
// Snapshot Command
// =============================================================================

#[test]
fn cli_snapshot_minimal() {
    let cli = cli::try_parse_from(["snapmirror", "snapshot", "-r", "out/results.json"]).unwrap();
    let Some(Command::Snapshot(args)) = cli.command else {
        panic!("expected snapshot command");
    };
    assert_eq!(args.results, PathBuf::from("out/results.json"));
    assert!(args.source.is_none());
    assert!(args.mirror.is_none());
    assert!(args.mode.is_none());
}

#[test]
fn cli_snapshot_global_options_after_subcommand() {
    let cli = cli::try_parse_from([
        "snapmirror",
        "snapshot",
        "--results",
        "r.json",
        "--force",
        "-m",
        "async",
        "--log-level",
        "0",
        "--log-file",
        "/tmp/snap.log",
    ])
    .unwrap();
    assert_eq!(cli.global.log_level, Some(0));
    assert_eq!(cli.global.log_file, Some(PathBuf::from("/tmp/snap.log")));
    let Some(Command::Snapshot(args)) = cli.command else {
        panic!("expected snapshot command");
    };
    assert!(args.force);
    assert_eq!(args.mode, Some(SnapshotMode::Async));
}

// =============================================================================
// Mirror Commands
// =============================================================================

#[test]
fn cli_mirror_commands_share_arguments() {
    for name in ["status", "check", "unlock"] {
        let cli = cli::try_parse_from(["snapmirror", name, "--mirror", "/srv/m"]).unwrap();
        let args = match cli.command {
            Some(Command::Status(args) | Command::Check(args) | Command::Unlock(args)) => args,
            other => panic!("unexpected command for {name}: {other:?}"),
        };
        assert_eq!(args.mirror, Some(PathBuf::from("/srv/m")));
        assert!(args.source.is_none());
    }
}

#[test]
fn cli_init_requires_url() {
    assert!(cli::try_parse_from(["snapmirror", "init"]).is_err());
    let cli = cli::try_parse_from(["snapmirror", "init", "--url", "https://e.com/a.git"]).unwrap();
    let Some(Command::Init(args)) = cli.command else {
        panic!("expected init command");
    };
    assert_eq!(args.url, "https://e.com/a.git");
    assert!(args.project.is_none());
}

#[test]
fn cli_worker_requires_state_dir() {
    assert!(cli::try_parse_from(["snapmirror", "worker"]).is_err());
}
