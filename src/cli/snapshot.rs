// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot command arguments.
//!
//! ```text
//! snapmirror snapshot --results FILE [--source DIR] [--mirror DIR]
//!                     [--url URL] [--token TOKEN] [--mode sync|async] [--force]
//! snapmirror worker STATE_DIR
//! ```

use clap::Args;
use std::path::PathBuf;

use crate::config::types::SnapshotMode;

/// Arguments for the `snapshot` command.
#[derive(Debug, Clone, Args)]
pub struct SnapshotArgs {
    /// Test results JSON produced by the test run.
    #[arg(short = 'r', long = "results", value_name = "FILE")]
    pub results: PathBuf,

    /// Source directory to capture (default: current directory).
    #[arg(long = "source", value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Mirror repository (default: the project's mirror).
    #[arg(long = "mirror", value_name = "DIR")]
    pub mirror: Option<PathBuf>,

    /// Remote URL (default: the project's configured remote).
    #[arg(long = "url", value_name = "URL")]
    pub url: Option<String>,

    /// Access token for the remote.
    #[arg(long = "token", value_name = "TOKEN", env = "SNAPMIRROR_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Execution mode (default: snapshot.mode from configuration).
    #[arg(short = 'm', long = "mode", value_name = "MODE")]
    pub mode: Option<SnapshotMode>,

    /// Take the snapshot even when running under CI.
    #[arg(short = 'f', long)]
    pub force: bool,
}

/// Arguments for the hidden `worker` command.
#[derive(Debug, Clone, Args)]
pub struct WorkerArgs {
    /// The mirror's `.snapshotter` directory.
    #[arg(value_name = "STATE_DIR")]
    pub state_dir: PathBuf,
}
