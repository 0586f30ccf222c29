// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for snapmirror using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! snapmirror [global options] <command>
//! snapshot --results FILE [...]
//! init --url URL [--project NAME]
//! status | check | unlock [--mirror DIR]
//! worker STATE_DIR            (hidden, started by snapshot)
//! version
//! ```

pub mod global;
pub mod project;
pub mod snapshot;


use crate::cli::global::GlobalOptions;
use crate::cli::project::{InitArgs, MirrorArgs};
use crate::cli::snapshot::{SnapshotArgs, WorkerArgs};
use clap::{Parser, Subcommand};

/// Snapshot Mirror Tool
///
/// Captures the source tree and test results into a mirror repository.
#[derive(Debug, Parser)]
#[command(
    name = "snapmirror",
    author,
    version,
    about = "Snapshot Mirror Tool",
    long_about = "snapmirror Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Captures point-in-time snapshots of a source tree together with\n\
                  its test results, commits them to a private mirror repository\n\
                  and pushes the mirror to a remote for regression comparison.",
    after_help = "CONFIG FILES:\n\n\
                  snapmirror reads `snapmirror.toml` from the current directory if\n\
                  present, then every file given with --config, then SNAPMIRROR_*\n\
                  environment variables (e.g. SNAPMIRROR_SNAPSHOT__MODE=sync), then\n\
                  --set overrides. The remote token is read from --token or\n\
                  SNAPMIRROR_TOKEN and never written to disk outside the mirror."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    #[command(visible_alias = "-v")]
    Version,

    /// Takes a snapshot of the source tree and test results.
    Snapshot(SnapshotArgs),

    /// Registers the project and its remote.
    Init(InitArgs),

    /// Shows the mirror's queue, lock and last error.
    Status(MirrorArgs),

    /// Reports (and consumes) the last background failure.
    Check(MirrorArgs),

    /// Removes a job lock left behind by a crashed worker.
    Unlock(MirrorArgs),

    /// Drains pending snapshots of a mirror.
    #[command(hide = true)]
    Worker(WorkerArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}

/// Tries to parse command-line arguments from an iterator.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version
/// information was requested.
pub fn try_parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
