// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Project and mirror inspection arguments.
//!
//! ```text
//! snapmirror init --url URL [--project NAME] [--source DIR]
//! snapmirror status|check|unlock [--mirror DIR] [--source DIR]
//! ```

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `init` command.
#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Remote URL the mirror is pushed to.
    #[arg(long = "url", value_name = "URL")]
    pub url: String,

    /// Project name (default: detected from the source's origin remote).
    #[arg(short = 'p', long = "project", value_name = "NAME")]
    pub project: Option<String>,

    /// Source directory (default: current directory).
    #[arg(long = "source", value_name = "DIR")]
    pub source: Option<PathBuf>,
}

/// Selects a mirror either directly or through the source's project.
#[derive(Debug, Clone, Default, Args)]
pub struct MirrorArgs {
    /// Mirror repository (default: the project's mirror).
    #[arg(long = "mirror", value_name = "DIR")]
    pub mirror: Option<PathBuf>,

    /// Source directory used to detect the project (default: current directory).
    #[arg(long = "source", value_name = "DIR")]
    pub source: Option<PathBuf>,
}
