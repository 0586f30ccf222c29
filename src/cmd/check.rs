// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Check command implementation.

use crate::cli::project::MirrorArgs;
use crate::cmd::resolve_mirror;
use crate::config::ToolConfig;
use crate::error::Result;
use crate::snapshot::{ErrorJournal, MirrorState};

/// Main handler for check command.
///
/// Consumes the recorded failure, so a second check succeeds.
///
/// # Errors
///
/// Returns an error describing the last background failure, if one was
/// recorded.
pub fn run_check_command(args: &MirrorArgs, config: &ToolConfig) -> Result<()> {
    let mirror = resolve_mirror(args, config)?;
    let journal = ErrorJournal::for_state(&MirrorState::for_mirror(&mirror));

    let Some(record) = journal.take_previous()? else {
        println!("No snapshot failures recorded");
        return Ok(());
    };

    if let Some(command) = &record.command {
        eprintln!("Command: {command}");
    }
    if let Some(stderr) = record.stderr.as_deref().filter(|s| !s.trim().is_empty()) {
        eprintln!("{}", stderr.trim_end());
    }
    if let Some(stack) = &record.stack {
        eprintln!("{stack}");
    }
    Err(anyhow::anyhow!("last snapshot failed: {record}"))
}
