// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Unlock command implementation.

use tracing::warn;

use crate::cli::project::MirrorArgs;
use crate::cmd::resolve_mirror;
use crate::config::ToolConfig;
use crate::error::Result;
use crate::snapshot::{JobLock, MirrorState};

/// Main handler for unlock command.
///
/// # Errors
///
/// Returns an error if the lock file exists but cannot be removed.
pub fn run_unlock_command(args: &MirrorArgs, config: &ToolConfig) -> Result<()> {
    let mirror = resolve_mirror(args, config)?;
    let lock = JobLock::for_state(&MirrorState::for_mirror(&mirror));

    if let Some(pid) = lock.holder() {
        warn!(pid, "removing lock recorded for another process");
    }
    if lock.force_release()? {
        println!("Removed {}", lock.path().display());
    } else {
        println!("Mirror is not locked");
    }
    Ok(())
}
