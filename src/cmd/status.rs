// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Status command implementation.

use crate::cli::project::MirrorArgs;
use crate::cmd::resolve_mirror;
use crate::config::ToolConfig;
use crate::core::process::ShellRunner;
use crate::error::Result;
use crate::git::MirrorRepository;
use crate::git::mirror::is_repository;
use crate::git::query::current_branch;
use crate::snapshot::MirrorState;

/// Main handler for status command.
///
/// Read-only: the error journal is peeked, not consumed.
///
/// # Errors
///
/// Returns an error if the mirror cannot be resolved or its state is
/// unreadable.
pub async fn run_status_command(args: &MirrorArgs, config: &ToolConfig) -> Result<()> {
    let mirror = resolve_mirror(args, config)?;
    let state = MirrorState::for_mirror(&mirror);
    let status = state.status()?;

    println!("Mirror:   {}", mirror.display());
    if is_repository(&mirror) {
        let branch = current_branch(&mirror)?.unwrap_or_else(|| "(detached)".to_string());
        let repository = MirrorRepository::new(ShellRunner, config.git.clone());
        match repository.head_commit_count(&mirror).await {
            Ok(count) => println!("Branch:   {branch} ({count} snapshots)"),
            Err(_) => println!("Branch:   {branch} (no snapshots)"),
        }
    } else {
        println!("Branch:   (not initialized)");
    }
    println!("Pending:  {}", if status.pending { "yes" } else { "no" });
    match (status.locked, status.lock_holder) {
        (true, Some(pid)) => println!("Worker:   running (pid {pid})"),
        (true, None) => println!("Worker:   running"),
        (false, _) => println!("Worker:   idle"),
    }
    match &status.last_error {
        Some(record) => println!("Last error: {record}"),
        None => println!("Last error: none"),
    }
    Ok(())
}
