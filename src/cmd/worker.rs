// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Worker command implementation.
//!
//! Started detached by `snapshot` in async mode. Its exit code is 1 only
//! when the last drained snapshot failed; the failure itself is in
//! `lastError.json`.

use tracing::{debug, info};

use crate::cli::snapshot::WorkerArgs;
use crate::config::ToolConfig;
use crate::core::process::ShellRunner;
use crate::error::Result;
use crate::snapshot::{DrainReport, MirrorState, SnapshotPipeline, drain_pending};

/// Main handler for the hidden worker command.
///
/// # Errors
///
/// Returns an error if the state directory is invalid or a pending request
/// cannot be claimed.
pub async fn run_worker_command(args: &WorkerArgs, config: &ToolConfig) -> Result<i32> {
    let state = MirrorState::from_state_dir(&args.state_dir)?;
    let pipeline = SnapshotPipeline::new(ShellRunner, config.git.clone());

    let report = drain_pending(&state, &pipeline).await?;
    match report {
        DrainReport::Contended => debug!("another worker holds the lock"),
        DrainReport::Drained { runs, last_failed } => {
            info!(runs, last_failed, mirror = %state.mirror().display(), "worker finished");
        }
    }
    Ok(report.exit_code())
}
