// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Detached execution: single-slot job queue, launcher and drain loop.
//!
//! ```text
//! caller                                   worker (separate process)
//! run_detached(req)                        drain_pending(state)
//!   write pending.json ◄────────────┐        lock busy? ──> Contended
//!   lock held? ──> Queued           │        loop:
//!   launch(state_dir) ──> Spawned ──┼──────►   claim pending ──> run pipeline
//!                                   │          persist / clear journal
//!                                   │        release lock
//!                                   └─────── pending again? ──> loop
//! ```
//!
//! A request written while a worker holds the lock is picked up by that
//! worker, either in its claim loop or by the re-check after release.
//! Bursts collapse into the newest request.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::journal::ErrorJournal;
use super::lock::JobLock;
use super::model::SnapshotRequest;
use super::pipeline::SnapshotPipeline;
use super::state::MirrorState;
use crate::core::process::CommandRunner;
use crate::error::{ProcessError, SnapResult};

/// Starts a worker process for a state directory.
pub trait WorkerLauncher: Send + Sync {
    /// Starts the worker and returns without waiting for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker cannot be started.
    fn launch(&self, state_dir: &Path) -> SnapResult<()>;
}

/// Launches `<program> [args..] worker <state_dir>` as a detached process.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<OsString>,
}

impl ProcessLauncher {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Launcher re-running the current executable.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the executable path cannot be determined.
    pub fn current_exe() -> SnapResult<Self> {
        Ok(Self::new(std::env::current_exe()?))
    }

    /// Arguments placed before the `worker` subcommand (global options).
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl WorkerLauncher for ProcessLauncher {
    fn launch(&self, state_dir: &Path) -> SnapResult<()> {
        let mut command = std::process::Command::new(&self.program);
        command
            .args(&self.args)
            .arg("worker")
            .arg(state_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // own process group, so the worker outlives the caller's terminal
            command.process_group(0);
        }
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const DETACHED_PROCESS: u32 = 0x0000_0008;
            const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
            command.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
        }

        let child = command.spawn().map_err(|source| ProcessError::SpawnFailed {
            command: format!("{} worker {}", self.program.display(), state_dir.display()),
            source,
        })?;
        info!(pid = child.id(), state = %state_dir.display(), "snapshot worker started");
        Ok(())
    }
}

/// What [`BackgroundJobRunner::run_detached`] did with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// A new worker was started.
    Spawned,
    /// A worker already holds the lock and will pick the request up.
    Queued,
}

/// Result of one worker's drain loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainReport {
    /// Another worker held the lock; nothing was done.
    Contended,
    /// The queue was drained.
    Drained { runs: usize, last_failed: bool },
}

impl DrainReport {
    /// Exit code of the worker process.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Drained {
                last_failed: true, ..
            } => 1,
            _ => 0,
        }
    }
}

/// Hands snapshot requests to detached workers.
#[derive(Clone)]
pub struct BackgroundJobRunner {
    launcher: Arc<dyn WorkerLauncher>,
}

impl std::fmt::Debug for BackgroundJobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundJobRunner").finish_non_exhaustive()
    }
}

impl BackgroundJobRunner {
    pub fn new(launcher: Arc<dyn WorkerLauncher>) -> Self {
        Self { launcher }
    }

    /// Queues `request` and makes sure a worker will run it.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be written or the worker
    /// cannot be started.
    pub fn run_detached(&self, request: &SnapshotRequest) -> SnapResult<LaunchOutcome> {
        let state = MirrorState::for_mirror(request.mirror_path());
        state.ensure_dir()?;
        state.write_pending(request)?;

        let lock = JobLock::for_state(&state);
        if lock.is_held() {
            info!(holder = ?lock.holder(), "snapshot already in progress, request queued");
            return Ok(LaunchOutcome::Queued);
        }
        self.launcher.launch(state.dir())?;
        Ok(LaunchOutcome::Spawned)
    }
}

/// Worker body: runs pending requests until none is left.
///
/// # Errors
///
/// Returns an error if the state directory cannot be used or a failure
/// cannot be recorded. Pipeline failures are recorded in the journal and
/// reported through [`DrainReport::Drained`], not returned.
pub async fn drain_pending<R: CommandRunner + Clone>(
    state: &MirrorState,
    pipeline: &SnapshotPipeline<R>,
) -> SnapResult<DrainReport> {
    let lock = JobLock::for_state(state);
    let journal = ErrorJournal::for_state(state);
    let mut runs = 0;
    let mut last_failed = false;

    loop {
        let Some(guard) = lock.try_acquire()? else {
            if runs == 0 {
                info!(holder = ?lock.holder(), "snapshot already in progress");
                return Ok(DrainReport::Contended);
            }
            // whoever holds it now sees the pending request
            break;
        };

        loop {
            let request = match state.claim_pending() {
                Ok(Some(request)) => request,
                Ok(None) => break,
                Err(err) => {
                    error!(error = %err, "cannot claim pending snapshot");
                    journal.persist(&err)?;
                    return Err(err);
                }
            };
            runs += 1;
            debug!(run = runs, "claimed pending snapshot");

            match pipeline.run(&request).await {
                Ok(outcome) => {
                    journal.clear()?;
                    last_failed = false;
                    info!(committed = outcome.committed, pushed = outcome.pushed, "snapshot finished");
                }
                Err(err) => {
                    error!(error = %err, "snapshot failed");
                    journal.persist(&err)?;
                    last_failed = true;
                }
            }
        }

        guard.release()?;
        if !state.has_pending() {
            break;
        }
        debug!("request arrived during release, draining again");
    }

    Ok(DrainReport::Drained { runs, last_failed })
}
