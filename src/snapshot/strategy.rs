// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot orchestration.
//!
//! ```text
//! Snapshotter::execute(request)
//!   take_previous()  ──> previous_failure (warning, never fatal)
//!   match strategy
//!     Inline      try_acquire ──busy──> InProgress (pipeline not run)
//!                     │
//!                 pipeline.run ──ok──> clear()    ──> Completed
//!                              └err──> persist()  ──> Err
//!                 release lock on both paths
//!     Background  run_detached ──> Spawned | Queued
//! ```

use tracing::{info, warn};

use super::journal::ErrorJournal;
use super::lock::JobLock;
use super::model::{ErrorRecord, SnapshotRequest};
use super::pipeline::SnapshotPipeline;
use super::state::MirrorState;
use super::worker::{BackgroundJobRunner, LaunchOutcome};
use crate::core::process::CommandRunner;
use crate::error::SnapResult;

/// How a snapshot is executed. Chosen once, at construction.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Run the pipeline in the calling process and wait for it.
    Inline,
    /// Hand the request to a detached worker and return at once.
    Background(BackgroundJobRunner),
}

/// What happened to the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Completed { committed: bool, pushed: bool },
    Spawned,
    Queued,
    /// Another job held the mirror's lock; nothing was run.
    InProgress,
}

/// Result of [`Snapshotter::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Failure left behind by an earlier background run, consumed now.
    pub previous_failure: Option<ErrorRecord>,
    pub outcome: SnapshotOutcome,
}

/// Entry point for taking snapshots.
#[derive(Debug, Clone)]
pub struct Snapshotter<R> {
    pipeline: SnapshotPipeline<R>,
    strategy: Strategy,
}

impl<R: CommandRunner + Clone> Snapshotter<R> {
    pub const fn new(pipeline: SnapshotPipeline<R>, strategy: Strategy) -> Self {
        Self { pipeline, strategy }
    }

    #[must_use]
    pub const fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Executes `request` with the configured strategy.
    ///
    /// # Errors
    ///
    /// Inline: the pipeline error (after it was journaled), or a lock I/O
    /// error. Background: an error writing the request or starting the
    /// worker.
    pub async fn execute(&self, request: &SnapshotRequest) -> SnapResult<SnapshotReport> {
        let state = MirrorState::for_mirror(request.mirror_path());
        let journal = ErrorJournal::for_state(&state);

        let previous_failure = journal.take_previous().unwrap_or_else(|e| {
            warn!(error = %e, "discarding unreadable error record");
            None
        });
        if let Some(previous) = &previous_failure {
            warn!(%previous, "previous background snapshot failed");
        }

        let outcome = match &self.strategy {
            Strategy::Inline => {
                let lock = JobLock::for_state(&state);
                let Some(guard) = lock.try_acquire()? else {
                    info!(holder = ?lock.holder(), "snapshot already in progress");
                    return Ok(SnapshotReport {
                        previous_failure,
                        outcome: SnapshotOutcome::InProgress,
                    });
                };
                match self.pipeline.run(request).await {
                    Ok(done) => {
                        let cleared = journal.clear();
                        guard.release()?;
                        cleared?;
                        SnapshotOutcome::Completed {
                            committed: done.committed,
                            pushed: done.pushed,
                        }
                    }
                    Err(err) => {
                        if let Err(journal_err) = journal.persist(&err) {
                            warn!(error = %journal_err, "failed to record snapshot error");
                        }
                        if let Err(lock_err) = guard.release() {
                            warn!(error = %lock_err, "failed to release job lock");
                        }
                        return Err(err);
                    }
                }
            }
            Strategy::Background(runner) => match runner.run_detached(request)? {
                LaunchOutcome::Spawned => SnapshotOutcome::Spawned,
                LaunchOutcome::Queued => SnapshotOutcome::Queued,
            },
        };

        Ok(SnapshotReport {
            previous_failure,
            outcome,
        })
    }
}
