// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! One complete snapshot run.
//!
//! ```text
//! sync(source, mirror) ─> write testResults.json ─> commit ─┬─ false: done
//!                                                           └─ true:  push
//! ```

use tracing::{debug, info};

use super::model::SnapshotRequest;
use super::state::MirrorState;
use super::sync::FileSynchronizer;
use crate::config::types::GitConfig;
use crate::core::process::CommandRunner;
use crate::error::SnapResult;
use crate::git::MirrorRepository;

/// Result of a pipeline run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub committed: bool,
    pub pushed: bool,
}

/// Sync, commit and push wired to one command runner.
#[derive(Debug, Clone)]
pub struct SnapshotPipeline<R> {
    synchronizer: FileSynchronizer<R>,
    repository: MirrorRepository<R>,
}

impl<R: CommandRunner + Clone> SnapshotPipeline<R> {
    pub fn new(runner: R, git: GitConfig) -> Self {
        Self {
            synchronizer: FileSynchronizer::new(runner.clone(), &git),
            repository: MirrorRepository::new(runner, git),
        }
    }

    #[must_use]
    pub const fn repository(&self) -> &MirrorRepository<R> {
        &self.repository
    }

    /// Runs the request. The source defaults to the current directory.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error; later steps are not run.
    pub async fn run(&self, request: &SnapshotRequest) -> SnapResult<PipelineOutcome> {
        let source = match request.source_path() {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let mirror = request.mirror_path();
        debug!(source = %source.display(), mirror = %mirror.display(), "running snapshot pipeline");

        self.synchronizer.sync(&source, mirror).await?;

        let state = MirrorState::for_mirror(mirror);
        state.write_test_results(&request.test_results().clone().normalized())?;

        if !self.repository.commit(mirror).await? {
            info!("no changes since the last snapshot");
            return Ok(PipelineOutcome {
                committed: false,
                pushed: false,
            });
        }

        self.repository.push(mirror, request.remote()).await?;
        Ok(PipelineOutcome {
            committed: true,
            pushed: true,
        })
    }
}
