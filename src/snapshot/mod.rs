// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot capture and mirror synchronization.
//!
//! ```text
//!                  Snapshotter (strategy.rs)
//!                 /                        \
//!            Inline                      Background
//!               |                 BackgroundJobRunner (worker.rs)
//!               |                   pending.json + launcher
//!               |                            |
//!               |                  worker: drain_pending
//!               |                   JobLock (lock.rs)
//!                \                          /
//!                 SnapshotPipeline (pipeline.rs)
//!           FileSynchronizer ─> testResults ─> MirrorRepository
//!              (sync.rs)                        (git::mirror)
//!                              |
//!                   ErrorJournal (journal.rs)
//!                   MirrorState  (state.rs)
//! ```

pub mod journal;
pub mod lock;
pub mod model;
pub mod pipeline;
pub mod state;
pub mod strategy;
pub mod sync;
pub mod worker;

pub use journal::ErrorJournal;
pub use lock::{JobLock, JobLockGuard};
pub use model::{ErrorRecord, RemoteCredentials, SnapshotRequest, TestResults};
pub use pipeline::{PipelineOutcome, SnapshotPipeline};
pub use state::{MirrorState, MirrorStatus};
pub use strategy::{SnapshotOutcome, SnapshotReport, Snapshotter, Strategy};
pub use sync::{FileSynchronizer, SyncReport};
pub use worker::{
    BackgroundJobRunner, DrainReport, LaunchOutcome, ProcessLauncher, WorkerLauncher,
    drain_pending,
};
