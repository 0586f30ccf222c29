// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Typed model of the mirror's reserved state directory.
//!
//! ```text
//! <mirror>/.snapshotter/
//!   pending.json        SnapshotRequest waiting for a worker (single slot)
//!   pending.<pid>.claimed  transient, owned by the claiming worker
//!   snapshot.lock       holder PID, see lock.rs
//!   lastError.json      ErrorRecord, see journal.rs
//!   lastError.<pid>.taken  transient, owned by the reader taking it
//!   testResults.json    committed with the snapshot
//!   worker.log          detached worker output (append)
//! ```
//!
//! JSON files are written atomically (temp file + rename in this directory).
//! Only `testResults.json` is meant to be committed; the rest is listed in
//! [`TRANSIENT_EXCLUDES`] and written to `.git/info/exclude`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::journal::ErrorJournal;
use super::lock::JobLock;
use super::model::{ErrorRecord, SnapshotRequest, TestResults};
use crate::error::{SnapResult, StateError};
use crate::utility::fs::atomic::write_json_atomic;

/// Name of the reserved directory inside the mirror.
pub const STATE_DIR_NAME: &str = ".snapshotter";
pub const PENDING_FILE: &str = "pending.json";
pub const LAST_ERROR_FILE: &str = "lastError.json";
pub const LOCK_FILE: &str = "snapshot.lock";
pub const TEST_RESULTS_FILE: &str = "testResults.json";
pub const WORKER_LOG_FILE: &str = "worker.log";

/// Mirror-relative patterns that must never be committed.
pub const TRANSIENT_EXCLUDES: &[&str] = &[
    "/.snapshotter/pending.json",
    "/.snapshotter/*.claimed",
    "/.snapshotter/lastError.json",
    "/.snapshotter/*.taken",
    "/.snapshotter/snapshot.lock",
    "/.snapshotter/worker.log",
    "/.snapshotter/.tmp*",
];

/// Paths and file operations of one mirror's state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorState {
    mirror: PathBuf,
    dir: PathBuf,
}

/// Point-in-time view of a mirror's state files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorStatus {
    pub pending: bool,
    pub lock_holder: Option<u32>,
    pub locked: bool,
    pub last_error: Option<ErrorRecord>,
}

impl MirrorState {
    #[must_use]
    pub fn for_mirror(mirror: impl Into<PathBuf>) -> Self {
        let mirror = mirror.into();
        let dir = mirror.join(STATE_DIR_NAME);
        Self { mirror, dir }
    }

    /// Rebuilds the state handle from a state directory path, as passed to
    /// the worker.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidStateDir` if the path is not named
    /// [`STATE_DIR_NAME`] or has no parent.
    pub fn from_state_dir(dir: &Path) -> SnapResult<Self> {
        let invalid = || StateError::InvalidStateDir(dir.display().to_string());
        if dir.file_name().is_none_or(|name| name != STATE_DIR_NAME) {
            return Err(invalid().into());
        }
        let mirror = dir.parent().ok_or_else(invalid)?;
        Ok(Self::for_mirror(mirror))
    }

    #[must_use]
    pub fn mirror(&self) -> &Path {
        &self.mirror
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn pending_path(&self) -> PathBuf {
        self.dir.join(PENDING_FILE)
    }

    #[must_use]
    pub fn last_error_path(&self) -> PathBuf {
        self.dir.join(LAST_ERROR_FILE)
    }

    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    #[must_use]
    pub fn test_results_path(&self) -> PathBuf {
        self.dir.join(TEST_RESULTS_FILE)
    }

    #[must_use]
    pub fn worker_log_path(&self) -> PathBuf {
        self.dir.join(WORKER_LOG_FILE)
    }

    fn claimed_path(&self) -> PathBuf {
        self.dir.join(format!("pending.{}.claimed", std::process::id()))
    }

    /// Creates the state directory (and the mirror) if missing.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the directory cannot be created.
    pub fn ensure_dir(&self) -> SnapResult<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| StateError::io(&self.dir, e))?;
        Ok(())
    }

    /// Stores `request` as the pending job, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the file cannot be written.
    pub fn write_pending(&self, request: &SnapshotRequest) -> SnapResult<()> {
        write_state_json(&self.pending_path(), request)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_path().is_file()
    }

    /// Takes ownership of the pending job.
    ///
    /// The descriptor is renamed to a worker-private name first, so two
    /// claimers never both receive it. It is deleted before being returned.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` on I/O failure or if the descriptor is malformed
    /// (it is discarded either way).
    pub fn claim_pending(&self) -> SnapResult<Option<SnapshotRequest>> {
        let pending = self.pending_path();
        let claimed = self.claimed_path();
        match std::fs::rename(&pending, &claimed) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::io(&pending, e).into()),
        }

        let request = read_state_json::<SnapshotRequest>(&claimed);
        std::fs::remove_file(&claimed).map_err(|e| StateError::io(&claimed, e))?;
        request
    }

    /// Writes the normalized test results that get committed.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the file cannot be written.
    pub fn write_test_results(&self, results: &TestResults) -> SnapResult<()> {
        write_state_json(&self.test_results_path(), results)
    }

    /// Reads all state files without modifying any of them.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if a state file exists but cannot be read.
    pub fn status(&self) -> SnapResult<MirrorStatus> {
        let lock = JobLock::for_state(self);
        Ok(MirrorStatus {
            pending: self.has_pending(),
            lock_holder: lock.holder(),
            locked: lock.is_held(),
            last_error: ErrorJournal::for_state(self).peek()?,
        })
    }
}

/// Atomically writes `value` as pretty JSON, mapping failures to `StateError`.
pub(crate) fn write_state_json<T: Serialize>(path: &Path, value: &T) -> SnapResult<()> {
    write_json_atomic(path, value).map_err(|e| StateError::io(path, e))?;
    Ok(())
}

/// Reads a JSON state file; `None` when it does not exist.
pub(crate) fn read_state_json<T: DeserializeOwned>(path: &Path) -> SnapResult<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StateError::io(path, e).into()),
    };
    serde_json::from_str(&content).map(Some).map_err(|e| {
        StateError::Serialization {
            path: path.display().to_string(),
            message: e.to_string(),
        }
        .into()
    })
}
