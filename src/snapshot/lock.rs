// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-mirror job lock (`snapshot.lock`).
//!
//! ```text
//! try_acquire()  create_new(lock) ──ok──> Some(guard)   file holds our PID
//!                      └──exists──> None               somebody else runs
//! guard.release() / drop  ──> lock file removed
//! ```
//!
//! Creation uses `O_EXCL` semantics, so at most one process holds the lock.
//! The lock is not re-entrant.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::state::MirrorState;
use crate::error::{SnapResult, StateError};

/// Mutual exclusion for jobs touching one mirror.
#[derive(Debug, Clone)]
pub struct JobLock {
    path: PathBuf,
}

/// Proof of holding a [`JobLock`]. Releases on drop.
#[derive(Debug)]
pub struct JobLockGuard {
    path: PathBuf,
    released: bool,
}

impl JobLock {
    #[must_use]
    pub fn for_state(state: &MirrorState) -> Self {
        Self {
            path: state.lock_path(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Attempts to take the lock without blocking.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` for I/O failures other than contention.
    pub fn try_acquire(&self) -> SnapResult<Option<JobLockGuard>> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StateError::io(parent, e))?;
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                tracing::debug!(path = %self.path.display(), holder = ?self.holder(), "lock busy");
                return Ok(None);
            }
            Err(e) => return Err(StateError::io(&self.path, e).into()),
        };

        let guard = JobLockGuard {
            path: self.path.clone(),
            released: false,
        };
        file.write_all(std::process::id().to_string().as_bytes())
            .map_err(|e| StateError::io(&self.path, e))?;
        tracing::debug!(path = %self.path.display(), "lock acquired");
        Ok(Some(guard))
    }

    #[must_use]
    pub fn is_held(&self) -> bool {
        self.path.exists()
    }

    /// PID recorded by the current holder, if the lock is held.
    #[must_use]
    pub fn holder(&self) -> Option<u32> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|pid| pid.trim().parse().ok())
    }

    /// Removes a lock left behind by a process that died while holding it.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the lock file exists but cannot be removed.
    pub fn force_release(&self) -> SnapResult<bool> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StateError::io(&self.path, e).into()),
        }
    }
}

impl JobLockGuard {
    /// Releases the lock, reporting failure to remove the marker.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the lock file cannot be removed.
    pub fn release(mut self) -> SnapResult<()> {
        self.released = true;
        remove_lock(&self.path).map_err(|e| StateError::io(&self.path, e).into())
    }
}

impl Drop for JobLockGuard {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = remove_lock(&self.path)
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}

fn remove_lock(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "lock released");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
