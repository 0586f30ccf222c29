// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Cross-process error journal (`lastError.json`).
//!
//! ```text
//! worker:   run pipeline ──fail──> persist(err)     ok ──> clear()
//!                                      │
//! next run: take_previous() ──> rename to lastError.<pid>.taken
//!                              ──> read ──> delete ──> Some(record)
//!           take_previous() ──> None
//! ```

use std::io::ErrorKind;
use std::path::PathBuf;

use super::model::ErrorRecord;
use super::state::{MirrorState, read_state_json, write_state_json};
use crate::error::{SnapError, SnapResult, StateError};

/// Last-failure slot of one mirror.
#[derive(Debug, Clone)]
pub struct ErrorJournal {
    path: PathBuf,
}

impl ErrorJournal {
    #[must_use]
    pub fn for_state(state: &MirrorState) -> Self {
        Self {
            path: state.last_error_path(),
        }
    }

    fn taken_path(&self) -> PathBuf {
        self.path
            .with_file_name(format!("lastError.{}.taken", std::process::id()))
    }

    /// Records `err` as the latest failure, replacing any earlier record.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the record cannot be written.
    pub fn persist(&self, err: &SnapError) -> SnapResult<ErrorRecord> {
        let record = ErrorRecord::from_error(err);
        self.persist_record(&record)?;
        Ok(record)
    }

    /// Writes an already captured record.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the record cannot be written.
    pub fn persist_record(&self, record: &ErrorRecord) -> SnapResult<()> {
        write_state_json(&self.path, record)
    }

    /// Removes the record after a successful run.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if an existing record cannot be deleted.
    pub fn clear(&self) -> SnapResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::io(&self.path, e).into()),
        }
    }

    /// Reads and deletes the record. Each record is returned at most once.
    ///
    /// The record is first renamed to a private name, so a worker persisting
    /// a new failure at the same moment writes a fresh record instead of
    /// having it deleted unread.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the record exists but cannot be read or
    /// deleted. A malformed record is deleted before the error is returned.
    pub fn take_previous(&self) -> SnapResult<Option<ErrorRecord>> {
        let taken = self.taken_path();
        match std::fs::rename(&self.path, &taken) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::io(&self.path, e).into()),
        }

        let record = read_state_json::<ErrorRecord>(&taken);
        std::fs::remove_file(&taken).map_err(|e| StateError::io(&taken, e))?;
        record
    }

    /// Reads the record without consuming it.
    ///
    /// # Errors
    ///
    /// Returns a `StateError` if the record exists but cannot be read.
    pub fn peek(&self) -> SnapResult<Option<ErrorRecord>> {
        read_state_json(&self.path)
    }
}
