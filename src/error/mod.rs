// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!               SnapError (~24 bytes)
//!                     |
//!   +--------+--------+--------+--------+--------+
//!   |        |        |        |        |        |
//!   v        v        v        v        v        v
//! Process   Sync     Git     State   Config   Io/Other
//!   Box     Box      Box      Box     Box     Box<str>
//!
//! Sub-errors (unboxed internally):
//!   Process  ExecutableNotFound, SpawnFailed, ExecCommandFailed
//!   Sync     SourceNotFound, ListFailed, CopyFailed, RemoveFailed
//!   Git      InvalidRemoteUrl, Query, Metadata
//!   State    Io, Serialization, InvalidStateDir
//!   Config   ReadError, ParseError, InvalidValue, ProjectNotDetected,
//!            MissingRemote, NoHomeDir
//! ```

use std::fmt;

use thiserror::Error;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`SnapError`].
pub type SnapResult<T> = std::result::Result<T, SnapError>;

/// Top-level library error type.
///
/// All sub-errors are boxed to keep this enum at ~24 bytes on the stack.
#[derive(Debug, Error)]
pub enum SnapError {
    /// External command failed.
    #[error(transparent)]
    Process(Box<ProcessError>),

    /// Mirroring the source tree failed.
    #[error("sync failed: {0}")]
    Sync(Box<SyncError>),

    /// Git driver error that is not a plain command failure.
    #[error("git error: {0}")]
    Git(Box<GitError>),

    /// Mirror state files could not be read or written.
    #[error("state error: {0}")]
    State(Box<StateError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(Box<ConfigError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),

    /// Generic error with message.
    #[error("{0}")]
    Other(Box<str>),
}

impl SnapError {
    /// Creates a [`SnapError::Other`] from a message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into().into_boxed_str())
    }

    /// Returns the failed external command behind this error, if any.
    #[must_use]
    pub fn exec_failure(&self) -> Option<&ExecFailure> {
        match self {
            Self::Process(err) => err.exec_failure(),
            Self::Sync(err) => match err.as_ref() {
                SyncError::ListFailed { source, .. } => source.exec_failure(),
                _ => None,
            },
            _ => None,
        }
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for SnapError {
                fn from(err: $error) -> Self {
                    SnapError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    ProcessError => Process,
    SyncError => Sync,
    GitError => Git,
    StateError => State,
    ConfigError => Config,
    std::io::Error => Io,
}

// --- Process Errors ---

/// Captured details of an external command that exited unsuccessfully.
///
/// Secrets registered on the command are already masked in every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecFailure {
    pub command: String,
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl fmt::Display for ExecFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' exited with code {}", self.command, self.code)?;
        let stderr = self.stderr.trim();
        if let Some(first_line) = stderr.lines().next() {
            write!(f, ": {first_line}")?;
        }
        Ok(())
    }
}

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Process exited with a status outside its success set.
    #[error("command failed: {0}")]
    ExecCommandFailed(ExecFailure),

    /// Waiting on or reading from the process failed.
    #[error("failed to read output from process '{command}': {source}")]
    OutputError {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProcessError {
    /// Returns the captured command failure, if this is one.
    #[must_use]
    pub const fn exec_failure(&self) -> Option<&ExecFailure> {
        match self {
            Self::ExecCommandFailed(failure) => Some(failure),
            _ => None,
        }
    }
}

// --- Sync Errors ---

/// Errors raised while mirroring the source tree.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Source directory does not exist.
    #[error("source directory not found: {0}")]
    SourceNotFound(String),

    /// Listing tracked and untracked files failed.
    #[error("failed to list files in {path}: {source}")]
    ListFailed {
        path: String,
        #[source]
        source: ProcessError,
    },

    /// The fixed exclusion list could not be compiled.
    #[error("invalid exclusion pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Copying a file into the mirror failed.
    #[error("failed to copy {from} to {to}: {source}")]
    CopyFailed {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },

    /// Removing an orphaned mirror entry failed.
    #[error("failed to remove {path}: {source}")]
    RemoveFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Git Errors ---

/// Git driver errors that are not plain command failures.
#[derive(Debug, Error)]
pub enum GitError {
    /// Remote URL cannot carry an access token.
    #[error("invalid remote url: {url}")]
    InvalidRemoteUrl { url: String },

    /// Read-only repository inspection failed.
    #[error("cannot inspect repository at {path}: {message}")]
    Query { path: String, message: String },

    /// Writing git metadata directly failed.
    #[error("failed to update {path}: {source}")]
    Metadata {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- State Errors ---

/// Errors reading or writing the mirror's state directory.
#[derive(Debug, Error)]
pub enum StateError {
    /// Filesystem error on a state file.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// State file contents could not be (de)serialized.
    #[error("malformed state file '{path}': {message}")]
    Serialization { path: String, message: String },

    /// The path is not a mirror state directory.
    #[error("not a snapshot state directory: {0}")]
    InvalidStateDir(String),
}

impl StateError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// No project name could be derived for the source directory.
    #[error("cannot determine project name for {0}; run `snapmirror init` first")]
    ProjectNotDetected(String),

    /// The project has no remote URL configured.
    #[error("no remote configured for project '{0}'; pass --url or run `snapmirror init`")]
    MissingRemote(String),

    /// Home directory could not be resolved.
    #[error("home directory not found; set paths.home")]
    NoHomeDir,
}

#[cfg(test)]
mod tests;
