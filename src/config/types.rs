// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for snapmirror.
//!
//! # Config Structure
//!
//! ```text
//! ToolConfig: GlobalConfig, PathsConfig, GitConfig, SnapshotConfig
//! ```
//!
//! # Snapshot Mode
//!
//! ```text
//! SnapshotMode: Sync (inline) | Async (detached worker, default)
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::logging::LogLevel;

/// How a snapshot is executed relative to the calling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotMode {
    /// Run the whole pipeline before returning.
    Sync,
    /// Hand the request to a detached worker and return immediately.
    #[default]
    Async,
}

impl std::fmt::Display for SnapshotMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync => write!(f, "sync"),
            Self::Async => write!(f, "async"),
        }
    }
}

impl std::str::FromStr for SnapshotMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sync" => Ok(Self::Sync),
            "async" => Ok(Self::Async),
            _ => Err(ConfigError::InvalidValue {
                section: "snapshot".to_string(),
                key: "mode".to_string(),
                message: format!("expected 'sync' or 'async', got '{s}'"),
            }),
        }
    }
}

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
        }
    }
}

/// Git invocation settings for the mirror repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Git executable.
    pub program: PathBuf,
    /// Committer name for snapshot commits.
    pub author_name: String,
    /// Committer email for snapshot commits.
    pub author_email: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
            author_name: "snapmirror".to_string(),
            author_email: "snapmirror@localhost".to_string(),
        }
    }
}

/// Snapshot execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// Default execution mode.
    pub mode: SnapshotMode,
    /// Skip snapshots when running under CI.
    pub skip_on_ci: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            mode: SnapshotMode::Async,
            skip_on_ci: true,
        }
    }
}
