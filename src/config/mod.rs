// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for snapmirror.
//!
//! Two unrelated documents live here:
//!
//! - [`ToolConfig`]: how the tool itself behaves (TOML, layered).
//! - [`local::LocalConfig`]: per-project `config.json` kept in the project
//!   home and migrated by [`upgrade::ConfigVersionUpgrader`].
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. snapmirror.toml (cwd, optional)
//! 3. --config FILE (repeatable)
//! 4. SNAPMIRROR_* env vars
//! 5. CLI overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! SNAPMIRROR_SNAPSHOT__MODE=sync       → snapshot.mode = "sync"
//! SNAPMIRROR_PATHS__HOME=/srv/snaps    → paths.home = "/srv/snaps"
//! SNAPMIRROR_GIT__AUTHOR_NAME=ci-bot   → git.author_name = "ci-bot"
//! ```

pub mod loader;
pub mod local;
pub mod paths;
pub mod types;
pub mod upgrade;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

use loader::ConfigLoader;
use paths::PathsConfig;
use types::{GitConfig, GlobalConfig, SnapshotConfig};

/// Environment prefix for tool configuration.
pub const ENV_PREFIX: &str = "SNAPMIRROR";

/// Optional configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "snapmirror.toml";

/// Complete tool configuration.
///
/// Unknown top-level keys are ignored so that unrelated `SNAPMIRROR_*`
/// variables (such as the access token) do not break loading.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Global options.
    pub global: GlobalConfig,
    /// Project home locations.
    pub paths: PathsConfig,
    /// Git settings for the mirror.
    pub git: GitConfig,
    /// Snapshot execution settings.
    pub snapshot: SnapshotConfig,
}

impl ToolConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use snapmirror::config::ToolConfig;
    ///
    /// let config = ToolConfig::builder()
    ///     .add_toml_file_optional("snapmirror.toml")
    ///     .with_env_prefix("SNAPMIRROR")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file (simple API).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `ToolConfig` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `ToolConfig` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Resolve all paths and validate configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the project home cannot be resolved.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        self.paths.resolve()?;
        Ok(())
    }
}
