// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Path configuration.
//!
//! ```text
//! home/                (default: ~/.snapmirror)
//!   <project>/
//!     config.json      (LocalConfig)
//!     mirror/          (mirror git repository)
//!       .snapshotter/  (state directory)
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Directory name under the user's home used when `paths.home` is unset.
pub const DEFAULT_HOME_DIR: &str = ".snapmirror";

/// Locations of per-project state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Root of all project homes. A leading `~` expands to the user's home.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
}

impl PathsConfig {
    /// Expands `~` and fills in the default home.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDir` if the user's home directory is
    /// needed but cannot be determined.
    pub fn resolve(&mut self) -> Result<(), ConfigError> {
        let home = match self.home.take() {
            Some(path) => expand_tilde(&path)?,
            None => dirs::home_dir()
                .ok_or(ConfigError::NoHomeDir)?
                .join(DEFAULT_HOME_DIR),
        };
        self.home = Some(home);
        Ok(())
    }

    /// Returns the resolved home, or the default relative name if unresolved.
    #[must_use]
    pub fn home(&self) -> &Path {
        self.home
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_HOME_DIR))
    }

    /// Returns the layout for one project.
    #[must_use]
    pub fn project(&self, name: &str) -> ProjectLayout {
        ProjectLayout::new(self.home().join(name))
    }
}

fn expand_tilde(path: &Path) -> Result<PathBuf, ConfigError> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(dirs::home_dir().ok_or(ConfigError::NoHomeDir)?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Files belonging to one project home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/config.json`
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// `<root>/mirror`
    #[must_use]
    pub fn mirror_dir(&self) -> PathBuf {
        self.root.join("mirror")
    }
}
