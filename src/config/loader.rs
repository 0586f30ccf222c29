// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Layered loading of [`ToolConfig`].
//!
//! ```text
//! defaults
//!   < snapmirror.toml (optional)
//!   < --config FILE ...            (later files win)
//!   < SNAPMIRROR_<SECTION>__<KEY>
//!   < --set section.key=value
//!        |
//!        v
//!   build() --> ToolConfig (paths resolved)
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};

use super::ToolConfig;
use crate::error::Result;

/// One layer that was registered with the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A TOML file that must exist.
    File(PathBuf),
    /// A TOML file that existed when it was registered.
    OptionalFile(PathBuf),
    /// Inline TOML.
    Inline,
    /// Environment variables with this prefix.
    Environment(String),
    /// A single `key=value` override.
    Override(String),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file {}", path.display()),
            Self::OptionalFile(path) => write!(f, "file {} (optional)", path.display()),
            Self::Inline => f.write_str("inline toml"),
            Self::Environment(prefix) => write!(f, "env {prefix}_*"),
            Self::Override(key) => write!(f, "override {key}"),
        }
    }
}

/// Collects configuration layers; lowest precedence first.
pub struct ConfigLoader {
    builder: ConfigBuilder<DefaultState>,
    env_prefix: Option<String>,
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: config::Config::builder(),
            env_prefix: None,
            sources: Vec::new(),
        }
    }

    /// Adds a TOML file; `build()` fails if it is missing or invalid.
    #[must_use]
    pub fn add_toml_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(path).format(FileFormat::Toml).required(true));
        self.sources.push(ConfigSource::File(path.to_path_buf()));
        self
    }

    /// Adds a TOML file that is skipped when absent.
    #[must_use]
    pub fn add_toml_file_optional<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        self.builder = self
            .builder
            .add_source(File::from(path).format(FileFormat::Toml).required(false));
        if path.is_file() {
            self.sources
                .push(ConfigSource::OptionalFile(path.to_path_buf()));
        }
        self
    }

    #[must_use]
    pub fn add_toml_str(mut self, content: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(content, FileFormat::Toml));
        self.sources.push(ConfigSource::Inline);
        self
    }

    /// Reads `<PREFIX>_<SECTION>__<KEY>` variables, e.g.
    /// `SNAPMIRROR_GIT__AUTHOR_NAME`. Applied after every file.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self.sources
            .push(ConfigSource::Environment(prefix.to_string()));
        self
    }

    /// Overrides a single dotted key. Overrides beat every other layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be parsed.
    pub fn set<T: Into<config::Value>>(mut self, key: &str, value: T) -> Result<Self> {
        self.builder = self
            .builder
            .set_override(key, value)
            .map_err(|e| anyhow::anyhow!("invalid override '{key}': {e}"))?;
        self.sources.push(ConfigSource::Override(key.to_string()));
        Ok(self)
    }

    /// Merges all layers into a [`ToolConfig`] and resolves its paths.
    ///
    /// # Errors
    ///
    /// Returns an error if a required file is missing, any layer is not valid
    /// TOML or does not fit `ToolConfig`, or the project home cannot be
    /// resolved.
    pub fn build(self) -> Result<ToolConfig> {
        let mut builder = self.builder;
        if let Some(prefix) = &self.env_prefix {
            builder = builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }
        let mut config: ToolConfig = builder.build()?.try_deserialize()?;
        config.resolve_and_validate()?;
        Ok(config)
    }

    /// Registered layers in precedence order.
    #[must_use]
    pub fn sources(&self) -> &[ConfigSource] {
        &self.sources
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
