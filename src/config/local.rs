// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-project configuration and project name detection.
//!
//! ```text
//! <source>/.snapmirror.json   { "projectName": "..." }     (optional marker)
//!            |
//!            v  else: slug of `origin` remote's last path segment
//!      project name
//!            |
//!            v
//! <home>/<project>/config.json   LocalConfig { version, projectName, remote, ... }
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::upgrade::{ConfigVersionUpgrader, UpgradeResult};
use crate::error::{ConfigError, SnapError, SnapResult};
use crate::utility::fs::atomic::write_json_atomic;

/// Marker file in a source tree naming its project.
pub const PROJECT_MARKER_FILE: &str = ".snapmirror.json";

/// Remote endpoint of the mirror. The access token is never stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
}

/// Persisted per-project configuration (`config.json`).
///
/// Fields this version does not know about are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalConfig {
    pub version: String,
    pub project_name: String,
    pub remote: RemoteConfig,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LocalConfig {
    /// Config as the current invocation wants it, before upgrading.
    #[must_use]
    pub fn desired(project_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            project_name: project_name.into(),
            remote: RemoteConfig { url: url.into() },
            extra: Map::new(),
        }
    }
}

/// Reads and writes one project's `config.json`.
#[derive(Debug, Clone)]
pub struct LocalConfigStore {
    path: PathBuf,
}

impl LocalConfigStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored config, `None` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or parsed.
    pub fn load(&self) -> SnapResult<Option<LocalConfig>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: self.path.display().to_string(),
                    source,
                }
                .into());
            }
        };
        serde_json::from_str(&content).map(Some).map_err(|e| {
            ConfigError::ParseError {
                path: self.path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Writes `config` atomically.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the write fails.
    pub fn save(&self, config: &LocalConfig) -> SnapResult<()> {
        write_json_atomic(&self.path, config)?;
        Ok(())
    }

    /// Loads, upgrades and (only when something changed) saves the config.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or saving fails.
    pub fn reconcile(
        &self,
        desired: &LocalConfig,
        upgrader: &ConfigVersionUpgrader,
    ) -> SnapResult<UpgradeResult> {
        let existing = self.load()?;
        let result = upgrader.upgrade(existing.as_ref(), desired);
        if result.should_write {
            tracing::info!(path = %self.path.display(), version = %result.config.version, "writing local config");
            self.save(&result.config)?;
        }
        Ok(result)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectMarker {
    project_name: Option<String>,
}

/// Determines the project name for a source directory.
///
/// Uses `projectName` from [`PROJECT_MARKER_FILE`] when present, otherwise
/// the slug of the `origin` remote's repository name. A source that is not
/// a git repository simply has no `origin`.
///
/// # Errors
///
/// Returns an error if the remote URL cannot be parsed.
pub fn detect_project_name(source: &Path) -> SnapResult<Option<String>> {
    if let Some(name) = read_marker(source) {
        return Ok(Some(name));
    }
    match crate::git::query::origin_url(source).ok().flatten() {
        Some(url) => project_name_from_url(&url),
        None => Ok(None),
    }
}

fn read_marker(source: &Path) -> Option<String> {
    let content = std::fs::read_to_string(source.join(PROJECT_MARKER_FILE)).ok()?;
    match serde_json::from_str::<ProjectMarker>(&content) {
        Ok(marker) => marker.project_name.filter(|name| !name.is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed {PROJECT_MARKER_FILE}");
            None
        }
    }
}

/// Writes the project marker into a source directory.
///
/// # Errors
///
/// Returns an I/O error if the write fails.
pub fn write_project_marker(source: &Path, project_name: &str) -> SnapResult<()> {
    write_json_atomic(
        &source.join(PROJECT_MARKER_FILE),
        &serde_json::json!({ "projectName": project_name }),
    )?;
    Ok(())
}

/// Extracts and slugifies the repository name of a remote URL.
///
/// `git@github.com:acme/My Repo.git` → `my-repo`.
///
/// # Errors
///
/// Returns an error if the repository-name pattern fails to compile.
pub fn project_name_from_url(url: &str) -> SnapResult<Option<String>> {
    let repo_segment = Regex::new(r"[/:]([^/:]+?)(?:\.git)?/?$").map_err(|e| {
        SnapError::other(format!("failed to compile repository name regex: {e}"))
    })?;

    let Some(segment) = repo_segment
        .captures(url.trim())
        .and_then(|captures| captures.get(1))
    else {
        return Ok(None);
    };
    let slug = slugify(segment.as_str());
    Ok((!slug.is_empty()).then_some(slug))
}

/// Lowercases, turns whitespace into `-`, drops anything outside
/// `[a-z0-9_-]` and collapses dashes.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for c in input.to_lowercase().chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        let allowed = c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-';
        if !allowed || (c == '-' && slug.ends_with('-')) {
            continue;
        }
        slug.push(c);
    }
    slug.trim_matches('-').to_string()
}
