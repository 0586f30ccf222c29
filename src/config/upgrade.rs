// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Version-aware migration of the per-project `config.json`.
//!
//! ```text
//! upgrade(existing?, desired)
//!   start = existing | desired @ 0.0.0
//!   for m in migrations (ordered):
//!       start.version < m.to <= tool_version  →  m.run(), stamp m.to
//!   overwrite projectName, remote, version = tool_version
//!   should_write = existing differs in (version, projectName, remote.url)
//! ```

use std::cmp::Ordering;
use std::fmt;

use super::local::LocalConfig;

/// Version stamped on a config that did not exist before.
pub const INITIAL_VERSION: &str = "0.0.0";

/// Loosely parsed dotted version.
///
/// Text after the first `-` is dropped; missing and non-numeric components
/// count as zero, so `"1.2"`, `"1.2.0"` and `"1.2.x-beta"` compare equal.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parts: Vec<u64>,
}

impl Version {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let core = raw.split('-').next().unwrap_or(raw);
        let parts = core
            .split('.')
            .map(|part| part.trim().parse::<u64>().unwrap_or(0))
            .collect();
        Self {
            raw: raw.to_string(),
            parts,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn part(&self, index: usize) -> u64 {
        self.parts.get(index).copied().unwrap_or(0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.part(i).cmp(&other.part(i)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for Version {}

/// Compares two version strings with [`Version`] semantics.
#[must_use]
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    Version::parse(left).cmp(&Version::parse(right))
}

/// One schema step. `run` receives the config being migrated and the
/// desired config of the current invocation.
#[derive(Clone)]
pub struct Migration {
    pub to_version: &'static str,
    pub run: fn(LocalConfig, &LocalConfig) -> LocalConfig,
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("to_version", &self.to_version)
            .finish_non_exhaustive()
    }
}

/// Outcome of [`ConfigVersionUpgrader::upgrade`].
#[derive(Debug, Clone, PartialEq)]
pub struct UpgradeResult {
    pub config: LocalConfig,
    pub should_write: bool,
}

/// Brings a stored `LocalConfig` up to the running tool's version.
#[derive(Debug, Clone)]
pub struct ConfigVersionUpgrader {
    tool_version: String,
    migrations: Vec<Migration>,
}

impl ConfigVersionUpgrader {
    /// Upgrader for `tool_version` with the built-in migration list.
    #[must_use]
    pub fn new(tool_version: impl Into<String>) -> Self {
        Self {
            tool_version: tool_version.into(),
            migrations: builtin_migrations(),
        }
    }

    /// Upgrader for the version of this binary.
    #[must_use]
    pub fn current() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }

    /// Replaces the migration list. Order is application order.
    #[must_use]
    pub fn with_migrations(mut self, migrations: Vec<Migration>) -> Self {
        self.migrations = migrations;
        self
    }

    #[must_use]
    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    #[must_use]
    pub fn upgrade(&self, existing: Option<&LocalConfig>, desired: &LocalConfig) -> UpgradeResult {
        let starting = existing.cloned().unwrap_or_else(|| LocalConfig {
            version: INITIAL_VERSION.to_string(),
            ..desired.clone()
        });

        let mut config = self.apply_migrations(starting, desired);
        config.project_name.clone_from(&desired.project_name);
        config.remote = desired.remote.clone();
        config.version.clone_from(&self.tool_version);

        let should_write = !existing.is_some_and(|old| {
            old.version == config.version
                && old.project_name == config.project_name
                && old.remote.url == config.remote.url
        });

        UpgradeResult {
            config,
            should_write,
        }
    }

    fn apply_migrations(&self, mut config: LocalConfig, desired: &LocalConfig) -> LocalConfig {
        let tool = Version::parse(&self.tool_version);
        for migration in &self.migrations {
            let target = Version::parse(migration.to_version);
            if Version::parse(&config.version) < target && tool >= target {
                tracing::debug!(
                    from = %config.version,
                    to = migration.to_version,
                    "migrating local config"
                );
                config = (migration.run)(config, desired);
                config.version = migration.to_version.to_string();
            }
        }
        config
    }
}

/// Schema changes shipped with this release. None so far.
const fn builtin_migrations() -> Vec<Migration> {
    Vec::new()
}
