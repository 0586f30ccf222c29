// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Makes the mirror's working tree equal to the selected source files.
//!
//! ```text
//! source/.gitignore?
//!    yes: git ls-files --cached --others --exclude-standard -z
//!    no:  parallel_walk(source), hidden included, no ignore files
//!           |
//!           v
//!    drop .git/ .snapshotter/ <mirror>/ and the exclusion floor
//!           |
//!           v
//!    delete mirror orphans ──> prune empty dirs ──> copy changed files
//! ```
//!
//! Orphans go first so a path can switch between file and directory.
//!
//! The exclusion floor cannot be configured away; it keeps dependency
//! trees, build output and credential-looking files out of every snapshot.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use super::state::STATE_DIR_NAME;
use crate::config::types::GitConfig;
use crate::core::process::{CommandRunner, ProcessBuilder};
use crate::error::{SnapResult, SyncError};
use crate::utility::fs::copy::{copy_file_if_changed, remove_empty_dirs};
use crate::utility::fs::walk::{WalkOptions, parallel_walk};

/// Patterns never copied into a mirror (gitignore syntax).
pub const EXCLUSION_FLOOR: &[&str] = &[
    "node_modules",
    "build",
    "*.env*",
    "*.pem",
    "*.key",
    "*.p12",
    "*.pfx",
    "*credentials*",
    "*secret*",
    "*.local",
];

/// Directory names never copied and never deleted from the mirror.
const RESERVED_DIRS: &[&str] = &[".git", STATE_DIR_NAME];

/// Outcome counts of one sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub copied: usize,
    pub unchanged: usize,
    pub removed: usize,
}

/// Mirrors a source tree into a mirror working tree.
#[derive(Debug, Clone)]
pub struct FileSynchronizer<R> {
    runner: R,
    git_program: PathBuf,
}

impl<R: CommandRunner> FileSynchronizer<R> {
    pub fn new(runner: R, git: &GitConfig) -> Self {
        Self {
            runner,
            git_program: git.program.clone(),
        }
    }

    /// Synchronizes `mirror` with `source`.
    ///
    /// Afterwards the mirror (outside `.git/` and `.snapshotter/`) contains
    /// exactly the selected source files.
    ///
    /// # Errors
    ///
    /// Returns a `SyncError` if the source is missing, listing fails, or a
    /// copy/delete fails.
    pub async fn sync(&self, source: &Path, mirror: &Path) -> SnapResult<SyncReport> {
        let source = std::fs::canonicalize(source)
            .map_err(|_| SyncError::SourceNotFound(source.display().to_string()))?;
        if !source.is_dir() {
            return Err(SyncError::SourceNotFound(source.display().to_string()).into());
        }
        std::fs::create_dir_all(mirror)?;
        let mirror = std::fs::canonicalize(mirror)?;

        let floor = exclusion_floor(&source)?;
        let mirror_rel = mirror.strip_prefix(&source).ok().map(Path::to_path_buf);

        let candidates = if source.join(".gitignore").is_file() {
            self.list_git_files(&source).await?
        } else {
            walk_files(&source, &mirror)?
        };
        let selected: BTreeSet<PathBuf> = candidates
            .into_iter()
            .filter(|rel| !is_reserved(rel))
            .filter(|rel| mirror_rel.as_ref().is_none_or(|m| !rel.starts_with(m)))
            .filter(|rel| !floor.matched_path_or_any_parents(rel, false).is_ignore())
            .collect();
        debug!(source = %source.display(), files = selected.len(), "selected files");

        let mut report = SyncReport {
            removed: remove_orphans(&mirror, &selected).await?,
            ..SyncReport::default()
        };
        for rel in &selected {
            let from = source.join(rel);
            let to = mirror.join(rel);
            let copied = copy_file_if_changed(&from, &to)
                .await
                .map_err(|e| SyncError::CopyFailed {
                    from: from.display().to_string(),
                    to: to.display().to_string(),
                    source: e,
                })?;
            if copied {
                report.copied += 1;
            } else {
                report.unchanged += 1;
            }
        }

        info!(
            copied = report.copied,
            unchanged = report.unchanged,
            removed = report.removed,
            "mirror synchronized"
        );
        Ok(report)
    }

    /// Tracked plus untracked-but-not-ignored files that exist on disk.
    async fn list_git_files(&self, source: &Path) -> SnapResult<Vec<PathBuf>> {
        let command = ProcessBuilder::new(&self.git_program)
            .name("git")
            .arg("-C")
            .arg(source)
            .args(["ls-files", "--cached", "--others", "--exclude-standard", "-z"])
            .env("GIT_TERMINAL_PROMPT", "0")
            .capture_output();
        let output = self
            .runner
            .run(command)
            .await
            .map_err(|e| SyncError::ListFailed {
                path: source.display().to_string(),
                source: e,
            })?;

        // Indexed files deleted from the working tree are still listed.
        Ok(output
            .stdout_bytes()
            .split(|byte| *byte == 0)
            .filter(|entry| !entry.is_empty())
            .map(path_from_bytes)
            .filter(|rel| source.join(rel).is_file())
            .collect())
    }
}

/// A path as git printed it; names need not be UTF-8.
#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

fn exclusion_floor(source: &Path) -> Result<Gitignore, SyncError> {
    let mut builder = GitignoreBuilder::new(source);
    for pattern in EXCLUSION_FLOOR {
        builder
            .add_line(None, pattern)
            .map_err(|e| SyncError::InvalidPattern {
                pattern: (*pattern).to_string(),
                message: e.to_string(),
            })?;
    }
    builder.build().map_err(|e| SyncError::InvalidPattern {
        pattern: EXCLUSION_FLOOR.join(" "),
        message: e.to_string(),
    })
}

fn is_reserved(rel: &Path) -> bool {
    rel.components().any(|c| match c {
        Component::Normal(name) => RESERVED_DIRS.iter().any(|r| name == *r),
        _ => false,
    })
}

/// Raw walk that never enters reserved directories or `skip`.
fn reserved_walk(skip: Option<&Path>) -> WalkOptions {
    WalkOptions::builder()
        .with_skip_dirs(RESERVED_DIRS.iter().map(|d| (*d).to_string()).collect())
        .with_skip_paths(skip.into_iter().map(Path::to_path_buf).collect())
        .build()
}

fn walk_files(source: &Path, mirror: &Path) -> SnapResult<Vec<PathBuf>> {
    let result = parallel_walk(source, &reserved_walk(Some(mirror)))?;
    if result.error_count() > 0 {
        warn!(errors = result.error_count(), "some source entries could not be read");
    }
    Ok(result
        .into_files()
        .into_iter()
        .filter_map(|path| path.strip_prefix(source).ok().map(Path::to_path_buf))
        .collect())
}

/// Deletes mirror files outside `selected`, then prunes empty directories.
async fn remove_orphans(mirror: &Path, selected: &BTreeSet<PathBuf>) -> SnapResult<usize> {
    let existing = parallel_walk(mirror, &reserved_walk(None))?;
    let mut removed = 0;
    for path in existing.files() {
        let Ok(rel) = path.strip_prefix(mirror) else {
            continue;
        };
        if selected.contains(rel) {
            continue;
        }
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| SyncError::RemoveFailed {
                path: path.display().to_string(),
                source: e,
            })?;
        debug!(path = %rel.display(), "removed from mirror");
        removed += 1;
    }

    remove_empty_dirs(mirror, existing.directories())
        .await
        .map_err(|e| SyncError::RemoveFailed {
            path: mirror.display().to_string(),
            source: e,
        })?;
    Ok(removed)
}
