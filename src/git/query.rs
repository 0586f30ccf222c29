// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git query operations using gix.
//!
//! ```text
//! query.rs --> gix --> .git/ (no subprocess)
//! ```
//!
//! Read-only lookups on the user's source repository. Everything that
//! changes the mirror goes through the git CLI in [`super::mirror`].

use std::path::Path;

use crate::error::{GitError, SnapResult};

fn query_error(path: &Path, err: &impl std::fmt::Display) -> GitError {
    GitError::Query {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

#[must_use]
pub fn is_git_repo(path: &Path) -> bool {
    gix::discover(path).is_ok()
}

/// Get current branch name (None if HEAD is detached).
///
/// # Errors
///
/// Returns a `GitError` if repository discovery or head resolution fails.
pub fn current_branch(path: &Path) -> SnapResult<Option<String>> {
    let repo = gix::discover(path).map_err(|e| query_error(path, &e))?;
    let head = repo.head_name().map_err(|e| query_error(path, &e))?;
    Ok(head.map(|name| name.shorten().to_string()))
}

/// Fetch URL of the `origin` remote, if configured.
///
/// # Errors
///
/// Returns a `GitError` if `path` is not inside a repository.
pub fn origin_url(path: &Path) -> SnapResult<Option<String>> {
    let repo = gix::discover(path).map_err(|e| query_error(path, &e))?;
    let Ok(remote) = repo.find_remote("origin") else {
        return Ok(None);
    };
    Ok(remote
        .url(gix::remote::Direction::Fetch)
        .map(|url| url.to_bstring().to_string()))
}
