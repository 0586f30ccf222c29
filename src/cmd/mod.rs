// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   snapshot, init, status, check, unlock, worker
//! ```
//!
//! Commands that act on a mirror find it the same way:
//!
//! ```text
//! --mirror DIR ──────────────────────────────► DIR
//! --source DIR (or cwd) ─► project name ─► <home>/<project>/mirror
//! ```

pub mod check;
pub mod init;
pub mod snapshot;
pub mod status;
pub mod unlock;
pub mod worker;

use std::path::{Path, PathBuf};

use crate::cli::project::MirrorArgs;
use crate::config::ToolConfig;
use crate::config::local::detect_project_name;
use crate::config::paths::ProjectLayout;
use crate::error::{ConfigError, SnapResult};

/// Source directory argument, falling back to the working directory.
///
/// # Errors
///
/// Returns an I/O error if no source was given and the working directory
/// cannot be read.
pub fn source_dir(source: Option<&Path>) -> SnapResult<PathBuf> {
    match source {
        Some(source) => Ok(source.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Detects the project of `source` and returns its name and layout.
///
/// # Errors
///
/// Returns `ConfigError::ProjectNotDetected` if neither a project marker nor
/// an `origin` remote names the project.
pub fn resolve_project(source: &Path, config: &ToolConfig) -> SnapResult<(String, ProjectLayout)> {
    let name = detect_project_name(source)?
        .ok_or_else(|| ConfigError::ProjectNotDetected(source.display().to_string()))?;
    let layout = config.paths.project(&name);
    tracing::debug!(project = %name, home = %layout.root().display(), "resolved project");
    Ok((name, layout))
}

/// Resolves the mirror directory selected by [`MirrorArgs`].
///
/// # Errors
///
/// Returns an error if no `--mirror` was given and the project cannot be
/// detected.
pub fn resolve_mirror(args: &MirrorArgs, config: &ToolConfig) -> SnapResult<PathBuf> {
    if let Some(mirror) = &args.mirror {
        return Ok(mirror.clone());
    }
    let source = source_dir(args.source.as_deref())?;
    let (_, layout) = resolve_project(&source, config)?;
    Ok(layout.mirror_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_dir_prefers_argument_then_working_dir() {
        let explicit = source_dir(Some(Path::new("/srv/app"))).unwrap();
        assert_eq!(explicit, PathBuf::from("/srv/app"));

        let fallback = source_dir(None).unwrap();
        assert_eq!(fallback, std::env::current_dir().unwrap());
        assert_ne!(fallback, PathBuf::from("."));
    }
}
