// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parallel listing of every file below a directory.
//!
//! The walk is raw: hidden entries are included and ignore files are not
//! consulted. Callers decide what to keep; the walk only prunes whole
//! directories named in [`WalkOptions`].

use bon::Builder;
use flume::bounded;
use ignore::{DirEntry, WalkBuilder, WalkState};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Directories a walk never descends into.
#[derive(Debug, Clone, Default, Builder)]
pub struct WalkOptions {
    /// Pruned wherever a directory has this name.
    #[builder(setters(name = with_skip_dirs), default)]
    skip_dirs: Vec<String>,
    /// Pruned at exactly these paths.
    #[builder(setters(name = with_skip_paths), default)]
    skip_paths: Vec<PathBuf>,
}

impl WalkOptions {
    /// Everything except `.git`.
    #[must_use]
    pub fn raw_tree() -> Self {
        Self::builder()
            .with_skip_dirs(vec![".git".to_string()])
            .build()
    }

    fn prunes(&self, entry: &DirEntry) -> bool {
        entry.file_type().is_some_and(|ft| ft.is_dir())
            && (self.skip_dirs.iter().any(|d| entry.file_name() == OsStr::new(d))
                || self.skip_paths.iter().any(|p| entry.path() == p))
    }
}

/// Sorted files and directories found by [`parallel_walk`].
#[derive(Debug, Default)]
pub struct WalkResult {
    files: Vec<PathBuf>,
    directories: Vec<PathBuf>,
    error_count: usize,
}

impl WalkResult {
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Root excluded.
    #[must_use]
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// Entries that could not be read; they are skipped, not fatal.
    #[must_use]
    pub const fn error_count(&self) -> usize {
        self.error_count
    }

    #[must_use]
    pub fn into_files(self) -> Vec<PathBuf> {
        self.files
    }
}

enum Found {
    File(PathBuf),
    Dir(PathBuf),
}

/// Walks `root` on all cores with `ignore::WalkParallel`.
///
/// # Errors
///
/// Returns `NotFound` if `root` is not a directory.
///
/// # Example
/// ```no_run
/// use snapmirror::utility::fs::walk::{parallel_walk, WalkOptions};
///
/// let result = parallel_walk("/path/to/project", &WalkOptions::raw_tree())?;
/// println!("{} files", result.files().len());
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn parallel_walk<P: AsRef<Path>>(
    root: P,
    options: &WalkOptions,
) -> std::io::Result<WalkResult> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("root directory does not exist: {}", root.display()),
        ));
    }

    let pruning = options.clone();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .filter_entry(move |entry| !pruning.prunes(entry))
        .build_parallel();

    let (tx, rx) = bounded::<Found>(1024);
    let errors = AtomicUsize::new(0);

    // Walker threads block once the channel is full, so drain it alongside.
    let found = std::thread::scope(|scope| {
        let collector = scope.spawn(|| rx.iter().collect::<Vec<_>>());
        walker.run(|| {
            let tx = tx.clone();
            let errors = &errors;
            Box::new(move |entry| {
                match entry {
                    Ok(entry) if entry.depth() == 0 => {}
                    Ok(entry) => match entry.file_type() {
                        Some(ft) if ft.is_dir() => {
                            let _ = tx.send(Found::Dir(entry.into_path()));
                        }
                        Some(ft) if ft.is_file() => {
                            let _ = tx.send(Found::File(entry.into_path()));
                        }
                        _ => {}
                    },
                    Err(e) => {
                        warn!(error = %e, "walk error");
                        errors.fetch_add(1, Ordering::Relaxed);
                    }
                }
                WalkState::Continue
            })
        });
        drop(tx);
        collector.join().unwrap_or_default()
    });

    let mut result = WalkResult {
        error_count: errors.into_inner(),
        ..WalkResult::default()
    };
    for item in found {
        match item {
            Found::File(path) => result.files.push(path),
            Found::Dir(path) => result.directories.push(path),
        }
    }
    result.files.sort();
    result.directories.sort();
    Ok(result)
}
