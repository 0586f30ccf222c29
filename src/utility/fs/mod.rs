// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Filesystem utilities with parallel traversal and async copy.
//!
//! ```text
//! walk:   parallel_walk()          ignore::WalkParallel (multi-core)
//!         WalkOptions              pruned dir names and paths
//! copy:   copy_file_if_changed()   tokio::fs, skips identical content
//!         remove_empty_dirs()      deepest first
//! atomic: write_atomic()           temp file + rename in same dir
//! ```

pub mod atomic;
pub mod copy;
pub mod walk;

#[cfg(test)]
mod tests;
