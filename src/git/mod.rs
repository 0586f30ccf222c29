// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!         Public API
//!     query.rs     mirror.rs
//!        |             |
//!        v             v
//!   gix (read)    CommandRunner --> git CLI (write)
//!   .is_git_repo   MirrorRepository
//!   .branch          .commit
//!   .origin_url      .push
//!                    .head_commit_count
//! ```
//!
//! **query** — pure Rust, no subprocess, read-only, used on the source tree.
//! **mirror** — git CLI for everything that changes the mirror repository.

pub mod mirror;
pub mod query;

pub use mirror::MirrorRepository;

#[cfg(test)]
mod tests;
