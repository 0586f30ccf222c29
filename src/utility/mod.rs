// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Utility modules.
//!
//! ```text
//! fs
//!   walk:   parallel_walk(), WalkOptions
//!   copy:   copy_file_if_changed(), remove_empty_dirs()
//!   atomic: write_atomic(), write_json_atomic()
//! ```

pub mod fs;
