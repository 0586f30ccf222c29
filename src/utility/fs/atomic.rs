// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{self, Write};
use std::path::Path;

/// Writes `data` to `target` atomically: temp file in the same directory,
/// fsync, then rename over the target.
///
/// Readers observe either the old or the new content, never a partial file.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or any step of
/// the write/rename fails.
pub fn write_atomic(target: &Path, data: &[u8]) -> io::Result<()> {
    let parent = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".tmp")
        .tempfile_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// Serializes `value` as pretty JSON with a trailing newline and writes it
/// atomically.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json_atomic<T: serde::Serialize>(target: &Path, value: &T) -> io::Result<()> {
    let mut json = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    json.push(b'\n');
    write_atomic(target, &json)
}
