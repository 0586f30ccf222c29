// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;

const COMPARE_CHUNK: usize = 64 * 1024;

/// Returns true if both files exist with the same size and bytes.
///
/// # Errors
///
/// Returns an error if `src` cannot be read. A missing `dst` is reported as
/// `Ok(false)`.
pub async fn files_identical(src: &Path, dst: &Path) -> io::Result<bool> {
    let src_meta = fs::metadata(src).await?;
    let dst_meta = match fs::metadata(dst).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if !dst_meta.is_file() || src_meta.len() != dst_meta.len() {
        return Ok(false);
    }

    let mut a = fs::File::open(src).await?;
    let mut b = fs::File::open(dst).await?;
    let mut buf_a = vec![0_u8; COMPARE_CHUNK];
    let mut buf_b = vec![0_u8; COMPARE_CHUNK];
    loop {
        let n = a.read(&mut buf_a).await?;
        if n == 0 {
            return Ok(true);
        }
        b.read_exact(&mut buf_b[..n]).await?;
        if buf_a[..n] != buf_b[..n] {
            return Ok(false);
        }
    }
}

/// Copies `src` to `dst` unless `dst` already holds identical content.
///
/// Parent directories of `dst` are created. A directory sitting where the
/// file should go is removed first.
///
/// Returns `true` if the file was written.
///
/// # Example
/// ```no_run
/// use snapmirror::utility::fs::copy::copy_file_if_changed;
/// use std::path::Path;
///
/// # async fn example() -> std::io::Result<()> {
/// let copied = copy_file_if_changed(Path::new("src/a.rs"), Path::new("/mirror/src/a.rs")).await?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns an error if any IO operation fails (creating directory, reading, copying).
pub async fn copy_file_if_changed(src: &Path, dst: &Path) -> io::Result<bool> {
    if files_identical(src, dst).await? {
        return Ok(false);
    }
    if fs::metadata(dst).await.is_ok_and(|meta| meta.is_dir()) {
        fs::remove_dir_all(dst).await?;
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::copy(src, dst).await?;
    Ok(true)
}

/// Removes empty directories below `root`, deepest first.
///
/// `root` itself is kept. Directories that are not empty are left alone.
///
/// # Errors
///
/// Returns an error if reading a directory fails.
pub async fn remove_empty_dirs(root: &Path, dirs: &[std::path::PathBuf]) -> io::Result<usize> {
    let mut sorted: Vec<_> = dirs.iter().filter(|d| d.as_path() != root).collect();
    // deepest first
    sorted.sort_by_key(|d| std::cmp::Reverse(d.components().count()));

    let mut removed = 0;
    for dir in sorted {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if entries.next_entry().await?.is_none() {
            fs::remove_dir(dir).await?;
            removed += 1;
        }
    }
    Ok(removed)
}
