// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::atomic::{write_atomic, write_json_atomic};
use super::copy::{copy_file_if_changed, files_identical, remove_empty_dirs};
use super::walk::{WalkOptions, parallel_walk};
use std::path::Path;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(path, content).expect("write");
}

fn relative_names(root: &Path, paths: &[std::path::PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .expect("under root")
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[test]
fn test_raw_tree_walk_includes_hidden_and_ignored() {
    let temp = temp_dir();
    write(temp.path(), ".gitignore", "ignored.txt\n");
    write(temp.path(), "ignored.txt", "");
    write(temp.path(), ".hidden/config", "");
    write(temp.path(), "src/main.rs", "");
    write(temp.path(), ".git/HEAD", "");

    let result = parallel_walk(temp.path(), &WalkOptions::raw_tree()).expect("walk");

    assert_eq!(
        relative_names(temp.path(), result.files()),
        vec![".gitignore", ".hidden/config", "ignored.txt", "src/main.rs"]
    );
    assert_eq!(result.error_count(), 0);
    assert_eq!(
        relative_names(temp.path(), result.directories()),
        vec![".hidden", "src"]
    );
}

#[test]
fn test_walk_skip_paths_prunes_subtree() {
    let temp = temp_dir();
    write(temp.path(), "keep/a.txt", "");
    write(temp.path(), "mirror/b.txt", "");

    let options = WalkOptions::builder()
        .with_skip_paths(vec![temp.path().join("mirror")])
        .build();
    let result = parallel_walk(temp.path(), &options).expect("walk");

    assert_eq!(relative_names(temp.path(), result.files()), vec!["keep/a.txt"]);
}

#[test]
fn test_walk_many_files_does_not_stall() {
    let temp = temp_dir();
    for i in 0..1500 {
        write(temp.path(), &format!("d{}/f{i}.txt", i % 7), "x");
    }
    let result = parallel_walk(temp.path(), &WalkOptions::raw_tree()).expect("walk");
    assert_eq!(result.files().len(), 1500);
}

#[test]
fn test_walk_missing_root() {
    let temp = temp_dir();
    let err = parallel_walk(temp.path().join("nope"), &WalkOptions::default())
        .expect_err("missing root should fail");
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

#[tokio::test]
async fn test_copy_file_if_changed_skips_identical() {
    let temp = temp_dir();
    write(temp.path(), "src/a.txt", "hello");
    let src = temp.path().join("src/a.txt");
    let dst = temp.path().join("dst/nested/a.txt");

    assert!(copy_file_if_changed(&src, &dst).await.expect("first copy"));
    assert!(files_identical(&src, &dst).await.expect("compare"));
    assert!(!copy_file_if_changed(&src, &dst).await.expect("second copy"));

    write(temp.path(), "src/a.txt", "hellp");
    assert!(!files_identical(&src, &dst).await.expect("compare"));
    assert!(copy_file_if_changed(&src, &dst).await.expect("third copy"));
    assert_eq!(std::fs::read_to_string(&dst).expect("read"), "hellp");
}

#[tokio::test]
async fn test_copy_replaces_directory_with_file() {
    let temp = temp_dir();
    write(temp.path(), "src/item", "file now");
    write(temp.path(), "dst/item/old.txt", "was a dir");

    let copied = copy_file_if_changed(&temp.path().join("src/item"), &temp.path().join("dst/item"))
        .await
        .expect("copy");
    assert!(copied);
    assert!(temp.path().join("dst/item").is_file());
}

#[tokio::test]
async fn test_remove_empty_dirs_deepest_first() {
    let temp = temp_dir();
    let root = temp.path();
    std::fs::create_dir_all(root.join("a/b/c")).expect("mkdir");
    write(root, "keep/file.txt", "");

    let dirs = vec![
        root.to_path_buf(),
        root.join("a"),
        root.join("a/b"),
        root.join("a/b/c"),
        root.join("keep"),
    ];
    let removed = remove_empty_dirs(root, &dirs).await.expect("prune");

    assert_eq!(removed, 3);
    assert!(!root.join("a").exists());
    assert!(root.join("keep/file.txt").exists());
    assert!(root.exists());
}

#[test]
fn test_write_atomic_replaces_content_and_leaves_no_temp() {
    let temp = temp_dir();
    let target = temp.path().join("state/pending.json");

    write_atomic(&target, b"one").expect("first write");
    write_json_atomic(&target, &serde_json::json!({"n": 2})).expect("second write");

    assert_eq!(
        std::fs::read_to_string(&target).expect("read"),
        "{\n  \"n\": 2\n}\n"
    );
    let leftovers: Vec<_> = std::fs::read_dir(temp.path().join("state"))
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}
