// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.
//!
//! Tests the tool config layers and the per-project config store.

use snapmirror::config::ToolConfig;
use snapmirror::config::local::{
    LocalConfig, LocalConfigStore, PROJECT_MARKER_FILE, detect_project_name, write_project_marker,
};
use snapmirror::config::loader::ConfigLoader;
use snapmirror::config::types::SnapshotMode;
use snapmirror::config::upgrade::ConfigVersionUpgrader;
use snapmirror::logging::LogLevel;
use std::path::PathBuf;
use std::process::Command;

// =============================================================================
// Tool configuration
// =============================================================================

#[test]
fn config_parse_minimal() {
    let config = ToolConfig::parse("[paths]\nhome = \"/snapshots\"\n").unwrap();
    assert_eq!(config.paths.home(), PathBuf::from("/snapshots"));
    assert_eq!(config.snapshot.mode, SnapshotMode::Async);
    assert_eq!(config.global.file_log_level, LogLevel::TRACE);
}

#[test]
fn config_default_home_is_resolved() {
    let config = ToolConfig::parse("").unwrap();
    assert!(config.paths.home().is_absolute());
    assert!(config.paths.home().ends_with(".snapmirror"));
}

#[test]
fn config_tilde_home_expanded() {
    let config = ToolConfig::parse("[paths]\nhome = \"~/snaps\"\n").unwrap();
    assert!(config.paths.home().is_absolute());
    assert!(config.paths.home().ends_with("snaps"));
}

#[test]
fn config_loader_with_env_prefix() {
    // SAFETY: the variable name is unique to this test.
    unsafe {
        std::env::set_var("SNAPMIRRORTEST_SNAPSHOT__MODE", "sync");
    }

    let config = ConfigLoader::new()
        .add_toml_str("[snapshot]\nmode = \"async\"\n")
        .with_env_prefix("SNAPMIRRORTEST")
        .build()
        .expect("build should succeed");

    // SAFETY: same as above
    unsafe {
        std::env::remove_var("SNAPMIRRORTEST_SNAPSHOT__MODE");
    }

    assert_eq!(config.snapshot.mode, SnapshotMode::Sync);
}

// =============================================================================
// Project configuration
// =============================================================================

fn git(dir: &std::path::Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {args:?} failed");
}

#[test]
fn project_name_from_marker_wins_over_origin() {
    let source = tempfile::tempdir().unwrap();
    git(source.path(), &["init", "--quiet"]);
    git(
        source.path(),
        &["remote", "add", "origin", "https://github.com/acme/Widget-Service.git"],
    );
    assert_eq!(
        detect_project_name(source.path()).unwrap().as_deref(),
        Some("widget-service")
    );

    write_project_marker(source.path(), "custom").unwrap();
    assert!(source.path().join(PROJECT_MARKER_FILE).is_file());
    assert_eq!(detect_project_name(source.path()).unwrap().as_deref(), Some("custom"));
}

#[test]
fn project_name_missing_without_marker_or_origin() {
    let source = tempfile::tempdir().unwrap();
    assert_eq!(detect_project_name(source.path()).unwrap(), None);
}

#[test]
fn local_config_reconcile_writes_once() {
    let home = tempfile::tempdir().unwrap();
    let config = ToolConfig::parse(&format!(
        "[paths]\nhome = {:?}\n",
        home.path().display().to_string()
    ))
    .unwrap();
    let layout = config.paths.project("app");
    let store = LocalConfigStore::new(layout.config_file());
    let upgrader = ConfigVersionUpgrader::current();
    let desired = LocalConfig::desired("app", "https://example.com/app.git");

    assert!(store.reconcile(&desired, &upgrader).unwrap().should_write);
    let written = std::fs::read_to_string(store.path()).unwrap();
    assert!(written.contains("\"projectName\": \"app\""));
    assert!(!written.contains("token"));

    assert!(!store.reconcile(&desired, &upgrader).unwrap().should_write);
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), written);
}
