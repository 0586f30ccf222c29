// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::cmp::Ordering;
use std::path::PathBuf;

use super::local::{LocalConfig, LocalConfigStore, project_name_from_url, slugify};
use super::upgrade::{ConfigVersionUpgrader, INITIAL_VERSION, Migration, compare_versions};
use super::loader::ConfigSource;
use super::{ConfigLoader, PathsConfig, ToolConfig};
use crate::config::types::SnapshotMode;
use crate::logging::LogLevel;

#[test]
fn test_default_config() {
    let config = ToolConfig::default();
    assert_eq!(config.global.output_log_level, LogLevel::INFO);
    assert_eq!(config.snapshot.mode, SnapshotMode::Async);
    assert!(config.snapshot.skip_on_ci);
    assert_eq!(config.git.program, PathBuf::from("git"));
}

#[test]
fn test_snapshot_mode_parse() {
    assert_eq!("sync".parse::<SnapshotMode>().unwrap(), SnapshotMode::Sync);
    assert_eq!("ASYNC".parse::<SnapshotMode>().unwrap(), SnapshotMode::Async);
    assert!("eventually".parse::<SnapshotMode>().is_err());
    assert_eq!(SnapshotMode::Sync.to_string(), "sync");
}

#[test]
fn test_parse_toml() {
    let config = ToolConfig::parse(
        r#"
[global]
output_log_level = 4

[paths]
home = "/srv/snapshots"

[git]
author_name = "ci-bot"

[snapshot]
mode = "sync"
skip_on_ci = false
"#,
    )
    .unwrap();
    assert_eq!(config.global.output_log_level, LogLevel::DEBUG);
    assert_eq!(config.paths.home(), PathBuf::from("/srv/snapshots"));
    assert_eq!(config.git.author_name, "ci-bot");
    assert_eq!(config.git.author_email, "snapmirror@localhost");
    assert_eq!(config.snapshot.mode, SnapshotMode::Sync);
    assert!(!config.snapshot.skip_on_ci);
}

#[test]
fn test_unknown_section_key_rejected() {
    assert!(ToolConfig::parse("[snapshot]\nmood = \"sync\"\n").is_err());
}

#[test]
fn test_invalid_log_level_rejected() {
    assert!(ToolConfig::parse("[global]\noutput_log_level = 9\n").is_err());
}

#[test]
fn test_overrides_win_over_files() {
    let config = ConfigLoader::new()
        .add_toml_str("[snapshot]\nmode = \"async\"\n")
        .set("snapshot.mode", "sync")
        .unwrap()
        .set("paths.home", "/tmp/snaps")
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.snapshot.mode, SnapshotMode::Sync);
    assert_eq!(config.paths.project("app").root(), PathBuf::from("/tmp/snaps/app"));
}

#[test]
fn test_later_file_wins() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.toml");
    let second = dir.path().join("second.toml");
    std::fs::write(&first, "[git]\nauthor_name = \"first\"\nauthor_email = \"a@b\"\n").unwrap();
    std::fs::write(&second, "[git]\nauthor_name = \"second\"\n").unwrap();

    let loader = ConfigLoader::new()
        .add_toml_file(&first)
        .add_toml_file(&second)
        .add_toml_file_optional(dir.path().join("missing.toml"));
    assert_eq!(
        loader.sources(),
        [ConfigSource::File(first.clone()), ConfigSource::File(second.clone())]
    );

    let config = loader.build().unwrap();
    assert_eq!(config.git.author_name, "second");
    assert_eq!(config.git.author_email, "a@b");
}

#[test]
fn test_missing_required_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ToolConfig::from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_project_layout() {
    let mut paths = PathsConfig {
        home: Some(PathBuf::from("/data/snapmirror")),
    };
    paths.resolve().unwrap();
    let layout = paths.project("widget");
    assert_eq!(layout.root(), PathBuf::from("/data/snapmirror/widget"));
    assert_eq!(
        layout.config_file(),
        PathBuf::from("/data/snapmirror/widget/config.json")
    );
    assert_eq!(
        layout.mirror_dir(),
        PathBuf::from("/data/snapmirror/widget/mirror")
    );
}

#[test]
fn test_compare_versions() {
    assert_eq!(compare_versions("1.2.0", "1.2"), Ordering::Equal);
    assert_eq!(compare_versions("1.10.0", "1.9.9"), Ordering::Greater);
    assert_eq!(compare_versions("0.9", "1.0.0"), Ordering::Less);
    assert_eq!(compare_versions("2.0.0-beta.1", "2.0.0"), Ordering::Equal);
    assert_eq!(compare_versions("1.x", "1.0"), Ordering::Equal);
}

#[test]
fn test_upgrade_fresh_config_is_written() {
    let upgrader = ConfigVersionUpgrader::new("1.0.0");
    let desired = LocalConfig::desired("app", "https://example.com/app.git");
    let result = upgrader.upgrade(None, &desired);
    assert!(result.should_write);
    assert_eq!(result.config.version, "1.0.0");
    assert_eq!(result.config.project_name, "app");
}

#[test]
fn test_upgrade_unchanged_config_not_written() {
    let upgrader = ConfigVersionUpgrader::new("1.0.0");
    let desired = LocalConfig::desired("app", "https://example.com/app.git");
    let first = upgrader.upgrade(None, &desired).config;
    let second = upgrader.upgrade(Some(&first), &desired);
    assert!(!second.should_write);
    assert_eq!(second.config, first);
}

#[test]
fn test_upgrade_remote_change_written() {
    let upgrader = ConfigVersionUpgrader::new("1.0.0");
    let stored = upgrader
        .upgrade(None, &LocalConfig::desired("app", "https://old.example.com/app.git"))
        .config;
    let result = upgrader.upgrade(
        Some(&stored),
        &LocalConfig::desired("app", "https://new.example.com/app.git"),
    );
    assert!(result.should_write);
    assert_eq!(result.config.remote.url, "https://new.example.com/app.git");
}

fn tag_migrated(mut config: LocalConfig, _desired: &LocalConfig) -> LocalConfig {
    config
        .extra
        .insert("migrated".to_string(), serde_json::Value::Bool(true));
    config
}

#[test]
fn test_upgrade_runs_migrations_in_window() {
    let migrations = vec![
        Migration {
            to_version: "0.5.0",
            run: tag_migrated,
        },
        Migration {
            to_version: "3.0.0",
            run: |mut config, _| {
                config.extra.insert("future".to_string(), serde_json::Value::Null);
                config
            },
        },
    ];
    let upgrader = ConfigVersionUpgrader::new("1.0.0").with_migrations(migrations);
    let mut stored = LocalConfig::desired("app", "https://example.com/app.git");
    stored.version = "0.1.0".to_string();

    let result = upgrader.upgrade(Some(&stored), &stored.clone());
    assert!(result.should_write);
    assert_eq!(result.config.version, "1.0.0");
    assert_eq!(
        result.config.extra.get("migrated"),
        Some(&serde_json::Value::Bool(true))
    );
    assert!(!result.config.extra.contains_key("future"));
}

#[test]
fn test_upgrade_skips_migrations_already_applied() {
    let upgrader = ConfigVersionUpgrader::new("1.0.0").with_migrations(vec![Migration {
        to_version: "0.5.0",
        run: tag_migrated,
    }]);
    let mut stored = LocalConfig::desired("app", "https://example.com/app.git");
    stored.version = "0.7.0".to_string();
    let result = upgrader.upgrade(Some(&stored), &stored.clone());
    assert!(!result.config.extra.contains_key("migrated"));
}

#[test]
fn test_new_config_starts_at_initial_version() {
    let upgrader = ConfigVersionUpgrader::new("1.0.0").with_migrations(vec![Migration {
        to_version: "0.0.1",
        run: tag_migrated,
    }]);
    assert_eq!(INITIAL_VERSION, "0.0.0");
    let result = upgrader.upgrade(None, &LocalConfig::desired("app", "u"));
    assert!(result.config.extra.contains_key("migrated"));
}

#[test]
fn test_store_round_trip_preserves_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app").join("config.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{"version":"0.1.0","projectName":"app","remote":{"url":"https://e.com/a.git"},"owner":"qa"}"#,
    )
    .unwrap();

    let store = LocalConfigStore::new(&path);
    let result = store
        .reconcile(
            &LocalConfig::desired("app", "https://e.com/a.git"),
            &ConfigVersionUpgrader::new("0.2.0"),
        )
        .unwrap();
    assert!(result.should_write);

    let stored = store.load().unwrap().unwrap();
    assert_eq!(stored.version, "0.2.0");
    assert_eq!(stored.extra.get("owner"), Some(&serde_json::json!("qa")));
}

#[test]
fn test_store_missing_and_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalConfigStore::new(dir.path().join("config.json"));
    assert!(store.load().unwrap().is_none());

    std::fs::write(store.path(), "{ not json").unwrap();
    assert!(store.load().is_err());
}

#[test]
fn test_slugify() {
    assert_eq!(slugify("My Repo"), "my-repo");
    assert_eq!(slugify("  Foo__Bar!! baz "), "foo__bar-baz");
    assert_eq!(slugify("a -- b"), "a-b");
    assert_eq!(slugify("***"), "");
    assert_eq!(slugify("Tab\tSeparated\nName"), "tab-separated-name");
    assert_eq!(slugify("-Über Tool-"), "ber-tool");
}

#[test]
fn test_project_name_from_url() {
    assert_eq!(
        project_name_from_url("https://github.com/acme/Widget.git").unwrap().as_deref(),
        Some("widget")
    );
    assert_eq!(
        project_name_from_url("git@github.com:acme/My Repo.git").unwrap().as_deref(),
        Some("my-repo")
    );
    assert_eq!(
        project_name_from_url("https://example.com/team/tool/").unwrap().as_deref(),
        Some("tool")
    );
    assert_eq!(project_name_from_url("nothing").unwrap(), None);
}
