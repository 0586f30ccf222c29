// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::config::types::GitConfig;
use crate::core::process::{CommandRunner, ProcessBuilder, ProcessOutput};
use crate::error::ProcessError;
use crate::git::mirror::{MirrorRepository, authenticated_url};
use crate::git::query::{current_branch, is_git_repo, origin_url};
use crate::snapshot::model::RemoteCredentials;
use std::future::Future;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Strips `-C <dir>` and `-c <key=value>` so only the git subcommand remains.
fn subcommand(args: &[String]) -> String {
    let mut rest = args.iter();
    let mut out = Vec::new();
    while let Some(arg) = rest.next() {
        if out.is_empty() && (arg == "-C" || arg == "-c") {
            rest.next();
            continue;
        }
        out.push(arg.as_str());
    }
    out.join(" ")
}

/// Records every git subcommand (masked) and answers from a script keyed by
/// subcommand prefix. Unscripted commands succeed with empty output.
#[derive(Clone, Default)]
struct ScriptedRunner {
    calls: Arc<Mutex<Vec<String>>>,
    script: Arc<Vec<(String, ProcessOutput)>>,
}

impl ScriptedRunner {
    fn with_script(script: &[(&str, ProcessOutput)]) -> Self {
        Self {
            calls: Arc::default(),
            script: Arc::new(
                script
                    .iter()
                    .map(|(prefix, output)| ((*prefix).to_string(), output.clone()))
                    .collect(),
            ),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(
        &self,
        command: ProcessBuilder,
    ) -> impl Future<Output = Result<ProcessOutput, ProcessError>> + Send {
        let sub = subcommand(command.arguments());
        self.calls
            .lock()
            .expect("calls lock")
            .push(command.redact(&sub));
        let output = self
            .script
            .iter()
            .find(|(prefix, _)| sub.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_default();
        let result = if command.is_success_code(output.exit_code()) {
            Ok(output)
        } else {
            Err(command.failure(&output))
        };
        async move { result }
    }
}

fn failed(code: i32, stderr: &str) -> ProcessOutput {
    ProcessOutput::new(code, String::new(), stderr.to_string())
}

fn remote() -> RemoteCredentials {
    RemoteCredentials::new("https://example.com/acme/app.git", "s3cr3t")
}

#[tokio::test]
async fn test_commit_unchanged_tree_returns_false() {
    let temp = temp_dir();
    let runner = ScriptedRunner::default();
    let repo = MirrorRepository::new(runner.clone(), GitConfig::default());

    let committed = repo.commit(temp.path()).await.expect("commit");

    assert!(!committed);
    assert_eq!(
        runner.calls(),
        vec!["init --quiet", "add -A", "status --porcelain"]
    );
    let exclude = std::fs::read_to_string(temp.path().join(".git/info/exclude"))
        .expect("exclude written");
    assert!(exclude.contains("/.snapshotter/pending.json"));
    assert!(exclude.contains("/.snapshotter/snapshot.lock"));
    assert!(!exclude.contains("testResults.json"));
}

#[tokio::test]
async fn test_commit_with_changes_commits_snapshot() {
    let temp = temp_dir();
    std::fs::create_dir_all(temp.path().join(".git")).expect("mkdir");
    std::fs::write(temp.path().join(".git/index.lock"), "").expect("lock");
    let runner =
        ScriptedRunner::with_script(&[("status", ProcessOutput::ok(" M src/lib.rs\n"))]);
    let repo = MirrorRepository::new(runner.clone(), GitConfig::default());

    let committed = repo.commit(temp.path()).await.expect("commit");

    assert!(committed);
    assert!(!temp.path().join(".git/index.lock").exists());
    let calls = runner.calls();
    assert_eq!(calls[0], "add -A");
    assert_eq!(calls[1], "status --porcelain");
    assert!(calls[2].starts_with("commit --quiet -m Snapshot 20"));
}

#[tokio::test]
async fn test_commit_keeps_existing_exclude_entries() {
    let temp = temp_dir();
    std::fs::create_dir_all(temp.path().join(".git/info")).expect("mkdir");
    std::fs::write(temp.path().join(".git/info/exclude"), "*.swp").expect("write");
    let repo = MirrorRepository::new(ScriptedRunner::default(), GitConfig::default());

    repo.commit(temp.path()).await.expect("first commit");
    repo.commit(temp.path()).await.expect("second commit");

    let exclude =
        std::fs::read_to_string(temp.path().join(".git/info/exclude")).expect("read");
    assert!(exclude.starts_with("*.swp\n"));
    assert_eq!(exclude.matches("/.snapshotter/lastError.json").count(), 1);
}

#[tokio::test]
async fn test_push_new_remote_without_branch() {
    let temp = temp_dir();
    let runner = ScriptedRunner::with_script(&[
        ("remote get-url", failed(2, "error: No such remote 'origin'")),
        ("rev-parse", ProcessOutput::ok("main\n")),
    ]);
    let repo = MirrorRepository::new(runner.clone(), GitConfig::default());

    repo.push(temp.path(), &remote()).await.expect("push");

    assert_eq!(
        runner.calls(),
        vec![
            "remote get-url origin",
            "remote add origin https://***@example.com/acme/app.git",
            "fetch --quiet origin",
            "rev-parse --abbrev-ref HEAD",
            "ls-remote --heads origin main",
            "push --quiet -u origin HEAD",
        ]
    );
}

#[tokio::test]
async fn test_push_updates_changed_url_and_rebases() {
    let temp = temp_dir();
    let runner = ScriptedRunner::with_script(&[
        ("remote get-url", ProcessOutput::ok("https://old@example.com/x.git\n")),
        ("rev-parse", ProcessOutput::ok("main\n")),
        ("ls-remote", ProcessOutput::ok("abc123\trefs/heads/main\n")),
    ]);
    let repo = MirrorRepository::new(runner.clone(), GitConfig::default());

    repo.push(temp.path(), &remote()).await.expect("push");

    let calls = runner.calls();
    assert_eq!(
        calls[1],
        "remote set-url origin https://***@example.com/acme/app.git"
    );
    assert_eq!(calls[5], "rebase -X theirs origin/main");
    assert_eq!(calls[6], "push --quiet -u origin HEAD");
}

#[tokio::test]
async fn test_push_skips_remote_update_when_url_matches() {
    let temp = temp_dir();
    let runner = ScriptedRunner::with_script(&[
        (
            "remote get-url",
            ProcessOutput::ok("https://s3cr3t@example.com/acme/app.git\n"),
        ),
        ("rev-parse", ProcessOutput::ok("main\n")),
    ]);
    let repo = MirrorRepository::new(runner.clone(), GitConfig::default());

    repo.push(temp.path(), &remote()).await.expect("push");

    let calls = runner.calls();
    assert!(!calls.iter().any(|c| c.starts_with("remote add")));
    assert!(!calls.iter().any(|c| c.starts_with("remote set-url")));
}

#[tokio::test]
async fn test_push_aborts_failed_rebase_and_reports_it() {
    let temp = temp_dir();
    let runner = ScriptedRunner::with_script(&[
        ("rev-parse", ProcessOutput::ok("main\n")),
        ("ls-remote", ProcessOutput::ok("abc123\trefs/heads/main\n")),
        ("rebase -X", failed(1, "CONFLICT (content): Merge conflict in a.txt")),
    ]);
    let repo = MirrorRepository::new(runner.clone(), GitConfig::default());

    let err = repo
        .push(temp.path(), &remote())
        .await
        .expect_err("rebase failure should propagate");

    let failure = err.exec_failure().expect("command failure");
    assert_eq!(failure.code, 1);
    assert!(failure.command.contains("rebase -X theirs origin/main"));
    let calls = runner.calls();
    assert_eq!(calls.last().map(String::as_str), Some("rebase --abort"));
    assert!(!calls.iter().any(|c| c.starts_with("push")));
}

#[tokio::test]
async fn test_push_failure_masks_token() {
    let temp = temp_dir();
    let runner = ScriptedRunner::with_script(&[(
        "fetch",
        failed(128, "fatal: unable to access 'https://s3cr3t@example.com/acme/app.git/'"),
    )]);
    let repo = MirrorRepository::new(runner, GitConfig::default());

    let err = repo
        .push(temp.path(), &remote())
        .await
        .expect_err("fetch failure should propagate");

    let failure = err.exec_failure().expect("command failure");
    assert!(!failure.stderr.contains("s3cr3t"));
    assert!(failure.stderr.contains("https://***@example.com"));
}

#[test]
fn test_authenticated_url() {
    assert_eq!(
        authenticated_url("https://example.com/a.git", "tok").expect("url"),
        "https://tok@example.com/a.git"
    );
    assert_eq!(
        authenticated_url("https://user@example.com/a.git", "tok").expect("url"),
        "https://tok@example.com/a.git"
    );
    assert_eq!(
        authenticated_url("https://example.com", "tok").expect("url"),
        "https://tok@example.com"
    );
    assert_eq!(
        authenticated_url("https://example.com/a.git", "").expect("url"),
        "https://example.com/a.git"
    );
    assert_eq!(
        authenticated_url("/srv/git/a.git", "tok").expect("url"),
        "/srv/git/a.git"
    );
    assert_eq!(
        authenticated_url("file:///srv/git/a.git", "tok").expect("url"),
        "file:///srv/git/a.git"
    );
    assert!(authenticated_url("  ", "tok").is_err());
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(status.status.success(), "git {args:?} failed");
}

#[test]
fn test_query_on_plain_directory() {
    let temp = temp_dir();
    assert!(!is_git_repo(temp.path()));
    assert!(origin_url(temp.path()).is_err());
}

#[test]
fn test_query_origin_url_and_branch() {
    let temp = temp_dir();
    git(temp.path(), &["init", "--quiet", "-b", "trunk"]);
    assert!(is_git_repo(temp.path()));
    assert_eq!(origin_url(temp.path()).expect("query"), None);

    git(
        temp.path(),
        &["remote", "add", "origin", "https://github.com/acme/widget.git"],
    );
    assert_eq!(
        origin_url(temp.path()).expect("query").as_deref(),
        Some("https://github.com/acme/widget.git")
    );
    assert_eq!(
        current_branch(temp.path()).expect("branch").as_deref(),
        Some("trunk")
    );
}
