// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Snapshot command implementation.
//!
//! ```text
//! CI check ─► locate git ─► load results ─► resolve project/remote ─► reconcile config.json
//!          ─► Snapshotter (inline | background worker)
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::cli::global::GlobalOptions;
use crate::cli::snapshot::SnapshotArgs;
use crate::cmd::{resolve_project, source_dir};
use crate::config::ToolConfig;
use crate::config::local::{LocalConfig, LocalConfigStore};
use crate::config::types::SnapshotMode;
use crate::config::upgrade::ConfigVersionUpgrader;
use crate::core::process::{ProcessBuilder, ShellRunner};
use crate::error::{ConfigError, Result, SnapResult};
use crate::snapshot::{
    BackgroundJobRunner, ErrorRecord, MirrorState, ProcessLauncher, RemoteCredentials, SnapshotOutcome,
    SnapshotPipeline, SnapshotRequest, Snapshotter, Strategy, TestResults,
};

/// Environment variables that mark a CI run when set to `true`.
const CI_VARIABLES: [&str; 2] = ["CI", "IS_CI"];

/// Main handler for the snapshot command.
///
/// # Errors
///
/// Returns an error if the results cannot be read, the target cannot be
/// resolved, or an inline snapshot fails.
pub async fn run_snapshot_command(
    args: &SnapshotArgs,
    global: &GlobalOptions,
    config: &ToolConfig,
) -> Result<()> {
    if config.snapshot.skip_on_ci && !args.force && is_ci(|key| std::env::var(key).ok()) {
        info!("CI environment detected, skipping snapshot");
        println!("Skipping snapshot in CI (use --force to take it anyway)");
        return Ok(());
    }

    // Fail before touching any state when git is missing.
    let mut git = config.git.clone();
    git.program = ProcessBuilder::which(&git.program)?.program().to_path_buf();

    let source = source_dir(args.source.as_deref())?;
    let results = TestResults::from_file(&args.results)?;
    let (mirror, url) = resolve_target(args, &source, config)?;

    let request = SnapshotRequest::builder()
        .with_source_path(source)
        .with_mirror_path(mirror)
        .with_test_results(results)
        .with_remote(RemoteCredentials::new(
            url,
            args.token.clone().unwrap_or_default(),
        ))
        .build();

    let mode = args.mode.unwrap_or(config.snapshot.mode);
    let strategy = match mode {
        SnapshotMode::Sync => Strategy::Inline,
        SnapshotMode::Async => {
            let launcher = ProcessLauncher::current_exe()?.with_args(global.worker_args());
            Strategy::Background(BackgroundJobRunner::new(Arc::new(launcher)))
        }
    };

    let snapshotter = Snapshotter::new(
        SnapshotPipeline::new(ShellRunner, git),
        strategy,
    );
    let report = snapshotter.execute(&request).await?;

    if let Some(previous) = &report.previous_failure {
        let state = MirrorState::for_mirror(request.mirror_path());
        eprintln!("{}", previous_failure_notice(previous, &state));
    }
    match report.outcome {
        SnapshotOutcome::Completed {
            committed: false, ..
        } => println!("No changes since the last snapshot"),
        SnapshotOutcome::Completed { .. } => println!("Snapshot committed and pushed"),
        SnapshotOutcome::Spawned => println!("Snapshot handed to background worker"),
        SnapshotOutcome::Queued => println!("Snapshot queued behind the running worker"),
        SnapshotOutcome::InProgress => {
            println!("Another snapshot of this mirror is in progress, nothing was done");
        }
    }
    Ok(())
}

/// Returns the mirror directory and remote URL for a snapshot.
///
/// With both `--mirror` and `--url` no project is needed. Otherwise the
/// project's `config.json` supplies the remote and is reconciled with the
/// running version.
fn resolve_target(
    args: &SnapshotArgs,
    source: &Path,
    config: &ToolConfig,
) -> SnapResult<(PathBuf, String)> {
    if let (Some(mirror), Some(url)) = (&args.mirror, &args.url) {
        return Ok((mirror.clone(), url.clone()));
    }

    let (name, layout) = resolve_project(source, config)?;
    let store = LocalConfigStore::new(layout.config_file());
    let url = match &args.url {
        Some(url) => url.clone(),
        None => store
            .load()?
            .map(|stored| stored.remote.url)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| ConfigError::MissingRemote(name.clone()))?,
    };

    store.reconcile(
        &LocalConfig::desired(name, url.clone()),
        &ConfigVersionUpgrader::current(),
    )?;

    let mirror = args.mirror.clone().unwrap_or_else(|| layout.mirror_dir());
    Ok((mirror, url))
}

/// Warning for a failure left by an earlier background run, with the failed
/// command and where to find the worker's full output.
fn previous_failure_notice(previous: &ErrorRecord, state: &MirrorState) -> String {
    let mut notice = format!("Warning: previous background snapshot failed: {previous}");
    if let Some(command) = &previous.command {
        let _ = write!(notice, "\n  command: {command}");
    }
    if let Some(stderr) = previous.stderr.as_deref().filter(|s| !s.is_empty()) {
        let _ = write!(notice, "\n  stderr: {stderr}");
    }
    let _ = write!(notice, "\n  worker log: {}", state.worker_log_path().display());
    notice
}

/// Whether any CI marker variable is set to `true`.
fn is_ci(lookup: impl Fn(&str) -> Option<String>) -> bool {
    CI_VARIABLES.iter().any(|key| {
        lookup(key).is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    })
}
