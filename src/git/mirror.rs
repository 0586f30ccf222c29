// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git driver for the mirror repository.
//!
//! ```text
//! commit(mirror)                         push(mirror, remote)
//!   init            (if no .git)           clean stale *.lock
//!   info/exclude    (state files)          remote get-url origin
//!   clean stale *.lock                       └─ add / set-url if different
//!   add -A                                 fetch origin
//!   status --porcelain ── empty ──> false  rev-parse --abbrev-ref HEAD
//!   commit -m "Snapshot <ts>"  ──> true    ls-remote --heads origin <b>
//!                                            └─ rebase -X theirs origin/<b>
//!                                               (fail: rebase --abort)
//!                                          push -u origin HEAD
//! ```
//!
//! Every command runs as `git -C <mirror>` through the injected
//! [`CommandRunner`] with `GIT_TERMINAL_PROMPT=0` and `GCM_INTERACTIVE=never`.
//! The access token is masked in anything that ends up in logs or errors.

use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::types::GitConfig;
use crate::core::process::{CommandRunner, ProcessBuilder, ProcessFlags, ProcessOutput};
use crate::error::{GitError, SnapResult};
use crate::snapshot::model::{RemoteCredentials, timestamp_now};
use crate::snapshot::state::TRANSIENT_EXCLUDES;
use crate::utility::fs::atomic::write_atomic;

/// Lock files git leaves behind when a process dies mid-operation.
const STALE_LOCKS: &[&str] = &["index.lock", "config.lock", "HEAD.lock"];

const REMOTE_NAME: &str = "origin";

/// Drives the git CLI against a mirror working tree.
#[derive(Debug, Clone)]
pub struct MirrorRepository<R> {
    runner: R,
    git: GitConfig,
}

impl<R: CommandRunner> MirrorRepository<R> {
    pub const fn new(runner: R, git: GitConfig) -> Self {
        Self { runner, git }
    }

    pub const fn runner(&self) -> &R {
        &self.runner
    }

    fn git(&self, mirror: &Path) -> ProcessBuilder {
        ProcessBuilder::new(&self.git.program)
            .name("git")
            .arg("-C")
            .arg(mirror)
            .arg("-c")
            .arg(format!("user.name={}", self.git.author_name))
            .arg("-c")
            .arg(format!("user.email={}", self.git.author_email))
            .args(["-c", "commit.gpgsign=false"])
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("GCM_INTERACTIVE", "never")
            .capture_output()
    }

    async fn exec(&self, command: ProcessBuilder) -> SnapResult<ProcessOutput> {
        Ok(self.runner.run(command).await?)
    }

    /// Stages everything in the mirror and commits it.
    ///
    /// Returns `false` without committing when the tree is unchanged.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError` if any git command fails, or a `GitError` if
    /// the git metadata cannot be prepared.
    pub async fn commit(&self, mirror: &Path) -> SnapResult<bool> {
        std::fs::create_dir_all(mirror).map_err(|e| metadata_error(mirror, e))?;

        if !is_repository(mirror) {
            info!(mirror = %mirror.display(), "initializing mirror repository");
            self.exec(self.git(mirror).args(["init", "--quiet"])).await?;
        }
        write_info_exclude(mirror)?;
        remove_stale_locks(mirror)?;

        self.exec(self.git(mirror).args(["add", "-A"])).await?;
        let status = self
            .exec(self.git(mirror).args(["status", "--porcelain"]))
            .await?;
        if status.stdout().trim().is_empty() {
            debug!(mirror = %mirror.display(), "mirror unchanged, nothing to commit");
            return Ok(false);
        }

        let message = format!("Snapshot {}", timestamp_now());
        self.exec(
            self.git(mirror)
                .args(["commit", "--quiet", "-m"])
                .arg(&message),
        )
        .await?;
        info!(mirror = %mirror.display(), %message, "snapshot committed");
        Ok(true)
    }

    /// Publishes the mirror's current branch to `remote`.
    ///
    /// When the remote already has the branch, local commits are rebased on
    /// top of it with conflicts resolved in favour of the local snapshot.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError` if any git command fails (after aborting a
    /// failed rebase), or a `GitError` for an unusable remote URL.
    pub async fn push(&self, mirror: &Path, remote: &RemoteCredentials) -> SnapResult<()> {
        remove_stale_locks(mirror)?;
        let url = authenticated_url(&remote.url, &remote.token)?;
        let git = || self.git(mirror).mask(remote.token.as_str());

        let current = self
            .exec(
                git()
                    .args(["remote", "get-url", REMOTE_NAME])
                    .flag(ProcessFlags::ALLOW_FAILURE),
            )
            .await?;
        if !current.success() {
            debug!("adding remote {REMOTE_NAME}");
            self.exec(git().args(["remote", "add", REMOTE_NAME]).arg(&url))
                .await?;
        } else if current.stdout().trim() != url {
            debug!("updating url of remote {REMOTE_NAME}");
            self.exec(git().args(["remote", "set-url", REMOTE_NAME]).arg(&url))
                .await?;
        }

        self.exec(git().args(["fetch", "--quiet", REMOTE_NAME]))
            .await?;

        let head = self
            .exec(git().args(["rev-parse", "--abbrev-ref", "HEAD"]))
            .await?;
        let branch = head.stdout().trim().to_string();

        let heads = self
            .exec(
                git()
                    .args(["ls-remote", "--heads", REMOTE_NAME])
                    .arg(&branch)
                    .flag(ProcessFlags::ALLOW_FAILURE),
            )
            .await?;
        if heads.success() && !heads.stdout().trim().is_empty() {
            debug!(%branch, "remote branch exists, rebasing local snapshots onto it");
            let rebase = git()
                .args(["rebase", "-X", "theirs"])
                .arg(format!("{REMOTE_NAME}/{branch}"));
            if let Err(err) = self.exec(rebase).await {
                warn!(%branch, error = %err, "rebase failed, aborting");
                let abort = git()
                    .args(["rebase", "--abort"])
                    .flag(ProcessFlags::ALLOW_FAILURE);
                if let Err(abort_err) = self.exec(abort).await {
                    warn!(error = %abort_err, "rebase --abort failed");
                }
                return Err(err);
            }
        }

        self.exec(git().args(["push", "--quiet", "-u", REMOTE_NAME, "HEAD"]))
            .await?;
        info!(%branch, "snapshot pushed");
        Ok(())
    }

    /// Number of commits reachable from `HEAD`.
    ///
    /// # Errors
    ///
    /// Returns an error if git fails (e.g. the mirror has no commits yet).
    pub async fn head_commit_count(&self, mirror: &Path) -> SnapResult<u64> {
        let output = self
            .exec(self.git(mirror).args(["rev-list", "--count", "HEAD"]))
            .await?;
        output.stdout().trim().parse().map_err(|e: std::num::ParseIntError| {
            GitError::Query {
                path: mirror.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

/// Returns true if `mirror` has its own `.git` directory.
#[must_use]
pub fn is_repository(mirror: &Path) -> bool {
    mirror.join(".git").exists()
}

/// Inserts `token` as user info into `url`.
///
/// `https://host/r.git` + `t0k` → `https://t0k@host/r.git`. Existing user
/// info is replaced. URLs without `scheme://host` (local paths, `file://`)
/// and empty tokens are returned unchanged.
///
/// # Errors
///
/// Returns `GitError::InvalidRemoteUrl` for an empty URL.
pub fn authenticated_url(url: &str, token: &str) -> Result<String, GitError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(GitError::InvalidRemoteUrl {
            url: url.to_string(),
        });
    }
    if token.is_empty() {
        return Ok(url.to_string());
    }
    let Some((scheme, rest)) = url.split_once("://") else {
        return Ok(url.to_string());
    };

    let (authority, tail) = rest.find('/').map_or((rest, ""), |i| rest.split_at(i));
    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    if host.is_empty() {
        return Ok(url.to_string());
    }
    Ok(format!("{scheme}://{token}@{host}{tail}"))
}

fn metadata_error(path: &Path, source: std::io::Error) -> GitError {
    GitError::Metadata {
        path: path.display().to_string(),
        source,
    }
}

/// Adds the transient state files to `.git/info/exclude`, keeping existing
/// entries.
fn write_info_exclude(mirror: &Path) -> Result<(), GitError> {
    let path = mirror.join(".git").join("info").join("exclude");
    let existing = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(metadata_error(&path, e)),
    };

    let missing: Vec<&str> = TRANSIENT_EXCLUDES
        .iter()
        .copied()
        .filter(|pattern| !existing.lines().any(|line| line.trim() == *pattern))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    for pattern in missing {
        content.push_str(pattern);
        content.push('\n');
    }
    write_atomic(&path, content.as_bytes()).map_err(|e| metadata_error(&path, e))
}

/// Deletes git lock files. Only called while this process owns the mirror.
fn remove_stale_locks(mirror: &Path) -> Result<(), GitError> {
    let git_dir = mirror.join(".git");
    for name in STALE_LOCKS {
        let path = git_dir.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => warn!(path = %path.display(), "removed stale git lock"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(metadata_error(&path, e)),
        }
    }
    Ok(())
}
