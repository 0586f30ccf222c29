// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! The [`CommandRunner`] seam and its tokio implementation.
//!
//! ```text
//! ShellRunner::run(builder)
//!   spawn   stdin null, stdout/stderr piped, kill on drop
//!   collect see io.rs
//!   check   exit code against ALLOW_FAILURE
//! ```

use std::future::Future;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace, warn};

use super::builder::{ProcessBuilder, ProcessOutput};
use crate::error::ProcessError;

/// Executes external commands.
///
/// Everything that shells out takes a runner at construction, so tests can
/// script git instead of running it.
pub trait CommandRunner: Send + Sync {
    /// Runs `command` to completion.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError` if spawning fails or the exit code is not
    /// accepted by the builder.
    fn run(
        &self,
        command: ProcessBuilder,
    ) -> impl Future<Output = Result<ProcessOutput, ProcessError>> + Send;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(
        &self,
        command: ProcessBuilder,
    ) -> impl Future<Output = Result<ProcessOutput, ProcessError>> + Send {
        spawn_and_wait(command)
    }
}

async fn spawn_and_wait(builder: ProcessBuilder) -> Result<ProcessOutput, ProcessError> {
    let name = builder.display_name();
    let line = builder.command_line();
    debug!(cwd = ?builder.working_dir(), cmd = %line, "exec");

    let mut child = to_command(&builder).spawn().map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ProcessError::ExecutableNotFound {
                name: builder.program().display().to_string(),
            }
        } else {
            ProcessError::SpawnFailed {
                command: line.clone(),
                source,
            }
        }
    })?;
    trace!(process = %name, pid = ?child.id(), "spawned");

    let output = builder
        .collect(&name, &mut child)
        .await
        .map_err(|source| ProcessError::OutputError {
            command: line.clone(),
            source,
        })?;

    if builder.is_success_code(output.exit_code()) {
        trace!(process = %name, exit_code = output.exit_code(), "completed");
        return Ok(output);
    }
    if !output.stderr().is_empty() {
        warn!(process = %name, stderr = %builder.redact(output.stderr()), "failed");
    }
    Err(builder.failure(&output))
}

fn to_command(builder: &ProcessBuilder) -> Command {
    let mut command = Command::new(builder.program());
    command
        .args(builder.arguments())
        .envs(builder.env_vars())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(cwd) = builder.working_dir() {
        command.current_dir(cwd);
    }
    command
}
