// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Description of one external command.
//!
//! ```text
//! ProcessBuilder
//!  • new / which / find          program, optionally resolved via PATH
//!  • arg(s) / cwd / env          what to run and where
//!  • flag / capture_output       ALLOW_FAILURE, KEEP_IN_STRING
//!  • name / mask                 how it appears in logs and errors
//! ```
//!
//! Secrets registered with [`ProcessBuilder::mask`] are replaced by [`MASK`]
//! in the command line, forwarded output and [`ExecFailure`] fields.

use bitflags::bitflags;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, PoisonError, RwLock};

use crate::error::{ExecFailure, ProcessError};

/// Replacement text for masked secrets.
pub const MASK: &str = "***";

/// Programs already resolved through PATH.
static RESOLVED: LazyLock<RwLock<BTreeMap<String, PathBuf>>> =
    LazyLock::new(|| RwLock::new(BTreeMap::new()));

bitflags! {
    /// How a non-zero exit is treated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ProcessFlags: u32 {
        /// Return the output instead of an error on any exit code.
        const ALLOW_FAILURE = 0x01;
    }
}

bitflags! {
    /// What happens to each line of stdout/stderr.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StreamFlags: u32 {
        /// Emit the line as a trace event.
        const FORWARD_TO_LOG = 0x01;
        /// Keep the line in [`ProcessOutput`].
        const KEEP_IN_STRING = 0x02;
    }
}

impl Default for StreamFlags {
    fn default() -> Self {
        Self::FORWARD_TO_LOG
    }
}

/// Exit code and captured streams of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    exit_code: i32,
    stdout: String,
    stderr: String,
    /// Stdout exactly as the process wrote it.
    raw_stdout: Vec<u8>,
}

/// Line-joined text form of captured bytes, without the trailing newline.
fn text_of(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .collect::<Vec<_>>()
        .join("\n")
}

impl ProcessOutput {
    /// Public so that alternative [`CommandRunner`](super::CommandRunner)
    /// implementations can produce results.
    #[must_use]
    pub fn new(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            raw_stdout: stdout.clone().into_bytes(),
            stdout,
            stderr,
        }
    }

    pub(super) fn from_raw(exit_code: i32, stdout: Vec<u8>, stderr: Vec<u8>) -> Self {
        Self {
            exit_code,
            stdout: text_of(&stdout),
            stderr: text_of(&stderr),
            raw_stdout: stdout,
        }
    }

    /// Exit code 0 with only stdout.
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self::new(0, stdout.into(), String::new())
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Captured stdout; empty unless `KEEP_IN_STRING` was set.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Captured stdout bytes, untouched. Use this for output that may not
    /// be UTF-8, such as NUL-separated path lists.
    #[must_use]
    pub fn stdout_bytes(&self) -> &[u8] {
        &self.raw_stdout
    }

    /// Captured stderr; empty unless `KEEP_IN_STRING` was set.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// A command to hand to a [`CommandRunner`](super::CommandRunner).
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    /// Added on top of the inherited environment.
    env: BTreeMap<String, String>,
    flags: ProcessFlags,
    streams: StreamFlags,
    name: Option<String>,
    secrets: Vec<String>,
}

impl ProcessBuilder {
    /// A bare name is looked up in PATH when the process is spawned.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
            env: BTreeMap::new(),
            flags: ProcessFlags::empty(),
            streams: StreamFlags::default(),
            name: None,
            secrets: Vec::new(),
        }
    }

    /// Resolves `program` via PATH up front.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::ExecutableNotFound` if it cannot be found.
    pub fn which(program: impl AsRef<OsStr>) -> Result<Self, ProcessError> {
        let program = program.as_ref();
        Self::find(program)
            .map(Self::new)
            .ok_or_else(|| ProcessError::ExecutableNotFound {
                name: program.to_string_lossy().into_owned(),
            })
    }

    /// Full path of `program`, cached per process.
    #[must_use]
    pub fn find(program: impl AsRef<OsStr>) -> Option<PathBuf> {
        let key = program.as_ref().to_string_lossy().into_owned();
        if let Some(path) = RESOLVED
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Some(path.clone());
        }

        let path = which::which(program.as_ref()).ok()?;
        RESOLVED
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, path.clone());
        Some(path)
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string_lossy().into_owned()));
        self
    }

    #[must_use]
    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets one variable; the rest of the environment is inherited.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn flag(mut self, flag: ProcessFlags) -> Self {
        self.flags |= flag;
        self
    }

    /// Keeps stdout and stderr in the output (and still traces them).
    #[must_use]
    pub const fn capture_output(mut self) -> Self {
        self.streams = StreamFlags::FORWARD_TO_LOG.union(StreamFlags::KEEP_IN_STRING);
        self
    }

    /// Name used in log events instead of the program's file stem.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Registers a secret that must never appear in logs or errors.
    /// Empty values are ignored.
    #[must_use]
    pub fn mask(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            self.secrets.push(secret);
        }
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The arguments, unmasked.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    #[must_use]
    pub const fn env_vars(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub(super) const fn streams(&self) -> StreamFlags {
        self.streams
    }

    pub(super) fn secrets(&self) -> &[String] {
        &self.secrets
    }

    /// Whether a process exiting with `code` counts as successful.
    #[must_use]
    pub const fn is_success_code(&self, code: i32) -> bool {
        code == 0 || self.flags.contains(ProcessFlags::ALLOW_FAILURE)
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.program
            .file_stem()
            .map_or_else(|| "process".to_string(), |s| s.to_string_lossy().into_owned())
    }

    /// The command as it would be typed, secrets masked.
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            if arg.contains(' ') {
                let _ = write!(line, " \"{arg}\"");
            } else {
                let _ = write!(line, " {arg}");
            }
        }
        self.redact(&line)
    }

    /// Replaces every registered secret in `text` with [`MASK`].
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        redact(&self.secrets, text)
    }

    /// The error for an output whose exit code was not accepted.
    #[must_use]
    pub fn failure(&self, output: &ProcessOutput) -> ProcessError {
        ProcessError::ExecCommandFailed(ExecFailure {
            command: self.command_line(),
            code: output.exit_code(),
            stdout: self.redact(output.stdout()),
            stderr: self.redact(output.stderr()),
        })
    }
}

pub(super) fn redact(secrets: &[String], text: &str) -> String {
    secrets
        .iter()
        .fold(text.to_string(), |acc, secret| acc.replace(secret, MASK))
}
