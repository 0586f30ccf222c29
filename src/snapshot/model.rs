// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Value objects crossing the snapshot pipeline.
//!
//! ```text
//! SnapshotRequest
//!   ├─ source_path?   (default: cwd of the executing process)
//!   ├─ mirror_path
//!   ├─ test_results   TestResults { timestamp, summary, suites[], typeErrors? }
//!   └─ remote         RemoteCredentials { url, token }
//!
//! ErrorRecord  { message, stack?, timestamp, command?, stdout?, stderr? }
//! ```
//!
//! Everything here serializes as camelCase JSON, since requests travel to
//! the worker through `pending.json` and failures come back through
//! `lastError.json`.

use bon::Builder;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::process::builder::MASK;
use crate::error::SnapError;

/// Current time as an ISO-8601 UTC timestamp with millisecond precision.
#[must_use]
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Remote endpoint plus the token used to authenticate against it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCredentials {
    pub url: String,
    pub token: String,
}

impl RemoteCredentials {
    #[must_use]
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("url", &self.url)
            .field("token", &MASK)
            .finish()
    }
}

/// One test case outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub name: String,
    pub passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestCase {
    #[must_use]
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
        }
    }
}

/// Results of one test file. `passed` holds iff every test passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteResult {
    pub path: String,
    pub passed: bool,
    pub tests: Vec<TestCase>,
}

impl SuiteResult {
    #[must_use]
    pub fn new(path: impl Into<String>, tests: Vec<TestCase>) -> Self {
        let passed = tests.iter().all(|t| t.passed);
        Self {
            path: path.into(),
            passed,
            tests,
        }
    }
}

/// Aggregate counts over all suites.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub total_suites: usize,
    pub passed_suites: usize,
    pub failed_suites: usize,
    pub total_tests: usize,
    pub passed_tests: usize,
    pub failed_tests: usize,
}

/// Type-checker diagnostic captured next to the test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCheckError {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Test run attached to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResults {
    pub timestamp: String,
    pub summary: TestSummary,
    pub suites: Vec<SuiteResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_errors: Option<Vec<TypeCheckError>>,
}

impl TestResults {
    /// Builds results whose summary is computed from `suites`.
    #[must_use]
    pub fn from_suites(timestamp: impl Into<String>, suites: Vec<SuiteResult>) -> Self {
        let passed_suites = suites.iter().filter(|s| s.passed).count();
        let total_tests = suites.iter().map(|s| s.tests.len()).sum();
        let passed_tests = suites
            .iter()
            .flat_map(|s| &s.tests)
            .filter(|t| t.passed)
            .count();
        let summary = TestSummary {
            total_suites: suites.len(),
            passed_suites,
            failed_suites: suites.len() - passed_suites,
            total_tests,
            passed_tests,
            failed_tests: total_tests - passed_tests,
        };
        Self {
            timestamp: timestamp.into(),
            summary,
            suites,
            type_errors: None,
        }
    }

    /// Reads results from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid results JSON.
    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read test results {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("invalid test results in {}", path.display()))
    }

    /// Sorts suites by path, tests by name and type errors by position, and
    /// re-derives every suite's `passed` flag. Idempotent.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for suite in &mut self.suites {
            suite.tests.sort_by(|a, b| a.name.cmp(&b.name));
            suite.passed = suite.tests.iter().all(|t| t.passed);
        }
        self.suites.sort_by(|a, b| a.path.cmp(&b.path));
        if let Some(errors) = self.type_errors.as_mut() {
            errors.sort_by(|a, b| {
                (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column))
            });
        }
        self
    }
}

/// Everything needed to run one snapshot. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    #[builder(setters(name = with_source_path), into)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_path: Option<PathBuf>,
    #[builder(setters(name = with_mirror_path), into)]
    mirror_path: PathBuf,
    #[builder(setters(name = with_test_results))]
    test_results: TestResults,
    #[builder(setters(name = with_remote))]
    remote: RemoteCredentials,
}

impl SnapshotRequest {
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    #[must_use]
    pub fn mirror_path(&self) -> &Path {
        &self.mirror_path
    }

    #[must_use]
    pub const fn test_results(&self) -> &TestResults {
        &self.test_results
    }

    #[must_use]
    pub const fn remote(&self) -> &RemoteCredentials {
        &self.remote
    }
}

/// Persisted description of a failed snapshot attempt (`lastError.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

impl ErrorRecord {
    /// Captures an error, including the failed command's masked output.
    #[must_use]
    pub fn from_error(err: &SnapError) -> Self {
        let mut chain = Vec::new();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            chain.push(format!("caused by: {cause}"));
            source = cause.source();
        }
        let failure = err.exec_failure();
        Self {
            message: err.to_string(),
            stack: (!chain.is_empty()).then(|| chain.join("\n")),
            timestamp: timestamp_now(),
            command: failure.map(|f| f.command.clone()),
            stdout: failure.map(|f| f.stdout.clone()),
            stderr: failure.map(|f| f.stderr.clone()),
        }
    }

    /// Record carrying only a message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
            timestamp: timestamp_now(),
            command: None,
            stdout: None,
            stderr: None,
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.message)
    }
}
