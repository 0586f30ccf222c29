// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{CommandRunner, ProcessBuilder, ProcessFlags, ShellRunner};
use crate::error::ProcessError;

#[tokio::test]
async fn test_process_echo() {
    let output = ShellRunner
        .run(ProcessBuilder::new("echo").arg("hello").capture_output())
        .await
        .expect("echo should succeed");

    assert!(output.success());
    insta::assert_snapshot!(output.stdout().trim(), @"hello");
}

#[tokio::test]
async fn test_process_exit_code_allowed() {
    let output = ShellRunner
        .run(
            ProcessBuilder::new("/bin/sh")
                .args(["-c", "exit 42"])
                .flag(ProcessFlags::ALLOW_FAILURE),
        )
        .await
        .expect("process should complete");

    assert_eq!(output.exit_code(), 42);
}

#[tokio::test]
async fn test_process_env_is_additive() {
    let output = ShellRunner
        .run(
            ProcessBuilder::new("/bin/sh")
                .args(["-c", "echo \"$SNAP_TEST_VAR:${PATH:+has-path}\""])
                .env("SNAP_TEST_VAR", "test_value")
                .capture_output(),
        )
        .await
        .expect("process should succeed");

    insta::assert_snapshot!(output.stdout().trim(), @"test_value:has-path");
}

#[tokio::test]
async fn test_failure_masks_secrets_everywhere() {
    let err = ShellRunner
        .run(
            ProcessBuilder::new("/bin/sh")
                .args(["-c", "echo out-s3cr3t; echo err-s3cr3t >&2; exit 3", "s3cr3t"])
                .mask("s3cr3t")
                .capture_output(),
        )
        .await
        .expect_err("non-zero exit should fail");

    let ProcessError::ExecCommandFailed(failure) = err else {
        panic!("expected ExecCommandFailed");
    };
    assert_eq!(failure.code, 3);
    assert!(!failure.command.contains("s3cr3t"));
    assert!(failure.command.ends_with(" ***"));
    assert_eq!(failure.stdout, "out-***");
    assert_eq!(failure.stderr, "err-***");
}

#[tokio::test]
async fn test_missing_program_is_not_found() {
    let err = ShellRunner
        .run(ProcessBuilder::new("nonexistent_program_12345"))
        .await
        .expect_err("spawn should fail");
    assert!(matches!(err, ProcessError::ExecutableNotFound { .. }));
}

#[tokio::test]
async fn test_large_output_is_fully_captured() {
    let output = ShellRunner
        .run(
            ProcessBuilder::new("/bin/sh")
                .args(["-c", "i=0; while [ $i -lt 500 ]; do echo line$i; i=$((i+1)); done"])
                .capture_output(),
        )
        .await
        .expect("process should succeed");

    assert_eq!(output.stdout().lines().count(), 500);
    assert_eq!(output.stdout().lines().last(), Some("line499"));
}

#[tokio::test]
async fn test_non_utf8_output_is_kept_verbatim() {
    let output = ShellRunner
        .run(
            ProcessBuilder::new("/bin/sh")
                .args(["-c", r"printf 'a.txt\000b\377.txt\000z.txt\000'"])
                .capture_output(),
        )
        .await
        .expect("process should succeed");

    assert_eq!(output.stdout_bytes(), b"a.txt\0b\xff.txt\0z.txt\0");
    let entries: Vec<&[u8]> = output
        .stdout_bytes()
        .split(|b| *b == 0)
        .filter(|e| !e.is_empty())
        .collect();
    assert_eq!(entries.len(), 3);
    assert!(output.stdout().contains('\u{fffd}'));
}

#[test]
fn test_command_line_quotes_and_masks() {
    let builder = ProcessBuilder::new("git")
        .args(["commit", "-m", "Snapshot now"])
        .arg("https://tok@host/repo.git")
        .mask("tok");
    insta::assert_snapshot!(
        builder.command_line(),
        @r#"git commit -m "Snapshot now" https://***@host/repo.git"#
    );
    assert_eq!(builder.display_name(), "git");
}

#[test]
fn test_empty_secret_is_ignored() {
    let builder = ProcessBuilder::new("git").arg("push").mask("");
    assert_eq!(builder.command_line(), "git push");
}

#[test]
fn test_executable_lookup() {
    let path = ProcessBuilder::find("sh").expect("sh should be found");
    assert!(path.is_absolute());
    let builder = ProcessBuilder::which("sh").expect("sh should be found");
    assert_eq!(builder.program(), path);
    // second lookup served from the cache
    assert_eq!(ProcessBuilder::find("sh"), Some(path));

    let program = "nonexistent_program_12345";
    assert_eq!(ProcessBuilder::find(program), None);
    let err = ProcessBuilder::which(program).expect_err("should not be found");
    assert!(err.to_string().contains(program));
}
