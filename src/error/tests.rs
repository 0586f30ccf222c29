// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{ConfigError, ExecFailure, ProcessError, SnapError, SnapResult, SyncError};

fn failure() -> ExecFailure {
    ExecFailure {
        command: "git -C /m push -u origin HEAD".to_string(),
        code: 128,
        stdout: String::new(),
        stderr: "fatal: unable to access remote\nhint: check credentials".to_string(),
    }
}

#[test]
fn test_config_error_display() {
    let err = ConfigError::InvalidValue {
        section: "snapshot".to_string(),
        key: "mode".to_string(),
        message: "expected 'sync' or 'async'".to_string(),
    };
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid value for 'mode' in section '[snapshot]': expected 'sync' or 'async'"
    );
}

#[test]
fn test_exec_failure_display_uses_first_stderr_line() {
    let err = SnapError::from(ProcessError::ExecCommandFailed(failure()));
    insta::assert_snapshot!(
        err.to_string(),
        @"command failed: 'git -C /m push -u origin HEAD' exited with code 128: fatal: unable to access remote"
    );
}

#[test]
fn test_exec_failure_reachable_through_sync_error() {
    let err = SnapError::from(SyncError::ListFailed {
        path: "/src".to_string(),
        source: ProcessError::ExecCommandFailed(failure()),
    });
    let found = err.exec_failure().expect("exec failure should be reachable");
    assert_eq!(found.code, 128);

    let plain = SnapError::other("boom");
    assert!(plain.exec_failure().is_none());
}

#[test]
fn test_snap_error_size() {
    // Box<str> variants (Other) are 16 bytes (fat pointer: ptr + len)
    // With discriminant + alignment = 24 bytes
    let size = std::mem::size_of::<SnapError>();
    assert!(size <= 24, "SnapError is {size} bytes, expected <= 24");
}

#[test]
fn test_snap_result_size() {
    let size = std::mem::size_of::<SnapResult<()>>();
    assert!(size <= 24, "SnapResult<()> is {size} bytes, expected <= 24");
}
