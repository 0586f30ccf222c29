// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options available for all commands.
//!
//! # Option Precedence
//!
//! ```text
//! --config FILE     ← Additional TOML files (can repeat)
//! --log-level N     ← Console verbosity (0-6)
//! --file-log-level  ← File verbosity (overrides --log-level)
//! --log-file FILE   ← Also log to FILE
//! --set KEY=VAL     ← Direct config override, e.g. snapshot.mode=sync
//!
//! Precedence: --set > env > --config > snapmirror.toml > defaults
//! ```

use clap::Args;
use std::ffi::OsString;
use std::path::PathBuf;

/// Global options available for all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Path to additional TOML configuration file(s).
    /// Can be specified multiple times.
    #[arg(short = 'c', long = "config", value_name = "FILE", action = clap::ArgAction::Append, global = true)]
    pub configs: Vec<PathBuf>,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace, 6=dump).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", global = true, value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub log_level: Option<u8>,

    /// File log level, overrides --log-level for the log file.
    #[arg(long = "file-log-level", value_name = "LEVEL", global = true, value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub file_log_level: Option<u8>,

    /// Path to log file.
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Sets a configuration value, such as 'git.author_name=ci-bot'.
    /// Can be specified multiple times.
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", action = clap::ArgAction::Append, global = true)]
    pub overrides: Vec<String>,
}

impl GlobalOptions {
    /// Splits `--set` values into `(key, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns the offending entry if it has no `=` or an empty key.
    pub fn config_overrides(&self) -> Result<Vec<(&str, &str)>, String> {
        self.overrides
            .iter()
            .map(|entry| match entry.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
                _ => Err(entry.clone()),
            })
            .collect()
    }

    /// Options a detached worker needs to load the same configuration.
    ///
    /// Config paths are made absolute since the worker may start elsewhere.
    #[must_use]
    pub fn worker_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        for path in &self.configs {
            let path = std::path::absolute(path).unwrap_or_else(|_| path.clone());
            args.push(OsString::from("--config"));
            args.push(path.into_os_string());
        }
        for entry in &self.overrides {
            args.push(OsString::from("--set"));
            args.push(OsString::from(entry));
        }
        if let Some(level) = self.file_log_level.or(self.log_level) {
            args.push(OsString::from("--file-log-level"));
            args.push(OsString::from(level.to_string()));
        }
        args
    }
}
