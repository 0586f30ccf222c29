// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Snapshot | Init | Status | Check | Unlock | Worker
//! ```

use std::process::ExitCode;

use snapmirror::cli::global::GlobalOptions;
use snapmirror::cli::{self, Command};
use snapmirror::cmd::check::run_check_command;
use snapmirror::cmd::init::run_init_command;
use snapmirror::cmd::snapshot::run_snapshot_command;
use snapmirror::cmd::status::run_status_command;
use snapmirror::cmd::unlock::run_unlock_command;
use snapmirror::cmd::worker::run_worker_command;
use snapmirror::config::loader::{ConfigLoader, ConfigSource};
use snapmirror::config::{DEFAULT_CONFIG_FILE, ENV_PREFIX, ToolConfig};
use snapmirror::logging::init_logging;
use snapmirror::logging::{FileFormat, LogConfig, LogLevel};
use snapmirror::snapshot::state::WORKER_LOG_FILE;

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let Some(command) = &cli.command else {
        eprintln!("No command specified. Use --help for usage information.");
        return ExitCode::FAILURE;
    };
    if matches!(command, Command::Version) {
        handle_version_command();
        return ExitCode::SUCCESS;
    }

    let (config, sources) = match load_config(&cli.global) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load config: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let log_config = build_log_config(&cli.global, &config, command);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    for source in &sources {
        tracing::debug!(%source, "config layer");
    }

    dispatch_command(command, &cli.global, &config).await
}

fn build_log_config(global: &GlobalOptions, config: &ToolConfig, command: &Command) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(config.global.output_log_level);

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(config.global.file_log_level);

    // A detached worker has no console; everything goes to the mirror's log.
    if let Command::Worker(args) = command {
        return LogConfig::builder()
            .with_console_level(LogLevel::SILENT)
            .with_file_level(file_level)
            .with_log_file(args.state_dir.join(WORKER_LOG_FILE))
            .with_append(true)
            .with_file_format(FileFormat::Json)
            .build();
    }

    let log_file = global.log_file.as_ref().or(config.global.log_file.as_ref());
    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(log_file.cloned())
        .build()
}

async fn dispatch_command(command: &Command, global: &GlobalOptions, config: &ToolConfig) -> ExitCode {
    let result = match command {
        Command::Version => {
            handle_version_command();
            Ok(())
        }
        Command::Snapshot(args) => run_snapshot_command(args, global, config).await,
        Command::Init(args) => run_init_command(args, config),
        Command::Status(args) => run_status_command(args, config).await,
        Command::Check(args) => run_check_command(args, config),
        Command::Unlock(args) => run_unlock_command(args, config),
        Command::Worker(args) => match run_worker_command(args, config).await {
            Ok(code) => return exit_code(code),
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> snapmirror::error::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new().add_toml_file_optional(DEFAULT_CONFIG_FILE);
    for config_path in &global.configs {
        loader = loader.add_toml_file(config_path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);

    let overrides = global
        .config_overrides()
        .map_err(|entry| anyhow::anyhow!("invalid --set '{entry}', expected KEY=VALUE"))?;
    for (key, value) in overrides {
        loader = loader.set(key, value)?;
    }
    Ok(loader)
}

fn load_config(
    global: &GlobalOptions,
) -> snapmirror::error::Result<(ToolConfig, Vec<ConfigSource>)> {
    let loader = build_config_loader(global)?;
    let sources = loader.sources().to_vec();
    Ok((loader.build()?, sources))
}
