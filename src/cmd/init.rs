// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Init command implementation.

use crate::cli::project::InitArgs;
use crate::cmd::source_dir;
use crate::config::ToolConfig;
use crate::config::local::{
    LocalConfig, LocalConfigStore, detect_project_name, project_name_from_url, slugify,
    write_project_marker,
};
use crate::config::upgrade::ConfigVersionUpgrader;
use crate::error::{ConfigError, Result};

/// Main handler for init command.
///
/// The project name comes from `--project`, an existing marker or origin
/// remote, or finally the mirror URL itself.
///
/// # Errors
///
/// Returns an error if no project name can be derived or a file cannot be
/// written.
pub fn run_init_command(args: &InitArgs, config: &ToolConfig) -> Result<()> {
    let source = source_dir(args.source.as_deref())?;
    let explicit = args
        .project
        .as_deref()
        .map(slugify)
        .filter(|name| !name.is_empty());
    let name = match explicit {
        Some(name) => Some(name),
        None => match detect_project_name(&source)? {
            Some(name) => Some(name),
            None => project_name_from_url(&args.url)?,
        },
    }
    .ok_or_else(|| ConfigError::ProjectNotDetected(source.display().to_string()))?;

    write_project_marker(&source, &name)?;

    let layout = config.paths.project(&name);
    let store = LocalConfigStore::new(layout.config_file());
    let result = store.reconcile(
        &LocalConfig::desired(name.as_str(), args.url.as_str()),
        &ConfigVersionUpgrader::current(),
    )?;
    std::fs::create_dir_all(layout.mirror_dir())?;

    println!("Project:  {name}");
    println!("Remote:   {}", result.config.remote.url);
    println!("Mirror:   {}", layout.mirror_dir().display());
    println!("Config:   {}", store.path().display());
    Ok(())
}
