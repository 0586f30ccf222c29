// snapmirror: Snapshot Mirror Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |        snapshot / init / worker
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |  TOML layers, config.json |
//!              '--+------------------------'
//!                 |
//!                 v
//!             snapshot
//!   Snapshotter --> inline | background worker
//!        |
//!   SnapshotPipeline: sync --> results --> commit --> push
//!        |                                   |
//!   journal / lock / state                  git
//!                                      CLI + gix queries
//!
//!   +-----------------------------------------+
//!   |  core   process builder, runner         |
//!   +-----------------------------------------+
//!   |  foundation   error, logging, utility   |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod core;
pub mod error;
pub mod git;
pub mod logging;
pub mod snapshot;
pub mod utility;
