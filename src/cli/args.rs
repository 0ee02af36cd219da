// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aiconsole - chat with a model and let a second model edit your files
#[derive(Parser, Debug)]
#[command(name = "aiconsole")]
#[command(version, about = "Terminal assistant with model-driven file editing")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Working directory (defaults to current)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Model used for chat and edit planning
    #[arg(long)]
    pub planner_model: Option<String>,

    /// Model used to rewrite files
    #[arg(long)]
    pub editor_model: Option<String>,

    /// Do not show diffs after edits
    #[arg(long)]
    pub no_diff: bool,

    /// Load a saved conversation before starting
    #[arg(long, value_name = "FILE")]
    pub load: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive console (default when no command given)
    Chat,

    /// Inspect or create the settings file
    Settings(SettingsArgs),
}

/// Arguments for the settings command
#[derive(clap::Args, Debug, PartialEq, Eq)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub action: Option<SettingsAction>,
}

/// Settings actions
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    /// Print the effective settings (default)
    Show,
    /// Print the settings file location
    Path,
    /// Write a settings file with default values if none exists
    Init,
}
