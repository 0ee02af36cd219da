// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for aiconsole
//!
//! Handles loading and saving settings from ~/.aiconsole/settings.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::editor::ApplyOptions;

mod io;
mod validation;

/// Main settings structure, stored in ~/.aiconsole/settings.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Completion service configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Model selection and sampling
    #[serde(default)]
    pub models: ModelsConfig,

    /// Edit behaviour
    #[serde(default)]
    pub editor: EditorConfig,

    /// Input handling
    #[serde(default)]
    pub input: InputConfig,
}

/// OpenRouter-compatible completion service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Chat completions endpoint (for compatible gateways)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Models used for the two roles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Chat and edit planning model
    #[serde(default = "default_planner_model")]
    pub planner: String,

    /// Model that rewrites files
    #[serde(default = "default_editor_model")]
    pub editor: String,

    /// Maximum tokens per response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// How edits are applied and shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Show a diff after every edited file
    #[serde(default = "default_true")]
    pub show_diff: bool,

    /// Commit a final line the model did not terminate with a newline
    #[serde(default = "default_true")]
    pub flush_trailing_fragment: bool,

    /// Drop original lines beyond the last line the model wrote
    #[serde(default)]
    pub trim_unwritten_lines: bool,
}

/// Command input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// File every entered command is appended to, relative to the working
    /// directory. Empty disables it.
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

fn default_planner_model() -> String {
    "openai/o1-mini-2024-09-12".to_string()
}

fn default_editor_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

fn default_history_file() -> String {
    ".aiconsole_history.txt".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: None,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            planner: default_planner_model(),
            editor: default_editor_model(),
            max_tokens: None,
            temperature: None,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            show_diff: true,
            flush_trailing_fragment: true,
            trim_unwritten_lines: false,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            history_file: default_history_file(),
        }
    }
}

impl Settings {
    /// Edit options derived from these settings
    pub fn apply_options(&self) -> ApplyOptions {
        ApplyOptions {
            show_diff: self.editor.show_diff,
            flush_trailing_fragment: self.editor.flush_trailing_fragment,
            trim_unwritten_lines: self.editor.trim_unwritten_lines,
            max_tokens: self.models.max_tokens,
            temperature: self.models.temperature,
        }
    }

    /// Path of the input history file, if enabled
    pub fn history_file(&self) -> Option<PathBuf> {
        let file = self.input.history_file.trim();
        (!file.is_empty()).then(|| PathBuf::from(file))
    }

    /// Apply command-line overrides on top of the loaded settings
    pub fn apply_overrides(
        &mut self,
        planner_model: Option<String>,
        editor_model: Option<String>,
        no_diff: bool,
    ) {
        if let Some(model) = planner_model {
            self.models.planner = model;
        }
        if let Some(model) = editor_model {
            self.models.editor = model;
        }
        if no_diff {
            self.editor.show_diff = false;
        }
    }
}
