// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{ConsoleError, Result};

use super::Settings;

impl Settings {
    /// Get the OpenRouter API key, checking the env var first.
    pub fn api_key(&self) -> Option<String> {
        // Priority: env var > config file.
        std::env::var(&self.provider.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.provider.api_key.clone())
    }

    /// Check if a usable API key is available.
    pub fn is_provider_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// Reject settings that cannot work.
    pub fn validate(&self) -> Result<()> {
        if self.models.planner.trim().is_empty() {
            return Err(ConsoleError::Config(
                "models.planner must not be empty".to_string(),
            ));
        }
        if self.models.editor.trim().is_empty() {
            return Err(ConsoleError::Config(
                "models.editor must not be empty".to_string(),
            ));
        }
        if self.models.max_tokens == Some(0) {
            return Err(ConsoleError::Config(
                "models.max_tokens must be greater than zero".to_string(),
            ));
        }
        if let Some(temperature) = self.models.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConsoleError::Config(format!(
                    "models.temperature must be between 0 and 2, got {}",
                    temperature
                )));
            }
        }
        Ok(())
    }
}
