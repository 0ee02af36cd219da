// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Saving and loading conversation history
//!
//! A saved session is a flat JSON array of `{role, content}` objects with
//! no version field. Loading does no validation beyond parsing.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{ConsoleError, Result};
use crate::llm::message::Message;
use crate::storage::FileStorage;

/// File name used by `/save` when none is given
pub fn default_history_filename(now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!("chat_history_{}.json", now.format("%Y%m%d_%H%M%S")))
}

/// Write messages as a pretty-printed JSON array
pub fn save_history(storage: &dyn FileStorage, path: &Path, messages: &[Message]) -> Result<()> {
    let json = serde_json::to_string_pretty(messages)?;
    storage.write(path, &json)?;
    tracing::info!(path = %path.display(), messages = messages.len(), "history saved");
    Ok(())
}

/// Read a JSON array of messages
pub fn load_history(storage: &dyn FileStorage, path: &Path) -> Result<Vec<Message>> {
    let json = storage.read_to_string(path)?;
    let messages: Vec<Message> =
        serde_json::from_str(&json).map_err(|e| ConsoleError::SessionFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    tracing::info!(path = %path.display(), messages = messages.len(), "history loaded");
    Ok(messages)
}
