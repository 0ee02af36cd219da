// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session state shared by every command

use std::path::Path;

use super::memory::IngestionMemory;
use super::persistence::{load_history, save_history};
use super::undo::UndoStore;
use crate::editor::prompts::{EDITOR_SYSTEM_PROMPT, PLANNER_SYSTEM_PROMPT};
use crate::editor::EditContext;
use crate::error::Result;
use crate::llm::message::Conversation;
use crate::storage::FileStorage;

/// Everything one running console remembers between commands
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Conversation with the planning model; also used for plain chat
    pub planning: Conversation,
    /// Conversation with the editing model
    pub editing: Conversation,
    pub undo: UndoStore,
    pub memory: IngestionMemory,
    pub planner_model: String,
    pub editor_model: String,
    pub show_diff: bool,
}

impl SessionState {
    pub fn new(planner_model: impl Into<String>, editor_model: impl Into<String>) -> Self {
        Self {
            planning: Conversation::with_system(PLANNER_SYSTEM_PROMPT),
            editing: Conversation::with_system(EDITOR_SYSTEM_PROMPT),
            undo: UndoStore::new(),
            memory: IngestionMemory::new(),
            planner_model: planner_model.into(),
            editor_model: editor_model.into(),
            show_diff: true,
        }
    }

    pub fn with_show_diff(mut self, show_diff: bool) -> Self {
        self.show_diff = show_diff;
        self
    }

    /// Forget ingested files, images and searches
    pub fn clear(&mut self) {
        self.memory.clear();
    }

    /// Start over: both conversations, ingestion memory and undo entries
    pub fn reset(&mut self) {
        self.planning.reset();
        self.editing.reset();
        self.memory.clear();
        self.undo.clear();
        tracing::info!("session reset");
    }

    /// Flip diff display and return the new setting
    pub fn toggle_diff(&mut self) -> bool {
        self.show_diff = !self.show_diff;
        self.show_diff
    }

    /// Borrow the parts an edit batch writes to
    pub fn edit_context(&mut self) -> EditContext<'_> {
        EditContext {
            history: &mut self.editing,
            undo: &mut self.undo,
        }
    }

    /// Save the planning conversation
    pub fn save_history(&self, storage: &dyn FileStorage, path: &Path) -> Result<()> {
        save_history(storage, path, self.planning.messages())
    }

    /// Replace the planning conversation with a saved one and return the
    /// number of messages read. On failure the current conversation is kept.
    pub fn load_history(&mut self, storage: &dyn FileStorage, path: &Path) -> Result<usize> {
        let messages = load_history(storage, path)?;
        let count = messages.len();
        self.planning.replace(messages);
        Ok(count)
    }
}
