// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Adding files to the conversation and showing them

use std::path::Path;

use crate::error::Result;
use crate::llm::message::{Conversation, Message};
use crate::session::IngestionMemory;
use crate::storage::FileStorage;

/// Context message for one file, fenced by its path
pub fn file_context_message(path: &Path, content: &str) -> String {
    format!("Content of file {}:\n```\n{}\n```", path.display(), content)
}

/// Read `path` into the planning conversation and remember it.
/// Returns the number of lines added.
pub fn add_file(
    storage: &dyn FileStorage,
    path: &Path,
    conversation: &mut Conversation,
    memory: &mut IngestionMemory,
) -> Result<usize> {
    let content = storage.read_to_string(path)?;
    conversation.push(Message::user(file_context_message(path, &content)));
    memory.add_file(path);
    let lines = content.lines().count();
    tracing::debug!(path = %path.display(), lines, "file added to context");
    Ok(lines)
}

/// File content with right-aligned 1-based line numbers
pub fn numbered_lines(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let width = lines.len().to_string().len();
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$} | {}", i + 1, line, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}
