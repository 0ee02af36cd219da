// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! aiconsole - terminal assistant with model-driven file editing.
//!
//! A planning model turns an instruction into numbered edit instructions;
//! an editing model then rewrites each file, and its streamed output is
//! folded line by line into the file's current content.
//!
//! Architecture highlights:
//! - `editor`: line buffer, streaming line reducer, edit planner and applier
//! - `session`: conversations, single-shot undo, ingested context, save/load
//! - `llm`: completion service abstraction, OpenRouter client, mock provider
//! - `ingest`: files, images and web search as conversation context
//! - `chat`, `console`: command parsing, the command loop and terminal I/O

pub mod chat;
pub mod cli;
pub mod config;
pub mod console;
pub mod diff;
pub mod editor;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod session;
pub mod storage;

pub use error::{ConsoleError, Result};
