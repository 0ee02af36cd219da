// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session state: conversations, undo entries and ingested context

pub mod memory;
pub mod persistence;
pub mod state;
pub mod undo;

pub use memory::{ImageSource, IngestionMemory, StoredImage};
pub use persistence::{default_history_filename, load_history, save_history};
pub use state::SessionState;
pub use undo::UndoStore;
