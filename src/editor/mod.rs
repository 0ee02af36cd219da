// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Two-stage file editing
//!
//! A planning model turns an instruction into numbered edit instructions,
//! then an editing model rewrites each file. Its output is folded line by
//! line into the file's current content as it streams in.

pub mod applier;
pub mod line_buffer;
pub mod observer;
pub mod planner;
pub mod prompts;
pub mod reducer;

pub use applier::{ApplyOptions, EditApplier, EditContext};
pub use line_buffer::{CommitKind, LineBuffer};
pub use observer::{EditObserver, NullObserver, RecordingObserver};
pub use planner::{load_targets, EditPlanner};
pub use reducer::{LineCommit, Reduction, StreamingLineReducer};

use std::path::PathBuf;

use crate::diff::DiffSummary;
use crate::error::{ConsoleError, Result};

/// A file selected for editing, with the content it had when it was read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub path: PathBuf,
    pub content: String,
}

impl EditTarget {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// What happened to one file of a successful edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSummary {
    pub lines_before: usize,
    pub lines_after: usize,
    pub commits: usize,
    pub appended: usize,
    /// Original lines dropped because the model never rewrote them
    pub trimmed: usize,
    /// An unterminated final fragment was discarded
    pub dropped_trailing: bool,
    pub diff: Option<DiffSummary>,
}

/// Result of editing one file
#[derive(Debug)]
pub struct FileEditOutcome {
    pub path: PathBuf,
    pub result: Result<EditSummary>,
}

impl FileEditOutcome {
    pub fn error(&self) -> Option<&ConsoleError> {
        self.result.as_ref().err()
    }
}

/// Outcomes of a whole edit batch, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileEditOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &FileEditOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileEditOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}
