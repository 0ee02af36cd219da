// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Edit applier
//!
//! Rewrites each target file by streaming the editing model's output through
//! a [`StreamingLineReducer`] seeded with the file's current content. Files
//! are processed one after another; a failure in one file is reported and
//! the batch moves on.

use std::path::Path;

use super::observer::EditObserver;
use super::prompts::build_edit_message;
use super::reducer::StreamingLineReducer;
use super::{BatchReport, EditSummary, EditTarget, FileEditOutcome};
use crate::diff::FileDiff;
use crate::error::Result;
use crate::llm::message::{Conversation, Message};
use crate::llm::provider::{CompletionRequest, LlmProvider};
use crate::llm::streaming::drain_text;
use crate::session::UndoStore;
use crate::storage::FileStorage;

/// Behaviour switches for applying edits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ApplyOptions {
    /// Compute and report a diff per file
    pub show_diff: bool,
    /// Commit an unterminated final fragment as the last line
    pub flush_trailing_fragment: bool,
    /// Drop original lines the model never rewrote
    pub trim_unwritten_lines: bool,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            show_diff: true,
            flush_trailing_fragment: true,
            trim_unwritten_lines: false,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Mutable session state an edit batch writes to
pub struct EditContext<'s> {
    /// Conversation with the editing model
    pub history: &'s mut Conversation,
    pub undo: &'s mut UndoStore,
}

/// Applies a plan to files through the editing model
pub struct EditApplier<'a> {
    provider: &'a dyn LlmProvider,
    storage: &'a dyn FileStorage,
    model: &'a str,
    options: ApplyOptions,
}

impl<'a> EditApplier<'a> {
    pub fn new(provider: &'a dyn LlmProvider, storage: &'a dyn FileStorage, model: &'a str) -> Self {
        Self {
            provider,
            storage,
            model,
            options: ApplyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ApplyOptions) -> Self {
        self.options = options;
        self
    }

    /// Rewrite every target in order and report one outcome per target
    pub async fn apply(
        &self,
        targets: &[EditTarget],
        plan: &str,
        ctx: &mut EditContext<'_>,
        observer: &mut dyn EditObserver,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for target in targets {
            observer.on_file_started(&target.path);
            let result = self.apply_one(&target.path, plan, ctx, observer).await;
            if let Err(ref e) = result {
                tracing::warn!(path = %target.path.display(), error = %e, "edit failed");
            }
            let outcome = FileEditOutcome {
                path: target.path.clone(),
                result,
            };
            observer.on_file_finished(&outcome);
            report.outcomes.push(outcome);
        }

        report
    }

    async fn apply_one(
        &self,
        path: &Path,
        plan: &str,
        ctx: &mut EditContext<'_>,
        observer: &mut dyn EditObserver,
    ) -> Result<EditSummary> {
        // The planning snapshot may be stale by now; this read is the one
        // the edit and its undo entry are based on.
        let original = self.storage.read_to_string(path)?;

        ctx.history
            .push(Message::user(build_edit_message(path, &original, plan)));
        let request = CompletionRequest::new(self.model, ctx.history.messages().to_vec())
            .with_max_tokens(self.options.max_tokens)
            .with_temperature(self.options.temperature);

        tracing::info!(path = %path.display(), model = self.model, "streaming edit");
        let stream = self.provider.complete_stream(request).await?;

        let mut reducer = StreamingLineReducer::new(&original);
        drain_text(stream, |fragment| {
            reducer.push(fragment, |commit| observer.on_line_commit(path, commit));
        })
        .await?;

        if self.options.flush_trailing_fragment {
            if let Some(commit) = reducer.flush(|commit| observer.on_line_commit(path, commit)) {
                tracing::debug!(
                    path = %path.display(),
                    line = commit.line_number,
                    "committed unterminated final line"
                );
            }
        }

        let mut reduction = reducer.finish();
        if let Some(ref trailing) = reduction.trailing {
            tracing::debug!(
                path = %path.display(),
                dropped = trailing.len(),
                "discarded unterminated final fragment"
            );
        }
        let trimmed = if self.options.trim_unwritten_lines {
            reduction.buffer.truncate_to_cursor()
        } else {
            0
        };
        let content = reduction.buffer.to_content();

        ctx.undo.record(path, original.clone());
        ctx.history.push(Message::assistant(content.clone()));

        let diff = self.options.show_diff.then(|| {
            let diff = FileDiff::compute(&original, &content);
            observer.on_diff(path, &diff);
            diff.summary()
        });

        let summary = EditSummary {
            lines_before: reduction.buffer.original_len(),
            lines_after: reduction.buffer.len(),
            commits: reduction.commits,
            appended: reduction.appended,
            trimmed,
            dropped_trailing: reduction.trailing.is_some(),
            diff,
        };

        self.storage.write(path, &content)?;
        tracing::info!(
            path = %path.display(),
            lines = summary.lines_after,
            "edit written"
        );
        Ok(summary)
    }
}
