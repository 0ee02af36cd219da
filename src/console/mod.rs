// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Terminal output and input
//!
//! [`Console`] writes coloured text to any [`Write`] sink and renders edit
//! progress as an [`EditObserver`]. Write failures on the sink are logged
//! and otherwise ignored so that rendering never aborts a command.

pub mod input;

pub use input::{LineInput, ScriptedInput, StdinInput};

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

use crate::diff::{DiffRow, DiffTag, FileDiff};
use crate::editor::{CommitKind, EditObserver, FileEditOutcome, LineCommit};
use crate::error::ConsoleError;

/// Unchanged lines shown around each change in a diff
const DIFF_CONTEXT: usize = 3;

/// Styled console writer
pub struct Console {
    out: Box<dyn Write + Send>,
    color: bool,
}

impl Console {
    /// Console on stdout, coloured when stdout is a terminal
    pub fn stdout() -> Self {
        let color = io::stdout().is_terminal();
        Self::new(Box::new(io::stdout()), color)
    }

    pub fn new(out: Box<dyn Write + Send>, color: bool) -> Self {
        Self { out, color }
    }

    fn emit(&mut self, color: Option<Color>, text: &str) {
        let result = match color {
            Some(color) if self.color => queue!(
                self.out,
                SetForegroundColor(color),
                Print(text),
                ResetColor
            ),
            _ => queue!(self.out, Print(text)),
        };
        if let Err(e) = result.and_then(|_| self.out.flush()) {
            tracing::debug!(error = %e, "console write failed");
        }
    }

    /// Plain text, no newline
    pub fn print(&mut self, text: &str) {
        self.emit(None, text);
    }

    /// Plain line
    pub fn line(&mut self, text: &str) {
        self.emit(None, &format!("{}\n", text));
    }

    /// Coloured line
    pub fn styled(&mut self, color: Color, text: &str) {
        self.emit(Some(color), &format!("{}\n", text));
    }

    pub fn info(&mut self, text: &str) {
        self.styled(Color::Cyan, text);
    }

    pub fn success(&mut self, text: &str) {
        self.styled(Color::Green, text);
    }

    pub fn warning(&mut self, text: &str) {
        self.styled(Color::Yellow, text);
    }

    pub fn error(&mut self, text: &str) {
        self.styled(Color::Red, text);
    }

    /// Report an error with its category
    pub fn report(&mut self, error: &ConsoleError) {
        self.error(&format!("{} error: {}", error.kind(), error));
    }

    /// Render a diff with changed lines coloured and distant context folded
    pub fn render_diff(&mut self, path: &Path, diff: &FileDiff) {
        let summary = diff.summary();
        self.info(&format!(
            "Diff for {} (+{} -{} ~{})",
            path.display(),
            summary.inserted,
            summary.deleted,
            summary.replaced
        ));
        if !summary.has_changes() {
            self.line("  (no changes)");
            return;
        }

        for row in diff.visible_rows(DIFF_CONTEXT) {
            match row {
                DiffRow::Gap(n) => {
                    self.styled(Color::DarkGrey, &format!("  ... {} unchanged lines", n))
                }
                DiffRow::Line(line) => {
                    let (marker, color) = match (line.tag, line.new_line) {
                        (DiffTag::Context, _) => (' ', None),
                        (DiffTag::Insert, _) | (DiffTag::Replace, Some(_)) => {
                            ('+', Some(Color::Green))
                        }
                        (DiffTag::Delete, _) | (DiffTag::Replace, None) => ('-', Some(Color::Red)),
                    };
                    let number = line.new_line.or(line.old_line).unwrap_or(0);
                    self.emit(color, &format!("{} {:>4} | {}\n", marker, number, line.text));
                }
            }
        }
    }
}

impl EditObserver for Console {
    fn on_plan_fragment(&mut self, fragment: &str) {
        self.print(fragment);
    }

    fn on_plan_complete(&mut self, _plan: &str) {
        self.line("");
    }

    fn on_file_started(&mut self, path: &Path) {
        self.info(&format!("Editing {}", path.display()));
    }

    fn on_line_commit(&mut self, _path: &Path, commit: &LineCommit) {
        let (verb, color) = match commit.kind {
            CommitKind::Replaced => ("replaced", Color::Yellow),
            CommitKind::Appended => ("appended", Color::Green),
        };
        self.emit(
            Some(color),
            &format!("Line {} {}: {}\n", commit.line_number, verb, commit.text),
        );
    }

    fn on_diff(&mut self, path: &Path, diff: &FileDiff) {
        self.render_diff(path, diff);
    }

    fn on_file_finished(&mut self, outcome: &FileEditOutcome) {
        match &outcome.result {
            Ok(summary) => self.success(&format!(
                "Saved {} ({} -> {} lines)",
                outcome.path.display(),
                summary.lines_before,
                summary.lines_after
            )),
            Err(e) => self.error(&format!("Failed to edit {}: {}", outcome.path.display(), e)),
        }
    }

    fn on_error(&mut self, error: &ConsoleError) {
        self.report(error);
    }
}

/// Cloneable in-memory sink; every clone sees the same bytes
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "buffer lock poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
