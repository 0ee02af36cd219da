// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! In-memory line array of one file being rewritten

/// Whether a committed line overwrote an original line or extended the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    Replaced,
    Appended,
}

/// Ordered lines of one file plus the position of the next line to write.
///
/// Lines are only ever replaced in place or appended past the end, so the
/// length never drops below the original length while commits are applied.
/// `next_index <= len()` holds after every commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    next_index: usize,
    original_len: usize,
    /// The original content ended with `\n`
    trailing_newline: bool,
}

impl LineBuffer {
    /// Split file content on `\n`. Empty content is a single empty line and
    /// a trailing newline yields a trailing empty line, so joining gives the
    /// content back unchanged.
    pub fn from_content(content: &str) -> Self {
        let lines: Vec<String> = content.split('\n').map(str::to_string).collect();
        let original_len = lines.len();
        Self {
            lines,
            next_index: 0,
            original_len,
            trailing_newline: content.ends_with('\n'),
        }
    }

    /// Write one line at the cursor and advance it by one
    pub fn commit(&mut self, text: String) -> CommitKind {
        let kind = if self.next_index < self.lines.len() {
            self.lines[self.next_index] = text;
            CommitKind::Replaced
        } else {
            self.lines.push(text);
            CommitKind::Appended
        };
        self.next_index += 1;
        kind
    }

    /// Drop every line past the cursor. Does nothing if nothing was
    /// committed yet, so an empty stream never wipes a file. A final
    /// newline the cursor never reached is kept.
    ///
    /// Returns the number of lines removed.
    pub fn truncate_to_cursor(&mut self) -> usize {
        if self.next_index == 0 || self.next_index >= self.lines.len() {
            return 0;
        }
        let before = self.lines.len();
        let keep_final_newline = self.trailing_newline && self.next_index < self.original_len;
        self.lines.truncate(self.next_index);
        if keep_final_newline {
            self.lines.push(String::new());
        }
        before - self.lines.len()
    }

    /// Index of the next line to be written (0-based)
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Number of lines the buffer was created with
    pub fn original_len(&self) -> usize {
        self.original_len
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Join the lines back into file content
    pub fn to_content(&self) -> String {
        self.lines.join("\n")
    }
}
