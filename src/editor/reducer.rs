// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Streaming line reducer
//!
//! Folds an incremental token stream into a [`LineBuffer`]: fragments are
//! buffered until a newline shows up, and each complete line is committed
//! at the cursor (replacing an original line while there is one, appending
//! afterwards). Pure and I/O free; progress is reported through a callback.

use super::line_buffer::{CommitKind, LineBuffer};

/// One committed line, as reported to progress observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCommit {
    /// 1-based line number that was written
    pub line_number: usize,
    pub kind: CommitKind,
    pub text: String,
}

/// Incremental fold of streamed text into the lines of one file
#[derive(Debug)]
pub struct StreamingLineReducer {
    buffer: LineBuffer,
    pending: String,
    commits: usize,
    appended: usize,
}

/// Final state of a reduction
#[derive(Debug)]
pub struct Reduction {
    pub buffer: LineBuffer,
    /// Text received after the last newline that was never committed
    pub trailing: Option<String>,
    /// Number of lines committed
    pub commits: usize,
    /// How many of those commits were appends
    pub appended: usize,
}

impl StreamingLineReducer {
    /// Start a reduction over the given original content
    pub fn new(original: &str) -> Self {
        Self::with_buffer(LineBuffer::from_content(original))
    }

    pub fn with_buffer(buffer: LineBuffer) -> Self {
        Self {
            buffer,
            pending: String::new(),
            commits: 0,
            appended: 0,
        }
    }

    /// Feed one fragment; every line it completes is committed and passed to
    /// `on_commit`. Returns the number of lines committed.
    pub fn push<F>(&mut self, fragment: &str, mut on_commit: F) -> usize
    where
        F: FnMut(&LineCommit),
    {
        self.pending.push_str(fragment);

        let mut committed = 0;
        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();
            let text = line[..line.len() - 1].to_string();
            let commit = self.commit(text);
            on_commit(&commit);
            committed += 1;
        }
        committed
    }

    /// Commit whatever is left in the pending buffer as a final line.
    ///
    /// The base fold leaves an unterminated last fragment uncommitted; this is
    /// the explicit opt-in that writes it. Empty remainders are ignored.
    pub fn flush<F>(&mut self, mut on_commit: F) -> Option<LineCommit>
    where
        F: FnMut(&LineCommit),
    {
        if self.pending.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.pending);
        let commit = self.commit(text);
        on_commit(&commit);
        Some(commit)
    }

    fn commit(&mut self, text: String) -> LineCommit {
        let line_number = self.buffer.next_index() + 1;
        let kind = self.buffer.commit(text.clone());
        self.commits += 1;
        if kind == CommitKind::Appended {
            self.appended += 1;
        }
        tracing::trace!(line_number, ?kind, "line committed");
        LineCommit {
            line_number,
            kind,
            text,
        }
    }

    /// Text buffered since the last newline
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    /// Stop reducing. The pending remainder is handed back, not committed.
    pub fn finish(self) -> Reduction {
        Reduction {
            buffer: self.buffer,
            trailing: (!self.pending.is_empty()).then_some(self.pending),
            commits: self.commits,
            appended: self.appended,
        }
    }
}
