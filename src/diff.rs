// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Line-level comparison of a file before and after an edit
//!
//! Purely presentational: nothing here touches storage or session state.

use similar::{capture_diff_slices, Algorithm, DiffOp};

/// Kind of change a diff line represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTag {
    /// Unchanged line
    Context,
    /// Line only present after the edit
    Insert,
    /// Line only present before the edit
    Delete,
    /// Line rewritten in place; old side has `old_line`, new side has `new_line`
    Replace,
}

/// One rendered line of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub tag: DiffTag,
    /// 1-based line number in the old content
    pub old_line: Option<usize>,
    /// 1-based line number in the new content
    pub new_line: Option<usize>,
    pub text: String,
}

/// Counts per change kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub inserted: usize,
    pub deleted: usize,
    pub replaced: usize,
    pub unchanged: usize,
}

impl DiffSummary {
    pub fn has_changes(&self) -> bool {
        self.inserted + self.deleted + self.replaced > 0
    }
}

/// Row of a diff view with long unchanged stretches collapsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffRow<'a> {
    Line(&'a DiffLine),
    /// Number of unchanged lines not shown
    Gap(usize),
}

/// Full line diff of two texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    lines: Vec<DiffLine>,
}

impl FileDiff {
    /// Compare two texts line by line (lines split on `\n`, like the editor)
    pub fn compute(before: &str, after: &str) -> Self {
        let old: Vec<&str> = before.split('\n').collect();
        let new: Vec<&str> = after.split('\n').collect();
        let mut lines = Vec::new();

        for op in capture_diff_slices(Algorithm::Myers, &old, &new) {
            match op {
                DiffOp::Equal {
                    old_index,
                    new_index,
                    len,
                } => {
                    for i in 0..len {
                        lines.push(DiffLine {
                            tag: DiffTag::Context,
                            old_line: Some(old_index + i + 1),
                            new_line: Some(new_index + i + 1),
                            text: old[old_index + i].to_string(),
                        });
                    }
                }
                DiffOp::Delete {
                    old_index, old_len, ..
                } => {
                    for i in old_index..old_index + old_len {
                        lines.push(DiffLine {
                            tag: DiffTag::Delete,
                            old_line: Some(i + 1),
                            new_line: None,
                            text: old[i].to_string(),
                        });
                    }
                }
                DiffOp::Insert {
                    new_index, new_len, ..
                } => {
                    for i in new_index..new_index + new_len {
                        lines.push(DiffLine {
                            tag: DiffTag::Insert,
                            old_line: None,
                            new_line: Some(i + 1),
                            text: new[i].to_string(),
                        });
                    }
                }
                DiffOp::Replace {
                    old_index,
                    old_len,
                    new_index,
                    new_len,
                } => {
                    for i in old_index..old_index + old_len {
                        lines.push(DiffLine {
                            tag: DiffTag::Replace,
                            old_line: Some(i + 1),
                            new_line: None,
                            text: old[i].to_string(),
                        });
                    }
                    for i in new_index..new_index + new_len {
                        lines.push(DiffLine {
                            tag: DiffTag::Replace,
                            old_line: None,
                            new_line: Some(i + 1),
                            text: new[i].to_string(),
                        });
                    }
                }
            }
        }

        Self { lines }
    }

    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for line in &self.lines {
            match line.tag {
                DiffTag::Context => summary.unchanged += 1,
                DiffTag::Insert => summary.inserted += 1,
                DiffTag::Delete => summary.deleted += 1,
                // Count each rewritten line once, on its new side.
                DiffTag::Replace if line.new_line.is_some() => summary.replaced += 1,
                DiffTag::Replace => {}
            }
        }
        summary
    }

    /// Rows to display, keeping `context` unchanged lines around each change
    pub fn visible_rows(&self, context: usize) -> Vec<DiffRow<'_>> {
        let changed: Vec<bool> = self
            .lines
            .iter()
            .map(|l| l.tag != DiffTag::Context)
            .collect();
        let mut keep = vec![false; self.lines.len()];
        for (i, is_change) in changed.iter().enumerate() {
            if *is_change {
                let start = i.saturating_sub(context);
                let end = (i + context + 1).min(self.lines.len());
                keep[start..end].iter_mut().for_each(|k| *k = true);
            }
        }

        let mut rows = Vec::new();
        let mut skipped = 0;
        for (line, keep) in self.lines.iter().zip(keep) {
            if keep {
                if skipped > 0 {
                    rows.push(DiffRow::Gap(skipped));
                    skipped = 0;
                }
                rows.push(DiffRow::Line(line));
            } else {
                skipped += 1;
            }
        }
        if skipped > 0 {
            rows.push(DiffRow::Gap(skipped));
        }
        rows
    }
}
