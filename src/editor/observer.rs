// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Progress sink for planning and applying edits
//!
//! The console implements this for live rendering; tests use
//! [`RecordingObserver`].

use std::path::{Path, PathBuf};

use super::reducer::LineCommit;
use super::FileEditOutcome;
use crate::diff::FileDiff;
use crate::error::{ConsoleError, ErrorKind};

/// Receives progress events from the planner and the applier.
/// Every method defaults to doing nothing.
pub trait EditObserver {
    /// A fragment of the plan arrived
    fn on_plan_fragment(&mut self, _fragment: &str) {}

    /// The plan is complete
    fn on_plan_complete(&mut self, _plan: &str) {}

    /// A file is about to be rewritten
    fn on_file_started(&mut self, _path: &Path) {}

    /// A line of a file was committed
    fn on_line_commit(&mut self, _path: &Path, _commit: &LineCommit) {}

    /// Before/after comparison of a rewritten file
    fn on_diff(&mut self, _path: &Path, _diff: &FileDiff) {}

    /// A file finished, successfully or not
    fn on_file_finished(&mut self, _outcome: &FileEditOutcome) {}

    /// A non-fatal error worth showing
    fn on_error(&mut self, _error: &ConsoleError) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NullObserver;

impl EditObserver for NullObserver {}

/// Observer that keeps every event, for assertions
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub plan_fragments: Vec<String>,
    pub plans: Vec<String>,
    pub started: Vec<PathBuf>,
    pub commits: Vec<(PathBuf, LineCommit)>,
    pub diffs: Vec<(PathBuf, FileDiff)>,
    pub finished: Vec<(PathBuf, bool)>,
    pub errors: Vec<(ErrorKind, String)>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commits reported for one path
    pub fn commits_for(&self, path: &Path) -> Vec<&LineCommit> {
        self.commits
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, c)| c)
            .collect()
    }
}

impl EditObserver for RecordingObserver {
    fn on_plan_fragment(&mut self, fragment: &str) {
        self.plan_fragments.push(fragment.to_string());
    }

    fn on_plan_complete(&mut self, plan: &str) {
        self.plans.push(plan.to_string());
    }

    fn on_file_started(&mut self, path: &Path) {
        self.started.push(path.to_path_buf());
    }

    fn on_line_commit(&mut self, path: &Path, commit: &LineCommit) {
        self.commits.push((path.to_path_buf(), commit.clone()));
    }

    fn on_diff(&mut self, path: &Path, diff: &FileDiff) {
        self.diffs.push((path.to_path_buf(), diff.clone()));
    }

    fn on_file_finished(&mut self, outcome: &FileEditOutcome) {
        self.finished
            .push((outcome.path.clone(), outcome.result.is_ok()));
    }

    fn on_error(&mut self, error: &ConsoleError) {
        self.errors.push((error.kind(), error.to_string()));
    }
}
