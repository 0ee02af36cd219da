// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Single-shot undo for edited files

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{ConsoleError, Result};
use crate::storage::FileStorage;

/// Pre-edit content of each edited file.
///
/// Holds at most one entry per path. A successful edit overwrites the
/// entry for its path; a successful undo removes it. There is no redo and
/// no deeper history.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UndoStore {
    entries: HashMap<PathBuf, String>,
}

impl UndoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `content` as the state to return to, replacing any older entry
    pub fn record(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let path = path.into();
        if self.entries.insert(path.clone(), content.into()).is_some() {
            tracing::debug!(path = %path.display(), "replaced previous undo entry");
        }
    }

    pub fn get(&self, path: &Path) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Remove and return the entry for `path`
    pub fn take(&mut self, path: &Path) -> Option<String> {
        self.entries.remove(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths that can be undone, sorted
    pub fn paths(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = self.entries.keys().map(PathBuf::as_path).collect();
        paths.sort();
        paths
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write the pre-edit content of `path` back to storage.
    ///
    /// The entry is consumed only when the write succeeds, so a failed
    /// restore can be retried. Without an entry nothing is written and
    /// [`ConsoleError::NoUndoHistory`] is returned.
    pub fn restore(&mut self, path: &Path, storage: &dyn FileStorage) -> Result<()> {
        let content = self
            .entries
            .get(path)
            .ok_or_else(|| ConsoleError::NoUndoHistory(path.to_path_buf()))?;

        storage.write(path, content)?;
        self.entries.remove(path);
        tracing::info!(path = %path.display(), "undo restored");
        Ok(())
    }
}
