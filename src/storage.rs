// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! File storage used by the editor, undo and ingestion commands

use std::path::Path;

use crate::error::{ConsoleError, Result};

/// Whole-file text storage
pub trait FileStorage: Send + Sync {
    /// Read the full text of a file
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Read the raw bytes of a file, for binary content such as images
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    /// Replace the full text of a file
    fn write(&self, path: &Path, content: &str) -> Result<()>;

    /// Check whether a file exists
    fn exists(&self, path: &Path) -> bool;
}

/// Local filesystem storage
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl FileStorage for FsStorage {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| ConsoleError::read(path, e))
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| ConsoleError::read(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConsoleError::write(path, e))?;
            }
        }
        std::fs::write(path, content).map_err(|e| ConsoleError::write(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
