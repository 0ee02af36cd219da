// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for aiconsole
//!
//! Every error carries an [`ErrorKind`] so callers can decide how to report
//! it: input problems are per-item, transport failures degrade to empty
//! results, persistence failures leave in-memory state as-is, and logic
//! errors are reported as no-ops.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for aiconsole operations
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Completion service errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors without a known path
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A file could not be read
    #[error("Could not read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written
    #[error("Could not write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Undo requested for a path with no recorded snapshot
    #[error("No undo history for {}", .0.display())]
    NoUndoHistory(PathBuf),

    /// An edit was requested but none of the files could be read
    #[error("No valid files to edit")]
    NoValidTargets,

    /// A saved session file is malformed
    #[error("Session file {}: {message}", path.display())]
    SessionFile { path: PathBuf, message: String },
}

/// API-specific error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Authentication failed (invalid API key)
    #[error("Authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Rate limited by the API
    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    /// Requested model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned an error
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Timeout waiting for response
    #[error("Request timed out")]
    Timeout,

    /// Streaming error
    #[error("Streaming error: {0}")]
    StreamError(String),
}

/// Coarse classification used when reporting an error to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing files, bad paths, malformed arguments
    Input,
    /// Completion service or network failures
    Transport,
    /// Writes to storage that failed
    Persistence,
    /// Requests that make no sense in the current state (e.g. undo without history)
    Logic,
    /// Settings problems
    Config,
}

impl ConsoleError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::Api(_) | ConsoleError::Http(_) => ErrorKind::Transport,
            ConsoleError::Config(_) => ErrorKind::Config,
            ConsoleError::FileWrite { .. } => ErrorKind::Persistence,
            ConsoleError::NoUndoHistory(_) | ConsoleError::NoValidTargets => ErrorKind::Logic,
            ConsoleError::Io(_)
            | ConsoleError::Json(_)
            | ConsoleError::InvalidInput(_)
            | ConsoleError::FileRead { .. }
            | ConsoleError::SessionFile { .. } => ErrorKind::Input,
        }
    }

    /// Build a read error for a path
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConsoleError::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Build a write error for a path
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConsoleError::FileWrite {
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Input => write!(f, "input"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Persistence => write!(f, "persistence"),
            ErrorKind::Logic => write!(f, "logic"),
            ErrorKind::Config => write!(f, "config"),
        }
    }
}

/// Result type alias for aiconsole operations
pub type Result<T> = std::result::Result<T, ConsoleError>;
