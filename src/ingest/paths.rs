// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Expansion of command path arguments

use std::path::PathBuf;

use glob::glob as glob_match;

use crate::error::ConsoleError;

/// Paths produced by [`expand_paths`] plus the arguments that failed
#[derive(Debug, Default)]
pub struct PathExpansion {
    pub paths: Vec<PathBuf>,
    pub errors: Vec<ConsoleError>,
}

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Expand command arguments into paths, in argument order.
///
/// Plain arguments are taken literally, whether or not they exist, so the
/// caller decides how a missing file is reported. Glob patterns expand to
/// their sorted matches; a pattern that matches nothing or does not parse
/// is reported as an input error.
pub fn expand_paths<S: AsRef<str>>(args: &[S]) -> PathExpansion {
    let mut expansion = PathExpansion::default();

    for arg in args.iter().map(AsRef::as_ref) {
        if !is_pattern(arg) {
            expansion.paths.push(PathBuf::from(arg));
            continue;
        }

        let entries = match glob_match(arg) {
            Ok(entries) => entries,
            Err(e) => {
                expansion.errors.push(ConsoleError::InvalidInput(format!(
                    "Invalid glob pattern '{}': {}",
                    arg, e
                )));
                continue;
            }
        };

        let mut matched: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        matched.sort();

        if matched.is_empty() {
            expansion.errors.push(ConsoleError::InvalidInput(format!(
                "No files match '{}'",
                arg
            )));
        } else {
            tracing::debug!(pattern = arg, matches = matched.len(), "expanded glob");
            expansion.paths.extend(matched);
        }
    }

    expansion
}
