// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Line input for the command loop

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::error::Result;

/// Source of user input lines
pub trait LineInput {
    /// Show `prompt` and read one line without its line ending.
    /// Returns `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Reads from stdin and appends every entered line to a history file
pub struct StdinInput {
    history_file: Option<PathBuf>,
}

impl StdinInput {
    pub fn new(history_file: Option<PathBuf>) -> Self {
        Self { history_file }
    }

    fn remember(&self, line: &str) {
        let Some(path) = &self.history_file else {
            return;
        };
        if line.trim().is_empty() {
            return;
        }
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "{}", line));
        if let Err(e) = result {
            tracing::debug!(path = %path.display(), error = %e, "could not append to input history");
        }
    }
}

impl LineInput for StdinInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim_end_matches(['\r', '\n']).to_string();
        self.remember(&line);
        Ok(Some(line))
    }
}

/// Pre-recorded input lines, for tests and scripted runs
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }

    /// Prompts shown so far
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineInput for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scripted_input_replays_lines() {
        let mut input = ScriptedInput::new(["/help", "exit"]);

        assert_eq!(input.read_line("> ").unwrap().as_deref(), Some("/help"));
        assert_eq!(input.read_line("> ").unwrap().as_deref(), Some("exit"));
        assert_eq!(input.read_line("> ").unwrap(), None);
        assert_eq!(input.prompts().len(), 3);
    }

    #[test]
    fn test_history_file_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.txt");
        let input = StdinInput::new(Some(path.clone()));

        input.remember("/add a.py");
        input.remember("   ");
        input.remember("hello");

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "/add a.py\nhello\n");
    }
}
