// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat front end
//!
//! Parses user input into commands and runs them against the session.

pub mod commands;
pub mod runner;

pub use commands::{format_help_text, parse_command, ChatCommand, ModelRole};
pub use runner::{ChatRunner, Flow, COMMAND_PROMPT, INSTRUCTION_PROMPT};
