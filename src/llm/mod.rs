// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM module for aiconsole
//!
//! Provides the completion-service abstraction shared by the planner and
//! the editor.

pub mod message;
pub mod mock_provider;
pub mod provider;
pub mod providers;
pub mod streaming;

pub use message::*;
pub use provider::*;
