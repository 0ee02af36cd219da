// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Bringing files, images and web results into the conversation

pub mod files;
pub mod images;
pub mod paths;
pub mod search;
pub mod templates;

pub use files::{add_file, numbered_lines};
pub use images::{attach_image, load_image};
pub use paths::{expand_paths, PathExpansion};
pub use search::{search_into_context, DuckDuckGoSearch, SearchProvider, SearchResult};
pub use templates::{create_file, template_for, NewFileStatus};
