// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Context the user has ingested into the session

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ingest::search::SearchResult;

/// Where a stored image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// Local file, stored as a data URI
    Local,
    /// Remote URL, stored as given
    Url,
}

/// An image attached to the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredImage {
    pub source: ImageSource,
    /// Data URI or URL
    pub content: String,
}

/// Files, images and searches added to the session
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IngestionMemory {
    added_files: Vec<PathBuf>,
    stored_images: BTreeMap<String, StoredImage>,
    stored_searches: BTreeMap<String, Vec<SearchResult>>,
    image_counter: usize,
}

impl IngestionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a file added as context. Duplicates are kept.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        self.added_files.push(path.into());
    }

    pub fn added_files(&self) -> &[PathBuf] {
        &self.added_files
    }

    /// Store an image under the next sequential key and return the key
    pub fn store_image(&mut self, image: StoredImage) -> String {
        self.image_counter += 1;
        let key = format!("image_{}", self.image_counter);
        self.stored_images.insert(key.clone(), image);
        key
    }

    pub fn image(&self, key: &str) -> Option<&StoredImage> {
        self.stored_images.get(key)
    }

    pub fn images(&self) -> impl Iterator<Item = (&str, &StoredImage)> {
        self.stored_images.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn store_search(&mut self, query: impl Into<String>, results: Vec<SearchResult>) {
        self.stored_searches.insert(query.into(), results);
    }

    /// Cached results for a query
    pub fn search(&self, query: &str) -> Option<&[SearchResult]> {
        self.stored_searches.get(query).map(Vec::as_slice)
    }

    pub fn searches(&self) -> impl Iterator<Item = (&str, &[SearchResult])> {
        self.stored_searches
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn image_count(&self) -> usize {
        self.stored_images.len()
    }

    pub fn search_count(&self) -> usize {
        self.stored_searches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.added_files.is_empty()
            && self.stored_images.is_empty()
            && self.stored_searches.is_empty()
    }

    /// Forget everything, restarting image keys at `image_1`
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
