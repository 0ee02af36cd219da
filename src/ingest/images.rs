// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Images attached to the conversation
//!
//! Local files are inlined as base64 data URIs; remote images are passed
//! to the model by URL.

use std::path::Path;

use base64::Engine as _;

use crate::error::{ConsoleError, Result};
use crate::llm::message::{Conversation, Message};
use crate::session::{ImageSource, IngestionMemory, StoredImage};
use crate::storage::FileStorage;

fn is_url(arg: &str) -> bool {
    arg.starts_with("http://") || arg.starts_with("https://")
}

/// Resolve an `/image` argument into a stored image
pub fn load_image(storage: &dyn FileStorage, arg: &str) -> Result<StoredImage> {
    if is_url(arg) {
        return Ok(StoredImage {
            source: ImageSource::Url,
            content: arg.to_string(),
        });
    }

    let path = Path::new(arg);
    let mime = mime_guess::from_path(path)
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .ok_or_else(|| {
            ConsoleError::InvalidInput(format!("{} is not a supported image file", arg))
        })?;

    let bytes = storage.read_bytes(path)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

    Ok(StoredImage {
        source: ImageSource::Local,
        content: format!("data:{};base64,{}", mime.essence_str(), encoded),
    })
}

/// Load an image, store it and attach it to the conversation.
/// Returns the key it was stored under.
pub fn attach_image(
    storage: &dyn FileStorage,
    arg: &str,
    conversation: &mut Conversation,
    memory: &mut IngestionMemory,
) -> Result<String> {
    let image = load_image(storage, arg)?;
    let url = image.content.clone();
    let key = memory.store_image(image);
    conversation.push(Message::user_with_image(
        format!("Image {} ({})", key, arg),
        url,
    ));
    tracing::debug!(key = %key, "image attached");
    Ok(key)
}
