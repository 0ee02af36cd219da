// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Streaming response handling
//!
//! Separates stream bookkeeping from the I/O that consumes the fragments.

use futures::StreamExt;

use crate::error::{ApiError, Result};
use crate::llm::provider::{EventStream, StopReason, StreamEvent, Usage};

/// Accumulator for streaming response content
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    text: String,
    stop_reason: Option<StopReason>,
    usage: Option<Usage>,
    fragment_count: usize,
    finished: bool,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a stream event and return the text fragment it carried, if any
    pub fn process_event(&mut self, event: StreamEvent) -> Result<Option<String>> {
        match event {
            StreamEvent::TextDelta(text) => {
                if text.is_empty() {
                    return Ok(None);
                }
                self.text.push_str(&text);
                self.fragment_count += 1;
                Ok(Some(text))
            }
            StreamEvent::MessageDelta { stop_reason, usage } => {
                if stop_reason.is_some() {
                    self.stop_reason = stop_reason;
                }
                if usage.is_some() {
                    self.usage = usage;
                }
                Ok(None)
            }
            StreamEvent::MessageStop => {
                self.finished = true;
                Ok(None)
            }
            StreamEvent::Error {
                error_type,
                message,
            } => Err(ApiError::StreamError(format!("{}: {}", error_type, message)).into()),
            StreamEvent::MessageStart { .. } => Ok(None),
        }
    }

    /// Text accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of non-empty fragments seen
    pub fn fragment_count(&self) -> usize {
        self.fragment_count
    }

    /// Whether an explicit end-of-message was seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Get the stop reason
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop_reason
    }

    /// Get the reported usage
    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    /// Consume the accumulator and return the full text
    pub fn finish(self) -> String {
        self.text
    }
}

/// Drain a stream, handing every text fragment to `on_fragment` as it
/// arrives, and return the concatenated text.
///
/// A transport fault mid-stream is returned as an error; fragments already
/// delivered to the callback stay delivered.
pub async fn drain_text<F>(mut stream: EventStream, mut on_fragment: F) -> Result<String>
where
    F: FnMut(&str),
{
    let mut accumulator = StreamAccumulator::new();
    while let Some(event) = stream.next().await {
        if let Some(fragment) = accumulator.process_event(event?)? {
            on_fragment(&fragment);
        }
    }
    tracing::debug!(
        fragments = accumulator.fragment_count(),
        finished = accumulator.is_finished(),
        stop_reason = ?accumulator.stop_reason(),
        tokens = ?accumulator.usage().map(|u| u.total_tokens()),
        "stream drained"
    );
    Ok(accumulator.finish())
}
