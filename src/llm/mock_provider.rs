// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock LLM provider for testing
//!
//! Provides a configurable mock implementation of the LlmProvider trait
//! that can be used in unit and integration tests without making real API
//! calls. Responses are consumed in order; the last one repeats.

use async_trait::async_trait;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ApiError, Result};
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, EventStream, LlmProvider, StopReason, StreamEvent,
    Usage,
};

/// A mock LLM provider for testing
#[derive(Clone)]
pub struct MockProvider {
    name: String,
    responses: Arc<Mutex<Vec<MockResponse>>>,
    call_count: Arc<AtomicUsize>,
    recorded_requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A pre-configured response for the mock provider
#[derive(Clone, Debug)]
pub struct MockResponse {
    /// Text content to return
    pub text: String,
    /// Characters per streamed fragment
    pub chunk_size: usize,
    /// Injected transport failure
    pub failure: Option<MockFailure>,
}

/// Where an injected failure happens
#[derive(Clone, Debug)]
pub enum MockFailure {
    /// The request itself is rejected
    OnRequest(String),
    /// The stream breaks after this many fragments
    MidStream { after_fragments: usize, message: String },
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            text: "Mock response".to_string(),
            chunk_size: 7,
            failure: None,
        }
    }
}

impl MockResponse {
    /// A successful response with the given text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// A response whose request fails outright
    pub fn request_failure(message: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            failure: Some(MockFailure::OnRequest(message.into())),
            ..Default::default()
        }
    }

    /// Stream the text in fragments of `chunk_size` characters
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Break the stream after `after_fragments` fragments
    pub fn with_mid_stream_failure(
        mut self,
        after_fragments: usize,
        message: impl Into<String>,
    ) -> Self {
        self.failure = Some(MockFailure::MidStream {
            after_fragments,
            message: message.into(),
        });
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock provider lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl MockProvider {
    /// Create a new mock provider
    pub fn new() -> Self {
        Self {
            name: "mock".to_string(),
            responses: Arc::new(Mutex::new(vec![MockResponse::default()])),
            call_count: Arc::new(AtomicUsize::new(0)),
            recorded_requests: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Set a single text response
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_mock_responses(vec![MockResponse::text(text)])
    }

    /// Queue multiple text responses (returned in order)
    pub fn with_responses<S: Into<String>>(self, texts: Vec<S>) -> Self {
        self.with_mock_responses(texts.into_iter().map(MockResponse::text).collect())
    }

    /// Queue fully configured responses (returned in order)
    pub fn with_mock_responses(self, queued: Vec<MockResponse>) -> Self {
        {
            let mut responses = lock(&self.responses);
            responses.clear();
            responses.extend(queued);
        }
        self
    }

    /// Get the number of completion calls made
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get all recorded requests
    pub fn recorded_requests(&self) -> Vec<CompletionRequest> {
        lock(&self.recorded_requests).clone()
    }

    /// Get the last request made
    pub fn last_request(&self) -> Option<CompletionRequest> {
        lock(&self.recorded_requests).last().cloned()
    }

    fn next_response(&self, request: &CompletionRequest) -> MockResponse {
        lock(&self.recorded_requests).push(request.clone());
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);
        let responses = lock(&self.responses);
        if responses.is_empty() {
            MockResponse::default()
        } else {
            responses[count.min(responses.len() - 1)].clone()
        }
    }
}

fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    text.chars()
        .collect::<Vec<_>>()
        .chunks(chunk_size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let response = self.next_response(&request);

        if let Some(failure) = response.failure {
            let message = match failure {
                MockFailure::OnRequest(message) => message,
                MockFailure::MidStream { message, .. } => message,
            };
            return Err(ApiError::Network(message).into());
        }

        Ok(CompletionResponse {
            id: format!("msg_{}", self.call_count()),
            model: request.model,
            text: response.text,
            stop_reason: Some(StopReason::EndTurn),
            usage: Usage {
                input_tokens: 10,
                output_tokens: 20,
            },
        })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<EventStream> {
        let response = self.next_response(&request);

        let break_after = match response.failure {
            Some(MockFailure::OnRequest(message)) => {
                return Err(ApiError::Network(message).into());
            }
            Some(MockFailure::MidStream {
                after_fragments,
                message,
            }) => Some((after_fragments, message)),
            None => None,
        };

        let mut events = vec![Ok(StreamEvent::MessageStart {
            id: format!("msg_{}", self.call_count()),
            model: request.model.clone(),
        })];

        for (i, fragment) in chunk_text(&response.text, response.chunk_size)
            .into_iter()
            .enumerate()
        {
            if let Some((after, ref message)) = break_after {
                if i == after {
                    events.push(Err(ApiError::StreamError(message.clone()).into()));
                    return Ok(Box::pin(stream::iter(events)));
                }
            }
            events.push(Ok(StreamEvent::TextDelta(fragment)));
        }

        if let Some((_, message)) = break_after {
            events.push(Err(ApiError::StreamError(message).into()));
            return Ok(Box::pin(stream::iter(events)));
        }

        events.push(Ok(StreamEvent::MessageDelta {
            stop_reason: Some(StopReason::EndTurn),
            usage: None,
        }));
        events.push(Ok(StreamEvent::MessageStop));

        Ok(Box::pin(stream::iter(events)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::message::Message;
    use crate::llm::streaming::drain_text;

    fn request() -> CompletionRequest {
        CompletionRequest::new("mock-model", vec![Message::user("Hello")])
    }

    #[tokio::test]
    async fn test_mock_provider_complete() {
        let provider = MockProvider::new().with_response("Test response");

        let response = provider.complete(request()).await.unwrap();

        assert_eq!(response.model, "mock-model");
        assert_eq!(response.text, "Test response");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_responses_in_order_then_repeat_last() {
        let provider = MockProvider::new().with_responses(vec!["first", "second"]);

        let a = provider.complete(request()).await.unwrap();
        let b = provider.complete(request()).await.unwrap();
        let c = provider.complete(request()).await.unwrap();

        assert_eq!(a.text, "first");
        assert_eq!(b.text, "second");
        assert_eq!(c.text, "second");
        assert_eq!(provider.recorded_requests().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_provider_stream_chunks() {
        let provider = MockProvider::new()
            .with_mock_responses(vec![MockResponse::text("abcdefg").with_chunk_size(3)]);

        let stream = provider.complete_stream(request()).await.unwrap();
        let mut fragments = Vec::new();
        let text = drain_text(stream, |f| fragments.push(f.to_string()))
            .await
            .unwrap();

        assert_eq!(text, "abcdefg");
        assert_eq!(fragments, vec!["abc", "def", "g"]);
    }

    #[tokio::test]
    async fn test_mock_provider_request_failure() {
        let provider =
            MockProvider::new().with_mock_responses(vec![MockResponse::request_failure("down")]);

        assert!(provider.complete_stream(request()).await.is_err());
        assert!(provider.complete(request()).await.is_err());
    }

    #[tokio::test]
    async fn test_mock_provider_mid_stream_failure() {
        let provider = MockProvider::new().with_mock_responses(vec![MockResponse::text(
            "abcdef",
        )
        .with_chunk_size(2)
        .with_mid_stream_failure(1, "reset")]);

        let stream = provider.complete_stream(request()).await.unwrap();
        let mut fragments = Vec::new();
        let result = drain_text(stream, |f| fragments.push(f.to_string())).await;

        assert!(result.is_err());
        assert_eq!(fragments, vec!["ab"]);
    }

    #[tokio::test]
    async fn test_mock_provider_last_request() {
        let provider = MockProvider::new();
        provider
            .complete(CompletionRequest::new("other", vec![Message::user("x")]))
            .await
            .unwrap();
        assert_eq!(provider.last_request().unwrap().model, "other");
    }
}
