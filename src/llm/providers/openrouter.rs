// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OpenRouter API provider implementation
//!
//! Implements the LlmProvider trait for OpenRouter's OpenAI-compatible
//! chat-completions endpoint, which serves both the planning and the
//! editing model.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ConsoleError, Result};
use crate::llm::message::Message;
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, EventStream, LlmProvider, StopReason, StreamEvent,
    Usage,
};

pub const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Application name sent for OpenRouter rankings
const SITE_NAME: &str = "aiconsole";

/// OpenRouter provider
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, OPENROUTER_API_URL)
    }

    /// Create with a custom base URL
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Build the request body
    fn build_request<'a>(&self, request: &'a CompletionRequest, stream: bool) -> OpenRouterRequest<'a> {
        OpenRouterRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream,
        }
    }

    async fn send(&self, body: &OpenRouterRequest<'_>) -> Result<reqwest::Response> {
        let req = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", &self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", SITE_NAME);

        let response = req.json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                ConsoleError::Api(ApiError::Timeout)
            } else if e.is_connect() {
                ConsoleError::Api(ApiError::Network(e.to_string()))
            } else {
                ConsoleError::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status, &body));
        }
        Ok(response)
    }

    /// Parse an error response
    fn parse_error(&self, status: u16, body: &str) -> ConsoleError {
        let Ok(error_response) = serde_json::from_str::<OpenRouterError>(body) else {
            return ConsoleError::Api(ApiError::ServerError {
                status,
                message: body.to_string(),
            });
        };

        let message = error_response.error.message;
        let code = error_response
            .error
            .code
            .map(|c| match c {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .unwrap_or_default();

        let api_error = match (code.as_str(), status) {
            ("invalid_api_key" | "authentication_error", _) | (_, 401) => {
                ApiError::AuthenticationFailed
            }
            ("rate_limit_exceeded", _) | (_, 429) => ApiError::RateLimited(60),
            ("model_not_found", _) => ApiError::ModelNotFound(message),
            _ => ApiError::ServerError { status, message },
        };
        ConsoleError::Api(api_error)
    }
}

/// Split complete SSE lines off the front of `buffer` and turn them into events
fn drain_sse_lines(buffer: &mut Vec<u8>, started: &mut bool) -> Vec<Result<StreamEvent>> {
    let mut events = Vec::new();

    while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=line_end).collect();
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim();

        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        let data = data.trim_start();

        if data == "[DONE]" {
            events.push(Ok(StreamEvent::MessageStop));
            continue;
        }

        let chunk = match serde_json::from_str::<OpenRouterStreamChunk>(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                tracing::debug!(error = %e, data, "skipping unparseable stream chunk");
                continue;
            }
        };

        if let Some(error) = chunk.error {
            events.push(Ok(StreamEvent::Error {
                error_type: "stream_error".to_string(),
                message: error.message,
            }));
            continue;
        }

        if !*started {
            *started = true;
            events.push(Ok(StreamEvent::MessageStart {
                id: chunk.id.clone().unwrap_or_default(),
                model: chunk.model.clone().unwrap_or_default(),
            }));
        }

        let usage = chunk.usage.map(|u| Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        if let Some(choice) = chunk.choices.into_iter().next() {
            if let Some(text) = choice.delta.content {
                if !text.is_empty() {
                    events.push(Ok(StreamEvent::TextDelta(text)));
                }
            }
            if let Some(reason) = choice.finish_reason {
                events.push(Ok(StreamEvent::MessageDelta {
                    stop_reason: Some(StopReason::from_finish_reason(&reason)),
                    usage,
                }));
            }
        }
    }

    events
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let body = self.build_request(&request, false);
        let response = self.send(&body).await?;
        let api_response: OpenRouterResponse = response.json().await?;

        let choice = api_response.choices.into_iter().next().ok_or_else(|| {
            ConsoleError::Api(ApiError::InvalidResponse(
                "No choices in response".to_string(),
            ))
        })?;

        Ok(CompletionResponse {
            id: api_response.id.unwrap_or_default(),
            model: api_response.model.unwrap_or(request.model),
            text: choice.message.content.unwrap_or_default(),
            stop_reason: choice
                .finish_reason
                .as_deref()
                .map(StopReason::from_finish_reason),
            usage: api_response
                .usage
                .map(|u| Usage {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                })
                .unwrap_or_default(),
        })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<EventStream> {
        let body = self.build_request(&request, true);
        let response = self.send(&body).await?;

        let event_stream = response
            .bytes_stream()
            .scan(
                (Vec::<u8>::new(), false),
                |state: &mut (Vec<u8>, bool), result| {
                    let (buffer, started) = state;
                    let events = match result {
                        Ok(bytes) => {
                            buffer.extend_from_slice(&bytes);
                            drain_sse_lines(buffer, started)
                        }
                        Err(e) => vec![Err(ConsoleError::Api(ApiError::StreamError(
                            e.to_string(),
                        )))],
                    };
                    futures::future::ready(Some(events))
                },
            )
            .flat_map(futures::stream::iter);

        Ok(Box::pin(event_stream))
    }
}

// OpenRouter API types (OpenAI-compatible format)

#[derive(Debug, Serialize)]
struct OpenRouterRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    id: Option<String>,
    model: Option<String>,
    choices: Vec<OpenRouterChoice>,
    usage: Option<OpenRouterUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterChoice {
    message: OpenRouterResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenRouterError {
    error: OpenRouterErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenRouterErrorDetail {
    message: String,
    code: Option<serde_json::Value>,
}

// Streaming types
#[derive(Debug, Deserialize)]
struct OpenRouterStreamChunk {
    id: Option<String>,
    model: Option<String>,
    #[serde(default)]
    choices: Vec<OpenRouterStreamChoice>,
    usage: Option<OpenRouterUsage>,
    error: Option<OpenRouterErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterStreamChoice {
    delta: OpenRouterStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenRouterStreamDelta {
    content: Option<String>,
}
