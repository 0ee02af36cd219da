// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use aiconsole::error::{ApiError, ConsoleError};
use aiconsole::llm::message::Message;
use aiconsole::llm::provider::{CompletionRequest, LlmProvider};
use aiconsole::llm::providers::OpenRouterProvider;
use aiconsole::llm::streaming::drain_text;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> OpenRouterProvider {
    OpenRouterProvider::with_base_url("sk-or-test", format!("{}/chat/completions", server.uri()))
}

fn request() -> CompletionRequest {
    CompletionRequest::new(
        "openai/gpt-4o",
        vec![Message::system("be brief"), Message::user("hello")],
    )
}

fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for (i, fragment) in fragments.iter().enumerate() {
        let chunk = serde_json::json!({
            "id": "gen-1",
            "model": "openai/gpt-4o",
            "choices": [{"index": 0, "delta": {"content": fragment}, "finish_reason": null}],
        });
        body.push_str(&format!("data: {}\n\n", chunk));
        if i == 0 {
            body.push_str(": OPENROUTER PROCESSING\n\n");
        }
    }
    let last = serde_json::json!({
        "id": "gen-1",
        "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}],
    });
    body.push_str(&format!("data: {}\n\n", last));
    body.push_str("data: [DONE]\n\n");
    body
}

#[tokio::test]
async fn test_complete_parses_message_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-or-test"))
        .and(header("x-title", "aiconsole"))
        .and(body_partial_json(serde_json::json!({"model": "openai/gpt-4o"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "gen-42",
            "model": "openai/gpt-4o",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hi!"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 2, "total_tokens": 11}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider_for(&server).complete(request()).await.unwrap();

    assert_eq!(response.id, "gen-42");
    assert_eq!(response.text, "Hi!");
}

#[tokio::test]
async fn test_stream_yields_fragments_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(sse_body(&["fn main", "() {\n    pri", "nt!()\n}"]), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let stream = provider_for(&server)
        .complete_stream(request())
        .await
        .unwrap();
    let mut fragments = Vec::new();
    let text = drain_text(stream, |f| fragments.push(f.to_string()))
        .await
        .unwrap();

    assert_eq!(text, "fn main() {\n    print!()\n}");
    assert_eq!(fragments.len(), 3);
}

#[tokio::test]
async fn test_in_band_stream_error_fails_drain() {
    let server = MockServer::start().await;
    let body = format!(
        "data: {}\n\ndata: {}\n\n",
        serde_json::json!({"id": "gen-1", "choices": [{"index": 0, "delta": {"content": "par"}}]}),
        serde_json::json!({"error": {"message": "upstream overloaded", "code": 502}}),
    );
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let stream = provider_for(&server)
        .complete_stream(request())
        .await
        .unwrap();
    let err = drain_text(stream, |_| {}).await.unwrap_err();

    assert!(err.to_string().contains("upstream overloaded"));
}

#[tokio::test]
async fn test_unauthorized_maps_to_authentication_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "No auth credentials found", "code": 401}
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete_stream(request())
        .await
        .err()
        .unwrap();

    assert!(matches!(err, ConsoleError::Api(ApiError::AuthenticationFailed)));
}

#[tokio::test]
async fn test_unparseable_error_body_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = provider_for(&server).complete(request()).await.unwrap_err();

    assert!(matches!(
        err,
        ConsoleError::Api(ApiError::ServerError { status: 429, .. })
    ));
}

#[tokio::test]
async fn test_rate_limit_with_error_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"message": "Rate limit exceeded", "code": 429}
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server).complete(request()).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Api(ApiError::RateLimited(_))));
    assert_eq!(err.kind().to_string(), "transport");
}
