// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Web search as conversation context

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ConsoleError, Result};
use crate::llm::message::{Conversation, Message};
use crate::session::IngestionMemory;

/// DuckDuckGo instant answer endpoint
pub const DUCKDUCKGO_API_URL: &str = "https://api.duckduckgo.com/";

/// Results kept per query
pub const MAX_SEARCH_RESULTS: usize = 5;

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A web search backend
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

/// Search through the DuckDuckGo instant answer API
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Topic {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

impl RelatedTopic {
    fn collect_into(self, results: &mut Vec<SearchResult>) {
        match self {
            RelatedTopic::Topic { text, first_url } => {
                let title = text.split(" - ").next().unwrap_or(&text).to_string();
                results.push(SearchResult {
                    title,
                    url: first_url,
                    snippet: text,
                });
            }
            RelatedTopic::Group { topics } => {
                for topic in topics {
                    topic.collect_into(results);
                }
            }
        }
    }
}

impl InstantAnswer {
    fn into_results(self, max_results: usize) -> Vec<SearchResult> {
        let mut results = Vec::new();
        if !self.abstract_text.is_empty() {
            results.push(SearchResult {
                title: self.heading,
                url: self.abstract_url,
                snippet: self.abstract_text,
            });
        }
        for topic in self.related_topics {
            topic.collect_into(&mut results);
        }
        results.truncate(max_results);
        results
    }
}

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DUCKDUCKGO_API_URL.to_string(),
        }
    }

    /// Point at a different endpoint (used by tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        tracing::debug!(query, "web search");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let answer: InstantAnswer = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        Ok(answer.into_results(max_results))
    }
}

/// Context message for a set of search results
pub fn format_results(query: &str, results: &[SearchResult]) -> String {
    let mut text = format!("Search results for \"{}\":\n", query);
    if results.is_empty() {
        text.push_str("No results found.");
    }
    for (i, result) in results.iter().enumerate() {
        text.push_str(&format!(
            "{}. {}\n   {}\n   {}\n",
            i + 1,
            result.title,
            result.url,
            result.snippet
        ));
    }
    text.trim_end().to_string()
}

/// Run a search, or reuse the cached results for the same query, and add
/// the results to the conversation. Returns the results and whether they
/// came from the cache.
pub async fn search_into_context(
    provider: &dyn SearchProvider,
    query: &str,
    conversation: &mut Conversation,
    memory: &mut IngestionMemory,
) -> Result<(Vec<SearchResult>, bool)> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ConsoleError::InvalidInput(
            "Search query cannot be empty".to_string(),
        ));
    }

    let (results, cached) = match memory.search(query) {
        Some(results) => (results.to_vec(), true),
        None => {
            let results = provider.search(query, MAX_SEARCH_RESULTS).await?;
            memory.store_search(query, results.clone());
            (results, false)
        }
    };

    conversation.push(Message::user(format_results(query, &results)));
    Ok((results, cached))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct CountingSearch(AtomicUsize);

    #[async_trait]
    impl SearchProvider for CountingSearch {
        async fn search(&self, query: &str, _max: usize) -> Result<Vec<SearchResult>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![SearchResult {
                title: query.to_string(),
                url: "https://example.com".to_string(),
                snippet: "snippet".to_string(),
            }])
        }
    }

    #[tokio::test]
    async fn test_search_results_are_cached_per_query() {
        let provider = CountingSearch(AtomicUsize::new(0));
        let mut conversation = Conversation::with_system("sys");
        let mut memory = IngestionMemory::new();

        let (_, cached) = search_into_context(&provider, "rust", &mut conversation, &mut memory)
            .await
            .unwrap();
        assert!(!cached);
        let (results, cached) =
            search_into_context(&provider, " rust ", &mut conversation, &mut memory)
                .await
                .unwrap();

        assert!(cached);
        assert_eq!(results.len(), 1);
        assert_eq!(provider.0.load(Ordering::SeqCst), 1);
        assert_eq!(conversation.len(), 3);
        assert!(conversation.last().unwrap().text().contains("1. rust"));
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let provider = CountingSearch(AtomicUsize::new(0));
        let mut conversation = Conversation::with_system("sys");
        let mut memory = IngestionMemory::new();

        let result = search_into_context(&provider, "  ", &mut conversation, &mut memory).await;

        assert!(matches!(result, Err(ConsoleError::InvalidInput(_))));
        assert_eq!(provider.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duckduckgo_parses_abstract_and_topics() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "rust lang"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Heading": "Rust",
                "AbstractText": "Rust is a programming language.",
                "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
                "RelatedTopics": [
                    {"Text": "Cargo - Rust package manager", "FirstURL": "https://duckduckgo.com/Cargo"},
                    {"Name": "Group", "Topics": [
                        {"Text": "Ferris - mascot", "FirstURL": "https://duckduckgo.com/Ferris"}
                    ]}
                ]
            })))
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new().with_base_url(server.uri());
        let results = search.search("rust lang", 5).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].title, "Rust");
        assert_eq!(results[1].title, "Cargo");
        assert_eq!(results[1].snippet, "Cargo - Rust package manager");
        assert_eq!(results[2].url, "https://duckduckgo.com/Ferris");
    }

    #[tokio::test]
    async fn test_duckduckgo_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new().with_base_url(server.uri());
        let err = search.search("x", 5).await.unwrap_err();

        assert!(matches!(
            err,
            ConsoleError::Api(ApiError::ServerError { status: 503, .. })
        ));
    }

    #[test]
    fn test_results_truncate() {
        let answer = InstantAnswer {
            heading: String::new(),
            abstract_text: String::new(),
            abstract_url: String::new(),
            related_topics: (0..10)
                .map(|i| RelatedTopic::Topic {
                    text: format!("t{i}"),
                    first_url: format!("u{i}"),
                })
                .collect(),
        };
        assert_eq!(answer.into_results(3).len(), 3);
    }
}
