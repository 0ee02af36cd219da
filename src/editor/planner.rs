// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Edit planner
//!
//! Sends every target file plus the user's instruction to the planning model
//! in one request and returns the resulting plan text.

use std::path::PathBuf;

use super::observer::EditObserver;
use super::prompts::build_plan_prompt;
use super::EditTarget;
use crate::error::{ConsoleError, Result};
use crate::llm::message::{Conversation, Message};
use crate::llm::provider::{CompletionRequest, LlmProvider};
use crate::llm::streaming::drain_text;
use crate::storage::FileStorage;

/// Read every requested file, reporting the ones that cannot be read.
///
/// Fails with [`ConsoleError::NoValidTargets`] when none are left.
pub fn load_targets(
    storage: &dyn FileStorage,
    paths: &[PathBuf],
    observer: &mut dyn EditObserver,
) -> Result<Vec<EditTarget>> {
    let mut targets = Vec::with_capacity(paths.len());
    for path in paths {
        match storage.read_to_string(path) {
            Ok(content) => targets.push(EditTarget::new(path.clone(), content)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable edit target");
                observer.on_error(&e);
            }
        }
    }

    if targets.is_empty() {
        return Err(ConsoleError::NoValidTargets);
    }
    Ok(targets)
}

/// Issues the single planning request of an edit
pub struct EditPlanner<'a> {
    provider: &'a dyn LlmProvider,
    model: &'a str,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl<'a> EditPlanner<'a> {
    pub fn new(provider: &'a dyn LlmProvider, model: &'a str) -> Self {
        Self {
            provider,
            model,
            max_tokens: None,
            temperature: None,
        }
    }

    /// Set sampling limits for the planning request
    pub fn with_limits(mut self, max_tokens: Option<u32>, temperature: Option<f32>) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Produce a plan for `instruction` over `targets`.
    ///
    /// On success the prompt and the plan are appended to `history`. A
    /// transport failure is reported to the observer and yields an empty
    /// plan; `history` is left untouched in that case.
    pub async fn plan(
        &self,
        history: &mut Conversation,
        targets: &[EditTarget],
        instruction: &str,
        observer: &mut dyn EditObserver,
    ) -> String {
        let prompt = build_plan_prompt(targets, instruction);
        tracing::info!(
            model = self.model,
            files = targets.len(),
            "requesting edit plan"
        );

        match self.request_plan(history, &prompt, observer).await {
            Ok(plan) => {
                history.push(Message::user(prompt));
                history.push(Message::assistant(plan.clone()));
                observer.on_plan_complete(&plan);
                plan
            }
            Err(e) => {
                tracing::warn!(error = %e, "planning request failed");
                observer.on_error(&e);
                String::new()
            }
        }
    }

    async fn request_plan(
        &self,
        history: &Conversation,
        prompt: &str,
        observer: &mut dyn EditObserver,
    ) -> Result<String> {
        let mut messages = history.messages().to_vec();
        messages.push(Message::user(prompt));

        let request = CompletionRequest::new(self.model, messages)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        let stream = self.provider.complete_stream(request).await?;
        drain_text(stream, |fragment| observer.on_plan_fragment(fragment)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::observer::RecordingObserver;
    use crate::error::ErrorKind;
    use crate::llm::message::Role;
    use crate::llm::mock_provider::{MockProvider, MockResponse};
    use crate::storage::FsStorage;
    use tempfile::TempDir;

    fn targets() -> Vec<EditTarget> {
        vec![EditTarget::new(PathBuf::from("a.txt"), "alpha\nbeta")]
    }

    #[test]
    fn test_load_targets_skips_unreadable_files() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.txt");
        std::fs::write(&good, "content").unwrap();
        let missing = dir.path().join("missing.txt");
        let mut observer = RecordingObserver::new();

        let loaded = load_targets(&FsStorage, &[missing, good.clone()], &mut observer).unwrap();

        assert_eq!(loaded, vec![EditTarget::new(good, "content")]);
        assert_eq!(observer.errors.len(), 1);
        assert_eq!(observer.errors[0].0, ErrorKind::Input);
    }

    #[test]
    fn test_load_targets_with_no_valid_files() {
        let dir = TempDir::new().unwrap();
        let mut observer = RecordingObserver::new();

        let err = load_targets(
            &FsStorage,
            &[dir.path().join("nope.txt")],
            &mut observer,
        )
        .unwrap_err();

        assert!(matches!(err, ConsoleError::NoValidTargets));
    }

    #[tokio::test]
    async fn test_plan_appends_prompt_and_reply() {
        let provider = MockProvider::new().with_response("1. a.txt line 2: rename beta");
        let mut history = Conversation::with_system("planner");
        let mut observer = RecordingObserver::new();

        let plan = EditPlanner::new(&provider, "planner-model")
            .plan(&mut history, &targets(), "rename beta", &mut observer)
            .await;

        assert_eq!(plan, "1. a.txt line 2: rename beta");
        assert_eq!(history.len(), 3);
        assert_eq!(history.messages()[1].role, Role::User);
        assert!(history.messages()[1].text().contains("File: a.txt"));
        assert_eq!(history.messages()[2].text(), plan);
        assert_eq!(observer.plan_fragments.concat(), plan);
        assert_eq!(observer.plans, vec![plan.clone()]);

        let request = provider.last_request().unwrap();
        assert_eq!(request.model, "planner-model");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_plan_transport_failure_yields_empty_plan() {
        let provider =
            MockProvider::new().with_mock_responses(vec![MockResponse::request_failure("down")]);
        let mut history = Conversation::with_system("planner");
        let mut observer = RecordingObserver::new();

        let plan = EditPlanner::new(&provider, "m")
            .plan(&mut history, &targets(), "do it", &mut observer)
            .await;

        assert!(plan.is_empty());
        assert_eq!(history.len(), 1);
        assert_eq!(observer.errors.len(), 1);
        assert_eq!(observer.errors[0].0, ErrorKind::Transport);
        assert!(observer.plans.is_empty());
    }

    #[tokio::test]
    async fn test_plan_uses_previous_history_as_context() {
        let provider = MockProvider::new().with_responses(vec!["plan one", "plan two"]);
        let mut history = Conversation::with_system("planner");
        let mut observer = RecordingObserver::new();
        let planner = EditPlanner::new(&provider, "m");

        planner
            .plan(&mut history, &targets(), "first", &mut observer)
            .await;
        planner
            .plan(&mut history, &targets(), "second", &mut observer)
            .await;

        let request = provider.last_request().unwrap();
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[2].text(), "plan one");
        assert_eq!(history.len(), 5);
    }
}
