// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Interactive command loop
//!
//! One command runs at a time against the session state. Failures inside a
//! command are shown on the console and never end the loop; only a broken
//! input source does.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::commands::{format_help_text, parse_command, ChatCommand, ModelRole};
use crate::console::{Console, LineInput};
use crate::editor::{load_targets, ApplyOptions, EditApplier, EditPlanner};
use crate::error::{ConsoleError, Result};
use crate::ingest::{
    add_file, attach_image, create_file, expand_paths, numbered_lines, search_into_context,
    NewFileStatus, SearchProvider,
};
use crate::llm::message::Message;
use crate::llm::provider::{CompletionRequest, LlmProvider};
use crate::llm::streaming::drain_text;
use crate::session::{default_history_filename, ImageSource, SessionState};
use crate::storage::FileStorage;

/// Prompt shown for each command
pub const COMMAND_PROMPT: &str = "You: ";

/// Prompt shown when `/edit` asks for the instruction
pub const INSTRUCTION_PROMPT: &str = "Edit instruction: ";

/// Longest message excerpt shown by `/history`
const HISTORY_PREVIEW_CHARS: usize = 200;

/// Whether the loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Runs chat commands against one session
pub struct ChatRunner {
    provider: Arc<dyn LlmProvider>,
    search: Arc<dyn SearchProvider>,
    storage: Arc<dyn FileStorage>,
    options: ApplyOptions,
    state: SessionState,
    console: Console,
}

impl ChatRunner {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        search: Arc<dyn SearchProvider>,
        storage: Arc<dyn FileStorage>,
        state: SessionState,
        console: Console,
    ) -> Self {
        Self {
            provider,
            search,
            storage,
            options: ApplyOptions::default(),
            state,
            console,
        }
    }

    /// Set edit behaviour and sampling limits. `show_diff` is taken from the
    /// session state when an edit runs.
    pub fn with_options(mut self, options: ApplyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn console_mut(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Read and run commands until exit or end of input
    pub async fn run(&mut self, input: &mut dyn LineInput) -> Result<()> {
        self.console.info("Type /help for commands, exit to leave.");
        while let Some(line) = input.read_line(COMMAND_PROMPT)? {
            let command = parse_command(&line);
            tracing::debug!(?command, "command");
            if self.execute(command, input).await? == Flow::Exit {
                break;
            }
        }
        self.console.line("Goodbye!");
        Ok(())
    }

    /// Run one parsed command
    pub async fn execute(
        &mut self,
        command: ChatCommand,
        input: &mut dyn LineInput,
    ) -> Result<Flow> {
        match command {
            ChatCommand::Exit => return Ok(Flow::Exit),
            ChatCommand::Empty => {}
            ChatCommand::Message(text) => self.chat(&text).await,
            ChatCommand::Add(args) => self.add_files(&args),
            ChatCommand::Edit(args) => self.edit(&args, input).await?,
            ChatCommand::New(args) => self.new_files(&args),
            ChatCommand::Search(query) => self.search(&query).await,
            ChatCommand::Image(args) => self.attach_images(&args),
            ChatCommand::Clear => {
                self.state.clear();
                self.console
                    .success("Cleared added files, images and searches.");
            }
            ChatCommand::Reset => {
                self.state.reset();
                self.console
                    .success("Session reset: conversations, context and undo history cleared.");
            }
            ChatCommand::Diff => {
                let on = self.state.toggle_diff();
                self.console
                    .info(&format!("Diff display {}", if on { "on" } else { "off" }));
            }
            ChatCommand::History => self.show_history(),
            ChatCommand::Save(file) => self.save(file),
            ChatCommand::Load(file) => self.load(Path::new(&file)),
            ChatCommand::Undo(args) => self.undo(&args),
            ChatCommand::Help => self.console.line(&format_help_text()),
            ChatCommand::Model => {
                let text = format!(
                    "Planner model: {}\nEditor model: {}",
                    self.state.planner_model, self.state.editor_model
                );
                self.console.info(&text);
            }
            ChatCommand::ChangeModel { role, model } => {
                let slot = match role {
                    ModelRole::Planner => &mut self.state.planner_model,
                    ModelRole::Editor => &mut self.state.editor_model,
                };
                *slot = model;
                let text = format!("{} model set to {}", role, slot);
                tracing::info!(%role, model = %slot, "model changed");
                self.console.success(&text);
            }
            ChatCommand::Show(args) => self.show(&args),
            ChatCommand::Usage(usage) => self.console.warning(&format!("Usage: {}", usage)),
            ChatCommand::Unknown(name) => self.console.warning(&format!(
                "Unknown command: {}. Type /help for the list of commands.",
                name
            )),
        }
        Ok(Flow::Continue)
    }

    /// Expand arguments, reporting patterns that failed
    fn expand(&mut self, args: &[String]) -> Vec<PathBuf> {
        let expansion = expand_paths(args);
        for error in &expansion.errors {
            self.console.report(error);
        }
        expansion.paths
    }

    async fn chat(&mut self, text: &str) {
        let mut messages = self.state.planning.messages().to_vec();
        messages.push(Message::user(text));
        let request = CompletionRequest::new(&self.state.planner_model, messages)
            .with_max_tokens(self.options.max_tokens)
            .with_temperature(self.options.temperature);

        let console = &mut self.console;
        let result = match self.provider.complete_stream(request).await {
            Ok(stream) => drain_text(stream, |fragment| console.print(fragment)).await,
            Err(e) => Err(e),
        };
        self.console.line("");

        match result {
            Ok(reply) => {
                self.state.planning.push(Message::user(text));
                self.state.planning.push(Message::assistant(reply));
            }
            Err(e) => self.console.report(&e),
        }
    }

    async fn edit(&mut self, args: &[String], input: &mut dyn LineInput) -> Result<()> {
        let paths = self.expand(args);
        let targets = match load_targets(self.storage.as_ref(), &paths, &mut self.console) {
            Ok(targets) => targets,
            Err(e) => {
                self.console.report(&e);
                return Ok(());
            }
        };

        let instruction = input.read_line(INSTRUCTION_PROMPT)?.unwrap_or_default();
        if instruction.trim().is_empty() {
            self.console.warning("No instruction given; nothing was edited.");
            return Ok(());
        }

        let planner_model = self.state.planner_model.clone();
        self.console.info("Planning edits...");
        let plan = EditPlanner::new(self.provider.as_ref(), &planner_model)
            .with_limits(self.options.max_tokens, self.options.temperature)
            .plan(
                &mut self.state.planning,
                &targets,
                &instruction,
                &mut self.console,
            )
            .await;
        if plan.trim().is_empty() {
            self.console.warning("No plan was produced; nothing was edited.");
            return Ok(());
        }

        let editor_model = self.state.editor_model.clone();
        let options = ApplyOptions {
            show_diff: self.state.show_diff,
            ..self.options
        };
        let applier = EditApplier::new(self.provider.as_ref(), self.storage.as_ref(), &editor_model)
            .with_options(options);
        let mut ctx = self.state.edit_context();
        let report = applier
            .apply(&targets, &plan, &mut ctx, &mut self.console)
            .await;

        let succeeded = report.succeeded().count();
        let total = report.outcomes.len();
        if report.all_succeeded() {
            self.console
                .success(&format!("Edited {} of {} files.", succeeded, total));
        } else {
            self.console
                .warning(&format!("Edited {} of {} files.", succeeded, total));
        }
        Ok(())
    }

    fn add_files(&mut self, args: &[String]) {
        for path in self.expand(args) {
            match add_file(
                self.storage.as_ref(),
                &path,
                &mut self.state.planning,
                &mut self.state.memory,
            ) {
                Ok(lines) => self
                    .console
                    .success(&format!("Added {} ({} lines)", path.display(), lines)),
                Err(e) => self.console.report(&e),
            }
        }
    }

    fn new_files(&mut self, args: &[String]) {
        for path in self.expand(args) {
            match create_file(self.storage.as_ref(), &path) {
                Ok(NewFileStatus::Created) => self
                    .console
                    .success(&format!("Created {}", path.display())),
                Ok(NewFileStatus::AlreadyExists) => self.console.warning(&format!(
                    "{} already exists; left unchanged",
                    path.display()
                )),
                Err(e) => self.console.report(&e),
            }
        }
    }

    async fn search(&mut self, query: &str) {
        let result = search_into_context(
            self.search.as_ref(),
            query,
            &mut self.state.planning,
            &mut self.state.memory,
        )
        .await;

        match result {
            Ok((results, cached)) => {
                let source = if cached { " (cached)" } else { "" };
                self.console.info(&format!(
                    "{} results for \"{}\"{}",
                    results.len(),
                    query.trim(),
                    source
                ));
                for (i, result) in results.iter().enumerate() {
                    self.console
                        .line(&format!("{}. {} - {}", i + 1, result.title, result.url));
                }
            }
            Err(e) => self.console.report(&e),
        }
    }

    fn attach_images(&mut self, args: &[String]) {
        for arg in args {
            match attach_image(
                self.storage.as_ref(),
                arg,
                &mut self.state.planning,
                &mut self.state.memory,
            ) {
                Ok(key) => self
                    .console
                    .success(&format!("Attached {} as {}", arg, key)),
                Err(e) => self.console.report(&e),
            }
        }
    }

    fn show_history(&mut self) {
        let messages = self.state.planning.messages();
        if messages.len() <= 1 {
            self.console.info("The conversation is empty.");
            return;
        }

        let mut lines = Vec::new();
        for message in messages.iter().skip(1) {
            let text = message.text();
            let mut preview: String = text.chars().take(HISTORY_PREVIEW_CHARS).collect();
            if preview.len() < text.len() {
                preview.push_str("...");
            }
            let images = match message.image_count() {
                0 => String::new(),
                n => format!(" [{} image(s)]", n),
            };
            lines.push(format!("[{}]{} {}", message.role, images, preview));
        }
        for line in lines {
            self.console.line(&line);
        }
    }

    fn save(&mut self, file: Option<String>) {
        let path = file
            .map(PathBuf::from)
            .unwrap_or_else(|| default_history_filename(chrono::Local::now()));
        match self.state.save_history(self.storage.as_ref(), &path) {
            Ok(()) => self
                .console
                .success(&format!("Conversation saved to {}", path.display())),
            Err(e) => self.console.report(&e),
        }
    }

    fn load(&mut self, path: &Path) {
        match self.state.load_history(self.storage.as_ref(), path) {
            Ok(count) => self.console.success(&format!(
                "Loaded {} messages from {}",
                count,
                path.display()
            )),
            Err(e) => self.console.report(&e),
        }
    }

    fn undo(&mut self, args: &[String]) {
        for path in self.expand(args) {
            match self.state.undo.restore(&path, self.storage.as_ref()) {
                Ok(()) => self
                    .console
                    .success(&format!("Restored {}", path.display())),
                Err(e @ ConsoleError::NoUndoHistory(_)) => self.console.warning(&e.to_string()),
                Err(e) => self.console.report(&e),
            }
        }
    }

    fn show(&mut self, args: &[String]) {
        if args.is_empty() {
            self.show_memory();
            return;
        }
        for path in self.expand(args) {
            match self.storage.read_to_string(&path) {
                Ok(content) => {
                    self.console.info(&format!("{}:", path.display()));
                    self.console.line(&numbered_lines(&content));
                }
                Err(e) => self.console.report(&e),
            }
        }
    }

    fn show_memory(&mut self) {
        let memory = &self.state.memory;
        let mut lines = Vec::new();

        lines.push(format!("Added files ({}):", memory.added_files().len()));
        lines.extend(
            memory
                .added_files()
                .iter()
                .map(|p| format!("  {}", p.display())),
        );

        lines.push(format!("Images ({}):", memory.image_count()));
        for (key, image) in memory.images() {
            let source = match image.source {
                ImageSource::Local => "local file",
                ImageSource::Url => image.content.as_str(),
            };
            lines.push(format!("  {}: {}", key, source));
        }

        lines.push(format!("Searches ({}):", memory.search_count()));
        for (query, results) in memory.searches() {
            lines.push(format!("  \"{}\" ({} results)", query, results.len()));
        }

        let undo = self.state.undo.paths();
        lines.push(format!("Undo available ({}):", undo.len()));
        lines.extend(undo.iter().map(|p| format!("  {}", p.display())));

        let text = lines.join("\n");
        self.console.line(&text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{ScriptedInput, SharedBuffer};
    use crate::ingest::SearchResult;
    use crate::llm::mock_provider::MockProvider;
    use crate::storage::FsStorage;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct StaticSearch;

    #[async_trait]
    impl SearchProvider for StaticSearch {
        async fn search(&self, query: &str, _max: usize) -> Result<Vec<SearchResult>> {
            Ok(vec![SearchResult {
                title: format!("About {}", query),
                url: "https://example.com".to_string(),
                snippet: String::new(),
            }])
        }
    }

    fn runner(provider: MockProvider) -> (ChatRunner, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let runner = ChatRunner::new(
            Arc::new(provider),
            Arc::new(StaticSearch),
            Arc::new(FsStorage),
            SessionState::new("planner", "editor"),
            Console::new(Box::new(buffer.clone()), false),
        );
        (runner, buffer)
    }

    async fn exec(runner: &mut ChatRunner, line: &str) -> Flow {
        let mut input = ScriptedInput::default();
        runner.execute(parse_command(line), &mut input).await.unwrap()
    }

    #[tokio::test]
    async fn test_chat_message_streams_and_records() {
        let (mut runner, buffer) = runner(MockProvider::new().with_response("Hello there"));

        exec(&mut runner, "hi").await;

        assert!(buffer.contents().contains("Hello there"));
        let planning = &runner.state().planning;
        assert_eq!(planning.len(), 3);
        assert_eq!(planning.last().unwrap().text(), "Hello there");
    }

    #[tokio::test]
    async fn test_chat_failure_keeps_history() {
        let provider = MockProvider::new().with_mock_responses(vec![
            crate::llm::mock_provider::MockResponse::request_failure("offline"),
        ]);
        let (mut runner, buffer) = runner(provider);

        exec(&mut runner, "hi").await;

        assert_eq!(runner.state().planning.len(), 1);
        assert!(buffer.contents().contains("transport error"));
    }

    #[tokio::test]
    async fn test_exit_stops_loop() {
        let (mut runner, buffer) = runner(MockProvider::new());
        let mut input = ScriptedInput::new(["/diff", "exit", "/diff"]);

        runner.run(&mut input).await.unwrap();

        assert_eq!(input.remaining(), 1);
        assert!(!runner.state().show_diff);
        assert!(buffer.contents().contains("Goodbye!"));
    }

    #[tokio::test]
    async fn test_edit_asks_for_instruction_and_rewrites() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "a\nb\nc").unwrap();
        let provider = MockProvider::new().with_responses(vec!["1. change all", "x\ny\nz\nq\n"]);
        let (mut runner, buffer) = runner(provider);
        let mut input = ScriptedInput::new(["rewrite it"]);

        let command = ChatCommand::Edit(vec![path.display().to_string()]);
        runner.execute(command, &mut input).await.unwrap();

        assert_eq!(input.prompts(), &[INSTRUCTION_PROMPT.to_string()]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\ny\nz\nq");
        assert_eq!(runner.state().undo.get(&path), Some("a\nb\nc"));
        let out = buffer.contents();
        assert!(out.contains("Line 4 appended: q"));
        assert!(out.contains("Edited 1 of 1 files."));
    }

    #[tokio::test]
    async fn test_edit_without_valid_files_skips_models() {
        let dir = TempDir::new().unwrap();
        let provider = MockProvider::new();
        let (mut runner, buffer) = runner(provider.clone());
        let mut input = ScriptedInput::new(["never asked"]);

        let command = ChatCommand::Edit(vec![dir.path().join("nope.txt").display().to_string()]);
        runner.execute(command, &mut input).await.unwrap();

        assert_eq!(provider.call_count(), 0);
        assert_eq!(input.remaining(), 1);
        assert!(buffer.contents().contains("No valid files to edit"));
    }

    #[tokio::test]
    async fn test_undo_then_undo_again() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "after").unwrap();
        let (mut runner, buffer) = runner(MockProvider::new());
        runner.state_mut().undo.record(&path, "before");
        let line = format!("/undo {}", path.display());

        exec(&mut runner, &line).await;
        std::fs::write(&path, "later").unwrap();
        exec(&mut runner, &line).await;

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "later");
        assert!(buffer.contents().contains("No undo history for"));
    }

    #[tokio::test]
    async fn test_change_model_and_show_models() {
        let (mut runner, buffer) = runner(MockProvider::new());

        exec(&mut runner, "/change_model editor openai/gpt-4o").await;
        exec(&mut runner, "/model").await;

        assert_eq!(runner.state().editor_model, "openai/gpt-4o");
        assert!(buffer.contents().contains("Editor model: openai/gpt-4o"));
    }

    #[tokio::test]
    async fn test_search_then_show_memory() {
        let (mut runner, buffer) = runner(MockProvider::new());

        exec(&mut runner, "/search rust").await;
        exec(&mut runner, "/image https://example.com/a.png").await;
        exec(&mut runner, "/show").await;

        let out = buffer.contents();
        assert!(out.contains("1. About rust - https://example.com"));
        assert!(out.contains("Searches (1):"));
        assert!(out.contains("image_1: https://example.com/a.png"));
        assert_eq!(runner.state().planning.len(), 3);
    }

    #[tokio::test]
    async fn test_new_and_show_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.py");
        let (mut runner, buffer) = runner(MockProvider::new());

        exec(&mut runner, &format!("/new {}", path.display())).await;
        exec(&mut runner, &format!("/new {}", path.display())).await;
        exec(&mut runner, &format!("/show {}", path.display())).await;

        let out = buffer.contents();
        assert!(out.contains("Created"));
        assert!(out.contains("already exists; left unchanged"));
        assert!(out.contains("1 | def main():"));
    }

    #[tokio::test]
    async fn test_usage_and_unknown_commands() {
        let (mut runner, buffer) = runner(MockProvider::new());

        assert_eq!(exec(&mut runner, "/add").await, Flow::Continue);
        exec(&mut runner, "/bogus").await;

        let out = buffer.contents();
        assert!(out.contains("Usage: /add <file>"));
        assert!(out.contains("Unknown command: /bogus"));
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("out.json");
        let (mut runner, _) = runner(MockProvider::new().with_response("reply"));
        exec(&mut runner, "question").await;
        let saved = runner.state().planning.messages().to_vec();

        exec(&mut runner, &format!("/save {}", file.display())).await;
        exec(&mut runner, "/reset").await;
        assert!(runner.state().planning.is_empty());
        exec(&mut runner, &format!("/load {}", file.display())).await;

        assert_eq!(runner.state().planning.messages(), saved.as_slice());
    }
}
