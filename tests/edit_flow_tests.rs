// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use aiconsole::editor::{
    load_targets, ApplyOptions, CommitKind, EditApplier, EditPlanner, NullObserver,
    RecordingObserver,
};
use aiconsole::error::{ConsoleError, ErrorKind};
use aiconsole::llm::mock_provider::{MockProvider, MockResponse};
use aiconsole::session::SessionState;
use aiconsole::storage::FsStorage;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

/// Plan and apply one instruction the way `/edit` does
async fn edit(
    provider: &MockProvider,
    state: &mut SessionState,
    paths: &[PathBuf],
    instruction: &str,
    observer: &mut RecordingObserver,
) -> aiconsole::editor::BatchReport {
    let planner_model = state.planner_model.clone();
    let editor_model = state.editor_model.clone();
    let targets = load_targets(&FsStorage, paths, observer).unwrap();

    let plan = EditPlanner::new(provider, &planner_model)
        .plan(&mut state.planning, &targets, instruction, observer)
        .await;

    let mut ctx = state.edit_context();
    EditApplier::new(provider, &FsStorage, &editor_model)
        .with_options(ApplyOptions {
            show_diff: false,
            ..Default::default()
        })
        .apply(&targets, &plan, &mut ctx, observer)
        .await
}

#[tokio::test]
async fn test_three_replacements_and_one_append() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "letters.txt", "a\nb\nc");
    let provider = MockProvider::new().with_mock_responses(vec![
        MockResponse::text("1. Replace every letter"),
        MockResponse::text("x\ny\nz\nq\n").with_chunk_size(3),
    ]);
    let mut state = SessionState::new("planner", "editor");
    let mut observer = RecordingObserver::new();

    let report = edit(&provider, &mut state, &[path.clone()], "shift letters", &mut observer).await;

    assert!(report.all_succeeded());
    assert_eq!(read(&path), "x\ny\nz\nq");
    let kinds: Vec<CommitKind> = observer
        .commits_for(&path)
        .iter()
        .map(|c| c.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            CommitKind::Replaced,
            CommitKind::Replaced,
            CommitKind::Replaced,
            CommitKind::Appended
        ]
    );
    assert_eq!(state.undo.get(&path), Some("a\nb\nc"));
}

#[tokio::test]
async fn test_verbatim_stream_leaves_file_identical() {
    let dir = TempDir::new().unwrap();
    let original = "fn main() {\n    println!(\"hi\");\n}\n";
    let path = write(&dir, "main.rs", original);
    let provider = MockProvider::new().with_responses(vec!["1. Keep as is", original]);
    let mut state = SessionState::new("planner", "editor");

    let report = edit(
        &provider,
        &mut state,
        &[path.clone()],
        "no-op",
        &mut RecordingObserver::new(),
    )
    .await;

    assert!(report.all_succeeded());
    assert_eq!(read(&path), original);
}

#[tokio::test]
async fn test_undo_is_single_shot() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "notes.txt", "draft");
    let provider = MockProvider::new().with_responses(vec!["1. Polish", "final\n"]);
    let mut state = SessionState::new("planner", "editor");

    edit(&provider, &mut state, &[path.clone()], "polish", &mut RecordingObserver::new()).await;
    assert_eq!(read(&path), "final");

    state.undo.restore(&path, &FsStorage).unwrap();
    assert_eq!(read(&path), "draft");

    std::fs::write(&path, "edited by hand").unwrap();
    let err = state.undo.restore(&path, &FsStorage).unwrap_err();

    assert!(matches!(err, ConsoleError::NoUndoHistory(_)));
    assert_eq!(err.kind(), ErrorKind::Logic);
    assert_eq!(read(&path), "edited by hand");
}

#[tokio::test]
async fn test_second_edit_overwrites_undo_entry() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "config.ini", "v0");
    let provider = MockProvider::new().with_responses(vec!["1. Bump", "v1\n", "1. Bump", "v2\n"]);
    let mut state = SessionState::new("planner", "editor");

    edit(&provider, &mut state, &[path.clone()], "bump", &mut RecordingObserver::new()).await;
    edit(&provider, &mut state, &[path.clone()], "bump", &mut RecordingObserver::new()).await;

    assert_eq!(read(&path), "v2");
    assert_eq!(state.undo.len(), 1);
    assert_eq!(state.undo.get(&path), Some("v1"));
}

#[tokio::test]
async fn test_failed_reread_does_not_stop_batch() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.txt", "a1");
    let b = write(&dir, "b.txt", "b1");
    let c = write(&dir, "c.txt", "c1");
    let provider = MockProvider::new().with_responses(vec!["1. Rewrite", "A\n", "C\n"]);
    let mut state = SessionState::new("planner", "editor");
    let paths = vec![a.clone(), b.clone(), c.clone()];

    let targets = load_targets(&FsStorage, &paths, &mut NullObserver).unwrap();
    let plan = EditPlanner::new(&provider, "planner")
        .plan(&mut state.planning, &targets, "rewrite", &mut NullObserver)
        .await;
    // b disappears between planning and editing
    std::fs::remove_file(&b).unwrap();
    let mut observer = RecordingObserver::new();
    let mut ctx = state.edit_context();
    let report = EditApplier::new(&provider, &FsStorage, "editor")
        .apply(&targets, &plan, &mut ctx, &mut observer)
        .await;

    assert_eq!(read(&a), "A");
    assert_eq!(read(&c), "C");
    assert!(!b.exists());
    let failed: Vec<&Path> = report.failed().map(|o| o.path.as_path()).collect();
    assert_eq!(failed, vec![b.as_path()]);
    assert_eq!(report.succeeded().count(), 2);
    assert_eq!(
        report.outcomes[1].error().map(|e| e.kind()),
        Some(ErrorKind::Input)
    );
    assert!(!state.undo.contains(&b));
}

#[tokio::test]
async fn test_planner_failure_yields_empty_plan() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "a.txt", "a");
    let provider = MockProvider::new()
        .with_mock_responses(vec![MockResponse::request_failure("quota exceeded")]);
    let mut state = SessionState::new("planner", "editor");
    let mut observer = RecordingObserver::new();
    let targets = load_targets(&FsStorage, &[path.clone()], &mut observer).unwrap();

    let plan = EditPlanner::new(&provider, "planner")
        .plan(&mut state.planning, &targets, "anything", &mut observer)
        .await;

    assert!(plan.is_empty());
    assert!(state.planning.is_empty());
    assert_eq!(observer.errors.len(), 1);
    assert_eq!(observer.errors[0].0, ErrorKind::Transport);
    assert_eq!(read(&path), "a");
}

#[tokio::test]
async fn test_missing_targets_are_reported_and_skipped() {
    let dir = TempDir::new().unwrap();
    let real = write(&dir, "real.txt", "content");
    let mut observer = RecordingObserver::new();

    let targets = load_targets(
        &FsStorage,
        &[dir.path().join("ghost.txt"), real.clone()],
        &mut observer,
    )
    .unwrap();

    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].path, real);
    assert_eq!(observer.errors.len(), 1);

    let err = load_targets(&FsStorage, &[dir.path().join("ghost.txt")], &mut NullObserver)
        .unwrap_err();
    assert!(matches!(err, ConsoleError::NoValidTargets));
}

#[tokio::test]
async fn test_editor_sees_fresh_content_and_plan() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "a.txt", "stale");
    let provider = MockProvider::new().with_responses(vec!["1. Uppercase it", "FRESH\n"]);
    let mut state = SessionState::new("planner", "editor");

    let targets = load_targets(&FsStorage, &[path.clone()], &mut NullObserver).unwrap();
    let plan = EditPlanner::new(&provider, "planner")
        .plan(&mut state.planning, &targets, "uppercase", &mut NullObserver)
        .await;
    std::fs::write(&path, "fresh").unwrap();
    let mut ctx = state.edit_context();
    EditApplier::new(&provider, &FsStorage, "editor")
        .apply(&targets, &plan, &mut ctx, &mut NullObserver)
        .await;

    let request = provider.last_request().unwrap();
    assert_eq!(request.model, "editor");
    let prompt = request.messages.last().unwrap().text();
    assert!(prompt.contains("fresh"));
    assert!(prompt.contains("1. Uppercase it"));
    assert_eq!(state.undo.get(&path), Some("fresh"));
    assert_eq!(state.editing.len(), 3);
}
