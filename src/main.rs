// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! aiconsole - terminal assistant with model-driven file editing
//!
//! Entry point for the aiconsole CLI application.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use aiconsole::chat::ChatRunner;
use aiconsole::cli::{Cli, Commands, SettingsAction};
use aiconsole::config::Settings;
use aiconsole::console::{Console, StdinInput};
use aiconsole::error::{ConsoleError, Result};
use aiconsole::ingest::DuckDuckGoSearch;
use aiconsole::llm::providers::OpenRouterProvider;
use aiconsole::session::SessionState;
use aiconsole::storage::FsStorage;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` turns on this crate's debug output, `-vv` adds stream internals.
    // `RUST_LOG` still applies for everything else.
    let directives: &[&str] = match cli.verbose {
        0 => &[],
        1 => &["aiconsole=debug"],
        _ => &["aiconsole=trace"],
    };
    for directive in directives {
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            ConsoleError::Config(format!("Cannot change to {}: {}", dir.display(), e))
        })?;
    }

    // A .env next to the project may carry the API key
    dotenvy::dotenv().ok();

    // Load settings
    let settings_path = cli.config.clone().unwrap_or_else(Settings::default_path);
    let mut settings = Settings::load_from(&settings_path)?;
    settings.apply_overrides(
        cli.planner_model.clone(),
        cli.editor_model.clone(),
        cli.no_diff,
    );

    match cli.command {
        Some(Commands::Settings(args)) => {
            run_settings(args.action.unwrap_or(SettingsAction::Show), &settings, &settings_path)
        }
        Some(Commands::Chat) | None => run_chat(settings, cli.load.as_deref()).await,
    }
}

fn run_settings(action: SettingsAction, settings: &Settings, path: &Path) -> Result<()> {
    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(settings)?);
        }
        SettingsAction::Path => {
            println!("{}", path.display());
        }
        SettingsAction::Init => {
            if path.exists() {
                println!("Settings already exist at {}", path.display());
            } else {
                Settings::default().save_to(path)?;
                println!("Wrote default settings to {}", path.display());
            }
        }
    }
    Ok(())
}

async fn run_chat(settings: Settings, load: Option<&Path>) -> Result<()> {
    let api_key = settings.api_key().ok_or_else(|| {
        ConsoleError::Config(format!(
            "No OpenRouter API key found. Set {} or add provider.api_key to {}.",
            settings.provider.api_key_env,
            Settings::default_path().display()
        ))
    })?;

    let provider = match &settings.provider.base_url {
        Some(url) => OpenRouterProvider::with_base_url(api_key, url),
        None => OpenRouterProvider::new(api_key),
    };

    let mut state = SessionState::new(&settings.models.planner, &settings.models.editor)
        .with_show_diff(settings.editor.show_diff);
    if let Some(path) = load {
        let count = state.load_history(&FsStorage, path)?;
        tracing::info!(path = %path.display(), messages = count, "loaded conversation");
    }

    let mut console = Console::stdout();
    console.info(&format!(
        "aiconsole {} | planner: {} | editor: {}",
        env!("CARGO_PKG_VERSION"),
        state.planner_model,
        state.editor_model
    ));

    let mut runner = ChatRunner::new(
        Arc::new(provider),
        Arc::new(DuckDuckGoSearch::new()),
        Arc::new(FsStorage),
        state,
        console,
    )
    .with_options(settings.apply_options());

    let mut input = StdinInput::new(settings.history_file());
    runner.run(&mut input).await
}
