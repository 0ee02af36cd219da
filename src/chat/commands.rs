// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat command parsing
//!
//! Turns one line of user input into a [`ChatCommand`]. Parsing never
//! touches session state; validation of paths and files happens when the
//! command runs.

/// Which model a `/change_model` targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    /// Conversation and edit planning model
    Planner,
    /// Model that rewrites files
    Editor,
}

impl ModelRole {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "planner" | "plan" | "main" | "chat" => Some(ModelRole::Planner),
            "editor" | "edit" => Some(ModelRole::Editor),
            _ => None,
        }
    }
}

impl std::fmt::Display for ModelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelRole::Planner => write!(f, "planner"),
            ModelRole::Editor => write!(f, "editor"),
        }
    }
}

/// One parsed line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Add files to the conversation as context
    Add(Vec<String>),
    /// Edit files; the instruction is asked for separately
    Edit(Vec<String>),
    /// Create files from templates
    New(Vec<String>),
    /// Search the web and add the results as context
    Search(String),
    /// Attach images (paths or URLs)
    Image(Vec<String>),
    /// Forget added files, images and searches
    Clear,
    /// Start over with empty conversations
    Reset,
    /// Toggle diff display after edits
    Diff,
    /// Show the conversation so far
    History,
    /// Save the conversation, optionally to a given file
    Save(Option<String>),
    /// Replace the conversation with a saved one
    Load(String),
    /// Restore files to their state before the last edit
    Undo(Vec<String>),
    Help,
    /// Show the configured models
    Model,
    /// Switch the model used for a role
    ChangeModel { role: ModelRole, model: String },
    /// Print files with line numbers, or the session memory without arguments
    Show(Vec<String>),
    Exit,
    /// Regular message for the planning model
    Message(String),
    Empty,
    /// Known command used with missing or bad arguments; holds the usage line
    Usage(&'static str),
    /// Unknown slash command
    Unknown(String),
}

const ADD_USAGE: &str = "/add <file> [file ...]";
const EDIT_USAGE: &str = "/edit <file> [file ...]";
const NEW_USAGE: &str = "/new <file> [file ...]";
const SEARCH_USAGE: &str = "/search <query>";
const IMAGE_USAGE: &str = "/image <path-or-url> [...]";
const LOAD_USAGE: &str = "/load <file>";
const UNDO_USAGE: &str = "/undo <file> [file ...]";
const CHANGE_MODEL_USAGE: &str = "/change_model <planner|editor> <model-id>";

fn is_exit_command(input: &str) -> bool {
    matches!(
        input.to_lowercase().as_str(),
        "exit" | "quit" | "/exit" | "/quit"
    )
}

fn args_or_usage(args: &[&str], usage: &'static str) -> Result<Vec<String>, &'static str> {
    if args.is_empty() {
        Err(usage)
    } else {
        Ok(args.iter().map(|s| s.to_string()).collect())
    }
}

/// Parse user input into a ChatCommand
pub fn parse_command(input: &str) -> ChatCommand {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return ChatCommand::Empty;
    }

    if is_exit_command(trimmed) {
        return ChatCommand::Exit;
    }

    if !trimmed.starts_with('/') {
        return ChatCommand::Message(trimmed.to_string());
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    let parsed = match name.to_lowercase().as_str() {
        "/add" => args_or_usage(&args, ADD_USAGE).map(ChatCommand::Add),
        "/edit" => args_or_usage(&args, EDIT_USAGE).map(ChatCommand::Edit),
        "/new" => args_or_usage(&args, NEW_USAGE).map(ChatCommand::New),
        "/image" => args_or_usage(&args, IMAGE_USAGE).map(ChatCommand::Image),
        "/undo" => args_or_usage(&args, UNDO_USAGE).map(ChatCommand::Undo),
        "/search" if rest.is_empty() => Err(SEARCH_USAGE),
        "/search" => Ok(ChatCommand::Search(rest.to_string())),
        "/clear" => Ok(ChatCommand::Clear),
        "/reset" => Ok(ChatCommand::Reset),
        "/diff" => Ok(ChatCommand::Diff),
        "/history" => Ok(ChatCommand::History),
        "/help" => Ok(ChatCommand::Help),
        "/model" => Ok(ChatCommand::Model),
        "/save" => Ok(ChatCommand::Save(args.first().map(|s| s.to_string()))),
        "/load" => match args.first() {
            Some(file) => Ok(ChatCommand::Load(file.to_string())),
            None => Err(LOAD_USAGE),
        },
        "/show" => Ok(ChatCommand::Show(
            args.iter().map(|s| s.to_string()).collect(),
        )),
        "/change_model" => match args.as_slice() {
            [role, model] => ModelRole::parse(role)
                .map(|role| ChatCommand::ChangeModel {
                    role,
                    model: model.to_string(),
                })
                .ok_or(CHANGE_MODEL_USAGE),
            _ => Err(CHANGE_MODEL_USAGE),
        },
        _ => Ok(ChatCommand::Unknown(name.to_string())),
    };

    parsed.unwrap_or_else(ChatCommand::Usage)
}

/// Format help text for display
pub fn format_help_text() -> String {
    r#"Commands:

Context:
  /add <files>        - Add files to the conversation
  /image <paths|urls> - Attach images
  /search <query>     - Search the web and add the results
  /show [files]       - Print files with line numbers, or what has been added
  /clear              - Forget added files, images and searches

Editing:
  /edit <files>       - Plan and apply an edit (asks for the instruction)
  /new <files>        - Create files from a template
  /undo <files>       - Restore files to their state before the last edit
  /diff               - Toggle diff display after edits

Session:
  /history            - Show the conversation
  /save [file]        - Save the conversation as JSON
  /load <file>        - Load a saved conversation
  /reset              - Clear conversations, context and undo history
  /model              - Show the planner and editor models
  /change_model <planner|editor> <id> - Switch a model
  /help               - Show this help message
  exit, quit          - Leave

Anything else is sent to the planner model as a chat message.
File arguments accept glob patterns such as src/*.py."#
        .to_string()
}
