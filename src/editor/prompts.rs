// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! System prompts and message templates for the planning and editing models

use std::path::Path;

use super::EditTarget;

/// Role of the planning (conversation) model
pub const PLANNER_SYSTEM_PROMPT: &str = "\
You are a senior developer assistant. You write clean, efficient code, explain \
concepts clearly and reason through problems step by step.

When you receive an edit request:
- Review the provided files first.
- Then write a plan for the change as a numbered list of edit instructions.
- Attribute every instruction to a file path and reference line numbers.
- Do not rewrite the files yourself; another model applies your instructions.";

/// Role of the editing model
pub const EDITOR_SYSTEM_PROMPT: &str = "\
You are a code-editing model that applies line-by-line edit instructions.

Output rules:
- Output only the file content. No explanations, no commentary.
- Never wrap the output in markdown fences and never start it with a language tag.
- Reproduce every line that does not need to change exactly as it is.
- Do not add or remove lines unless an instruction explicitly asks for it.
- Leave imports and function signatures alone unless instructed otherwise.
- If an instruction is clearly wrong, apply the evident intent instead.";

/// Build the planning request: every file fenced by its path, then the instruction
pub fn build_plan_prompt(targets: &[EditTarget], instruction: &str) -> String {
    let mut prompt = String::new();
    for target in targets {
        prompt.push_str(&format!(
            "File: {}\n```\n{}\n```\n\n",
            target.path.display(),
            target.content
        ));
    }
    prompt.push_str(&format!(
        "Instruction: {}\n\n\
         Respond with a numbered list of edit instructions. Start each item with the \
         file path it applies to and reference the affected line numbers.",
        instruction.trim()
    ));
    prompt
}

/// Build the editing request for one file
pub fn build_edit_message(path: &Path, original: &str, plan: &str) -> String {
    format!(
        "Original content of {path}:\n{original}\n\n\
         Edit instructions:\n{plan}\n\n\
         Apply only the instructions that concern {path}. Output the complete new \
         content of {path} and nothing else: no commentary, no ``` fences, no \
         language tag.",
        path = path.display(),
        original = original,
        plan = plan,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_plan_prompt_fences_every_file() {
        let targets = vec![
            EditTarget::new(PathBuf::from("a.py"), "print(1)"),
            EditTarget::new(PathBuf::from("b.py"), "print(2)"),
        ];

        let prompt = build_plan_prompt(&targets, "  rename things \n");

        assert!(prompt.contains("File: a.py\n```\nprint(1)\n```"));
        assert!(prompt.contains("File: b.py\n```\nprint(2)\n```"));
        assert!(prompt.contains("Instruction: rename things\n"));
        assert!(prompt.find("a.py").unwrap() < prompt.find("b.py").unwrap());
    }

    #[test]
    fn test_edit_message_restricts_to_path() {
        let message = build_edit_message(Path::new("src/x.rs"), "fn a() {}", "1. src/x.rs: rename");

        assert!(message.starts_with("Original content of src/x.rs:\nfn a() {}"));
        assert!(message.contains("1. src/x.rs: rename"));
        assert!(message.contains("Apply only the instructions that concern src/x.rs"));
        assert!(message.contains("no ``` fences"));
    }
}
