// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Starter content for new files

use std::path::Path;

use crate::error::Result;
use crate::storage::FileStorage;

const PYTHON_TEMPLATE: &str =
    "def main():\n    pass\n\nif __name__ == \"__main__\":\n    main()";

const HTML_TEMPLATE: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
    <meta charset=\"UTF-8\">
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
    <title>Document</title>
</head>
<body>

</body>
</html>";

const JAVASCRIPT_TEMPLATE: &str = "// Your JavaScript code here";

/// Template for a file, chosen by extension; empty for unknown kinds
pub fn template_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("py") => PYTHON_TEMPLATE,
        Some("html" | "htm") => HTML_TEMPLATE,
        Some("js" | "mjs" | "cjs") => JAVASCRIPT_TEMPLATE,
        _ => "",
    }
}

/// What `/new` did with one path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewFileStatus {
    Created,
    AlreadyExists,
}

/// Create `path` from its template unless it already exists
pub fn create_file(storage: &dyn FileStorage, path: &Path) -> Result<NewFileStatus> {
    if storage.exists(path) {
        return Ok(NewFileStatus::AlreadyExists);
    }
    storage.write(path, template_for(path))?;
    tracing::info!(path = %path.display(), "created file");
    Ok(NewFileStatus::Created)
}
