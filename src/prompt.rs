//! System prompt loading

use std::fs;
use std::path::Path;

use crate::config::{EnvLookup, SYSTEM_PROMPT_ENV};

/// Name of the prompt file looked up in the working and data directories
pub const PROMPT_FILE: &str = ".prompt";

/// Prompt used when no override is configured
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a helpful assistant running in a terminal.

You can use tools to read, write and edit files, run shell commands and code,
make HTTP requests, inspect the environment and query a knowledge base.

Guidelines:
- Prefer using a tool over guessing when facts about the system are needed
- Keep answers concise and show commands you ran when relevant
- Ask before doing anything destructive"#;

/// Load the base system prompt.
///
/// The first non-empty source wins: the environment override, `.prompt` in
/// the working directory, `.prompt` in the data directory, then the default.
pub fn load_system_prompt(working_dir: &Path, data_dir: &Path, lookup: EnvLookup<'_>) -> String {
    if let Some(prompt) = lookup(SYSTEM_PROMPT_ENV).filter(|p| !p.trim().is_empty()) {
        return prompt;
    }

    for dir in [working_dir, data_dir] {
        let path = dir.join(PROMPT_FILE);
        match fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => {
                tracing::debug!(path = %path.display(), "Loaded system prompt from file");
                return text.trim().to_string();
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), "Cannot read prompt file: {e}"),
        }
    }

    DEFAULT_SYSTEM_PROMPT.to_string()
}

/// Combine the base prompt with the current welcome text
pub fn combined_system_prompt(base: &str, welcome_text: &str) -> String {
    format!("{base}\n\nWelcome Text Reference:\n{welcome_text}")
}
