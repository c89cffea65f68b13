//! Welcome text storage and the interactive banners

use console::style;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::Result;

const WELCOME_FILE: &str = "welcome.md";

/// Shown until the user stores their own welcome text
pub const DEFAULT_WELCOME_TEXT: &str = r#"Welcome to agent-builder.

Type a request and press Enter. Shortcuts:
- !<command>  run a shell command directly
- ><code>     run Python code directly
- exit        leave the session

Use the welcome tool to change this text."#;

/// Welcome text persisted in the data directory
#[derive(Debug, Clone)]
pub struct WelcomeStore {
    path: PathBuf,
}

impl WelcomeStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(WELCOME_FILE),
        }
    }

    /// The stored text, or the default when nothing is stored
    pub async fn view(&self) -> Result<String> {
        match fs::read_to_string(&self.path).await {
            Ok(text) if !text.trim().is_empty() => Ok(text),
            Ok(_) => Ok(DEFAULT_WELCOME_TEXT.to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(DEFAULT_WELCOME_TEXT.to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the stored text
    pub async fn edit(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

/// Print the welcome banner
pub fn render_welcome_message(text: &str) {
    let width = text
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(20, 80);
    let rule = "─".repeat(width);

    println!("{}", style(&rule).cyan());
    println!("{}", style("agent-builder").bold().cyan());
    println!();
    println!("{}", text.trim_end());
    println!("{}", style(&rule).cyan());
}

/// Print the farewell shown when the session ends
pub fn render_goodbye_message() {
    println!();
    println!("{}", style("Goodbye! Session ended.").bold().cyan());
}
