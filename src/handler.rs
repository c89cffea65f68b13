//! Callback handlers for agent progress
//!
//! The agent reports tool activity and its final text through a
//! [`CallbackHandler`], so the console output can be swapped out in tests.

use console::style;

/// Hooks invoked while the agent runs
pub trait CallbackHandler: Send + Sync {
    /// A tool call is about to run. `index` counts calls across the session, starting at 1.
    fn on_tool_start(&self, index: usize, name: &str);

    /// A tool call finished
    fn on_tool_end(&self, name: &str, ok: bool);

    /// The model produced its final text for a turn
    fn on_text(&self, text: &str);
}

/// Prints tool activity and responses to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleHandler;

impl CallbackHandler for ConsoleHandler {
    fn on_tool_start(&self, index: usize, name: &str) {
        println!("\n{} {}", style(format!("Tool #{index}:")).bold(), style(name).cyan());
    }

    fn on_tool_end(&self, name: &str, ok: bool) {
        if !ok {
            println!("{}", style(format!("Tool {name} failed")).red());
        }
    }

    fn on_text(&self, text: &str) {
        println!("{text}");
    }
}

/// Discards all callbacks
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentHandler;

impl CallbackHandler for SilentHandler {
    fn on_tool_start(&self, _index: usize, _name: &str) {}

    fn on_tool_end(&self, _name: &str, _ok: bool) {}

    fn on_text(&self, _text: &str) {}
}
