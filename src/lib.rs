//! agent-builder - configure and launch a tool-using conversational agent
//!
//! The binary in `main.rs` is a thin wrapper over [`cli::run`]; the modules
//! are public so integration tests can drive them directly.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod extra_tools;
pub mod handler;
pub mod knowledge;
pub mod model;
pub mod prompt;
pub mod repl;
pub mod telemetry;
pub mod tool;
pub mod welcome;
