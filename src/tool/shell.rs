//! Shell tool implementation
//!
//! Runs a command with `bash -c` in the working directory.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;

use super::process::{self, timeout_for};
use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

/// Tool description
const DESCRIPTION: &str = r#"Executes a shell command with bash.

Usage:
- Use for terminal operations like git, cargo, docker, etc.
- Commands run in the current working directory
- Commands have a default timeout of 2 minutes (max 10 minutes)
- Output exceeding 30000 characters will be truncated
- Always quote file paths containing spaces"#;

/// Parameters for the shell tool
#[derive(Debug, Deserialize)]
pub struct ShellParams {
    /// The command to execute
    pub command: String,
    /// Optional timeout in milliseconds
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Working directory override, relative to the current one
    #[serde(default)]
    pub work_dir: Option<String>,
}

/// Shell tool implementation
pub struct ShellTool;

#[async_trait]
impl Tool for ShellTool {
    fn id(&self) -> &'static str {
        "shell"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The command to execute"
                },
                "timeout": {
                    "type": "number",
                    "description": "Optional timeout in milliseconds (max 600000)"
                },
                "work_dir": {
                    "type": "string",
                    "description": "Directory to run the command in (defaults to the working directory)"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: ShellParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("shell", e.to_string()))?;

        if params.command.trim().is_empty() {
            return Err(AgentError::invalid_arguments("shell", "command must not be empty"));
        }

        let work_dir = match &params.work_dir {
            Some(dir) => ctx.resolve_path(dir),
            None => ctx.working_directory.clone(),
        };
        if !work_dir.is_dir() {
            return Err(AgentError::tool_execution(
                "shell",
                format!("Not a directory: {}", work_dir.display()),
            ));
        }

        let title = params
            .command
            .split_whitespace()
            .take(3)
            .collect::<Vec<_>>()
            .join(" ");

        tracing::debug!(command = %params.command, "Running shell command");

        let output = process::run(
            "shell",
            Path::new("bash"),
            &["-c", params.command.as_str()],
            &work_dir,
            timeout_for(params.timeout),
        )
        .await?;

        Ok(ToolResult {
            title,
            output: output.render(),
            metadata: json!({
                "exitCode": output.exit_code,
                "command": params.command,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_context(dir: &Path) -> ToolContext {
        ToolContext::new("ses_test", dir, dir)
    }

    #[tokio::test]
    async fn test_shell_echo() {
        let temp = TempDir::new().unwrap();
        let ctx = create_context(temp.path());

        let result = ShellTool
            .execute(json!({ "command": "echo 'hello world'" }), &ctx)
            .await
            .unwrap();

        assert!(result.output.contains("hello world"));
        assert_eq!(result.metadata["exitCode"], 0);
    }

    #[tokio::test]
    async fn test_shell_keeps_output_around_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        let ctx = create_context(temp.path());

        let result = ShellTool
            .execute(json!({ "command": r"echo visible-line; printf '\xff\n'" }), &ctx)
            .await
            .unwrap();

        assert!(result.output.contains("visible-line"));
        assert!(result.output.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_shell_exit_code() {
        let temp = TempDir::new().unwrap();
        let ctx = create_context(temp.path());

        let result = ShellTool
            .execute(json!({ "command": "exit 42" }), &ctx)
            .await
            .unwrap();

        assert_eq!(result.metadata["exitCode"], 42);
        assert!(result.output.contains("(exit code: 42)"));
    }

    #[tokio::test]
    async fn test_shell_stderr() {
        let temp = TempDir::new().unwrap();
        let ctx = create_context(temp.path());

        let result = ShellTool
            .execute(json!({ "command": "echo 'error message' >&2" }), &ctx)
            .await
            .unwrap();

        assert!(result.output.contains("error message"));
    }

    #[tokio::test]
    async fn test_shell_working_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("nested")).unwrap();
        let ctx = create_context(temp.path());

        let result = ShellTool
            .execute(json!({ "command": "pwd", "work_dir": "nested" }), &ctx)
            .await
            .unwrap();

        assert!(result.output.trim().ends_with("nested"));
    }

    #[tokio::test]
    async fn test_shell_timeout() {
        let temp = TempDir::new().unwrap();
        let ctx = create_context(temp.path());

        let err = ShellTool
            .execute(json!({ "command": "sleep 5", "timeout": 100 }), &ctx)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_shell_rejects_empty_command() {
        let temp = TempDir::new().unwrap();
        let ctx = create_context(temp.path());
        assert!(ShellTool
            .execute(json!({ "command": "  " }), &ctx)
            .await
            .is_err());
    }
}
