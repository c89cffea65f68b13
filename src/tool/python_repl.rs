//! Python execution tool
//!
//! Runs a code snippet with the first Python interpreter found on `PATH`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::process::{self, timeout_for};
use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

const INTERPRETERS: [&str; 2] = ["python3", "python"];

/// Tool description
const DESCRIPTION: &str = r#"Executes Python code and returns its output.

Usage:
- Code runs in a fresh interpreter process in the working directory
- Print values you want to see; the last expression is not echoed
- Execution has a default timeout of 2 minutes (max 10 minutes)
- Output exceeding 30000 characters will be truncated"#;

/// Parameters for the python_repl tool
#[derive(Debug, Deserialize)]
pub struct PythonReplParams {
    /// The code to run
    pub code: String,
    /// Optional timeout in milliseconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Python execution tool implementation
pub struct PythonReplTool;

fn find_interpreter() -> Option<PathBuf> {
    INTERPRETERS
        .iter()
        .find_map(|name| which::which(name).ok())
}

#[async_trait]
impl Tool for PythonReplTool {
    fn id(&self) -> &'static str {
        "python_repl"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "The Python code to execute"
                },
                "timeout": {
                    "type": "number",
                    "description": "Optional timeout in milliseconds (max 600000)"
                }
            },
            "required": ["code"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: PythonReplParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("python_repl", e.to_string()))?;

        if params.code.trim().is_empty() {
            return Err(AgentError::invalid_arguments("python_repl", "code must not be empty"));
        }

        let interpreter = find_interpreter().ok_or_else(|| {
            AgentError::tool_execution("python_repl", "No python3 or python interpreter found on PATH")
        })?;

        let output = process::run(
            "python_repl",
            &interpreter,
            &["-c", params.code.as_str()],
            &ctx.working_directory,
            timeout_for(params.timeout),
        )
        .await?;

        let first_line = params.code.lines().next().unwrap_or_default();
        Ok(ToolResult {
            title: first_line.chars().take(60).collect(),
            output: output.render(),
            metadata: json!({
                "exitCode": output.exit_code,
                "interpreter": interpreter.to_string_lossy(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_python_print() {
        if find_interpreter().is_none() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let ctx = ToolContext::new("ses_test", temp.path(), temp.path());

        let result = PythonReplTool
            .execute(json!({ "code": "print(6 * 7)" }), &ctx)
            .await
            .unwrap();

        assert_eq!(result.output.trim(), "42");
        assert_eq!(result.metadata["exitCode"], 0);
    }

    #[tokio::test]
    async fn test_python_error_reports_exit_code() {
        if find_interpreter().is_none() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let ctx = ToolContext::new("ses_test", temp.path(), temp.path());

        let result = PythonReplTool
            .execute(json!({ "code": "raise SystemExit(3)" }), &ctx)
            .await
            .unwrap();

        assert_eq!(result.metadata["exitCode"], 3);
    }

    #[tokio::test]
    async fn test_python_rejects_empty_code() {
        let temp = TempDir::new().unwrap();
        let ctx = ToolContext::new("ses_test", temp.path(), temp.path());
        assert!(PythonReplTool
            .execute(json!({ "code": "" }), &ctx)
            .await
            .is_err());
    }
}
