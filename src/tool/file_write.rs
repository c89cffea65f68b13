//! File write tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

/// Tool description
const DESCRIPTION: &str = r#"Writes content to a file on the local filesystem.

Usage:
- Relative paths are resolved against the working directory
- Creates parent directories if they don't exist
- Overwrites existing files"#;

/// Parameters for the file_write tool
#[derive(Debug, Deserialize)]
pub struct FileWriteParams {
    /// The path of the file to write
    pub path: String,
    /// The content to write to the file
    pub content: String,
}

/// File write tool implementation
pub struct FileWriteTool;

#[async_trait]
impl Tool for FileWriteTool {
    fn id(&self) -> &'static str {
        "file_write"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path of the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "The content to write to the file"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: FileWriteParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("file_write", e.to_string()))?;

        let filepath = ctx.resolve_path(&params.path);
        let title = ctx.relative_path(&filepath);

        if filepath.is_dir() {
            return Err(AgentError::tool_execution(
                "file_write",
                format!("{} is a directory", filepath.display()),
            ));
        }

        let exists = filepath.exists();

        if let Some(parent) = filepath.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).await?;
            }
        }

        fs::write(&filepath, &params.content).await?;

        Ok(ToolResult {
            output: format!(
                "Wrote {} bytes to {}",
                params.content.len(),
                filepath.display()
            ),
            title,
            metadata: json!({
                "filepath": filepath.to_string_lossy(),
                "exists": exists,
                "bytes": params.content.len(),
            }),
        })
    }
}
