//! Directory listing (optional tool)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

/// Tool description
const DESCRIPTION: &str = r#"Lists files and directories in a given path.

Usage:
- If no path is specified, lists the working directory
- Directories are marked with a trailing slash, files show their size"#;

/// Parameters for the list_directory tool
#[derive(Debug, Deserialize)]
pub struct ListDirectoryParams {
    #[serde(default)]
    pub path: Option<String>,
}

/// Directory listing tool implementation
pub struct ListDirectoryTool;

#[async_trait]
impl Tool for ListDirectoryTool {
    fn id(&self) -> &'static str {
        "list_directory"
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
                    "description": "The path to list (defaults to the working directory)"
                }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: ListDirectoryParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("list_directory", e.to_string()))?;

        let dir_path = match &params.path {
            Some(p) => ctx.resolve_path(p),
            None => ctx.working_directory.clone(),
        };

        if !dir_path.exists() {
            return Err(AgentError::file_not_found(dir_path.to_string_lossy(), vec![]));
        }
        if !dir_path.is_dir() {
            return Err(AgentError::tool_execution(
                "list_directory",
                format!("Not a directory: {}", dir_path.display()),
            ));
        }

        let entries = list_directory(&dir_path)?;
        let title = ctx.relative_path(&dir_path);

        Ok(ToolResult {
            title: if title.is_empty() { ".".to_string() } else { title },
            output: entries.join("\n"),
            metadata: json!({
                "count": entries.len(),
            }),
        })
    }
}

fn list_directory(path: &Path) -> Result<Vec<String>> {
    let mut entries = Vec::new();

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        let name = entry.file_name().to_string_lossy().to_string();

        entries.push(if metadata.is_dir() {
            format!("{name}/")
        } else {
            format!("{name} ({})", format_size(metadata.len()))
        });
    }

    entries.sort();
    Ok(entries)
}

/// Format file size in human-readable form
fn format_size(bytes: u64) -> String {
    const UNITS: [(&str, u64); 3] = [("GB", 1 << 30), ("MB", 1 << 20), ("KB", 1 << 10)];

    UNITS
        .iter()
        .find(|(_, size)| bytes >= *size)
        .map(|(unit, size)| format!("{:.1}{unit}", bytes as f64 / *size as f64))
        .unwrap_or_else(|| format!("{bytes}B"))
}
