//! Glob-based file finder (optional tool)

use async_trait::async_trait;
use glob::glob as glob_match;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::SystemTime;

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

/// Tool description
const DESCRIPTION: &str = r#"Finds files by glob pattern.

Usage:
- Supports patterns like "**/*.rs" or "src/**/*.toml"
- Relative patterns are matched under path (defaults to the working directory)
- Results are sorted by modification time, newest first"#;

/// Parameters for the find_files tool
#[derive(Debug, Deserialize)]
pub struct FindFilesParams {
    pub pattern: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Finder tool implementation
pub struct FindFilesTool;

#[async_trait]
impl Tool for FindFilesTool {
    fn id(&self) -> &'static str {
        "find_files"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The glob pattern to match files against"
                },
                "path": {
                    "type": "string",
                    "description": "The directory to search in (defaults to working directory)"
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: FindFilesParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("find_files", e.to_string()))?;

        let base_path = match &params.path {
            Some(p) => ctx.resolve_path(p),
            None => ctx.working_directory.clone(),
        };

        let full_pattern = if params.pattern.starts_with('/') {
            params.pattern.clone()
        } else {
            base_path.join(&params.pattern).to_string_lossy().to_string()
        };

        let entries = glob_match(&full_pattern).map_err(|e| {
            AgentError::invalid_arguments("find_files", format!("Invalid pattern: {e}"))
        })?;

        let mut matches: Vec<(PathBuf, SystemTime)> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::debug!("Skipping unreadable glob entry: {e}");
                    None
                }
            })
            .filter(|path| path.is_file())
            .map(|path| {
                let mtime = path
                    .metadata()
                    .and_then(|m| m.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                (path, mtime)
            })
            .collect();

        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let output: Vec<String> = matches
            .iter()
            .map(|(path, _)| ctx.relative_path(path))
            .collect();

        Ok(ToolResult {
            title: params.pattern,
            output: output.join("\n"),
            metadata: json!({
                "count": output.len(),
            }),
        })
    }
}
