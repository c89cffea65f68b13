//! File read tool
//!
//! Returns file contents with line numbers, paging with offset and limit.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tokio::fs as async_fs;

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

/// Default number of lines to read
const DEFAULT_READ_LIMIT: usize = 2000;

/// Maximum line length before truncation
const MAX_LINE_LENGTH: usize = 2000;

/// Bytes inspected when sniffing for binary content
const SNIFF_LENGTH: usize = 8192;

const BINARY_EXTENSIONS: &[&str] = &[
    "zip", "tar", "gz", "7z", "exe", "dll", "so", "dylib", "class", "jar", "wasm", "pyc", "o",
    "a", "bin", "png", "jpg", "jpeg", "gif", "webp", "pdf",
];

/// Tool description
const DESCRIPTION: &str = r#"Reads a file from the local filesystem.

Usage:
- Relative paths are resolved against the working directory
- By default, reads up to 2000 lines from the beginning
- Optionally specify offset and limit for pagination
- Returns content with line numbers
- Binary files are rejected"#;

/// Parameters for the file_read tool
#[derive(Debug, Deserialize)]
pub struct FileReadParams {
    /// The path to the file to read
    pub path: String,
    /// Line number to start reading from (0-based)
    #[serde(default)]
    pub offset: Option<usize>,
    /// Number of lines to read
    #[serde(default)]
    pub limit: Option<usize>,
}

/// File read tool implementation
pub struct FileReadTool;

#[async_trait]
impl Tool for FileReadTool {
    fn id(&self) -> &'static str {
        "file_read"
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
                    "description": "The path to the file to read"
                },
                "offset": {
                    "type": "number",
                    "description": "The line number to start reading from (0-based)"
                },
                "limit": {
                    "type": "number",
                    "description": "The number of lines to read (defaults to 2000)"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: FileReadParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("file_read", e.to_string()))?;

        let filepath = ctx.resolve_path(&params.path);
        let title = ctx.relative_path(&filepath);

        if !filepath.exists() {
            let suggestions = find_suggestions(&filepath);
            return Err(AgentError::file_not_found(
                filepath.to_string_lossy(),
                suggestions,
            ));
        }

        if filepath.is_dir() {
            return Err(AgentError::tool_execution(
                "file_read",
                format!("{} is a directory", filepath.display()),
            ));
        }

        let content = async_fs::read(&filepath).await?;

        if looks_binary(&filepath, &content) {
            return Err(AgentError::BinaryFile {
                path: filepath.to_string_lossy().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&content);
        let lines: Vec<&str> = text.lines().collect();

        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(DEFAULT_READ_LIMIT);

        let start = offset.min(lines.len());
        let end = offset.saturating_add(limit).min(lines.len());
        let selected_lines = &lines[start..end];

        let formatted: Vec<String> = selected_lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let line_num = i + start + 1;
                if line.chars().count() > MAX_LINE_LENGTH {
                    let head: String = line.chars().take(MAX_LINE_LENGTH).collect();
                    format!("{:05}| {}...", line_num, head)
                } else {
                    format!("{:05}| {}", line_num, line)
                }
            })
            .collect();

        let mut output = formatted.join("\n");

        let total_lines = lines.len();
        let last_read_line = start + formatted.len();
        if total_lines > last_read_line {
            output.push_str(&format!(
                "\n\n(File has more lines. Use 'offset' to read beyond line {})",
                last_read_line
            ));
        } else {
            output.push_str(&format!("\n\n(End of file - total {} lines)", total_lines));
        }

        Ok(ToolResult {
            title,
            output,
            metadata: json!({
                "totalLines": total_lines,
                "linesRead": formatted.len(),
            }),
        })
    }
}

/// Binary if the extension says so or the head contains a NUL byte
fn looks_binary(path: &Path, content: &[u8]) -> bool {
    let by_extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.as_str()));

    by_extension || content.iter().take(SNIFF_LENGTH).any(|b| *b == 0)
}

/// Find file suggestions when a file is not found
fn find_suggestions(path: &Path) -> Vec<String> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if base.is_empty() || !dir.is_dir() {
        return vec![];
    }

    fs::read_dir(dir)
        .ok()
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().to_string())
                .filter(|name| {
                    let lower = name.to_lowercase();
                    lower.contains(&base) || base.contains(&lower)
                })
                .take(3)
                .map(|name| dir.join(name).to_string_lossy().to_string())
                .collect()
        })
        .unwrap_or_default()
}
