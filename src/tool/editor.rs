//! Editor tool
//!
//! String replacement and line insertion in existing files. Every edit
//! returns a unified diff of the change.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use similar::{ChangeTag, TextDiff};
use tokio::fs;

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

/// Tool description
const DESCRIPTION: &str = r#"Edits text files in place.

Commands:
- str_replace: replace old_str with new_str. old_str must match exactly one
  location unless replace_all is true. Lines are compared ignoring leading and
  trailing whitespace when there is no exact match.
- insert: insert new_str after line insert_line (0 inserts at the top)

Returns a unified diff of the change."#;

#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EditorCommand {
    #[default]
    StrReplace,
    Insert,
}

/// Parameters for the editor tool
#[derive(Debug, Deserialize)]
pub struct EditorParams {
    #[serde(default)]
    pub command: EditorCommand,
    /// File to edit
    pub path: String,
    /// Text to replace (str_replace)
    #[serde(default)]
    pub old_str: Option<String>,
    /// Replacement or inserted text
    pub new_str: String,
    /// Replace every occurrence (str_replace)
    #[serde(default)]
    pub replace_all: bool,
    /// Line after which to insert (insert)
    #[serde(default)]
    pub insert_line: Option<usize>,
}

/// Editor tool implementation
pub struct EditorTool;

#[async_trait]
impl Tool for EditorTool {
    fn id(&self) -> &'static str {
        "editor"
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
                    "enum": ["str_replace", "insert"],
                    "description": "Edit operation (defaults to str_replace)"
                },
                "path": {
                    "type": "string",
                    "description": "The file to modify"
                },
                "old_str": {
                    "type": "string",
                    "description": "The text to replace (str_replace)"
                },
                "new_str": {
                    "type": "string",
                    "description": "The replacement text, or the text to insert"
                },
                "replace_all": {
                    "type": "boolean",
                    "description": "Replace all occurrences of old_str (default false)"
                },
                "insert_line": {
                    "type": "number",
                    "description": "Line number after which new_str is inserted (insert)"
                }
            },
            "required": ["path", "new_str"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: EditorParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("editor", e.to_string()))?;

        let filepath = ctx.resolve_path(&params.path);
        let title = ctx.relative_path(&filepath);

        if !filepath.is_file() {
            return Err(AgentError::file_not_found(
                filepath.to_string_lossy(),
                vec![],
            ));
        }

        let raw = fs::read_to_string(&filepath).await?;
        let crlf = raw.contains("\r\n");
        let content_old = normalize_line_endings(&raw);

        let content_new = match params.command {
            EditorCommand::StrReplace => {
                let old = params.old_str.as_deref().unwrap_or_default();
                if old.is_empty() {
                    return Err(AgentError::invalid_arguments(
                        "editor",
                        "old_str is required for str_replace",
                    ));
                }
                if old == params.new_str {
                    return Err(AgentError::invalid_arguments(
                        "editor",
                        "old_str and new_str must be different",
                    ));
                }
                replace(&content_old, old, &params.new_str, params.replace_all)?
            }
            EditorCommand::Insert => {
                let line = params.insert_line.ok_or_else(|| {
                    AgentError::invalid_arguments("editor", "insert_line is required for insert")
                })?;
                insert_after(&content_old, line, &params.new_str)?
            }
        };

        fs::write(&filepath, restore_line_endings(&content_new, crlf)).await?;

        let (additions, deletions) = count_changes(&content_old, &content_new);
        let diff = create_diff(&content_old, &content_new, &title);

        Ok(ToolResult {
            title,
            output: diff,
            metadata: json!({
                "additions": additions,
                "deletions": deletions,
            }),
        })
    }
}

/// Normalize line endings to Unix style
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Put CRLF endings back on text edited in normalized form
fn restore_line_endings(text: &str, crlf: bool) -> String {
    let text = normalize_line_endings(text);
    if crlf {
        text.replace('\n', "\r\n")
    } else {
        text
    }
}

/// Create a unified diff string
fn create_diff(old: &str, new: &str, path: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(path, path)
        .to_string()
}

fn count_changes(old: &str, new: &str) -> (usize, usize) {
    let diff = TextDiff::from_lines(old, new);
    diff.iter_all_changes()
        .fold((0, 0), |(adds, dels), change| match change.tag() {
            ChangeTag::Insert => (adds + 1, dels),
            ChangeTag::Delete => (adds, dels + 1),
            ChangeTag::Equal => (adds, dels),
        })
}

/// Replace `old` with `new`, falling back to whitespace-insensitive line matching
fn replace(content: &str, old: &str, new: &str, replace_all: bool) -> Result<String> {
    let exact = content.matches(old).count();
    if exact == 1 || (exact > 1 && replace_all) {
        return Ok(if replace_all {
            content.replace(old, new)
        } else {
            content.replacen(old, new, 1)
        });
    }
    if exact > 1 {
        return Err(ambiguous(exact));
    }

    let spans = line_trimmed_matches(content, old);
    match spans.len() {
        0 => Err(AgentError::tool_execution(
            "editor",
            "old_str not found in file",
        )),
        n if n > 1 && !replace_all => Err(ambiguous(n)),
        _ => {
            let mut result = content.to_string();
            for (start, end) in spans.into_iter().rev() {
                result.replace_range(start..end, new);
            }
            Ok(result)
        }
    }
}

fn ambiguous(count: usize) -> AgentError {
    AgentError::tool_execution(
        "editor",
        format!(
            "old_str matches {count} locations; add surrounding context or set replace_all"
        ),
    )
}

/// Byte ranges of line blocks equal to `old` when each line is trimmed
fn line_trimmed_matches(content: &str, old: &str) -> Vec<(usize, usize)> {
    let search: Vec<&str> = old.lines().map(str::trim).collect();
    if search.is_empty() || search.iter().all(|l| l.is_empty()) {
        return Vec::new();
    }

    // (start offset, line) for every line in content
    let mut lines = Vec::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        lines.push((offset, line.trim_end_matches('\n')));
        offset += line.len();
    }

    let mut spans = Vec::new();
    let mut i = 0;
    while i + search.len() <= lines.len() {
        let window = &lines[i..i + search.len()];
        if window.iter().zip(&search).all(|((_, l), s)| l.trim() == *s) {
            let start = window[0].0;
            let (last_offset, last_line) = window[window.len() - 1];
            spans.push((start, last_offset + last_line.len()));
            i += search.len();
        } else {
            i += 1;
        }
    }
    spans
}

/// Insert `text` after line `line` (1-based; 0 means before the first line)
fn insert_after(content: &str, line: usize, text: &str) -> Result<String> {
    let lines: Vec<&str> = content.lines().collect();
    if line > lines.len() {
        return Err(AgentError::invalid_arguments(
            "editor",
            format!("insert_line {line} is past the end of the file ({} lines)", lines.len()),
        ));
    }

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 1);
    out.extend_from_slice(&lines[..line]);
    out.push(text);
    out.extend_from_slice(&lines[line..]);

    let mut result = out.join("\n");
    if content.ends_with('\n') || content.is_empty() {
        result.push('\n');
    }
    Ok(result)
}
