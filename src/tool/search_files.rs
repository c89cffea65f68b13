//! Regex search across files (optional tool)

use async_trait::async_trait;
use glob::Pattern;
use regex::RegexBuilder;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

const DEFAULT_MAX_RESULTS: usize = 100;

/// Tool description
const DESCRIPTION: &str = r#"Searches file contents with a regular expression.

Usage:
- pattern uses Rust regex syntax (e.g. "fn\s+main", "TODO|FIXME")
- path limits the search to a file or directory (defaults to the working directory)
- include filters file names with a glob such as "*.rs"
- Hidden files and directories are skipped
- Results are "path:line: text", capped at max_results (default 100)"#;

/// Parameters for the search_files tool
#[derive(Debug, Deserialize)]
pub struct SearchFilesParams {
    pub pattern: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub include: Option<String>,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde(default)]
    pub max_results: Option<usize>,
}

/// Search tool implementation
pub struct SearchFilesTool;

#[async_trait]
impl Tool for SearchFilesTool {
    fn id(&self) -> &'static str {
        "search_files"
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
                    "description": "The regular expression to search for"
                },
                "path": {
                    "type": "string",
                    "description": "File or directory to search in"
                },
                "include": {
                    "type": "string",
                    "description": "Glob applied to file names, e.g. \"*.rs\""
                },
                "case_insensitive": {
                    "type": "boolean",
                    "description": "Case insensitive search"
                },
                "max_results": {
                    "type": "number",
                    "description": "Maximum number of matching lines (default 100)"
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: SearchFilesParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("search_files", e.to_string()))?;

        let regex = RegexBuilder::new(&params.pattern)
            .case_insensitive(params.case_insensitive)
            .build()
            .map_err(|e| AgentError::invalid_arguments("search_files", format!("Invalid regex: {e}")))?;

        let include = params
            .include
            .as_deref()
            .map(Pattern::new)
            .transpose()
            .map_err(|e| AgentError::invalid_arguments("search_files", format!("Invalid include glob: {e}")))?;

        let search_path = match &params.path {
            Some(p) => ctx.resolve_path(p),
            None => ctx.working_directory.clone(),
        };
        if !search_path.exists() {
            return Err(AgentError::file_not_found(search_path.to_string_lossy(), vec![]));
        }

        let max_results = params.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        let mut results = Vec::new();
        let mut truncated = false;

        'files: for file in collect_files(&search_path, include.as_ref()) {
            // Unreadable or non-UTF-8 files are skipped
            let Ok(content) = fs::read_to_string(&file) else {
                continue;
            };
            let rel_path = ctx.relative_path(&file);
            for (i, line) in content.lines().enumerate() {
                if regex.is_match(line) {
                    if results.len() == max_results {
                        truncated = true;
                        break 'files;
                    }
                    results.push(format!("{}:{}: {}", rel_path, i + 1, line));
                }
            }
        }

        let mut output = results.join("\n");
        if truncated {
            output.push_str(&format!("\n... (stopped after {max_results} matches)"));
        }

        Ok(ToolResult {
            title: params.pattern,
            output,
            metadata: json!({
                "count": results.len(),
                "truncated": truncated,
            }),
        })
    }
}

/// Files under `path`, skipping hidden entries, sorted for stable output
fn collect_files(path: &Path, include: Option<&Pattern>) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_entry(|e| e.path() == path || !is_hidden(e.file_name().to_str().unwrap_or("")))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            include.map_or(true, |pattern| {
                pattern.matches(e.file_name().to_str().unwrap_or(""))
            })
        })
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}
