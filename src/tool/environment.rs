//! Environment inspection tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

const SENSITIVE_MARKERS: &[&str] = &["KEY", "SECRET", "TOKEN", "PASSWORD", "CREDENTIAL", "AUTH"];

/// Tool description
const DESCRIPTION: &str = r#"Inspects environment variables of the agent process.

Actions:
- list: list variables, optionally filtered by a name prefix. Values of
  sensitive-looking variables are masked.
- get: return the value of a single variable"#;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentAction {
    List,
    Get,
}

/// Parameters for the environment tool
#[derive(Debug, Deserialize)]
pub struct EnvironmentParams {
    pub action: EnvironmentAction,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
}

/// Environment tool implementation
pub struct EnvironmentTool;

/// Whether a variable name looks like it holds a credential
pub fn is_sensitive(name: &str) -> bool {
    let upper = name.to_uppercase();
    SENSITIVE_MARKERS.iter().any(|m| upper.contains(m))
}

fn mask(value: &str) -> String {
    if value.chars().count() <= 4 {
        "****".to_string()
    } else {
        let head: String = value.chars().take(4).collect();
        format!("{head}****")
    }
}

#[async_trait]
impl Tool for EnvironmentTool {
    fn id(&self) -> &'static str {
        "environment"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["list", "get"]
                },
                "name": {
                    "type": "string",
                    "description": "Variable name (get)"
                },
                "prefix": {
                    "type": "string",
                    "description": "Only list variables starting with this prefix (list)"
                }
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let params: EnvironmentParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("environment", e.to_string()))?;

        match params.action {
            EnvironmentAction::List => {
                let prefix = params.prefix.unwrap_or_default();
                // vars() panics on non-Unicode entries
                let mut vars: Vec<(String, String)> = std::env::vars_os()
                    .map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned()))
                    .filter(|(k, _)| k.starts_with(&prefix))
                    .map(|(k, v)| {
                        let shown = if is_sensitive(&k) { mask(&v) } else { v };
                        (k, shown)
                    })
                    .collect();
                vars.sort();

                let output = vars
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("\n");

                Ok(ToolResult {
                    title: "environment".to_string(),
                    output,
                    metadata: json!({ "count": vars.len() }),
                })
            }
            EnvironmentAction::Get => {
                let name = params.name.ok_or_else(|| {
                    AgentError::invalid_arguments("environment", "name is required for get")
                })?;
                match std::env::var_os(&name) {
                    Some(value) => {
                        let unicode = value.to_str().is_some();
                        Ok(ToolResult {
                            title: name.clone(),
                            output: value.to_string_lossy().into_owned(),
                            metadata: json!({ "name": name, "set": true, "unicode": unicode }),
                        })
                    }
                    None => Ok(ToolResult {
                        title: name.clone(),
                        output: format!("{name} is not set"),
                        metadata: json!({ "name": name, "set": false }),
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_names() {
        assert!(is_sensitive("OPENAI_API_KEY"));
        assert!(is_sensitive("langfuse_secret_key"));
        assert!(is_sensitive("GITHUB_TOKEN"));
        assert!(!is_sensitive("HOME"));
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("abc"), "****");
        assert_eq!(mask("sk-1234567"), "sk-1****");
    }

    #[tokio::test]
    async fn test_get_and_list() {
        let temp = tempfile::TempDir::new().unwrap();
        let ctx = ToolContext::new("ses_test", temp.path(), temp.path());

        let path = std::env::var("PATH").unwrap_or_default();
        let result = EnvironmentTool
            .execute(json!({ "action": "get", "name": "PATH" }), &ctx)
            .await
            .unwrap();
        assert_eq!(result.output, path);

        let result = EnvironmentTool
            .execute(json!({ "action": "list", "prefix": "PATH" }), &ctx)
            .await
            .unwrap();
        assert!(result.output.contains("PATH="));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_unicode_value_is_listed_lossily() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let temp = tempfile::TempDir::new().unwrap();
        let ctx = ToolContext::new("ses_test", temp.path(), temp.path());
        std::env::set_var("BUILDER_TEST_RAW_BYTES", OsString::from_vec(vec![0xff, 0xfe]));

        let listed = EnvironmentTool
            .execute(json!({ "action": "list", "prefix": "BUILDER_TEST_RAW" }), &ctx)
            .await;
        let fetched = EnvironmentTool
            .execute(json!({ "action": "get", "name": "BUILDER_TEST_RAW_BYTES" }), &ctx)
            .await;
        std::env::remove_var("BUILDER_TEST_RAW_BYTES");

        let listed = listed.unwrap();
        assert_eq!(listed.output, "BUILDER_TEST_RAW_BYTES=\u{FFFD}\u{FFFD}");

        let fetched = fetched.unwrap();
        assert_eq!(fetched.output, "\u{FFFD}\u{FFFD}");
        assert_eq!(fetched.metadata["set"], true);
        assert_eq!(fetched.metadata["unicode"], false);
    }

    #[tokio::test]
    async fn test_get_requires_name() {
        let temp = tempfile::TempDir::new().unwrap();
        let ctx = ToolContext::new("ses_test", temp.path(), temp.path());
        assert!(EnvironmentTool
            .execute(json!({ "action": "get" }), &ctx)
            .await
            .is_err());
    }
}
