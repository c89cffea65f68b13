//! Welcome text tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};
use crate::welcome::WelcomeStore;

/// Tool description
const DESCRIPTION: &str = r#"Views or edits the welcome text shown at the start of interactive sessions.

Actions:
- view: return the current welcome text
- edit: replace the welcome text with content"#;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WelcomeAction {
    View,
    Edit,
}

/// Parameters for the welcome tool
#[derive(Debug, Deserialize)]
pub struct WelcomeParams {
    pub action: WelcomeAction,
    #[serde(default)]
    pub content: Option<String>,
}

/// Welcome tool implementation
pub struct WelcomeTool;

#[async_trait]
impl Tool for WelcomeTool {
    fn id(&self) -> &'static str {
        "welcome"
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
                    "enum": ["view", "edit"]
                },
                "content": {
                    "type": "string",
                    "description": "New welcome text (edit)"
                }
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: WelcomeParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("welcome", e.to_string()))?;

        let store = WelcomeStore::new(&ctx.data_dir);
        match params.action {
            WelcomeAction::View => Ok(ToolResult {
                title: "welcome".to_string(),
                output: store.view().await?,
                metadata: json!({ "action": "view" }),
            }),
            WelcomeAction::Edit => {
                let content = params
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| {
                        AgentError::invalid_arguments("welcome", "content is required for edit")
                    })?;
                store.edit(&content).await?;
                Ok(ToolResult {
                    title: "welcome".to_string(),
                    output: "Welcome text updated.".to_string(),
                    metadata: json!({ "action": "edit" }),
                })
            }
        }
    }
}
