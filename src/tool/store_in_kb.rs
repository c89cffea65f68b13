//! Knowledge-base storage tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

/// Tool description
const DESCRIPTION: &str = r#"Stores content in a knowledge base for later retrieval.

Usage:
- content is the text to store
- title is an optional short label
- knowledge_base_id selects the knowledge base"#;

/// Parameters for the store_in_kb tool
#[derive(Debug, Deserialize)]
pub struct StoreInKbParams {
    pub content: String,
    pub knowledge_base_id: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Store tool implementation
pub struct StoreInKbTool;

#[async_trait]
impl Tool for StoreInKbTool {
    fn id(&self) -> &'static str {
        "store_in_kb"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The text to store"
                },
                "title": {
                    "type": "string",
                    "description": "Optional title for the document"
                },
                "knowledge_base_id": {
                    "type": "string",
                    "description": "The knowledge base to store into"
                }
            },
            "required": ["content", "knowledge_base_id"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: StoreInKbParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("store_in_kb", e.to_string()))?;

        let title = params.title.unwrap_or_else(|| {
            let first_line = params.content.lines().next().unwrap_or_default();
            first_line.chars().take(60).collect()
        });

        let document = ctx
            .knowledge
            .store(&params.knowledge_base_id, &title, &params.content)
            .await?;

        Ok(ToolResult {
            title: format!("store in {}", params.knowledge_base_id),
            output: format!(
                "Stored document {} in knowledge base {}",
                document.id, params.knowledge_base_id
            ),
            metadata: json!({
                "documentId": document.id,
                "title": document.title,
            }),
        })
    }
}
