//! Knowledge-base retrieval tool

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};
use crate::knowledge::{DEFAULT_MIN_SCORE, DEFAULT_RESULT_LIMIT};

/// Tool description
const DESCRIPTION: &str = r#"Retrieves relevant documents from a knowledge base.

Usage:
- text is the query to search for
- knowledge_base_id selects the knowledge base
- number_of_results limits the hits (default 10)
- score is the minimum relevance between 0 and 1 (default 0.4)"#;

/// Parameters for the retrieve tool
#[derive(Debug, Deserialize)]
pub struct RetrieveParams {
    pub text: String,
    pub knowledge_base_id: String,
    #[serde(default)]
    pub number_of_results: Option<usize>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Retrieve tool implementation
pub struct RetrieveTool;

#[async_trait]
impl Tool for RetrieveTool {
    fn id(&self) -> &'static str {
        "retrieve"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The query to retrieve documents for"
                },
                "knowledge_base_id": {
                    "type": "string",
                    "description": "The knowledge base to query"
                },
                "number_of_results": {
                    "type": "number",
                    "description": "Maximum number of results (default 10)"
                },
                "score": {
                    "type": "number",
                    "description": "Minimum relevance score between 0 and 1 (default 0.4)"
                }
            },
            "required": ["text", "knowledge_base_id"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: RetrieveParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("retrieve", e.to_string()))?;

        let min_score = params.score.unwrap_or(DEFAULT_MIN_SCORE);
        if !(0.0..=1.0).contains(&min_score) {
            return Err(AgentError::invalid_arguments(
                "retrieve",
                "score must be between 0 and 1",
            ));
        }

        let hits = ctx
            .knowledge
            .retrieve(
                &params.knowledge_base_id,
                &params.text,
                params.number_of_results.unwrap_or(DEFAULT_RESULT_LIMIT),
                min_score,
            )
            .await?;

        let output = if hits.is_empty() {
            "No relevant documents found.".to_string()
        } else {
            hits.iter()
                .enumerate()
                .map(|(i, hit)| {
                    format!(
                        "[{}] {} (score {:.2})\n{}",
                        i + 1,
                        hit.document.title,
                        hit.score,
                        hit.document.content
                    )
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        Ok(ToolResult {
            title: format!("retrieve from {}", params.knowledge_base_id),
            output,
            metadata: json!({
                "count": hits.len(),
                "results": hits,
            }),
        })
    }
}
