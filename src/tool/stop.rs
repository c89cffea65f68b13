//! Stop tool: ends the agent loop after the current round of tool calls

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

const DESCRIPTION: &str = "Stops the current agent run once this round of tool calls finishes. \
Use when the task is complete or cannot continue.";

#[derive(Debug, Deserialize, Default)]
pub struct StopParams {
    #[serde(default)]
    pub reason: Option<String>,
}

pub struct StopTool;

#[async_trait]
impl Tool for StopTool {
    fn id(&self) -> &'static str {
        "stop"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reason": {
                    "type": "string",
                    "description": "Why the run is stopping"
                }
            }
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult> {
        let params: StopParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("stop", e.to_string()))?;

        let reason = params.reason.unwrap_or_else(|| "no reason given".to_string());
        ctx.request_stop();

        Ok(ToolResult {
            title: "stop".to_string(),
            output: format!("Stopping: {reason}"),
            metadata: json!({ "reason": reason }),
        })
    }
}
