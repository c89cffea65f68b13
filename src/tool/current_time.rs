//! Current time (optional tool)

use async_trait::async_trait;
use chrono::{FixedOffset, Local, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{context::ToolContext, Tool, ToolResult};
use crate::error::{AgentError, Result};

const DESCRIPTION: &str = "Returns the current date and time in ISO 8601 format. \
timezone may be \"UTC\", \"local\" or a fixed offset such as \"+05:30\" (default UTC).";

#[derive(Debug, Deserialize, Default)]
pub struct CurrentTimeParams {
    #[serde(default)]
    pub timezone: Option<String>,
}

pub struct CurrentTimeTool;

/// Render the current instant in the requested zone
fn now_in(timezone: &str) -> Option<String> {
    match timezone.to_ascii_lowercase().as_str() {
        "utc" | "z" => Some(Utc::now().to_rfc3339()),
        "local" => Some(Local::now().to_rfc3339()),
        offset => {
            let offset: FixedOffset = offset.parse().ok()?;
            Some(Utc::now().with_timezone(&offset).to_rfc3339())
        }
    }
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn id(&self) -> &'static str {
        "current_time"
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "timezone": {
                    "type": "string",
                    "description": "UTC, local, or an offset like +02:00"
                }
            }
        })
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let params: CurrentTimeParams = serde_json::from_value(params)
            .map_err(|e| AgentError::invalid_arguments("current_time", e.to_string()))?;

        let timezone = params.timezone.unwrap_or_else(|| "UTC".to_string());
        let now = now_in(&timezone).ok_or_else(|| {
            AgentError::invalid_arguments("current_time", format!("Unknown timezone: {timezone}"))
        })?;

        Ok(ToolResult {
            title: "current_time".to_string(),
            output: now.clone(),
            metadata: json!({ "timezone": timezone, "time": now }),
        })
    }
}
