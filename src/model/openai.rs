//! OpenAI-compatible chat completions client
//!
//! Used for both OpenAI and Ollama, which exposes the same API under `/v1`.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChatModel, ChatRequest, ChatResponse, Message, ModelConfig, ModelProvider, ToolCall, Usage};
use crate::error::{AgentError, Result};
use crate::tool::ToolSpec;

// Types sent to the server

#[derive(Debug, Serialize)]
struct FunctionTool<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a Value,
}

#[derive(Debug, Serialize)]
struct WireTool<'a> {
    r#type: &'static str,
    function: FunctionTool<'a>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded arguments
    arguments: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(default = "function_type")]
    r#type: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
enum WireMessage<'a> {
    System {
        content: &'a str,
    },
    User {
        content: &'a str,
    },
    Assistant {
        content: Option<&'a str>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<WireToolCall>,
    },
    Tool {
        tool_call_id: &'a str,
        content: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

// Types received from the server

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Model served over an OpenAI-compatible API
pub struct OpenAiModel {
    client: Client,
    provider: ModelProvider,
    model_id: String,
    base_url: String,
    api_key: Option<String>,
    config: ModelConfig,
}

impl OpenAiModel {
    pub fn new(provider: ModelProvider, config: ModelConfig, api_key: Option<String>) -> Self {
        let model_id = config
            .model_id
            .clone()
            .unwrap_or_else(|| provider.default_model().to_string());
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            client: Client::new(),
            provider,
            model_id,
            base_url,
            api_key,
            config,
        }
    }

    fn build_request<'a>(&'a self, request: &ChatRequest<'a>) -> CompletionRequest<'a> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(WireMessage::System {
                content: request.system_prompt,
            });
        }
        messages.extend(request.messages.iter().map(wire_message));

        CompletionRequest {
            model: &self.model_id,
            messages,
            tools: request.tools.iter().map(wire_tool).collect(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            top_p: self.config.top_p,
        }
    }

    fn error(&self, message: impl Into<String>) -> AgentError {
        AgentError::model(self.provider.as_str(), message)
    }
}

fn wire_message(message: &Message) -> WireMessage<'_> {
    match message {
        Message::User { content } => WireMessage::User { content },
        Message::Assistant {
            content,
            tool_calls,
        } => WireMessage::Assistant {
            content: content.as_deref(),
            tool_calls: tool_calls
                .iter()
                .map(|call| WireToolCall {
                    id: call.id.clone(),
                    r#type: function_type(),
                    function: WireFunctionCall {
                        name: call.name.clone(),
                        arguments: call.arguments.to_string(),
                    },
                })
                .collect(),
        },
        Message::Tool {
            tool_call_id,
            content,
        } => WireMessage::Tool {
            tool_call_id,
            content,
        },
    }
}

fn wire_tool(spec: &ToolSpec) -> WireTool<'_> {
    WireTool {
        r#type: "function",
        function: FunctionTool {
            name: &spec.name,
            description: &spec.description,
            parameters: &spec.parameters,
        },
    }
}

/// Convert the first choice into a [`ChatResponse`]
fn parse_response(response: CompletionResponse) -> Option<ChatResponse> {
    let usage = response.usage.map(|u| Usage {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
    });
    let choice = response.choices.into_iter().next()?;

    let tool_calls = choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            // Models occasionally send malformed arguments; pass them through as a string
            let arguments = serde_json::from_str(&call.function.arguments)
                .unwrap_or(Value::String(call.function.arguments));
            ToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            }
        })
        .collect();

    Some(ChatResponse {
        content: choice.message.content.filter(|c| !c.is_empty()),
        tool_calls,
        finish_reason: choice.finish_reason,
        usage,
    })
}

#[async_trait]
impl ChatModel for OpenAiModel {
    fn provider(&self) -> &str {
        self.provider.as_str()
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn complete(&self, request: ChatRequest<'_>) -> Result<ChatResponse> {
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::CONTENT_TYPE, "application/json");

        match (&self.api_key, self.provider.default_api_key_env()) {
            (Some(key), _) => {
                builder = builder.bearer_auth(key);
            }
            (None, Some(env)) => {
                return Err(self.error(format!("No API key configured; set {env}")));
            }
            (None, None) => {}
        }

        let body = self.build_request(&request);
        tracing::debug!(
            model = %self.model_id,
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Sending chat completion request"
        );

        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| self.error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.error(format!("Request failed with status {status}: {text}")));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| self.error(format!("Invalid response: {e}")))?;

        parse_response(parsed).ok_or_else(|| self.error("Response contained no choices"))
    }
}
