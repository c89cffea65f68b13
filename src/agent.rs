//! Agent loop with tool calling
//!
//! The agent sends the conversation to the model, runs whatever tools the
//! model asks for, feeds the results back and repeats until the model answers
//! with plain text or a tool requests a stop.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::field::Empty;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::handler::{CallbackHandler, ConsoleHandler};
use crate::model::{ChatModel, ChatRequest, Message, ToolCall, Usage};
use crate::telemetry::TraceAttributes;
use crate::tool::{ToolContext, ToolRegistry, ToolResult, ToolSpec};

pub const DEFAULT_MAX_ITERATIONS: usize = 25;

/// Record of a tool call made during an invocation
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub name: String,
    pub arguments: Value,
    pub output: String,
    pub ok: bool,
}

/// Result of [`Agent::invoke`]
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// Final text from the model
    pub content: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub iterations: usize,
    /// True when the `stop` tool ended the loop
    pub stopped: bool,
    pub usage: Usage,
}

/// Options for a tool call made by the program rather than the model
#[derive(Debug, Clone, Default)]
pub struct DirectCall {
    /// Append the call and its result to the conversation
    pub record: bool,
    /// User message recorded in place of the generated one
    pub user_message_override: Option<String>,
}

impl DirectCall {
    pub fn recorded() -> Self {
        Self {
            record: true,
            user_message_override: None,
        }
    }

    pub fn unrecorded() -> Self {
        Self::default()
    }

    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message_override = Some(message.into());
        self
    }
}

/// Tool-using conversational agent
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    ctx: ToolContext,
    system_prompt: String,
    messages: Vec<Message>,
    handler: Box<dyn CallbackHandler>,
    attributes: TraceAttributes,
    max_iterations: usize,
    tool_count: usize,
    last_response: Option<String>,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        ctx: ToolContext,
        system_prompt: impl Into<String>,
        attributes: TraceAttributes,
    ) -> Self {
        Self {
            model,
            tools,
            ctx,
            system_prompt: system_prompt.into(),
            messages: Vec::new(),
            handler: Box::new(ConsoleHandler),
            attributes,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tool_count: 0,
            last_response: None,
        }
    }

    pub fn with_handler(mut self, handler: impl CallbackHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Text of the most recent model answer
    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn attributes(&self) -> &TraceAttributes {
        &self.attributes
    }

    /// Run one user turn. `system_prompt_override` replaces the agent's prompt for this turn only.
    pub async fn invoke(
        &mut self,
        prompt: &str,
        system_prompt_override: Option<&str>,
    ) -> Result<AgentResponse> {
        let system_prompt = system_prompt_override
            .map(str::to_string)
            .unwrap_or_else(|| self.system_prompt.clone());
        let specs = self.tools.specs();

        self.messages.push(Message::user(prompt));

        let span = info_span!(
            "agent.invoke",
            input = prompt,
            model = self.model.model_id(),
            output = Empty,
            otel.status_code = Empty,
        );
        self.attributes.apply(&span);

        let result = self
            .run_loop(&system_prompt, &specs)
            .instrument(span.clone())
            .await;

        match &result {
            Ok(response) => {
                span.record("output", response.content.as_str());
                span.record("otel.status_code", "ok");
            }
            Err(_) => {
                span.record("otel.status_code", "error");
            }
        }

        result
    }

    async fn run_loop(
        &mut self,
        system_prompt: &str,
        specs: &[ToolSpec],
    ) -> Result<AgentResponse> {
        let mut records = Vec::new();
        let mut usage = Usage::default();

        for iteration in 1..=self.max_iterations {
            debug!("Agent iteration {iteration}");

            let response = self
                .model
                .complete(ChatRequest {
                    system_prompt,
                    messages: &self.messages,
                    tools: specs,
                })
                .await?;

            if let Some(u) = response.usage {
                usage.input_tokens += u.input_tokens;
                usage.output_tokens += u.output_tokens;
            }

            if response.tool_calls.is_empty() {
                let content = response.content.unwrap_or_default();
                self.messages.push(Message::assistant(content.clone()));
                return Ok(self.finish(content, records, iteration, false, usage));
            }

            self.messages.push(Message::Assistant {
                content: response.content.clone(),
                tool_calls: response.tool_calls.clone(),
            });

            for call in &response.tool_calls {
                let span = info_span!(
                    "tool",
                    otel.name = %format!("tool.{}", call.name),
                    tool.name = call.name.as_str(),
                    otel.status_code = Empty,
                );
                let record = self.execute_tool_call(call).instrument(span.clone()).await;
                span.record("otel.status_code", if record.ok { "ok" } else { "error" });

                self.messages.push(Message::Tool {
                    tool_call_id: call.id.clone(),
                    content: record.output.clone(),
                });
                records.push(record);
            }

            if self.ctx.take_stop() {
                info!("Stop requested by tool");
                let content = response.content.unwrap_or_default();
                return Ok(self.finish(content, records, iteration, true, usage));
            }
        }

        Err(AgentError::MaxIterations {
            max: self.max_iterations,
        })
    }

    fn finish(
        &mut self,
        content: String,
        tool_calls: Vec<ToolCallRecord>,
        iterations: usize,
        stopped: bool,
        usage: Usage,
    ) -> AgentResponse {
        if !content.is_empty() {
            self.handler.on_text(&content);
        }
        self.last_response = Some(content.clone());
        AgentResponse {
            content,
            tool_calls,
            iterations,
            stopped,
            usage,
        }
    }

    /// Run a model-requested tool call; failures become `Error: ...` text for the model
    async fn execute_tool_call(&mut self, call: &ToolCall) -> ToolCallRecord {
        self.tool_count += 1;
        self.handler.on_tool_start(self.tool_count, &call.name);
        info!(tool = %call.name, "Agent calling tool");

        let arguments = match &call.arguments {
            Value::Null => json!({}),
            other => other.clone(),
        };

        let result = match self.tools.get(&call.name) {
            Some(tool) => tool.execute(arguments.clone(), &self.ctx).await,
            None => Err(AgentError::UnknownTool {
                name: call.name.clone(),
            }),
        };

        let (output, ok) = match result {
            Ok(result) => (result.output, true),
            Err(e) => {
                debug!(tool = %call.name, "Tool failed: {e}");
                (format!("Error: {e}"), false)
            }
        };
        self.handler.on_tool_end(&call.name, ok);

        ToolCallRecord {
            name: call.name.clone(),
            arguments,
            output,
            ok,
        }
    }

    /// Run a tool on behalf of the program
    ///
    /// When recorded, the conversation gains a user message, an assistant
    /// message carrying the tool call, and the tool result, so the model sees
    /// the call on its next turn.
    pub async fn call_tool(
        &mut self,
        name: &str,
        params: Value,
        direct: DirectCall,
    ) -> Result<ToolResult> {
        let tool = self.tools.get(name).ok_or_else(|| AgentError::UnknownTool {
            name: name.to_string(),
        })?;
        let result = tool.execute(params.clone(), &self.ctx).await;

        if direct.record {
            let call_id = format!("call_{}", Uuid::new_v4().simple());
            let user_message = direct.user_message_override.unwrap_or_else(|| {
                format!("agent.tool.{name} direct tool call.\nInput parameters: {params}")
            });
            let output = match &result {
                Ok(result) => result.output.clone(),
                Err(e) => format!("Error: {e}"),
            };

            self.messages.push(Message::user(user_message));
            self.messages.push(Message::Assistant {
                content: None,
                tool_calls: vec![ToolCall {
                    id: call_id.clone(),
                    name: name.to_string(),
                    arguments: params,
                }],
            });
            self.messages.push(Message::Tool {
                tool_call_id: call_id,
                content: output,
            });
        }

        result
    }
}
