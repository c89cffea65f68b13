//! Model providers
//!
//! The agent talks to models through [`ChatModel`]. Providers are selected by
//! name and configured with a JSON object given inline or as a file path.

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

use crate::config::EnvLookup;
use crate::error::{AgentError, Result};
use crate::tool::ToolSpec;

pub use openai::OpenAiModel;

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Arguments as a JSON value
    pub arguments: Value,
}

/// One entry of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    User {
        content: String,
    },
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }
}

/// Everything a provider needs for one completion
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system_prompt: &'a str,
    pub messages: &'a [Message],
    pub tools: &'a [ToolSpec],
}

/// Token accounting reported by the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// A single model turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// A chat completion backend
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider name, used in errors and traces
    fn provider(&self) -> &str;

    /// Model identifier sent to the provider
    fn model_id(&self) -> &str;

    async fn complete(&self, request: ChatRequest<'_>) -> Result<ChatResponse>;
}

/// Known model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    OpenAi,
    Ollama,
}

impl ModelProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelProvider::OpenAi => "openai",
            ModelProvider::Ollama => "ollama",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ModelProvider::OpenAi => "gpt-4o",
            ModelProvider::Ollama => "llama3.1",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ModelProvider::OpenAi => "https://api.openai.com/v1",
            ModelProvider::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Environment variable holding the API key, if the provider needs one
    pub fn default_api_key_env(&self) -> Option<&'static str> {
        match self {
            ModelProvider::OpenAi => Some("OPENAI_API_KEY"),
            ModelProvider::Ollama => None,
        }
    }
}

impl std::str::FromStr for ModelProvider {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ModelProvider::OpenAi),
            "ollama" => Ok(ModelProvider::Ollama),
            other => Err(AgentError::config(format!(
                "Unknown model provider: {other} (expected openai or ollama)"
            ))),
        }
    }
}

impl std::fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider settings from `--model-config`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Name of the environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f32>,
}

/// Parse `--model-config`: a path to a JSON file or an inline JSON object
pub fn load_config(value: &str) -> Result<ModelConfig> {
    let trimmed = value.trim();
    let path = Path::new(trimmed);

    let text = if trimmed.ends_with(".json") || (!trimmed.starts_with('{') && path.is_file()) {
        std::fs::read_to_string(path).map_err(|e| {
            AgentError::config(format!("Cannot read model config {}: {e}", path.display()))
        })?
    } else {
        trimmed.to_string()
    };

    let json: Value = serde_json::from_str(&text)
        .map_err(|e| AgentError::config(format!("Invalid model config JSON: {e}")))?;
    if !json.is_object() {
        return Err(AgentError::config("Model config must be a JSON object"));
    }

    serde_json::from_value(json)
        .map_err(|e| AgentError::config(format!("Invalid model config: {e}")))
}

/// Build the model for a provider
pub fn load_model(
    provider: ModelProvider,
    config: ModelConfig,
    lookup: EnvLookup<'_>,
) -> Result<Arc<dyn ChatModel>> {
    let api_key = config.api_key.clone().or_else(|| {
        config
            .api_key_env
            .as_deref()
            .or(provider.default_api_key_env())
            .and_then(lookup)
    });

    tracing::debug!(
        provider = %provider,
        model = config.model_id.as_deref().unwrap_or(provider.default_model()),
        "Loading model"
    );

    Ok(Arc::new(OpenAiModel::new(provider, config, api_key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("openai".parse::<ModelProvider>().unwrap(), ModelProvider::OpenAi);
        assert_eq!(" Ollama ".parse::<ModelProvider>().unwrap(), ModelProvider::Ollama);
        let err = "bedrock".parse::<ModelProvider>().unwrap_err();
        assert!(err.to_string().contains("Unknown model provider: bedrock"));
    }

    #[test]
    fn test_load_inline_config() {
        let config = load_config(r#"{"model_id": "gpt-4o-mini", "temperature": 0.2}"#).unwrap();
        assert_eq!(config.model_id.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.temperature, Some(0.2));

        assert_eq!(load_config("{}").unwrap(), ModelConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.json");
        std::fs::write(&path, r#"{"base_url": "http://localhost:8080/v1"}"#).unwrap();

        let config = load_config(&path.to_string_lossy()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080/v1"));
    }

    #[test]
    fn test_load_config_errors() {
        assert!(load_config("[1, 2]").is_err());
        assert!(load_config("not json").is_err());
        assert!(load_config("/definitely/missing/model.json").is_err());
        assert!(load_config(r#"{"modelId": "typo"}"#).is_err());
    }

    #[test]
    fn test_message_serialization() {
        let message = Message::user("hi");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "hi");
    }

    #[test]
    fn test_load_model_reads_key_from_env() {
        let lookup = |k: &str| (k == "OPENAI_API_KEY").then(|| "sk-test".to_string());
        let model = load_model(ModelProvider::OpenAi, ModelConfig::default(), &lookup).unwrap();
        assert_eq!(model.provider(), "openai");
        assert_eq!(model.model_id(), "gpt-4o");
    }
}
