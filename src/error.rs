//! Error types for the agent builder
//!
//! Structured error variants with a JSON form so tool failures can be handed
//! back to the model in a consistent shape.

use thiserror::Error;

/// Main result type for the agent builder
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent builder errors with structured data
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("File not found: {path}")]
    FileNotFound {
        path: String,
        suggestions: Vec<String>,
    },

    #[error("Cannot read binary file: {path}")]
    BinaryFile { path: String },

    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Tool execution failed: {message}")]
    ToolExecution { tool: String, message: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Model error: {message}")]
    Model {
        provider: String,
        message: String,
    },

    #[error("Agent exceeded maximum iterations ({max})")]
    MaxIterations { max: usize },

    #[error("Knowledge base error: {message}")]
    Knowledge {
        knowledge_base_id: Option<String>,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AgentError {
    /// Create a new FileNotFound error with suggestions
    pub fn file_not_found(path: impl Into<String>, suggestions: Vec<String>) -> Self {
        Self::FileNotFound {
            path: path.into(),
            suggestions,
        }
    }

    /// Create a new InvalidArguments error
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a new ToolExecution error
    pub fn tool_execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn model(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Model {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn knowledge(knowledge_base_id: Option<&str>, message: impl Into<String>) -> Self {
        Self::Knowledge {
            knowledge_base_id: knowledge_base_id.map(str::to_string),
            message: message.into(),
        }
    }

    /// Convert to JSON-serializable error object
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::FileNotFound { path, suggestions } => {
                let mut msg = format!("File not found: {path}");
                if !suggestions.is_empty() {
                    msg.push_str("\n\nDid you mean one of these?\n");
                    msg.push_str(&suggestions.join("\n"));
                }
                serde_json::json!({
                    "name": "FileNotFound",
                    "data": {
                        "path": path,
                        "suggestions": suggestions,
                        "message": msg,
                    }
                })
            }
            Self::BinaryFile { path } => serde_json::json!({
                "name": "BinaryFile",
                "data": {
                    "path": path,
                    "message": format!("Cannot read binary file: {path}"),
                }
            }),
            Self::InvalidArguments { tool, message } => serde_json::json!({
                "name": "InvalidArguments",
                "data": {
                    "tool": tool,
                    "message": message,
                }
            }),
            Self::ToolExecution { tool, message } => serde_json::json!({
                "name": "ToolExecution",
                "data": {
                    "tool": tool,
                    "message": message,
                }
            }),
            Self::UnknownTool { name } => serde_json::json!({
                "name": "UnknownTool",
                "data": {
                    "tool": name,
                    "message": format!("Unknown tool: {name}"),
                }
            }),
            Self::Config { message } => serde_json::json!({
                "name": "ConfigError",
                "data": {
                    "message": message,
                }
            }),
            Self::Model { provider, message } => serde_json::json!({
                "name": "ModelError",
                "data": {
                    "provider": provider,
                    "message": message,
                }
            }),
            Self::MaxIterations { max } => serde_json::json!({
                "name": "MaxIterations",
                "data": {
                    "max": max,
                    "message": self.to_string(),
                }
            }),
            Self::Knowledge {
                knowledge_base_id,
                message,
            } => serde_json::json!({
                "name": "KnowledgeBaseError",
                "data": {
                    "knowledgeBaseId": knowledge_base_id,
                    "message": message,
                }
            }),
            Self::Io(e) => serde_json::json!({
                "name": "IOError",
                "data": {
                    "message": e.to_string(),
                }
            }),
            Self::Json(e) => serde_json::json!({
                "name": "JSONError",
                "data": {
                    "message": e.to_string(),
                }
            }),
            Self::Http(e) => serde_json::json!({
                "name": "HTTPError",
                "data": {
                    "message": e.to_string(),
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_error() {
        let err = AgentError::file_not_found(
            "/path/to/file.txt",
            vec!["/path/to/file.md".to_string()],
        );

        let json = err.to_json();
        assert_eq!(json["name"], "FileNotFound");
        assert_eq!(json["data"]["path"], "/path/to/file.txt");
        assert!(json["data"]["message"]
            .as_str()
            .unwrap()
            .contains("Did you mean"));
    }

    #[test]
    fn test_knowledge_error_carries_id() {
        let err = AgentError::knowledge(Some("team-notes"), "store is unreadable");

        let json = err.to_json();
        assert_eq!(json["name"], "KnowledgeBaseError");
        assert_eq!(json["data"]["knowledgeBaseId"], "team-notes");
    }

    #[test]
    fn test_error_display() {
        let err = AgentError::UnknownTool {
            name: "teleport".to_string(),
        };
        assert_eq!(format!("{err}"), "Unknown tool: teleport");

        let err = AgentError::config("Unknown model provider: bedrock");
        assert_eq!(
            format!("{err}"),
            "Configuration error: Unknown model provider: bedrock"
        );
    }
}
