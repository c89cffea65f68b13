//! Tool implementations for the agent
//!
//! The default tool set is always registered. The optional catalog holds
//! tools that are only added when named as extra tools.

pub mod context;
mod process;

pub mod editor;
pub mod environment;
pub mod file_read;
pub mod file_write;
pub mod http_request;
pub mod python_repl;
pub mod retrieve;
pub mod shell;
pub mod stop;
pub mod store_in_kb;
pub mod welcome;

pub mod current_time;
pub mod find_files;
pub mod list_directory;
pub mod search_files;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
pub use context::ToolContext;

/// Result returned by a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Short title describing what the tool did
    pub title: String,
    /// Main output text
    pub output: String,
    /// Additional metadata about the execution
    #[serde(default)]
    pub metadata: Value,
}

/// Function definition advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Trait that all tools must implement
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's unique identifier
    fn id(&self) -> &'static str;

    /// Get the tool's description
    fn description(&self) -> &'static str;

    /// Get the JSON schema for the tool's parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given parameters
    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolResult>;

    /// Definition sent to the model
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.id().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Tools that are always available
pub fn default_tools() -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(file_read::FileReadTool),
        Box::new(file_write::FileWriteTool),
        Box::new(editor::EditorTool),
        Box::new(shell::ShellTool),
        Box::new(http_request::HttpRequestTool::new()),
        Box::new(python_repl::PythonReplTool),
        Box::new(environment::EnvironmentTool),
        Box::new(retrieve::RetrieveTool),
        Box::new(store_in_kb::StoreInKbTool),
        Box::new(welcome::WelcomeTool),
        Box::new(stop::StopTool),
    ]
}

/// Look up a tool in the optional catalog
pub fn optional_tool(name: &str) -> Option<Box<dyn Tool>> {
    let tool: Box<dyn Tool> = match name {
        "current_time" => Box::new(current_time::CurrentTimeTool),
        "list_directory" => Box::new(list_directory::ListDirectoryTool),
        "find_files" => Box::new(find_files::FindFilesTool),
        "search_files" => Box::new(search_files::SearchFilesTool),
        _ => return None,
    };
    Some(tool)
}

/// Registry of the tools handed to the agent
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self { tools: Vec::new() }
    }

    /// Create a registry holding the default tools
    pub fn with_defaults() -> Self {
        Self {
            tools: default_tools(),
        }
    }

    /// Add tools, skipping any whose ID is already registered
    pub fn extend(&mut self, extra: Vec<Box<dyn Tool>>) {
        for tool in extra {
            if self.get(tool.id()).is_some() {
                tracing::warn!(tool = tool.id(), "Skipping extra tool that clashes with a registered tool");
                continue;
            }
            tracing::debug!(tool = tool.id(), "Registered extra tool");
            self.tools.push(tool);
        }
    }

    /// Get a tool by its ID
    pub fn get(&self, id: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.id() == id).map(|t| t.as_ref())
    }

    /// Get all registered tools
    pub fn all(&self) -> &[Box<dyn Tool>] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Function definitions for the model request
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_defaults() {
        let registry = ToolRegistry::with_defaults();
        for id in [
            "file_read",
            "file_write",
            "editor",
            "shell",
            "http_request",
            "python_repl",
            "environment",
            "retrieve",
            "store_in_kb",
            "welcome",
            "stop",
        ] {
            assert!(registry.get(id).is_some(), "missing default tool {id}");
        }
        assert!(registry.get("current_time").is_none());
    }

    #[test]
    fn test_extend_skips_clashes() {
        let mut registry = ToolRegistry::with_defaults();
        let before = registry.len();

        registry.extend(vec![
            optional_tool("current_time").unwrap(),
            Box::new(shell::ShellTool),
        ]);

        assert_eq!(registry.len(), before + 1);
        assert!(registry.get("current_time").is_some());
    }

    #[test]
    fn test_optional_catalog() {
        for name in ["current_time", "list_directory", "find_files", "search_files"] {
            let tool = optional_tool(name).unwrap();
            assert_eq!(tool.id(), name);
        }
        assert!(optional_tool("shell").is_none());
    }

    #[test]
    fn test_specs_match_tools() {
        let registry = ToolRegistry::with_defaults();
        let specs = registry.specs();
        assert_eq!(specs.len(), registry.len());
        assert!(specs
            .iter()
            .all(|s| s.parameters["type"] == "object" && !s.description.is_empty()));
    }
}
