//! Tool execution context
//!
//! Carries the session, directories, knowledge store and stop flag that
//! tools need while they run.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::knowledge::KnowledgeStore;

/// Context passed to tool executions
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Current session ID
    pub session_id: String,
    /// Working directory for file operations
    pub working_directory: PathBuf,
    /// Directory holding the welcome text and other user data
    pub data_dir: PathBuf,
    /// Store used by the retrieve and store_in_kb tools
    pub knowledge: KnowledgeStore,
    stop: Arc<AtomicBool>,
}

impl ToolContext {
    /// Create a new tool context
    pub fn new(
        session_id: impl Into<String>,
        working_directory: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
    ) -> Self {
        let data_dir = data_dir.into();
        Self {
            session_id: session_id.into(),
            working_directory: working_directory.into(),
            knowledge: KnowledgeStore::new(data_dir.join("knowledge")),
            data_dir,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use a specific knowledge store
    pub fn with_knowledge(mut self, knowledge: KnowledgeStore) -> Self {
        self.knowledge = knowledge;
        self
    }

    /// Ask the agent loop to end after the current round of tool calls
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Consume a pending stop request
    pub fn take_stop(&self) -> bool {
        self.stop.swap(false, Ordering::SeqCst)
    }

    /// Resolve a path relative to the working directory
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.working_directory.join(path)
        }
    }

    /// Get relative path from working directory
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.working_directory)
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|_| path.to_string_lossy().to_string())
    }
}
