//! Runtime settings resolved from flags and the environment
//!
//! Environment access goes through an [`EnvLookup`] so callers (and tests)
//! can substitute their own variable source.

use std::path::{Path, PathBuf};

use crate::error::{AgentError, Result};

/// Knowledge base used when `--kb` is not given
pub const KNOWLEDGE_BASE_ENV: &str = "BUILDER_KNOWLEDGE_BASE_ID";
/// Comma-separated extra tool specs
pub const EXTRA_TOOLS_ENV: &str = "BUILDER_EXTRA_TOOLS";
/// System prompt override
pub const SYSTEM_PROMPT_ENV: &str = "BUILDER_SYSTEM_PROMPT";
/// Data directory override
pub const DATA_DIR_ENV: &str = "BUILDER_DATA_DIR";
/// Knowledge store directory override
pub const KNOWLEDGE_DIR_ENV: &str = "BUILDER_KNOWLEDGE_DIR";
/// Exported for child processes so tools render for a console
pub const TOOL_CONSOLE_MODE_ENV: &str = "BUILDER_TOOL_CONSOLE_MODE";
/// `json` switches the log output to JSON lines
pub const LOG_FORMAT_ENV: &str = "BUILDER_LOG_FORMAT";

/// Name of the per-project extra tools file
pub const TOOLS_FILE: &str = ".tools";

const DATA_DIR_NAME: &str = ".agent-builder";

/// A source of environment variables
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Read a variable from the process environment, treating empty as unset
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Settings shared by the one-shot and interactive modes
#[derive(Debug, Clone)]
pub struct Settings {
    pub working_directory: PathBuf,
    pub data_dir: PathBuf,
    pub knowledge_dir: PathBuf,
    pub knowledge_base_id: Option<String>,
    pub extra_tools: Option<String>,
}

impl Settings {
    /// Resolve settings; an explicit knowledge base flag wins over the environment
    pub fn resolve(
        knowledge_base_flag: Option<String>,
        working_directory: impl Into<PathBuf>,
        lookup: EnvLookup<'_>,
    ) -> Result<Self> {
        let data_dir = data_dir(lookup);
        let knowledge_dir = lookup(KNOWLEDGE_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("knowledge"));

        let knowledge_base_id = knowledge_base_flag
            .filter(|id| !id.trim().is_empty())
            .or_else(|| lookup(KNOWLEDGE_BASE_ENV));

        if let Some(ref id) = knowledge_base_id {
            validate_knowledge_base_id(id)?;
        }

        Ok(Self {
            working_directory: working_directory.into(),
            data_dir,
            knowledge_dir,
            knowledge_base_id,
            extra_tools: lookup(EXTRA_TOOLS_ENV),
        })
    }
}

/// Resolve the data directory used for the welcome text, prompts and knowledge
pub fn data_dir(lookup: EnvLookup<'_>) -> PathBuf {
    if let Some(dir) = lookup(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(DATA_DIR_NAME))
        .unwrap_or_else(|| Path::new(".").join(DATA_DIR_NAME))
}

/// Knowledge base IDs become file names, so only a conservative charset is allowed
pub fn validate_knowledge_base_id(id: &str) -> Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AgentError::knowledge(
            Some(id),
            format!("Invalid knowledge base ID '{id}': use letters, digits, '-' or '_'"),
        ))
    }
}
