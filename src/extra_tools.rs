//! Extra tool loading
//!
//! Extra tools are named `<module>.<tool>` in a `.tools` file in the working
//! directory and in the comma-separated `BUILDER_EXTRA_TOOLS` variable. Names
//! resolve against the optional tool catalog. Bad entries are logged and
//! skipped so a typo never keeps the agent from starting.

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::TOOLS_FILE;
use crate::error::{AgentError, Result};
use crate::tool::{optional_tool, Tool};

/// Module name the optional catalog is published under
pub const CATALOG_MODULE: &str = "tools";

/// Specs from a `.tools` file: one per line, `#` starts a comment line
pub fn parse_tools_file(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Specs from a comma-separated list
pub fn parse_env_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|spec| !spec.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve a `<module>.<tool>` spec against the catalog
pub fn resolve(spec: &str) -> Result<Box<dyn Tool>> {
    let (module, name) = spec
        .rsplit_once('.')
        .ok_or_else(|| AgentError::config(format!("Invalid tool spec '{spec}': expected <module>.<tool>")))?;

    if module.is_empty() || name.is_empty() {
        return Err(AgentError::config(format!(
            "Invalid tool spec '{spec}': expected <module>.<tool>"
        )));
    }
    if module != CATALOG_MODULE {
        return Err(AgentError::config(format!("Unknown tool module '{module}' in '{spec}'")));
    }

    optional_tool(name).ok_or_else(|| AgentError::UnknownTool {
        name: spec.to_string(),
    })
}

fn read_tools_file(working_dir: &Path) -> Vec<String> {
    let path = working_dir.join(TOOLS_FILE);
    if !path.exists() {
        return Vec::new();
    }

    match std::fs::read_to_string(&path) {
        Ok(text) => parse_tools_file(&text),
        Err(e) => {
            warn!("Failed to read {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Load extra tools from the working directory's `.tools` file, then from `env_value`
pub fn load_extra_tools(working_dir: &Path, env_value: Option<&str>) -> Vec<Box<dyn Tool>> {
    let mut specs = read_tools_file(working_dir);
    if let Some(value) = env_value {
        specs.extend(parse_env_list(value));
    }

    let mut seen = HashSet::new();
    let mut tools = Vec::new();

    for spec in specs {
        if !seen.insert(spec.clone()) {
            debug!(spec = %spec, "Skipping duplicate extra tool");
            continue;
        }
        match resolve(&spec) {
            Ok(tool) => {
                debug!(spec = %spec, "Loaded extra tool");
                tools.push(tool);
            }
            Err(e) => warn!("Failed to load tool {spec}: {e}"),
        }
    }

    tools
}
