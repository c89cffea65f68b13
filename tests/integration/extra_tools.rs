//! Extra tool loading from `.tools` and the environment

use agent_builder::config::TOOLS_FILE;
use agent_builder::extra_tools::load_extra_tools;
use agent_builder::tool::ToolRegistry;
use tempfile::TempDir;

fn ids(dir: &TempDir, env: Option<&str>) -> Vec<&'static str> {
    load_extra_tools(dir.path(), env)
        .iter()
        .map(|tool| tool.id())
        .collect()
}

#[test]
fn test_load_from_tools_file() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join(TOOLS_FILE),
        "# Comment line\ntools.list_directory\n\ntools.current_time\n",
    )
    .unwrap();

    assert_eq!(ids(&temp, None), vec!["list_directory", "current_time"]);
}

#[test]
fn test_load_from_environment() {
    let temp = TempDir::new().unwrap();
    assert_eq!(
        ids(&temp, Some("tools.list_directory,tools.current_time")),
        vec!["list_directory", "current_time"]
    );
}

#[test]
fn test_load_from_both_sources() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(TOOLS_FILE), "tools.find_files\n").unwrap();

    // File entries come first
    assert_eq!(
        ids(&temp, Some("tools.search_files")),
        vec!["find_files", "search_files"]
    );
}

#[test]
fn test_invalid_entries_are_skipped() {
    let temp = TempDir::new().unwrap();
    assert!(ids(&temp, Some("invalid.tool.name")).is_empty());

    std::fs::write(
        temp.path().join(TOOLS_FILE),
        "no_dot\ntools.\ntools.teleport\nother.current_time\ntools.current_time\n",
    )
    .unwrap();
    assert_eq!(ids(&temp, Some(",,  ,")), vec!["current_time"]);
}

#[test]
fn test_registry_gains_extra_tools() {
    let temp = TempDir::new().unwrap();
    let mut registry = ToolRegistry::with_defaults();
    let defaults = registry.len();

    registry.extend(load_extra_tools(
        temp.path(),
        Some("tools.current_time,tools.search_files"),
    ));

    assert_eq!(registry.len(), defaults + 2);
    assert!(registry.specs().iter().any(|spec| spec.name == "search_files"));
}
