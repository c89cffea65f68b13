//! Command-line behavior of the agent-builder binary

mod support;

use predicates::prelude::*;
use support::{agent_builder, fake_model, local_model_args};
use tempfile::TempDir;

#[test]
fn test_help_lists_flags() {
    let temp = TempDir::new().unwrap();
    agent_builder(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--kb"))
        .stdout(predicate::str::contains("--model-provider"))
        .stdout(predicate::str::contains("--model-config"))
        .stdout(predicate::str::contains("--debug"));
}

#[test]
fn test_unknown_provider_fails() {
    let temp = TempDir::new().unwrap();
    agent_builder(temp.path())
        .args(["--model-provider", "bogus", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown model provider: bogus"));
}

#[test]
fn test_invalid_model_config_fails() {
    let temp = TempDir::new().unwrap();
    agent_builder(temp.path())
        .args(["--model-config", "[1, 2]", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Model config must be a JSON object"));
}

#[test]
fn test_invalid_knowledge_base_id_fails() {
    let temp = TempDir::new().unwrap();
    agent_builder(temp.path())
        .args(["--kb", "../escape", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid knowledge base ID"));
}

#[test]
fn test_missing_api_key_fails_on_first_request() {
    let temp = TempDir::new().unwrap();
    agent_builder(temp.path())
        .arg("hello")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn test_one_shot_query() {
    let temp = TempDir::new().unwrap();
    let url = fake_model(&["The answer is 42."]);

    agent_builder(temp.path())
        .args(local_model_args(&url))
        .args(["what", "is", "the", "answer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The answer is 42."));
}

#[test]
fn test_one_shot_stores_conversation() {
    let temp = TempDir::new().unwrap();
    let url = fake_model(&["Ship on Friday."]);

    agent_builder(temp.path())
        .args(local_model_args(&url))
        .args(["--kb", "notes", "when", "do", "we", "ship"])
        .assert()
        .success();

    let stored =
        std::fs::read_to_string(temp.path().join("data").join("knowledge").join("notes.jsonl"))
            .unwrap();
    assert!(stored.contains("User: when do we ship\\n\\nAssistant: Ship on Friday."));
}

#[test]
fn test_knowledge_base_from_environment() {
    let temp = TempDir::new().unwrap();
    let url = fake_model(&["ok"]);
    let kb_dir = temp.path().join("kb");

    agent_builder(temp.path())
        .env("BUILDER_KNOWLEDGE_BASE_ID", "env-kb")
        .env("BUILDER_KNOWLEDGE_DIR", &kb_dir)
        .args(local_model_args(&url))
        .arg("hello")
        .assert()
        .success();

    assert!(kb_dir.join("env-kb.jsonl").exists());
}
