//! Knowledge base storage and retrieval through the store and the tools

use agent_builder::knowledge::{KnowledgeStore, DEFAULT_MIN_SCORE, DEFAULT_RESULT_LIMIT};
use agent_builder::tool::{Tool, ToolContext, ToolRegistry};
use serde_json::json;
use tempfile::TempDir;

#[tokio::test]
async fn test_documents_persist_across_stores() {
    let temp = TempDir::new().unwrap();

    KnowledgeStore::new(temp.path())
        .store("team", "Deploys", "Production deploys happen on Tuesday mornings")
        .await
        .unwrap();

    let hits = KnowledgeStore::new(temp.path())
        .retrieve("team", "when are production deploys", DEFAULT_RESULT_LIMIT, 0.2)
        .await
        .unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document.title, "Deploys");
}

#[tokio::test]
async fn test_store_then_retrieve_with_tools() {
    let temp = TempDir::new().unwrap();
    let ctx = ToolContext::new("ses_test", temp.path(), temp.path());
    let registry = ToolRegistry::with_defaults();

    let store = registry.get("store_in_kb").unwrap();
    store
        .execute(
            json!({
                "content": "The staging database is rebuilt every night",
                "knowledge_base_id": "ops"
            }),
            &ctx,
        )
        .await
        .unwrap();

    let retrieve = registry.get("retrieve").unwrap();
    let result = retrieve
        .execute(
            json!({ "text": "staging database", "knowledge_base_id": "ops" }),
            &ctx,
        )
        .await
        .unwrap();

    assert!(result.output.contains("The staging database is rebuilt every night"));
}

#[tokio::test]
async fn test_conversations_are_searchable() {
    let temp = TempDir::new().unwrap();
    let store = KnowledgeStore::new(temp.path());

    store
        .store_conversation("chat", "How do I rotate keys?", "Run the rotate-keys job.")
        .await
        .unwrap();

    let hits = store
        .retrieve("chat", "rotate keys", DEFAULT_RESULT_LIMIT, DEFAULT_MIN_SCORE)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert!(hits[0].document.title.starts_with("Conversation "));
    assert_eq!(hits[0].score, 1.0);
}

#[tokio::test]
async fn test_unsafe_ids_are_rejected() {
    let temp = TempDir::new().unwrap();
    let store = KnowledgeStore::new(temp.path());

    assert!(store.store("../outside", "t", "content").await.is_err());
    assert!(store.retrieve("a/b", "x", 10, 0.0).await.is_err());
}
