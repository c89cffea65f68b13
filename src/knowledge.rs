//! Local knowledge-base store
//!
//! Each knowledge base is a JSON-lines file of documents under the knowledge
//! directory. Retrieval scores documents by query-term coverage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use ulid::Ulid;

use crate::config::validate_knowledge_base_id;
use crate::error::{AgentError, Result};

/// Default number of documents returned by a retrieval
pub const DEFAULT_RESULT_LIMIT: usize = 10;

/// Default minimum score for a document to be returned
pub const DEFAULT_MIN_SCORE: f64 = 0.4;

/// A stored document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A retrieval hit
#[derive(Debug, Clone, Serialize)]
pub struct ScoredDocument {
    pub score: f64,
    #[serde(flatten)]
    pub document: Document,
}

/// File-backed knowledge store rooted at a directory
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    root: PathBuf,
}

impl KnowledgeStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, kb_id: &str) -> Result<PathBuf> {
        validate_knowledge_base_id(kb_id)?;
        Ok(self.root.join(format!("{kb_id}.jsonl")))
    }

    /// Append a document to a knowledge base, creating it if needed
    pub async fn store(&self, kb_id: &str, title: &str, content: &str) -> Result<Document> {
        if content.trim().is_empty() {
            return Err(AgentError::knowledge(Some(kb_id), "Refusing to store empty content"));
        }

        let path = self.path_for(kb_id)?;
        fs::create_dir_all(&self.root).await?;

        let document = Document {
            id: Ulid::new().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };

        let mut line = serde_json::to_string(&document)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(kb = kb_id, id = %document.id, "Stored document");
        Ok(document)
    }

    /// Load every document of a knowledge base; a missing base is empty
    pub async fn documents(&self, kb_id: &str) -> Result<Vec<Document>> {
        let path = self.path_for(kb_id)?;
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut documents = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Document>(line) {
                Ok(doc) => documents.push(doc),
                Err(e) => tracing::warn!(
                    kb = kb_id,
                    line = index + 1,
                    "Skipping malformed knowledge base entry: {e}"
                ),
            }
        }
        Ok(documents)
    }

    /// Return the best matching documents for `text`, best first
    pub async fn retrieve(
        &self,
        kb_id: &str,
        text: &str,
        limit: usize,
        min_score: f64,
    ) -> Result<Vec<ScoredDocument>> {
        let query_terms = terms(text);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<ScoredDocument> = self
            .documents(kb_id)
            .await?
            .into_iter()
            .filter_map(|document| {
                let haystack = terms(&format!("{} {}", document.title, document.content));
                let matched = query_terms.iter().filter(|t| haystack.contains(*t)).count();
                let score = matched as f64 / query_terms.len() as f64;
                (matched > 0 && score >= min_score).then_some(ScoredDocument { score, document })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.document.created_at.cmp(&a.document.created_at))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    /// Store one exchange of a conversation
    pub async fn store_conversation(
        &self,
        kb_id: &str,
        query: &str,
        response: &str,
    ) -> Result<Document> {
        let title = format!("Conversation {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
        let content = format!("User: {query}\n\nAssistant: {response}");
        self.store(kb_id, &title, &content).await
    }
}

/// Distinct lowercase alphanumeric words
fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}
