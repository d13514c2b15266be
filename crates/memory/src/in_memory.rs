//! In-memory store: the isolated scope of sub-agents, and tests.

use async_trait::async_trait;
use forgecore_core::error::MemoryError;
use forgecore_core::memory::{MemoryDocument, MemoryStore};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that never touches disk.
pub struct InMemoryStore {
    doc: Arc<RwLock<MemoryDocument>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            doc: Arc::new(RwLock::new(MemoryDocument::default())),
        }
    }

    /// Start from an existing document.
    pub fn with_document(doc: MemoryDocument) -> Self {
        Self {
            doc: Arc::new(RwLock::new(doc)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn log_prompt(&self, prompt: &str) -> Result<(), MemoryError> {
        self.doc.write().await.push_prompt(prompt);
        Ok(())
    }

    async fn log_result(&self, prompt: &str, result: &str) -> Result<(), MemoryError> {
        self.doc.write().await.push_result(prompt, result);
        Ok(())
    }

    async fn snapshot(&self) -> MemoryDocument {
        self.doc.read().await.clone()
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.doc.write().await.clear();
        Ok(())
    }
}
