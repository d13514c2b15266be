//! Memory trait: the append-only log of instructions and outcomes.
//!
//! The persisted shape is a single JSON document:
//!
//! ```json
//! {
//!   "prompts": [ { "timestamp": "...", "prompt": "..." } ],
//!   "results": [ { "timestamp": "...", "prompt": "...", "result": "..." } ],
//!   "history": [ { "timestamp": "...", "prompt": "...", "result": "..." } ]
//! }
//! ```
//!
//! Keys are created lazily on first append; a missing key reads as an
//! empty list. Fields this crate does not know about (older record
//! shapes, foreign keys) are carried through untouched.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MemoryError;

/// A logged instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    #[serde(default)]
    pub timestamp: String,

    #[serde(default)]
    pub prompt: String,

    /// Fields from other record shapes, preserved on rewrite.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A logged instruction together with the text returned for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default)]
    pub timestamp: String,

    #[serde(default)]
    pub prompt: String,

    #[serde(default)]
    pub result: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Whether a [`MemoryRecord`] logs an incoming instruction or its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Prompt,
    Result,
}

/// Uniform read-only view over prompt and result records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub timestamp: String,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    pub kind: RecordKind,
}

impl From<&PromptRecord> for MemoryRecord {
    fn from(r: &PromptRecord) -> Self {
        Self {
            timestamp: r.timestamp.clone(),
            instruction: r.prompt.clone(),
            result: None,
            kind: RecordKind::Prompt,
        }
    }
}

impl From<&ResultRecord> for MemoryRecord {
    fn from(r: &ResultRecord) -> Self {
        Self {
            timestamp: r.timestamp.clone(),
            instruction: r.prompt.clone(),
            result: Some(r.result.clone()),
            kind: RecordKind::Result,
        }
    }
}

/// The whole persisted memory structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Vec<PromptRecord>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ResultRecord>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<ResultRecord>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn tail<T: Clone>(items: &Option<Vec<T>>, limit: usize) -> Vec<T> {
    match items {
        Some(v) => v[v.len().saturating_sub(limit)..].to_vec(),
        None => Vec::new(),
    }
}

impl MemoryDocument {
    /// Parse a document, treating blank input as empty.
    pub fn from_json(text: &str) -> Result<Self, MemoryError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text).map_err(|e| MemoryError::Corrupt(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, MemoryError> {
        serde_json::to_string_pretty(self).map_err(|e| MemoryError::Storage(e.to_string()))
    }

    pub fn push_prompt(&mut self, prompt: &str) {
        self.prompts.get_or_insert_with(Vec::new).push(PromptRecord {
            timestamp: now(),
            prompt: prompt.to_string(),
            extra: Map::new(),
        });
    }

    /// Append to both `results` and `history`.
    pub fn push_result(&mut self, prompt: &str, result: &str) {
        let record = ResultRecord {
            timestamp: now(),
            prompt: prompt.to_string(),
            result: result.to_string(),
            extra: Map::new(),
        };
        self.history.get_or_insert_with(Vec::new).push(record.clone());
        self.results.get_or_insert_with(Vec::new).push(record);
    }

    /// Reset all three record lists to empty. Foreign keys survive.
    pub fn clear(&mut self) {
        self.prompts = Some(Vec::new());
        self.results = Some(Vec::new());
        self.history = Some(Vec::new());
    }

    pub fn recent_prompts(&self, limit: usize) -> Vec<PromptRecord> {
        tail(&self.prompts, limit)
    }

    pub fn recent_results(&self, limit: usize) -> Vec<ResultRecord> {
        tail(&self.results, limit)
    }

    pub fn recent_history(&self, limit: usize) -> Vec<ResultRecord> {
        tail(&self.history, limit)
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.as_ref().map_or(0, Vec::len)
    }

    pub fn result_count(&self) -> usize {
        self.results.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.prompt_count() == 0
            && self.result_count() == 0
            && self.history.as_ref().is_none_or(Vec::is_empty)
    }

    /// Prompts and results as one list, ordered by timestamp.
    pub fn records(&self) -> Vec<MemoryRecord> {
        let mut records: Vec<MemoryRecord> = self
            .prompts
            .iter()
            .flatten()
            .map(MemoryRecord::from)
            .chain(self.results.iter().flatten().map(MemoryRecord::from))
            .collect();
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        records
    }
}

/// The core MemoryStore trait.
///
/// Implementations: file-backed JSON document, in-memory (sub-agents and
/// tests). Every mutation is durable by the time the call returns, for
/// backends that persist at all.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The backend name (e.g., "file", "in_memory").
    fn name(&self) -> &str;

    /// Record an incoming instruction.
    async fn log_prompt(&self, prompt: &str) -> std::result::Result<(), MemoryError>;

    /// Record the text returned for an instruction.
    async fn log_result(&self, prompt: &str, result: &str) -> std::result::Result<(), MemoryError>;

    /// A copy of the current document.
    async fn snapshot(&self) -> MemoryDocument;

    /// Reset every record list to empty.
    async fn clear(&self) -> std::result::Result<(), MemoryError>;

    async fn recent_prompts(&self, limit: usize) -> Vec<PromptRecord> {
        self.snapshot().await.recent_prompts(limit)
    }

    async fn recent_results(&self, limit: usize) -> Vec<ResultRecord> {
        self.snapshot().await.recent_results(limit)
    }

    async fn history(&self, limit: usize) -> Vec<ResultRecord> {
        self.snapshot().await.recent_history(limit)
    }
}
