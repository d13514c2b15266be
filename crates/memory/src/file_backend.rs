//! File-based memory store: one pretty-printed JSON document.
//!
//! Storage location: `~/.forgecore/memory/memory_store.json` unless
//! configured otherwise.
//!
//! The document is loaded once on creation and rewritten in full after
//! every mutation. There is no locking: two processes pointed at the same
//! file will overwrite each other's appends.

use async_trait::async_trait;
use forgecore_core::error::MemoryError;
use forgecore_core::memory::{MemoryDocument, MemoryStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A file-backed memory store.
///
/// Reads are served from memory; writes are durable once the call returns.
/// A failed write leaves the in-memory document updated and is reported
/// to the caller, who decides whether to care.
pub struct FileStore {
    path: PathBuf,
    doc: Arc<RwLock<MemoryDocument>>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts empty (the file is created on first write).
    /// An unreadable or corrupt file also starts empty, with a warning.
    pub fn new(path: PathBuf) -> Self {
        let doc = Self::load_from_disk(&path);
        debug!(
            path = %path.display(),
            prompts = doc.prompt_count(),
            results = doc.result_count(),
            "File memory store loaded"
        );
        Self {
            path,
            doc: Arc::new(RwLock::new(doc)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document at `path`, falling back to an empty one.
    pub fn load_from_disk(path: &Path) -> MemoryDocument {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return MemoryDocument::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read memory document, starting empty");
                return MemoryDocument::default();
            }
        };

        match MemoryDocument::from_json(&content) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt memory document, starting empty");
                MemoryDocument::default()
            }
        }
    }

    /// Write the whole document to disk.
    async fn flush(&self) -> Result<(), MemoryError> {
        let content = self.doc.read().await.to_json()?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Failed to create memory directory: {e}"))
            })?;
        }

        std::fs::write(&self.path, content)
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl MemoryStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn log_prompt(&self, prompt: &str) -> Result<(), MemoryError> {
        self.doc.write().await.push_prompt(prompt);
        self.flush().await
    }

    async fn log_result(&self, prompt: &str, result: &str) -> Result<(), MemoryError> {
        self.doc.write().await.push_result(prompt, result);
        self.flush().await
    }

    async fn snapshot(&self) -> MemoryDocument {
        self.doc.read().await.clone()
    }

    async fn clear(&self) -> Result<(), MemoryError> {
        self.doc.write().await.clear();
        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_path() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory").join("memory_store.json");
        (dir, path)
    }

    #[tokio::test]
    async fn append_persists_and_reloads() {
        let (_dir, path) = temp_path();

        let store = FileStore::new(path.clone());
        store.log_prompt("make a cube").await.unwrap();
        store.log_result("make a cube", "bpy.ops.mesh.primitive_cube_add()").await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("make a cube"));

        let reloaded = FileStore::new(path);
        assert_eq!(reloaded.snapshot().await, store.snapshot().await);
        assert_eq!(reloaded.recent_prompts(5).await.len(), 1);
        assert_eq!(reloaded.history(5).await[0].prompt, "make a cube");
    }

    #[tokio::test]
    async fn clear_persists() {
        let (_dir, path) = temp_path();

        let store = FileStore::new(path.clone());
        store.log_prompt("one").await.unwrap();
        store.log_result("one", "done").await.unwrap();
        store.clear().await.unwrap();

        let doc = FileStore::load_from_disk(&path);
        assert!(doc.is_empty());
        assert_eq!(doc.prompts, Some(vec![]));
        assert_eq!(doc.results, Some(vec![]));
        assert_eq!(doc.history, Some(vec![]));
    }

    #[tokio::test]
    async fn handles_missing_file_gracefully() {
        let (_dir, path) = temp_path();
        let store = FileStore::new(path.clone());
        assert!(store.snapshot().await.is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn corrupt_file_starts_empty() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "{{ this is not json").unwrap();

        let store = FileStore::new(tmp.path().to_path_buf());
        assert!(store.snapshot().await.is_empty());

        // The next append replaces the corrupt content with a valid document.
        store.log_prompt("recover").await.unwrap();
        let doc = FileStore::load_from_disk(tmp.path());
        assert_eq!(doc.prompt_count(), 1);
    }

    #[tokio::test]
    async fn foreign_keys_survive_append() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"{{"prompts": [{{"timestamp": "2024-05-01T09:00:00", "type": "prompt", "content": "legacy"}}], "journal": []}}"#
        )
        .unwrap();

        let store = FileStore::new(tmp.path().to_path_buf());
        store.log_prompt("new").await.unwrap();

        let content = std::fs::read_to_string(tmp.path()).unwrap();
        assert!(content.contains("\"journal\""));
        assert!(content.contains("legacy"));
        assert_eq!(FileStore::load_from_disk(tmp.path()).prompt_count(), 2);
    }

    #[tokio::test]
    async fn write_failure_is_reported_but_memory_kept() {
        let blocker = NamedTempFile::new().unwrap();
        // A regular file cannot be used as a directory.
        let path = blocker.path().join("nested").join("memory.json");

        let store = FileStore::new(path);
        let result = store.log_prompt("still remembered").await;
        assert!(result.is_err());
        assert_eq!(store.recent_prompts(1).await[0].prompt, "still remembered");
    }
}
