//! Tool executor: parses a free-text command and dispatches it.
//!
//! [`ToolExecutor::run`] is the text boundary: every fault comes back as
//! its error string. [`ToolExecutor::execute`] keeps the typed result for
//! callers that want it.

use forgecore_config::ToolsConfig;
use forgecore_core::error::ToolError;
use forgecore_core::tool::ToolCommand;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::file_ops::FileOps;
use crate::sandbox::Sandbox;
use crate::web_search::{HttpSearchBackend, SearchBackend, WebSearch};

pub struct ToolExecutor {
    sandbox: Sandbox,
    files: FileOps,
    search: WebSearch,
}

impl ToolExecutor {
    pub fn new(sandbox: Sandbox, files: FileOps, search: WebSearch) -> Self {
        Self {
            sandbox,
            files,
            search,
        }
    }

    /// Build with the HTTP search backend.
    pub fn from_config(config: &ToolsConfig) -> Self {
        let backend = Arc::new(HttpSearchBackend::from_config(config));
        Self::with_search_backend(config, backend)
    }

    /// Build with a caller-supplied search transport.
    pub fn with_search_backend(config: &ToolsConfig, backend: Arc<dyn SearchBackend>) -> Self {
        let working_dir = config
            .working_dir
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| ".".into());

        Self::new(
            Sandbox::new(config.sandbox_timeout()),
            FileOps::new(working_dir, config.forbidden_paths.clone()),
            WebSearch::new(backend, config.allow_web_search),
        )
    }

    pub fn sandbox_timeout(&self) -> Duration {
        self.sandbox.timeout()
    }

    /// Parse and execute `text`, rendering any fault as its error string.
    pub async fn run(&self, text: &str) -> String {
        let command = match ToolCommand::parse(text) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Tool command rejected");
                return e.to_string();
            }
        };

        match self.execute(&command).await {
            Ok(out) => out,
            Err(e) => e.to_string(),
        }
    }

    /// Execute a parsed command.
    pub async fn execute(&self, command: &ToolCommand) -> Result<String, ToolError> {
        let start = Instant::now();

        let result = match command {
            ToolCommand::ExecuteCode { code } => self.sandbox.run(code).await,
            ToolCommand::BatchDelete {
                extension,
                directory,
            } => {
                self.files
                    .batch_delete(extension, directory.as_deref())
                    .await
            }
            ToolCommand::WebSearch { engine, query } => self.search.search(*engine, query).await,
            ToolCommand::ListFiles { path } => self.files.list_files(path).await,
            ToolCommand::DeleteFile { path } => self.files.delete_file(path).await,
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => info!(tool = command.name(), duration_ms, success = true, "Tool executed"),
            Err(e) => warn!(tool = command.name(), duration_ms, error = %e, "Tool failed"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web_search::tests::MockBackend;
    use forgecore_core::tool::SearchEngine;
    use serde_json::json;

    fn executor_in(dir: &std::path::Path) -> (ToolExecutor, Arc<MockBackend>) {
        let config = ToolsConfig {
            working_dir: Some(dir.to_path_buf()),
            sandbox_timeout_ms: 200,
            ..ToolsConfig::default()
        };
        let backend = MockBackend::new(Ok(json!({"AbstractText": "Blender is free."})));
        (ToolExecutor::with_search_backend(&config, backend.clone()), backend)
    }

    #[tokio::test]
    async fn runs_code() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, _) = executor_in(dir.path());
        assert!(exec.run("run python: result = 2 ** 3").await.starts_with("Error executing code"));
        assert_eq!(exec.run("execute code: result = 2 * 21").await, "42");
        assert_eq!(exec.run("run python: x = 1").await, "Code executed successfully.");
    }

    #[tokio::test]
    async fn code_timeout_text_is_fixed() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, _) = executor_in(dir.path());
        let out = exec.run("run python: while True { x = 1 }").await;
        assert_eq!(out, "Error: Code execution timed out.");
    }

    #[tokio::test]
    async fn missing_parameters_yield_text() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, _) = executor_in(dir.path());
        assert_eq!(
            exec.run("run python").await,
            "Error: No code provided for code execution."
        );
        assert_eq!(exec.run("delete file:").await, "Error: No file path provided for delete file.");
        assert_eq!(exec.run("dance").await, "Unknown tool command.");
    }

    #[tokio::test]
    async fn file_commands() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("keep.txt"), b"x").unwrap();
        let (exec, _) = executor_in(dir.path());

        assert_eq!(exec.run("list files: .").await, "a.png\nb.png\nkeep.txt");

        let label = dir.path().display().to_string();
        let out = exec.run(&format!("delete all png files in {label}")).await;
        assert_eq!(out, format!("Deleted 2 .png files from {label}"));

        assert_eq!(exec.run("delete file: keep.txt").await, "Deleted file: keep.txt");
        assert_eq!(exec.run("list files").await, "No files found in .");
    }

    #[tokio::test]
    async fn web_search_uses_engine_hint() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, backend) = executor_in(dir.path());

        assert_eq!(exec.run("web search: blender").await, "Blender is free.");
        exec.run("web search google: blender").await;

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].0, SearchEngine::DuckDuckGo);
        assert_eq!(seen[1].0, SearchEngine::Google);
    }

    #[tokio::test]
    async fn execute_keeps_typed_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (exec, _) = executor_in(dir.path());
        let err = exec
            .execute(&ToolCommand::DeleteFile {
                path: "missing.txt".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Io { .. }));
    }
}
