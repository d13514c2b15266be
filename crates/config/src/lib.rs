//! Configuration loading, validation, and management for ForgeCore.
//!
//! Loads configuration from `~/.forgecore/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The root configuration structure.
///
/// Maps directly to `~/.forgecore/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Persisted instruction/result log
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Question/answer table
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Tool surface: sandbox, file operations, web search
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Orchestration limits
    #[serde(default)]
    pub agent: AgentSettings,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// "file" or "in_memory"
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    /// Document location. Defaults to `~/.forgecore/memory/memory_store.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_memory_backend() -> String {
    "file".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            path: None,
        }
    }
}

impl MemoryConfig {
    /// The configured path, or the default one.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| {
            AppConfig::config_dir()
                .join("memory")
                .join("memory_store.json")
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// A `{ "faqs": [...] }` document. The built-in table is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Wall-clock deadline for sandboxed code, in milliseconds.
    #[serde(default = "default_sandbox_timeout_ms")]
    pub sandbox_timeout_ms: u64,

    /// Deadline for one outbound web lookup, in seconds.
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Directory used when a batch delete names none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// File operations refuse any path under these prefixes.
    #[serde(default = "default_forbidden_paths")]
    pub forbidden_paths: Vec<String>,

    #[serde(default = "default_true")]
    pub allow_web_search: bool,

    #[serde(default = "default_duckduckgo_url")]
    pub duckduckgo_url: String,

    #[serde(default = "default_google_url")]
    pub google_url: String,

    /// Google Custom Search credentials; Google lookups fail without them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_cx: Option<String>,
}

fn default_sandbox_timeout_ms() -> u64 {
    3_000
}
fn default_search_timeout_secs() -> u64 {
    10
}
fn default_forbidden_paths() -> Vec<String> {
    vec![
        "/etc".into(),
        "/proc".into(),
        "/sys".into(),
        "/boot".into(),
        "~/.ssh".into(),
        "~/.gnupg".into(),
        "~/.aws".into(),
    ]
}
fn default_duckduckgo_url() -> String {
    "https://api.duckduckgo.com/".into()
}
fn default_google_url() -> String {
    "https://www.googleapis.com/customsearch/v1".into()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            sandbox_timeout_ms: default_sandbox_timeout_ms(),
            search_timeout_secs: default_search_timeout_secs(),
            working_dir: None,
            forbidden_paths: default_forbidden_paths(),
            allow_web_search: true,
            duckduckgo_url: default_duckduckgo_url(),
            google_url: default_google_url(),
            google_api_key: None,
            google_cx: None,
        }
    }
}

impl ToolsConfig {
    pub fn sandbox_timeout(&self) -> Duration {
        Duration::from_millis(self.sandbox_timeout_ms)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ToolsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("sandbox_timeout_ms", &self.sandbox_timeout_ms)
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("working_dir", &self.working_dir)
            .field("forbidden_paths", &self.forbidden_paths)
            .field("allow_web_search", &self.allow_web_search)
            .field("duckduckgo_url", &self.duckduckgo_url)
            .field("google_url", &self.google_url)
            .field("google_api_key", &redact(&self.google_api_key))
            .field("google_cx", &self.google_cx)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// How many levels of sub-agents a compound instruction may spawn.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_depth() -> usize {
    4
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.forgecore/config.toml).
    ///
    /// Environment variables override the file:
    /// - `FORGECORE_MEMORY_PATH`
    /// - `FORGECORE_KNOWLEDGE_PATH`
    /// - `FORGECORE_SANDBOX_TIMEOUT_MS`
    /// - `FORGECORE_GOOGLE_API_KEY`, `FORGECORE_GOOGLE_CX`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(path) = var("FORGECORE_MEMORY_PATH") {
            self.memory.path = Some(PathBuf::from(path));
        }
        if let Some(path) = var("FORGECORE_KNOWLEDGE_PATH") {
            self.knowledge.path = Some(PathBuf::from(path));
        }
        if let Some(ms) = var("FORGECORE_SANDBOX_TIMEOUT_MS") {
            self.tools.sandbox_timeout_ms = ms.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "FORGECORE_SANDBOX_TIMEOUT_MS must be an integer, got '{ms}'"
                ))
            })?;
        }
        if self.tools.google_api_key.is_none() {
            self.tools.google_api_key = var("FORGECORE_GOOGLE_API_KEY");
        }
        if self.tools.google_cx.is_none() {
            self.tools.google_cx = var("FORGECORE_GOOGLE_CX");
        }
        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".forgecore")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.tools.sandbox_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tools.sandbox_timeout_ms must be > 0".into(),
            ));
        }

        if self.agent.max_depth == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_depth must be at least 1".into(),
            ));
        }

        if !matches!(self.memory.backend.as_str(), "file" | "in_memory") {
            return Err(ConfigError::ValidationError(format!(
                "unknown memory backend '{}' (expected \"file\" or \"in_memory\")",
                self.memory.backend
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
