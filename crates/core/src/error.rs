//! Error types for the ForgeCore domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own enum. The `Display` text of [`ToolError`] is the exact
//! string handed back to the host, so tool handlers never format their
//! own failure messages.

use thiserror::Error;

/// The top-level error type for all ForgeCore operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Memory errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Faults raised while routing an instruction or assembling its script.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("decomposition depth {depth} exceeds the limit of {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("sub-agent {id} failed: {reason}")]
    SubAgentFailed { id: String, reason: String },

    #[error("{category} handler failed: {reason}")]
    Handler { category: String, reason: String },
}

/// Faults raised by tool handlers.
///
/// The display form is the user-visible result text.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Unknown tool command.")]
    UnknownCommand,

    #[error("Error: No {parameter} provided for {tool}.")]
    MissingParameter {
        tool: &'static str,
        parameter: &'static str,
    },

    #[error("Error: Code execution timed out.")]
    Timeout { timeout_ms: u64 },

    #[error("Error executing code: {0}")]
    Sandbox(String),

    #[error("Error {operation}: {reason}")]
    Io { operation: String, reason: String },

    #[error("Error: Permission denied for '{path}': {reason}")]
    PermissionDenied { path: String, reason: String },

    #[error("Error during web search: {0}")]
    Network(String),
}

impl ToolError {
    /// Shorthand for a filesystem fault.
    pub fn io(operation: &str, err: impl std::fmt::Display) -> Self {
        Self::Io {
            operation: operation.to_string(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt memory document: {0}")]
    Corrupt(String),
}
