//! Tools for ForgeCore.
//!
//! - [`KnowledgeBase`]: static question/answer lookup
//! - [`ToolExecutor`]: the free-text tool surface, dispatching to the
//!   sandboxed interpreter, file operations and web search

pub mod executor;
pub mod file_ops;
pub mod knowledge;
pub mod sandbox;
pub mod web_search;

pub use executor::ToolExecutor;
pub use file_ops::FileOps;
pub use knowledge::{KnowledgeBase, KnowledgeEntry, UNKNOWN_ANSWER};
pub use sandbox::Sandbox;
pub use web_search::{HttpSearchBackend, SearchBackend, WebSearch};
