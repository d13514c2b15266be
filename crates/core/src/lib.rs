//! # ForgeCore Core
//!
//! Domain types, traits, and error definitions for the ForgeCore
//! instruction engine. This crate has **no runtime dependencies** beyond
//! serialization and error plumbing; it defines the model that the
//! memory, tools, and agent crates implement against.
//!
//! ## Design Philosophy
//!
//! Every seam is defined here. Implementations live in their respective
//! crates:
//! - [`MemoryStore`] is implemented by `forgecore-memory`
//! - [`ToolCommand`] is executed by `forgecore-tools`
//! - [`Category`] is routed and generated by `forgecore-agent`
//! - [`SceneProbe`] is implemented by the host application

pub mod agent;
pub mod category;
pub mod error;
pub mod harness;
pub mod memory;
pub mod scene;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use agent::{AgentReply, InvocationPhase, SubAgentResult};
pub use category::Category;
pub use error::{Error, GenerationError, MemoryError, Result, ToolError};
pub use memory::{MemoryDocument, MemoryRecord, MemoryStore, PromptRecord, RecordKind, ResultRecord};
pub use scene::{SceneProbe, SceneSummary};
pub use tool::{SearchEngine, ToolCommand};
