//! The ForgeCore agent: routing, script generation and orchestration.
//!
//! An [`Agent`] receives one free-text instruction at a time:
//!
//! 1. **Log** the instruction to its memory store
//! 2. **Route** it: split a compound instruction into fragments, or
//!    classify an atomic one into a [`Category`](forgecore_core::Category)
//! 3. **Dispatch**: fragments go to child agents (recursively, one after
//!    another); a classified instruction goes to its script generator,
//!    the knowledge base or the tool executor
//! 4. **Wrap** generated scripts in the safety harness
//! 5. **Log** the result and hand the text back
//!
//! Every fault is turned into text before it reaches the caller.

pub mod context;
pub mod generators;
pub mod orchestrator;
pub mod router;

pub use context::AgentContext;
pub use orchestrator::{Agent, ROOT_ID};
pub use router::{Route, Router};
