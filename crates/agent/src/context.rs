//! Shared collaborators handed to every agent in an invocation tree.

use forgecore_config::AppConfig;
use forgecore_core::SceneProbe;
use forgecore_tools::{KnowledgeBase, ToolExecutor};
use std::sync::Arc;

/// Read-mostly state shared by a root agent and all of its children.
#[derive(Clone)]
pub struct AgentContext {
    pub knowledge: Arc<KnowledgeBase>,
    pub tools: Arc<ToolExecutor>,
    /// Live scene access, when the host provides it.
    pub scene: Option<Arc<dyn SceneProbe>>,
    /// Deepest sub-agent level allowed to decompose further.
    pub max_depth: usize,
}

impl AgentContext {
    pub fn new(knowledge: KnowledgeBase, tools: ToolExecutor) -> Self {
        Self {
            knowledge: Arc::new(knowledge),
            tools: Arc::new(tools),
            scene: None,
            max_depth: 4,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let knowledge = KnowledgeBase::load(config.knowledge.path.as_deref());
        let tools = ToolExecutor::from_config(&config.tools);
        Self::new(knowledge, tools).with_max_depth(config.agent.max_depth)
    }

    pub fn with_scene_probe(mut self, probe: Arc<dyn SceneProbe>) -> Self {
        self.scene = Some(probe);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("knowledge_entries", &self.knowledge.len())
            .field("sandbox_timeout", &self.tools.sandbox_timeout())
            .field("scene_probe", &self.scene.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
