//! The orchestrating agent.
//!
//! One `handle` call walks `Routing → {Decomposed, Classified} →
//! Generating → Wrapping → Logged → Done`, or stops in `Errored`.
//!
//! A compound instruction spawns one child agent per fragment. Children
//! run one after another in declared order, each with its own id, its own
//! in-memory store and the shared [`AgentContext`]. A fault inside one
//! child becomes that child's diagnostic text; its siblings still run.
//! Nothing escapes `handle`: every fault ends up as text.

use forgecore_config::AppConfig;
use forgecore_core::error::MemoryError;
use forgecore_core::harness;
use forgecore_core::{
    AgentReply, Category, GenerationError, InvocationPhase, MemoryStore, SubAgentResult,
};
use forgecore_memory::{FileStore, InMemoryStore};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::AgentContext;
use crate::generators;
use crate::router::{Route, Router};

/// Id of an agent created by the host rather than by another agent.
pub const ROOT_ID: &str = "root";

pub struct Agent {
    id: String,
    ctx: Arc<AgentContext>,
    router: Router,
    store: Arc<dyn MemoryStore>,
    depth: usize,
    last_sub_results: Vec<SubAgentResult>,
}

impl Agent {
    pub fn new(ctx: Arc<AgentContext>, store: Arc<dyn MemoryStore>) -> Self {
        Self {
            id: ROOT_ID.to_string(),
            ctx,
            router: Router::new(),
            store,
            depth: 0,
            last_sub_results: Vec::new(),
        }
    }

    /// Build the context and pick the store backend named in `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        let ctx = Arc::new(AgentContext::from_config(config));
        let store: Arc<dyn MemoryStore> = match config.memory.backend.as_str() {
            "in_memory" => Arc::new(InMemoryStore::new()),
            _ => Arc::new(FileStore::new(config.memory.resolved_path())),
        };
        debug!(backend = store.name(), "Agent store ready");
        Self::new(ctx, store)
    }

    fn child(&self) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ctx: Arc::clone(&self.ctx),
            router: Router::new(),
            store: Arc::new(InMemoryStore::new()),
            depth: self.depth + 1,
            last_sub_results: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn context(&self) -> &Arc<AgentContext> {
        &self.ctx
    }

    pub fn store(&self) -> &Arc<dyn MemoryStore> {
        &self.store
    }

    /// Children spawned by the most recent `handle`; empty if it did not
    /// decompose.
    pub fn last_sub_results(&self) -> &[SubAgentResult] {
        &self.last_sub_results
    }

    pub async fn clear_history(&self) -> Result<(), MemoryError> {
        self.store.clear().await
    }

    /// Handle one instruction and return the text for the host.
    pub async fn handle(&mut self, instruction: &str) -> String {
        self.handle_detailed(instruction).await.text
    }

    /// Like [`handle`](Self::handle), keeping category, sub-agent results
    /// and the final phase.
    pub async fn handle_detailed(&mut self, instruction: &str) -> AgentReply {
        self.dispatch(instruction).await
    }

    // Boxed so children can recurse through the same entry point.
    fn dispatch<'a>(&'a mut self, instruction: &'a str) -> BoxFuture<'a, AgentReply> {
        self.process(instruction).boxed()
    }

    async fn process(&mut self, instruction: &str) -> AgentReply {
        if let Err(e) = self.store.log_prompt(instruction).await {
            warn!(agent = %self.id, error = %e, "Failed to log prompt");
        }
        self.last_sub_results.clear();

        let outcome = AssertUnwindSafe(self.respond(instruction))
            .catch_unwind()
            .await;
        let mut reply = match outcome {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!(agent = %self.id, error = %e, "Instruction failed");
                errored(&e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(agent = %self.id, error = %message, "Instruction panicked");
                errored(&message)
            }
        };

        if let Err(e) = self.store.log_result(instruction, &reply.text).await {
            warn!(agent = %self.id, error = %e, "Failed to log result");
        }
        if reply.phase != InvocationPhase::Errored {
            advance(&mut reply.phase, InvocationPhase::Logged);
            advance(&mut reply.phase, InvocationPhase::Done);
        }

        info!(
            agent = %self.id,
            depth = self.depth,
            category = ?reply.category,
            phase = ?reply.phase,
            "Instruction handled"
        );
        reply
    }

    async fn respond(&mut self, instruction: &str) -> Result<AgentReply, GenerationError> {
        let mut phase = InvocationPhase::Routing;

        let route = if self.depth >= self.ctx.max_depth {
            let reason = GenerationError::DepthExceeded {
                depth: self.depth + 1,
                max: self.ctx.max_depth,
            };
            debug!(agent = %self.id, %reason, "Classifying without decomposition");
            Route::Classified(self.router.classify(instruction))
        } else {
            self.router.classify_or_decompose(instruction)
        };

        match route {
            Route::Decomposed(fragments) => {
                advance(&mut phase, InvocationPhase::Decomposed);
                Ok(self.run_children(fragments, phase).await)
            }
            Route::Classified(category) => {
                advance(&mut phase, InvocationPhase::Classified);
                self.run_leaf(category, instruction, phase).await
            }
        }
    }

    async fn run_children(&mut self, fragments: Vec<String>, phase: InvocationPhase) -> AgentReply {
        info!(agent = %self.id, count = fragments.len(), "Spawning sub-agents");

        let mut texts = Vec::with_capacity(fragments.len());
        let mut sub_results = Vec::with_capacity(fragments.len());
        let mut is_script = true;

        for fragment in fragments {
            let mut child = self.child();
            let outcome = AssertUnwindSafe(child.dispatch(&fragment))
                .catch_unwind()
                .await;

            let (text, child_is_script) = match outcome {
                Ok(reply) => (reply.text, reply.is_script),
                Err(payload) => {
                    let err = GenerationError::SubAgentFailed {
                        id: child.id.clone(),
                        reason: panic_message(payload.as_ref()),
                    };
                    warn!(agent = %self.id, error = %err, "Sub-agent failed");
                    (harness::diagnostic(&err.to_string()), true)
                }
            };

            is_script &= child_is_script;
            texts.push(text.clone());
            sub_results.push(SubAgentResult {
                id: child.id,
                instruction: fragment,
                result: text,
            });
        }

        self.last_sub_results = sub_results.clone();
        AgentReply {
            text: texts.join("\n\n"),
            category: None,
            sub_results,
            is_script,
            phase,
        }
    }

    async fn run_leaf(
        &self,
        category: Category,
        instruction: &str,
        mut phase: InvocationPhase,
    ) -> Result<AgentReply, GenerationError> {
        advance(&mut phase, InvocationPhase::Generating);

        match category {
            Category::Knowledge => {
                let answer = self.ctx.knowledge.answer(instruction);
                return Ok(plain(answer, category, phase));
            }
            Category::Tool => {
                let output = self.ctx.tools.run(instruction).await;
                return Ok(plain(output, category, phase));
            }
            Category::SceneAnalysis => {
                if let Some(probe) = &self.ctx.scene {
                    match probe.summarize() {
                        Ok(summary) => return Ok(plain(summary.to_string(), category, phase)),
                        Err(reason) => {
                            warn!(agent = %self.id, %reason, "Scene probe failed, generating script")
                        }
                    }
                }
            }
            _ => {}
        }

        let script = generators::generate(category, instruction).ok_or_else(|| {
            GenerationError::Handler {
                category: category.to_string(),
                reason: "no script generator".into(),
            }
        })?;

        advance(&mut phase, InvocationPhase::Wrapping);
        Ok(AgentReply {
            text: harness::wrap(&script),
            category: Some(category),
            sub_results: Vec::new(),
            is_script: true,
            phase,
        })
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("depth", &self.depth)
            .field("store", &self.store.name())
            .finish()
    }
}

fn advance(phase: &mut InvocationPhase, next: InvocationPhase) {
    debug_assert!(
        phase.can_advance_to(next),
        "illegal phase transition {phase:?} -> {next:?}"
    );
    *phase = next;
}

fn plain(text: String, category: Category, phase: InvocationPhase) -> AgentReply {
    AgentReply {
        text,
        category: Some(category),
        sub_results: Vec::new(),
        is_script: false,
        phase,
    }
}

fn errored(message: &str) -> AgentReply {
    AgentReply {
        text: harness::diagnostic(message),
        category: None,
        sub_results: Vec::new(),
        is_script: true,
        phase: InvocationPhase::Errored,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forgecore_config::ToolsConfig;
    use forgecore_core::error::ToolError;
    use forgecore_core::memory::MemoryDocument;
    use forgecore_core::tool::SearchEngine;
    use forgecore_core::{SceneProbe, SceneSummary};
    use forgecore_tools::{KnowledgeBase, SearchBackend, ToolExecutor};
    use serde_json::{Value, json};
    use std::path::Path;

    struct StubSearch;

    #[async_trait]
    impl SearchBackend for StubSearch {
        async fn fetch(&self, _engine: SearchEngine, _query: &str) -> Result<Value, ToolError> {
            Ok(json!({"AbstractText": "Blender is a 3D suite."}))
        }
    }

    struct FixedScene(Result<SceneSummary, String>);

    impl SceneProbe for FixedScene {
        fn summarize(&self) -> Result<SceneSummary, String> {
            self.0.clone()
        }
    }

    struct PanickingScene;

    impl SceneProbe for PanickingScene {
        fn summarize(&self) -> Result<SceneSummary, String> {
            panic!("scene graph unavailable")
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl MemoryStore for BrokenStore {
        fn name(&self) -> &str {
            "broken"
        }
        async fn log_prompt(&self, _prompt: &str) -> Result<(), MemoryError> {
            Err(MemoryError::Storage("disk full".into()))
        }
        async fn log_result(&self, _prompt: &str, _result: &str) -> Result<(), MemoryError> {
            Err(MemoryError::Storage("disk full".into()))
        }
        async fn snapshot(&self) -> MemoryDocument {
            MemoryDocument::default()
        }
        async fn clear(&self) -> Result<(), MemoryError> {
            Err(MemoryError::Storage("disk full".into()))
        }
    }

    fn context_in(dir: &Path) -> AgentContext {
        let config = ToolsConfig {
            working_dir: Some(dir.to_path_buf()),
            sandbox_timeout_ms: 500,
            ..ToolsConfig::default()
        };
        let tools = ToolExecutor::with_search_backend(&config, Arc::new(StubSearch));
        AgentContext::new(KnowledgeBase::builtin(), tools)
    }

    fn agent_with(ctx: AgentContext) -> Agent {
        Agent::new(Arc::new(ctx), Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn script_instruction_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent_with(context_in(dir.path()));

        let reply = agent.handle_detailed("Create a red cube").await;
        assert!(harness::is_wrapped(&reply.text));
        assert!(reply.text.contains("primitive_cube_add"));
        assert_eq!(reply.category, Some(Category::Mesh));
        assert_eq!(reply.phase, InvocationPhase::Done);
        assert!(reply.is_executable());
        assert!(agent.last_sub_results().is_empty());
    }

    #[tokio::test]
    async fn handling_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let mut a = agent_with(context_in(dir.path()));
        let mut b = agent_with(context_in(dir.path()));

        let text = "add a smooth sphere with a blue material";
        assert_eq!(a.handle(text).await, b.handle(text).await);
        assert_eq!(a.handle(text).await, a.handle(text).await);
    }

    #[tokio::test]
    async fn knowledge_answers_are_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent_with(context_in(dir.path()));

        let question = "what is a modifier?";
        let reply = agent.handle_detailed(question).await;
        assert_eq!(reply.text, KnowledgeBase::builtin().answer(question));
        assert_eq!(reply.category, Some(Category::Knowledge));
        assert!(!reply.is_script);
        assert!(!harness::is_wrapped(&reply.text));
    }

    #[tokio::test]
    async fn tool_commands_return_their_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scene.blend"), b"x").unwrap();
        let mut agent = agent_with(context_in(dir.path()));

        assert_eq!(agent.handle("list files").await, "scene.blend");
        assert_eq!(
            agent.handle("web search: blender").await,
            "Blender is a 3D suite."
        );
    }

    #[tokio::test]
    async fn degenerate_instructions_still_answer_and_log() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryStore::new());
        let mut agent = Agent::new(Arc::new(context_in(dir.path())), store.clone());

        let cases = [
            ("", None),
            ("   ", None),
            ("run python", Some("Error: No code provided for code execution.")),
            ("execute code:", Some("Error: No code provided for code execution.")),
            ("delete file:", Some("Error: No file path provided for delete file.")),
            ("web search:", Some("Error: No query provided for web search.")),
            ("delete all files", Some("Error: No file extension provided for batch delete.")),
        ];
        for (text, expected) in cases {
            let reply = agent.handle_detailed(text).await;
            assert!(!reply.text.is_empty(), "{text:?}");
            assert_eq!(reply.phase, InvocationPhase::Done, "{text:?}");
            match expected {
                Some(out) => {
                    assert_eq!(reply.category, Some(Category::Tool), "{text:?}");
                    assert_eq!(reply.text, out, "{text:?}");
                }
                None => assert_eq!(reply.category, Some(Category::Utility), "{text:?}"),
            }

            let history = store.history(1).await;
            assert_eq!(history[0].prompt, text);
            assert_eq!(history[0].result, reply.text);
        }
        assert_eq!(store.history(100).await.len(), cases.len());
    }

    #[tokio::test]
    async fn compound_instruction_aggregates_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent_with(context_in(dir.path()));
        let mut reference = agent_with(context_in(dir.path()));

        let reply = agent
            .handle_detailed("create a cube and add studio lighting")
            .await;

        let expected = format!(
            "{}\n\n{}",
            reference.handle("create a cube").await,
            reference.handle("add studio lighting").await
        );
        assert_eq!(reply.text, expected);
        assert_eq!(reply.category, None);
        assert!(reply.is_script);

        let subs = agent.last_sub_results();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].instruction, "create a cube");
        assert_eq!(subs[1].instruction, "add studio lighting");
        assert_ne!(subs[0].id, subs[1].id);
        assert_ne!(subs[0].id, ROOT_ID);
        assert_eq!(reply.sub_results, subs);
    }

    #[tokio::test]
    async fn mixed_compound_is_not_all_script() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent_with(context_in(dir.path()));

        let reply = agent
            .handle_detailed("create a cube; what is a modifier?")
            .await;
        assert!(!reply.is_script);
        assert_eq!(reply.sub_results.len(), 2);
    }

    #[tokio::test]
    async fn children_log_to_their_own_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryStore::new());
        let mut agent = Agent::new(Arc::new(context_in(dir.path())), store.clone());

        agent.handle("create a cube and add a camera").await;

        let doc = store.snapshot().await;
        assert_eq!(doc.prompt_count(), 1);
        assert_eq!(doc.result_count(), 1);
        assert_eq!(
            doc.recent_prompts(1)[0].prompt,
            "create a cube and add a camera"
        );
    }

    #[tokio::test]
    async fn depth_cap_classifies_the_whole_instruction() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent_with(context_in(dir.path()).with_max_depth(0));

        let reply = agent
            .handle_detailed("create a cube and add a camera")
            .await;
        assert_eq!(reply.category, Some(Category::Mesh));
        assert!(reply.sub_results.is_empty());
        assert!(harness::is_wrapped(&reply.text));
    }

    #[tokio::test]
    async fn scene_probe_answers_analysis() {
        let dir = tempfile::tempdir().unwrap();
        let summary = SceneSummary {
            objects: 3,
            meshes: 1,
            lights: 1,
            cameras: 1,
        };
        let ctx = context_in(dir.path()).with_scene_probe(Arc::new(FixedScene(Ok(summary))));
        let mut agent = agent_with(ctx);

        let reply = agent.handle_detailed("analyze the scene").await;
        assert_eq!(reply.text, "Objects: 3, Meshes: 1, Lights: 1, Cameras: 1");
        assert!(!reply.is_script);
    }

    #[tokio::test]
    async fn failing_probe_falls_back_to_script() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(dir.path())
            .with_scene_probe(Arc::new(FixedScene(Err("no scene loaded".into()))));
        let mut agent = agent_with(ctx);

        let reply = agent.handle_detailed("analyze the scene").await;
        assert!(harness::is_wrapped(&reply.text));
        assert_eq!(reply.category, Some(Category::SceneAnalysis));
    }

    #[tokio::test]
    async fn panic_becomes_diagnostic() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryStore::new());
        let ctx = context_in(dir.path()).with_scene_probe(Arc::new(PanickingScene));
        let mut agent = Agent::new(Arc::new(ctx), store.clone());

        let reply = agent.handle_detailed("analyze the scene").await;
        assert_eq!(
            reply.text,
            harness::diagnostic("scene graph unavailable")
        );
        assert_eq!(reply.phase, InvocationPhase::Errored);
        assert!(!reply.is_executable());

        let results = store.recent_results(1).await;
        assert_eq!(results[0].result, reply.text);
    }

    #[tokio::test]
    async fn failing_child_does_not_stop_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context_in(dir.path()).with_scene_probe(Arc::new(PanickingScene));
        let mut agent = agent_with(ctx);

        let reply = agent
            .handle_detailed("analyze the scene and create a cube")
            .await;
        let subs = &reply.sub_results;
        assert_eq!(subs.len(), 2);
        assert!(subs[0].result.starts_with("# Error processing prompt:"));
        assert!(harness::is_wrapped(&subs[1].result));
        assert_eq!(reply.phase, InvocationPhase::Done);
    }

    #[tokio::test]
    async fn store_faults_are_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = Agent::new(Arc::new(context_in(dir.path())), Arc::new(BrokenStore));

        let reply = agent.handle_detailed("create a cube").await;
        assert!(harness::is_wrapped(&reply.text));
        assert_eq!(reply.phase, InvocationPhase::Done);
        assert!(agent.clear_history().await.is_err());
    }

    #[tokio::test]
    async fn file_store_persists_across_agents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory").join("memory_store.json");

        let mut config = AppConfig::default();
        config.memory.path = Some(path.clone());
        config.tools.working_dir = Some(dir.path().to_path_buf());

        let mut agent = Agent::from_config(&config);
        assert_eq!(agent.store().name(), "file");
        let text = agent.handle("create a cube").await;

        let reloaded = FileStore::load_from_disk(&path);
        assert_eq!(reloaded.prompt_count(), 1);
        assert_eq!(reloaded.recent_results(1)[0].result, text);

        let agent = Agent::from_config(&config);
        agent.clear_history().await.unwrap();
        assert!(FileStore::load_from_disk(&path).is_empty());
    }

    #[tokio::test]
    async fn in_memory_backend_from_config() {
        let mut config = AppConfig::default();
        config.memory.backend = "in_memory".into();
        let agent = Agent::from_config(&config);
        assert_eq!(agent.store().name(), "in_memory");
        assert_eq!(agent.id(), ROOT_ID);
        assert_eq!(agent.depth(), 0);
    }
}
