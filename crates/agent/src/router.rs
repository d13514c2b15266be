//! Instruction router: split compound instructions, classify the rest.
//!
//! Splitting comes first: an instruction that breaks into two or more
//! fragments is never classified itself. Fragments are separated by the
//! whole word "and", by `;`, and by a `.` that ends a sentence (followed
//! by whitespace or the end of the text), so file extensions, relative
//! paths and decimals stay intact.
//!
//! Classification tests keyword groups against the lower-cased text in a
//! fixed priority order; the first group with any substring hit wins and
//! `utility` catches everything else.

use forgecore_core::Category;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\band\b|;|\.(?:\s+|$)").expect("split pattern is valid")
});

/// Keyword groups in priority order. `utility` has no keywords.
const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Mesh,
        &[
            "cube", "sphere", "cylinder", "cone", "plane", "torus", "monkey", "mesh", "object",
            "model", "create",
        ],
    ),
    (
        Category::Material,
        &["material", "texture", "shader", "color", "metal", "wood", "glass", "plastic"],
    ),
    // "scene" stays out: it would shadow every scene-analysis request.
    (
        Category::Layout,
        &["layout", "arrange", "position", "setup", "organize", "grid"],
    ),
    (Category::Camera, &["camera", "view", "render"]),
    (Category::Lighting, &["light", "lighting", "illuminate"]),
    (Category::Animation, &["animate", "animation", "keyframe"]),
    (Category::Export, &["export", "save", "fbx", "obj", "gltf"]),
    (
        Category::Knowledge,
        &["what is", "what's", "how do", "how to", "how can", "why", "explain", "?"],
    ),
    (
        Category::Tool,
        &["run python", "execute code", "web search", "list files", "delete file", "delete all"],
    ),
    (
        Category::Procedural,
        &["procedural", "terrain", "scatter", "random", "forest", "city"],
    ),
    (
        Category::SceneAnalysis,
        &["analyze", "analyse", "analysis", "inspect", "statistics", "summarize"],
    ),
];

/// What to do with an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Two or more fragments, in order.
    Decomposed(Vec<String>),
    Classified(Category),
}

/// Stateless; cheap to create per agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Router;

impl Router {
    pub fn new() -> Self {
        Self
    }

    /// Split into trimmed, non-empty fragments.
    pub fn split(&self, instruction: &str) -> Vec<String> {
        SPLIT
            .split(instruction)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Pick the category for an atomic instruction.
    pub fn classify(&self, instruction: &str) -> Category {
        let lower = instruction.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Utility)
    }

    pub fn classify_or_decompose(&self, instruction: &str) -> Route {
        let fragments = self.split(instruction);
        if fragments.len() >= 2 {
            debug!(fragments = fragments.len(), "Instruction decomposed");
            return Route::Decomposed(fragments);
        }

        let category = self.classify(instruction);
        debug!(category = %category, "Instruction classified");
        Route::Classified(category)
    }
}
