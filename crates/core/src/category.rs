//! Action categories: the closed set an atomic instruction routes to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of action an atomic instruction asks for.
///
/// Every variant has exactly one handler; the router never produces a
/// category without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Mesh,
    Material,
    Layout,
    Camera,
    Lighting,
    Animation,
    Export,
    Knowledge,
    Tool,
    Procedural,
    SceneAnalysis,
    Utility,
}

impl Category {
    /// All categories, in routing priority order (utility last).
    pub const ALL: [Category; 12] = [
        Category::Mesh,
        Category::Material,
        Category::Layout,
        Category::Camera,
        Category::Lighting,
        Category::Animation,
        Category::Export,
        Category::Knowledge,
        Category::Tool,
        Category::Procedural,
        Category::SceneAnalysis,
        Category::Utility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Mesh => "mesh",
            Category::Material => "material",
            Category::Layout => "layout",
            Category::Camera => "camera",
            Category::Lighting => "lighting",
            Category::Animation => "animation",
            Category::Export => "export",
            Category::Knowledge => "knowledge",
            Category::Tool => "tool",
            Category::Procedural => "procedural",
            Category::SceneAnalysis => "scene_analysis",
            Category::Utility => "utility",
        }
    }

    /// Whether the handler output is a host script (as opposed to an
    /// answer meant for display).
    pub fn is_script(&self) -> bool {
        !matches!(self, Category::Knowledge | Category::Tool)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}
