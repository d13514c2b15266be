//! Script generators, one per script category.
//!
//! Every generator is a pure function of the instruction text and its own
//! keyword tables: the same prompt always yields the same script. Each
//! picks one main branch (with a default when nothing matches) and then
//! appends optional modifier statements in a fixed order.
//!
//! Generators see the lower-cased instruction.

pub mod animation;
pub mod camera;
pub mod export;
pub mod layout;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod procedural;
pub mod scene_analysis;
pub mod utility;

use forgecore_core::Category;

/// Named RGBA colors shared by the mesh and material generators.
pub(crate) const COLORS: &[(&str, &str)] = &[
    ("red", "(1, 0, 0, 1)"),
    ("blue", "(0, 0, 1, 1)"),
    ("green", "(0, 1, 0, 1)"),
    ("yellow", "(1, 1, 0, 1)"),
    ("white", "(1, 1, 1, 1)"),
    ("black", "(0, 0, 0, 1)"),
];

/// First color named as a whole word, so "colored" or "hundred" do not
/// read as red.
pub(crate) fn named_color(prompt: &str) -> Option<(&'static str, &'static str)> {
    COLORS
        .iter()
        .find(|(name, _)| {
            prompt
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == *name)
        })
        .copied()
}

/// The script for `category`, or `None` for the non-script categories.
pub fn generate(category: Category, instruction: &str) -> Option<String> {
    let prompt = instruction.to_lowercase();
    let script = match category {
        Category::Mesh => mesh::generate(&prompt),
        Category::Material => material::generate(&prompt),
        Category::Layout => layout::generate(&prompt),
        Category::Camera => camera::generate(&prompt),
        Category::Lighting => lighting::generate(&prompt),
        Category::Animation => animation::generate(&prompt),
        Category::Export => export::generate(&prompt),
        Category::Procedural => procedural::generate(&prompt),
        Category::SceneAnalysis => scene_analysis::generate(&prompt),
        Category::Utility => utility::generate(&prompt),
        Category::Knowledge | Category::Tool => return None,
    };
    Some(script)
}

/// First table entry whose keyword occurs in `prompt`.
pub(crate) fn first_match<'t, T>(prompt: &str, table: &'t [(&str, T)]) -> Option<&'t T> {
    table
        .iter()
        .find(|(keyword, _)| prompt.contains(keyword))
        .map(|(_, value)| value)
}

/// Owned lines, ready to join.
pub(crate) fn lines(src: &[&str]) -> Vec<String> {
    src.iter().map(|s| s.to_string()).collect()
}
