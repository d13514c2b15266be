//! Knowledge base: a static question/answer table.
//!
//! Matching is plain text: the first entry whose question contains the
//! input wins, then the first entry sharing any word with it. Table order
//! is the only ranking.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Answer returned when nothing in the table matches.
pub const UNKNOWN_ANSWER: &str = "I'm sorry, I don't know the answer to that question.";

const BUILTIN_FAQ: &str = include_str!("../data/blender_faq.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Default, Deserialize)]
struct KnowledgeDocument {
    #[serde(default)]
    faqs: Vec<KnowledgeEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Parse a `{ "faqs": [...] }` document.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let doc: KnowledgeDocument = serde_json::from_str(content)?;
        Ok(Self::new(doc.faqs))
    }

    /// The Blender FAQ table compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_json(BUILTIN_FAQ).unwrap_or_else(|e| {
            warn!(error = %e, "Built-in knowledge table is invalid");
            Self::default()
        })
    }

    /// Load from `path` when given, falling back to the built-in table.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };

        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| Self::from_json(&content).map_err(|e| e.to_string()));

        match loaded {
            Ok(kb) => {
                debug!(path = %path.display(), entries = kb.len(), "Knowledge base loaded");
                kb
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load knowledge base, using built-in table");
                Self::builtin()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    /// Find the best entry for `question`, if any.
    pub fn lookup(&self, question: &str) -> Option<&KnowledgeEntry> {
        let query = question.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let lowered: Vec<String> = self
            .entries
            .iter()
            .map(|e| e.question.to_lowercase())
            .collect();

        if let Some(idx) = lowered.iter().position(|q| q.contains(&query)) {
            return Some(&self.entries[idx]);
        }

        let words = words_of(&query);
        lowered
            .iter()
            .position(|q| {
                let stored = words_of(q);
                words.iter().any(|w| stored.contains(w))
            })
            .map(|idx| &self.entries[idx])
    }

    /// Answer `question`, or [`UNKNOWN_ANSWER`].
    pub fn answer(&self, question: &str) -> String {
        match self.lookup(question) {
            Some(entry) => entry.answer.clone(),
            None => UNKNOWN_ANSWER.to_string(),
        }
    }
}

/// Whitespace-delimited words with surrounding punctuation removed.
fn words_of(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::new(vec![
            KnowledgeEntry {
                question: "How do I add a cube?".into(),
                answer: "Shift+A".into(),
            },
            KnowledgeEntry {
                question: "What is a modifier?".into(),
                answer: "A non-destructive operation.".into(),
            },
        ])
    }

    #[test]
    fn substring_match_wins() {
        assert_eq!(kb().answer("  ADD A CUBE "), "Shift+A");
    }

    #[test]
    fn falls_back_to_shared_word() {
        assert_eq!(kb().answer("explain modifier stacks"), "A non-destructive operation.");
    }

    #[test]
    fn first_entry_wins_on_ties() {
        // "a" appears in both stored questions.
        assert_eq!(kb().answer("a"), "Shift+A");
    }

    #[test]
    fn unknown_returns_sentinel() {
        assert_eq!(kb().answer("quantum chromodynamics"), UNKNOWN_ANSWER);
    }

    #[test]
    fn empty_input_returns_sentinel() {
        assert_eq!(kb().answer(""), UNKNOWN_ANSWER);
        assert_eq!(kb().answer("   "), UNKNOWN_ANSWER);
    }

    #[test]
    fn builtin_table_is_populated() {
        let kb = KnowledgeBase::builtin();
        assert!(!kb.is_empty());
        assert!(kb.answer("insert a keyframe").contains("press I"));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"{{"faqs": [{{"question": "What is a vertex?", "answer": "A point."}}]}}"#
        )
        .unwrap();

        let kb = KnowledgeBase::load(Some(tmp.path()));
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.answer("vertex"), "A point.");
    }

    #[test]
    fn bad_file_falls_back_to_builtin() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "not json").unwrap();

        let kb = KnowledgeBase::load(Some(tmp.path()));
        assert_eq!(kb.len(), KnowledgeBase::builtin().len());
    }
}
