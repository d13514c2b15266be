//! Invocation state and reply types for the orchestrating agent.

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Where a single `handle` call is in its lifecycle.
///
/// `Routing → {Decomposed, Classified} → Generating → Wrapping → Logged → Done`,
/// with `Errored` reachable from any stage before `Logged`. `Errored` is
/// terminal: the diagnostic is still logged but the phase stays put.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationPhase {
    #[default]
    Routing,
    Decomposed,
    Classified,
    Generating,
    Wrapping,
    Logged,
    Done,
    Errored,
}

impl InvocationPhase {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_advance_to(self, next: InvocationPhase) -> bool {
        use InvocationPhase::*;
        match (self, next) {
            (Done, _) => false,
            (Errored, _) => false,
            (Logged, Done) => true,
            (Logged, _) => false,
            (_, Errored) => true,
            (Routing, Decomposed | Classified) => true,
            (Decomposed, Logged) => true,
            (Classified, Generating) => true,
            (Generating, Wrapping | Logged) => true,
            (Wrapping, Logged) => true,
            _ => false,
        }
    }
}

/// Outcome of one sub-instruction handled by a child agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAgentResult {
    /// Unique per invocation.
    pub id: String,
    pub instruction: String,
    pub result: String,
}

/// Everything the agent knows about one handled instruction.
///
/// [`AgentReply::text`] is what the host receives through the plain
/// string entry point; the other fields let a richer host decide what to
/// do with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    pub text: String,

    /// `None` for decomposed instructions and for faults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_results: Vec<SubAgentResult>,

    /// True when `text` is (or aggregates) host script.
    pub is_script: bool,

    pub phase: InvocationPhase,
}

impl AgentReply {
    /// Whether the host should hand `text` to its script runner.
    pub fn is_executable(&self) -> bool {
        self.is_script && !self.text.starts_with("# Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use InvocationPhase::*;

    #[test]
    fn classified_path_is_legal() {
        let path = [Routing, Classified, Generating, Wrapping, Logged, Done];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn decomposed_path_skips_wrapping() {
        assert!(Routing.can_advance_to(Decomposed));
        assert!(Decomposed.can_advance_to(Logged));
        assert!(!Decomposed.can_advance_to(Wrapping));
    }

    #[test]
    fn errored_is_absorbing() {
        assert!(Generating.can_advance_to(Errored));
        assert!(!Errored.can_advance_to(Generating));
        assert!(!Errored.can_advance_to(Logged));
        assert!(!Done.can_advance_to(Errored));
    }

    #[test]
    fn error_text_is_not_executable() {
        let reply = AgentReply {
            text: "# Error processing prompt: boom".into(),
            category: None,
            sub_results: vec![],
            is_script: true,
            phase: Done,
        };
        assert!(!reply.is_executable());
    }
}
