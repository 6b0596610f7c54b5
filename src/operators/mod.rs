//! Intent operators (component E): heuristics that propose a path through
//! the day graph for a player intent. Operators never raise — failure is
//! represented in the result, not as an error (spec.md §4.E).

pub mod avoid;
pub mod cause;
pub mod relive;
pub mod trigger;
pub mod vary;

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    Cause,
    Avoid,
    Trigger,
    Relive,
    Vary,
}

impl std::fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperatorKind::Cause => "cause",
            OperatorKind::Avoid => "avoid",
            OperatorKind::Trigger => "trigger",
            OperatorKind::Relive => "relive",
            OperatorKind::Vary => "vary",
        };
        write!(f, "{s}")
    }
}

/// Which-of-many semantics for `cause` with a target set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiTargetMode {
    Any,
    All,
}

/// A single choice suggested along an operator's path, paired with the
/// decision node it was made at (spec.md §4.E: `{node_id, choice_index}`,
/// not a bare index — a caller can't otherwise tell which decision a choice
/// belongs to without re-walking the path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedDecision {
    pub node_id: NodeId,
    pub choice_index: usize,
}

impl From<(NodeId, usize)> for SuggestedDecision {
    fn from((node_id, choice_index): (NodeId, usize)) -> Self {
        Self { node_id, choice_index }
    }
}

/// Extracts the bare choice-index vector from a suggested-decisions list, for
/// comparing against a [`crate::model::Loop::decision_vector`] (e.g. via
/// [`crate::equivalence::distance::hamming_distance`]).
pub fn choice_indices(decisions: &[SuggestedDecision]) -> Vec<usize> {
    decisions.iter().map(|d| d.choice_index).collect()
}

/// Uniform result shape every operator returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorOutcome {
    pub success: bool,
    pub suggested_path: Vec<NodeId>,
    pub suggested_decisions: Vec<SuggestedDecision>,
    pub probability: f64,
    pub rationale: String,
}

impl OperatorOutcome {
    pub fn failure(rationale: impl Into<String>) -> Self {
        Self {
            success: false,
            suggested_path: Vec::new(),
            suggested_decisions: Vec::new(),
            probability: 0.0,
            rationale: rationale.into(),
        }
    }

    pub fn success(
        path: Vec<NodeId>,
        decisions: Vec<(NodeId, usize)>,
        probability: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            suggested_path: path,
            suggested_decisions: decisions.into_iter().map(SuggestedDecision::from).collect(),
            probability,
            rationale: rationale.into(),
        }
    }
}
