//! A loop's terminal outcome (spec.md §3 "Outcome").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::model::node::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeType {
    Death,
    ResetTrigger,
    DayEnd,
    VoluntaryReset,
    SubLoopExit,
    Success,
    Failure,
    Partial,
}

impl OutcomeType {
    /// The graph node kind a terminal node must have for this outcome type,
    /// if the outcome type constrains it at all (spec.md §3 invariant).
    pub fn required_terminal_kind(self) -> Option<NodeKind> {
        match self {
            OutcomeType::Death => Some(NodeKind::Death),
            OutcomeType::ResetTrigger => Some(NodeKind::Reset),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutcomeType::Death => "death",
            OutcomeType::ResetTrigger => "reset_trigger",
            OutcomeType::DayEnd => "day_end",
            OutcomeType::VoluntaryReset => "voluntary_reset",
            OutcomeType::SubLoopExit => "sub_loop_exit",
            OutcomeType::Success => "success",
            OutcomeType::Failure => "failure",
            OutcomeType::Partial => "partial",
        };
        write!(f, "{s}")
    }
}

/// A named, typed delta to the world state (spec.md leaves the shape open;
/// modeled as key/value pairs, mirroring a fact, so it composes with the
/// equivalence engine's canonicalisation).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStateDelta {
    pub changes: Vec<(String, serde_json::Value)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterStateChange {
    pub character: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub outcome_type: OutcomeType,
    pub terminal_node_id: NodeId,
    pub timestamp: DateTime<Utc>,
    pub cause: Option<String>,
    pub world_state_delta: Option<WorldStateDelta>,
    pub characters_affected: Option<Vec<CharacterStateChange>>,
    /// 64 lowercase hex characters; set once the equivalence engine hashes it.
    pub hash: Option<String>,
}

impl Outcome {
    pub fn new(outcome_type: OutcomeType, terminal_node_id: NodeId, timestamp: DateTime<Utc>) -> Self {
        Self {
            outcome_type,
            terminal_node_id,
            timestamp,
            cause: None,
            world_state_delta: None,
            characters_affected: None,
            hash: None,
        }
    }
}
