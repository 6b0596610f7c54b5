//! The `Loop` entity and its sub-loops (spec.md §3 "Loop", "Sub-loop").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{EpochId, EquivalenceClassId, GraphId, KnowledgeStateId, LoopId, NodeId};
use crate::model::decision::Decision;
use crate::model::outcome::Outcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopStatus {
    InProgress,
    Completed,
    Aborted,
}

/// The protagonist's emotional register, carried at loop start/end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmotionalState {
    Hopeful,
    Curious,
    Frustrated,
    Desperate,
    Numb,
    Determined,
    Broken,
    Calm,
    Angry,
    Resigned,
}

impl EmotionalState {
    pub const ALL: [EmotionalState; 10] = [
        EmotionalState::Hopeful,
        EmotionalState::Curious,
        EmotionalState::Frustrated,
        EmotionalState::Desperate,
        EmotionalState::Numb,
        EmotionalState::Determined,
        EmotionalState::Broken,
        EmotionalState::Calm,
        EmotionalState::Angry,
        EmotionalState::Resigned,
    ];
}

impl std::fmt::Display for EmotionalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EmotionalState::Hopeful => "hopeful",
            EmotionalState::Curious => "curious",
            EmotionalState::Frustrated => "frustrated",
            EmotionalState::Desperate => "desperate",
            EmotionalState::Numb => "numb",
            EmotionalState::Determined => "determined",
            EmotionalState::Broken => "broken",
            EmotionalState::Calm => "calm",
            EmotionalState::Angry => "angry",
            EmotionalState::Resigned => "resigned",
        };
        write!(f, "{s}")
    }
}

/// One full traversal of the day graph, end to end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loop {
    pub id: LoopId,
    pub sequence_number: u64,
    pub epoch_id: EpochId,
    pub graph_id: GraphId,
    pub status: LoopStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub knowledge_state_start_id: KnowledgeStateId,
    pub knowledge_state_end_id: Option<KnowledgeStateId>,
    pub emotional_state_start: EmotionalState,
    pub emotional_state_end: Option<EmotionalState>,
    pub decisions: Vec<Decision>,
    /// Parallel to `decisions`: `decision_vector[i] == decisions[i].choice_index`.
    pub decision_vector: Vec<usize>,
    pub path: Option<Vec<NodeId>>,
    pub outcome: Option<Outcome>,
    pub sub_loops: Vec<SubLoop>,
    pub equivalence_class_id: Option<EquivalenceClassId>,
    #[serde(default)]
    pub is_anchor: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Loop {
    pub fn start(
        id: LoopId,
        sequence_number: u64,
        epoch_id: EpochId,
        graph_id: GraphId,
        knowledge_state_start_id: KnowledgeStateId,
        emotional_state_start: EmotionalState,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            sequence_number,
            epoch_id,
            graph_id,
            status: LoopStatus::InProgress,
            created_at: now,
            started_at: now,
            ended_at: None,
            knowledge_state_start_id,
            knowledge_state_end_id: None,
            emotional_state_start,
            emotional_state_end: None,
            decisions: Vec::new(),
            decision_vector: Vec::new(),
            path: None,
            outcome: None,
            sub_loops: Vec::new(),
            equivalence_class_id: None,
            is_anchor: false,
            tags: Vec::new(),
        }
    }

    /// Invariant: `decision_vector.length == decisions.length`, and for
    /// each `i`, `decisions[i].choice_index == decision_vector[i]`.
    pub fn decision_vector_is_consistent(&self) -> bool {
        self.decision_vector.len() == self.decisions.len()
            && self
                .decisions
                .iter()
                .zip(&self.decision_vector)
                .all(|(d, v)| d.choice_index == *v)
    }
}

/// Repetition of a segment within a loop (spec.md §3 "Sub-loop").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubLoop {
    pub parent_loop_id: LoopId,
    pub parent_sub_loop_index: Option<usize>,
    pub depth: u32,
    pub start_node_id: NodeId,
    pub end_node_id: NodeId,
    pub attempt_count: u32,
    pub strategies_tried: Vec<String>,
    pub best_outcome: Option<Outcome>,
    pub final_outcome: Option<Outcome>,
    pub knowledge_gained: Vec<String>,
    pub psychological_effect: Option<String>,
}
