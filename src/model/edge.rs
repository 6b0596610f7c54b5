//! Graph edge data model (spec.md §3 "Graph edge").

use serde::{Deserialize, Serialize};

use crate::ids::{EdgeId, NodeId};
use crate::time_slot::TimeSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Default,
    Choice,
    Conditional,
    Timed,
    Random,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EdgeKind::Default => "default",
            EdgeKind::Choice => "choice",
            EdgeKind::Conditional => "conditional",
            EdgeKind::Timed => "timed",
            EdgeKind::Random => "random",
        };
        write!(f, "{s}")
    }
}

/// A window of time during which an edge's preconditions are satisfiable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub after: Option<TimeSlot>,
    pub before: Option<TimeSlot>,
}

impl TimeWindow {
    pub fn contains(&self, t: TimeSlot) -> bool {
        self.after.map_or(true, |a| t >= a) && self.before.map_or(true, |b| t <= b)
    }
}

/// Gating conditions an edge requires before it may be traversed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preconditions {
    #[serde(default)]
    pub requires_knowledge: Vec<String>,
    #[serde(default)]
    pub requires_item: Vec<String>,
    #[serde(default)]
    pub time_window: Option<TimeWindow>,
}

/// An edge in the day graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    pub weight: Option<f32>,
    pub preconditions: Option<Preconditions>,
    pub duration_minutes: Option<u32>,
    pub label: Option<String>,
}

impl GraphEdge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Self {
            id,
            source,
            target,
            kind,
            weight: None,
            preconditions: None,
            duration_minutes: None,
            label: None,
        }
    }
}
