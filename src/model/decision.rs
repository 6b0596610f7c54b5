//! A single recorded decision within a loop (spec.md §3 "Decision").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Must reference a decision node.
    pub node_id: NodeId,
    /// Must be valid for that node's `choices` list.
    pub choice_index: usize,
    pub timestamp: DateTime<Utc>,
    pub rationale: Option<String>,
    pub confidence: Option<f32>,
}

impl Decision {
    pub fn new(node_id: NodeId, choice_index: usize, timestamp: DateTime<Utc>) -> Self {
        Self {
            node_id,
            choice_index,
            timestamp,
            rationale: None,
            confidence: None,
        }
    }
}
