//! Graph node data model (spec.md §3 "Graph node").

use serde::{Deserialize, Serialize};

use crate::ids::NodeId;
use crate::time_slot::TimeSlot;

/// The role a node plays in the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Event,
    Decision,
    Location,
    Encounter,
    Discovery,
    Death,
    Reset,
}

impl NodeKind {
    /// `death` and `reset` are terminal: no outgoing edges allowed.
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeKind::Death | NodeKind::Reset)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeKind::Event => "event",
            NodeKind::Decision => "decision",
            NodeKind::Location => "location",
            NodeKind::Encounter => "encounter",
            NodeKind::Discovery => "discovery",
            NodeKind::Death => "death",
            NodeKind::Reset => "reset",
        };
        write!(f, "{s}")
    }
}

/// One option presented at a decision node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub index: usize,
    pub label: String,
    pub description: Option<String>,
}

/// A node in the day graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub time_slot: TimeSlot,
    pub label: String,
    pub description: Option<String>,
    pub location_tag: Option<String>,
    #[serde(default)]
    pub critical: bool,
    #[serde(default)]
    pub time_flexible: bool,
    /// Required, contiguous `0..k` indexed, when `kind == Decision` and the
    /// node has two or more outgoing choice edges.
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    #[serde(default)]
    pub knowledge_available: Vec<String>,
    #[serde(default)]
    pub items_available: Vec<String>,
    #[serde(default)]
    pub character_tags: Vec<String>,
}

impl GraphNode {
    pub fn new(id: NodeId, kind: NodeKind, time_slot: TimeSlot, label: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            time_slot,
            label: label.into(),
            description: None,
            location_tag: None,
            critical: false,
            time_flexible: false,
            choices: None,
            knowledge_available: Vec::new(),
            items_available: Vec::new(),
            character_tags: Vec::new(),
        }
    }

    /// A `choices` list's indices are contiguous `0..k-1`.
    pub fn choices_are_contiguous(&self) -> bool {
        match &self.choices {
            None => true,
            Some(choices) => choices
                .iter()
                .enumerate()
                .all(|(i, c)| c.index == i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: NodeKind) -> GraphNode {
        GraphNode::new(NodeId::new(), kind, TimeSlot::new(8, 0).unwrap(), "n")
    }

    #[test]
    fn terminal_kinds() {
        assert!(NodeKind::Death.is_terminal());
        assert!(NodeKind::Reset.is_terminal());
        assert!(!NodeKind::Event.is_terminal());
    }

    #[test]
    fn contiguous_choices() {
        let mut n = node(NodeKind::Decision);
        n.choices = Some(vec![
            Choice { index: 0, label: "a".into(), description: None },
            Choice { index: 1, label: "b".into(), description: None },
        ]);
        assert!(n.choices_are_contiguous());

        n.choices = Some(vec![
            Choice { index: 0, label: "a".into(), description: None },
            Choice { index: 2, label: "b".into(), description: None },
        ]);
        assert!(!n.choices_are_contiguous());
    }
}
