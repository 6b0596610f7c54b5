//! Day graph: nodes, edges, CRUD, and structural validation (component B).
//!
//! Backed by `petgraph`'s `StableDiGraph` so that removing a node never
//! reshuffles the indices of its neighbours, generalising the dual-index
//! pattern the teacher's `KnowledgeGraph` (`graph/index.rs`) used for an
//! append-only graph to one that also supports removal.

pub mod export;
pub mod traverse;

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GraphError;
use crate::ids::{EdgeId, GraphId, NodeId};
use crate::model::issue::{IssueCategory, ValidationIssue, ValidationReport};
use crate::model::node::NodeKind;
use crate::model::{GraphEdge, GraphNode};
use crate::time_slot::TimeSlot;

pub type GraphResult<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub start: TimeSlot,
    pub end: TimeSlot,
}

/// The day graph: a single day's control-flow DAG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayGraph {
    pub id: GraphId,
    pub name: String,
    pub version: u64,
    pub time_bounds: TimeBounds,
    pub start_node_id: NodeId,

    nodes: HashMap<NodeId, GraphNode>,
    edges: HashMap<EdgeId, GraphEdge>,

    #[serde(skip)]
    graph: StableDiGraph<NodeId, EdgeId>,
    #[serde(skip)]
    node_index: HashMap<NodeId, NodeIndex>,
}

impl DayGraph {
    pub fn new(id: GraphId, name: impl Into<String>, time_bounds: TimeBounds, start_node_id: NodeId) -> Self {
        Self {
            id,
            name: name.into(),
            version: 0,
            time_bounds,
            start_node_id,
            nodes: HashMap::new(),
            edges: HashMap::new(),
            graph: StableDiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Rebuilds the petgraph-backed index from `nodes`/`edges`. Needed after
    /// deserialising a project artifact, since the index is `#[serde(skip)]`.
    pub fn reindex(&mut self) {
        self.graph = StableDiGraph::new();
        self.node_index.clear();
        let node_ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in node_ids {
            let idx = self.graph.add_node(id);
            self.node_index.insert(id, idx);
        }
        let edges: Vec<GraphEdge> = self.edges.values().cloned().collect();
        for edge in edges {
            if let (Some(&s), Some(&t)) = (self.node_index.get(&edge.source), self.node_index.get(&edge.target)) {
                self.graph.add_edge(s, t, edge.id);
            }
        }
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }

    // -- node CRUD -----------------------------------------------------

    pub fn add_node(&mut self, node: GraphNode) -> GraphResult<()> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateId { id: node.id.to_string() });
        }
        let idx = self.graph.add_node(node.id);
        self.node_index.insert(node.id, idx);
        self.nodes.insert(node.id, node);
        self.bump_version();
        Ok(())
    }

    /// Cascades to all incident edges.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::UnknownNode { id: id.to_string() });
        }
        let incident: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.source == id || e.target == id)
            .map(|e| e.id)
            .collect();
        for edge_id in incident {
            self.edges.remove(&edge_id);
        }
        if let Some(idx) = self.node_index.remove(&id) {
            self.graph.remove_node(idx);
        }
        self.nodes.remove(&id);
        self.bump_version();
        debug!(node = %id, "removed graph node");
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // -- edge CRUD -------------------------------------------------------

    pub fn add_edge(&mut self, edge: GraphEdge) -> GraphResult<()> {
        if edge.source == edge.target {
            return Err(GraphError::SelfLoopForbidden { id: edge.source.to_string() });
        }
        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::DuplicateId { id: edge.id.to_string() });
        }
        let &src_idx = self
            .node_index
            .get(&edge.source)
            .ok_or_else(|| GraphError::UnknownEndpoint { id: edge.source.to_string() })?;
        let &dst_idx = self
            .node_index
            .get(&edge.target)
            .ok_or_else(|| GraphError::UnknownEndpoint { id: edge.target.to_string() })?;
        self.graph.add_edge(src_idx, dst_idx, edge.id);
        self.edges.insert(edge.id, edge);
        self.bump_version();
        Ok(())
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> GraphResult<()> {
        let edge = self.edges.get(&id).ok_or_else(|| GraphError::UnknownEdge { id: id.to_string() })?;
        let (src, dst) = (edge.source, edge.target);
        if let (Some(&s), Some(&t)) = (self.node_index.get(&src), self.node_index.get(&dst)) {
            if let Some(pet_edge) = self.graph.find_edge(s, t) {
                self.graph.remove_edge(pet_edge);
            }
        }
        self.edges.remove(&id);
        self.bump_version();
        Ok(())
    }

    pub fn edge(&self, id: EdgeId) -> Option<&GraphEdge> {
        self.edges.get(&id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.values()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    // -- neighbour / filter queries ---------------------------------------

    pub fn outgoing_edges(&self, id: NodeId) -> Vec<&GraphEdge> {
        self.edges.values().filter(|e| e.source == id).collect()
    }

    pub fn incoming_edges(&self, id: NodeId) -> Vec<&GraphEdge> {
        self.edges.values().filter(|e| e.target == id).collect()
    }

    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        self.outgoing_edges(id).into_iter().map(|e| e.target).collect()
    }

    pub fn predecessors(&self, id: NodeId) -> Vec<NodeId> {
        self.incoming_edges(id).into_iter().map(|e| e.source).collect()
    }

    pub fn out_degree(&self, id: NodeId) -> usize {
        self.outgoing_edges(id).len()
    }

    /// Choice index implied by stepping from `node_id` to `next_id`: the
    /// position of that edge among `node_id`'s outgoing edges, ordered by
    /// edge id. Decision nodes' `choices` are validated to line up with this
    /// same ordering (see `validate`), so this recovers which choice a path
    /// step represents.
    pub fn decision_choice_for_step(&self, node_id: NodeId, next_id: NodeId) -> Option<usize> {
        let mut outgoing = self.outgoing_edges(node_id);
        outgoing.sort_by_key(|e| e.id);
        outgoing.iter().position(|e| e.target == next_id)
    }

    /// Maps a path through the graph to the decision-vector of choice
    /// indices made at each decision node encountered along it, paired with
    /// the id of the decision node each choice was made at.
    pub fn decisions_along_path(&self, path: &[NodeId]) -> Vec<(NodeId, usize)> {
        path.windows(2)
            .filter_map(|pair| {
                let (current, next) = (pair[0], pair[1]);
                if self.node(current).is_some_and(|n| n.kind == NodeKind::Decision) {
                    self.decision_choice_for_step(current, next).map(|choice_index| (current, choice_index))
                } else {
                    None
                }
            })
            .collect()
    }

    pub fn nodes_by_kind(&self, kind: NodeKind) -> Vec<&GraphNode> {
        self.nodes.values().filter(|n| n.kind == kind).collect()
    }

    pub fn nodes_in_time_range(&self, start: TimeSlot, end: TimeSlot) -> Vec<&GraphNode> {
        self.nodes.values().filter(|n| n.time_slot >= start && n.time_slot <= end).collect()
    }

    pub fn critical_nodes(&self) -> Vec<&GraphNode> {
        self.nodes.values().filter(|n| n.critical).collect()
    }

    pub(crate) fn node_index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_index.get(&id).copied()
    }

    pub(crate) fn petgraph(&self) -> &StableDiGraph<NodeId, EdgeId> {
        &self.graph
    }

    // -- validation ---------------------------------------------------

    /// spec.md §4.B: errors for a missing start node, edges referencing
    /// missing nodes, and decision nodes whose choices don't match their
    /// outgoing edges; warnings for unreachable non-start nodes, non-terminal
    /// dead ends, out-of-bounds time slots, and time-backward edges between
    /// non-flexible nodes.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if !self.nodes.contains_key(&self.start_node_id) {
            report.push(
                ValidationIssue::error(format!("start node {} is not present in the graph", self.start_node_id))
                    .with_category(IssueCategory::Reference)
                    .with_suggestion("Add the start node or point start_node_id at an existing node."),
            );
        }

        for edge in self.edges.values() {
            if !self.nodes.contains_key(&edge.source) {
                report.push(
                    ValidationIssue::error(format!("edge {} references missing source {}", edge.id, edge.source))
                        .with_category(IssueCategory::Reference),
                );
            }
            if !self.nodes.contains_key(&edge.target) {
                report.push(
                    ValidationIssue::error(format!("edge {} references missing target {}", edge.id, edge.target))
                        .with_category(IssueCategory::Reference),
                );
            }
        }

        for node in self.nodes.values() {
            if node.kind == NodeKind::Decision {
                let out_degree = self.out_degree(node.id);
                if out_degree >= 2 {
                    match &node.choices {
                        Some(choices) if choices.len() == out_degree && node.choices_are_contiguous() => {}
                        _ => report.push(
                            ValidationIssue::error(format!(
                                "decision node {} has {} outgoing choices but its choices list does not match",
                                node.id, out_degree
                            ))
                            .with_category(IssueCategory::Structural)
                            .with_suggestion("Make `choices` length match out-degree with contiguous 0..k-1 indices."),
                        ),
                    }
                } else {
                    report.push(
                        ValidationIssue::error(format!(
                            "decision node {} has fewer than 2 outgoing choice edges",
                            node.id
                        ))
                        .with_category(IssueCategory::Structural),
                    );
                }
            }

            if node.time_slot < self.time_bounds.start || node.time_slot > self.time_bounds.end {
                report.push(
                    ValidationIssue::warning(format!(
                        "node {} time_slot {} is outside the day's time_bounds",
                        node.id, node.time_slot
                    ))
                    .with_category(IssueCategory::Temporal),
                );
            }

            if node.kind.is_terminal() && self.out_degree(node.id) > 0 {
                report.push(
                    ValidationIssue::error(format!("terminal node {} ({}) has outgoing edges", node.id, node.kind))
                        .with_category(IssueCategory::Structural),
                );
            }
        }

        let reachability = traverse::reachability(self);
        for &id in &reachability.unreachable {
            if id != self.start_node_id {
                report.push(
                    ValidationIssue::warning(format!("node {id} is unreachable from the start node"))
                        .with_category(IssueCategory::Reference),
                );
            }
        }
        for &id in &reachability.dead_ends {
            let kind = self.node(id).map(|n| n.kind);
            if !kind.is_some_and(NodeKind::is_terminal) {
                report.push(
                    ValidationIssue::warning(format!("node {id} has no outgoing edges"))
                        .with_category(IssueCategory::Structural)
                        .with_entity_ref(id.to_string()),
                );
            }
        }

        for edge in self.edges.values() {
            let (Some(src), Some(dst)) = (self.node(edge.source), self.node(edge.target)) else { continue };
            if !src.time_flexible && !dst.time_flexible && dst.time_slot < src.time_slot {
                report.push(
                    ValidationIssue::warning(format!(
                        "edge {} goes backward in time ({} -> {})",
                        edge.id, src.time_slot, dst.time_slot
                    ))
                    .with_category(IssueCategory::Temporal)
                    .with_suggestion("Mark one endpoint time_flexible, or adjust the time slots."),
                );
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, NodeKind};

    fn slot(h: u8, m: u8) -> TimeSlot {
        TimeSlot::new(h, m).unwrap()
    }

    fn bounds() -> TimeBounds {
        TimeBounds { start: slot(0, 0), end: slot(23, 59) }
    }

    fn node(kind: NodeKind, h: u8) -> GraphNode {
        GraphNode::new(NodeId::new(), kind, slot(h, 0), "n")
    }

    #[test]
    fn add_then_remove_node_clears_counts() {
        let mut g = DayGraph::new(GraphId::new(), "day", bounds(), NodeId::new());
        let n = node(NodeKind::Event, 8);
        g.add_node(n.clone()).unwrap();
        assert_eq!(g.node_count(), 1);
        g.remove_node(n.id).unwrap();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut g = DayGraph::new(GraphId::new(), "day", bounds(), NodeId::new());
        let n = node(NodeKind::Event, 8);
        g.add_node(n.clone()).unwrap();
        assert!(matches!(g.add_node(n), Err(GraphError::DuplicateId { .. })));
    }

    #[test]
    fn edge_requires_known_endpoints() {
        let mut g = DayGraph::new(GraphId::new(), "day", bounds(), NodeId::new());
        let a = node(NodeKind::Event, 8);
        g.add_node(a.clone()).unwrap();
        let edge = GraphEdge::new(EdgeId::new(), a.id, NodeId::new(), crate::model::EdgeKind::Default);
        assert!(matches!(g.add_edge(edge), Err(GraphError::UnknownEndpoint { .. })));
    }

    #[test]
    fn self_loop_forbidden() {
        let mut g = DayGraph::new(GraphId::new(), "day", bounds(), NodeId::new());
        let a = node(NodeKind::Event, 8);
        g.add_node(a.clone()).unwrap();
        let edge = GraphEdge::new(EdgeId::new(), a.id, a.id, crate::model::EdgeKind::Default);
        assert!(matches!(g.add_edge(edge), Err(GraphError::SelfLoopForbidden { .. })));
    }

    #[test]
    fn removing_a_node_cascades_to_incident_edges() {
        let mut g = DayGraph::new(GraphId::new(), "day", bounds(), NodeId::new());
        let a = node(NodeKind::Event, 8);
        let b = node(NodeKind::Event, 9);
        g.add_node(a.clone()).unwrap();
        g.add_node(b.clone()).unwrap();
        let e = GraphEdge::new(EdgeId::new(), a.id, b.id, crate::model::EdgeKind::Default);
        g.add_edge(e.clone()).unwrap();
        g.remove_node(a.id).unwrap();
        assert_eq!(g.edge_count(), 0);
        assert!(g.edge(e.id).is_none());
    }

    #[test]
    fn version_strictly_increases() {
        let mut g = DayGraph::new(GraphId::new(), "day", bounds(), NodeId::new());
        let a = node(NodeKind::Event, 8);
        g.add_node(a.clone()).unwrap();
        let v1 = g.version;
        let b = node(NodeKind::Event, 9);
        g.add_node(b.clone()).unwrap();
        assert!(g.version > v1);
        let e = GraphEdge::new(EdgeId::new(), a.id, b.id, crate::model::EdgeKind::Default);
        g.add_edge(e).unwrap();
        assert!(g.version > v1 + 1);
    }

    #[test]
    fn validate_flags_dead_end_event_but_not_death() {
        let mut g = DayGraph::new(GraphId::new(), "day", bounds(), NodeId::new());
        let start = node(NodeKind::Event, 0);
        g.start_node_id = start.id;
        let dead = node(NodeKind::Event, 10);
        g.add_node(start.clone()).unwrap();
        g.add_node(dead.clone()).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), start.id, dead.id, crate::model::EdgeKind::Default)).unwrap();
        let report = g.validate();
        assert!(report.issues.iter().any(|i| i.entity_ref.as_deref() == Some(&dead.id.to_string())));

        let mut g2 = DayGraph::new(GraphId::new(), "day", bounds(), NodeId::new());
        let start2 = node(NodeKind::Event, 0);
        g2.start_node_id = start2.id;
        let death = node(NodeKind::Death, 10);
        g2.add_node(start2.clone()).unwrap();
        g2.add_node(death.clone()).unwrap();
        g2.add_edge(GraphEdge::new(EdgeId::new(), start2.id, death.id, crate::model::EdgeKind::Default)).unwrap();
        let report2 = g2.validate();
        assert!(!report2.issues.iter().any(|i| i.entity_ref.as_deref() == Some(&death.id.to_string())));
    }

    #[test]
    fn validate_accepts_decision_with_matching_choices() {
        let mut g = DayGraph::new(GraphId::new(), "day", bounds(), NodeId::new());
        let mut decision = node(NodeKind::Decision, 8);
        decision.choices = Some(vec![
            Choice { index: 0, label: "a".into(), description: None },
            Choice { index: 1, label: "b".into(), description: None },
        ]);
        let a = node(NodeKind::Event, 9);
        let b = node(NodeKind::Event, 9);
        g.start_node_id = decision.id;
        g.add_node(decision.clone()).unwrap();
        g.add_node(a.clone()).unwrap();
        g.add_node(b.clone()).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), decision.id, a.id, crate::model::EdgeKind::Choice)).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), decision.id, b.id, crate::model::EdgeKind::Choice)).unwrap();
        let report = g.validate();
        assert!(!report.issues.iter().any(|i| i.message.contains("decision node")));
    }
}
