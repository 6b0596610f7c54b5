//! `trigger(sequence)`: checkpoint pathing through an ordered waypoint list.

use crate::graph::{traverse, DayGraph};
use crate::ids::NodeId;

use super::OperatorOutcome;

pub fn trigger(graph: &DayGraph, sequence: &[NodeId]) -> OperatorOutcome {
    match traverse::checkpoint_path(graph, sequence) {
        Ok(path) => {
            let decisions = graph.decisions_along_path(&path);
            OperatorOutcome::success(path, decisions, 1.0, "checkpoint path through the requested sequence")
        }
        Err(e) => OperatorOutcome::failure(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TimeBounds;
    use crate::ids::{EdgeId, GraphId};
    use crate::model::{EdgeKind, GraphEdge, GraphNode, NodeKind};
    use crate::time_slot::TimeSlot;

    fn slot(h: u8) -> TimeSlot {
        TimeSlot::new(h, 0).unwrap()
    }

    fn event(h: u8) -> GraphNode {
        GraphNode::new(NodeId::new(), NodeKind::Event, slot(h), "n")
    }

    #[test]
    fn reports_the_failing_hop() {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let a = event(6);
        let b = event(7);
        let isolated = event(9);
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, a.id);
        for n in [&a, &b, &isolated] {
            g.add_node(n.clone()).unwrap();
        }
        g.add_edge(GraphEdge::new(EdgeId::new(), a.id, b.id, EdgeKind::Default)).unwrap();

        let outcome = trigger(&g, &[b.id, isolated.id]);
        assert!(!outcome.success);
    }

    #[test]
    fn succeeds_through_a_reachable_sequence() {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let a = event(6);
        let b = event(7);
        let c = event(8);
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, a.id);
        for n in [&a, &b, &c] {
            g.add_node(n.clone()).unwrap();
        }
        g.add_edge(GraphEdge::new(EdgeId::new(), a.id, b.id, EdgeKind::Default)).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), b.id, c.id, EdgeKind::Default)).unwrap();

        let outcome = trigger(&g, &[b.id, c.id]);
        assert!(outcome.success);
        assert_eq!(outcome.suggested_path, vec![a.id, b.id, c.id]);
    }
}
