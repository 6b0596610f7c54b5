//! `vary(ref_loop, min_deviation, max_deviation)`: any reachable path whose
//! hamming distance to the reference falls in `[min_deviation, max_deviation]`.

use crate::equivalence::distance::hamming_distance;
use crate::graph::{traverse, DayGraph};
use crate::model::Loop;

use super::OperatorOutcome;

const SEARCH_CAP_PER_TERMINAL: usize = 200;

pub fn vary(graph: &DayGraph, ref_loop: &Loop, min_deviation: usize, max_deviation: usize) -> OperatorOutcome {
    if min_deviation > max_deviation {
        return OperatorOutcome::failure("min_deviation must not exceed max_deviation");
    }

    let terminals = traverse::reachable_terminals(graph, graph.start_node_id);
    for terminal in terminals {
        let candidates = traverse::all_simple_paths(graph, graph.start_node_id, terminal, SEARCH_CAP_PER_TERMINAL);
        for path in candidates {
            let decisions = graph.decisions_along_path(&path);
            let indices: Vec<usize> = decisions.iter().map(|(_, idx)| *idx).collect();
            let dist = hamming_distance(&indices, &ref_loop.decision_vector);
            if dist >= min_deviation && dist <= max_deviation {
                return OperatorOutcome::success(
                    path,
                    decisions,
                    1.0,
                    format!("found a reachable path at hamming distance {dist}"),
                );
            }
        }
    }

    OperatorOutcome::failure(format!(
        "no reachable path exists with hamming distance in [{min_deviation}, {max_deviation}] of the reference"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TimeBounds;
    use crate::ids::{EdgeId, EpochId, GraphId, KnowledgeStateId, LoopId, NodeId};
    use crate::model::loop_::EmotionalState;
    use crate::model::{EdgeKind, GraphEdge, GraphNode, NodeKind};
    use crate::time_slot::TimeSlot;
    use chrono::Utc;

    fn slot(h: u8) -> TimeSlot {
        TimeSlot::new(h, 0).unwrap()
    }

    fn event(h: u8) -> GraphNode {
        GraphNode::new(NodeId::new(), NodeKind::Event, slot(h), "n")
    }

    fn diamond() -> (DayGraph, Loop) {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let mut decision = event(6);
        decision.kind = NodeKind::Decision;
        let b = event(7);
        let c = event(7);
        let d = event(8);
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, decision.id);
        for n in [&decision, &b, &c, &d] {
            g.add_node(n.clone()).unwrap();
        }
        g.add_edge(GraphEdge::new(EdgeId::new(), decision.id, b.id, EdgeKind::Choice)).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), decision.id, c.id, EdgeKind::Choice)).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), b.id, d.id, EdgeKind::Default)).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), c.id, d.id, EdgeKind::Default)).unwrap();

        let mut loop_ = Loop::start(LoopId::new(), 1, EpochId::new(), GraphId::new(), KnowledgeStateId::new(), EmotionalState::Hopeful, Utc::now());
        loop_.decision_vector = vec![0];
        (g, loop_)
    }

    #[test]
    fn finds_the_alternate_branch_at_distance_one() {
        let (g, loop_) = diamond();
        let outcome = vary(&g, &loop_, 1, 1);
        assert!(outcome.success);
    }

    #[test]
    fn fails_when_range_is_unreachable() {
        let (g, loop_) = diamond();
        let outcome = vary(&g, &loop_, 5, 5);
        assert!(!outcome.success);
    }
}
