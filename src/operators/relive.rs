//! `relive(ref_loop, max_deviation)`: exact replay when `max_deviation == 0`,
//! otherwise the closest reachable path to the same terminal.

use crate::equivalence::distance::hamming_distance;
use crate::graph::{traverse, DayGraph};
use crate::model::Loop;

use super::OperatorOutcome;

/// Caps the exhaustive search so a branch-heavy graph can't make this
/// operator pathological; matches the bound `vary` uses.
const SEARCH_CAP: usize = 500;

fn path_is_connected(graph: &DayGraph, path: &[crate::ids::NodeId]) -> bool {
    path.windows(2).all(|pair| graph.neighbors(pair[0]).contains(&pair[1]))
}

pub fn relive(graph: &DayGraph, ref_loop: &Loop, max_deviation: usize) -> OperatorOutcome {
    let Some(ref_path) = &ref_loop.path else {
        return OperatorOutcome::failure("reference loop has no recorded path");
    };
    let Some(&terminal) = ref_path.last() else {
        return OperatorOutcome::failure("reference loop's path is empty");
    };

    if max_deviation == 0 {
        if path_is_connected(graph, ref_path) {
            let decisions = graph.decisions_along_path(ref_path);
            return OperatorOutcome::success(ref_path.clone(), decisions, 1.0, "exact replay of the reference loop's path");
        }
        return OperatorOutcome::failure("the reference loop's path no longer exists in this graph");
    }

    let candidates = traverse::all_simple_paths(graph, graph.start_node_id, terminal, SEARCH_CAP);
    let mut best: Option<(Vec<crate::ids::NodeId>, usize)> = None;
    for path in candidates {
        let decisions = graph.decisions_along_path(&path);
        let indices: Vec<usize> = decisions.iter().map(|(_, idx)| *idx).collect();
        let dist = hamming_distance(&indices, &ref_loop.decision_vector);
        if dist <= max_deviation && best.as_ref().map_or(true, |(_, best_dist)| dist < *best_dist) {
            best = Some((path, dist));
        }
    }

    match best {
        Some((path, dist)) => {
            let decisions = graph.decisions_along_path(&path);
            let probability = 1.0 - (dist as f64 / (max_deviation.max(1) as f64 + 1.0));
            OperatorOutcome::success(path, decisions, probability, format!("path to the same terminal at hamming distance {dist}"))
        }
        None => OperatorOutcome::failure(format!(
            "no reachable path to the reference's terminal within hamming distance {max_deviation}"
        )),
    }
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

    #[test]
    fn exact_replay_returns_the_same_path() {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let a = event(6);
        let b = event(7);
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, a.id);
        g.add_node(a.clone()).unwrap();
        g.add_node(b.clone()).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), a.id, b.id, EdgeKind::Default)).unwrap();

        let mut loop_ = Loop::start(LoopId::new(), 1, EpochId::new(), GraphId::new(), KnowledgeStateId::new(), EmotionalState::Hopeful, Utc::now());
        loop_.path = Some(vec![a.id, b.id]);

        let outcome = relive(&g, &loop_, 0);
        assert!(outcome.success);
        assert_eq!(outcome.suggested_path, vec![a.id, b.id]);
    }

    #[test]
    fn exact_replay_fails_when_path_no_longer_exists() {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let a = event(6);
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, a.id);
        g.add_node(a.clone()).unwrap();

        let mut loop_ = Loop::start(LoopId::new(), 1, EpochId::new(), GraphId::new(), KnowledgeStateId::new(), EmotionalState::Hopeful, Utc::now());
        loop_.path = Some(vec![a.id, NodeId::new()]);

        let outcome = relive(&g, &loop_, 0);
        assert!(!outcome.success);
    }
}
