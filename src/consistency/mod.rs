//! Consistency / contradiction detector (component F): three independent
//! passes producing a merged report, plus a fast quick-check predicate.

pub mod knowledge;
pub mod outcome_path;
pub mod temporal;

use crate::graph::DayGraph;
use crate::model::issue::ValidationReport;
use crate::model::{KnowledgeState, Loop};

/// Runs all three passes against a loop, its graph, and its knowledge-state
/// lineage, merging their issues into one report.
pub fn check_loop(loop_: &Loop, graph: &DayGraph, lineage: &[KnowledgeState]) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.merge(knowledge::check_lineage(lineage));
    report.merge(outcome_path::check(loop_, graph));
    report.merge(temporal::check(loop_, graph));
    report
}

/// A fast boolean-first check for cheap UI feedback: short-circuits to
/// `(false, first_errors)` as soon as any pass fails.
pub fn quick_loop_check(loop_: &Loop, graph: &DayGraph) -> (bool, Vec<String>) {
    let path_report = outcome_path::check(loop_, graph);
    if !path_report.valid() {
        return (false, path_report.errors().take(3).map(|i| i.message.clone()).collect());
    }
    let temporal_report = temporal::check(loop_, graph);
    if !temporal_report.valid() {
        return (false, temporal_report.errors().take(3).map(|i| i.message.clone()).collect());
    }
    (true, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TimeBounds;
    use crate::ids::{EdgeId, EpochId, GraphId, KnowledgeStateId, LoopId, NodeId};
    use crate::model::loop_::EmotionalState;
    use crate::model::{EdgeKind, GraphEdge, GraphNode, NodeKind, Outcome, OutcomeType};
    use crate::time_slot::TimeSlot;
    use chrono::Utc;

    #[test]
    fn quick_check_passes_for_a_well_formed_loop() {
        let bounds = TimeBounds { start: TimeSlot::new(0, 0).unwrap(), end: TimeSlot::new(23, 59).unwrap() };
        let a = GraphNode::new(NodeId::new(), NodeKind::Event, TimeSlot::new(6, 0).unwrap(), "a");
        let death = GraphNode::new(NodeId::new(), NodeKind::Death, TimeSlot::new(7, 0).unwrap(), "d");
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, a.id);
        g.add_node(a.clone()).unwrap();
        g.add_node(death.clone()).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), a.id, death.id, EdgeKind::Default)).unwrap();

        let mut loop_ = Loop::start(
            LoopId::new(),
            1,
            EpochId::new(),
            GraphId::new(),
            KnowledgeStateId::new(),
            EmotionalState::Hopeful,
            Utc::now(),
        );
        loop_.path = Some(vec![a.id, death.id]);
        loop_.outcome = Some(Outcome::new(OutcomeType::Death, death.id, Utc::now()));

        let (ok, _) = quick_loop_check(&loop_, &g);
        assert!(ok);
    }
}
