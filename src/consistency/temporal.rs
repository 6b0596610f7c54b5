//! Temporal checks (spec.md §4.F.3): monotonic time along a path, sane
//! loop timestamps.

use crate::graph::DayGraph;
use crate::model::issue::{IssueCategory, ValidationIssue, ValidationReport};
use crate::model::Loop;

pub fn check(loop_: &Loop, graph: &DayGraph) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Some(ended_at) = loop_.ended_at {
        if loop_.started_at > ended_at {
            report.push(
                ValidationIssue::error(format!(
                    "loop {} started at {} after it ended at {}",
                    loop_.id, loop_.started_at, ended_at
                ))
                .with_category(IssueCategory::Temporal)
                .with_repair("Fix started_at/ended_at so the loop ends no earlier than it starts."),
            );
        }
    }

    if let Some(path) = &loop_.path {
        for pair in path.windows(2) {
            let (current, next) = (pair[0], pair[1]);
            let (Some(current_node), Some(next_node)) = (graph.node(current), graph.node(next)) else {
                continue;
            };
            if current_node.time_flexible || next_node.time_flexible {
                continue;
            }
            if next_node.time_slot < current_node.time_slot {
                report.push(
                    ValidationIssue::error(format!(
                        "path goes backward in time from {} ({}) to {} ({})",
                        current, current_node.time_slot, next, next_node.time_slot
                    ))
                    .with_category(IssueCategory::Temporal)
                    .with_repair("Mark one of the nodes time_flexible, or reorder the path."),
                );
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TimeBounds;
    use crate::ids::{EdgeId, EpochId, GraphId, KnowledgeStateId, LoopId};
    use crate::model::loop_::EmotionalState;
    use crate::model::{EdgeKind, GraphEdge, GraphNode, NodeKind};
    use crate::time_slot::TimeSlot;
    use chrono::{Duration, Utc};

    fn slot(h: u8) -> TimeSlot {
        TimeSlot::new(h, 0).unwrap()
    }

    #[test]
    fn backward_time_between_inflexible_nodes_is_an_error() {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let early = GraphNode::new(crate::ids::NodeId::new(), NodeKind::Event, slot(9), "early");
        let late = GraphNode::new(crate::ids::NodeId::new(), NodeKind::Event, slot(8), "late");
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, early.id);
        g.add_node(early.clone()).unwrap();
        g.add_node(late.clone()).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), early.id, late.id, EdgeKind::Default)).unwrap();

        let mut loop_ = Loop::start(LoopId::new(), 1, EpochId::new(), GraphId::new(), KnowledgeStateId::new(), EmotionalState::Hopeful, Utc::now());
        loop_.path = Some(vec![early.id, late.id]);

        let report = check(&loop_, &g);
        assert!(!report.valid());
    }

    #[test]
    fn backward_time_is_allowed_when_flexible() {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let early = GraphNode::new(crate::ids::NodeId::new(), NodeKind::Event, slot(9), "early");
        let mut late = GraphNode::new(crate::ids::NodeId::new(), NodeKind::Event, slot(8), "late");
        late.time_flexible = true;
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, early.id);
        g.add_node(early.clone()).unwrap();
        g.add_node(late.clone()).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), early.id, late.id, EdgeKind::Default)).unwrap();

        let mut loop_ = Loop::start(LoopId::new(), 1, EpochId::new(), GraphId::new(), KnowledgeStateId::new(), EmotionalState::Hopeful, Utc::now());
        loop_.path = Some(vec![early.id, late.id]);

        let report = check(&loop_, &g);
        assert!(report.valid());
    }

    #[test]
    fn ended_before_started_is_an_error() {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let a = GraphNode::new(crate::ids::NodeId::new(), NodeKind::Event, slot(9), "a");
        let g = {
            let mut g = DayGraph::new(GraphId::new(), "day", bounds, a.id);
            g.add_node(a.clone()).unwrap();
            g
        };
        let now = Utc::now();
        let mut loop_ = Loop::start(LoopId::new(), 1, EpochId::new(), GraphId::new(), KnowledgeStateId::new(), EmotionalState::Hopeful, now);
        loop_.ended_at = Some(now - Duration::seconds(60));

        let report = check(&loop_, &g);
        assert!(!report.valid());
    }
}
