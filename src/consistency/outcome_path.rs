//! Outcome/path checks (spec.md §4.F.2): a loop's recorded path and
//! decisions must be coherent with its graph and outcome.

use crate::graph::DayGraph;
use crate::model::issue::{IssueCategory, ValidationIssue, ValidationReport};
use crate::model::{Loop, NodeKind};

pub fn check(loop_: &Loop, graph: &DayGraph) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Some(outcome) = &loop_.outcome {
        if graph.node(outcome.terminal_node_id).is_none() {
            report.push(
                ValidationIssue::error(format!("outcome terminal node {} does not exist in the graph", outcome.terminal_node_id))
                    .with_category(IssueCategory::Reference)
                    .with_repair("Change the terminal to a node present in the graph."),
            );
        } else if let Some(required) = outcome.outcome_type.required_terminal_kind() {
            let actual = graph.node(outcome.terminal_node_id).map(|n| n.kind);
            if actual != Some(required) {
                report.push(
                    ValidationIssue::error(format!(
                        "outcome type {} requires a {} terminal node, but {} is {}",
                        outcome.outcome_type,
                        required,
                        outcome.terminal_node_id,
                        actual.map(|k| k.to_string()).unwrap_or_else(|| "missing".into())
                    ))
                    .with_category(IssueCategory::Structural)
                    .with_repair(format!("Change the terminal to a reachable {required} node.")),
                );
            }
        }
    }

    if let Some(path) = &loop_.path {
        let connected = path.windows(2).all(|pair| graph.neighbors(pair[0]).contains(&pair[1]));
        if !connected {
            report.push(
                ValidationIssue::error("recorded path is not connected by existing edges")
                    .with_category(IssueCategory::Reference)
                    .with_repair("Re-derive the path from the graph, or fix the broken hop."),
            );
        }

        if let Some(outcome) = &loop_.outcome {
            if path.last() != Some(&outcome.terminal_node_id) {
                report.push(
                    ValidationIssue::error("recorded path does not reach the outcome's terminal node")
                        .with_category(IssueCategory::Reference)
                        .with_repair("Extend the path to the terminal, or change the outcome's terminal to match."),
                );
            }
        }

        for decision in &loop_.decisions {
            if !path.contains(&decision.node_id) {
                report.push(
                    ValidationIssue::error(format!("decision at node {} does not appear on the recorded path", decision.node_id))
                        .with_category(IssueCategory::Reference)
                        .with_repair("Add the decision node to the path or remove the stray decision."),
                );
            }
        }
    }

    for decision in &loop_.decisions {
        match graph.node(decision.node_id) {
            Some(node) if node.kind == NodeKind::Decision => {}
            _ => report.push(
                ValidationIssue::warning(format!("decision references node {}, which is not a decision node", decision.node_id))
                    .with_category(IssueCategory::Structural)
                    .with_repair("Point the decision at a decision-kind node."),
            ),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TimeBounds;
    use crate::ids::{EdgeId, EpochId, GraphId, KnowledgeStateId, LoopId, NodeId};
    use crate::model::loop_::EmotionalState;
    use crate::model::{Decision, EdgeKind, GraphEdge, GraphNode, Outcome, OutcomeType};
    use crate::time_slot::TimeSlot;
    use chrono::Utc;

    fn bounds() -> TimeBounds {
        TimeBounds { start: TimeSlot::new(0, 0).unwrap(), end: TimeSlot::new(23, 59).unwrap() }
    }

    #[test]
    fn missing_terminal_is_an_error() {
        let a = GraphNode::new(NodeId::new(), NodeKind::Event, TimeSlot::new(6, 0).unwrap(), "a");
        let g = {
            let mut g = DayGraph::new(GraphId::new(), "day", bounds(), a.id);
            g.add_node(a.clone()).unwrap();
            g
        };
        let mut loop_ = Loop::start(LoopId::new(), 1, EpochId::new(), GraphId::new(), KnowledgeStateId::new(), EmotionalState::Hopeful, Utc::now());
        loop_.outcome = Some(Outcome::new(OutcomeType::DayEnd, NodeId::new(), Utc::now()));
        let report = check(&loop_, &g);
        assert!(!report.valid());
    }

    #[test]
    fn decision_on_non_decision_node_is_a_warning() {
        let a = GraphNode::new(NodeId::new(), NodeKind::Event, TimeSlot::new(6, 0).unwrap(), "a");
        let b = GraphNode::new(NodeId::new(), NodeKind::Event, TimeSlot::new(7, 0).unwrap(), "b");
        let mut g = DayGraph::new(GraphId::new(), "day", bounds(), a.id);
        g.add_node(a.clone()).unwrap();
        g.add_node(b.clone()).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), a.id, b.id, EdgeKind::Default)).unwrap();

        let mut loop_ = Loop::start(LoopId::new(), 1, EpochId::new(), GraphId::new(), KnowledgeStateId::new(), EmotionalState::Hopeful, Utc::now());
        loop_.path = Some(vec![a.id, b.id]);
        loop_.decisions.push(Decision::new(a.id, 0, Utc::now()));
        let report = check(&loop_, &g);
        assert!(report.valid());
        assert_eq!(report.warnings().count(), 1);
    }
}
