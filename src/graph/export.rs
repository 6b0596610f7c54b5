//! DOT and Mermaid encodings of a [`DayGraph`] (spec.md §4.B / §6).

use std::fmt::Write as _;

use super::DayGraph;
use crate::model::NodeKind;

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn node_shape(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Decision => "diamond",
        NodeKind::Death | NodeKind::Reset => "doublecircle",
        NodeKind::Location => "house",
        _ => "box",
    }
}

/// Renders the graph as Graphviz DOT.
pub fn to_dot(graph: &DayGraph) -> String {
    let mut out = String::new();
    writeln!(out, "digraph \"{}\" {{", escape(&graph.name)).unwrap();
    writeln!(out, "  rankdir=LR;").unwrap();
    for node in graph.nodes() {
        let marker = if node.id == graph.start_node_id { " (start)" } else { "" };
        writeln!(
            out,
            "  \"{}\" [label=\"{} {}{}\" shape={}];",
            node.id,
            node.time_slot,
            escape(&node.label),
            marker,
            node_shape(node.kind)
        )
        .unwrap();
    }
    for edge in graph.edges() {
        let label = edge.label.as_deref().unwrap_or("");
        writeln!(out, "  \"{}\" -> \"{}\" [label=\"{}\"];", edge.source, edge.target, escape(label)).unwrap();
    }
    out.push_str("}\n");
    out
}

/// Renders the graph as a Mermaid flowchart.
pub fn to_mermaid(graph: &DayGraph) -> String {
    let mut out = String::new();
    out.push_str("flowchart LR\n");
    for node in graph.nodes() {
        let (open, close) = match node.kind {
            NodeKind::Decision => ("{", "}"),
            NodeKind::Death | NodeKind::Reset => ("((", "))"),
            _ => ("[", "]"),
        };
        writeln!(out, "  {}{}\"{} {}\"{}", node.id, open, node.time_slot, escape(&node.label), close).unwrap();
    }
    for edge in graph.edges() {
        match &edge.label {
            Some(label) if !label.is_empty() => {
                writeln!(out, "  {} -->|{}| {}", edge.source, escape(label), edge.target).unwrap();
            }
            _ => {
                writeln!(out, "  {} --> {}", edge.source, edge.target).unwrap();
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TimeBounds;
    use crate::ids::{GraphId, NodeId};
    use crate::model::GraphNode;
    use crate::time_slot::TimeSlot;

    fn bounds() -> TimeBounds {
        TimeBounds { start: TimeSlot::new(0, 0).unwrap(), end: TimeSlot::new(23, 59).unwrap() }
    }

    #[test]
    fn dot_contains_node_and_marks_start() {
        let start_id = NodeId::new();
        let mut g = DayGraph::new(GraphId::new(), "day one", bounds(), start_id);
        g.add_node(GraphNode::new(start_id, NodeKind::Event, TimeSlot::new(8, 0).unwrap(), "Wake up")).unwrap();
        let dot = to_dot(&g);
        assert!(dot.contains("digraph"));
        assert!(dot.contains("Wake up"));
        assert!(dot.contains("(start)"));
    }

    #[test]
    fn mermaid_uses_diamond_for_decisions() {
        let start_id = NodeId::new();
        let mut g = DayGraph::new(GraphId::new(), "day one", bounds(), start_id);
        g.add_node(GraphNode::new(start_id, NodeKind::Decision, TimeSlot::new(8, 0).unwrap(), "Choose")).unwrap();
        let mermaid = to_mermaid(&g);
        assert!(mermaid.contains("flowchart LR"));
        assert!(mermaid.contains('{'));
    }
}
