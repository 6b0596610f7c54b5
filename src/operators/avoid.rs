//! `avoid(target)`: shortest path from start to any terminal that never
//! passes through the given node set (BFS on the graph with targets
//! removed).

use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::DayGraph;
use crate::ids::NodeId;

use super::OperatorOutcome;

pub fn avoid(graph: &DayGraph, avoided: &[NodeId]) -> OperatorOutcome {
    let avoided: HashSet<NodeId> = avoided.iter().copied().collect();
    if avoided.contains(&graph.start_node_id) {
        return OperatorOutcome::failure("the start node itself is in the avoided set");
    }

    let mut visited = HashSet::from([graph.start_node_id]);
    let mut queue = VecDeque::from([graph.start_node_id]);
    let mut parent: HashMap<NodeId, NodeId> = HashMap::new();

    while let Some(current) = queue.pop_front() {
        if graph.out_degree(current) == 0 {
            let mut path = vec![current];
            let mut cursor = current;
            while let Some(&p) = parent.get(&cursor) {
                path.push(p);
                cursor = p;
            }
            path.reverse();
            let decisions = graph.decisions_along_path(&path);
            return OperatorOutcome::success(path, decisions, 1.0, "reached a terminal without passing through any avoided node");
        }
        for next in graph.neighbors(current) {
            if avoided.contains(&next) {
                continue;
            }
            if visited.insert(next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }

    OperatorOutcome::failure("every path from start to a terminal passes through an avoided node")
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

    fn event(h: u8, kind: NodeKind) -> GraphNode {
        GraphNode::new(NodeId::new(), kind, slot(h), "n")
    }

    #[test]
    fn routes_around_an_avoided_node() {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let a = event(6, NodeKind::Event);
        let b = event(7, NodeKind::Event);
        let c = event(7, NodeKind::Event);
        let d = event(8, NodeKind::Death);
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, a.id);
        for n in [&a, &b, &c, &d] {
            g.add_node(n.clone()).unwrap();
        }
        g.add_edge(GraphEdge::new(EdgeId::new(), a.id, b.id, EdgeKind::Default)).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), a.id, c.id, EdgeKind::Default)).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), b.id, d.id, EdgeKind::Default)).unwrap();

        let outcome = avoid(&g, &[b.id]);
        assert!(outcome.success);
        assert!(!outcome.suggested_path.contains(&b.id));
    }

    #[test]
    fn fails_when_every_path_is_blocked() {
        let bounds = TimeBounds { start: slot(0), end: slot(23) };
        let a = event(6, NodeKind::Event);
        let b = event(7, NodeKind::Death);
        let mut g = DayGraph::new(GraphId::new(), "day", bounds, a.id);
        g.add_node(a.clone()).unwrap();
        g.add_node(b.clone()).unwrap();
        g.add_edge(GraphEdge::new(EdgeId::new(), a.id, b.id, EdgeKind::Default)).unwrap();

        let outcome = avoid(&g, &[b.id]);
        assert!(!outcome.success);
    }
}
