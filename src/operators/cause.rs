//! `cause(target)`: path toward one node, or the nearest/all of a set.

use crate::graph::{traverse, DayGraph};
use crate::ids::NodeId;

use super::{MultiTargetMode, OperatorOutcome};

pub fn cause(graph: &DayGraph, targets: &[NodeId], mode: MultiTargetMode) -> OperatorOutcome {
    if targets.is_empty() {
        return OperatorOutcome::failure("no targets given");
    }
    for &target in targets {
        if graph.node(target).is_none() {
            return OperatorOutcome::failure(format!("unknown target: {target}"));
        }
    }

    match mode {
        MultiTargetMode::Any => cause_any(graph, targets),
        MultiTargetMode::All => cause_all(graph, targets),
    }
}

fn cause_any(graph: &DayGraph, targets: &[NodeId]) -> OperatorOutcome {
    let mut best: Option<Vec<NodeId>> = None;
    for &target in targets {
        if let Ok(path) = traverse::shortest_path(graph, graph.start_node_id, target) {
            if best.as_ref().map_or(true, |b| path.len() < b.len()) {
                best = Some(path);
            }
        }
    }
    match best {
        Some(path) => {
            let decisions = graph.decisions_along_path(&path);
            OperatorOutcome::success(path, decisions, 1.0, "shortest path to the nearest reachable target")
        }
        None => OperatorOutcome::failure("none of the targets are reachable from the start node"),
    }
}

/// Greedy nearest-neighbour ordering, then checkpoint-stitched through all
/// targets. Not a minimal-length tour (that's NP-hard in general); this is
/// a practical heuristic over day-sized graphs.
fn cause_all(graph: &DayGraph, targets: &[NodeId]) -> OperatorOutcome {
    let mut remaining: Vec<NodeId> = targets.to_vec();
    let mut order = Vec::new();
    let mut cursor = graph.start_node_id;

    while !remaining.is_empty() {
        let mut nearest: Option<(usize, usize)> = None; // (index in remaining, path length)
        for (i, &target) in remaining.iter().enumerate() {
            if let Ok(path) = traverse::shortest_path(graph, cursor, target) {
                if nearest.map_or(true, |(_, len)| path.len() < len) {
                    nearest = Some((i, path.len()));
                }
            }
        }
        match nearest {
            Some((i, _)) => {
                let target = remaining.remove(i);
                order.push(target);
                cursor = target;
            }
            None => return OperatorOutcome::failure("not all targets are reachable from the start node"),
        }
    }

    match traverse::checkpoint_path(graph, &order) {
        Ok(path) => {
            let decisions = graph.decisions_along_path(&path);
            OperatorOutcome::success(path, decisions, 1.0, "checkpoint path through all targets in a greedy nearest-neighbour order")
        }
        Err(e) => OperatorOutcome::failure(e.to_string()),
    }
}
