//! Pathing over a [`DayGraph`]: shortest path, bounded all-simple-paths,
//! checkpoint stitching, and reachability analysis (spec.md §4.B).

use std::collections::{HashSet, VecDeque};

use crate::error::PathingError;
use crate::ids::NodeId;

use super::DayGraph;

pub type PathingResult<T> = std::result::Result<T, PathingError>;

/// Nodes reachable/unreachable from the graph's start node, and nodes with
/// no outgoing edges at all (dead ends, terminal or otherwise).
#[derive(Debug, Clone, Default)]
pub struct Reachability {
    pub reachable: HashSet<NodeId>,
    pub unreachable: Vec<NodeId>,
    pub dead_ends: Vec<NodeId>,
}

/// BFS from `graph.start_node_id`. Any node not visited is unreachable.
pub fn reachability(graph: &DayGraph) -> Reachability {
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::new();
    if graph.node(graph.start_node_id).is_some() {
        reachable.insert(graph.start_node_id);
        queue.push_back(graph.start_node_id);
    }
    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(current) {
            if reachable.insert(next) {
                queue.push_back(next);
            }
        }
    }

    let mut unreachable = Vec::new();
    let mut dead_ends = Vec::new();
    for node in graph.nodes() {
        if !reachable.contains(&node.id) {
            unreachable.push(node.id);
        }
        if graph.out_degree(node.id) == 0 {
            dead_ends.push(node.id);
        }
    }
    Reachability { reachable, unreachable, dead_ends }
}

pub fn can_reach(graph: &DayGraph, from: NodeId, to: NodeId) -> bool {
    if from == to {
        return graph.node(from).is_some();
    }
    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);
    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(current) {
            if next == to {
                return true;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

/// Shortest path by hop count (BFS, unweighted) from `from` to `to`,
/// inclusive of both endpoints.
pub fn shortest_path(graph: &DayGraph, from: NodeId, to: NodeId) -> PathingResult<Vec<NodeId>> {
    if graph.node(from).is_none() {
        return Err(PathingError::UnknownTarget { target: from.to_string() });
    }
    if graph.node(to).is_none() {
        return Err(PathingError::UnknownTarget { target: to.to_string() });
    }
    if from == to {
        return Ok(vec![from]);
    }

    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);
    let mut parent: std::collections::HashMap<NodeId, NodeId> = std::collections::HashMap::new();

    while let Some(current) = queue.pop_front() {
        for next in graph.neighbors(current) {
            if visited.insert(next) {
                parent.insert(next, current);
                if next == to {
                    let mut path = vec![to];
                    let mut cursor = to;
                    while let Some(&p) = parent.get(&cursor) {
                        path.push(p);
                        cursor = p;
                        if cursor == from {
                            break;
                        }
                    }
                    path.reverse();
                    return Ok(path);
                }
                queue.push_back(next);
            }
        }
    }

    Err(PathingError::NoPath { from: from.to_string(), to: to.to_string() })
}

/// All simple (no repeated node) paths from `from` to `to`, bounded by
/// `max_paths` to keep branch-heavy graphs from exploding combinatorially.
pub fn all_simple_paths(graph: &DayGraph, from: NodeId, to: NodeId, max_paths: usize) -> Vec<Vec<NodeId>> {
    let mut results = Vec::new();
    let mut stack = vec![from];
    let mut on_stack = HashSet::from([from]);
    dfs_paths(graph, from, to, &mut stack, &mut on_stack, &mut results, max_paths);
    results
}

fn dfs_paths(
    graph: &DayGraph,
    current: NodeId,
    target: NodeId,
    stack: &mut Vec<NodeId>,
    on_stack: &mut HashSet<NodeId>,
    results: &mut Vec<Vec<NodeId>>,
    max_paths: usize,
) {
    if results.len() >= max_paths {
        return;
    }
    if current == target {
        results.push(stack.clone());
        return;
    }
    for next in graph.neighbors(current) {
        if results.len() >= max_paths {
            return;
        }
        if on_stack.insert(next) {
            stack.push(next);
            dfs_paths(graph, next, target, stack, on_stack, results, max_paths);
            stack.pop();
            on_stack.remove(&next);
        }
    }
}

/// Stitches shortest paths between consecutive checkpoints, starting from
/// the graph's start node, into a single path visiting each in order.
pub fn checkpoint_path(graph: &DayGraph, checkpoints: &[NodeId]) -> PathingResult<Vec<NodeId>> {
    let mut full = vec![graph.start_node_id];
    let mut cursor = graph.start_node_id;
    for (step, &checkpoint) in checkpoints.iter().enumerate() {
        let hop = shortest_path(graph, cursor, checkpoint).map_err(|_| PathingError::UnachievableSequence {
            step,
            node: checkpoint.to_string(),
        })?;
        full.extend(hop.into_iter().skip(1));
        cursor = checkpoint;
    }
    Ok(full)
}

/// Terminal nodes (no outgoing edges) reachable from `from`.
pub fn reachable_terminals(graph: &DayGraph, from: NodeId) -> Vec<NodeId> {
    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);
    let mut terminals = Vec::new();
    while let Some(current) = queue.pop_front() {
        let neighbors = graph.neighbors(current);
        if neighbors.is_empty() {
            terminals.push(current);
        }
        for next in neighbors {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    terminals
}

/// Nodes that can reach `target` (reverse reachability), via predecessor BFS.
pub fn can_reach_set(graph: &DayGraph, target: NodeId) -> HashSet<NodeId> {
    let mut visited = HashSet::from([target]);
    let mut queue = VecDeque::from([target]);
    while let Some(current) = queue.pop_front() {
        for prev in graph.predecessors(current) {
            if visited.insert(prev) {
                queue.push_back(prev);
            }
        }
    }
    visited
}
