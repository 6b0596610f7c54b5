//! Benchmarks for graph pathing and equivalence-class assignment.

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use timeloop_engine::equivalence::EquivalenceEngine;
use timeloop_engine::graph::{traverse, DayGraph, TimeBounds};
use timeloop_engine::ids::{EpochId, GraphId, KnowledgeStateId, LoopId, NodeId};
use timeloop_engine::model::loop_::EmotionalState;
use timeloop_engine::model::{GraphNode, NodeKind, Outcome, OutcomeType};
use timeloop_engine::time_slot::TimeSlot;

/// A branching graph of `width` parallel chains of `depth` nodes each,
/// merging back into a single terminal node, so `all_simple_paths` has
/// `width` distinct routes to exercise the bound.
fn branching_graph(width: usize, depth: usize) -> (DayGraph, NodeId, NodeId) {
    let bounds = TimeBounds { start: TimeSlot::new(0, 0).unwrap(), end: TimeSlot::new(23, 59).unwrap() };
    let start = NodeId::new();
    let mut graph = DayGraph::new(GraphId::new(), "bench", bounds, start);
    graph.add_node(GraphNode::new(start, NodeKind::Event, TimeSlot::new(0, 0).unwrap(), "start")).unwrap();

    let terminal = NodeId::new();
    graph.add_node(GraphNode::new(terminal, NodeKind::Event, TimeSlot::new(23, 0).unwrap(), "end")).unwrap();

    for lane in 0..width {
        let mut prev = start;
        for step in 0..depth {
            let hour = (1 + step % 20) as u8;
            let node = NodeId::new();
            graph
                .add_node(GraphNode::new(node, NodeKind::Event, TimeSlot::new(hour, 0).unwrap(), format!("lane {lane} step {step}")))
                .unwrap();
            graph.add_edge(timeloop_engine::model::GraphEdge::new(
                timeloop_engine::ids::EdgeId::new(),
                prev,
                node,
                timeloop_engine::model::EdgeKind::Default,
            ))
            .unwrap();
            prev = node;
        }
        graph
            .add_edge(timeloop_engine::model::GraphEdge::new(
                timeloop_engine::ids::EdgeId::new(),
                prev,
                terminal,
                timeloop_engine::model::EdgeKind::Default,
            ))
            .unwrap();
    }
    (graph, start, terminal)
}

fn bench_shortest_path(c: &mut Criterion) {
    let (graph, start, terminal) = branching_graph(16, 8);
    c.bench_function("shortest_path_16x8", |b| {
        b.iter(|| black_box(traverse::shortest_path(&graph, start, terminal).unwrap()))
    });
}

fn bench_all_simple_paths(c: &mut Criterion) {
    let (graph, start, terminal) = branching_graph(16, 8);
    c.bench_function("all_simple_paths_16x8_bounded_1000", |b| {
        b.iter(|| black_box(traverse::all_simple_paths(&graph, start, terminal, 1000)))
    });
}

fn bench_reachability(c: &mut Criterion) {
    let (graph, _, _) = branching_graph(16, 8);
    c.bench_function("reachability_16x8", |b| b.iter(|| black_box(traverse::reachability(&graph))));
}

fn completed_loop(decisions: Vec<usize>) -> timeloop_engine::model::Loop {
    let mut loop_ = timeloop_engine::model::Loop::start(
        LoopId::new(),
        1,
        EpochId::new(),
        GraphId::new(),
        KnowledgeStateId::new(),
        EmotionalState::Hopeful,
        Utc::now(),
    );
    loop_.decision_vector = decisions;
    loop_.outcome = Some(Outcome::new(OutcomeType::DayEnd, NodeId::new(), Utc::now()));
    loop_
}

fn bench_equivalence_assign(c: &mut Criterion) {
    let engine = EquivalenceEngine::new();
    let loops: Vec<_> = (0..200).map(|i| completed_loop(vec![i % 3, (i / 3) % 3])).collect();
    c.bench_function("equivalence_assign_200_loops", |b| {
        b.iter(|| {
            for loop_ in &loops {
                black_box(engine.assign(loop_, &[], &[]));
            }
        })
    });
}

criterion_group!(benches, bench_shortest_path, bench_all_simple_paths, bench_reachability, bench_equivalence_assign);
criterion_main!(benches);
