//! Project persistence and import round-trip tests: verify that saving a
//! workspace to disk and reloading it recovers the same state, and that
//! importing a project document regenerates ids without losing data.

use chrono::Utc;

use timeloop_engine::graph::TimeBounds;
use timeloop_engine::ids::{EpochId, GraphId, KnowledgeStateId, LoopId, NodeId};
use timeloop_engine::model::loop_::EmotionalState;
use timeloop_engine::model::{Fact, GraphNode, NodeKind, Outcome, OutcomeType};
use timeloop_engine::time_slot::TimeSlot;
use timeloop_engine::workspace::Workspace;

fn slot(h: u8) -> TimeSlot {
    TimeSlot::new(h, 0).unwrap()
}

fn sample_workspace() -> Workspace {
    let start_id = NodeId::new();
    let bounds = TimeBounds { start: slot(0), end: slot(23) };
    let mut ws = Workspace::new("day one", bounds, start_id);
    ws.graph_mut().add_node(GraphNode::new(start_id, NodeKind::Event, slot(6), "wake up")).unwrap();

    let ks_id = KnowledgeStateId::new();
    ws.knowledge_states().insert_root(ks_id);
    ws.knowledge_states().update(ks_id, Fact::new("met_arin", serde_json::json!(true), 1.0));

    let loop_id = LoopId::new();
    ws.loops().start_loop(loop_id, EpochId::new(), GraphId::new(), ks_id, EmotionalState::Hopeful, Utc::now());
    let outcome = Outcome::new(OutcomeType::DayEnd, start_id, Utc::now());
    ws.loops().complete_loop(loop_id, ks_id, EmotionalState::Calm, vec![start_id], outcome, Utc::now()).unwrap();

    ws
}

#[test]
fn workspace_survives_a_save_and_reload_cycle() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("project.json");

    let ws = sample_workspace();
    ws.save_to_file(&path).unwrap();

    let reloaded = Workspace::load_from_file(&path).unwrap();
    assert_eq!(reloaded.graph().node_count(), ws.graph().node_count());
    assert_eq!(reloaded.loops().len(), 1);
    assert_eq!(reloaded.knowledge_states().len(), 1);
}

#[test]
fn importing_a_saved_project_regenerates_ids_but_keeps_the_counts() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("project.json");

    let ws = sample_workspace();
    let original_start = ws.graph().start_node_id;
    ws.save_to_file(&path).unwrap();

    let imported = Workspace::import_from_file(&path).unwrap();
    assert_ne!(imported.graph().start_node_id, original_start);
    assert_eq!(imported.graph().node_count(), ws.graph().node_count());
    assert_eq!(imported.loops().len(), ws.loops().len());
    assert_eq!(imported.knowledge_states().len(), ws.knowledge_states().len());
}

#[test]
fn importing_twice_from_the_same_file_never_collides() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("project.json");
    sample_workspace().save_to_file(&path).unwrap();

    let a = Workspace::import_from_file(&path).unwrap();
    let b = Workspace::import_from_file(&path).unwrap();
    assert_ne!(a.graph().start_node_id, b.graph().start_node_id);
}
