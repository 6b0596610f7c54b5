//! Workspace: a single project's live, in-memory state (spec.md §3
//! "Ownership & lifecycle", §5 "Shared-resource policy" — supplemented per
//! SPEC_FULL.md §2, grounded on the teacher's `engine::Engine` facade, which
//! composes the VSA ops/item-memory/graph/store subsystems behind one API
//! the same way `Workspace` composes the day graph, loop store, knowledge
//! store, equivalence engine, epoch table, and arc registry).

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::equivalence::EquivalenceEngine;
use crate::error::ConfigError;
use crate::graph::{DayGraph, TimeBounds};
use crate::ids::{EntityId, EpochId, GraphId, NodeId};
use crate::model::Epoch;
use crate::project::{self, GraphDocument, ProjectArtifact, ProjectResult, ProjectSettings};
use crate::resolution::ArcRegistry;
use crate::store::knowledge::KnowledgeStateStore;
use crate::store::LoopStore;

pub type WorkspaceResult<T> = ProjectResult<T>;

/// Cache sizing and pathing defaults, loadable from TOML (SPEC_FULL.md §0.3),
/// mirroring `WorkspaceConfig::load`/`save` in the teacher's `workspace.rs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_path_cache_size")]
    pub path_cache_size: usize,
    #[serde(default = "default_template_cache_size")]
    pub template_cache_size: usize,
    #[serde(default = "default_max_paths")]
    pub default_max_paths: usize,
    #[serde(default = "default_max_deviation")]
    pub default_max_deviation: u32,
}

fn default_path_cache_size() -> usize {
    256
}
fn default_template_cache_size() -> usize {
    64
}
fn default_max_paths() -> usize {
    1_000
}
fn default_max_deviation() -> u32 {
    3
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path_cache_size: default_path_cache_size(),
            template_cache_size: default_template_cache_size(),
            default_max_paths: default_max_paths(),
            default_max_deviation: default_max_deviation(),
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// A project's full live state: one day graph, its loop history, knowledge
/// lineages, equivalence classes, epochs, and resolution arcs, with a dirty
/// flag so callers know when a save is owed (spec.md Design Notes: "Re-model
/// as explicit `Workspace` ... values threaded as parameters").
pub struct Workspace {
    pub id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub config: EngineConfig,
    graph: DayGraph,
    loops: LoopStore,
    knowledge_states: KnowledgeStateStore,
    equivalence: EquivalenceEngine,
    epochs: HashMap<EpochId, Epoch>,
    pub arcs: ArcRegistry,
    dirty: bool,
}

impl Workspace {
    pub fn new(name: impl Into<String>, time_bounds: TimeBounds, start_node_id: NodeId) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            description: None,
            config: EngineConfig::default(),
            graph: DayGraph::new(GraphId::new(), "day one", time_bounds, start_node_id),
            loops: LoopStore::new(),
            knowledge_states: KnowledgeStateStore::new(),
            equivalence: EquivalenceEngine::new(),
            epochs: HashMap::new(),
            arcs: ArcRegistry::new(),
            dirty: false,
        }
    }

    pub fn graph(&self) -> &DayGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut DayGraph {
        self.dirty = true;
        &mut self.graph
    }

    pub fn loops(&self) -> &LoopStore {
        &self.loops
    }

    pub fn knowledge_states(&self) -> &KnowledgeStateStore {
        &self.knowledge_states
    }

    pub fn equivalence(&self) -> &EquivalenceEngine {
        &self.equivalence
    }

    pub fn epoch(&self, id: EpochId) -> Option<&Epoch> {
        self.epochs.get(&id)
    }

    pub fn epochs(&self) -> impl Iterator<Item = &Epoch> {
        self.epochs.values()
    }

    pub fn insert_epoch(&mut self, epoch: Epoch) {
        self.dirty = true;
        self.epochs.insert(epoch.id, epoch);
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Exports the full live state as a persisted project artifact
    /// (spec.md §6).
    pub fn to_artifact(&self) -> ProjectArtifact {
        let now = Utc::now();
        ProjectArtifact {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            created_at: now,
            updated_at: now,
            graph: GraphDocument::from_graph(&self.graph),
            epochs: self.epochs.values().cloned().collect(),
            loops: self.loops.all(),
            equivalence_classes: self.equivalence.all(),
            knowledge_states: self.knowledge_states.all(),
            settings: ProjectSettings {
                default_max_paths: Some(self.config.default_max_paths),
                default_max_deviation: Some(self.config.default_max_deviation),
                extra: serde_json::Map::new(),
            },
        }
    }

    /// Rebuilds a workspace from a persisted artifact, keeping every id as
    /// written. Used for a plain save/load round trip of a project's own
    /// file, where ids must stay stable across sessions.
    pub fn from_artifact(artifact: ProjectArtifact) -> WorkspaceResult<Self> {
        let graph = artifact.graph.into_graph()?;

        let loops = LoopStore::new();
        for loop_ in artifact.loops {
            loops.restore(loop_);
        }

        let knowledge_states = KnowledgeStateStore::new();
        for ks in artifact.knowledge_states {
            knowledge_states.restore(ks);
        }

        let equivalence = EquivalenceEngine::new();
        for class in artifact.equivalence_classes {
            equivalence.restore(class);
        }

        let mut epochs = HashMap::new();
        for epoch in artifact.epochs {
            epochs.insert(epoch.id, epoch);
        }

        let mut config = EngineConfig::default();
        if let Some(max_paths) = artifact.settings.default_max_paths {
            config.default_max_paths = max_paths;
        }
        if let Some(max_deviation) = artifact.settings.default_max_deviation {
            config.default_max_deviation = max_deviation;
        }

        Ok(Self {
            id: artifact.id,
            name: artifact.name,
            description: artifact.description,
            config,
            graph,
            loops,
            knowledge_states,
            equivalence,
            epochs,
            arcs: ArcRegistry::new(),
            dirty: false,
        })
    }

    /// Rebuilds a workspace from an externally-sourced artifact, regenerating
    /// every id first (spec.md §6 "Import/remap") so it can be merged into
    /// existing state without collisions.
    pub fn import_artifact(artifact: ProjectArtifact) -> WorkspaceResult<Self> {
        Self::from_artifact(project::import(artifact))
    }

    pub fn save_to_file(&self, path: &Path) -> WorkspaceResult<()> {
        let artifact = self.to_artifact();
        let json = artifact.to_json()?;
        std::fs::write(path, json).map_err(|e| crate::error::ProjectError::Io { source: e })
    }

    pub fn load_from_file(path: &Path) -> WorkspaceResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| crate::error::ProjectError::Io { source: e })?;
        let artifact = ProjectArtifact::from_json(&text)?;
        Self::from_artifact(artifact)
    }

    pub fn import_from_file(path: &Path) -> WorkspaceResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| crate::error::ProjectError::Io { source: e })?;
        let artifact = ProjectArtifact::from_json(&text)?;
        Self::import_artifact(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_slot::TimeSlot;

    fn bounds() -> TimeBounds {
        TimeBounds { start: TimeSlot::new(0, 0).unwrap(), end: TimeSlot::new(23, 59).unwrap() }
    }

    #[test]
    fn new_workspace_is_clean() {
        let ws = Workspace::new("test", bounds(), NodeId::new());
        assert!(!ws.is_dirty());
    }

    #[test]
    fn mutating_the_graph_marks_the_workspace_dirty() {
        let mut ws = Workspace::new("test", bounds(), NodeId::new());
        let node = crate::model::GraphNode::new(NodeId::new(), crate::model::NodeKind::Event, TimeSlot::new(8, 0).unwrap(), "n");
        ws.graph_mut().add_node(node).unwrap();
        assert!(ws.is_dirty());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("engine.toml");
        let cfg = EngineConfig { default_max_paths: 42, ..Default::default() };
        cfg.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        assert_eq!(loaded.default_max_paths, 42);
    }

    #[test]
    fn artifact_round_trip_preserves_graph_shape() {
        let start = NodeId::new();
        let mut ws = Workspace::new("roundtrip", bounds(), start);
        let node = crate::model::GraphNode::new(start, crate::model::NodeKind::Event, TimeSlot::new(6, 0).unwrap(), "wake up");
        ws.graph_mut().add_node(node).unwrap();

        let artifact = ws.to_artifact();
        let rebuilt = Workspace::from_artifact(artifact).unwrap();
        assert_eq!(rebuilt.graph().node_count(), 1);
    }

    #[test]
    fn artifact_round_trip_preserves_loops_and_knowledge_and_classes() {
        use crate::model::loop_::EmotionalState;
        use crate::model::{Fact, Outcome, OutcomeType};
        use crate::ids::{EpochId, GraphId, KnowledgeStateId, LoopId};

        let start = NodeId::new();
        let ws = Workspace::new("roundtrip", bounds(), start);

        let ks_id = KnowledgeStateId::new();
        ws.knowledge_states.insert_root(ks_id);
        ws.knowledge_states.update(ks_id, Fact::new("met_arin", serde_json::json!(true), 1.0));

        let loop_id = LoopId::new();
        let started = ws.loops.start_loop(loop_id, EpochId::new(), GraphId::new(), ks_id, EmotionalState::Hopeful, Utc::now());
        let outcome = Outcome::new(OutcomeType::DayEnd, start, Utc::now());
        let completed = ws.loops.complete_loop(loop_id, ks_id, EmotionalState::Calm, vec![start], outcome, Utc::now()).unwrap();
        let class_id = ws.equivalence.assign(&completed, &[], &[]);
        ws.loops.set_equivalence_class(loop_id, class_id).unwrap();
        let _ = started;

        let artifact = ws.to_artifact();
        let rebuilt = Workspace::from_artifact(artifact).unwrap();

        assert_eq!(rebuilt.loops().len(), 1);
        assert_eq!(rebuilt.loops().get(loop_id).unwrap().equivalence_class_id, Some(class_id));
        assert_eq!(
            rebuilt.knowledge_states().get(ks_id).unwrap().fact("met_arin").unwrap().value,
            serde_json::json!(true)
        );
        assert_eq!(rebuilt.equivalence().get(class_id).unwrap().member_count, 1);
    }
}
