// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # timeloop-engine
//!
//! An engine for time-loop narrative construction: a day's events and
//! choices form a graph, each traversal is a "loop", and repeated loops
//! are grouped into equivalence classes by how they end.
//!
//! ## Architecture
//!
//! - **Day graph** (`graph`): the control-flow DAG of one day, petgraph-backed
//! - **Loop store** (`store`): every loop played, and knowledge-state lineages
//! - **Equivalence engine** (`equivalence`): groups loops by outcome + ending knowledge
//! - **Operators** (`operators`): `cause`/`avoid`/`trigger`/`relive`/`vary` path heuristics
//! - **Consistency checker** (`consistency`): cross-entity validation passes
//! - **Narrative engine** (`narrative`): template language, vocabulary, prose renderers
//! - **Resolution-mode manager** (`resolution`): story arcs resolvable multiple ways
//! - **Performance utilities** (`perf`): LRU/tiered cache, memoize, paging, batching
//!
//! ## Library usage
//!
//! ```no_run
//! use timeloop_engine::graph::TimeBounds;
//! use timeloop_engine::ids::NodeId;
//! use timeloop_engine::model::{GraphNode, NodeKind};
//! use timeloop_engine::time_slot::TimeSlot;
//! use timeloop_engine::workspace::Workspace;
//!
//! let start = NodeId::new();
//! let bounds = TimeBounds { start: TimeSlot::new(0, 0).unwrap(), end: TimeSlot::new(23, 59).unwrap() };
//! let mut ws = Workspace::new("my-story", bounds, start);
//! let wake_up = GraphNode::new(start, NodeKind::Event, TimeSlot::new(6, 0).unwrap(), "wake up");
//! ws.graph_mut().add_node(wake_up).unwrap();
//! ```

pub mod consistency;
pub mod equivalence;
pub mod error;
pub mod graph;
pub mod ids;
pub mod model;
pub mod narrative;
pub mod operators;
pub mod perf;
pub mod project;
pub mod resolution;
pub mod store;
pub mod time_slot;
pub mod workspace;
