//! Entity identifiers.
//!
//! Every addressable entity in the engine (node, edge, loop, knowledge state,
//! epoch, equivalence class) carries a UUID-v4 identity, matching the
//! persisted project artifact's id format (spec.md §6). Ids are stored on
//! entities as plain values — never as pointers — so cyclic references
//! (loop <-> equivalence class) remain representable and remappable on
//! import (spec.md §9 Design Notes).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A UUID-v4 identifier, newtyped per entity kind via the macro below so the
/// type system catches a `NodeId` passed where a `LoopId` was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declares a zero-cost newtype wrapper around [`EntityId`] for a specific
/// entity kind, with the Display/Deserialize plumbing entities need.
macro_rules! entity_id_kind {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub EntityId);

        impl $name {
            pub fn new() -> Self {
                Self(EntityId::new())
            }

            pub fn parse(s: &str) -> Option<Self> {
                EntityId::parse(s).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<EntityId> for $name {
            fn from(id: EntityId) -> Self {
                Self(id)
            }
        }
    };
}

entity_id_kind!(NodeId);
entity_id_kind!(EdgeId);
entity_id_kind!(GraphId);
entity_id_kind!(LoopId);
entity_id_kind!(KnowledgeStateId);
entity_id_kind!(EpochId);
entity_id_kind!(EquivalenceClassId);
entity_id_kind!(ArcId);
entity_id_kind!(ModeId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_parse() {
        let id = NodeId::new();
        let text = id.to_string();
        assert_eq!(NodeId::parse(&text), Some(id));
    }

    #[test]
    fn distinct_kinds_do_not_compare_equal_by_construction() {
        // Compile-time guarantee: NodeId and LoopId are distinct types,
        // so this module would fail to compile if they were interchangeable.
        let node = NodeId::new();
        let _loop_id: LoopId = LoopId::from(node.0);
    }
}
