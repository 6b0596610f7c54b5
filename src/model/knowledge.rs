//! Knowledge state data model (spec.md §3 "Knowledge state").

use serde::{Deserialize, Serialize};

use crate::ids::KnowledgeStateId;

/// One piece of knowledge the protagonist holds, with a certainty and an
/// optional list of fact keys that contradict it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub key: String,
    pub value: serde_json::Value,
    pub certainty: f32,
    #[serde(default)]
    pub contradicted_by: Option<Vec<String>>,
}

impl Fact {
    pub fn new(key: impl Into<String>, value: serde_json::Value, certainty: f32) -> Self {
        Self {
            key: key.into(),
            value,
            certainty: certainty.clamp(0.0, 1.0),
            contradicted_by: None,
        }
    }
}

/// A versioned snapshot of everything the protagonist knows at a point in a
/// loop. Lineages form a tree via `parent_id`; facts are monotone within a
/// lineage unless explicitly contradicted (spec.md §3 invariant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeState {
    pub id: KnowledgeStateId,
    pub version: u32,
    pub parent_id: Option<KnowledgeStateId>,
    pub facts: Vec<Fact>,
}

impl KnowledgeState {
    pub fn new_root(id: KnowledgeStateId) -> Self {
        Self {
            id,
            version: 1,
            parent_id: None,
            facts: Vec::new(),
        }
    }

    pub fn child(id: KnowledgeStateId, parent: &KnowledgeState) -> Self {
        Self {
            id,
            version: parent.version + 1,
            parent_id: Some(parent.id),
            facts: parent.facts.clone(),
        }
    }

    pub fn fact(&self, key: &str) -> Option<&Fact> {
        self.facts.iter().find(|f| f.key == key)
    }

    pub fn set_fact(&mut self, fact: Fact) {
        if let Some(existing) = self.facts.iter_mut().find(|f| f.key == fact.key) {
            *existing = fact;
        } else {
            self.facts.push(fact);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_inherits_parent_facts() {
        let mut root = KnowledgeState::new_root(KnowledgeStateId::new());
        root.set_fact(Fact::new("door_locked", serde_json::json!(true), 1.0));

        let child = KnowledgeState::child(KnowledgeStateId::new(), &root);
        assert_eq!(child.version, 2);
        assert_eq!(child.parent_id, Some(root.id));
        assert_eq!(child.fact("door_locked").unwrap().value, serde_json::json!(true));
    }

    #[test]
    fn set_fact_overwrites_existing_key() {
        let mut state = KnowledgeState::new_root(KnowledgeStateId::new());
        state.set_fact(Fact::new("k", serde_json::json!(1), 1.0));
        state.set_fact(Fact::new("k", serde_json::json!(2), 0.5));
        assert_eq!(state.facts.len(), 1);
        assert_eq!(state.fact("k").unwrap().value, serde_json::json!(2));
    }
}
