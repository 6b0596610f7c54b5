//! Knowledge-state store: lineage-tracked snapshots with stable,
//! order-independent hashing of fact sets (used by component D to detect
//! when two loops ended with the same knowledge).

use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::ids::KnowledgeStateId;
use crate::model::{Fact, KnowledgeState};

#[derive(Debug, Default)]
pub struct KnowledgeStateStore {
    states: DashMap<KnowledgeStateId, KnowledgeState>,
}

impl KnowledgeStateStore {
    pub fn new() -> Self {
        Self { states: DashMap::new() }
    }

    pub fn insert_root(&self, id: KnowledgeStateId) -> KnowledgeState {
        let state = KnowledgeState::new_root(id);
        self.states.insert(id, state.clone());
        state
    }

    pub fn insert_child(&self, id: KnowledgeStateId, parent_id: KnowledgeStateId) -> Option<KnowledgeState> {
        let parent = self.states.get(&parent_id)?.clone();
        let child = KnowledgeState::child(id, &parent);
        self.states.insert(id, child.clone());
        Some(child)
    }

    /// Inserts an already-built knowledge state as-is, for reconstructing a
    /// store from a persisted project artifact.
    pub fn restore(&self, state: KnowledgeState) {
        self.states.insert(state.id, state);
    }

    pub fn get(&self, id: KnowledgeStateId) -> Option<KnowledgeState> {
        self.states.get(&id).map(|r| r.clone())
    }

    pub fn update(&self, id: KnowledgeStateId, fact: Fact) -> Option<KnowledgeState> {
        let mut entry = self.states.get_mut(&id)?;
        entry.set_fact(fact);
        Some(entry.clone())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn all(&self) -> Vec<KnowledgeState> {
        self.states.iter().map(|r| r.clone()).collect()
    }
}

/// Stable 64-hex-character hash of a fact set, independent of insertion
/// order: facts are sorted by key before hashing so two knowledge states
/// with the same facts (in any order) hash identically.
pub fn hash_facts(facts: &[Fact]) -> String {
    let mut sorted: Vec<&Fact> = facts.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));

    let mut hasher = Sha256::new();
    for fact in sorted {
        hasher.update(fact.key.as_bytes());
        hasher.update([0u8]);
        hasher.update(fact.value.to_string().as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_order_independent() {
        let a = vec![
            Fact::new("b", serde_json::json!(2), 1.0),
            Fact::new("a", serde_json::json!(1), 1.0),
        ];
        let b = vec![
            Fact::new("a", serde_json::json!(1), 1.0),
            Fact::new("b", serde_json::json!(2), 1.0),
        ];
        assert_eq!(hash_facts(&a), hash_facts(&b));
    }

    #[test]
    fn hash_differs_on_value_change() {
        let a = vec![Fact::new("a", serde_json::json!(1), 1.0)];
        let b = vec![Fact::new("a", serde_json::json!(2), 1.0)];
        assert_ne!(hash_facts(&a), hash_facts(&b));
    }

    #[test]
    fn hash_is_64_lowercase_hex_chars() {
        let hash = hash_facts(&[]);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn child_state_inherits_then_can_be_updated_independently() {
        let store = KnowledgeStateStore::new();
        let root_id = KnowledgeStateId::new();
        store.insert_root(root_id);
        store.update(root_id, Fact::new("k", serde_json::json!(true), 1.0));

        let child_id = KnowledgeStateId::new();
        let child = store.insert_child(child_id, root_id).unwrap();
        assert_eq!(child.fact("k").unwrap().value, serde_json::json!(true));

        store.update(child_id, Fact::new("k", serde_json::json!(false), 1.0));
        assert_eq!(store.get(root_id).unwrap().fact("k").unwrap().value, serde_json::json!(true));
        assert_eq!(store.get(child_id).unwrap().fact("k").unwrap().value, serde_json::json!(false));
    }
}
