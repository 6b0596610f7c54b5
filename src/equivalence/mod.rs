//! Equivalence engine (component D): groups loops that ended the same way.

pub mod distance;

use std::collections::HashMap;

use chrono::Utc;
use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::ids::{EpochId, EquivalenceClassId, LoopId};
use crate::model::equivalence::SAMPLE_CAP;
use crate::model::{EquivalenceClass, Fact, Loop, Outcome};
use crate::store::knowledge::hash_facts;

fn sha256_hex(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

/// `H(outcome.type ‖ terminal_node_id ‖ canonical(world_state_delta) ‖ canonical(characters_affected))`.
pub fn outcome_hash(outcome: &Outcome) -> String {
    let mut delta_parts: Vec<String> = outcome
        .world_state_delta
        .as_ref()
        .map(|d| d.changes.iter().map(|(k, v)| format!("{k}={v}")).collect())
        .unwrap_or_default();
    delta_parts.sort();

    let mut character_parts: Vec<String> = outcome
        .characters_affected
        .as_ref()
        .map(|cs| cs.iter().map(|c| format!("{}={}", c.character, c.state)).collect())
        .unwrap_or_default();
    character_parts.sort();

    sha256_hex(&[
        outcome.outcome_type.to_string().as_str(),
        outcome.terminal_node_id.to_string().as_str(),
        delta_parts.join(",").as_str(),
        character_parts.join(",").as_str(),
    ])
}

pub fn knowledge_end_hash(facts: &[Fact]) -> String {
    hash_facts(facts)
}

pub fn composite_hash(outcome_hash: &str, knowledge_end_hash: &str) -> String {
    sha256_hex(&[outcome_hash, knowledge_end_hash])
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn centroid(vectors: &[Vec<usize>]) -> Vec<f64> {
    let max_len = vectors.iter().map(Vec::len).max().unwrap_or(0);
    (0..max_len)
        .map(|i| mean(&vectors.iter().filter_map(|v| v.get(i)).map(|&x| x as f64).collect::<Vec<_>>()))
        .collect()
}

fn variance(vectors: &[Vec<usize>], centroid: &[f64]) -> f64 {
    if centroid.is_empty() {
        return 0.0;
    }
    let per_position: Vec<f64> = centroid
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let samples: Vec<f64> = vectors.iter().filter_map(|v| v.get(i)).map(|&x| (x as f64 - c).powi(2)).collect();
            mean(&samples)
        })
        .collect();
    mean(&per_position)
}

fn common_tags(samples: &[&Loop]) -> Vec<String> {
    let mut iter = samples.iter();
    let Some(first) = iter.next() else { return Vec::new() };
    let mut common: Vec<String> = first.tags.clone();
    for loop_ in iter {
        common.retain(|tag| loop_.tags.contains(tag));
    }
    common.sort();
    common
}

/// Maintains the set of equivalence classes as loops complete.
#[derive(Debug, Default)]
pub struct EquivalenceEngine {
    classes: DashMap<EquivalenceClassId, EquivalenceClass>,
    by_composite_hash: DashMap<String, EquivalenceClassId>,
    /// Full membership per class, independent of the capped `sample_loop_ids`
    /// carried on the data model. This is what makes `assign` idempotent:
    /// without it, `member_count`/`per_epoch_distribution` would double-count
    /// a loop re-assigned after its class already has `SAMPLE_CAP` samples.
    members: DashMap<EquivalenceClassId, std::collections::HashSet<LoopId>>,
}

impl EquivalenceEngine {
    pub fn new() -> Self {
        Self { classes: DashMap::new(), by_composite_hash: DashMap::new(), members: DashMap::new() }
    }

    pub fn get(&self, id: EquivalenceClassId) -> Option<EquivalenceClass> {
        self.classes.get(&id).map(|r| r.clone())
    }

    pub fn all(&self) -> Vec<EquivalenceClass> {
        self.classes.iter().map(|r| r.clone()).collect()
    }

    /// Inserts an already-built equivalence class as-is, for reconstructing
    /// the engine from a persisted project artifact. The persisted artifact
    /// only carries the capped `sample_loop_ids`, not the full membership, so
    /// membership tracking is seeded from that sample; loops outside it that
    /// get re-assigned after a reload are (at worst) treated as new members.
    pub fn restore(&self, class: EquivalenceClass) {
        self.by_composite_hash.insert(class.composite_hash.clone(), class.id);
        self.members.insert(class.id, class.sample_loop_ids.iter().copied().collect());
        self.classes.insert(class.id, class);
    }

    /// Idempotent: re-assigning the same loop recomputes the same class
    /// membership rather than duplicating it (spec.md §9 Open Question 1).
    pub fn assign(&self, loop_: &Loop, end_facts: &[Fact], all_loops_in_class: &[&Loop]) -> EquivalenceClassId {
        let outcome = loop_.outcome.as_ref().expect("assign is only called on completed loops with an outcome");
        let o_hash = outcome_hash(outcome);
        let k_hash = knowledge_end_hash(end_facts);
        let c_hash = composite_hash(&o_hash, &k_hash);

        if let Some(existing_id) = self.by_composite_hash.get(&c_hash).map(|r| *r) {
            self.refresh(existing_id, loop_, &o_hash, &k_hash, all_loops_in_class);
            return existing_id;
        }

        let id = EquivalenceClassId::new();
        let now = Utc::now();
        let mut per_epoch = HashMap::new();
        per_epoch.insert(loop_.epoch_id, 1);
        let class = EquivalenceClass {
            id,
            outcome_hash: o_hash.clone(),
            knowledge_end_hash: k_hash.clone(),
            composite_hash: c_hash.clone(),
            representative_loop_id: loop_.id,
            sample_loop_ids: vec![loop_.id],
            member_count: 1,
            per_epoch_distribution: per_epoch,
            outcome_summary: outcome.outcome_type.to_string(),
            knowledge_delta_summary: String::new(),
            common_tags: loop_.tags.clone(),
            decision_vector_centroid: Some(loop_.decision_vector.iter().map(|&x| x as f64).collect()),
            decision_vector_variance: Some(0.0),
            first_occurrence_loop_id: loop_.id,
            last_occurrence_loop_id: loop_.id,
            created_at: now,
            updated_at: now,
            narrative_template: None,
        };
        self.classes.insert(id, class);
        self.by_composite_hash.insert(c_hash, id);
        self.members.insert(id, std::iter::once(loop_.id).collect());
        id
    }

    fn refresh(&self, id: EquivalenceClassId, loop_: &Loop, o_hash: &str, k_hash: &str, samples: &[&Loop]) {
        let already_member = self.members.get(&id).is_some_and(|m| m.contains(&loop_.id));
        if already_member {
            // Re-assigning a loop already counted in this class: recompute
            // nothing and leave member_count/per_epoch_distribution untouched.
            return;
        }

        let Some(mut class) = self.classes.get_mut(&id) else { return };
        debug_assert_eq!(class.outcome_hash, o_hash);
        debug_assert_eq!(class.knowledge_end_hash, k_hash);

        self.members.entry(id).or_default().insert(loop_.id);

        class.member_count += 1;
        class.last_occurrence_loop_id = loop_.id;
        if !class.sample_loop_ids.contains(&loop_.id) {
            class.sample_loop_ids.push(loop_.id);
            class.sample_loop_ids.truncate(SAMPLE_CAP);
        }
        *class.per_epoch_distribution.entry(loop_.epoch_id).or_insert(0) += 1;

        let mut all_samples: Vec<&Loop> = samples.to_vec();
        all_samples.push(loop_);
        class.common_tags = common_tags(&all_samples);

        let vectors: Vec<Vec<usize>> = all_samples.iter().map(|l| l.decision_vector.clone()).collect();
        let c = centroid(&vectors);
        class.decision_vector_variance = Some(variance(&vectors, &c));
        class.decision_vector_centroid = Some(c);
        class.updated_at = Utc::now();
    }

    /// Drops a class entirely once its last member is removed.
    pub fn remove_member(&self, class_id: EquivalenceClassId, loop_id: LoopId) {
        if let Some(mut members) = self.members.get_mut(&class_id) {
            members.remove(&loop_id);
        }
        let should_delete = {
            let Some(mut class) = self.classes.get_mut(&class_id) else { return };
            class.member_count = class.member_count.saturating_sub(1);
            class.sample_loop_ids.retain(|&id| id != loop_id);
            class.member_count == 0
        };
        if should_delete {
            if let Some((_, class)) = self.classes.remove(&class_id) {
                self.by_composite_hash.remove(&class.composite_hash);
            }
            self.members.remove(&class_id);
        }
    }

    pub fn by_epoch(&self, epoch_id: EpochId) -> Vec<EquivalenceClass> {
        self.classes
            .iter()
            .filter(|r| r.per_epoch_distribution.contains_key(&epoch_id))
            .map(|r| r.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{EpochId, GraphId, KnowledgeStateId, NodeId};
    use crate::model::loop_::EmotionalState;
    use crate::model::OutcomeType;

    fn completed_loop(epoch: EpochId, outcome: Outcome, decisions: Vec<usize>) -> Loop {
        let mut loop_ = Loop::start(
            LoopId::new(),
            1,
            epoch,
            GraphId::new(),
            KnowledgeStateId::new(),
            EmotionalState::Hopeful,
            Utc::now(),
        );
        loop_.decision_vector = decisions;
        loop_.outcome = Some(outcome);
        loop_
    }

    #[test]
    fn identical_outcomes_join_the_same_class() {
        let engine = EquivalenceEngine::new();
        let epoch = EpochId::new();
        let terminal = NodeId::new();
        let outcome = Outcome::new(OutcomeType::Death, terminal, Utc::now());
        let l1 = completed_loop(epoch, outcome.clone(), vec![0, 1]);
        let l2 = completed_loop(epoch, outcome, vec![1, 0]);

        let c1 = engine.assign(&l1, &[], &[]);
        let c2 = engine.assign(&l2, &[], &[&l1]);
        assert_eq!(c1, c2);
        assert_eq!(engine.get(c1).unwrap().member_count, 2);
    }

    #[test]
    fn reassigning_the_same_loop_does_not_double_count_it() {
        let engine = EquivalenceEngine::new();
        let epoch = EpochId::new();
        let outcome = Outcome::new(OutcomeType::Death, NodeId::new(), Utc::now());
        let l1 = completed_loop(epoch, outcome, vec![0, 1]);

        let c1 = engine.assign(&l1, &[], &[]);
        let c2 = engine.assign(&l1, &[], &[]);
        assert_eq!(c1, c2);
        let class = engine.get(c1).unwrap();
        assert_eq!(class.member_count, 1);
        assert_eq!(*class.per_epoch_distribution.get(&epoch).unwrap(), 1);
    }

    #[test]
    fn different_outcomes_create_distinct_classes() {
        let engine = EquivalenceEngine::new();
        let epoch = EpochId::new();
        let l1 = completed_loop(epoch, Outcome::new(OutcomeType::Death, NodeId::new(), Utc::now()), vec![0]);
        let l2 = completed_loop(epoch, Outcome::new(OutcomeType::DayEnd, NodeId::new(), Utc::now()), vec![0]);

        let c1 = engine.assign(&l1, &[], &[]);
        let c2 = engine.assign(&l2, &[], &[]);
        assert_ne!(c1, c2);
    }

    #[test]
    fn removing_the_last_member_deletes_the_class() {
        let engine = EquivalenceEngine::new();
        let epoch = EpochId::new();
        let outcome = Outcome::new(OutcomeType::Death, NodeId::new(), Utc::now());
        let l1 = completed_loop(epoch, outcome, vec![0]);
        let class_id = engine.assign(&l1, &[], &[]);
        engine.remove_member(class_id, l1.id);
        assert!(engine.get(class_id).is_none());
    }
}
