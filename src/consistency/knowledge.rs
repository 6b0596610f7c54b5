//! Knowledge contradiction checks (spec.md §4.F.1).

use std::collections::HashMap;

use crate::ids::KnowledgeStateId;
use crate::model::issue::{IssueCategory, ValidationIssue, ValidationReport};
use crate::model::KnowledgeState;

/// Checks every state in `lineage` for duplicate-key contradictions and
/// dangling `contradicted_by` references, then checks each parent/child pair
/// for facts that silently disappeared.
pub fn check_lineage(lineage: &[KnowledgeState]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let by_id: HashMap<KnowledgeStateId, &KnowledgeState> = lineage.iter().map(|s| (s.id, s)).collect();

    for state in lineage {
        check_single_state(state, &mut report);
    }

    for state in lineage {
        let Some(parent_id) = state.parent_id else { continue };
        let Some(&parent) = by_id.get(&parent_id) else { continue };
        check_parent_child(parent, state, &mut report);
    }

    report
}

fn check_single_state(state: &KnowledgeState, report: &mut ValidationReport) {
    let mut by_key: HashMap<&str, Vec<&serde_json::Value>> = HashMap::new();
    for fact in &state.facts {
        by_key.entry(fact.key.as_str()).or_default().push(&fact.value);
    }
    for (key, values) in &by_key {
        let mut distinct: Vec<&&serde_json::Value> = Vec::new();
        for v in values {
            if !distinct.contains(&v) {
                distinct.push(v);
            }
        }
        if distinct.len() >= 2 {
            report.push(
                ValidationIssue::error(format!(
                    "knowledge state {} has {} distinct values for fact key \"{}\"",
                    state.id,
                    distinct.len(),
                    key
                ))
                .with_category(IssueCategory::Knowledge)
                .with_entity_ref(state.id.to_string())
                .with_repair(format!("Resolve fact \"{key}\" to a single value or mark the others contradicted_by it.")),
            );
        }
    }

    let known_keys: std::collections::HashSet<&str> = state.facts.iter().map(|f| f.key.as_str()).collect();
    for fact in &state.facts {
        let Some(contradicted) = &fact.contradicted_by else { continue };
        for other_key in contradicted {
            if !known_keys.contains(other_key.as_str()) {
                report.push(
                    ValidationIssue::warning(format!(
                        "knowledge state {} fact \"{}\" names contradicted_by id \"{}\", which does not exist",
                        state.id, fact.key, other_key
                    ))
                    .with_category(IssueCategory::Knowledge)
                    .with_entity_ref(state.id.to_string())
                    .with_repair(format!("Remove the dangling contradicted_by reference or add fact \"{other_key}\".")),
                );
            }
        }
    }
}

fn check_parent_child(parent: &KnowledgeState, child: &KnowledgeState, report: &mut ValidationReport) {
    for parent_fact in &parent.facts {
        if child.fact(&parent_fact.key).is_some() {
            continue;
        }
        let named_by_child = child
            .facts
            .iter()
            .any(|f| f.contradicted_by.as_ref().is_some_and(|list| list.iter().any(|k| k == &parent_fact.key)));
        if !named_by_child {
            report.push(
                ValidationIssue::warning(format!(
                    "fact \"{}\" disappeared between knowledge state {} and its child {}",
                    parent_fact.key, parent.id, child.id
                ))
                .with_category(IssueCategory::Knowledge)
                .with_entity_ref(child.id.to_string())
                .with_repair(format!("Add fact \"{}\" to {}, or name it in a contradicted_by list.", parent_fact.key, child.id)),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fact;

    #[test]
    fn duplicate_values_for_one_key_is_an_error() {
        let mut state = KnowledgeState::new_root(KnowledgeStateId::new());
        state.facts.push(Fact::new("door", serde_json::json!("locked"), 1.0));
        state.facts.push(Fact::new("door", serde_json::json!("open"), 1.0));
        let report = check_lineage(&[state]);
        assert!(!report.valid());
    }

    #[test]
    fn dangling_contradicted_by_is_a_warning() {
        let mut state = KnowledgeState::new_root(KnowledgeStateId::new());
        let mut fact = Fact::new("door", serde_json::json!("locked"), 1.0);
        fact.contradicted_by = Some(vec!["nonexistent".to_string()]);
        state.facts.push(fact);
        let report = check_lineage(&[state]);
        assert!(report.valid());
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn fact_disappearing_without_being_named_is_a_warning() {
        let mut root = KnowledgeState::new_root(KnowledgeStateId::new());
        root.facts.push(Fact::new("door", serde_json::json!("locked"), 1.0));
        let child = KnowledgeState { id: KnowledgeStateId::new(), version: 2, parent_id: Some(root.id), facts: vec![] };
        let report = check_lineage(&[root, child]);
        assert_eq!(report.warnings().count(), 1);
    }

    #[test]
    fn fact_disappearing_while_named_contradicted_is_clean() {
        let mut root = KnowledgeState::new_root(KnowledgeStateId::new());
        root.facts.push(Fact::new("door", serde_json::json!("locked"), 1.0));
        let mut replacement = Fact::new("door_state", serde_json::json!("gone"), 1.0);
        replacement.contradicted_by = Some(vec!["door".to_string()]);
        let child = KnowledgeState {
            id: KnowledgeStateId::new(),
            version: 2,
            parent_id: Some(root.id),
            facts: vec![replacement],
        };
        let report = check_lineage(&[root, child]);
        assert!(report.warnings().next().is_none());
    }
}
