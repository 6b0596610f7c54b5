//! Structural, single-entity schema validation (spec.md §4.A).
//!
//! Given an entity kind and a raw JSON value, returns every structural
//! violation in one pass — no early exit. Schemas are compiled once (lazily,
//! behind a `OnceLock`) and inter-schema field specs are shared by reference.

use std::sync::OnceLock;

use serde_json::Value;

use crate::model::issue::{IssueCategory, ValidationIssue, ValidationReport};
use crate::time_slot::TimeSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Edge,
    Decision,
    Outcome,
    KnowledgeState,
    Loop,
    Epoch,
    EquivalenceClass,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Edge => "edge",
            EntityKind::Decision => "decision",
            EntityKind::Outcome => "outcome",
            EntityKind::KnowledgeState => "knowledge_state",
            EntityKind::Loop => "loop",
            EntityKind::Epoch => "epoch",
            EntityKind::EquivalenceClass => "equivalence_class",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    String,
    Bool,
    Number,
    TimeSlot,
    Hash64,
    Uuid,
    Array,
    Object,
    Enum(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    name: &'static str,
    required: bool,
    kind: FieldKind,
}

const fn req(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, required: true, kind }
}

const fn opt(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec { name, required: false, kind }
}

fn schema_for(kind: EntityKind) -> &'static [FieldSpec] {
    static TABLE: OnceLock<std::collections::HashMap<&'static str, Vec<FieldSpec>>> = OnceLock::new();
    let table = TABLE.get_or_init(|| {
        let mut m = std::collections::HashMap::new();
        m.insert(
            "node",
            vec![
                req("id", FieldKind::Uuid),
                req(
                    "kind",
                    FieldKind::Enum(&["event", "decision", "location", "encounter", "discovery", "death", "reset"]),
                ),
                req("time_slot", FieldKind::TimeSlot),
                req("label", FieldKind::String),
                opt("description", FieldKind::String),
                opt("location_tag", FieldKind::String),
                opt("critical", FieldKind::Bool),
                opt("time_flexible", FieldKind::Bool),
                opt("choices", FieldKind::Array),
            ],
        );
        m.insert(
            "edge",
            vec![
                req("id", FieldKind::Uuid),
                req("source", FieldKind::Uuid),
                req("target", FieldKind::Uuid),
                req("kind", FieldKind::Enum(&["default", "choice", "conditional", "timed", "random"])),
                opt("weight", FieldKind::Number),
                opt("preconditions", FieldKind::Object),
                opt("duration_minutes", FieldKind::Number),
                opt("label", FieldKind::String),
            ],
        );
        m.insert(
            "decision",
            vec![
                req("node_id", FieldKind::Uuid),
                req("choice_index", FieldKind::Number),
                req("timestamp", FieldKind::String),
                opt("rationale", FieldKind::String),
                opt("confidence", FieldKind::Number),
            ],
        );
        m.insert(
            "outcome",
            vec![
                req(
                    "outcome_type",
                    FieldKind::Enum(&[
                        "death",
                        "reset_trigger",
                        "day_end",
                        "voluntary_reset",
                        "sub_loop_exit",
                        "success",
                        "failure",
                        "partial",
                    ]),
                ),
                req("terminal_node_id", FieldKind::Uuid),
                req("timestamp", FieldKind::String),
                opt("cause", FieldKind::String),
                opt("world_state_delta", FieldKind::Object),
                opt("characters_affected", FieldKind::Array),
                opt("hash", FieldKind::Hash64),
            ],
        );
        m.insert(
            "knowledge_state",
            vec![
                req("id", FieldKind::Uuid),
                req("version", FieldKind::Number),
                opt("parent_id", FieldKind::Uuid),
                req("facts", FieldKind::Array),
            ],
        );
        m.insert(
            "loop",
            vec![
                req("id", FieldKind::Uuid),
                req("sequence_number", FieldKind::Number),
                req("epoch_id", FieldKind::Uuid),
                req("graph_id", FieldKind::Uuid),
                req("status", FieldKind::Enum(&["in_progress", "completed", "aborted"])),
                req("knowledge_state_start_id", FieldKind::Uuid),
                opt("knowledge_state_end_id", FieldKind::Uuid),
                req(
                    "emotional_state_start",
                    FieldKind::Enum(&[
                        "hopeful", "curious", "frustrated", "desperate", "numb", "determined", "broken", "calm",
                        "angry", "resigned",
                    ]),
                ),
                req("decisions", FieldKind::Array),
                req("decision_vector", FieldKind::Array),
                opt("path", FieldKind::Array),
                opt("outcome", FieldKind::Object),
                opt("equivalence_class_id", FieldKind::Uuid),
            ],
        );
        m.insert(
            "epoch",
            vec![
                req("id", FieldKind::Uuid),
                req("name", FieldKind::String),
                req("order", FieldKind::Number),
                opt("description", FieldKind::String),
            ],
        );
        m.insert(
            "equivalence_class",
            vec![
                req("id", FieldKind::Uuid),
                req("outcome_hash", FieldKind::Hash64),
                req("knowledge_end_hash", FieldKind::Hash64),
                req("composite_hash", FieldKind::Hash64),
                req("representative_loop_id", FieldKind::Uuid),
                req("member_count", FieldKind::Number),
            ],
        );
        m
    });
    table.get(kind.name()).map(Vec::as_slice).unwrap_or(&[])
}

fn is_hash64(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
}

fn is_uuid(s: &str) -> bool {
    uuid::Uuid::parse_str(s).is_ok()
}

fn check_field(spec: &FieldSpec, value: Option<&Value>, report: &mut ValidationReport) {
    let Some(value) = value else {
        if spec.required {
            report.push(
                ValidationIssue::error(format!("missing required field: {}", spec.name))
                    .with_category(IssueCategory::Structural)
                    .with_entity_ref(spec.name)
                    .with_suggestion(format!("Add a \"{}\" field.", spec.name)),
            );
        }
        return;
    };

    let ok = match spec.kind {
        FieldKind::String => value.is_string(),
        FieldKind::Bool => value.is_boolean(),
        FieldKind::Number => value.is_number(),
        FieldKind::Array => value.is_array(),
        FieldKind::Object => value.is_object(),
        FieldKind::TimeSlot => value.as_str().is_some_and(|s| TimeSlot::parse(s).is_ok()),
        FieldKind::Hash64 => value.as_str().is_some_and(is_hash64),
        FieldKind::Uuid => value.as_str().is_some_and(is_uuid),
        FieldKind::Enum(variants) => value.as_str().is_some_and(|s| variants.contains(&s)),
    };

    if !ok {
        let message = match spec.kind {
            FieldKind::TimeSlot => format!("field \"{}\" is not a valid HH:MM time slot", spec.name),
            FieldKind::Hash64 => format!("field \"{}\" is not 64 lowercase hex characters", spec.name),
            FieldKind::Uuid => format!("field \"{}\" is not a valid UUID", spec.name),
            FieldKind::Enum(variants) => {
                format!("field \"{}\" is not one of {:?}", spec.name, variants)
            }
            _ => format!("field \"{}\" has the wrong type", spec.name),
        };
        report.push(
            ValidationIssue::error(message)
                .with_category(IssueCategory::Structural)
                .with_entity_ref(spec.name),
        );
    }
}

/// Validate a single entity in isolation. Cross-entity checks belong to
/// [`crate::consistency`].
pub fn validate_entity(kind: EntityKind, value: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    let Some(obj) = value.as_object() else {
        report.push(ValidationIssue::error(format!("{} entity must be a JSON object", kind.name())));
        return report;
    };
    for spec in schema_for(kind) {
        check_field(spec, obj.get(spec.name), &mut report);
    }
    report
}
