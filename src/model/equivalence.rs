//! Equivalence class data model (spec.md §3 "Equivalence class").
//!
//! This module holds the pure data shape; the hashing/membership/centroid
//! logic that maintains it lives in [`crate::equivalence`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{EpochId, EquivalenceClassId, LoopId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalenceClass {
    pub id: EquivalenceClassId,
    pub outcome_hash: String,
    pub knowledge_end_hash: String,
    pub composite_hash: String,
    pub representative_loop_id: LoopId,
    pub sample_loop_ids: Vec<LoopId>,
    pub member_count: u64,
    pub per_epoch_distribution: HashMap<EpochId, u64>,
    pub outcome_summary: String,
    pub knowledge_delta_summary: String,
    pub common_tags: Vec<String>,
    pub decision_vector_centroid: Option<Vec<f64>>,
    pub decision_vector_variance: Option<f64>,
    pub first_occurrence_loop_id: LoopId,
    pub last_occurrence_loop_id: LoopId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub narrative_template: Option<String>,
}

/// Cap on `sample_loop_ids` length (spec.md §4.D "capped at some small constant").
pub const SAMPLE_CAP: usize = 8;
