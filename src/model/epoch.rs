//! A phase spanning many loops (spec.md §3 "Epoch").

use serde::{Deserialize, Serialize};

use crate::ids::{EpochId, LoopId};
use crate::model::loop_::EmotionalState;
use crate::operators::OperatorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Minimal,
    Low,
    Medium,
    High,
    Reckless,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfile {
    pub primary_operator: Option<OperatorKind>,
    pub risk_tolerance: Option<RiskTolerance>,
    pub goals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epoch {
    pub id: EpochId,
    pub name: String,
    pub order: u32,
    pub description: Option<String>,
    pub strategy_profile: StrategyProfile,
    pub emotional_baseline: Option<EmotionalState>,
    pub entry_conditions: Vec<String>,
    pub exit_conditions: Vec<String>,
    pub anchor_loop_ids: Vec<LoopId>,
}

impl Epoch {
    pub fn new(id: EpochId, name: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            name: name.into(),
            order,
            description: None,
            strategy_profile: StrategyProfile::default(),
            emotional_baseline: None,
            entry_conditions: Vec::new(),
            exit_conditions: Vec::new(),
            anchor_loop_ids: Vec::new(),
        }
    }
}
