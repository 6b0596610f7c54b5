//! Resolution-mode manager (component H, spec.md §4.H): story arcs that can
//! be resolved multiple ways, each mode gated by meta level and knowledge
//! flags, scored by a weighted cost model.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;
use crate::ids::{ArcId, ModeId};

pub type ResolutionResult<T> = Result<T, ResolutionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionKind {
    OnsiteHeavy,
    OnsiteLight,
    RemoteSimple,
    RemoteComplex,
    Unstable,
    NotResolved,
}

impl std::fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResolutionKind::OnsiteHeavy => "onsite_heavy",
            ResolutionKind::OnsiteLight => "onsite_light",
            ResolutionKind::RemoteSimple => "remote_simple",
            ResolutionKind::RemoteComplex => "remote_complex",
            ResolutionKind::Unstable => "unstable",
            ResolutionKind::NotResolved => "not_resolved",
        };
        write!(f, "{s}")
    }
}

/// Weights for the cost model (spec.md §4.H). Kept on the arc so different
/// arcs can price time/risk/location/knowledge differently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    pub time: f64,
    pub risk: f64,
    pub location: f64,
    pub knowledge: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self { time: 1.0, risk: 2.0, location: 1.5, knowledge: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionMode {
    pub id: ModeId,
    pub kind: ResolutionKind,
    pub base_cost: f64,
    pub min_meta_level: u32,
    pub required_knowledge_flags: Vec<String>,
    pub required_time_slots: Vec<String>,
    pub required_locations: Vec<String>,
    pub risk_level: f64,
}

impl ResolutionMode {
    pub fn new(id: ModeId, kind: ResolutionKind, base_cost: f64) -> Self {
        Self {
            id,
            kind,
            base_cost,
            min_meta_level: 0,
            required_knowledge_flags: Vec::new(),
            required_time_slots: Vec::new(),
            required_locations: Vec::new(),
            risk_level: 0.0,
        }
    }

    pub fn cost(&self, weights: CostWeights) -> f64 {
        self.base_cost
            + weights.time * self.required_time_slots.len() as f64
            + weights.risk * self.risk_level
            + weights.location * self.required_locations.len() as f64
            + weights.knowledge * self.required_knowledge_flags.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnlockCheck {
    pub unlocked: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextUnlock {
    pub mode_id: ModeId,
    pub missing_requirements: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub id: ArcId,
    pub name: String,
    pub meta_level: u32,
    pub known_flags: Vec<String>,
    pub modes: Vec<ResolutionMode>,
    pub cost_weights: CostWeights,
    pub theoretical_optimal_cost: f64,
    pub initial_best_cost: Option<f64>,
}

impl Arc {
    pub fn new(id: ArcId, name: impl Into<String>, theoretical_optimal_cost: f64) -> Self {
        Self {
            id,
            name: name.into(),
            meta_level: 0,
            known_flags: Vec::new(),
            modes: Vec::new(),
            cost_weights: CostWeights::default(),
            theoretical_optimal_cost,
            initial_best_cost: None,
        }
    }

    pub fn unlock_check(&self, mode: &ResolutionMode) -> UnlockCheck {
        if self.meta_level < mode.min_meta_level {
            return UnlockCheck {
                unlocked: false,
                reason: Some(format!("requires meta level {} (currently {})", mode.min_meta_level, self.meta_level)),
            };
        }
        let missing: Vec<&String> = mode
            .required_knowledge_flags
            .iter()
            .filter(|flag| !self.known_flags.contains(flag))
            .collect();
        if !missing.is_empty() {
            let list = missing.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ");
            return UnlockCheck { unlocked: false, reason: Some(format!("missing knowledge flags: {list}")) };
        }
        UnlockCheck { unlocked: true, reason: None }
    }

    pub fn unlocked_modes(&self) -> Vec<&ResolutionMode> {
        self.modes.iter().filter(|m| self.unlock_check(m).unlocked).collect()
    }

    /// Cheapest currently-unlocked mode, the arc's "optimal" resolution.
    pub fn cheapest_unlocked(&self) -> Option<&ResolutionMode> {
        self.unlocked_modes()
            .into_iter()
            .min_by(|a, b| a.cost(self.cost_weights).partial_cmp(&b.cost(self.cost_weights)).unwrap())
    }

    fn best_cost(&self) -> Option<f64> {
        self.cheapest_unlocked().map(|m| m.cost(self.cost_weights))
    }

    /// `100 * (initial_cost - current_best_cost) / (initial_cost - theoretical_optimal_cost)`,
    /// clamped to `[0, 100]`. Returns `0.0` if there is no unlocked mode yet,
    /// or if the arc has no recorded `initial_best_cost` baseline.
    pub fn trivialization_progress(&self) -> f64 {
        let Some(initial) = self.initial_best_cost else { return 0.0 };
        let Some(current) = self.best_cost() else { return 0.0 };
        let denominator = initial - self.theoretical_optimal_cost;
        if denominator <= 0.0 {
            return 100.0;
        }
        let progress = 100.0 * (initial - current) / denominator;
        progress.clamp(0.0, 100.0)
    }

    /// Cheapest locked mode and what it's missing, or `None` if every mode
    /// is already unlocked.
    pub fn next_unlock(&self) -> Option<NextUnlock> {
        let locked: Vec<&ResolutionMode> = self.modes.iter().filter(|m| !self.unlock_check(m).unlocked).collect();
        let cheapest = locked
            .into_iter()
            .min_by(|a, b| a.cost(self.cost_weights).partial_cmp(&b.cost(self.cost_weights)).unwrap())?;
        let check = self.unlock_check(cheapest);
        Some(NextUnlock {
            mode_id: cheapest.id,
            missing_requirements: check.reason.into_iter().collect(),
        })
    }

    pub fn mode(&self, id: ModeId) -> Option<&ResolutionMode> {
        self.modes.iter().find(|m| m.id == id)
    }
}

/// Concurrent registry of arcs, mirroring the store module's `DashMap`-backed
/// pattern.
#[derive(Default)]
pub struct ArcRegistry {
    arcs: DashMap<ArcId, Arc>,
}

impl ArcRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, arc: Arc) {
        self.arcs.insert(arc.id, arc);
    }

    pub fn get(&self, id: ArcId) -> ResolutionResult<Arc> {
        self.arcs.get(&id).map(|r| r.clone()).ok_or(ResolutionError::UnknownArc { id: id.to_string() })
    }

    pub fn unlock_check(&self, arc_id: ArcId, mode_id: ModeId) -> ResolutionResult<UnlockCheck> {
        let arc = self.get(arc_id)?;
        let mode = arc.mode(mode_id).ok_or(ResolutionError::UnknownMode { id: mode_id.to_string() })?;
        Ok(arc.unlock_check(mode))
    }

    pub fn cheapest_unlocked(&self, arc_id: ArcId) -> ResolutionResult<ModeId> {
        let arc = self.get(arc_id)?;
        arc.cheapest_unlocked()
            .map(|m| m.id)
            .ok_or(ResolutionError::NoUnlockedMode { arc_id: arc_id.to_string() })
    }

    pub fn all(&self) -> Vec<Arc> {
        self.arcs.iter().map(|r| r.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_arc() -> Arc {
        let mut arc = Arc::new(ArcId::new(), "the broken elevator", 10.0);
        arc.meta_level = 1;
        arc.known_flags = vec!["maintenance_key".to_string()];

        let mut remote_simple = ResolutionMode::new(ModeId::new(), ResolutionKind::RemoteSimple, 5.0);
        remote_simple.min_meta_level = 0;

        let mut onsite_heavy = ResolutionMode::new(ModeId::new(), ResolutionKind::OnsiteHeavy, 3.0);
        onsite_heavy.min_meta_level = 1;
        onsite_heavy.required_knowledge_flags = vec!["maintenance_key".to_string()];

        let mut unstable = ResolutionMode::new(ModeId::new(), ResolutionKind::Unstable, 1.0);
        unstable.min_meta_level = 5;

        arc.modes = vec![remote_simple, onsite_heavy, unstable];
        arc.initial_best_cost = Some(5.0);
        arc
    }

    #[test]
    fn unlocks_respect_meta_level_and_flags() {
        let arc = sample_arc();
        assert!(arc.unlock_check(&arc.modes[0]).unlocked);
        assert!(arc.unlock_check(&arc.modes[1]).unlocked);
        assert!(!arc.unlock_check(&arc.modes[2]).unlocked);
    }

    #[test]
    fn cheapest_unlocked_picks_the_lower_cost_mode() {
        let arc = sample_arc();
        let cheapest = arc.cheapest_unlocked().unwrap();
        assert_eq!(cheapest.kind, ResolutionKind::OnsiteHeavy);
    }

    #[test]
    fn next_unlock_reports_the_locked_unstable_mode() {
        let arc = sample_arc();
        let next = arc.next_unlock().unwrap();
        assert_eq!(next.mode_id, arc.modes[2].id);
        assert!(!next.missing_requirements.is_empty());
    }

    #[test]
    fn trivialization_progress_is_between_initial_and_optimal() {
        let arc = sample_arc();
        let progress = arc.trivialization_progress();
        assert!(progress > 0.0 && progress <= 100.0);
    }

    #[test]
    fn registry_round_trips_arcs() {
        let registry = ArcRegistry::new();
        let arc = sample_arc();
        let id = arc.id;
        registry.insert(arc);
        assert_eq!(registry.len(), 1);
        let fetched = registry.get(id).unwrap();
        assert_eq!(fetched.name, "the broken elevator");
    }
}
