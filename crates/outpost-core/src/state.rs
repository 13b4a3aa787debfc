//! The root `GameState` snapshot.
//!
//! Every engine entry point takes a state snapshot and returns a new one;
//! nothing in the core holds state between calls. The host publishes the
//! returned snapshot as the new canonical state before scheduling the next
//! tick.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use outpost_logic::blackhole::BlackHole;
use outpost_logic::buildings::Building;
use outpost_logic::flow::FlowModifiers;
use outpost_logic::population::Population;
use outpost_logic::resources::{Resource, Resources};

use crate::expeditions::Expedition;

/// Galactic upgrade id that switches the black hole subsystem on.
pub const BLACK_HOLE_UNLOCK: &str = "black_hole_core";

/// How an artifact bends the economy while unlocked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactEffectKind {
    Production,
    Capacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArtifactEffect {
    pub kind: ArtifactEffectKind,
    pub value: f64,
}

/// A relic recovered from expeditions. Unlocked artifacts apply their
/// effects every tick; duplicate copies feed star upgrades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub stars: u32,
    /// Spare copies held toward the next star.
    pub copies: u32,
    pub locked: bool,
    pub expedition_tier: u32,
    pub effects: Vec<ArtifactEffect>,
}

impl Artifact {
    /// Effect strength grows with stars: `value + (stars + 1) / 10`.
    fn multiplier(&self, effect: &ArtifactEffect) -> f64 {
        effect.value + (self.stars + 1) as f64 / 10.0
    }

    /// Copies consumed by the next star upgrade.
    pub fn copies_for_next_star(&self) -> u32 {
        2u32.pow(self.stars)
    }
}

pub const MAX_ARTIFACT_STARS: u32 = 5;

/// Full game snapshot. Cheap to clone relative to tick frequency; cloned
/// wholesale by every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub resources: Resources,
    pub buildings: Vec<Building>,
    pub population: Population,
    /// Researched technology ids.
    pub researched: BTreeSet<String>,
    /// Completed milestone ids.
    pub completed_milestones: BTreeSet<String>,
    pub expeditions: Vec<Expedition>,
    pub artifacts: Vec<Artifact>,
    /// Prestige-track unlock flags (the black hole gate lives here).
    pub galactic_upgrades: BTreeSet<String>,
    pub black_hole: Option<BlackHole>,
    pub paused: bool,
    /// Wall-clock timestamp of the last settled tick, in milliseconds.
    pub last_update_ms: u64,
    pub playtime_seconds: f64,
    next_building_id: u64,
    next_expedition_id: u64,
}

impl GameState {
    /// A fresh colony: starter stockpiles, ten colonists, nothing built.
    pub fn new(now_ms: u64) -> Self {
        let resources = Resources::new([
            Resource::with_capacity(50.0, 100.0),  // oxygen
            Resource::with_capacity(50.0, 100.0),  // water
            Resource::with_capacity(50.0, 100.0),  // food
            Resource::with_capacity(100.0, 200.0), // energy
            Resource::with_capacity(100.0, 200.0), // metals
            Resource::with_capacity(0.0, 100.0),   // science
        ]);
        Self {
            resources,
            buildings: Vec::new(),
            population: Population::new(10, 10),
            researched: BTreeSet::new(),
            completed_milestones: BTreeSet::new(),
            expeditions: Vec::new(),
            artifacts: Vec::new(),
            galactic_upgrades: BTreeSet::new(),
            black_hole: None,
            paused: false,
            last_update_ms: now_ms,
            playtime_seconds: 0.0,
            next_building_id: 1,
            next_expedition_id: 1,
        }
    }

    pub fn allocate_building_id(&mut self) -> u64 {
        let id = self.next_building_id;
        self.next_building_id += 1;
        id
    }

    pub fn allocate_expedition_id(&mut self) -> u64 {
        let id = self.next_expedition_id;
        self.next_expedition_id += 1;
        id
    }

    pub fn black_hole_unlocked(&self) -> bool {
        self.galactic_upgrades.contains(BLACK_HOLE_UNLOCK)
    }

    pub fn building(&self, id: u64) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    pub fn building_count(&self, kind: outpost_logic::buildings::BuildingKind) -> usize {
        self.buildings.iter().filter(|b| b.kind == kind).count()
    }

    pub fn artifact(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.name == name)
    }

    /// Rederive `available` counting both building assignments and crew
    /// away on expeditions. May leave a negative value after losses; the
    /// engine surfaces and repairs that case.
    pub fn refresh_available(&mut self) {
        let assigned = outpost_logic::population::assigned_workers(&self.buildings) as i64;
        self.population.available =
            self.population.total as i64 - assigned - self.expedition_crew() as i64;
    }

    /// Colonists currently away on expeditions that have not resolved.
    pub fn expedition_crew(&self) -> u32 {
        self.expeditions
            .iter()
            .filter(|e| e.is_holding_crew())
            .map(|e| e.crew)
            .sum()
    }

    /// Combined production/capacity multipliers from unlocked artifacts.
    /// Read-only external modifiers from the flow engine's point of view.
    pub fn flow_modifiers(&self) -> FlowModifiers {
        let mut modifiers = FlowModifiers::default();
        for artifact in &self.artifacts {
            if artifact.locked {
                continue;
            }
            for effect in &artifact.effects {
                match effect.kind {
                    ArtifactEffectKind::Production => {
                        modifiers.production *= artifact.multiplier(effect);
                    }
                    ArtifactEffectKind::Capacity => {
                        modifiers.capacity *= artifact.multiplier(effect);
                    }
                }
            }
        }
        modifiers
    }

    /// Housing ceiling: the base camp plus every housing building's
    /// per-level capacity.
    pub fn housing_capacity(&self) -> u32 {
        let base = 10u32;
        let housed: u32 = self
            .buildings
            .iter()
            .map(|b| b.housing_capacity * b.level)
            .sum();
        base + housed
    }

    /// Grant copies of a known artifact, unlocking it on first contact.
    pub fn add_artifact_copies(&mut self, name: &str, copies: u32) -> bool {
        match self.artifacts.iter_mut().find(|a| a.name == name) {
            Some(artifact) => {
                artifact.copies += copies;
                artifact.locked = false;
                true
            }
            None => false,
        }
    }

    /// Consume copies to raise an artifact's star level, if possible.
    pub fn upgrade_artifact(&mut self, name: &str) -> bool {
        let Some(artifact) = self.artifacts.iter_mut().find(|a| a.name == name) else {
            return false;
        };
        if artifact.locked || artifact.stars >= MAX_ARTIFACT_STARS {
            return false;
        }
        let required = artifact.copies_for_next_star();
        if artifact.copies < required {
            return false;
        }
        artifact.copies -= required;
        artifact.stars += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_colony_starts_within_invariants() {
        let state = GameState::new(0);
        for (_, pool) in state.resources.iter() {
            assert!(pool.amount >= 0.0);
            assert!(pool.amount <= pool.capacity);
        }
        assert_eq!(state.population.total, 10);
        assert_eq!(state.population.available, 10);
        assert!(state.black_hole.is_none());
        assert!(!state.black_hole_unlocked());
    }

    #[test]
    fn test_building_ids_are_unique() {
        let mut state = GameState::new(0);
        let a = state.allocate_building_id();
        let b = state.allocate_building_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_artifact_modifiers_compound() {
        let mut state = GameState::new(0);
        state.artifacts.push(Artifact {
            name: "Harmonic Lens".into(),
            stars: 1,
            copies: 0,
            locked: false,
            expedition_tier: 0,
            effects: vec![ArtifactEffect {
                kind: ArtifactEffectKind::Production,
                value: 1.0,
            }],
        });
        let modifiers = state.flow_modifiers();
        // value 1.0 + (1+1)/10 = 1.2
        assert!((modifiers.production - 1.2).abs() < 1e-9);
        assert!((modifiers.capacity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_locked_artifacts_do_not_modify() {
        let mut state = GameState::new(0);
        state.artifacts.push(Artifact {
            name: "Sealed Relic".into(),
            stars: 3,
            copies: 0,
            locked: true,
            expedition_tier: 2,
            effects: vec![ArtifactEffect {
                kind: ArtifactEffectKind::Capacity,
                value: 2.0,
            }],
        });
        assert_eq!(state.flow_modifiers(), FlowModifiers::default());
    }

    #[test]
    fn test_artifact_star_upgrade_consumes_copies() {
        let mut state = GameState::new(0);
        state.artifacts.push(Artifact {
            name: "Time Crystal".into(),
            stars: 2,
            copies: 5,
            locked: false,
            expedition_tier: 1,
            effects: Vec::new(),
        });
        // 2^2 = 4 copies required.
        assert!(state.upgrade_artifact("Time Crystal"));
        let artifact = state.artifact("Time Crystal").unwrap();
        assert_eq!(artifact.stars, 3);
        assert_eq!(artifact.copies, 1);
        // Not enough copies for the next star.
        assert!(!state.upgrade_artifact("Time Crystal"));
    }
}
