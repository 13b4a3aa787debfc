//! Expeditions — timed away-missions that trade crew for resource hauls.
//!
//! An expedition reserves colonists, runs for a tier-scaled duration, and
//! periodically rolls a weighted random event that pauses progress until the
//! player picks an option. Completion pays the accumulated reward table and
//! may surface an artifact. All randomness flows through a caller-provided
//! RNG so runs are reproducible under a fixed seed.

use rand::Rng;
use serde::{Deserialize, Serialize};

use outpost_logic::resources::{ResourceAmounts, ResourceKind};

use crate::catalog::{Catalogs, EventEffect, ExpeditionEventDef};
use crate::events::Notification;
use crate::state::GameState;

/// Minutes of travel for a tier-0 expedition.
pub const BASE_EXPEDITION_MINUTES: f64 = 15.0;
/// Extra minutes per tier.
pub const MINUTES_PER_TIER: f64 = 15.0;
/// Crew demanded per tier step (tier 0 needs one step's worth).
pub const CREW_PER_TIER: u32 = 5;
/// Minutes between random events.
pub const EVENT_INTERVAL_MINUTES: f64 = 10.0;
/// Reward growth per tier.
pub const TIER_REWARD_MULTIPLIER: f64 = 1.5;
/// Chance an expedition brings back an artifact copy.
pub const ARTIFACT_DROP_CHANCE: f64 = 0.25;
/// Finished expeditions linger this long for the host to display.
const LINGER_MINUTES: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpeditionType {
    Mining,
    Scientific,
}

impl ExpeditionType {
    pub fn name(self) -> &'static str {
        match self {
            ExpeditionType::Mining => "mining",
            ExpeditionType::Scientific => "scientific",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpeditionStatus {
    Preparing,
    InProgress,
    Completed,
    Failed,
}

/// One rolled event, waiting for (or resolved by) a player choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpeditionEventLog {
    pub event_id: String,
    /// Expedition-clock minute the event fired at.
    pub at_minutes: f64,
    pub chosen_option: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expedition {
    pub id: u64,
    pub kind: ExpeditionType,
    pub tier: u32,
    pub duration_minutes: f64,
    pub elapsed_minutes: f64,
    pub crew: u32,
    pub status: ExpeditionStatus,
    pub events: Vec<ExpeditionEventLog>,
    pub next_event_minutes: f64,
    pub rewards: ResourceAmounts,
    pub rewards_collected: bool,
}

impl Expedition {
    /// Crew is reserved from preparation until the mission resolves.
    pub fn is_holding_crew(&self) -> bool {
        matches!(
            self.status,
            ExpeditionStatus::Preparing | ExpeditionStatus::InProgress
        )
    }

    fn has_pending_event(&self) -> bool {
        self.events.iter().any(|e| e.chosen_option.is_none())
    }
}

/// Crew required for a tier: `5 × (tier + 1)`.
pub fn required_crew(tier: u32) -> u32 {
    CREW_PER_TIER + tier * CREW_PER_TIER
}

/// Duration in minutes, shortened 5% per Time Crystal star when unlocked.
pub fn duration_minutes(tier: u32, state: &GameState) -> f64 {
    let base = BASE_EXPEDITION_MINUTES + tier as f64 * MINUTES_PER_TIER;
    match state.artifact("Time Crystal") {
        Some(crystal) if !crystal.locked => {
            base - base * 0.05 * (crystal.stars + 1) as f64
        }
        _ => base,
    }
}

/// Base reward table for a type and tier, rounded like the display values.
pub fn base_rewards(kind: ExpeditionType, tier: u32) -> ResourceAmounts {
    let scale = TIER_REWARD_MULTIPLIER.powi(tier as i32);
    match kind {
        ExpeditionType::Mining => {
            ResourceAmounts::new().with(ResourceKind::Metals, (5000.0 * scale).round())
        }
        ExpeditionType::Scientific => {
            ResourceAmounts::new().with(ResourceKind::Science, (5000.0 * scale).round())
        }
    }
}

/// Reserve crew and stage a new expedition in `Preparing`.
pub fn start_expedition(
    state: &mut GameState,
    kind: ExpeditionType,
    tier: u32,
    notes: &mut Vec<Notification>,
) -> bool {
    let crew = required_crew(tier);
    if state.population.available < crew as i64 {
        notes.push(Notification::CommandRejected {
            reason: format!("expedition needs {} available colonists", crew),
        });
        return false;
    }
    let id = state.allocate_expedition_id();
    let expedition = Expedition {
        id,
        kind,
        tier,
        duration_minutes: duration_minutes(tier, state),
        elapsed_minutes: 0.0,
        crew,
        status: ExpeditionStatus::Preparing,
        events: Vec::new(),
        next_event_minutes: EVENT_INTERVAL_MINUTES,
        rewards: base_rewards(kind, tier),
        rewards_collected: false,
    };
    state.expeditions.push(expedition);
    state.population.available -= crew as i64;
    true
}

/// Move a staged expedition into `InProgress`.
pub fn launch_expedition(state: &mut GameState, id: u64, notes: &mut Vec<Notification>) -> bool {
    let Some(expedition) = state.expeditions.iter_mut().find(|e| e.id == id) else {
        return false;
    };
    if expedition.status != ExpeditionStatus::Preparing {
        return false;
    }
    expedition.status = ExpeditionStatus::InProgress;
    log::info!(
        "{} expedition #{} launched (tier {}, crew {})",
        expedition.kind.name(),
        id,
        expedition.tier,
        expedition.crew
    );
    notes.push(Notification::ExpeditionLaunched {
        id,
        kind: expedition.kind,
        tier: expedition.tier,
    });
    true
}

/// Cancel a staged expedition and return its crew. In-flight missions
/// cannot be recalled.
pub fn cancel_expedition(state: &mut GameState, id: u64, notes: &mut Vec<Notification>) -> bool {
    let Some(index) = state.expeditions.iter().position(|e| e.id == id) else {
        return false;
    };
    if state.expeditions[index].status != ExpeditionStatus::Preparing {
        return false;
    }
    let expedition = state.expeditions.remove(index);
    state.population.available += expedition.crew as i64;
    notes.push(Notification::ExpeditionCancelled { id });
    true
}

/// Weighted event roll over the defs matching this expedition's type/tier.
fn roll_event<'a>(
    catalogs: &'a Catalogs,
    expedition: &Expedition,
    rng: &mut impl Rng,
) -> Option<&'a ExpeditionEventDef> {
    let candidates: Vec<&ExpeditionEventDef> = catalogs
        .expedition_events
        .iter()
        .filter(|def| def.kinds.is_empty() || def.kinds.contains(&expedition.kind))
        .filter(|def| expedition.tier >= def.min_tier)
        .filter(|def| def.max_tier.map_or(true, |max| expedition.tier <= max))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let total_weight: f64 = candidates.iter().map(|def| def.weight).sum();
    let mut roll = rng.gen::<f64>() * total_weight;
    for def in &candidates {
        roll -= def.weight;
        if roll <= 0.0 {
            return Some(def);
        }
    }
    candidates.last().copied()
}

/// Advance every active expedition by `delta_seconds`.
///
/// Missions with an unresolved event hold position until the player picks
/// an option. Completion pays rewards (clamped into capacity), releases
/// crew, and rolls for an artifact find.
pub fn tick_expeditions(
    state: &mut GameState,
    catalogs: &Catalogs,
    delta_seconds: f64,
    rng: &mut impl Rng,
    notes: &mut Vec<Notification>,
) {
    if state.expeditions.is_empty() || delta_seconds <= 0.0 {
        return;
    }
    let delta_minutes = delta_seconds / 60.0;

    let mut completed: Vec<u64> = Vec::new();
    for expedition in &mut state.expeditions {
        if expedition.status != ExpeditionStatus::InProgress {
            // Finished missions keep their clock running as a linger timer.
            if !expedition.is_holding_crew() {
                expedition.elapsed_minutes += delta_minutes;
            }
            continue;
        }
        if expedition.has_pending_event() {
            continue;
        }

        expedition.elapsed_minutes += delta_minutes;
        expedition.next_event_minutes -= delta_minutes;

        if expedition.next_event_minutes <= 0.0 && expedition.elapsed_minutes < expedition.duration_minutes
        {
            if let Some(def) = roll_event(catalogs, expedition, rng) {
                expedition.events.push(ExpeditionEventLog {
                    event_id: def.id.clone(),
                    at_minutes: expedition.elapsed_minutes,
                    chosen_option: None,
                });
                notes.push(Notification::ExpeditionEvent {
                    expedition_id: expedition.id,
                    event_id: def.id.clone(),
                });
            }
            expedition.next_event_minutes = EVENT_INTERVAL_MINUTES;
        }

        if expedition.elapsed_minutes >= expedition.duration_minutes {
            expedition.status = ExpeditionStatus::Completed;
            completed.push(expedition.id);
        }
    }

    for id in completed {
        collect_rewards(state, id, rng, notes);
    }

    // Finished missions linger briefly for the host, then fall off the list.
    state.expeditions.retain(|e| {
        e.is_holding_crew()
            || e.elapsed_minutes - e.duration_minutes < LINGER_MINUTES
    });
}

fn collect_rewards(state: &mut GameState, id: u64, rng: &mut impl Rng, notes: &mut Vec<Notification>) {
    let Some(index) = state.expeditions.iter().position(|e| e.id == id) else {
        return;
    };
    if state.expeditions[index].rewards_collected {
        return;
    }
    state.expeditions[index].rewards_collected = true;
    let rewards = state.expeditions[index].rewards;
    let tier = state.expeditions[index].tier;

    for (kind, amount) in rewards.iter_nonzero() {
        if amount > 0.0 {
            state.resources.deposit(kind, amount);
        }
    }

    // Artifact find: one copy of a random relic matching this tier.
    if rng.gen::<f64>() < ARTIFACT_DROP_CHANCE {
        let matching: Vec<String> = state
            .artifacts
            .iter()
            .filter(|a| a.expedition_tier == tier)
            .map(|a| a.name.clone())
            .collect();
        if !matching.is_empty() {
            let name = &matching[rng.gen_range(0..matching.len())];
            state.add_artifact_copies(name, 1);
            notes.push(Notification::ArtifactRecovered { name: name.clone() });
        }
    }

    notes.push(Notification::ExpeditionCompleted { id });
}

/// Apply the chosen option of a pending event.
pub fn resolve_event_choice(
    state: &mut GameState,
    catalogs: &Catalogs,
    expedition_id: u64,
    event_index: usize,
    option_index: usize,
    notes: &mut Vec<Notification>,
) -> bool {
    let Some(exp_index) = state.expeditions.iter().position(|e| e.id == expedition_id) else {
        return false;
    };
    let Some(log) = state.expeditions[exp_index].events.get(event_index) else {
        return false;
    };
    if log.chosen_option.is_some() {
        return false;
    }
    let Some(def) = catalogs.expedition_event(&log.event_id) else {
        return false;
    };
    let Some(option) = def.options.get(option_index) else {
        return false;
    };

    let effects = option.effects.clone();
    state.expeditions[exp_index].events[event_index].chosen_option = Some(option_index);

    for effect in &effects {
        apply_event_effect(state, catalogs, exp_index, effect, notes);
    }
    true
}

fn apply_event_effect(
    state: &mut GameState,
    catalogs: &Catalogs,
    exp_index: usize,
    effect: &EventEffect,
    notes: &mut Vec<Notification>,
) {
    match effect {
        EventEffect::Time { minutes } => {
            state.expeditions[exp_index].duration_minutes =
                (state.expeditions[exp_index].duration_minutes + minutes).max(0.0);
        }
        EventEffect::Resource { kind, amount } => {
            if *amount >= 0.0 {
                state.resources.deposit(*kind, *amount);
            } else {
                let pool = state.resources.get_mut(*kind);
                pool.amount = (pool.amount + amount).max(0.0);
            }
        }
        EventEffect::Crew { delta } => {
            let expedition = &mut state.expeditions[exp_index];
            let before = expedition.crew;
            expedition.crew = (expedition.crew as i64 + *delta as i64).max(1) as u32;
            let lost = before.saturating_sub(expedition.crew);
            if lost > 0 {
                state.population.total = state.population.total.saturating_sub(lost);
                notes.push(Notification::ColonistsLost { count: lost });
            }
        }
        EventEffect::Reward { amounts } => {
            state.expeditions[exp_index].rewards.merge(amounts);
        }
        // Technology grants bypass prerequisite and cost checks; the id
        // must still resolve in the catalog.
        EventEffect::Technology { tech_id } => {
            if catalogs.technology(tech_id).is_some() && state.researched.insert(tech_id.clone()) {
                notes.push(Notification::TechnologyResearched {
                    id: tech_id.clone(),
                });
            }
        }
        EventEffect::Fail => {
            let expedition = &mut state.expeditions[exp_index];
            expedition.status = ExpeditionStatus::Failed;
            let crew = expedition.crew;
            let id = expedition.id;
            // All hands lost with the mission.
            state.population.total = state.population.total.saturating_sub(crew);
            notes.push(Notification::ColonistsLost { count: crew });
            notes.push(Notification::ExpeditionFailed { id });
        }
    }
}
