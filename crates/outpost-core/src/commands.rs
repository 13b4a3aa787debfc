//! Player commands — explicit, validated state transitions.
//!
//! Every command is one variant of [`Command`] and one pure transition:
//! the dispatcher clones the incoming snapshot, validates, and either
//! returns the mutated clone or the untouched clone plus a rejection
//! notification. Nothing here performs I/O and nothing panics on bad input.

use serde::{Deserialize, Serialize};

use outpost_logic::blackhole::upgrade_cost;
use outpost_logic::buildings::BuildingKind;

use crate::catalog::Catalogs;
use crate::events::Notification;
use crate::expeditions::{self, ExpeditionType};
use crate::state::GameState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    ConstructBuilding { kind: BuildingKind },
    UpgradeBuilding { building_id: u64 },
    AssignWorkers { building_id: u64, delta: i32 },
    ResearchTechnology { tech_id: String },
    StartExpedition { kind: ExpeditionType, tier: u32 },
    LaunchExpedition { expedition_id: u64 },
    CancelExpedition { expedition_id: u64 },
    ResolveExpeditionEvent {
        expedition_id: u64,
        event_index: usize,
        option_index: usize,
    },
    PurchaseBlackHoleUpgrade { upgrade_id: String },
    CollapseBlackHole,
    UpgradeArtifact { name: String },
    SetPaused { paused: bool },
}

/// Technology id that opens the expedition program.
pub const EXPEDITION_UNLOCK_TECH: &str = "orbital_survey";

fn reject(state: GameState, notes: &mut Vec<Notification>, reason: impl Into<String>) -> GameState {
    let reason = reason.into();
    log::warn!("command rejected: {}", reason);
    notes.push(Notification::CommandRejected { reason });
    state
}

/// Apply one command to a snapshot. Returns the next snapshot and the
/// notifications it produced; a rejected command returns the input state
/// unchanged (plus the rejection note). Commands are fully deterministic —
/// randomness only enters through the expedition tick.
pub fn dispatch(
    state: &GameState,
    catalogs: &Catalogs,
    command: Command,
) -> (GameState, Vec<Notification>) {
    let mut next = state.clone();
    let mut notes = Vec::new();

    let next = match command {
        Command::ConstructBuilding { kind } => construct_building(next, catalogs, kind, &mut notes),
        Command::UpgradeBuilding { building_id } => {
            upgrade_building(next, building_id, &mut notes)
        }
        Command::AssignWorkers { building_id, delta } => {
            assign_workers(next, building_id, delta, &mut notes)
        }
        Command::ResearchTechnology { tech_id } => {
            research_technology(next, catalogs, &tech_id, &mut notes)
        }
        Command::StartExpedition { kind, tier } => {
            start_expedition(next, catalogs, kind, tier, &mut notes)
        }
        Command::LaunchExpedition { expedition_id } => {
            // The helpers only mutate once every check passes, so a failed
            // call leaves `next` identical to the input state.
            if !expeditions::launch_expedition(&mut next, expedition_id, &mut notes) {
                next = reject(next, &mut notes, "expedition cannot launch");
            }
            next
        }
        Command::CancelExpedition { expedition_id } => {
            if !expeditions::cancel_expedition(&mut next, expedition_id, &mut notes) {
                next = reject(next, &mut notes, "expedition cannot be cancelled");
            }
            next
        }
        Command::ResolveExpeditionEvent {
            expedition_id,
            event_index,
            option_index,
        } => {
            if expeditions::resolve_event_choice(
                &mut next,
                catalogs,
                expedition_id,
                event_index,
                option_index,
                &mut notes,
            ) {
                // Crew losses may have shifted the worker ledger.
                next.refresh_available();
            } else {
                next = reject(next, &mut notes, "no such expedition event option");
            }
            next
        }
        Command::PurchaseBlackHoleUpgrade { upgrade_id } => {
            purchase_black_hole_upgrade(next, catalogs, &upgrade_id, &mut notes)
        }
        Command::CollapseBlackHole => collapse_black_hole(next, &mut notes),
        Command::UpgradeArtifact { name } => {
            if !next.upgrade_artifact(&name) {
                next = reject(next, &mut notes, "artifact cannot be upgraded");
            }
            next
        }
        Command::SetPaused { paused } => {
            next.paused = paused;
            next
        }
    };

    (next, notes)
}

fn construct_building(
    mut state: GameState,
    catalogs: &Catalogs,
    kind: BuildingKind,
    notes: &mut Vec<Notification>,
) -> GameState {
    let Some(template) = catalogs.building(kind) else {
        return reject(state, notes, format!("unknown building {:?}", kind));
    };
    if let Some(tech) = template.required_technology {
        if !state.researched.contains(tech) {
            return reject(
                state,
                notes,
                format!("{} requires technology '{}'", kind.name(), tech),
            );
        }
    }
    if state.building_count(kind) as u32 >= template.max_instances {
        return reject(state, notes, format!("{} instance limit reached", kind.name()));
    }
    if !state.resources.can_afford(&template.base_cost) {
        return reject(state, notes, format!("cannot afford {}", kind.name()));
    }

    state.resources.apply_cost(&template.base_cost);
    let id = state.allocate_building_id();
    state.buildings.push(template.instantiate(id));
    state.refresh_available();
    log::info!("constructed {} (#{})", kind.name(), id);
    notes.push(Notification::BuildingConstructed { id, kind });
    state
}

fn upgrade_building(
    mut state: GameState,
    building_id: u64,
    notes: &mut Vec<Notification>,
) -> GameState {
    let Some(index) = state.buildings.iter().position(|b| b.id == building_id) else {
        return reject(state, notes, format!("no building #{}", building_id));
    };
    let cost = state.buildings[index].upgrade_cost();
    if !state.resources.can_afford(&cost) {
        return reject(
            state,
            notes,
            format!("cannot afford upgrade of #{}", building_id),
        );
    }

    state.resources.apply_cost(&cost);
    let building = &mut state.buildings[index];
    building.level += 1;
    building.upgrades += 1;
    // Each level adds a fifth more worker slots, floored.
    building.worker_capacity = (building.worker_capacity as f64 * 1.2).floor() as u32;
    let kind = building.kind;
    let level = building.level;
    log::info!("upgraded {} (#{}) to level {}", kind.name(), building_id, level);
    notes.push(Notification::BuildingUpgraded {
        id: building_id,
        kind,
        level,
    });
    state
}

fn assign_workers(
    mut state: GameState,
    building_id: u64,
    delta: i32,
    notes: &mut Vec<Notification>,
) -> GameState {
    let Some(index) = state.buildings.iter().position(|b| b.id == building_id) else {
        return reject(state, notes, format!("no building #{}", building_id));
    };

    // Workers assigned everywhere else, plus crew away on expeditions, bound
    // what this building can take.
    let assigned_elsewhere: u32 = state
        .buildings
        .iter()
        .filter(|b| b.id != building_id)
        .map(|b| b.assigned_workers)
        .sum();
    let reserved = assigned_elsewhere as i64 + state.expedition_crew() as i64;
    let assignable = (state.population.total as i64 - reserved).max(0);

    let building = &mut state.buildings[index];
    let requested = building.assigned_workers as i64 + delta as i64;
    let new_assignment = requested
        .min(building.worker_capacity as i64)
        .min(assignable)
        .max(0) as u32;

    if new_assignment == building.assigned_workers {
        return reject(state, notes, "worker assignment unchanged");
    }

    building.assigned_workers = new_assignment;
    let kind = building.kind;
    state.refresh_available();
    notes.push(Notification::WorkersReassigned {
        id: building_id,
        kind,
        assigned: new_assignment,
    });
    state
}

fn research_technology(
    mut state: GameState,
    catalogs: &Catalogs,
    tech_id: &str,
    notes: &mut Vec<Notification>,
) -> GameState {
    let Some(tech) = catalogs.technology(tech_id) else {
        return reject(state, notes, format!("unknown technology '{}'", tech_id));
    };
    if state.researched.contains(tech_id) {
        return reject(state, notes, format!("'{}' already researched", tech_id));
    }
    if !tech
        .prerequisites
        .iter()
        .all(|prereq| state.researched.contains(*prereq))
    {
        return reject(
            state,
            notes,
            format!("prerequisites for '{}' not met", tech_id),
        );
    }
    if !state.resources.can_afford(&tech.research_cost) {
        return reject(state, notes, format!("cannot afford '{}'", tech_id));
    }

    state.resources.apply_cost(&tech.research_cost);
    state.researched.insert(tech_id.to_string());
    log::info!("researched technology '{}'", tech_id);
    notes.push(Notification::TechnologyResearched {
        id: tech_id.to_string(),
    });
    state
}

fn start_expedition(
    mut state: GameState,
    catalogs: &Catalogs,
    kind: ExpeditionType,
    tier: u32,
    notes: &mut Vec<Notification>,
) -> GameState {
    let _ = catalogs;
    if !state.researched.contains(EXPEDITION_UNLOCK_TECH) {
        return reject(
            state,
            notes,
            format!("expeditions require '{}'", EXPEDITION_UNLOCK_TECH),
        );
    }
    if !expeditions::start_expedition(&mut state, kind, tier, notes) {
        // start_expedition already pushed the rejection note.
        return state;
    }
    state
}

fn purchase_black_hole_upgrade(
    mut state: GameState,
    catalogs: &Catalogs,
    upgrade_id: &str,
    notes: &mut Vec<Notification>,
) -> GameState {
    let Some(def) = catalogs.black_hole_upgrade(upgrade_id) else {
        return reject(state, notes, format!("unknown upgrade '{}'", upgrade_id));
    };
    let (current_level, dark_matter) = match state.black_hole.as_ref() {
        Some(hole) => (hole.upgrades.get(def.kind), hole.dark_matter),
        None => return reject(state, notes, "no black hole formed"),
    };
    if current_level >= def.max_level {
        return reject(state, notes, format!("'{}' already at max level", upgrade_id));
    }
    let next_level = current_level + 1;
    let cost = upgrade_cost(def.base_cost, next_level);
    if dark_matter < cost {
        return reject(
            state,
            notes,
            format!("'{}' costs {} dark matter", upgrade_id, cost),
        );
    }

    if let Some(hole) = state.black_hole.as_mut() {
        hole.dark_matter -= cost;
        hole.upgrades.bump(def.kind);
    }
    log::info!("purchased black hole upgrade '{}' (level {})", upgrade_id, next_level);
    notes.push(Notification::BlackHoleUpgradePurchased {
        id: upgrade_id.to_string(),
        level: next_level,
    });
    state
}

fn collapse_black_hole(mut state: GameState, notes: &mut Vec<Notification>) -> GameState {
    let Some(hole) = state.black_hole.as_mut() else {
        return reject(state, notes, "no black hole formed");
    };
    let gained = hole.collapse();
    log::info!("black hole collapsed for {:.2} dark matter", gained);
    notes.push(Notification::BlackHoleCollapsed {
        dark_matter_gained: gained,
    });
    state
}
