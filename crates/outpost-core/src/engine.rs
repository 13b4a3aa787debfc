//! Engine — per-tick orchestration and the session-resume path.
//!
//! Both entry points are snapshot-in/snapshot-out. A tick runs the full
//! pipeline: worker bookkeeping and efficiency first, their outputs feed
//! the resource flow, the black hole writes independently into the energy
//! pool, and the milestone engine settles last against the finished state.
//! Resume swaps the per-tick flow for the segmented offline replay, then
//! still runs the milestone engine once against the result.

use rand::Rng;

use outpost_logic::blackhole::BlackHole;
use outpost_logic::buildings::evaluate_efficiency;
use outpost_logic::flow;
use outpost_logic::offline;
use outpost_logic::population;
use outpost_logic::resources::{ResourceAmounts, ResourceKind};

use crate::catalog::Catalogs;
use crate::events::Notification;
use crate::expeditions;
use crate::milestones::check_milestones;
use crate::state::GameState;

/// Result of one active-play tick.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub state: GameState,
    pub notifications: Vec<Notification>,
}

/// Welcome-back summary for the host to render.
#[derive(Debug, Clone)]
pub struct OfflineReport {
    /// Raw wall-clock gap, before the 12-hour cap.
    pub elapsed_ms: f64,
    /// Portion of the gap actually replayed.
    pub simulated_ms: f64,
    /// Net per-resource change applied after all offline caps.
    pub resource_changes: ResourceAmounts,
}

/// Result of a session resume.
#[derive(Debug, Clone)]
pub struct ResumeOutcome {
    pub state: GameState,
    pub notifications: Vec<Notification>,
    pub report: OfflineReport,
}

/// A fresh colony with the catalog's locked artifact collection seeded in.
pub fn new_game(catalogs: &Catalogs, now_ms: u64) -> GameState {
    let mut state = GameState::new(now_ms);
    state.artifacts = catalogs.seed_artifacts();
    state
}

/// Flat capacity additions that live outside the building roster.
pub(crate) fn external_capacity(state: &GameState) -> ResourceAmounts {
    match &state.black_hole {
        Some(hole) => ResourceAmounts::new().with(ResourceKind::Energy, hole.energy_capacity_bonus()),
        None => ResourceAmounts::new(),
    }
}

/// Drop workers until the roster fits the colonists actually present
/// (assigned plus away-on-expedition never exceeds total).
fn repair_over_assignment(state: &mut GameState) {
    let max_assignable = state
        .population
        .total
        .saturating_sub(state.expedition_crew());
    let shed = population::shed_excess_workers(&mut state.buildings, max_assignable);
    if shed > 0 {
        log::error!(
            "{} workers were assigned beyond the living population; unassigned",
            shed
        );
    }
    state.refresh_available();
}

/// Advance one active-play tick to `now_ms`.
///
/// While paused only the clock moves, so unpausing never produces a
/// surprise catch-up. The caller publishes the returned snapshot before
/// scheduling the next tick.
pub fn tick(
    state: &GameState,
    catalogs: &Catalogs,
    now_ms: u64,
    rng: &mut impl Rng,
) -> TickOutcome {
    let mut next = state.clone();
    let mut notes = Vec::new();

    let delta_ms = now_ms.saturating_sub(next.last_update_ms);
    next.last_update_ms = now_ms;
    if next.paused || delta_ms == 0 {
        return TickOutcome {
            state: next,
            notifications: notes,
        };
    }
    let delta_seconds = delta_ms as f64 / 1000.0;

    // Worker bookkeeping first; a negative pool is a logic error to repair,
    // never something the flow engine should see.
    next.refresh_available();
    if next.population.available < 0 {
        repair_over_assignment(&mut next);
    }

    // Efficiency from current stocks, then rate accumulation.
    next.resources.reset_rates();
    evaluate_efficiency(&mut next.buildings, &next.resources);
    let modifiers = next.flow_modifiers();
    flow::apply_building_effects(&next.buildings, &mut next.resources, modifiers);
    population::apply_life_support(&next.population, &mut next.resources);

    // Capacity is rederived every tick: storage buildings, milestone
    // bonuses, artifact modifiers, and the quantum battery all feed in.
    let extra = external_capacity(&next);
    flow::recompute_capacities(&next.buildings, &mut next.resources, modifiers, &extra);

    next.resources.settle(delta_seconds);

    // Shortage alarms are edge-triggered against the incoming snapshot.
    for kind in flow::detect_shortages(&next.resources) {
        let previous = state.resources.get(kind);
        let was_short = previous.amount <= 0.0 && previous.net_rate() < 0.0;
        if !was_short {
            log::warn!("critical {} shortage", kind.name());
            notes.push(Notification::ResourceShortage { kind });
        }
    }

    // Population dynamics follow the settled pools.
    next.population.max_capacity = next.housing_capacity();
    let arrivals = population::tick_growth(&mut next.population, &next.resources, delta_seconds);
    if arrivals > 0 {
        notes.push(Notification::ColonistsArrived { count: arrivals });
    }
    let deaths = population::tick_survival(&mut next.population, &next.resources, delta_seconds);
    if deaths > 0 {
        log::warn!("{} colonists lost to life-support failure", deaths);
        notes.push(Notification::ColonistsLost { count: deaths });
        repair_over_assignment(&mut next);
    }
    next.refresh_available();

    // The black hole runs on its own clock, writing straight into the
    // energy pool. It forms on the first tick after its unlock.
    if next.black_hole_unlocked() {
        if next.black_hole.is_none() {
            log::info!("black hole formed");
            next.black_hole = Some(BlackHole::new());
        }
        if let Some(hole) = next.black_hole.as_mut() {
            hole.tick(next.resources.get_mut(ResourceKind::Energy), delta_seconds);
        }
    }

    expeditions::tick_expeditions(&mut next, catalogs, delta_seconds, rng, &mut notes);
    next.refresh_available();
    if next.population.available < 0 {
        repair_over_assignment(&mut next);
    }

    // Milestones consume the fully settled state.
    check_milestones(&mut next, catalogs, &mut notes);

    next.playtime_seconds += delta_seconds;

    TickOutcome {
        state: next,
        notifications: notes,
    }
}

/// Session resume: replace the per-tick flow with the segmented offline
/// replay, then run the milestone engine once against the result.
pub fn resume(state: &GameState, catalogs: &Catalogs, now_ms: u64) -> ResumeOutcome {
    let mut next = state.clone();
    let mut notes = Vec::new();

    let elapsed_ms = now_ms.saturating_sub(next.last_update_ms) as f64;
    next.last_update_ms = now_ms;

    // Capacities must be current before the replay measures headroom.
    let modifiers = next.flow_modifiers();
    let extra = external_capacity(&next);
    flow::recompute_capacities(&next.buildings, &mut next.resources, modifiers, &extra);

    let outcome =
        offline::simulate_offline(&next.buildings, &next.resources, modifiers, elapsed_ms);
    log::info!(
        "offline catch-up: {:.1} min simulated of {:.1} min away",
        outcome.simulated_ms / 60_000.0,
        elapsed_ms / 60_000.0
    );
    next.resources = outcome.resources;

    check_milestones(&mut next, catalogs, &mut notes);

    ResumeOutcome {
        state: next,
        notifications: notes,
        report: OfflineReport {
            elapsed_ms,
            simulated_ms: outcome.simulated_ms,
            resource_changes: outcome.changes,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{dispatch, Command};
    use outpost_logic::buildings::BuildingKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(11)
    }

    fn catalogs() -> Catalogs {
        Catalogs::standard()
    }

    /// Spec scenario: 10 colonists, no buildings, one 1-second tick →
    /// oxygen and food each drop by 0.7.
    #[test]
    fn test_life_support_scenario() {
        let catalogs = catalogs();
        let state = new_game(&catalogs, 0);
        let oxygen_before = state.resources.get(ResourceKind::Oxygen).amount;
        let outcome = tick(&state, &catalogs, 1_000, &mut rng());
        let oxygen = outcome.state.resources.get(ResourceKind::Oxygen).amount;
        let food = outcome.state.resources.get(ResourceKind::Food).amount;
        assert!((oxygen - (oxygen_before - 0.7)).abs() < 1e-9);
        assert!((food - 49.3).abs() < 1e-9);
    }

    #[test]
    fn test_invariants_hold_across_many_ticks() {
        let catalogs = catalogs();
        let mut state = new_game(&catalogs, 0);
        let (with_gen, _) = dispatch(
            &state,
            &catalogs,
            Command::ConstructBuilding {
                kind: BuildingKind::OxygenGenerator,
            },
        );
        state = with_gen;
        let mut rng = rng();
        let mut now = 0u64;
        for _ in 0..500 {
            now += 1_000;
            let outcome = tick(&state, &catalogs, now, &mut rng);
            state = outcome.state;
            for (_, pool) in state.resources.iter() {
                assert!(pool.amount >= 0.0);
                assert!(pool.amount <= pool.capacity);
                assert!(pool.amount.is_finite());
            }
            let assigned: u32 = state.buildings.iter().map(|b| b.assigned_workers).sum();
            assert_eq!(
                state.population.available,
                state.population.total as i64 - assigned as i64
            );
        }
    }

    #[test]
    fn test_paused_tick_only_moves_the_clock() {
        let catalogs = catalogs();
        let mut state = new_game(&catalogs, 0);
        state.paused = true;
        let outcome = tick(&state, &catalogs, 60_000, &mut rng());
        assert_eq!(outcome.state.last_update_ms, 60_000);
        assert_eq!(outcome.state.resources, state.resources);
        assert_eq!(outcome.state.playtime_seconds, 0.0);
    }

    #[test]
    fn test_shortage_notification_fires_once() {
        let catalogs = catalogs();
        let mut state = new_game(&catalogs, 0);
        state.resources.get_mut(ResourceKind::Oxygen).amount = 0.5;
        let mut rng = rng();

        let first = tick(&state, &catalogs, 10_000, &mut rng);
        assert!(first
            .notifications
            .iter()
            .any(|n| matches!(n, Notification::ResourceShortage { kind: ResourceKind::Oxygen })));

        let second = tick(&first.state, &catalogs, 20_000, &mut rng);
        assert!(!second
            .notifications
            .iter()
            .any(|n| matches!(n, Notification::ResourceShortage { kind: ResourceKind::Oxygen })));
    }

    #[test]
    fn test_black_hole_forms_after_unlock_and_feeds_energy() {
        let catalogs = catalogs();
        let mut state = new_game(&catalogs, 0);
        state
            .galactic_upgrades
            .insert(crate::state::BLACK_HOLE_UNLOCK.to_string());
        state.resources.get_mut(ResourceKind::Energy).amount = 0.0;

        let outcome = tick(&state, &catalogs, 1_000, &mut rng());
        let hole = outcome.state.black_hole.as_ref().unwrap();
        assert!(hole.mass >= 1.0);
        assert!(outcome.state.resources.get(ResourceKind::Energy).amount > 0.0);
    }

    #[test]
    fn test_resume_matches_offline_policy() {
        let catalogs = catalogs();
        let mut state = new_game(&catalogs, 0);
        // A solar array with its worker produces 2.6 energy/s at full
        // efficiency; offline it is crushed to 3%.
        let (with_array, _) = dispatch(
            &state,
            &catalogs,
            Command::ConstructBuilding {
                kind: BuildingKind::SolarArray,
            },
        );
        state = with_array;
        let id = state.buildings[0].id;
        let (staffed, _) = dispatch(
            &state,
            &catalogs,
            Command::AssignWorkers {
                building_id: id,
                delta: 1,
            },
        );
        state = staffed;
        state.resources.get_mut(ResourceKind::Energy).amount = 0.0;

        let outcome = resume(&state, &catalogs, 48 * 3_600_000);
        assert_eq!(outcome.report.simulated_ms, offline::MAX_OFFLINE_MS);
        let energy = outcome.state.resources.get(ResourceKind::Energy);
        // Gain is capped at 25% of capacity.
        assert!(energy.amount <= 0.25 * energy.capacity + 1e-9);
        assert!(energy.amount > 0.0);
        assert!(
            (outcome.report.resource_changes.get(ResourceKind::Energy) - energy.amount).abs()
                < 1e-9
        );
    }

    #[test]
    fn test_resume_runs_milestones_against_result() {
        let catalogs = catalogs();
        let mut state = new_game(&catalogs, 0);
        // Completing singularity studies offline still unlocks the gate on
        // the resume's milestone pass.
        state.researched.insert("singularity_studies".into());
        let outcome = resume(&state, &catalogs, 1_000);
        assert!(outcome.state.black_hole_unlocked());
        assert!(outcome
            .notifications
            .iter()
            .any(|n| matches!(n, Notification::MilestoneUnlocked { .. })));
    }

    #[test]
    fn test_colonist_growth_fires_notifications() {
        let catalogs = catalogs();
        let mut state = new_game(&catalogs, 0);
        let (with_dome, _) = dispatch(
            &state,
            &catalogs,
            Command::ConstructBuilding {
                kind: BuildingKind::HabitatDome,
            },
        );
        state = with_dome;
        // Deep stockpiles so a minute of life support cannot hit the
        // growth floor; the dome provides the housing headroom.
        for kind in [ResourceKind::Oxygen, ResourceKind::Food] {
            let pool = state.resources.get_mut(kind);
            pool.base_capacity = 10_000.0;
            pool.capacity = 10_000.0;
            pool.amount = 10_000.0;
        }

        let mut rng = rng();
        let mut arrived = false;
        let mut now = 0u64;
        for _ in 0..60 {
            now += 1_000;
            let outcome = tick(&state, &catalogs, now, &mut rng);
            arrived |= outcome
                .notifications
                .iter()
                .any(|n| matches!(n, Notification::ColonistsArrived { .. }));
            state = outcome.state;
        }
        assert!(arrived);
        assert!(state.population.total > 10);
        assert_eq!(state.population.max_capacity, 15);
    }
}
