//! Population — life support draw, worker bookkeeping, growth, and survival.
//!
//! Colonists consume oxygen and food every second just by existing. Workers
//! are a shared pool: `available = total − Σ assignedWorkers` across the
//! roster. Growth and survival are slow feedback loops layered on top —
//! comfortable colonies attract new arrivals, while a colony whose oxygen or
//! food stays at zero starts losing people after a grace countdown.

use serde::{Deserialize, Serialize};

use crate::buildings::Building;
use crate::resources::{ResourceKind, Resources};

/// Oxygen drawn per colonist per second.
pub const OXYGEN_PER_PERSON: f64 = 0.07;
/// Food drawn per colonist per second.
pub const FOOD_PER_PERSON: f64 = 0.07;

/// Growth progress gained per second while conditions are comfortable.
/// One colonist arrives each time progress reaches 1.0 (50 s at full rate).
pub const GROWTH_PER_SECOND: f64 = 0.02;
/// Minimum oxygen and food stockpile for colonists to keep arriving.
pub const GROWTH_RESOURCE_FLOOR: f64 = 10.0;

/// Grace period before an empty, draining life-support pool turns lethal.
pub const DEATH_COUNTDOWN_SECONDS: f64 = 60.0;
/// One colonist dies per this many seconds of continued deficit.
pub const DEATH_INTERVAL_SECONDS: f64 = 1.0;

/// The colony's population ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub total: u32,
    /// Workers not assigned to any building. Negative values are transient
    /// over-assignment states the caller must resolve before the next tick.
    pub available: i64,
    /// Housing-derived ceiling on `total`.
    pub max_capacity: u32,
    /// Seconds left before colonists start dying; `None` while life support
    /// holds.
    pub death_timer: Option<f64>,
    /// Fractional progress toward the next arriving colonist.
    pub growth_progress: f64,
}

impl Population {
    pub fn new(total: u32, max_capacity: u32) -> Self {
        Self {
            total,
            available: total as i64,
            max_capacity,
            death_timer: None,
            growth_progress: 0.0,
        }
    }
}

/// Sum of workers assigned across the whole roster.
pub fn assigned_workers(buildings: &[Building]) -> u32 {
    buildings.iter().map(|b| b.assigned_workers).sum()
}

/// Add the colony's life-support draw to the oxygen and food counters.
pub fn apply_life_support(population: &Population, resources: &mut Resources) {
    let heads = population.total as f64;
    resources.get_mut(ResourceKind::Oxygen).consumption += heads * OXYGEN_PER_PERSON;
    resources.get_mut(ResourceKind::Food).consumption += heads * FOOD_PER_PERSON;
}

/// Rederive `available` from the roster. Returns the new value; a negative
/// result means more workers are assigned than colonists exist, which the
/// caller must surface and repair — it is never clamped here.
pub fn recalculate_available(population: &mut Population, buildings: &[Building]) -> i64 {
    population.available = population.total as i64 - assigned_workers(buildings) as i64;
    population.available
}

/// Advance colonist growth. Returns how many colonists arrived this slice.
///
/// Growth requires housing headroom and both life-support stockpiles above
/// the comfort floor; otherwise progress holds (it does not decay).
pub fn tick_growth(population: &mut Population, resources: &Resources, delta_seconds: f64) -> u32 {
    if delta_seconds <= 0.0 || population.total >= population.max_capacity {
        return 0;
    }
    let oxygen = resources.get(ResourceKind::Oxygen).amount;
    let food = resources.get(ResourceKind::Food).amount;
    if oxygen < GROWTH_RESOURCE_FLOOR || food < GROWTH_RESOURCE_FLOOR {
        return 0;
    }

    population.growth_progress += GROWTH_PER_SECOND * delta_seconds;
    let mut arrivals = 0;
    while population.growth_progress >= 1.0 && population.total < population.max_capacity {
        population.growth_progress -= 1.0;
        population.total += 1;
        population.available += 1;
        arrivals += 1;
    }
    if population.total >= population.max_capacity {
        population.growth_progress = 0.0;
    }
    arrivals
}

/// Advance the survival countdown. Returns how many colonists died.
///
/// The timer arms when oxygen or food is empty and still draining, counts
/// down through the grace period, then claims one colonist per
/// [`DEATH_INTERVAL_SECONDS`] until the deficit ends. Any recovery clears
/// the timer immediately.
pub fn tick_survival(population: &mut Population, resources: &Resources, delta_seconds: f64) -> u32 {
    let critical = [ResourceKind::Oxygen, ResourceKind::Food].iter().any(|&kind| {
        let pool = resources.get(kind);
        pool.amount <= 0.0 && pool.net_rate() < 0.0
    });

    if !critical {
        population.death_timer = None;
        return 0;
    }
    if delta_seconds <= 0.0 || population.total == 0 {
        return 0;
    }

    let mut timer = population.death_timer.unwrap_or(DEATH_COUNTDOWN_SECONDS);
    timer -= delta_seconds;

    let mut deaths = 0;
    while timer < 0.0 && population.total > 0 {
        population.total -= 1;
        population.available -= 1;
        deaths += 1;
        timer += DEATH_INTERVAL_SECONDS;
    }
    population.death_timer = Some(timer.max(0.0));
    deaths
}

/// Unassign workers until no more than `max_assignable` remain on the
/// roster. Returns how many workers were shed. Used after colonist deaths
/// or expedition losses leave the roster over-assigned; the caller
/// rederives `available` afterwards.
pub fn shed_excess_workers(buildings: &mut [Building], max_assignable: u32) -> u32 {
    let mut excess = assigned_workers(buildings) as i64 - max_assignable as i64;
    if excess <= 0 {
        return 0;
    }
    let mut shed = 0;
    // Walk the roster from the back so early, load-bearing buildings keep
    // their crews longest.
    for building in buildings.iter_mut().rev() {
        if excess <= 0 {
            break;
        }
        let take = (building.assigned_workers as i64).min(excess) as u32;
        building.assigned_workers -= take;
        excess -= take as i64;
        shed += take;
    }
    shed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::{BuildingCategory, BuildingKind};
    use crate::resources::{Resource, ResourceAmounts};

    fn pools(amount: f64) -> Resources {
        Resources::new([Resource::with_capacity(amount, 100.0); ResourceKind::COUNT])
    }

    fn worker_building(assigned: u32) -> Building {
        Building {
            id: 1,
            kind: BuildingKind::MetalExtractor,
            category: BuildingCategory::Production,
            level: 1,
            worker_capacity: 10,
            assigned_workers: assigned,
            efficiency: 0.0,
            base_cost: ResourceAmounts::new(),
            base_production: ResourceAmounts::new(),
            base_consumption: ResourceAmounts::new(),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 0,
            cost_multiplier: 1.5,
            production_multiplier: 1.0,
            tier: 1,
            upgrades: 0,
            unique_bonus: None,
        }
    }

    #[test]
    fn test_life_support_draw_scales_with_population() {
        let population = Population::new(10, 20);
        let mut resources = pools(50.0);
        apply_life_support(&population, &mut resources);
        assert!((resources.get(ResourceKind::Oxygen).consumption - 0.7).abs() < 1e-9);
        assert!((resources.get(ResourceKind::Food).consumption - 0.7).abs() < 1e-9);
        assert_eq!(resources.get(ResourceKind::Water).consumption, 0.0);
    }

    #[test]
    fn test_recalculate_available_matches_roster() {
        let mut population = Population::new(10, 20);
        let buildings = vec![worker_building(3), worker_building(4)];
        let available = recalculate_available(&mut population, &buildings);
        assert_eq!(available, 3);
        assert_eq!(population.available, 3);
    }

    #[test]
    fn test_over_assignment_goes_negative_not_clamped() {
        let mut population = Population::new(5, 20);
        let buildings = vec![worker_building(8)];
        assert_eq!(recalculate_available(&mut population, &buildings), -3);
    }

    #[test]
    fn test_growth_accumulates_and_delivers_colonists() {
        let mut population = Population::new(10, 20);
        let resources = pools(50.0);
        let arrived = tick_growth(&mut population, &resources, 100.0);
        assert_eq!(arrived, 2);
        assert_eq!(population.total, 12);
        assert_eq!(population.available, 12);
    }

    #[test]
    fn test_growth_blocked_without_headroom_or_supplies() {
        let mut full = Population::new(20, 20);
        assert_eq!(tick_growth(&mut full, &pools(50.0), 100.0), 0);

        let mut hungry = Population::new(10, 20);
        assert_eq!(tick_growth(&mut hungry, &pools(1.0), 100.0), 0);
        assert_eq!(hungry.growth_progress, 0.0);
    }

    #[test]
    fn test_survival_timer_arms_and_claims_colonists() {
        let mut population = Population::new(10, 20);
        let mut resources = pools(0.0);
        resources.get_mut(ResourceKind::Oxygen).consumption = 1.0;

        // Grace period: no deaths yet.
        assert_eq!(tick_survival(&mut population, &resources, 30.0), 0);
        assert!(population.death_timer.is_some());

        // Past the countdown: 30 remaining + 5 over → 5 deaths.
        let deaths = tick_survival(&mut population, &resources, 35.0);
        assert_eq!(deaths, 5);
        assert_eq!(population.total, 5);
    }

    #[test]
    fn test_survival_timer_clears_on_recovery() {
        let mut population = Population::new(10, 20);
        let mut empty = pools(0.0);
        empty.get_mut(ResourceKind::Food).consumption = 1.0;
        tick_survival(&mut population, &empty, 10.0);
        assert!(population.death_timer.is_some());

        let recovered = pools(5.0);
        tick_survival(&mut population, &recovered, 1.0);
        assert!(population.death_timer.is_none());
        assert_eq!(population.total, 10);
    }

    #[test]
    fn test_shed_excess_workers_restores_invariant() {
        let mut buildings = vec![worker_building(4), worker_building(4)];
        let shed = shed_excess_workers(&mut buildings, 5);
        assert_eq!(shed, 3);
        assert_eq!(assigned_workers(&buildings), 5);
        // The later building loses its crew first.
        assert_eq!(buildings[0].assigned_workers, 4);
        assert_eq!(buildings[1].assigned_workers, 1);

        // Already within bounds: nothing moves.
        assert_eq!(shed_excess_workers(&mut buildings, 10), 0);
    }
}
