//! Resource flow engine — aggregates building rates and settles time slices.
//!
//! The flow engine owns no state: callers hand it a building roster and a
//! set of resource pools, and it accumulates production/consumption rates,
//! integrates one bounded time slice, and clamps every pool into
//! `[0, capacity]`. Active ticks and offline catch-up both funnel through
//! here so the two paths cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::buildings::{evaluate_efficiency, Building};
use crate::resources::{ResourceAmounts, ResourceKind, Resources};

/// External rate/capacity multipliers (artifacts, factions). Read-only
/// inputs to the flow engine; `1.0` means no modifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowModifiers {
    pub production: f64,
    pub capacity: f64,
}

impl Default for FlowModifiers {
    fn default() -> Self {
        Self {
            production: 1.0,
            capacity: 1.0,
        }
    }
}

/// Accumulate every building's scaled rates into the pools' counters.
/// Rates only — amounts are untouched until [`Resources::settle`].
pub fn apply_building_effects(
    buildings: &[Building],
    resources: &mut Resources,
    modifiers: FlowModifiers,
) {
    for building in buildings {
        for (kind, rate) in building.production_rates().iter_nonzero() {
            resources.get_mut(kind).production += rate * modifiers.production;
        }
        for (kind, rate) in building.consumption_rates().iter_nonzero() {
            resources.get_mut(kind).consumption += rate;
        }
    }
}

/// Rederive every pool's effective capacity: base + bonus + building storage,
/// scaled by the capacity modifier, plus flat external additions (`extra`).
/// Amounts are re-clamped in case capacity shrank.
pub fn recompute_capacities(
    buildings: &[Building],
    resources: &mut Resources,
    modifiers: FlowModifiers,
    extra: &ResourceAmounts,
) {
    let mut storage = ResourceAmounts::new();
    for building in buildings {
        storage.merge(&building.storage_rates());
    }
    for kind in ResourceKind::ALL {
        let pool = resources.get_mut(kind);
        let raw = pool.base_capacity + pool.bonus_capacity + storage.get(kind) + extra.get(kind);
        pool.capacity = (raw * modifiers.capacity).max(0.0);
    }
    resources.reclamp();
}

/// One self-contained flow tick: rederive efficiency, accumulate building
/// rates, and settle `delta_seconds` of change. Population life support and
/// capacity recomputation are layered on by the engine's full pipeline; the
/// offline simulator uses this building-only form directly.
pub fn apply_tick(
    buildings: &mut [Building],
    resources: &mut Resources,
    delta_seconds: f64,
    modifiers: FlowModifiers,
) {
    resources.reset_rates();
    evaluate_efficiency(buildings, resources);
    apply_building_effects(buildings, resources, modifiers);
    resources.settle(delta_seconds);
}

/// Resources that are empty while still draining — the shortage alarm set.
pub fn detect_shortages(resources: &Resources) -> Vec<ResourceKind> {
    resources
        .iter()
        .filter(|(_, pool)| pool.amount <= 0.0 && pool.net_rate() < 0.0)
        .map(|(kind, _)| kind)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buildings::{BuildingCategory, BuildingKind};
    use crate::resources::Resource;

    fn pools(amount: f64, capacity: f64) -> Resources {
        Resources::new([Resource::with_capacity(amount, capacity); ResourceKind::COUNT])
    }

    fn generator() -> Building {
        Building {
            id: 7,
            kind: BuildingKind::OxygenGenerator,
            category: BuildingCategory::Production,
            level: 2,
            worker_capacity: 2,
            assigned_workers: 2,
            efficiency: 0.0,
            base_cost: ResourceAmounts::new().with(ResourceKind::Metals, 50.0),
            base_production: ResourceAmounts::new().with(ResourceKind::Oxygen, 1.0),
            base_consumption: ResourceAmounts::new().with(ResourceKind::Energy, 0.5),
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
    fn test_apply_tick_advances_amounts() {
        let mut buildings = vec![generator()];
        let mut resources = pools(50.0, 200.0);
        apply_tick(&mut buildings, &mut resources, 10.0, FlowModifiers::default());
        // Level 2 at full efficiency: +2 oxygen/s, -1 energy/s.
        assert!((resources.get(ResourceKind::Oxygen).amount - 70.0).abs() < 1e-9);
        assert!((resources.get(ResourceKind::Energy).amount - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_amounts_never_leave_bounds() {
        let mut buildings = vec![generator()];
        let mut resources = pools(199.0, 200.0);
        apply_tick(&mut buildings, &mut resources, 3600.0, FlowModifiers::default());
        for (_, pool) in resources.iter() {
            assert!(pool.amount >= 0.0);
            assert!(pool.amount <= pool.capacity);
        }
    }

    #[test]
    fn test_production_modifier_scales_output_only() {
        let mut buildings = vec![generator()];
        let mut resources = pools(50.0, 500.0);
        let boosted = FlowModifiers {
            production: 2.0,
            capacity: 1.0,
        };
        apply_tick(&mut buildings, &mut resources, 1.0, boosted);
        assert!((resources.get(ResourceKind::Oxygen).production - 4.0).abs() < 1e-9);
        assert!((resources.get(ResourceKind::Energy).consumption - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_recompute_capacities_includes_storage_and_extra() {
        let mut depot = generator();
        depot.kind = BuildingKind::StorageDepot;
        depot.category = BuildingCategory::Storage;
        depot.worker_capacity = 0;
        depot.assigned_workers = 0;
        depot.base_production = ResourceAmounts::new();
        depot.base_consumption = ResourceAmounts::new();
        depot.storage_bonus = ResourceAmounts::new().with(ResourceKind::Metals, 100.0);
        depot.level = 3;

        let buildings = vec![depot];
        let mut resources = pools(0.0, 200.0);
        let extra = ResourceAmounts::new().with(ResourceKind::Energy, 1000.0);
        recompute_capacities(&buildings, &mut resources, FlowModifiers::default(), &extra);

        assert!((resources.get(ResourceKind::Metals).capacity - 500.0).abs() < 1e-9);
        assert!((resources.get(ResourceKind::Energy).capacity - 1200.0).abs() < 1e-9);
        assert!((resources.get(ResourceKind::Oxygen).capacity - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_capacity_shrink_reclamps_amounts() {
        let mut resources = pools(150.0, 200.0);
        let shrink = FlowModifiers {
            production: 1.0,
            capacity: 0.5,
        };
        recompute_capacities(&[], &mut resources, shrink, &ResourceAmounts::new());
        assert!((resources.get(ResourceKind::Food).capacity - 100.0).abs() < 1e-9);
        assert!((resources.get(ResourceKind::Food).amount - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_detect_shortages_is_edge_sensitive() {
        let mut resources = pools(0.0, 100.0);
        resources.get_mut(ResourceKind::Oxygen).consumption = 1.0;
        resources.get_mut(ResourceKind::Food).production = 1.0;
        resources.get_mut(ResourceKind::Food).consumption = 0.5;
        let shortages = detect_shortages(&resources);
        assert_eq!(shortages, vec![ResourceKind::Oxygen]);
    }
}
