//! Resource pools — stockpiles, capacities, and per-tick flow rates.
//!
//! Each pool tracks a current `amount`, a derived `capacity`, and a
//! production/consumption rate pair. Rates are recomputed from scratch every
//! tick; only amounts and capacity baselines persist. Settling a time slice
//! integrates `net rate × delta` and clamps the result into `[0, capacity]`.

use serde::{Deserialize, Serialize};

/// The fixed set of colony resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Oxygen,
    Water,
    Food,
    Energy,
    Metals,
    Science,
}

impl ResourceKind {
    pub const COUNT: usize = 6;

    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::Oxygen,
        ResourceKind::Water,
        ResourceKind::Food,
        ResourceKind::Energy,
        ResourceKind::Metals,
        ResourceKind::Science,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Oxygen => "oxygen",
            ResourceKind::Water => "water",
            ResourceKind::Food => "food",
            ResourceKind::Energy => "energy",
            ResourceKind::Metals => "metals",
            ResourceKind::Science => "science",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A single resource pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Current stockpile. `0 ≤ amount ≤ capacity` after every settle.
    pub amount: f64,
    /// Effective capacity, rederived every tick from base + bonus + storage.
    pub capacity: f64,
    /// Baseline capacity before any bonuses.
    pub base_capacity: f64,
    /// Permanent capacity gained from milestone rewards.
    pub bonus_capacity: f64,
    /// Production rate in units/second. Recomputed every tick, never negative.
    pub production: f64,
    /// Consumption rate in units/second. Recomputed every tick, never negative.
    pub consumption: f64,
}

impl Resource {
    pub fn with_capacity(amount: f64, base_capacity: f64) -> Self {
        Self {
            amount,
            capacity: base_capacity,
            base_capacity,
            bonus_capacity: 0.0,
            production: 0.0,
            consumption: 0.0,
        }
    }

    /// Production minus consumption at this instant.
    pub fn net_rate(&self) -> f64 {
        self.production - self.consumption
    }

    /// Fraction of capacity currently filled, in [0,1].
    pub fn fill_ratio(&self) -> f64 {
        if self.capacity <= 0.0 {
            0.0
        } else {
            (self.amount / self.capacity).clamp(0.0, 1.0)
        }
    }
}

/// Clamp a settled amount into `[0, capacity]`. Non-finite arithmetic
/// collapses to zero rather than poisoning the pool.
fn clamp_amount(value: f64, capacity: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, capacity.max(0.0))
}

/// All resource pools, indexed by [`ResourceKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pools: [Resource; ResourceKind::COUNT],
}

impl Resources {
    pub fn new(pools: [Resource; ResourceKind::COUNT]) -> Self {
        Self { pools }
    }

    pub fn get(&self, kind: ResourceKind) -> &Resource {
        &self.pools[kind.index()]
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut Resource {
        &mut self.pools[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &Resource)> {
        ResourceKind::ALL.iter().map(move |&k| (k, self.get(k)))
    }

    /// Zero out all production/consumption counters at the start of a tick.
    pub fn reset_rates(&mut self) {
        for pool in &mut self.pools {
            pool.production = 0.0;
            pool.consumption = 0.0;
        }
    }

    /// Integrate one time slice of net flow and clamp every pool.
    ///
    /// Negative deltas are ignored — time never runs backwards here.
    pub fn settle(&mut self, delta_seconds: f64) {
        if !(delta_seconds > 0.0) {
            return;
        }
        for pool in &mut self.pools {
            let next = pool.amount + pool.net_rate() * delta_seconds;
            pool.amount = clamp_amount(next, pool.capacity);
        }
    }

    /// Re-clamp amounts after a capacity change (capacity may have shrunk).
    pub fn reclamp(&mut self) {
        for pool in &mut self.pools {
            pool.amount = clamp_amount(pool.amount, pool.capacity);
        }
    }

    pub fn can_afford(&self, cost: &ResourceAmounts) -> bool {
        cost.iter_nonzero()
            .all(|(kind, amount)| self.get(kind).amount >= amount)
    }

    /// Debit a cost table. Callers check [`Resources::can_afford`] first;
    /// amounts are floored at zero regardless.
    pub fn apply_cost(&mut self, cost: &ResourceAmounts) {
        for (kind, amount) in cost.iter_nonzero() {
            let pool = self.get_mut(kind);
            pool.amount = (pool.amount - amount).max(0.0);
        }
    }

    /// Credit an amount directly into a pool, clamped to capacity.
    pub fn deposit(&mut self, kind: ResourceKind, amount: f64) {
        let pool = self.get_mut(kind);
        pool.amount = clamp_amount(pool.amount + amount, pool.capacity);
    }
}

/// A per-resource table of scalar values — costs, rates, rewards, bonuses.
/// Entries default to zero; most tables are sparse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceAmounts {
    entries: [f64; ResourceKind::COUNT],
}

impl ResourceAmounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style entry setter, for catalog literals.
    pub fn with(mut self, kind: ResourceKind, amount: f64) -> Self {
        self.entries[kind.index()] = amount;
        self
    }

    pub fn get(&self, kind: ResourceKind) -> f64 {
        self.entries[kind.index()]
    }

    pub fn set(&mut self, kind: ResourceKind, amount: f64) {
        self.entries[kind.index()] = amount;
    }

    pub fn add(&mut self, kind: ResourceKind, amount: f64) {
        self.entries[kind.index()] += amount;
    }

    /// Merge another table into this one, entry by entry.
    pub fn merge(&mut self, other: &ResourceAmounts) {
        for kind in ResourceKind::ALL {
            self.entries[kind.index()] += other.entries[kind.index()];
        }
    }

    /// Every entry multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        for entry in &mut out.entries {
            *entry *= factor;
        }
        out
    }

    /// Every entry scaled then floored — the shape of upgrade cost tables.
    pub fn floor_scaled(&self, factor: f64) -> Self {
        let mut out = *self;
        for entry in &mut out.entries {
            *entry = (*entry * factor).floor();
        }
        out
    }

    pub fn iter_nonzero(&self) -> impl Iterator<Item = (ResourceKind, f64)> + '_ {
        ResourceKind::ALL
            .iter()
            .map(move |&k| (k, self.entries[k.index()]))
            .filter(|&(_, v)| v != 0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|&v| v == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(amount: f64, capacity: f64) -> Resource {
        Resource::with_capacity(amount, capacity)
    }

    fn resources_with(amount: f64, capacity: f64) -> Resources {
        Resources::new([pool(amount, capacity); ResourceKind::COUNT])
    }

    #[test]
    fn test_settle_integrates_net_rate() {
        let mut resources = resources_with(10.0, 100.0);
        resources.get_mut(ResourceKind::Oxygen).production = 2.0;
        resources.get_mut(ResourceKind::Oxygen).consumption = 0.5;
        resources.settle(4.0);
        assert!((resources.get(ResourceKind::Oxygen).amount - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_settle_clamps_to_capacity_and_zero() {
        let mut resources = resources_with(95.0, 100.0);
        resources.get_mut(ResourceKind::Food).production = 10.0;
        resources.get_mut(ResourceKind::Metals).consumption = 200.0;
        resources.settle(1.0);
        assert_eq!(resources.get(ResourceKind::Food).amount, 100.0);
        assert_eq!(resources.get(ResourceKind::Metals).amount, 0.0);
    }

    #[test]
    fn test_zero_capacity_pins_amount_at_zero() {
        let mut resources = resources_with(0.0, 0.0);
        resources.get_mut(ResourceKind::Energy).production = 50.0;
        resources.settle(10.0);
        assert_eq!(resources.get(ResourceKind::Energy).amount, 0.0);
    }

    #[test]
    fn test_settle_ignores_non_positive_delta() {
        let mut resources = resources_with(10.0, 100.0);
        resources.get_mut(ResourceKind::Water).production = 1.0;
        resources.settle(0.0);
        resources.settle(-5.0);
        assert_eq!(resources.get(ResourceKind::Water).amount, 10.0);
    }

    #[test]
    fn test_non_finite_amount_collapses_to_zero() {
        let mut resources = resources_with(10.0, 100.0);
        resources.get_mut(ResourceKind::Science).production = f64::INFINITY;
        resources.settle(1.0);
        assert_eq!(resources.get(ResourceKind::Science).amount, 0.0);
    }

    #[test]
    fn test_can_afford_and_apply_cost() {
        let mut resources = resources_with(50.0, 100.0);
        let cost = ResourceAmounts::new()
            .with(ResourceKind::Metals, 30.0)
            .with(ResourceKind::Energy, 20.0);
        assert!(resources.can_afford(&cost));
        resources.apply_cost(&cost);
        assert!((resources.get(ResourceKind::Metals).amount - 20.0).abs() < 1e-9);
        assert!((resources.get(ResourceKind::Energy).amount - 30.0).abs() < 1e-9);

        let too_much = ResourceAmounts::new().with(ResourceKind::Science, 51.0);
        assert!(!resources.can_afford(&too_much));
    }

    #[test]
    fn test_deposit_clamps_to_capacity() {
        let mut resources = resources_with(90.0, 100.0);
        resources.deposit(ResourceKind::Metals, 500.0);
        assert_eq!(resources.get(ResourceKind::Metals).amount, 100.0);
    }

    #[test]
    fn test_amounts_floor_scaled() {
        let base = ResourceAmounts::new().with(ResourceKind::Metals, 50.0);
        let cost = base.floor_scaled(1.5_f64.powi(3));
        assert_eq!(cost.get(ResourceKind::Metals), (50.0 * 3.375_f64).floor());
    }

    #[test]
    fn test_fill_ratio_zero_capacity() {
        let res = pool(5.0, 0.0);
        assert_eq!(res.fill_ratio(), 0.0);
    }
}
