//! Offline catch-up — segmented, efficiency-penalized replay of the economy.
//!
//! A returning session may carry hours of elapsed time. Instead of looping
//! second-by-second, the interval is cut into the longest segments over
//! which no filling resource can overflow: rates are constant within a
//! segment, so each segment is settled in one multiplication. Offline play
//! is deliberately far weaker than active play — building efficiency is
//! crushed to a few percent and total gains are capped per resource.

use crate::buildings::{evaluate_efficiency, Building};
use crate::flow::{apply_building_effects, FlowModifiers};
use crate::resources::{ResourceAmounts, ResourceKind, Resources};

/// Elapsed time beyond this is discarded, not banked.
pub const MAX_OFFLINE_MS: f64 = 12.0 * 60.0 * 60.0 * 1000.0;
/// Offline efficiency is active efficiency times this factor…
pub const OFFLINE_EFFICIENCY_FACTOR: f64 = 0.03;
/// …and never above this absolute ceiling, whichever is lower.
pub const OFFLINE_EFFICIENCY_CAP: f64 = 0.05;
/// No resource may gain more than this fraction of its capacity offline.
pub const MAX_OFFLINE_GAIN_RATIO: f64 = 0.25;
/// Safety valve: rates change between segments, so bound the segment count.
const MAX_SEGMENTS: u32 = 256;

/// Result of an offline replay: the settled pools plus the per-resource
/// deltas actually applied after all caps, for the host's welcome-back
/// report.
#[derive(Debug, Clone)]
pub struct OfflineOutcome {
    pub resources: Resources,
    /// Milliseconds of the gap actually simulated (post 12 h cap).
    pub simulated_ms: f64,
    /// Net change per resource relative to the pre-catch-up amounts.
    pub changes: ResourceAmounts,
}

/// Replay `elapsed_ms` of building economy at offline efficiency.
///
/// Population life support does not run offline — the colony is assumed to
/// idle at subsistence — so amounts can only be reduced by building
/// consumption, and the final per-resource clamp guarantees no pool ends
/// below its pre-catch-up amount.
pub fn simulate_offline(
    buildings: &[Building],
    resources: &Resources,
    modifiers: FlowModifiers,
    elapsed_ms: f64,
) -> OfflineOutcome {
    if !(elapsed_ms > 0.0) {
        return OfflineOutcome {
            resources: resources.clone(),
            simulated_ms: 0.0,
            changes: ResourceAmounts::new(),
        };
    }

    let simulated_ms = elapsed_ms.min(MAX_OFFLINE_MS);
    let mut current = resources.clone();
    let mut roster = buildings.to_vec();
    let mut remaining_ms = simulated_ms;
    let mut segments = 0;

    while remaining_ms > 0.0 && segments < MAX_SEGMENTS {
        segments += 1;

        // Efficiency at this point in the replay, then the offline penalty.
        evaluate_efficiency(&mut roster, &current);
        for building in &mut roster {
            building.efficiency =
                (building.efficiency * OFFLINE_EFFICIENCY_FACTOR).min(OFFLINE_EFFICIENCY_CAP);
        }

        current.reset_rates();
        apply_building_effects(&roster, &mut current, modifiers);

        // Longest stretch before any filling resource would overflow.
        // Draining or idle pools do not bound the segment; a pool already at
        // capacity yields no positive time-to-capacity and is skipped, which
        // is what keeps this loop from stalling.
        let mut segment_ms = remaining_ms;
        for (_, pool) in current.iter() {
            let net = pool.net_rate();
            if net <= 0.0 {
                continue;
            }
            let to_capacity_ms = (pool.capacity - pool.amount) / net * 1000.0;
            if to_capacity_ms > 0.0 {
                segment_ms = segment_ms.min(to_capacity_ms);
            }
        }

        current.settle(segment_ms / 1000.0);
        remaining_ms -= segment_ms;
    }

    // Global caps: never below the pre-catch-up amount, never more than a
    // quarter of capacity gained.
    let mut changes = ResourceAmounts::new();
    for kind in ResourceKind::ALL {
        let before = resources.get(kind).amount;
        let pool = current.get_mut(kind);
        let max_gain = pool.capacity * MAX_OFFLINE_GAIN_RATIO;
        pool.amount = pool.amount.clamp(before, before + max_gain);
        changes.set(kind, pool.amount - before);
    }

    OfflineOutcome {
        resources: current,
        simulated_ms,
        changes,
    }
}
