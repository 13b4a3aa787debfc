//! Notifications — the core's only output channel besides the snapshot.
//!
//! Every externally visible occurrence becomes one typed entry in the list
//! returned alongside the updated state. The host renders, logs, or drops
//! them; the core never assumes a consumer.

use serde::{Deserialize, Serialize};

use outpost_logic::buildings::BuildingKind;
use outpost_logic::resources::ResourceKind;

use crate::expeditions::ExpeditionType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    MilestoneUnlocked {
        id: String,
        name: String,
        tier: u32,
    },
    MilestoneRevoked {
        id: String,
        name: String,
    },
    BuildingConstructed {
        id: u64,
        kind: BuildingKind,
    },
    BuildingUpgraded {
        id: u64,
        kind: BuildingKind,
        level: u32,
    },
    WorkersReassigned {
        id: u64,
        kind: BuildingKind,
        assigned: u32,
    },
    TechnologyResearched {
        id: String,
    },
    ColonistsArrived {
        count: u32,
    },
    ColonistsLost {
        count: u32,
    },
    /// Edge-triggered: emitted only on the tick a pool first empties while
    /// still draining.
    ResourceShortage {
        kind: ResourceKind,
    },
    ExpeditionLaunched {
        id: u64,
        kind: ExpeditionType,
        tier: u32,
    },
    ExpeditionEvent {
        expedition_id: u64,
        event_id: String,
    },
    ExpeditionCompleted {
        id: u64,
    },
    ExpeditionFailed {
        id: u64,
    },
    ExpeditionCancelled {
        id: u64,
    },
    ArtifactRecovered {
        name: String,
    },
    BlackHoleUpgradePurchased {
        id: String,
        level: u32,
    },
    BlackHoleCollapsed {
        dark_matter_gained: f64,
    },
    CommandRejected {
        reason: String,
    },
}
