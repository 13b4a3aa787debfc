//! Building instances and the efficiency evaluator.
//!
//! A building's effective output is its base rate table scaled by level and
//! by an `efficiency` scalar in [0,1]. Efficiency is derived every tick from
//! two factors: worker staffing and availability of the building's input
//! resources. Both factors are monotone — adding workers or refilling inputs
//! never lowers efficiency.

use serde::{Deserialize, Serialize};

use crate::resources::{ResourceAmounts, Resources};

/// Construction menu grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingCategory {
    Production,
    Housing,
    Research,
    Storage,
}

/// Identifies a building template in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    OxygenGenerator,
    HydroponicFarm,
    WaterReclaimer,
    SolarArray,
    MetalExtractor,
    ResearchLab,
    HabitatDome,
    StorageDepot,
    BatteryBank,
    GeothermalPlant,
    DeepMine,
    FusionReactor,
}

impl BuildingKind {
    pub fn name(self) -> &'static str {
        match self {
            BuildingKind::OxygenGenerator => "Oxygen Generator",
            BuildingKind::HydroponicFarm => "Hydroponic Farm",
            BuildingKind::WaterReclaimer => "Water Reclaimer",
            BuildingKind::SolarArray => "Solar Array",
            BuildingKind::MetalExtractor => "Metal Extractor",
            BuildingKind::ResearchLab => "Research Lab",
            BuildingKind::HabitatDome => "Habitat Dome",
            BuildingKind::StorageDepot => "Storage Depot",
            BuildingKind::BatteryBank => "Battery Bank",
            BuildingKind::GeothermalPlant => "Geothermal Plant",
            BuildingKind::DeepMine => "Deep Mine",
            BuildingKind::FusionReactor => "Fusion Reactor",
        }
    }
}

/// Flat additive production/storage granted by special building variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniqueBonus {
    pub production: ResourceAmounts,
    pub storage: ResourceAmounts,
}

/// A constructed building instance. Template data (base tables, multipliers)
/// is copied in at construction time so instances are self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: u64,
    pub kind: BuildingKind,
    pub category: BuildingCategory,
    pub level: u32,
    pub worker_capacity: u32,
    pub assigned_workers: u32,
    /// Derived each tick by [`evaluate_efficiency`]; never a persisted input.
    pub efficiency: f64,
    pub base_cost: ResourceAmounts,
    pub base_production: ResourceAmounts,
    pub base_consumption: ResourceAmounts,
    /// Extra storage capacity per level, for storage-class buildings.
    pub storage_bonus: ResourceAmounts,
    /// Colonist housing provided per level, for housing-class buildings.
    pub housing_capacity: u32,
    pub cost_multiplier: f64,
    pub production_multiplier: f64,
    pub tier: u32,
    pub upgrades: u32,
    pub unique_bonus: Option<UniqueBonus>,
}

impl Building {
    /// Worker staffing factor in [0,1]. Structures with no worker slots
    /// (storage, batteries) run unmanned at full staffing.
    pub fn staffing_ratio(&self) -> f64 {
        if self.worker_capacity == 0 {
            return 1.0;
        }
        (self.assigned_workers as f64 / self.worker_capacity as f64).min(1.0)
    }

    /// Consumption need per second at the current level, before efficiency.
    pub fn input_need(&self) -> ResourceAmounts {
        self.base_consumption.scaled(self.level as f64)
    }

    /// Effective production rate table for the current level and efficiency.
    pub fn production_rates(&self) -> ResourceAmounts {
        let mut rates = self
            .base_production
            .scaled(self.level as f64 * self.efficiency * self.production_multiplier);
        if let Some(bonus) = &self.unique_bonus {
            rates.merge(&bonus.production.scaled(self.efficiency));
        }
        rates
    }

    /// Effective consumption rate table for the current level and efficiency.
    pub fn consumption_rates(&self) -> ResourceAmounts {
        self.base_consumption.scaled(self.level as f64 * self.efficiency)
    }

    /// Storage capacity contributed at the current level.
    pub fn storage_rates(&self) -> ResourceAmounts {
        let mut storage = self.storage_bonus.scaled(self.level as f64);
        if let Some(bonus) = &self.unique_bonus {
            storage.merge(&bonus.storage);
        }
        storage
    }

    /// Cost of the next level: `floor(base × costMultiplier^level)` per resource.
    pub fn upgrade_cost(&self) -> ResourceAmounts {
        self.base_cost
            .floor_scaled(self.cost_multiplier.powi(self.level as i32))
    }
}

/// Input availability factor in [0,1]: the worst-supplied input resource,
/// measured against one second of consumption need. A building with no
/// inputs is never throttled.
fn input_availability(building: &Building, resources: &Resources) -> f64 {
    let mut worst = 1.0_f64;
    for (kind, need) in building.input_need().iter_nonzero() {
        if need <= 0.0 {
            continue;
        }
        let available = resources.get(kind).amount;
        worst = worst.min((available / need).clamp(0.0, 1.0));
    }
    worst
}

/// Derive every building's efficiency from staffing and input availability.
/// Pure with respect to `resources`; an empty roster is a no-op.
pub fn evaluate_efficiency(buildings: &mut [Building], resources: &Resources) {
    for building in buildings {
        let staffing = building.staffing_ratio();
        let inputs = input_availability(building, resources);
        building.efficiency = (staffing * inputs).clamp(0.0, 1.0);
    }
}
