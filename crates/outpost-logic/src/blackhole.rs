//! Black hole — an unlock-gated exotic subsystem feeding the energy pool.
//!
//! Once formed, the singularity accretes mass on its own schedule, emits
//! energy directly into the colony's energy pool, and sheds dark matter —
//! the currency for its own upgrade track. Growth stops at critical mass;
//! the player chooses when to collapse it, trading accumulated mass for a
//! dark matter payout.

use serde::{Deserialize, Serialize};

use crate::resources::Resource;

/// Configuration constants for black hole physics.
pub mod bh_constants {
    /// Base mass growth in solar masses per second.
    pub const BASE_MASS_GROWTH_RATE: f64 = 0.001;
    /// Growth ceiling before any capacity upgrades, in solar masses.
    pub const BASE_CRITICAL_MASS: f64 = 1000.0;
    /// A black hole never simulates below one solar mass.
    pub const MIN_MASS: f64 = 1.0;

    /// Fraction of accreted matter converted to usable growth.
    pub const ACCRETION_EFFICIENCY: f64 = 0.1;

    /// Dark matter generated per solar mass of growth.
    pub const DARK_MATTER_EFFICIENCY: f64 = 0.00001;
    /// Fraction of the dark matter stockpile lost per second.
    pub const DARK_MATTER_DECAY_RATE: f64 = 0.001;

    /// Energy units emitted per solar mass per second.
    pub const ENERGY_PER_SOLAR_MASS: f64 = 1000.0;
    /// Hawking radiation loss scale (inversely proportional to mass).
    pub const HAWKING_RADIATION_FACTOR: f64 = 0.0001;

    /// Schwarzschild radius in km per solar mass.
    pub const SCHWARZSCHILD_KM_PER_SOLAR_MASS: f64 = 2.95;
    /// Hawking temperature numerator, in kelvin·solar-masses.
    pub const HAWKING_TEMPERATURE_SCALE: f64 = 6.17e-8;
    /// Evaporation lifetime scale, in years per cubed solar mass.
    pub const LIFETIME_YEARS_SCALE: f64 = 6.6e-5;

    /// Mass fraction paid out as dark matter on collapse.
    pub const COLLAPSE_YIELD: f64 = 0.5;

    /// Critical mass added per capacity upgrade level.
    pub const MASS_CAPACITY_PER_LEVEL: f64 = 1000.0;
    /// Growth rate bonus per accelerator level.
    pub const GROWTH_BONUS_PER_LEVEL: f64 = 0.15;
    /// Flat dark matter per second per synthesizer level.
    pub const DARK_MATTER_GEN_PER_LEVEL: f64 = 0.05;
    /// Energy capacity added per battery level.
    pub const ENERGY_CAPACITY_PER_LEVEL: f64 = 1_000_000.0;
}

/// The four purchasable upgrade tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlackHoleUpgradeKind {
    MassCapacity,
    GrowthRate,
    DarkMatterGen,
    EnergyCapacity,
}

/// Purchased level per upgrade track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    pub mass_capacity: u32,
    pub growth_rate: u32,
    pub dark_matter_gen: u32,
    pub energy_capacity: u32,
}

impl UpgradeLevels {
    pub fn get(&self, kind: BlackHoleUpgradeKind) -> u32 {
        match kind {
            BlackHoleUpgradeKind::MassCapacity => self.mass_capacity,
            BlackHoleUpgradeKind::GrowthRate => self.growth_rate,
            BlackHoleUpgradeKind::DarkMatterGen => self.dark_matter_gen,
            BlackHoleUpgradeKind::EnergyCapacity => self.energy_capacity,
        }
    }

    pub fn bump(&mut self, kind: BlackHoleUpgradeKind) {
        match kind {
            BlackHoleUpgradeKind::MassCapacity => self.mass_capacity += 1,
            BlackHoleUpgradeKind::GrowthRate => self.growth_rate += 1,
            BlackHoleUpgradeKind::DarkMatterGen => self.dark_matter_gen += 1,
            BlackHoleUpgradeKind::EnergyCapacity => self.energy_capacity += 1,
        }
    }
}

/// Dark matter price of the next level: `floor(baseCost × nextLevel^1.5)`.
pub fn upgrade_cost(base_cost: f64, next_level: u32) -> f64 {
    (base_cost * (next_level as f64).powf(1.5)).floor()
}

/// The singularity's persistent state plus per-tick derived display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlackHole {
    pub mass: f64,
    pub dark_matter: f64,
    pub upgrades: UpgradeLevels,
    pub age_seconds: f64,
    pub total_energy_produced: f64,

    // Derived each tick from mass; kept on the struct for display.
    pub energy_rate: f64,
    pub mass_growth_rate: f64,
    pub growth_multiplier: f64,
    pub schwarzschild_radius: f64,
    pub hawking_temperature: f64,
    pub estimated_lifetime: f64,
}

impl Default for BlackHole {
    fn default() -> Self {
        Self::new()
    }
}

impl BlackHole {
    pub fn new() -> Self {
        let mut hole = Self {
            mass: bh_constants::MIN_MASS,
            dark_matter: 0.0,
            upgrades: UpgradeLevels::default(),
            age_seconds: 0.0,
            total_energy_produced: 0.0,
            energy_rate: 0.0,
            mass_growth_rate: 0.0,
            growth_multiplier: 0.0,
            schwarzschild_radius: 0.0,
            hawking_temperature: 0.0,
            estimated_lifetime: 0.0,
        };
        hole.refresh_display_fields();
        hole
    }

    /// Current growth ceiling, including capacity upgrades.
    pub fn critical_mass(&self) -> f64 {
        bh_constants::BASE_CRITICAL_MASS
            + bh_constants::MASS_CAPACITY_PER_LEVEL * self.upgrades.mass_capacity as f64
    }

    pub fn at_critical_mass(&self) -> bool {
        self.mass >= self.critical_mass()
    }

    /// Extra energy storage granted by battery upgrades.
    pub fn energy_capacity_bonus(&self) -> f64 {
        bh_constants::ENERGY_CAPACITY_PER_LEVEL * self.upgrades.energy_capacity as f64
    }

    fn growth_bonus(&self) -> f64 {
        bh_constants::GROWTH_BONUS_PER_LEVEL * self.upgrades.growth_rate as f64
    }

    fn generator_rate(&self) -> f64 {
        bh_constants::DARK_MATTER_GEN_PER_LEVEL * self.upgrades.dark_matter_gen as f64
    }

    fn refresh_display_fields(&mut self) {
        let mass = self.mass.max(bh_constants::MIN_MASS);
        self.schwarzschild_radius = mass * bh_constants::SCHWARZSCHILD_KM_PER_SOLAR_MASS;
        self.hawking_temperature = bh_constants::HAWKING_TEMPERATURE_SCALE / mass;
        self.estimated_lifetime = mass.powi(3) * bh_constants::LIFETIME_YEARS_SCALE;
    }

    /// Advance the singularity by `delta_seconds`, writing emitted energy
    /// into the colony's energy pool (clamped to its capacity).
    ///
    /// Below critical mass: grow, emit, shed dark matter. At critical mass:
    /// growth and emission freeze, only the upgrade generator and decay keep
    /// moving dark matter, until a manual collapse.
    pub fn tick(&mut self, energy: &mut Resource, delta_seconds: f64) {
        let delta = delta_seconds.max(0.0);
        self.age_seconds += delta;

        let mass = self.mass.max(bh_constants::MIN_MASS);
        let critical = self.critical_mass();

        let mass_increase = if mass < critical {
            self.growth_multiplier = (mass / 10.0).powf(0.3);
            self.mass_growth_rate = bh_constants::BASE_MASS_GROWTH_RATE
                * (1.0 + self.growth_multiplier)
                * bh_constants::ACCRETION_EFFICIENCY
                * (1.0 + self.growth_bonus());
            let new_mass = (mass + self.mass_growth_rate * delta).min(critical);
            let increase = new_mass - mass;
            self.mass = new_mass;
            increase
        } else {
            self.mass = critical;
            self.mass_growth_rate = 0.0;
            0.0
        };

        let generated = mass_increase * bh_constants::DARK_MATTER_EFFICIENCY;
        let decay = self.dark_matter * bh_constants::DARK_MATTER_DECAY_RATE * delta;
        self.dark_matter =
            (self.dark_matter + generated + self.generator_rate() * delta - decay).max(0.0);

        if self.at_critical_mass() {
            self.energy_rate = 0.0;
        } else {
            let hawking_loss = bh_constants::HAWKING_RADIATION_FACTOR / self.mass;
            self.energy_rate =
                (self.mass * bh_constants::ENERGY_PER_SOLAR_MASS - hawking_loss).max(0.0);
        }

        let emitted = self.energy_rate * delta;
        energy.amount = (energy.amount + emitted).clamp(0.0, energy.capacity.max(0.0));
        self.total_energy_produced += emitted;

        self.refresh_display_fields();
    }

    /// Manual collapse: convert accumulated mass to dark matter at
    /// [`bh_constants::COLLAPSE_YIELD`] and restart from one solar mass.
    /// Returns the dark matter gained.
    pub fn collapse(&mut self) -> f64 {
        let payout = self.mass * bh_constants::COLLAPSE_YIELD;
        self.dark_matter += payout;
        self.mass = bh_constants::MIN_MASS;
        self.energy_rate = 0.0;
        self.mass_growth_rate = 0.0;
        self.growth_multiplier = 0.0;
        self.refresh_display_fields();
        payout
    }
}
