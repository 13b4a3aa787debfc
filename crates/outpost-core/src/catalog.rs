//! Static content catalogs — immutable lookup data resolved once at startup.
//!
//! Building templates, technologies, milestones, black hole upgrades, and
//! expedition events all live here, keyed by typed kind or string id. The
//! engine only ever reads them. [`Catalogs::validate`] runs once at startup
//! and reports content-authoring errors (duplicate ids, dangling or cyclic
//! prerequisites) so they never become runtime concerns.

use outpost_logic::blackhole::BlackHoleUpgradeKind;
use outpost_logic::buildings::{Building, BuildingCategory, BuildingKind, UniqueBonus};
use outpost_logic::resources::{ResourceAmounts, ResourceKind};

use crate::expeditions::ExpeditionType;
use crate::state::{Artifact, ArtifactEffect, ArtifactEffectKind, GameState, BLACK_HOLE_UNLOCK};

// ============================================================================
// BUILDINGS
// ============================================================================

/// A constructable building archetype. Instances copy these tables in at
/// construction so the roster is self-contained.
#[derive(Debug, Clone)]
pub struct BuildingTemplate {
    pub kind: BuildingKind,
    pub category: BuildingCategory,
    pub description: &'static str,
    pub worker_capacity: u32,
    pub max_instances: u32,
    pub base_cost: ResourceAmounts,
    pub base_production: ResourceAmounts,
    pub base_consumption: ResourceAmounts,
    pub storage_bonus: ResourceAmounts,
    pub housing_capacity: u32,
    pub cost_multiplier: f64,
    pub production_multiplier: f64,
    pub tier: u32,
    pub required_technology: Option<&'static str>,
    pub unique_bonus: Option<UniqueBonus>,
}

impl BuildingTemplate {
    pub fn instantiate(&self, id: u64) -> Building {
        Building {
            id,
            kind: self.kind,
            category: self.category,
            level: 1,
            worker_capacity: self.worker_capacity,
            assigned_workers: 0,
            efficiency: 0.0,
            base_cost: self.base_cost,
            base_production: self.base_production,
            base_consumption: self.base_consumption,
            storage_bonus: self.storage_bonus,
            housing_capacity: self.housing_capacity,
            cost_multiplier: self.cost_multiplier,
            production_multiplier: self.production_multiplier,
            tier: self.tier,
            upgrades: 0,
            unique_bonus: self.unique_bonus.clone(),
        }
    }
}

// ============================================================================
// TECHNOLOGIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechCategory {
    Infrastructure,
    Energy,
    Production,
    Research,
    Advanced,
}

#[derive(Debug, Clone)]
pub struct TechnologyDef {
    pub id: &'static str,
    pub name: &'static str,
    pub category: TechCategory,
    pub description: &'static str,
    pub research_cost: ResourceAmounts,
    pub prerequisites: Vec<&'static str>,
    pub unlocks_buildings: Vec<BuildingKind>,
}

// ============================================================================
// MILESTONES
// ============================================================================

/// Pure predicate over the full state. Typed rather than a closure so
/// catalogs stay data and saves stay stable.
#[derive(Debug, Clone)]
pub enum MilestoneCondition {
    ResourceAtLeast { kind: ResourceKind, target: f64 },
    BuildingCountAtLeast { kind: BuildingKind, count: u32 },
    TechnologyResearched { tech_id: String },
    PopulationAtLeast { total: u32 },
    BlackHoleMassAtLeast { mass: f64 },
}

impl MilestoneCondition {
    pub fn holds(&self, state: &GameState) -> bool {
        match self {
            MilestoneCondition::ResourceAtLeast { kind, target } => {
                state.resources.get(*kind).amount >= *target
            }
            MilestoneCondition::BuildingCountAtLeast { kind, count } => {
                state.building_count(*kind) as u32 >= *count
            }
            MilestoneCondition::TechnologyResearched { tech_id } => {
                state.researched.contains(tech_id.as_str())
            }
            MilestoneCondition::PopulationAtLeast { total } => state.population.total >= *total,
            MilestoneCondition::BlackHoleMassAtLeast { mass } => state
                .black_hole
                .as_ref()
                .map_or(false, |hole| hole.mass >= *mass),
        }
    }

    /// Display-only completion percentage in [0, 100].
    pub fn progress_percent(&self, state: &GameState) -> f64 {
        let ratio = match self {
            MilestoneCondition::ResourceAtLeast { kind, target } => {
                if *target <= 0.0 {
                    1.0
                } else {
                    state.resources.get(*kind).amount / target
                }
            }
            MilestoneCondition::BuildingCountAtLeast { kind, count } => {
                if *count == 0 {
                    1.0
                } else {
                    state.building_count(*kind) as f64 / *count as f64
                }
            }
            MilestoneCondition::TechnologyResearched { tech_id } => {
                if state.researched.contains(tech_id.as_str()) {
                    1.0
                } else {
                    0.0
                }
            }
            MilestoneCondition::PopulationAtLeast { total } => {
                if *total == 0 {
                    1.0
                } else {
                    state.population.total as f64 / *total as f64
                }
            }
            MilestoneCondition::BlackHoleMassAtLeast { mass } => match &state.black_hole {
                Some(hole) if *mass > 0.0 => hole.mass / mass,
                Some(_) => 1.0,
                None => 0.0,
            },
        };
        (ratio * 100.0).clamp(0.0, 100.0)
    }
}

/// One-shot state transform applied when a milestone completes.
#[derive(Debug, Clone)]
pub enum MilestoneReward {
    BonusCapacity { kind: ResourceKind, amount: f64 },
    GrantResource { kind: ResourceKind, amount: f64 },
    UnlockGalactic { id: String },
}

impl MilestoneReward {
    pub fn apply(&self, state: &mut GameState) {
        match self {
            MilestoneReward::BonusCapacity { kind, amount } => {
                state.resources.get_mut(*kind).bonus_capacity += amount;
            }
            MilestoneReward::GrantResource { kind, amount } => {
                state.resources.deposit(*kind, *amount);
            }
            MilestoneReward::UnlockGalactic { id } => {
                state.galactic_upgrades.insert(id.clone());
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MilestoneDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: &'static str,
    /// Tiered chains complete low tiers first; untiered milestones sit at 0.
    pub tier: u32,
    pub prerequisite_id: Option<String>,
    /// Once completed, never revoked.
    pub only_one_time: bool,
    pub condition: MilestoneCondition,
    pub reward: Option<MilestoneReward>,
}

fn roman(tier: u32) -> &'static str {
    match tier {
        1 => "I",
        2 => "II",
        3 => "III",
        4 => "IV",
        5 => "V",
        _ => "X",
    }
}

/// Build a prerequisite-linked chain of stockpile milestones, one per tier.
fn tiered_resource_milestones(
    id_base: &str,
    name_base: &str,
    kind: ResourceKind,
    tiers: &[(f64, f64)], // (target amount, capacity reward)
) -> Vec<MilestoneDef> {
    tiers
        .iter()
        .enumerate()
        .map(|(index, &(target, reward))| {
            let tier = index as u32 + 1;
            MilestoneDef {
                id: format!("{}_{}", id_base, tier),
                name: format!("{} {}", name_base, roman(tier)),
                description: format!("Stockpile {:.0} {}", target, kind.name()),
                category: "resources",
                tier,
                prerequisite_id: (tier > 1).then(|| format!("{}_{}", id_base, tier - 1)),
                only_one_time: false,
                condition: MilestoneCondition::ResourceAtLeast { kind, target },
                reward: Some(MilestoneReward::BonusCapacity {
                    kind,
                    amount: reward,
                }),
            }
        })
        .collect()
}

// ============================================================================
// BLACK HOLE UPGRADES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BlackHoleUpgradeDef {
    pub id: &'static str,
    pub name: &'static str,
    pub effect: &'static str,
    pub kind: BlackHoleUpgradeKind,
    pub base_cost: f64,
    pub max_level: u32,
}

// ============================================================================
// EXPEDITION EVENTS
// ============================================================================

#[derive(Debug, Clone)]
pub enum EventEffect {
    /// Lengthen (or shorten) the mission.
    Time { minutes: f64 },
    /// Immediate colony stockpile change.
    Resource { kind: ResourceKind, amount: f64 },
    /// Crew gained or lost; losses propagate to the population.
    Crew { delta: i32 },
    /// Adjust the completion reward table.
    Reward { amounts: ResourceAmounts },
    /// Field discovery of a technology.
    Technology { tech_id: String },
    /// The mission is lost with all hands.
    Fail,
}

#[derive(Debug, Clone)]
pub struct EventOption {
    pub label: &'static str,
    pub effects: Vec<EventEffect>,
}

#[derive(Debug, Clone)]
pub struct ExpeditionEventDef {
    pub id: String,
    pub name: &'static str,
    pub weight: f64,
    /// Empty = fires for every expedition type.
    pub kinds: Vec<ExpeditionType>,
    pub min_tier: u32,
    pub max_tier: Option<u32>,
    pub options: Vec<EventOption>,
}

// ============================================================================
// ARTIFACTS
// ============================================================================

#[derive(Debug, Clone)]
pub struct ArtifactDef {
    pub name: &'static str,
    pub expedition_tier: u32,
    pub effects: Vec<ArtifactEffect>,
}

// ============================================================================
// THE CATALOG SET
// ============================================================================

/// Every static table the engine reads. Built once, validated once, then
/// shared immutably for the life of the process.
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub buildings: Vec<BuildingTemplate>,
    pub technologies: Vec<TechnologyDef>,
    pub milestones: Vec<MilestoneDef>,
    pub black_hole_upgrades: Vec<BlackHoleUpgradeDef>,
    pub expedition_events: Vec<ExpeditionEventDef>,
    pub artifacts: Vec<ArtifactDef>,
}

impl Catalogs {
    pub fn building(&self, kind: BuildingKind) -> Option<&BuildingTemplate> {
        self.buildings.iter().find(|b| b.kind == kind)
    }

    pub fn technology(&self, id: &str) -> Option<&TechnologyDef> {
        self.technologies.iter().find(|t| t.id == id)
    }

    pub fn milestone(&self, id: &str) -> Option<&MilestoneDef> {
        self.milestones.iter().find(|m| m.id == id)
    }

    pub fn black_hole_upgrade(&self, id: &str) -> Option<&BlackHoleUpgradeDef> {
        self.black_hole_upgrades.iter().find(|u| u.id == id)
    }

    pub fn expedition_event(&self, id: &str) -> Option<&ExpeditionEventDef> {
        self.expedition_events.iter().find(|e| e.id == id)
    }

    /// Locked artifact collection a new colony starts with.
    pub fn seed_artifacts(&self) -> Vec<Artifact> {
        self.artifacts
            .iter()
            .map(|def| Artifact {
                name: def.name.to_string(),
                stars: 0,
                copies: 0,
                locked: true,
                expedition_tier: def.expedition_tier,
                effects: def.effects.clone(),
            })
            .collect()
    }

    /// Content-authoring checks. Returns human-readable findings; an empty
    /// list means the content is safe to run against.
    pub fn validate(&self) -> Vec<String> {
        let mut findings = Vec::new();

        check_unique(
            self.buildings.iter().map(|b| format!("{:?}", b.kind)),
            "building",
            &mut findings,
        );
        check_unique(
            self.technologies.iter().map(|t| t.id.to_string()),
            "technology",
            &mut findings,
        );
        check_unique(
            self.milestones.iter().map(|m| m.id.clone()),
            "milestone",
            &mut findings,
        );
        check_unique(
            self.black_hole_upgrades.iter().map(|u| u.id.to_string()),
            "black hole upgrade",
            &mut findings,
        );
        check_unique(
            self.expedition_events.iter().map(|e| e.id.clone()),
            "expedition event",
            &mut findings,
        );

        for building in &self.buildings {
            if let Some(tech) = building.required_technology {
                if self.technology(tech).is_none() {
                    findings.push(format!(
                        "building {:?} requires unknown technology '{}'",
                        building.kind, tech
                    ));
                }
            }
            if building.max_instances == 0 {
                findings.push(format!("building {:?} can never be built", building.kind));
            }
        }

        for tech in &self.technologies {
            for prereq in &tech.prerequisites {
                if self.technology(prereq).is_none() {
                    findings.push(format!(
                        "technology '{}' has unknown prerequisite '{}'",
                        tech.id, prereq
                    ));
                }
            }
        }
        if let Some(cycle_member) = find_cycle(
            self.technologies.iter().map(|t| {
                (
                    t.id.to_string(),
                    t.prerequisites.iter().map(|p| p.to_string()).collect(),
                )
            }),
        ) {
            findings.push(format!(
                "technology prerequisite cycle through '{}'",
                cycle_member
            ));
        }

        for milestone in &self.milestones {
            if let Some(prereq) = &milestone.prerequisite_id {
                if self.milestone(prereq).is_none() {
                    findings.push(format!(
                        "milestone '{}' has unknown prerequisite '{}'",
                        milestone.id, prereq
                    ));
                }
            }
        }
        if let Some(cycle_member) = find_cycle(self.milestones.iter().map(|m| {
            (
                m.id.clone(),
                m.prerequisite_id.iter().cloned().collect::<Vec<_>>(),
            )
        })) {
            findings.push(format!(
                "milestone prerequisite cycle through '{}'",
                cycle_member
            ));
        }

        for upgrade in &self.black_hole_upgrades {
            if upgrade.max_level == 0 {
                findings.push(format!("black hole upgrade '{}' has no levels", upgrade.id));
            }
        }

        for event in &self.expedition_events {
            if event.weight <= 0.0 {
                findings.push(format!("expedition event '{}' has no weight", event.id));
            }
            if event.options.is_empty() {
                findings.push(format!("expedition event '{}' has no options", event.id));
            }
        }

        for artifact in &self.artifacts {
            if self
                .artifacts
                .iter()
                .filter(|a| a.name == artifact.name)
                .count()
                > 1
            {
                findings.push(format!("duplicate artifact '{}'", artifact.name));
            }
        }

        findings
    }
}

fn check_unique<I: Iterator<Item = String>>(ids: I, what: &str, findings: &mut Vec<String>) {
    let mut seen = std::collections::BTreeSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            findings.push(format!("duplicate {} id '{}'", what, id));
        }
    }
}

/// DFS cycle detection over an id → prerequisite-ids graph. Returns a node
/// on some cycle, or `None` for a DAG. Unknown prerequisite ids are treated
/// as leaves (they are reported separately).
fn find_cycle<I: Iterator<Item = (String, Vec<String>)>>(graph: I) -> Option<String> {
    use std::collections::BTreeMap;

    let edges: BTreeMap<String, Vec<String>> = graph.collect();
    // 0 = unvisited, 1 = on stack, 2 = done
    let mut color: BTreeMap<&str, u8> = BTreeMap::new();

    fn visit<'a>(
        node: &'a str,
        edges: &'a BTreeMap<String, Vec<String>>,
        color: &mut BTreeMap<&'a str, u8>,
    ) -> bool {
        match color.get(node) {
            Some(1) => return true,
            Some(2) => return false,
            _ => {}
        }
        color.insert(node, 1);
        if let Some(prereqs) = edges.get(node) {
            for prereq in prereqs {
                if edges.contains_key(prereq.as_str()) && visit(prereq, edges, color) {
                    return true;
                }
            }
        }
        color.insert(node, 2);
        false
    }

    for id in edges.keys() {
        if visit(id, &edges, &mut color) {
            return Some(id.clone());
        }
    }
    None
}

// ============================================================================
// STANDARD CONTENT
// ============================================================================

impl Catalogs {
    /// The shipped content set.
    pub fn standard() -> Self {
        Self {
            buildings: standard_buildings(),
            technologies: standard_technologies(),
            milestones: standard_milestones(),
            black_hole_upgrades: standard_black_hole_upgrades(),
            expedition_events: standard_expedition_events(),
            artifacts: standard_artifacts(),
        }
    }
}

fn standard_buildings() -> Vec<BuildingTemplate> {
    use BuildingKind::*;
    use ResourceKind::*;

    vec![
        BuildingTemplate {
            kind: OxygenGenerator,
            category: BuildingCategory::Production,
            description: "Produces oxygen from the planet's thin atmosphere",
            worker_capacity: 2,
            max_instances: 20,
            base_cost: ResourceAmounts::new().with(Metals, 50.0).with(Energy, 20.0),
            base_production: ResourceAmounts::new().with(Oxygen, 1.0),
            base_consumption: ResourceAmounts::new().with(Energy, 0.5),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 0,
            cost_multiplier: 1.5,
            production_multiplier: 1.2,
            tier: 1,
            required_technology: None,
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: HydroponicFarm,
            category: BuildingCategory::Production,
            description: "Grows nutritious food in controlled environments",
            worker_capacity: 3,
            max_instances: 20,
            base_cost: ResourceAmounts::new().with(Metals, 40.0).with(Energy, 15.0),
            base_production: ResourceAmounts::new().with(Food, 1.0),
            base_consumption: ResourceAmounts::new().with(Water, 0.2).with(Energy, 0.3),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 0,
            cost_multiplier: 1.4,
            production_multiplier: 1.2,
            tier: 1,
            required_technology: None,
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: WaterReclaimer,
            category: BuildingCategory::Production,
            description: "Condenses and recycles water from the habitat loop",
            worker_capacity: 2,
            max_instances: 20,
            base_cost: ResourceAmounts::new().with(Metals, 45.0).with(Energy, 20.0),
            base_production: ResourceAmounts::new().with(Water, 0.8),
            base_consumption: ResourceAmounts::new().with(Energy, 0.4),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 0,
            cost_multiplier: 1.4,
            production_multiplier: 1.2,
            tier: 1,
            required_technology: Some("hydro_recycling"),
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: SolarArray,
            category: BuildingCategory::Production,
            description: "Captures energy from the nearby star",
            worker_capacity: 1,
            max_instances: 30,
            base_cost: ResourceAmounts::new().with(Metals, 60.0),
            base_production: ResourceAmounts::new().with(Energy, 2.0),
            base_consumption: ResourceAmounts::new(),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 0,
            cost_multiplier: 1.6,
            production_multiplier: 1.3,
            tier: 1,
            required_technology: None,
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: MetalExtractor,
            category: BuildingCategory::Production,
            description: "Extracts metal ores from the planetary crust",
            worker_capacity: 4,
            max_instances: 20,
            base_cost: ResourceAmounts::new().with(Energy, 30.0),
            base_production: ResourceAmounts::new().with(Metals, 0.8),
            base_consumption: ResourceAmounts::new().with(Energy, 0.8).with(Oxygen, 0.1),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 0,
            cost_multiplier: 1.5,
            production_multiplier: 1.2,
            tier: 1,
            required_technology: None,
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: ResearchLab,
            category: BuildingCategory::Research,
            description: "Scientists work to advance colony technology",
            worker_capacity: 2,
            max_instances: 10,
            base_cost: ResourceAmounts::new().with(Metals, 80.0).with(Energy, 40.0),
            base_production: ResourceAmounts::new().with(Science, 0.5),
            base_consumption: ResourceAmounts::new().with(Energy, 1.0).with(Oxygen, 0.3),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 0,
            cost_multiplier: 1.7,
            production_multiplier: 1.3,
            tier: 1,
            required_technology: None,
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: HabitatDome,
            category: BuildingCategory::Housing,
            description: "Living quarters for the colony's population",
            worker_capacity: 0,
            max_instances: 20,
            base_cost: ResourceAmounts::new().with(Metals, 100.0).with(Energy, 20.0),
            base_production: ResourceAmounts::new(),
            base_consumption: ResourceAmounts::new().with(Oxygen, 0.2).with(Energy, 0.3),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 5,
            cost_multiplier: 1.6,
            production_multiplier: 1.0,
            tier: 1,
            required_technology: None,
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: StorageDepot,
            category: BuildingCategory::Storage,
            description: "Pressurized bulk storage for raw materials and supplies",
            worker_capacity: 0,
            max_instances: 10,
            base_cost: ResourceAmounts::new().with(Metals, 120.0),
            base_production: ResourceAmounts::new(),
            base_consumption: ResourceAmounts::new(),
            storage_bonus: ResourceAmounts::new()
                .with(Metals, 200.0)
                .with(Food, 100.0)
                .with(Water, 100.0)
                .with(Oxygen, 100.0),
            housing_capacity: 0,
            cost_multiplier: 1.8,
            production_multiplier: 1.0,
            tier: 1,
            required_technology: None,
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: BatteryBank,
            category: BuildingCategory::Storage,
            description: "High-density cells buffering the colony grid",
            worker_capacity: 0,
            max_instances: 10,
            base_cost: ResourceAmounts::new().with(Metals, 80.0).with(Energy, 10.0),
            base_production: ResourceAmounts::new(),
            base_consumption: ResourceAmounts::new(),
            storage_bonus: ResourceAmounts::new().with(Energy, 300.0),
            housing_capacity: 0,
            cost_multiplier: 1.8,
            production_multiplier: 1.0,
            tier: 1,
            required_technology: None,
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: GeothermalPlant,
            category: BuildingCategory::Production,
            description: "Taps crustal heat for steady baseline power",
            worker_capacity: 3,
            max_instances: 10,
            base_cost: ResourceAmounts::new().with(Metals, 150.0).with(Energy, 50.0),
            base_production: ResourceAmounts::new().with(Energy, 5.0),
            base_consumption: ResourceAmounts::new().with(Water, 0.2),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 0,
            cost_multiplier: 1.6,
            production_multiplier: 1.2,
            tier: 2,
            required_technology: Some("geothermal_tapping"),
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: DeepMine,
            category: BuildingCategory::Production,
            description: "Bores past the regolith to the rich seams below",
            worker_capacity: 6,
            max_instances: 10,
            base_cost: ResourceAmounts::new().with(Metals, 200.0).with(Energy, 80.0),
            base_production: ResourceAmounts::new().with(Metals, 2.5),
            base_consumption: ResourceAmounts::new().with(Energy, 2.0).with(Oxygen, 0.3),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 0,
            cost_multiplier: 1.5,
            production_multiplier: 1.2,
            tier: 2,
            required_technology: Some("deep_crust_mining"),
            unique_bonus: None,
        },
        BuildingTemplate {
            kind: FusionReactor,
            category: BuildingCategory::Production,
            description: "Contained star-fire; the colony's endgame power source",
            worker_capacity: 4,
            max_instances: 5,
            base_cost: ResourceAmounts::new()
                .with(Metals, 500.0)
                .with(Energy, 200.0)
                .with(Science, 100.0),
            base_production: ResourceAmounts::new().with(Energy, 20.0),
            base_consumption: ResourceAmounts::new().with(Water, 0.5),
            storage_bonus: ResourceAmounts::new(),
            housing_capacity: 0,
            cost_multiplier: 1.7,
            production_multiplier: 1.3,
            tier: 3,
            required_technology: Some("fusion_containment"),
            unique_bonus: Some(UniqueBonus {
                production: ResourceAmounts::new(),
                storage: ResourceAmounts::new().with(Energy, 500.0),
            }),
        },
    ]
}

fn standard_technologies() -> Vec<TechnologyDef> {
    use BuildingKind::*;
    use ResourceKind::*;

    vec![
        TechnologyDef {
            id: "hydro_recycling",
            name: "Hydrological Recycling",
            category: TechCategory::Infrastructure,
            description: "Closed-loop water reclamation for habitat air",
            research_cost: ResourceAmounts::new().with(Science, 40.0),
            prerequisites: vec![],
            unlocks_buildings: vec![WaterReclaimer],
        },
        TechnologyDef {
            id: "geothermal_tapping",
            name: "Geothermal Tapping",
            category: TechCategory::Energy,
            description: "Deep boreholes into the planet's residual heat",
            research_cost: ResourceAmounts::new().with(Science, 50.0),
            prerequisites: vec![],
            unlocks_buildings: vec![GeothermalPlant],
        },
        TechnologyDef {
            id: "deep_crust_mining",
            name: "Deep Crust Mining",
            category: TechCategory::Production,
            description: "Reinforced bores reaching the metal-rich mantle",
            research_cost: ResourceAmounts::new().with(Science, 80.0).with(Metals, 100.0),
            prerequisites: vec![],
            unlocks_buildings: vec![DeepMine],
        },
        TechnologyDef {
            id: "orbital_survey",
            name: "Orbital Survey",
            category: TechCategory::Research,
            description: "Mapping satellites open the surrounding system to expeditions",
            research_cost: ResourceAmounts::new().with(Science, 120.0),
            prerequisites: vec![],
            unlocks_buildings: vec![],
        },
        TechnologyDef {
            id: "plasma_dynamics",
            name: "Plasma Dynamics",
            category: TechCategory::Energy,
            description: "Magnetic confinement fundamentals",
            research_cost: ResourceAmounts::new().with(Science, 200.0),
            prerequisites: vec!["geothermal_tapping"],
            unlocks_buildings: vec![],
        },
        TechnologyDef {
            id: "xenobiology",
            name: "Xenobiology",
            category: TechCategory::Research,
            description: "Catalogue of native microfauna recovered by survey teams",
            research_cost: ResourceAmounts::new().with(Science, 150.0),
            prerequisites: vec!["orbital_survey"],
            unlocks_buildings: vec![],
        },
        TechnologyDef {
            id: "fusion_containment",
            name: "Fusion Containment",
            category: TechCategory::Advanced,
            description: "Sustained net-positive fusion in a bottle",
            research_cost: ResourceAmounts::new().with(Science, 400.0).with(Metals, 300.0),
            prerequisites: vec!["geothermal_tapping", "plasma_dynamics"],
            unlocks_buildings: vec![FusionReactor],
        },
        TechnologyDef {
            id: "singularity_studies",
            name: "Singularity Studies",
            category: TechCategory::Advanced,
            description: "Theoretical groundwork for captive gravitational wells",
            research_cost: ResourceAmounts::new().with(Science, 800.0),
            prerequisites: vec!["plasma_dynamics", "xenobiology"],
            unlocks_buildings: vec![],
        },
    ]
}

fn standard_milestones() -> Vec<MilestoneDef> {
    use BuildingKind::*;
    use ResourceKind::*;

    let mut milestones = Vec::new();

    milestones.extend(tiered_resource_milestones(
        "metal_magnate",
        "Metal Magnate",
        Metals,
        &[(10_000.0, 1_000.0), (50_000.0, 5_000.0), (100_000.0, 10_000.0)],
    ));
    milestones.extend(tiered_resource_milestones(
        "atmosphere_architect",
        "Atmosphere Architect",
        Oxygen,
        &[(10_000.0, 1_000.0)],
    ));

    milestones.push(MilestoneDef {
        id: "first_roots".into(),
        name: "First Roots".into(),
        description: "Bring a hydroponic farm online".into(),
        category: "colony",
        tier: 0,
        prerequisite_id: None,
        only_one_time: false,
        condition: MilestoneCondition::BuildingCountAtLeast {
            kind: HydroponicFarm,
            count: 1,
        },
        reward: Some(MilestoneReward::GrantResource {
            kind: Food,
            amount: 25.0,
        }),
    });
    milestones.push(MilestoneDef {
        id: "power_grid".into(),
        name: "Power Grid".into(),
        description: "Operate three solar arrays".into(),
        category: "colony",
        tier: 0,
        prerequisite_id: None,
        only_one_time: false,
        condition: MilestoneCondition::BuildingCountAtLeast {
            kind: SolarArray,
            count: 3,
        },
        reward: Some(MilestoneReward::GrantResource {
            kind: Energy,
            amount: 50.0,
        }),
    });
    milestones.push(MilestoneDef {
        id: "growing_colony".into(),
        name: "Growing Colony".into(),
        description: "House twenty colonists".into(),
        category: "colony",
        tier: 0,
        prerequisite_id: None,
        only_one_time: false,
        condition: MilestoneCondition::PopulationAtLeast { total: 20 },
        reward: Some(MilestoneReward::BonusCapacity {
            kind: Food,
            amount: 100.0,
        }),
    });
    // The black hole gate: a one-way door. Revocation never re-locks it.
    milestones.push(MilestoneDef {
        id: "deep_science".into(),
        name: "Deep Science".into(),
        description: "Complete singularity studies".into(),
        category: "endgame",
        tier: 0,
        prerequisite_id: None,
        only_one_time: true,
        condition: MilestoneCondition::TechnologyResearched {
            tech_id: "singularity_studies".into(),
        },
        reward: Some(MilestoneReward::UnlockGalactic {
            id: BLACK_HOLE_UNLOCK.into(),
        }),
    });
    milestones.push(MilestoneDef {
        id: "event_horizon".into(),
        name: "Event Horizon".into(),
        description: "Grow the singularity to 100 solar masses".into(),
        category: "endgame",
        tier: 0,
        prerequisite_id: Some("deep_science".into()),
        only_one_time: false,
        condition: MilestoneCondition::BlackHoleMassAtLeast { mass: 100.0 },
        reward: Some(MilestoneReward::GrantResource {
            kind: Science,
            amount: 500.0,
        }),
    });

    milestones
}

fn standard_black_hole_upgrades() -> Vec<BlackHoleUpgradeDef> {
    vec![
        BlackHoleUpgradeDef {
            id: "mass_capacity",
            name: "Gravitational Amplifier",
            effect: "+1000 M\u{2609} Max Mass",
            kind: BlackHoleUpgradeKind::MassCapacity,
            base_cost: 10.0,
            max_level: 1000,
        },
        BlackHoleUpgradeDef {
            id: "growth_rate",
            name: "Hawking Accelerator",
            effect: "+15% Growth Rate",
            kind: BlackHoleUpgradeKind::GrowthRate,
            base_cost: 50.0,
            max_level: 800,
        },
        BlackHoleUpgradeDef {
            id: "dark_matter_gen",
            name: "Dark Matter Synthesizer",
            effect: "+0.05 Dark Matter/s",
            kind: BlackHoleUpgradeKind::DarkMatterGen,
            base_cost: 5.0,
            max_level: 1500,
        },
        BlackHoleUpgradeDef {
            id: "energy_capacity",
            name: "Quantum Battery",
            effect: "+1M Energy Cap",
            kind: BlackHoleUpgradeKind::EnergyCapacity,
            base_cost: 5.0,
            max_level: 2000,
        },
    ]
}

fn standard_expedition_events() -> Vec<ExpeditionEventDef> {
    use ResourceKind::*;

    vec![
        ExpeditionEventDef {
            id: "meteor_strike".into(),
            name: "Meteor Strike",
            weight: 2.0,
            kinds: vec![],
            min_tier: 0,
            max_tier: None,
            options: vec![
                EventOption {
                    label: "Push through the debris field",
                    effects: vec![EventEffect::Time { minutes: 5.0 }, EventEffect::Crew { delta: -2 }],
                },
                EventOption {
                    label: "Take shelter and wait it out",
                    effects: vec![EventEffect::Time { minutes: 10.0 }],
                },
            ],
        },
        ExpeditionEventDef {
            id: "rich_vein".into(),
            name: "Rich Vein",
            weight: 1.5,
            kinds: vec![ExpeditionType::Mining],
            min_tier: 0,
            max_tier: None,
            options: vec![
                EventOption {
                    label: "Stop and mine it",
                    effects: vec![
                        EventEffect::Reward {
                            amounts: ResourceAmounts::new().with(Metals, 2_500.0),
                        },
                        EventEffect::Time { minutes: 5.0 },
                    ],
                },
                EventOption {
                    label: "Mark the site and move on",
                    effects: vec![],
                },
            ],
        },
        ExpeditionEventDef {
            id: "anomalous_signal".into(),
            name: "Anomalous Signal",
            weight: 1.0,
            kinds: vec![ExpeditionType::Scientific],
            min_tier: 1,
            max_tier: None,
            options: vec![
                EventOption {
                    label: "Divert to investigate",
                    effects: vec![
                        EventEffect::Reward {
                            amounts: ResourceAmounts::new().with(Science, 3_000.0),
                        },
                        EventEffect::Time { minutes: 8.0 },
                    ],
                },
                EventOption {
                    label: "Log the coordinates and continue",
                    effects: vec![],
                },
            ],
        },
        ExpeditionEventDef {
            id: "hull_breach".into(),
            name: "Hull Breach",
            weight: 0.8,
            kinds: vec![],
            min_tier: 0,
            max_tier: None,
            options: vec![
                EventOption {
                    label: "Patch it with colony stock",
                    effects: vec![
                        EventEffect::Resource {
                            kind: Metals,
                            amount: -200.0,
                        },
                        EventEffect::Time { minutes: 3.0 },
                    ],
                },
                EventOption {
                    label: "Abandon the mission",
                    effects: vec![EventEffect::Fail],
                },
            ],
        },
    ]
}

fn standard_artifacts() -> Vec<ArtifactDef> {
    vec![
        ArtifactDef {
            name: "Time Crystal",
            expedition_tier: 0,
            effects: vec![],
        },
        ArtifactDef {
            name: "Harmonic Lens",
            expedition_tier: 0,
            effects: vec![ArtifactEffect {
                kind: ArtifactEffectKind::Production,
                value: 1.0,
            }],
        },
        ArtifactDef {
            name: "Void Shard",
            expedition_tier: 1,
            effects: vec![ArtifactEffect {
                kind: ArtifactEffectKind::Capacity,
                value: 1.0,
            }],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_content_validates_clean() {
        let catalogs = Catalogs::standard();
        let findings = catalogs.validate();
        assert!(findings.is_empty(), "content findings: {:?}", findings);
    }

    #[test]
    fn test_instantiate_copies_template_tables() {
        let catalogs = Catalogs::standard();
        let template = catalogs.building(BuildingKind::OxygenGenerator).unwrap();
        let building = template.instantiate(9);
        assert_eq!(building.id, 9);
        assert_eq!(building.level, 1);
        assert_eq!(building.assigned_workers, 0);
        assert_eq!(building.base_production, template.base_production);
    }

    #[test]
    fn test_validation_flags_dangling_prerequisite() {
        let mut catalogs = Catalogs::standard();
        catalogs.milestones.push(MilestoneDef {
            id: "orphan".into(),
            name: "Orphan".into(),
            description: String::new(),
            category: "test",
            tier: 0,
            prerequisite_id: Some("no_such_milestone".into()),
            only_one_time: false,
            condition: MilestoneCondition::PopulationAtLeast { total: 1 },
            reward: None,
        });
        let findings = catalogs.validate();
        assert!(findings.iter().any(|f| f.contains("no_such_milestone")));
    }

    #[test]
    fn test_validation_flags_prerequisite_cycle() {
        let mut catalogs = Catalogs::standard();
        catalogs.technologies.push(TechnologyDef {
            id: "tech_a",
            name: "A",
            category: TechCategory::Research,
            description: "",
            research_cost: ResourceAmounts::new(),
            prerequisites: vec!["tech_b"],
            unlocks_buildings: vec![],
        });
        catalogs.technologies.push(TechnologyDef {
            id: "tech_b",
            name: "B",
            category: TechCategory::Research,
            description: "",
            research_cost: ResourceAmounts::new(),
            prerequisites: vec!["tech_a"],
            unlocks_buildings: vec![],
        });
        let findings = catalogs.validate();
        assert!(findings.iter().any(|f| f.contains("cycle")));
    }

    #[test]
    fn test_tiered_milestones_chain_prerequisites() {
        let catalogs = Catalogs::standard();
        let tier2 = catalogs.milestone("metal_magnate_2").unwrap();
        assert_eq!(tier2.prerequisite_id.as_deref(), Some("metal_magnate_1"));
        assert_eq!(tier2.tier, 2);
        let tier1 = catalogs.milestone("metal_magnate_1").unwrap();
        assert!(tier1.prerequisite_id.is_none());
    }

    #[test]
    fn test_condition_progress_is_bounded() {
        let state = GameState::new(0);
        for milestone in Catalogs::standard().milestones {
            let p = milestone.condition.progress_percent(&state);
            assert!((0.0..=100.0).contains(&p), "{} out of range", milestone.id);
        }
    }
}
