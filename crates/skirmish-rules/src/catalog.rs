//! Unit, building, upgrade and age tables.
//!
//! [`RulesCatalog::standard`] builds the canonical tables once. The catalog
//! is immutable after construction and is shared by reference (or `Arc`)
//! with every component that needs a stat.

use std::collections::BTreeMap;

use serde::Serialize;

use skirmish_types::{Age, BuildingType, Resources, UnitClass, UnitType, UpgradeId};

use crate::error::RulesError;
use crate::map::ZoneGraph;

// ---------------------------------------------------------------------------
// Stat records
// ---------------------------------------------------------------------------

/// What a unit type deals bonus damage against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum CounterClass {
    /// Every unit type in a class.
    Class(UnitClass),
    /// One specific unit type.
    Unit(UnitType),
    /// Structures. No unit ever matches this.
    Structures,
}

/// Static stats of a unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitStats {
    /// Training cost per unit.
    pub cost: Resources,
    /// Base hit points.
    pub hp: u32,
    /// Base attack.
    pub attack: u32,
    /// Broad category.
    pub class: UnitClass,
    /// Bonus-damage target, if any.
    pub counter: Option<CounterClass>,
    /// Ticks spent in the production queue.
    pub train_turns: u32,
    /// Minimum age to train.
    pub min_age: Age,
    /// Score value per unit on the map.
    pub value: u64,
}

/// Static stats of a building type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingStats {
    /// Construction cost.
    pub cost: Resources,
    /// Hit points of one instance.
    pub hp: u32,
    /// Whether the hit points are tracked and can be depleted by siege.
    pub depletable: bool,
    /// Unit types this building allows to be trained.
    pub unlocks: Vec<UnitType>,
    /// Minimum age to construct.
    pub min_age: Age,
    /// Damage per instance per tick against enemy units in the zone.
    pub area_damage: Option<u32>,
}

impl BuildingStats {
    /// HP to add to the zone pool when one instance is built.
    pub const fn pooled_hp(&self) -> Option<u32> {
        if self.depletable { Some(self.hp) } else { None }
    }
}

/// Static stats of an upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpgradeStats {
    /// Research cost.
    pub cost: Resources,
    /// Attack added to every unit.
    pub attack_bonus: u32,
    /// Effective hit points added to every unit.
    pub armor_bonus: u32,
    /// Minimum age to research.
    pub min_age: Age,
    /// A building that must exist somewhere.
    pub requires_building: Option<BuildingType>,
    /// An upgrade that must already be researched.
    pub requires_upgrade: Option<UpgradeId>,
}

/// Per-tick income rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EconomyRates {
    /// Yield per villager assigned to each resource.
    pub task_rates: Resources,
    /// Yield per unassigned villager.
    pub idle_yield: Resources,
    /// Gold granted every tick regardless of villagers.
    pub gold_trickle: u32,
}

/// How each player starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartingConditions {
    /// Initial resource ledger.
    pub resources: Resources,
    /// Villagers placed in the home zone.
    pub villagers: u32,
    /// Initial (and maximum) town center hit points.
    pub town_center_hp: u32,
}

// ---------------------------------------------------------------------------
// Standard tables
// ---------------------------------------------------------------------------

/// The standard stats of a unit type.
pub fn standard_unit(unit: UnitType) -> UnitStats {
    match unit {
        UnitType::Villager => UnitStats {
            cost: Resources::new(50, 0, 0),
            hp: 5,
            attack: 1,
            class: UnitClass::Infantry,
            counter: None,
            train_turns: 1,
            min_age: Age::DARK,
            value: 25,
        },
        UnitType::Militia => UnitStats {
            cost: Resources::new(60, 0, 0),
            hp: 8,
            attack: 3,
            class: UnitClass::Infantry,
            counter: None,
            train_turns: 1,
            min_age: Age::FEUDAL,
            value: 30,
        },
        UnitType::Archer => UnitStats {
            cost: Resources::new(0, 60, 0),
            hp: 6,
            attack: 4,
            class: UnitClass::Ranged,
            counter: Some(CounterClass::Class(UnitClass::Infantry)),
            train_turns: 2,
            min_age: Age::FEUDAL,
            value: 30,
        },
        UnitType::Knight => UnitStats {
            cost: Resources::new(0, 0, 80),
            hp: 15,
            attack: 6,
            class: UnitClass::Cavalry,
            counter: Some(CounterClass::Unit(UnitType::Archer)),
            train_turns: 3,
            min_age: Age::CASTLE,
            value: 40,
        },
        UnitType::Catapult => UnitStats {
            cost: Resources::new(0, 50, 100),
            hp: 10,
            attack: 12,
            class: UnitClass::Siege,
            counter: Some(CounterClass::Structures),
            train_turns: 4,
            min_age: Age::CASTLE,
            value: 75,
        },
    }
}

/// The standard stats of a building type.
pub fn standard_building(building: BuildingType) -> BuildingStats {
    match building {
        BuildingType::Barracks => BuildingStats {
            cost: Resources::new(0, 100, 0),
            hp: 50,
            depletable: false,
            unlocks: vec![UnitType::Militia, UnitType::Knight],
            min_age: Age::FEUDAL,
            area_damage: None,
        },
        BuildingType::Range => BuildingStats {
            cost: Resources::new(0, 80, 0),
            hp: 40,
            depletable: false,
            unlocks: vec![UnitType::Archer],
            min_age: Age::FEUDAL,
            area_damage: None,
        },
        BuildingType::Wall => BuildingStats {
            cost: Resources::new(0, 50, 0),
            hp: 100,
            depletable: true,
            unlocks: Vec::new(),
            min_age: Age::CASTLE,
            area_damage: None,
        },
        BuildingType::Tower => BuildingStats {
            cost: Resources::new(0, 80, 50),
            hp: 60,
            depletable: true,
            unlocks: Vec::new(),
            min_age: Age::CASTLE,
            area_damage: Some(8),
        },
        BuildingType::Blacksmith => BuildingStats {
            cost: Resources::new(0, 150, 100),
            hp: 0,
            depletable: false,
            unlocks: Vec::new(),
            min_age: Age::CASTLE,
            area_damage: None,
        },
    }
}

/// The standard stats of an upgrade.
pub fn standard_upgrade(upgrade: UpgradeId) -> UpgradeStats {
    match upgrade {
        UpgradeId::Attack1 => UpgradeStats {
            cost: Resources::new(200, 0, 100),
            attack_bonus: 2,
            armor_bonus: 0,
            min_age: Age::CASTLE,
            requires_building: Some(BuildingType::Blacksmith),
            requires_upgrade: None,
        },
        UpgradeId::Armor1 => UpgradeStats {
            cost: Resources::new(0, 200, 100),
            attack_bonus: 0,
            armor_bonus: 3,
            min_age: Age::CASTLE,
            requires_building: Some(BuildingType::Blacksmith),
            requires_upgrade: None,
        },
        UpgradeId::Attack2 => UpgradeStats {
            cost: Resources::new(0, 0, 400),
            attack_bonus: 3,
            armor_bonus: 0,
            min_age: Age::IMPERIAL,
            requires_building: Some(BuildingType::Blacksmith),
            requires_upgrade: Some(UpgradeId::Attack1),
        },
        UpgradeId::Armor2 => UpgradeStats {
            cost: Resources::new(0, 300, 200),
            attack_bonus: 0,
            armor_bonus: 5,
            min_age: Age::IMPERIAL,
            requires_building: Some(BuildingType::Blacksmith),
            requires_upgrade: Some(UpgradeId::Armor1),
        },
    }
}

// ---------------------------------------------------------------------------
// RulesCatalog
// ---------------------------------------------------------------------------

/// Every static rule of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RulesCatalog {
    units: BTreeMap<UnitType, UnitStats>,
    buildings: BTreeMap<BuildingType, BuildingStats>,
    upgrades: BTreeMap<UpgradeId, UpgradeStats>,
    /// Keyed by the age being advanced into.
    age_costs: BTreeMap<Age, Resources>,
    economy: EconomyRates,
    start: StartingConditions,
    map: ZoneGraph,
    counter_bonus_pct: u32,
    building_value: u64,
    unit_value_multiplier: u64,
}

impl RulesCatalog {
    /// The standard game.
    pub fn standard() -> Self {
        let units = UnitType::ALL.iter().map(|&u| (u, standard_unit(u))).collect();
        let buildings = BuildingType::ALL
            .iter()
            .map(|&b| (b, standard_building(b)))
            .collect();
        let upgrades = UpgradeId::ALL
            .iter()
            .map(|&u| (u, standard_upgrade(u)))
            .collect();
        let age_costs = BTreeMap::from([
            (Age::FEUDAL, Resources::new(400, 200, 0)),
            (Age::CASTLE, Resources::new(500, 300, 200)),
            (Age::IMPERIAL, Resources::new(0, 800, 500)),
        ]);
        Self {
            units,
            buildings,
            upgrades,
            age_costs,
            economy: EconomyRates {
                task_rates: Resources::new(15, 12, 8),
                idle_yield: Resources::new(3, 2, 0),
                gold_trickle: 5,
            },
            start: StartingConditions {
                resources: Resources::new(200, 150, 50),
                villagers: 3,
                town_center_hp: 200,
            },
            map: ZoneGraph::standard(),
            counter_bonus_pct: 150,
            building_value: 10,
            unit_value_multiplier: 2,
        }
    }

    /// Stats of `unit`.
    pub fn unit(&self, unit: UnitType) -> Result<&UnitStats, RulesError> {
        self.units.get(&unit).ok_or(RulesError::UnknownUnit(unit))
    }

    /// Stats of `building`.
    pub fn building(&self, building: BuildingType) -> Result<&BuildingStats, RulesError> {
        self.buildings
            .get(&building)
            .ok_or(RulesError::UnknownBuilding(building))
    }

    /// Stats of `upgrade`.
    pub fn upgrade(&self, upgrade: UpgradeId) -> Result<&UpgradeStats, RulesError> {
        self.upgrades
            .get(&upgrade)
            .ok_or(RulesError::UnknownUpgrade(upgrade))
    }

    /// Cost to advance into `target`.
    pub fn age_cost(&self, target: Age) -> Result<Resources, RulesError> {
        self.age_costs
            .get(&target)
            .copied()
            .ok_or(RulesError::UnknownAge(target))
    }

    /// Building types that unlock `unit`. Empty means no structure is needed.
    pub fn unlocking_buildings(&self, unit: UnitType) -> impl Iterator<Item = BuildingType> + '_ {
        self.buildings
            .iter()
            .filter(move |(_, stats)| stats.unlocks.contains(&unit))
            .map(|(&building, _)| building)
    }

    /// Whether a unit of `target` is matched by `counter`.
    pub fn counter_matches(&self, counter: CounterClass, target: UnitType) -> bool {
        match counter {
            CounterClass::Unit(unit) => unit == target,
            CounterClass::Class(class) => self.unit(target).is_ok_and(|s| s.class == class),
            CounterClass::Structures => false,
        }
    }

    /// Economy rates.
    pub const fn economy(&self) -> &EconomyRates {
        &self.economy
    }

    /// Starting conditions.
    pub const fn start(&self) -> &StartingConditions {
        &self.start
    }

    /// The zone graph.
    pub const fn map(&self) -> &ZoneGraph {
        &self.map
    }

    /// Counter damage multiplier in percent.
    pub const fn counter_bonus_pct(&self) -> u32 {
        self.counter_bonus_pct
    }

    /// Score per constructed building.
    pub const fn building_value(&self) -> u64 {
        self.building_value
    }

    /// Multiplier applied to the summed unit values when scoring.
    pub const fn unit_value_multiplier(&self) -> u64 {
        self.unit_value_multiplier
    }
}

impl Default for RulesCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
