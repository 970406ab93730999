//! Built-in rule-based deciders.
//!
//! Each [`RuleBot`] turns its observation into a raw JSON command with a
//! fixed, deterministic playbook. The bots only read what the observation
//! exposes and plan against a private copy of their own resources, so
//! they rarely send orders the validator has to trim.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value, json};
use skirmish_core::decision::{Decider, DecisionError, IdleDecider};
use skirmish_rules::{RulesCatalog, RulesError};
use skirmish_types::{
    Age, BuildingType, Observation, PlayerId, PlayerState, ResourceKind, Resources, UnitType,
    UpgradeId, Zone,
};

use crate::error::EngineError;

/// A named playbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Steady economy, a mixed army and an attack once it is sizeable.
    Balanced,
    /// Few villagers, early Barracks, constant pressure down the middle.
    Aggressive,
    /// Villagers first, late ages, upgrades and defenses.
    Economic,
    /// Never issues an order.
    Idle,
}

impl Strategy {
    /// Config name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
            Self::Economic => "economic",
            Self::Idle => "idle",
        }
    }

    const fn profile(self) -> Profile {
        match self {
            Self::Balanced | Self::Idle => Profile {
                villager_target: 10,
                split: [5, 3, 2],
                max_age: Age::CASTLE,
                buildings: &[
                    BuildingType::Barracks,
                    BuildingType::Range,
                    BuildingType::Blacksmith,
                    BuildingType::Tower,
                ],
                army: &[UnitType::Knight, UnitType::Archer, UnitType::Militia],
                attack_at: 8,
                research: true,
            },
            Self::Aggressive => Profile {
                villager_target: 6,
                split: [6, 3, 1],
                max_age: Age::FEUDAL,
                buildings: &[BuildingType::Barracks, BuildingType::Range],
                army: &[UnitType::Militia, UnitType::Archer],
                attack_at: 4,
                research: false,
            },
            Self::Economic => Profile {
                villager_target: 16,
                split: [4, 4, 3],
                max_age: Age::IMPERIAL,
                buildings: &[
                    BuildingType::Barracks,
                    BuildingType::Blacksmith,
                    BuildingType::Wall,
                    BuildingType::Tower,
                    BuildingType::Range,
                ],
                army: &[UnitType::Knight, UnitType::Catapult, UnitType::Archer],
                attack_at: 15,
                research: true,
            },
        }
    }
}

impl FromStr for Strategy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(Self::Balanced),
            "aggressive" | "rush" => Ok(Self::Aggressive),
            "economic" | "boom" => Ok(Self::Economic),
            "idle" => Ok(Self::Idle),
            _ => Err(EngineError::UnknownStrategy { name: s.to_owned() }),
        }
    }
}

/// Tuning knobs of one playbook.
struct Profile {
    /// Villagers to own before the bot stops training them.
    villager_target: u32,
    /// Relative food, wood and gold shares of the villager split.
    split: [u32; 3],
    /// Highest age the bot advances to.
    max_age: Age,
    /// Buildings wanted, in priority order.
    buildings: &'static [BuildingType],
    /// Military units in preference order.
    army: &'static [UnitType],
    /// Military units gathered at home before the push.
    attack_at: u32,
    /// Whether to research upgrades.
    research: bool,
}

/// Build the decider for a configured strategy name.
pub fn decider_for(name: &str, rules: &Arc<RulesCatalog>) -> Result<Arc<dyn Decider>, EngineError> {
    let strategy: Strategy = name.parse()?;
    Ok(match strategy {
        Strategy::Idle => Arc::new(IdleDecider::new()),
        other => Arc::new(RuleBot::new(other, Arc::clone(rules))),
    })
}

/// A deterministic decider following one [`Strategy`].
#[derive(Debug)]
pub struct RuleBot {
    strategy: Strategy,
    rules: Arc<RulesCatalog>,
}

impl RuleBot {
    /// Create a bot playing `strategy`.
    pub const fn new(strategy: Strategy, rules: Arc<RulesCatalog>) -> Self {
        Self { strategy, rules }
    }

    /// Plan a raw command for `obs`.
    pub fn plan(&self, obs: &Observation) -> Result<Value, RulesError> {
        let profile = self.strategy.profile();
        let me = &obs.own;
        let mut budget = me.resources;
        let mut command = Map::new();

        // Age first: it is the most expensive and unlocks everything else.
        if me.age < profile.max_age && me.total_villagers() >= profile.villager_target.min(8) {
            if let Some(next) = me.age.next() {
                if let Some(left) = budget.checked_sub(self.rules.age_cost(next)?) {
                    budget = left;
                    command.insert(String::from("advance_age"), Value::Bool(true));
                }
            }
        }

        let tasks = split_villagers(me.total_villagers(), profile.split);
        if !tasks.is_empty() && tasks != me.villager_tasks {
            let tasks: Map<String, Value> = tasks
                .iter()
                .map(|(kind, n)| (kind.as_str().to_owned(), json!(n)))
                .collect();
            command.insert(String::from("task_villagers"), Value::Object(tasks));
        }

        if let Some(building) = self.next_building(me, &profile, &mut budget)? {
            command.insert(
                String::from("build"),
                json!([{ "building": building.as_str() }]),
            );
        }

        if profile.research {
            if let Some(upgrade) = self.next_upgrade(me, &mut budget)? {
                command.insert(
                    String::from("research"),
                    json!([{ "upgrade": upgrade.as_str() }]),
                );
            }
        }

        let train = self.train_orders(me, &profile, &mut budget)?;
        if !train.is_empty() {
            command.insert(String::from("train"), Value::Array(train));
        }

        let moves = advance_orders(me, obs.you, &profile);
        if !moves.is_empty() {
            command.insert(String::from("move"), Value::Array(moves));
        }

        Ok(Value::Object(command))
    }

    /// The first missing building in priority order, if it is allowed and
    /// affordable now. Later entries wait for it.
    fn next_building(
        &self,
        me: &PlayerState,
        profile: &Profile,
        budget: &mut Resources,
    ) -> Result<Option<BuildingType>, RulesError> {
        let Some(&building) = profile.buildings.iter().find(|&&b| !me.has_building(b)) else {
            return Ok(None);
        };
        let stats = self.rules.building(building)?;
        if stats.min_age > me.age {
            return Ok(None);
        }
        Ok(budget.checked_sub(stats.cost).map(|left| {
            *budget = left;
            building
        }))
    }

    fn next_upgrade(
        &self,
        me: &PlayerState,
        budget: &mut Resources,
    ) -> Result<Option<UpgradeId>, RulesError> {
        for &upgrade in UpgradeId::ALL {
            if me.has_upgrade(upgrade) {
                continue;
            }
            let stats = self.rules.upgrade(upgrade)?;
            let building_ok = stats.requires_building.is_none_or(|b| me.has_building(b));
            let upgrade_ok = stats.requires_upgrade.is_none_or(|u| me.has_upgrade(u));
            if stats.min_age > me.age || !building_ok || !upgrade_ok {
                continue;
            }
            if let Some(left) = budget.checked_sub(stats.cost) {
                *budget = left;
                return Ok(Some(upgrade));
            }
        }
        Ok(None)
    }

    fn train_orders(
        &self,
        me: &PlayerState,
        profile: &Profile,
        budget: &mut Resources,
    ) -> Result<Vec<Value>, RulesError> {
        let mut orders = Vec::new();

        let queued_villagers = me
            .production_queue
            .iter()
            .filter(|item| item.unit == UnitType::Villager)
            .count();
        let queued_villagers = u32::try_from(queued_villagers).unwrap_or(u32::MAX);
        let wanted = profile
            .villager_target
            .saturating_sub(me.total_villagers().saturating_add(queued_villagers))
            .min(2);
        if let Some(order) = self.affordable_order(UnitType::Villager, wanted, budget)? {
            orders.push(order);
        }

        for &unit in profile.army {
            let stats = self.rules.unit(unit)?;
            let unlocked = {
                let mut needed = self.rules.unlocking_buildings(unit).peekable();
                needed.peek().is_none() || needed.any(|b| me.has_building(b))
            };
            if stats.min_age > me.age || !unlocked {
                continue;
            }
            if let Some(order) = self.affordable_order(unit, 3, budget)? {
                orders.push(order);
            }
            break;
        }

        Ok(orders)
    }

    /// A train order for as many of `wanted` as `budget` pays for.
    fn affordable_order(
        &self,
        unit: UnitType,
        wanted: u32,
        budget: &mut Resources,
    ) -> Result<Option<Value>, RulesError> {
        let cost = self.rules.unit(unit)?.cost;
        let count = budget.affordable_count(&cost, wanted);
        if count == 0 {
            return Ok(None);
        }
        for _ in 0..count {
            if let Some(left) = budget.checked_sub(cost) {
                *budget = left;
            }
        }
        Ok(Some(json!({ "unit": unit.as_str(), "count": count })))
    }
}

impl Decider for RuleBot {
    fn name(&self) -> &str {
        self.strategy.as_str()
    }

    fn decide(&self, observation: Observation) -> BoxFuture<'_, Result<Value, DecisionError>> {
        let planned = self.plan(&observation).map_err(|e| DecisionError::Unavailable {
            message: e.to_string(),
        });
        Box::pin(async move { planned })
    }
}

/// Split `villagers` across food, wood and gold by `shares`, rounding
/// down and giving the remainder to food. Zero entries are omitted.
fn split_villagers(villagers: u32, shares: [u32; 3]) -> BTreeMap<ResourceKind, u32> {
    let [food, wood, gold] = shares;
    let total_shares = food.saturating_add(wood).saturating_add(gold);
    let part = |share: u32| {
        villagers
            .saturating_mul(share)
            .checked_div(total_shares)
            .unwrap_or(0)
    };
    let wood_n = part(wood);
    let gold_n = part(gold);
    let food_n = villagers.saturating_sub(wood_n).saturating_sub(gold_n);
    [
        (ResourceKind::Food, food_n),
        (ResourceKind::Wood, wood_n),
        (ResourceKind::Gold, gold_n),
    ]
    .into_iter()
    .filter(|&(_, n)| n > 0)
    .collect()
}

/// The middle lane from `player`'s base to the enemy base.
const fn attack_lane(player: PlayerId) -> [Zone; 4] {
    match player {
        PlayerId::A => [Zone::BaseA, Zone::MidA, Zone::MidB, Zone::BaseB],
        PlayerId::B => [Zone::BaseB, Zone::MidB, Zone::MidA, Zone::BaseA],
    }
}

/// Push military units one step down the lane. Units already in the field
/// keep marching; the home stack leaves once it reaches `attack_at`.
fn advance_orders(me: &PlayerState, player: PlayerId, profile: &Profile) -> Vec<Value> {
    let lane = attack_lane(player);
    let home = player.home_zone();
    let home_army: u32 = me
        .present_units(home)
        .filter(|&(unit, _)| unit != UnitType::Villager)
        .fold(0, |acc, (_, n)| acc.saturating_add(n));

    let mut moves = Vec::new();
    // Forward-most first so no stack is counted twice.
    for step in lane.windows(2).rev() {
        let &[from, to] = step else {
            continue;
        };
        if from == home && home_army < profile.attack_at {
            continue;
        }
        for (unit, count) in me.present_units(from) {
            if unit == UnitType::Villager {
                continue;
            }
            moves.push(json!({
                "unit": unit.as_str(),
                "count": count,
                "from": from.as_str(),
                "to": to.as_str(),
            }));
        }
    }
    moves
}
