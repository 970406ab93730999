//! Applying sanitized commands to state.
//!
//! Phases run in a fixed order and each phase runs for player A, then B:
//! age advance, task assignment, research, construction, training,
//! movement. Every phase re-checks affordability against the live ledger,
//! because an earlier phase in the same tick may already have spent what
//! the validator saw. Each applied (or reduced) action is written to the
//! event log.

use tracing::debug;

use skirmish_rules::RulesCatalog;
use skirmish_types::{
    BuildingType, Command, MatchState, PlayerId, PlayerPair, PlayerState, ProductionItem,
    UnitType, UpgradeId,
};

use crate::error::SimError;
use crate::state::{describe_tasks, rescale_tasks, try_spend};

/// One effect phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectPhase {
    /// Advance to the next age.
    AdvanceAge,
    /// Replace the villager assignment.
    TaskVillagers,
    /// Research upgrades.
    Research,
    /// Construct buildings.
    Construction,
    /// Queue units.
    Training,
    /// Move units.
    Movement,
}

impl EffectPhase {
    /// All phases in application order.
    pub const ORDER: [Self; 6] = [
        Self::AdvanceAge,
        Self::TaskVillagers,
        Self::Research,
        Self::Construction,
        Self::Training,
        Self::Movement,
    ];
}

/// Apply both players' commands, phase by phase.
pub fn apply_effects(
    state: &mut MatchState,
    commands: &PlayerPair<Command>,
    rules: &RulesCatalog,
) -> Result<(), SimError> {
    for phase in EffectPhase::ORDER {
        for id in [PlayerId::A, PlayerId::B] {
            let command = commands.get(id);
            let player = state.players.get_mut(id);
            let messages = apply_phase(phase, player, command, rules)?;
            for message in messages {
                state.log.record(state.turn, message);
            }
        }
    }
    Ok(())
}

/// Apply one phase of one player's command, returning event-log lines.
pub fn apply_phase(
    phase: EffectPhase,
    player: &mut PlayerState,
    command: &Command,
    rules: &RulesCatalog,
) -> Result<Vec<String>, SimError> {
    let mut log = Vec::new();
    match phase {
        EffectPhase::AdvanceAge => {
            if command.advance_age {
                advance_age(player, rules, &mut log)?;
            }
        }
        EffectPhase::TaskVillagers => {
            if !command.task_villagers.is_empty() {
                assign_tasks(player, command, &mut log);
            }
        }
        EffectPhase::Research => {
            for order in &command.research {
                research(player, order.upgrade, rules, &mut log)?;
            }
        }
        EffectPhase::Construction => {
            for order in &command.build {
                construct(player, order.building, rules, &mut log)?;
            }
        }
        EffectPhase::Training => {
            for order in &command.train {
                train(player, order.unit, order.count, rules, &mut log)?;
            }
        }
        EffectPhase::Movement => {
            for order in &command.moves {
                if !rules.map().are_adjacent(order.from, order.to) {
                    continue;
                }
                let moved = player.remove_units(order.from, order.unit, order.count);
                if moved == 0 {
                    continue;
                }
                player.add_units(order.to, order.unit, moved);
                log.push(format!(
                    "P{} moved {moved}x{}: {} -> {}",
                    player.id, order.unit, order.from, order.to
                ));
            }
        }
    }
    Ok(log)
}

fn advance_age(
    player: &mut PlayerState,
    rules: &RulesCatalog,
    log: &mut Vec<String>,
) -> Result<(), SimError> {
    let Some(next) = player.age.next() else {
        return Ok(());
    };
    let cost = rules.age_cost(next)?;
    if !try_spend(player, cost) {
        log.push(format!("P{} could not afford {next}", player.id));
        return Ok(());
    }
    player.age = next;
    log.push(format!("P{} advanced to {next}", player.id));
    Ok(())
}

fn assign_tasks(player: &mut PlayerState, command: &Command, log: &mut Vec<String>) {
    let tasks = rescale_tasks(&command.task_villagers, player.total_villagers());
    if tasks.is_empty() {
        return;
    }
    player.villager_tasks = tasks;
    log.push(format!(
        "P{} tasked villagers: {}",
        player.id,
        describe_tasks(&player.villager_tasks)
    ));
}

fn research(
    player: &mut PlayerState,
    upgrade: UpgradeId,
    rules: &RulesCatalog,
    log: &mut Vec<String>,
) -> Result<(), SimError> {
    if player.has_upgrade(upgrade) {
        debug!(player = %player.id, %upgrade, "research already complete, skipped");
        return Ok(());
    }
    let stats = rules.upgrade(upgrade)?;
    if !try_spend(player, stats.cost) {
        log.push(format!("P{} could not afford research {upgrade}", player.id));
        return Ok(());
    }
    player.upgrades.push(upgrade);
    player.attack_bonus = player.attack_bonus.saturating_add(stats.attack_bonus);
    player.armor_bonus = player.armor_bonus.saturating_add(stats.armor_bonus);
    log.push(format!(
        "P{} researched {upgrade} (+{} atk, +{} armor)",
        player.id, stats.attack_bonus, stats.armor_bonus
    ));
    Ok(())
}

fn construct(
    player: &mut PlayerState,
    building: BuildingType,
    rules: &RulesCatalog,
    log: &mut Vec<String>,
) -> Result<(), SimError> {
    let stats = rules.building(building)?;
    if !try_spend(player, stats.cost) {
        log.push(format!("P{} could not afford {building}", player.id));
        return Ok(());
    }
    let home = player.home_zone;
    player.add_building(home, building, stats.pooled_hp());
    log.push(format!("P{} built {building} in {home}", player.id));
    Ok(())
}

/// Queue up to `count` units, paying per unit and stopping at the first
/// unit that cannot be paid for.
fn train(
    player: &mut PlayerState,
    unit: UnitType,
    count: u32,
    rules: &RulesCatalog,
    log: &mut Vec<String>,
) -> Result<(), SimError> {
    let stats = rules.unit(unit)?;
    let mut queued = 0_u32;
    while queued < count && try_spend(player, stats.cost) {
        player.production_queue.push(ProductionItem {
            unit,
            turns_remaining: stats.train_turns,
        });
        queued = queued.saturating_add(1);
    }
    let id = player.id;
    let turns = stats.train_turns;
    match queued {
        0 => log.push(format!("P{id} could not afford any {unit}")),
        n if n < count => log.push(format!(
            "P{id} queued {n}x{unit} of {count} requested, resources ran out ({turns} turn(s) each)"
        )),
        n => log.push(format!("P{id} queued {n}x{unit} ({turns} turn(s) each)")),
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::state::new_match;
    use skirmish_types::{
        Age, BuildOrder, MoveOrder, ResearchOrder, ResourceKind, Resources, TrainOrder, Zone,
    };

    fn idle_pair() -> PlayerPair<Command> {
        PlayerPair::default()
    }

    #[test]
    fn training_stops_when_resources_run_out() {
        let rules = RulesCatalog::standard();
        let mut state = new_match(&rules);
        let mut commands = idle_pair();
        // Two sibling orders that each passed validation against 200 food.
        commands.a.train = vec![
            TrainOrder {
                unit: UnitType::Villager,
                count: 3,
            },
            TrainOrder {
                unit: UnitType::Villager,
                count: 3,
            },
        ];
        apply_effects(&mut state, &commands, &rules).unwrap();
        let a = state.player(PlayerId::A);
        assert_eq!(a.production_queue.len(), 4);
        assert_eq!(a.resources.food, 0);
        assert_eq!(a.resources_spent, 200);
        assert!(
            state
                .log
                .entries()
                .iter()
                .any(|e| e.message.contains("resources ran out"))
        );
    }

    #[test]
    fn construction_places_in_home_zone_and_pools_hp() {
        let rules = RulesCatalog::standard();
        let mut state = new_match(&rules);
        {
            let b = state.player_mut(PlayerId::B);
            b.age = Age::CASTLE;
            b.resources = Resources::new(0, 200, 0);
        }
        let mut commands = idle_pair();
        commands.b.build = vec![
            BuildOrder {
                building: BuildingType::Wall,
            },
            BuildOrder {
                building: BuildingType::Wall,
            },
            BuildOrder {
                building: BuildingType::Wall,
            },
            BuildOrder {
                building: BuildingType::Wall,
            },
            BuildOrder {
                building: BuildingType::Wall,
            },
        ];
        apply_effects(&mut state, &commands, &rules).unwrap();
        let b = state.player(PlayerId::B);
        assert_eq!(b.building_count(Zone::BaseB, BuildingType::Wall), 4);
        assert_eq!(b.building_pool(Zone::BaseB, BuildingType::Wall), 400);
        assert_eq!(b.resources.wood, 0);
    }

    #[test]
    fn research_is_idempotent() {
        let rules = RulesCatalog::standard();
        let mut state = new_match(&rules);
        {
            let a = state.player_mut(PlayerId::A);
            a.resources = Resources::new(1000, 0, 1000);
        }
        let mut commands = idle_pair();
        commands.a.research = vec![
            ResearchOrder {
                upgrade: UpgradeId::Attack1,
            },
            ResearchOrder {
                upgrade: UpgradeId::Attack1,
            },
        ];
        apply_effects(&mut state, &commands, &rules).unwrap();
        let spent_once = state.player(PlayerId::A).resources;
        assert_eq!(spent_once, Resources::new(800, 0, 900));

        apply_effects(&mut state, &commands, &rules).unwrap();
        let a = state.player(PlayerId::A);
        assert_eq!(a.resources, spent_once);
        assert_eq!(a.upgrades, vec![UpgradeId::Attack1]);
        assert_eq!(a.attack_bonus, 2);
    }

    #[test]
    fn age_advance_spends_before_later_phases() {
        let rules = RulesCatalog::standard();
        let mut state = new_match(&rules);
        state.player_mut(PlayerId::A).resources = Resources::new(450, 200, 0);
        let mut commands = idle_pair();
        commands.a.advance_age = true;
        commands.a.train = vec![TrainOrder {
            unit: UnitType::Villager,
            count: 2,
        }];
        apply_effects(&mut state, &commands, &rules).unwrap();
        let a = state.player(PlayerId::A);
        assert_eq!(a.age, Age::FEUDAL);
        // 50 food left after the age: only one villager.
        assert_eq!(a.production_queue.len(), 1);
    }

    #[test]
    fn tasks_replace_previous_and_empty_keeps_it() {
        let rules = RulesCatalog::standard();
        let mut state = new_match(&rules);
        let mut commands = idle_pair();
        commands.a.task_villagers = BTreeMap::from([(ResourceKind::Wood, 3)]);
        apply_effects(&mut state, &commands, &rules).unwrap();
        assert_eq!(
            state.player(PlayerId::A).villager_tasks,
            BTreeMap::from([(ResourceKind::Wood, 3)])
        );

        apply_effects(&mut state, &idle_pair(), &rules).unwrap();
        assert_eq!(
            state.player(PlayerId::A).villager_tasks,
            BTreeMap::from([(ResourceKind::Wood, 3)])
        );
    }

    #[test]
    fn movement_clamps_to_what_is_present() {
        let rules = RulesCatalog::standard();
        let mut state = new_match(&rules);
        let mut commands = idle_pair();
        commands.b.moves = vec![
            MoveOrder {
                unit: UnitType::Villager,
                count: 2,
                from: Zone::BaseB,
                to: Zone::MidB,
            },
            MoveOrder {
                unit: UnitType::Villager,
                count: 2,
                from: Zone::BaseB,
                to: Zone::TopB,
            },
        ];
        apply_effects(&mut state, &commands, &rules).unwrap();
        let b = state.player(PlayerId::B);
        assert_eq!(b.unit_count(Zone::MidB, UnitType::Villager), 2);
        assert_eq!(b.unit_count(Zone::TopB, UnitType::Villager), 1);
        assert_eq!(b.unit_count(Zone::BaseB, UnitType::Villager), 0);
        assert_eq!(b.total_villagers(), 3);
    }
}
