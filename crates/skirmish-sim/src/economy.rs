//! Per-tick income and production.
//!
//! Runs once at the start of every tick, before decisions are solicited,
//! for each player independently:
//!
//! 1. Reconcile the stored villager assignment against villagers actually
//!    alive, rescaling it down if losses left it over budget.
//! 2. Credit task income, idle yield for unassigned villagers, and the
//!    passive gold trickle.
//! 3. Advance the production queue, moving finished units to the home zone.

use serde::Serialize;
use tracing::debug;

use skirmish_rules::{EconomyRates, RulesCatalog};
use skirmish_types::{MatchState, PlayerId, PlayerPair, PlayerState, ResourceKind, Resources, UnitType};

use crate::state::{describe_tasks, rescale_tasks};

/// What the economy did for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncomeReport {
    /// Resources credited.
    pub income: Resources,
    /// Villagers counted across all zones.
    pub villagers: u32,
    /// Villagers without an assignment.
    pub idle: u32,
    /// Whether the stored assignment had to be reduced.
    pub rescaled: bool,
    /// Units that left the production queue this tick.
    pub graduated: Vec<UnitType>,
}

/// Apply one economy tick to both players and log the results.
pub fn apply_economy(state: &mut MatchState, rules: &RulesCatalog) -> PlayerPair<IncomeReport> {
    let turn = state.turn;
    let mut reports = PlayerPair::<IncomeReport>::default();
    for id in [PlayerId::A, PlayerId::B] {
        let player = state.players.get_mut(id);
        let report = economy_for(player, rules.economy());

        if report.rescaled {
            state.log.record(
                turn,
                format!(
                    "P{id} villager tasks rescaled to {} after losses",
                    describe_tasks(&player.villager_tasks)
                ),
            );
        }
        let income = report.income;
        state.log.record(
            turn,
            format!(
                "P{id} income: +{}f +{}w +{}g (total: {})",
                income.food, income.wood, income.gold, player.resources
            ),
        );
        for unit in &report.graduated {
            state
                .log
                .record(turn, format!("P{id} trained {unit} -> {}", player.home_zone));
        }

        debug!(
            turn,
            player = %id,
            villagers = report.villagers,
            idle = report.idle,
            income = %income,
            graduated = report.graduated.len(),
            "economy applied"
        );
        *reports.get_mut(id) = report;
    }
    reports
}

/// Income and production for a single player.
pub fn economy_for(player: &mut PlayerState, rates: &EconomyRates) -> IncomeReport {
    let villagers = player.total_villagers();
    let reconciled = rescale_tasks(&player.villager_tasks, villagers);
    let rescaled = reconciled != player.villager_tasks;
    player.villager_tasks = reconciled;

    let tasked = player.tasked_villagers();
    let idle = villagers.saturating_sub(tasked);

    let mut income = Resources::ZERO;
    for kind in ResourceKind::ALL {
        let assigned = player.villager_tasks.get(kind).copied().unwrap_or(0);
        let from_tasks = assigned.saturating_mul(rates.task_rates.get(*kind));
        let from_idle = idle.saturating_mul(rates.idle_yield.get(*kind));
        income.add(*kind, from_tasks.saturating_add(from_idle));
    }
    income.add(ResourceKind::Gold, rates.gold_trickle);
    player.resources = player.resources.saturating_add(income);

    let graduated = advance_queue(player);

    IncomeReport {
        income,
        villagers,
        idle,
        rescaled,
        graduated,
    }
}

/// Decrement every queued item; graduate those reaching zero, oldest first.
pub fn advance_queue(player: &mut PlayerState) -> Vec<UnitType> {
    let home = player.home_zone;
    let mut graduated = Vec::new();
    let mut remaining = Vec::with_capacity(player.production_queue.len());
    for mut item in player.production_queue.drain(..) {
        item.turns_remaining = item.turns_remaining.saturating_sub(1);
        if item.turns_remaining == 0 {
            graduated.push(item.unit);
        } else {
            remaining.push(item);
        }
    }
    player.production_queue = remaining;
    for &unit in &graduated {
        player.add_units(home, unit, 1);
    }
    graduated
}
