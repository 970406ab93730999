//! State sanity checks.
//!
//! None of these should ever fire. A violation means an effect applier has
//! a bug, and the orchestrator treats it as fatal to the match.

use core::fmt;
use std::collections::BTreeSet;

use serde::Serialize;

use skirmish_rules::RulesCatalog;
use skirmish_types::{MatchState, PlayerState, Zone};

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvariantViolation {
    /// What was wrong.
    pub message: String,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invariant violation: {}", self.message)
    }
}

impl InvariantViolation {
    fn new(message: String) -> Self {
        Self { message }
    }
}

/// Check invariants that hold at every point between phases.
///
/// Covers zone completeness of every per-zone mapping, zero-count hygiene,
/// upgrade uniqueness, bonus totals, town center bounds and HP pools
/// without a matching building.
#[must_use]
pub fn check_invariants(state: &MatchState, rules: &RulesCatalog) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    for (_, player) in state.players.iter() {
        check_player(player, rules, &mut violations);
    }
    violations
}

/// Check that no player has more villagers tasked than it owns.
///
/// Only meaningful after economy reconciliation or validation; combat can
/// legitimately leave stale assignments until the next economy tick.
#[must_use]
pub fn check_task_budget(state: &MatchState) -> Vec<InvariantViolation> {
    state
        .players
        .iter()
        .filter_map(|(id, player)| {
            let tasked = player.tasked_villagers();
            let owned = player.total_villagers();
            (tasked > owned).then(|| {
                InvariantViolation::new(format!(
                    "player {id} has {tasked} villagers tasked but owns {owned}"
                ))
            })
        })
        .collect()
}

fn check_player(player: &PlayerState, rules: &RulesCatalog, out: &mut Vec<InvariantViolation>) {
    let id = player.id;
    for &zone in Zone::ALL {
        if !player.units.contains_key(&zone) {
            out.push(InvariantViolation::new(format!(
                "player {id} units missing zone {zone}"
            )));
        }
        if !player.buildings.contains_key(&zone) {
            out.push(InvariantViolation::new(format!(
                "player {id} buildings missing zone {zone}"
            )));
        }
        if !player.building_hp.contains_key(&zone) {
            out.push(InvariantViolation::new(format!(
                "player {id} building_hp missing zone {zone}"
            )));
        }
    }

    for (zone, counts) in &player.units {
        for (unit, count) in counts {
            if *count == 0 {
                out.push(InvariantViolation::new(format!(
                    "player {id} stores a zero count of {unit} in {zone}"
                )));
            }
        }
    }

    for (zone, pools) in &player.building_hp {
        for building in pools.keys() {
            if player.building_count(*zone, *building) == 0 {
                out.push(InvariantViolation::new(format!(
                    "player {id} has an HP pool for {building} in {zone} without the building"
                )));
            }
        }
    }

    let unique: BTreeSet<_> = player.upgrades.iter().collect();
    if unique.len() != player.upgrades.len() {
        out.push(InvariantViolation::new(format!(
            "player {id} has duplicate upgrades: {:?}",
            player.upgrades
        )));
    }

    let (attack, armor) = player
        .upgrades
        .iter()
        .filter_map(|&u| rules.upgrade(u).ok())
        .fold((0_u32, 0_u32), |(atk, arm), stats| {
            (
                atk.saturating_add(stats.attack_bonus),
                arm.saturating_add(stats.armor_bonus),
            )
        });
    if attack != player.attack_bonus || armor != player.armor_bonus {
        out.push(InvariantViolation::new(format!(
            "player {id} bonuses {}/{} disagree with researched upgrades {attack}/{armor}",
            player.attack_bonus, player.armor_bonus
        )));
    }

    if player.town_center_hp > rules.start().town_center_hp {
        out.push(InvariantViolation::new(format!(
            "player {id} town center HP {} exceeds maximum",
            player.town_center_hp
        )));
    }
}
