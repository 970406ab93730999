//! Turn-limit scoring.

use skirmish_rules::RulesCatalog;
use skirmish_types::{MatchState, PlayerPair, PlayerState, UnitType};

use crate::error::SimError;

/// A player's score: resources ever spent, plus the weighted value of units
/// on the field, plus a flat amount per building.
///
/// Units still in the production queue do not count.
pub fn score(player: &PlayerState, rules: &RulesCatalog) -> Result<u64, SimError> {
    let mut army = 0_u64;
    for &unit in UnitType::ALL {
        let value = rules.unit(unit)?.value;
        army = army.saturating_add(value.saturating_mul(u64::from(player.total_of(unit))));
    }
    let buildings = player
        .total_buildings()
        .saturating_mul(rules.building_value());
    Ok(player
        .resources_spent
        .saturating_add(army.saturating_mul(rules.unit_value_multiplier()))
        .saturating_add(buildings))
}

/// Both players' scores.
pub fn scores(state: &MatchState, rules: &RulesCatalog) -> Result<PlayerPair<u64>, SimError> {
    Ok(PlayerPair::new(
        score(&state.players.a, rules)?,
        score(&state.players.b, rules)?,
    ))
}
