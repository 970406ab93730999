//! Match seeding and the small state operations shared by every phase.

use std::collections::BTreeMap;

use skirmish_rules::RulesCatalog;
use skirmish_types::{MatchState, PlayerPair, PlayerState, ResourceKind, Resources};

/// Create a fresh match: both players at starting resources, with the
/// starting villager garrison in their home zone, in the Dark age.
pub fn new_match(rules: &RulesCatalog) -> MatchState {
    let start = rules.start();
    let players = PlayerPair::from_fn(|id| {
        PlayerState::new(id, start.resources, start.villagers, start.town_center_hp)
    });
    MatchState::new(players)
}

/// Deduct `cost` from the player's ledger if it is affordable in full.
///
/// Returns `false` and leaves the ledger untouched otherwise. Spent amounts
/// accumulate into `resources_spent`.
pub fn try_spend(player: &mut PlayerState, cost: Resources) -> bool {
    let Some(remaining) = player.resources.checked_sub(cost) else {
        return false;
    };
    player.resources = remaining;
    player.resources_spent = player.resources_spent.saturating_add(cost.total());
    true
}

/// Scale a villager task assignment down to fit `budget` villagers.
///
/// If the assignment already fits it is returned unchanged. Otherwise each
/// entry becomes `floor(count * budget / total)`, which keeps the relative
/// proportions and always lands at or under the budget. Zero entries are
/// dropped either way.
pub fn rescale_tasks(
    tasks: &BTreeMap<ResourceKind, u32>,
    budget: u32,
) -> BTreeMap<ResourceKind, u32> {
    let total: u64 = tasks.values().map(|&n| u64::from(n)).sum();
    if total <= u64::from(budget) {
        return tasks
            .iter()
            .filter(|&(_, &n)| n > 0)
            .map(|(&kind, &n)| (kind, n))
            .collect();
    }
    tasks
        .iter()
        .filter_map(|(&kind, &n)| {
            let scaled = u64::from(n)
                .saturating_mul(u64::from(budget))
                .checked_div(total)?;
            let scaled = u32::try_from(scaled).ok()?;
            (scaled > 0).then_some((kind, scaled))
        })
        .collect()
}

/// Render a task assignment as `food 3, wood 1` for the event log.
pub fn describe_tasks(tasks: &BTreeMap<ResourceKind, u32>) -> String {
    if tasks.is_empty() {
        return String::from("none");
    }
    tasks
        .iter()
        .map(|(kind, n)| format!("{kind} {n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_types::{Age, PlayerId, UnitType, Zone};

    #[test]
    fn new_match_uses_starting_conditions() {
        let rules = RulesCatalog::standard();
        let state = new_match(&rules);
        assert_eq!(state.turn, 1);
        for (id, player) in state.players.iter() {
            assert_eq!(player.resources, Resources::new(200, 150, 50));
            assert_eq!(player.unit_count(id.home_zone(), UnitType::Villager), 3);
            assert_eq!(player.town_center_hp, 200);
            assert_eq!(player.age, Age::DARK);
        }
        assert_eq!(state.player(PlayerId::B).home_zone, Zone::BaseB);
    }

    #[test]
    fn try_spend_is_all_or_nothing() {
        let mut player = PlayerState::new(PlayerId::A, Resources::new(100, 0, 0), 0, 200);
        assert!(!try_spend(&mut player, Resources::new(50, 1, 0)));
        assert_eq!(player.resources, Resources::new(100, 0, 0));
        assert_eq!(player.resources_spent, 0);

        assert!(try_spend(&mut player, Resources::new(60, 0, 0)));
        assert_eq!(player.resources, Resources::new(40, 0, 0));
        assert_eq!(player.resources_spent, 60);
    }

    #[test]
    fn rescale_keeps_fitting_assignments() {
        let tasks = BTreeMap::from([(ResourceKind::Food, 2), (ResourceKind::Wood, 0)]);
        let out = rescale_tasks(&tasks, 3);
        assert_eq!(out, BTreeMap::from([(ResourceKind::Food, 2)]));
    }

    #[test]
    fn rescale_floors_proportionally() {
        let tasks = BTreeMap::from([
            (ResourceKind::Food, 5),
            (ResourceKind::Wood, 3),
            (ResourceKind::Gold, 2),
        ]);
        // total 10 -> budget 4: 2, 1.2, 0.8 -> 2, 1, 0
        let out = rescale_tasks(&tasks, 4);
        assert_eq!(
            out,
            BTreeMap::from([(ResourceKind::Food, 2), (ResourceKind::Wood, 1)])
        );
        assert!(out.values().sum::<u32>() <= 4);
    }

    #[test]
    fn rescale_to_zero_villagers_clears() {
        let tasks = BTreeMap::from([(ResourceKind::Gold, 3)]);
        assert!(rescale_tasks(&tasks, 0).is_empty());
    }

    #[test]
    fn describe_tasks_formats() {
        let tasks = BTreeMap::from([(ResourceKind::Food, 3), (ResourceKind::Gold, 1)]);
        assert_eq!(describe_tasks(&tasks), "food 3, gold 1");
        assert_eq!(describe_tasks(&BTreeMap::new()), "none");
    }
}
