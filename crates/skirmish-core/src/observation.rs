//! Per-player observation assembly with fog of war.
//!
//! A zone is visible to a player if it lies in that player's half of the
//! map or currently holds at least one of its units. Enemy units and
//! buildings are reported only in visible zones. The opponent's age and
//! town center HP are common knowledge and always included.

use std::collections::BTreeMap;

use skirmish_rules::ZoneGraph;
use skirmish_types::{MatchState, Observation, PlayerId, Zone, ZoneView};

use crate::config::MatchSettings;

/// Whether `zone` is visible to `viewer` in `state`.
pub fn is_visible(state: &MatchState, viewer: PlayerId, zone: Zone) -> bool {
    ZoneGraph::in_half(viewer, zone) || state.player(viewer).has_units_in(zone)
}

/// Build the observation handed to `viewer`'s decider.
pub fn build_observation(state: &MatchState, viewer: PlayerId, settings: &MatchSettings) -> Observation {
    let own = state.player(viewer);
    let enemy = state.player(viewer.opponent());

    let zones: BTreeMap<Zone, ZoneView> = Zone::ALL
        .iter()
        .map(|&zone| {
            let visible = is_visible(state, viewer, zone);
            let mut view = ZoneView {
                visible,
                own_units: own.present_units(zone).collect(),
                own_buildings: own.buildings.get(&zone).cloned().unwrap_or_default(),
                ..ZoneView::default()
            };
            if visible {
                view.enemy_units = enemy.present_units(zone).collect();
                view.enemy_buildings = enemy.buildings.get(&zone).cloned().unwrap_or_default();
            }
            (zone, view)
        })
        .collect();

    Observation {
        turn: state.turn,
        turn_limit: settings.turn_limit,
        you: viewer,
        own: own.clone(),
        zones,
        opponent_age: enemy.age,
        opponent_town_center_hp: enemy.town_center_hp,
        recent_events: state.log.recent(settings.recent_events).to_vec(),
    }
}
