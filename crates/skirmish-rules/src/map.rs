//! The fixed 8-zone map: an undirected adjacency graph plus the two halves.
//!
//! ```text
//!            Top_A ---- Top_B
//!           /  |          |  \
//!   Base_A -- Mid_A ---- Mid_B -- Base_B
//!           \  |          |  /
//!            Bot_A ---- Bot_B
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use skirmish_types::{PlayerId, Zone};

use crate::error::RulesError;

/// Undirected edges of the standard map.
const STANDARD_EDGES: [(Zone, Zone); 13] = [
    (Zone::BaseA, Zone::TopA),
    (Zone::BaseA, Zone::MidA),
    (Zone::BaseA, Zone::BotA),
    (Zone::TopA, Zone::MidA),
    (Zone::TopA, Zone::TopB),
    (Zone::MidA, Zone::BotA),
    (Zone::MidA, Zone::MidB),
    (Zone::BotA, Zone::BotB),
    (Zone::TopB, Zone::MidB),
    (Zone::TopB, Zone::BaseB),
    (Zone::MidB, Zone::BotB),
    (Zone::MidB, Zone::BaseB),
    (Zone::BotB, Zone::BaseB),
];

/// Zone adjacency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneGraph {
    adjacency: BTreeMap<Zone, BTreeSet<Zone>>,
}

impl ZoneGraph {
    /// The standard map. Every zone has a node, even if it had no edges.
    pub fn standard() -> Self {
        Self::from_edges(&STANDARD_EDGES)
    }

    /// Build a graph from undirected edges.
    pub fn from_edges(edges: &[(Zone, Zone)]) -> Self {
        let mut adjacency: BTreeMap<Zone, BTreeSet<Zone>> =
            Zone::ALL.iter().map(|&zone| (zone, BTreeSet::new())).collect();
        for &(a, b) in edges {
            adjacency.entry(a).or_default().insert(b);
            adjacency.entry(b).or_default().insert(a);
        }
        Self { adjacency }
    }

    /// Whether a unit can step directly from `from` to `to`.
    pub fn are_adjacent(&self, from: Zone, to: Zone) -> bool {
        self.adjacency
            .get(&from)
            .is_some_and(|neighbors| neighbors.contains(&to))
    }

    /// Neighbors of `zone` in canonical order.
    pub fn neighbors(&self, zone: Zone) -> Result<impl Iterator<Item = Zone> + '_, RulesError> {
        self.adjacency
            .get(&zone)
            .map(|set| set.iter().copied())
            .ok_or(RulesError::UnknownZone(zone))
    }

    /// Zones in `player`'s half of the map, in canonical order.
    pub fn half(player: PlayerId) -> impl Iterator<Item = Zone> {
        Zone::ALL.iter().copied().filter(move |zone| zone.side() == player)
    }

    /// Whether `zone` is in `player`'s half.
    pub fn in_half(player: PlayerId, zone: Zone) -> bool {
        zone.side() == player
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        let directed: usize = self.adjacency.values().map(BTreeSet::len).sum();
        directed / 2
    }
}

impl Default for ZoneGraph {
    fn default() -> Self {
        Self::standard()
    }
}
