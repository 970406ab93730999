//! Player and match state, the event log, and the render snapshot.
//!
//! These are plain records. Every per-zone mapping in [`PlayerState`] is
//! seeded with an entry for each [`Zone`] at construction and entries are
//! never removed, so lookups by zone always succeed on a well-formed state.
//! The rules that mutate these records live in `skirmish-sim`.

use core::fmt;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Age, BuildingType, MatchOutcome, PlayerId, ResourceKind, UnitType, UpgradeId, Zone};
use crate::ids::MatchId;
use crate::pair::PlayerPair;
use crate::resources::Resources;

// ---------------------------------------------------------------------------
// Production
// ---------------------------------------------------------------------------

/// A unit in training.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProductionItem {
    /// Unit type being trained.
    pub unit: UnitType,
    /// Ticks left before the unit appears in the home zone.
    pub turns_remaining: u32,
}

// ---------------------------------------------------------------------------
// PlayerState
// ---------------------------------------------------------------------------

/// Everything one player owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerState {
    /// Which player this is.
    pub id: PlayerId,
    /// The base zone holding the town center.
    pub home_zone: Zone,
    /// Resource ledger.
    pub resources: Resources,
    /// Unit counts per zone. Zero counts are not stored.
    pub units: BTreeMap<Zone, BTreeMap<UnitType, u32>>,
    /// Constructed building instances per zone.
    pub buildings: BTreeMap<Zone, Vec<BuildingType>>,
    /// Pooled remaining hit points of depletable buildings per zone.
    pub building_hp: BTreeMap<Zone, BTreeMap<BuildingType, u32>>,
    /// Town center hit points. Never increases.
    pub town_center_hp: u32,
    /// Units in training, oldest first.
    pub production_queue: Vec<ProductionItem>,
    /// Current age.
    pub age: Age,
    /// Villagers assigned to each resource kind.
    pub villager_tasks: BTreeMap<ResourceKind, u32>,
    /// Researched upgrades in research order, without duplicates.
    pub upgrades: Vec<UpgradeId>,
    /// Sum of researched attack bonuses.
    pub attack_bonus: u32,
    /// Sum of researched armor bonuses.
    pub armor_bonus: u32,
    /// Resources ever spent.
    pub resources_spent: u64,
    /// Own units destroyed.
    pub units_lost: u64,
    /// Enemy units destroyed.
    pub units_killed: u64,
}

impl PlayerState {
    /// A fresh player with `villagers` in the home zone and every zone seeded.
    pub fn new(id: PlayerId, resources: Resources, villagers: u32, town_center_hp: u32) -> Self {
        let home_zone = id.home_zone();
        let units = Zone::ALL.iter().map(|&zone| (zone, BTreeMap::new())).collect();
        let buildings = Zone::ALL.iter().map(|&zone| (zone, Vec::new())).collect();
        let building_hp = Zone::ALL.iter().map(|&zone| (zone, BTreeMap::new())).collect();
        let mut player = Self {
            id,
            home_zone,
            resources,
            units,
            buildings,
            building_hp,
            town_center_hp,
            production_queue: Vec::new(),
            age: Age::DARK,
            villager_tasks: BTreeMap::new(),
            upgrades: Vec::new(),
            attack_bonus: 0,
            armor_bonus: 0,
            resources_spent: 0,
            units_lost: 0,
            units_killed: 0,
        };
        player.add_units(home_zone, UnitType::Villager, villagers);
        player
    }

    /// Count of `unit` in `zone`.
    pub fn unit_count(&self, zone: Zone, unit: UnitType) -> u32 {
        self.units
            .get(&zone)
            .and_then(|counts| counts.get(&unit))
            .copied()
            .unwrap_or(0)
    }

    /// Unit types with a nonzero count in `zone`.
    pub fn present_units(&self, zone: Zone) -> impl Iterator<Item = (UnitType, u32)> + '_ {
        self.units
            .get(&zone)
            .into_iter()
            .flat_map(|counts| counts.iter())
            .filter(|&(_, &count)| count > 0)
            .map(|(&unit, &count)| (unit, count))
    }

    /// Whether at least one unit stands in `zone`.
    pub fn has_units_in(&self, zone: Zone) -> bool {
        self.present_units(zone).next().is_some()
    }

    /// Zones containing at least one unit.
    pub fn occupied_zones(&self) -> impl Iterator<Item = Zone> + '_ {
        Zone::ALL.iter().copied().filter(|&zone| self.has_units_in(zone))
    }

    /// Total of one unit type across all zones.
    pub fn total_of(&self, unit: UnitType) -> u32 {
        self.units
            .values()
            .filter_map(|counts| counts.get(&unit))
            .fold(0_u32, |acc, &count| acc.saturating_add(count))
    }

    /// Total units on the map (queued units excluded).
    pub fn total_units(&self) -> u64 {
        self.units
            .values()
            .flat_map(BTreeMap::values)
            .fold(0_u64, |acc, &count| acc.saturating_add(u64::from(count)))
    }

    /// Villagers on the map.
    pub fn total_villagers(&self) -> u32 {
        self.total_of(UnitType::Villager)
    }

    /// Villagers currently assigned to any task.
    pub fn tasked_villagers(&self) -> u32 {
        self.villager_tasks
            .values()
            .fold(0_u32, |acc, &count| acc.saturating_add(count))
    }

    /// Add `count` units to `zone`.
    pub fn add_units(&mut self, zone: Zone, unit: UnitType, count: u32) {
        if count == 0 {
            return;
        }
        let slot = self.units.entry(zone).or_default().entry(unit).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    /// Remove up to `count` units from `zone`, returning how many were removed.
    pub fn remove_units(&mut self, zone: Zone, unit: UnitType, count: u32) -> u32 {
        let Some(counts) = self.units.get_mut(&zone) else {
            return 0;
        };
        let Some(slot) = counts.get_mut(&unit) else {
            return 0;
        };
        let removed = count.min(*slot);
        *slot = slot.saturating_sub(removed);
        if *slot == 0 {
            counts.remove(&unit);
        }
        removed
    }

    /// Whether an instance of `building` exists in any zone.
    pub fn has_building(&self, building: BuildingType) -> bool {
        self.buildings.values().any(|list| list.contains(&building))
    }

    /// Instances of `building` in `zone`.
    pub fn building_count(&self, zone: Zone, building: BuildingType) -> u32 {
        self.buildings.get(&zone).map_or(0, |list| {
            let n = list.iter().filter(|&&b| b == building).count();
            u32::try_from(n).unwrap_or(u32::MAX)
        })
    }

    /// Building instances across all zones.
    pub fn total_buildings(&self) -> u64 {
        self.buildings.values().fold(0_u64, |acc, list| {
            acc.saturating_add(u64::try_from(list.len()).unwrap_or(u64::MAX))
        })
    }

    /// Place a building in `zone`, pooling `hp` for depletable types.
    pub fn add_building(&mut self, zone: Zone, building: BuildingType, hp: Option<u32>) {
        self.buildings.entry(zone).or_default().push(building);
        if let Some(hp) = hp {
            let pool = self
                .building_hp
                .entry(zone)
                .or_default()
                .entry(building)
                .or_insert(0);
            *pool = pool.saturating_add(hp);
        }
    }

    /// Remove every instance of `building` from `zone` along with its HP pool.
    pub fn remove_buildings(&mut self, zone: Zone, building: BuildingType) {
        if let Some(list) = self.buildings.get_mut(&zone) {
            list.retain(|&b| b != building);
        }
        if let Some(pools) = self.building_hp.get_mut(&zone) {
            pools.remove(&building);
        }
    }

    /// Remaining pooled HP of `building` in `zone`.
    pub fn building_pool(&self, zone: Zone, building: BuildingType) -> u32 {
        self.building_hp
            .get(&zone)
            .and_then(|pools| pools.get(&building))
            .copied()
            .unwrap_or(0)
    }

    /// Whether `upgrade` has been researched.
    pub fn has_upgrade(&self, upgrade: UpgradeId) -> bool {
        self.upgrades.contains(&upgrade)
    }
}

// ---------------------------------------------------------------------------
// Event log
// ---------------------------------------------------------------------------

/// One line of the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LogEntry {
    /// Turn during which the event happened.
    pub turn: u32,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[T{}] {}", self.turn, self.message)
    }
}

/// Append-only match log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct EventLog(Vec<LogEntry>);

impl EventLog {
    /// Append an entry.
    pub fn record(&mut self, turn: u32, message: impl Into<String>) {
        self.0.push(LogEntry {
            turn,
            message: message.into(),
        });
    }

    /// The last `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[LogEntry] {
        let start = self.0.len().saturating_sub(n);
        self.0.get(start..).unwrap_or_default()
    }

    /// All entries.
    pub fn entries(&self) -> &[LogEntry] {
        &self.0
    }

    /// Entries recorded during `turn`.
    pub fn for_turn(&self, turn: u32) -> impl Iterator<Item = &LogEntry> {
        self.0.iter().filter(move |entry| entry.turn == turn)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// The authoritative state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MatchState {
    /// Session identifier.
    pub id: MatchId,
    /// Current turn, starting at 1.
    pub turn: u32,
    /// Both players.
    pub players: PlayerPair<PlayerState>,
    /// Event log.
    pub log: EventLog,
    outcome: MatchOutcome,
}

impl MatchState {
    /// A new undecided match at turn 1.
    pub fn new(players: PlayerPair<PlayerState>) -> Self {
        Self {
            id: MatchId::new(),
            turn: 1,
            players,
            log: EventLog::default(),
            outcome: MatchOutcome::Undecided,
        }
    }

    /// Current outcome.
    pub const fn outcome(&self) -> MatchOutcome {
        self.outcome
    }

    /// Set the outcome once. Returns `false` and leaves the state untouched
    /// if the match was already decided or `outcome` is `Undecided`.
    pub const fn conclude(&mut self, outcome: MatchOutcome) -> bool {
        if self.outcome.is_decided() || !outcome.is_decided() {
            return false;
        }
        self.outcome = outcome;
        true
    }

    /// Log a message against the current turn.
    pub fn record(&mut self, message: impl Into<String>) {
        self.log.record(self.turn, message);
    }

    /// Borrow one player.
    pub const fn player(&self, id: PlayerId) -> &PlayerState {
        self.players.get(id)
    }

    /// Mutably borrow one player.
    pub const fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        self.players.get_mut(id)
    }
}

// ---------------------------------------------------------------------------
// Render snapshot
// ---------------------------------------------------------------------------

/// Serializable view of a match after a tick, for renderers and snapshot
/// writers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MatchSnapshot {
    /// Session identifier.
    pub match_id: MatchId,
    /// The turn that was just completed.
    pub turn: u32,
    /// Both players in full.
    pub players: PlayerPair<PlayerState>,
    /// The whole event log.
    pub log: EventLog,
    /// Outcome after the tick.
    pub outcome: MatchOutcome,
    /// Current score of each player.
    pub scores: PlayerPair<u64>,
    /// Wall-clock capture time.
    pub captured_at: DateTime<Utc>,
}

impl MatchSnapshot {
    /// Capture `state` for completed turn `turn`.
    pub fn capture(state: &MatchState, turn: u32, scores: PlayerPair<u64>) -> Self {
        Self {
            match_id: state.id,
            turn,
            players: state.players.clone(),
            log: state.log.clone(),
            outcome: state.outcome(),
            scores,
            captured_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn player() -> PlayerState {
        PlayerState::new(PlayerId::A, Resources::new(200, 150, 50), 3, 200)
    }

    #[test]
    fn new_player_seeds_every_zone() {
        let p = player();
        for zone in Zone::ALL {
            assert!(p.units.contains_key(zone));
            assert!(p.buildings.contains_key(zone));
            assert!(p.building_hp.contains_key(zone));
        }
        assert_eq!(p.unit_count(Zone::BaseA, UnitType::Villager), 3);
        assert_eq!(p.total_villagers(), 3);
        assert_eq!(p.age, Age::DARK);
    }

    #[test]
    fn remove_units_clamps_and_drops_empty_entries() {
        let mut p = player();
        assert_eq!(p.remove_units(Zone::BaseA, UnitType::Villager, 5), 3);
        assert!(!p.has_units_in(Zone::BaseA));
        assert!(p.units.get(&Zone::BaseA).unwrap().is_empty());
        assert_eq!(p.remove_units(Zone::TopA, UnitType::Knight, 1), 0);
    }

    #[test]
    fn buildings_pool_hp_per_zone_and_type() {
        let mut p = player();
        p.add_building(Zone::BaseA, BuildingType::Wall, Some(100));
        p.add_building(Zone::BaseA, BuildingType::Wall, Some(100));
        p.add_building(Zone::BaseA, BuildingType::Barracks, None);
        assert_eq!(p.building_count(Zone::BaseA, BuildingType::Wall), 2);
        assert_eq!(p.building_pool(Zone::BaseA, BuildingType::Wall), 200);
        assert_eq!(p.total_buildings(), 3);

        p.remove_buildings(Zone::BaseA, BuildingType::Wall);
        assert_eq!(p.building_count(Zone::BaseA, BuildingType::Wall), 0);
        assert_eq!(p.building_pool(Zone::BaseA, BuildingType::Wall), 0);
        assert!(p.has_building(BuildingType::Barracks));
    }

    #[test]
    fn outcome_is_write_once() {
        let players = PlayerPair::from_fn(|id| PlayerState::new(id, Resources::ZERO, 0, 200));
        let mut state = MatchState::new(players);
        assert!(!state.conclude(MatchOutcome::Undecided));
        assert!(state.conclude(MatchOutcome::Victory(PlayerId::B)));
        assert!(!state.conclude(MatchOutcome::Draw));
        assert_eq!(state.outcome(), MatchOutcome::Victory(PlayerId::B));
    }

    #[test]
    fn recent_returns_trailing_slice() {
        let mut log = EventLog::default();
        for turn in 1..=7 {
            log.record(turn, format!("event {turn}"));
        }
        let recent = log.recent(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent.first().unwrap().turn, 3);
        assert_eq!(log.recent(50).len(), 7);
        assert_eq!(recent.last().unwrap().to_string(), "[T7] event 7");
    }

    #[test]
    fn snapshot_serializes_players_by_key() {
        let players = PlayerPair::from_fn(|id| PlayerState::new(id, Resources::ZERO, 1, 200));
        let state = MatchState::new(players);
        let snap = MatchSnapshot::capture(&state, 1, PlayerPair::new(25, 25));
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["players"]["B"]["home_zone"], "Base_B");
        assert_eq!(json["outcome"], "undecided");
        assert_eq!(json["players"]["A"]["units"]["Base_A"]["Villager"], 1);
    }
}
