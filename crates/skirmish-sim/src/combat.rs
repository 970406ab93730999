//! Deterministic per-zone combat.
//!
//! Zones are resolved in canonical [`Zone::ALL`] order. Within a zone:
//!
//! 1. **Towers** fire first. Each player's area-damage buildings hit the
//!    other player's units in the zone.
//! 2. **Field combat** runs if both players still have units. Both sides'
//!    outgoing damage is computed from the pre-round counts, then applied.
//! 3. **Siege** uses post-combat occupancy: units standing alone in the
//!    opponent's home zone hit its Wall pool, then its town center.
//!
//! Damage is carried in hundredths ([`Damage`]) so the 150% counter bonus
//! is exact. Distribution consumes whole units tankiest first and finishes
//! with at most one partial kill; nothing is left wounded.

use core::fmt;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use skirmish_rules::RulesCatalog;
use skirmish_types::{BuildingType, MatchState, PlayerId, PlayerPair, PlayerState, UnitType, Zone};

use crate::error::SimError;

// ---------------------------------------------------------------------------
// Damage
// ---------------------------------------------------------------------------

/// An amount of damage in hundredths of a hit point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Damage(u64);

impl Damage {
    /// No damage.
    pub const ZERO: Self = Self(0);

    /// Whole hit points of damage.
    pub const fn from_whole(points: u64) -> Self {
        Self(points.saturating_mul(100))
    }

    /// Damage expressed directly in hundredths.
    pub const fn from_hundredths(hundredths: u64) -> Self {
        Self(hundredths)
    }

    /// Raw hundredths.
    pub const fn hundredths(self) -> u64 {
        self.0
    }

    /// Whole hit points, rounded down.
    pub const fn whole(self) -> u64 {
        self.0 / 100
    }

    /// Whether there is no damage.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Saturating sum.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Damage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frac = self.0 % 100;
        if frac == 0 {
            write!(f, "{}", self.whole())
        } else {
            write!(f, "{}.{frac:02}", self.whole())
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of a siege on a home zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiegeReport {
    /// The besieging player.
    pub attacker: PlayerId,
    /// Total base attack of the besiegers.
    pub damage: u64,
    /// Damage soaked by the Wall pool.
    pub wall_absorbed: u64,
    /// Whether the Wall pool reached zero this tick.
    pub wall_destroyed: bool,
    /// Damage that reached the town center.
    pub town_center_damage: u64,
    /// Defender's town center HP afterwards.
    pub town_center_hp: u32,
}

/// What happened in one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneCombat {
    /// The zone.
    pub zone: Zone,
    /// Damage fired by each player's towers.
    pub tower_fire: PlayerPair<Damage>,
    /// Whether a field round was fought.
    pub engaged: bool,
    /// Field damage dealt by each player.
    pub field_damage: PlayerPair<Damage>,
    /// Units each player lost in this zone.
    pub losses: PlayerPair<BTreeMap<UnitType, u32>>,
    /// Siege, if one happened.
    pub siege: Option<SiegeReport>,
}

impl ZoneCombat {
    fn new(zone: Zone) -> Self {
        Self {
            zone,
            tower_fire: PlayerPair::default(),
            engaged: false,
            field_damage: PlayerPair::default(),
            losses: PlayerPair::default(),
            siege: None,
        }
    }

    /// Whether nothing happened.
    pub fn is_quiet(&self) -> bool {
        !self.engaged
            && self.siege.is_none()
            && self.tower_fire.iter().all(|(_, d)| d.is_zero())
    }

    /// Units lost by `player` in this zone.
    pub fn units_lost(&self, player: PlayerId) -> u64 {
        self.losses
            .get(player)
            .values()
            .fold(0_u64, |acc, &n| acc.saturating_add(u64::from(n)))
    }
}

/// Combat across every zone for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CombatReport {
    /// Zones where anything happened, in canonical order.
    pub zones: Vec<ZoneCombat>,
}

impl CombatReport {
    /// Zones where a field round was fought.
    pub fn engaged_zones(&self) -> Vec<Zone> {
        self.zones
            .iter()
            .filter(|z| z.engaged)
            .map(|z| z.zone)
            .collect()
    }

    /// Sieges that happened this tick.
    pub fn sieges(&self) -> impl Iterator<Item = &SiegeReport> {
        self.zones.iter().filter_map(|z| z.siege.as_ref())
    }

    /// Town center damage dealt by `attacker` this tick.
    pub fn siege_damage_by(&self, attacker: PlayerId) -> u64 {
        self.sieges()
            .filter(|s| s.attacker == attacker)
            .fold(0_u64, |acc, s| acc.saturating_add(s.town_center_damage))
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve combat in every zone, in canonical order, logging as it goes.
pub fn resolve_all(state: &mut MatchState, rules: &RulesCatalog) -> Result<CombatReport, SimError> {
    let mut report = CombatReport::default();
    for &zone in Zone::ALL {
        let mut log = Vec::new();
        let outcome = resolve_zone(&mut state.players, zone, rules, &mut log)?;
        for line in log {
            state.log.record(state.turn, line);
        }
        if !outcome.is_quiet() {
            debug!(
                turn = state.turn,
                zone = %zone,
                engaged = outcome.engaged,
                lost_a = outcome.units_lost(PlayerId::A),
                lost_b = outcome.units_lost(PlayerId::B),
                siege = outcome.siege.is_some(),
                "zone resolved"
            );
            report.zones.push(outcome);
        }
    }
    Ok(report)
}

/// Resolve one zone: towers, then field combat, then siege.
pub fn resolve_zone(
    players: &mut PlayerPair<PlayerState>,
    zone: Zone,
    rules: &RulesCatalog,
    log: &mut Vec<String>,
) -> Result<ZoneCombat, SimError> {
    for (_, player) in players.iter() {
        ensure_zone(player, zone)?;
    }
    let mut outcome = ZoneCombat::new(zone);

    // Towers.
    for id in [PlayerId::A, PlayerId::B] {
        let (owner, target) = players.split_mut(id);
        let fire = area_damage(owner, zone, rules)?;
        if fire.is_zero() || !target.has_units_in(zone) {
            continue;
        }
        log.push(format!(
            "P{id}'s towers in {zone} fire {fire} dmg at P{}'s units",
            target.id
        ));
        *outcome.tower_fire.get_mut(id) = fire;
        let killed = distribute_damage(target, owner, zone, fire, rules)?;
        record_losses(log, target.id, zone, &killed);
        merge_losses(outcome.losses.get_mut(target.id), killed);
    }

    // Field combat on pre-round counts.
    let units_a: BTreeMap<UnitType, u32> = players.a.present_units(zone).collect();
    let units_b: BTreeMap<UnitType, u32> = players.b.present_units(zone).collect();
    if !units_a.is_empty() && !units_b.is_empty() {
        outcome.engaged = true;
        log.push(format!(
            "Combat in {zone}: A={} vs B={}",
            describe_units(&units_a),
            describe_units(&units_b)
        ));
        let to_b = field_damage(&units_a, &units_b, players.a.attack_bonus, rules)?;
        let to_a = field_damage(&units_b, &units_a, players.b.attack_bonus, rules)?;
        outcome.field_damage = PlayerPair::new(to_b, to_a);

        for (defender, incoming) in [(PlayerId::A, to_a), (PlayerId::B, to_b)] {
            let (target, attacker) = players.split_mut(defender);
            let killed = distribute_damage(target, attacker, zone, incoming, rules)?;
            record_losses(log, defender, zone, &killed);
            merge_losses(outcome.losses.get_mut(defender), killed);
        }
    }

    // Siege on post-combat occupancy.
    for attacker in [PlayerId::A, PlayerId::B] {
        let (besieger, defender) = players.split_mut(attacker);
        if zone != defender.home_zone
            || !besieger.has_units_in(zone)
            || defender.has_units_in(zone)
        {
            continue;
        }
        let siege = apply_siege(besieger, defender, zone, rules, log)?;
        outcome.siege = Some(siege);
    }

    Ok(outcome)
}

fn ensure_zone(player: &PlayerState, zone: Zone) -> Result<(), SimError> {
    let missing = if !player.units.contains_key(&zone) {
        Some("units")
    } else if !player.buildings.contains_key(&zone) {
        Some("buildings")
    } else if !player.building_hp.contains_key(&zone) {
        Some("building_hp")
    } else {
        None
    };
    match missing {
        Some(mapping) => Err(SimError::MissingZone {
            player: player.id,
            zone,
            mapping,
        }),
        None => Ok(()),
    }
}

/// Per-tick damage from `owner`'s area-damage buildings in `zone`.
pub fn area_damage(owner: &PlayerState, zone: Zone, rules: &RulesCatalog) -> Result<Damage, SimError> {
    let mut total = Damage::ZERO;
    for &building in BuildingType::ALL {
        let Some(per_instance) = rules.building(building)?.area_damage else {
            continue;
        };
        let count = owner.building_count(zone, building);
        let points = u64::from(count).saturating_mul(u64::from(per_instance));
        total = total.saturating_add(Damage::from_whole(points));
    }
    Ok(total)
}

/// Outgoing field damage of `attackers` against `defenders`.
///
/// Each unit type deals `(attack + bonus) * count`, times the counter bonus
/// when its counter target is among the defenders.
pub fn field_damage(
    attackers: &BTreeMap<UnitType, u32>,
    defenders: &BTreeMap<UnitType, u32>,
    attack_bonus: u32,
    rules: &RulesCatalog,
) -> Result<Damage, SimError> {
    let mut total = Damage::ZERO;
    for (&unit, &count) in attackers {
        let stats = rules.unit(unit)?;
        let attack = u64::from(stats.attack.saturating_add(attack_bonus));
        let countered = stats.counter.is_some_and(|counter| {
            defenders
                .iter()
                .any(|(&target, &n)| n > 0 && rules.counter_matches(counter, target))
        });
        let pct = if countered {
            u64::from(rules.counter_bonus_pct())
        } else {
            100
        };
        let hundredths = attack.saturating_mul(u64::from(count)).saturating_mul(pct);
        total = total.saturating_add(Damage::from_hundredths(hundredths));
    }
    Ok(total)
}

/// Kill `defender`'s units in `zone` with `damage`, tankiest first.
///
/// Whole units die while the damage covers their effective HP (base HP plus
/// armor). Leftover damage that cannot kill the next unit outright still
/// kills it, and distribution stops there. Returns the kills per type and
/// updates the loss and kill counters on both players.
pub fn distribute_damage(
    defender: &mut PlayerState,
    attacker: &mut PlayerState,
    zone: Zone,
    damage: Damage,
    rules: &RulesCatalog,
) -> Result<BTreeMap<UnitType, u32>, SimError> {
    let mut targets = Vec::new();
    for (unit, count) in defender.present_units(zone) {
        let hp = rules.unit(unit)?.hp.saturating_add(defender.armor_bonus);
        targets.push((unit, count, Damage::from_whole(u64::from(hp))));
    }
    // Stable sort keeps canonical unit order among equal HP.
    targets.sort_by(|a, b| b.2.cmp(&a.2));

    let mut remaining = damage.hundredths();
    let mut killed = BTreeMap::new();
    for (unit, count, effective_hp) in targets {
        if remaining == 0 {
            break;
        }
        let per_unit = effective_hp.hundredths();
        let full = remaining
            .checked_div(per_unit)
            .map_or(u64::from(count), |n| n.min(u64::from(count)));
        remaining = remaining.saturating_sub(full.saturating_mul(per_unit));
        let mut kills = u32::try_from(full).unwrap_or(count);
        if remaining > 0 && kills < count {
            kills = kills.saturating_add(1);
            remaining = 0;
        }
        let removed = defender.remove_units(zone, unit, kills);
        if removed > 0 {
            killed.insert(unit, removed);
        }
    }

    let total: u64 = killed.values().map(|&n| u64::from(n)).sum();
    defender.units_lost = defender.units_lost.saturating_add(total);
    attacker.units_killed = attacker.units_killed.saturating_add(total);
    Ok(killed)
}

/// Uncontested attack on `defender`'s home zone.
fn apply_siege(
    besieger: &PlayerState,
    defender: &mut PlayerState,
    zone: Zone,
    rules: &RulesCatalog,
    log: &mut Vec<String>,
) -> Result<SiegeReport, SimError> {
    let mut damage = 0_u64;
    for (unit, count) in besieger.present_units(zone) {
        let attack = u64::from(rules.unit(unit)?.attack);
        damage = damage.saturating_add(attack.saturating_mul(u64::from(count)));
    }
    let attacker = besieger.id;
    let target = defender.id;
    let mut report = SiegeReport {
        attacker,
        damage,
        wall_absorbed: 0,
        wall_destroyed: false,
        town_center_damage: 0,
        town_center_hp: defender.town_center_hp,
    };
    if damage == 0 {
        return Ok(report);
    }

    let mut left = damage;
    let wall = u64::from(defender.building_pool(zone, BuildingType::Wall));
    if wall > 0 {
        let absorbed = left.min(wall);
        left = left.saturating_sub(absorbed);
        let wall_left = wall.saturating_sub(absorbed);
        report.wall_absorbed = absorbed;
        if wall_left == 0 {
            defender.remove_buildings(zone, BuildingType::Wall);
            report.wall_destroyed = true;
            log.push(format!("P{attacker}'s forces destroyed P{target}'s Wall in {zone}"));
        } else {
            let pool = u32::try_from(wall_left).unwrap_or(u32::MAX);
            defender
                .building_hp
                .entry(zone)
                .or_default()
                .insert(BuildingType::Wall, pool);
            log.push(format!(
                "P{target}'s Wall in {zone} absorbed {absorbed} dmg (HP: {pool})"
            ));
        }
    }

    if left > 0 {
        let before = defender.town_center_hp;
        let hit = u32::try_from(left).unwrap_or(u32::MAX);
        defender.town_center_hp = before.saturating_sub(hit);
        report.town_center_damage = u64::from(before.saturating_sub(defender.town_center_hp));
        log.push(format!(
            "P{attacker}'s forces ({}) hit P{target}'s Town Center for {left} dmg (TC HP: {})",
            describe_units(&besieger.present_units(zone).collect()),
            defender.town_center_hp
        ));
    }
    report.town_center_hp = defender.town_center_hp;
    Ok(report)
}

fn record_losses(log: &mut Vec<String>, player: PlayerId, zone: Zone, killed: &BTreeMap<UnitType, u32>) {
    for (unit, n) in killed {
        log.push(format!("P{player} lost {n}x{unit} in {zone}"));
    }
}

fn merge_losses(into: &mut BTreeMap<UnitType, u32>, killed: BTreeMap<UnitType, u32>) {
    for (unit, n) in killed {
        let slot = into.entry(unit).or_insert(0);
        *slot = slot.saturating_add(n);
    }
}

/// `2xMilitia, 1xKnight`.
pub fn describe_units(units: &BTreeMap<UnitType, u32>) -> String {
    units
        .iter()
        .filter(|&(_, &n)| n > 0)
        .map(|(unit, n)| format!("{n}x{unit}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::new_match;
    use skirmish_types::Resources;

    fn rules() -> RulesCatalog {
        RulesCatalog::standard()
    }

    fn empty(id: PlayerId) -> PlayerState {
        PlayerState::new(id, Resources::ZERO, 0, 200)
    }

    fn army(units: &[(UnitType, u32)]) -> BTreeMap<UnitType, u32> {
        units.iter().copied().collect()
    }

    #[test]
    fn archers_counter_infantry_only() {
        let rules = rules();
        let archers = army(&[(UnitType::Archer, 10)]);
        let vs_knights = field_damage(&archers, &army(&[(UnitType::Knight, 5)]), 0, &rules).unwrap();
        assert_eq!(vs_knights.whole(), 40);
        let vs_militia = field_damage(&archers, &army(&[(UnitType::Militia, 5)]), 0, &rules).unwrap();
        assert_eq!(vs_militia.whole(), 60);
        let vs_villagers =
            field_damage(&archers, &army(&[(UnitType::Villager, 1)]), 0, &rules).unwrap();
        assert_eq!(vs_villagers.whole(), 60);
    }

    #[test]
    fn fractional_counter_damage_is_kept() {
        let rules = rules();
        let one_archer = army(&[(UnitType::Archer, 1)]);
        let dmg = field_damage(&one_archer, &army(&[(UnitType::Militia, 1)]), 1, &rules).unwrap();
        // (4 + 1) * 1.5 = 7.5
        assert_eq!(dmg.hundredths(), 750);
        assert_eq!(dmg.to_string(), "7.50");
    }

    #[test]
    fn catapults_get_no_bonus_against_units() {
        let rules = rules();
        let dmg = field_damage(
            &army(&[(UnitType::Catapult, 2)]),
            &army(&[(UnitType::Militia, 1), (UnitType::Archer, 1)]),
            0,
            &rules,
        )
        .unwrap();
        assert_eq!(dmg, Damage::from_whole(24));
    }

    #[test]
    fn distribution_kills_tankiest_first_with_one_partial() {
        let rules = rules();
        let mut defender = empty(PlayerId::B);
        let mut attacker = empty(PlayerId::A);
        defender.add_units(Zone::MidB, UnitType::Militia, 3);
        defender.add_units(Zone::MidB, UnitType::Knight, 2);
        let killed =
            distribute_damage(&mut defender, &mut attacker, Zone::MidB, Damage::from_whole(20), &rules)
                .unwrap();
        // 15 kills one Knight, the remaining 5 finishes the second.
        assert_eq!(killed, army(&[(UnitType::Knight, 2)]));
        assert_eq!(defender.unit_count(Zone::MidB, UnitType::Militia), 3);
        assert_eq!(defender.units_lost, 2);
        assert_eq!(attacker.units_killed, 2);
    }

    #[test]
    fn distribution_carries_over_after_whole_type_dies() {
        let rules = rules();
        let mut defender = empty(PlayerId::B);
        let mut attacker = empty(PlayerId::A);
        defender.add_units(Zone::MidB, UnitType::Knight, 1);
        defender.add_units(Zone::MidB, UnitType::Militia, 3);
        let killed =
            distribute_damage(&mut defender, &mut attacker, Zone::MidB, Damage::from_whole(32), &rules)
                .unwrap();
        // Knight 15, then 17 left: two Militia (16) and a partial third.
        assert_eq!(killed, army(&[(UnitType::Knight, 1), (UnitType::Militia, 3)]));
        assert!(!defender.has_units_in(Zone::MidB));
    }

    #[test]
    fn losses_never_exceed_present_units() {
        let rules = rules();
        let mut defender = empty(PlayerId::A);
        let mut attacker = empty(PlayerId::B);
        defender.add_units(Zone::TopA, UnitType::Villager, 2);
        let killed = distribute_damage(
            &mut defender,
            &mut attacker,
            Zone::TopA,
            Damage::from_whole(10_000),
            &rules,
        )
        .unwrap();
        assert_eq!(killed, army(&[(UnitType::Villager, 2)]));
        assert_eq!(defender.units_lost, 2);
    }

    #[test]
    fn armor_adds_effective_hp() {
        let rules = rules();
        let mut defender = empty(PlayerId::B);
        let mut attacker = empty(PlayerId::A);
        defender.armor_bonus = 3;
        defender.add_units(Zone::MidB, UnitType::Militia, 2);
        let killed =
            distribute_damage(&mut defender, &mut attacker, Zone::MidB, Damage::from_whole(11), &rules)
                .unwrap();
        assert_eq!(killed, army(&[(UnitType::Militia, 1)]));
    }

    #[test]
    fn field_round_is_simultaneous() {
        let rules = rules();
        let mut state = new_match(&rules);
        state.player_mut(PlayerId::A).add_units(Zone::MidA, UnitType::Militia, 2);
        state.player_mut(PlayerId::B).add_units(Zone::MidA, UnitType::Knight, 1);
        let mut log = Vec::new();
        let outcome = resolve_zone(&mut state.players, Zone::MidA, &rules, &mut log).unwrap();
        assert!(outcome.engaged);
        // 6 dmg kills the Knight outright on the partial rule, and the
        // Knight's 6 dmg still lands on a Militia.
        assert_eq!(state.player(PlayerId::B).unit_count(Zone::MidA, UnitType::Knight), 0);
        assert_eq!(state.player(PlayerId::A).unit_count(Zone::MidA, UnitType::Militia), 1);
        assert!(log.first().unwrap().starts_with("Combat in Mid_A"));
    }

    #[test]
    fn towers_fire_before_field_combat() {
        let rules = rules();
        let mut state = new_match(&rules);
        {
            let a = state.player_mut(PlayerId::A);
            a.add_building(Zone::BaseA, BuildingType::Tower, Some(60));
            a.remove_units(Zone::BaseA, UnitType::Villager, 3);
            a.add_units(Zone::BaseA, UnitType::Militia, 1);
        }
        state.player_mut(PlayerId::B).add_units(Zone::BaseA, UnitType::Militia, 1);
        let mut log = Vec::new();
        let outcome = resolve_zone(&mut state.players, Zone::BaseA, &rules, &mut log).unwrap();
        // The single tower (8 dmg) kills B's Militia before it can fight.
        assert_eq!(outcome.tower_fire.a, Damage::from_whole(8));
        assert!(!outcome.engaged);
        assert_eq!(state.player(PlayerId::A).unit_count(Zone::BaseA, UnitType::Militia), 1);
        assert!(outcome.siege.is_none());
    }

    #[test]
    fn wall_absorbs_ninety_and_keeps_ten() {
        let rules = rules();
        let mut state = new_match(&rules);
        {
            let b = state.player_mut(PlayerId::B);
            b.remove_units(Zone::BaseB, UnitType::Villager, 3);
            b.add_building(Zone::BaseB, BuildingType::Wall, Some(100));
        }
        // 6 Militia (18) + 6 Catapults (72) = 90 base attack.
        {
            let a = state.player_mut(PlayerId::A);
            a.add_units(Zone::BaseB, UnitType::Militia, 6);
            a.add_units(Zone::BaseB, UnitType::Catapult, 6);
            a.attack_bonus = 5;
        }
        let mut log = Vec::new();
        let outcome = resolve_zone(&mut state.players, Zone::BaseB, &rules, &mut log).unwrap();
        let siege = outcome.siege.unwrap();
        assert_eq!(siege.damage, 90);
        assert_eq!(siege.wall_absorbed, 90);
        assert!(!siege.wall_destroyed);
        assert_eq!(siege.town_center_damage, 0);
        let b = state.player(PlayerId::B);
        assert_eq!(b.building_pool(Zone::BaseB, BuildingType::Wall), 10);
        assert_eq!(b.town_center_hp, 200);
    }

    #[test]
    fn wall_breaks_and_remainder_hits_town_center() {
        let rules = rules();
        let mut state = new_match(&rules);
        {
            let b = state.player_mut(PlayerId::B);
            b.remove_units(Zone::BaseB, UnitType::Villager, 3);
            b.add_building(Zone::BaseB, BuildingType::Wall, Some(100));
        }
        // 10 Militia (30) + 10 Catapults (120) = 150.
        {
            let a = state.player_mut(PlayerId::A);
            a.add_units(Zone::BaseB, UnitType::Militia, 10);
            a.add_units(Zone::BaseB, UnitType::Catapult, 10);
        }
        let mut log = Vec::new();
        let outcome = resolve_zone(&mut state.players, Zone::BaseB, &rules, &mut log).unwrap();
        let siege = outcome.siege.unwrap();
        assert_eq!(siege.wall_absorbed, 100);
        assert!(siege.wall_destroyed);
        assert_eq!(siege.town_center_damage, 50);
        let b = state.player(PlayerId::B);
        assert_eq!(b.town_center_hp, 150);
        assert_eq!(b.building_count(Zone::BaseB, BuildingType::Wall), 0);
    }

    #[test]
    fn town_center_does_not_go_below_zero() {
        let rules = rules();
        let mut state = new_match(&rules);
        state.player_mut(PlayerId::A).remove_units(Zone::BaseA, UnitType::Villager, 3);
        state.player_mut(PlayerId::A).town_center_hp = 10;
        state.player_mut(PlayerId::B).add_units(Zone::BaseA, UnitType::Catapult, 5);
        let mut log = Vec::new();
        let outcome = resolve_zone(&mut state.players, Zone::BaseA, &rules, &mut log).unwrap();
        assert_eq!(state.player(PlayerId::A).town_center_hp, 0);
        assert_eq!(outcome.siege.unwrap().town_center_damage, 10);
    }

    #[test]
    fn contested_home_zone_is_not_besieged() {
        let rules = rules();
        let mut state = new_match(&rules);
        // B's 3 villagers survive one Militia's 3 dmg (one dies).
        state.player_mut(PlayerId::A).add_units(Zone::BaseB, UnitType::Militia, 1);
        let mut log = Vec::new();
        let outcome = resolve_zone(&mut state.players, Zone::BaseB, &rules, &mut log).unwrap();
        assert!(outcome.engaged);
        assert!(outcome.siege.is_none());
        assert_eq!(state.player(PlayerId::B).town_center_hp, 200);
    }

    #[test]
    fn siege_follows_defenders_wiped_in_same_tick() {
        let rules = rules();
        let mut state = new_match(&rules);
        state.player_mut(PlayerId::A).add_units(Zone::BaseB, UnitType::Knight, 3);
        let mut log = Vec::new();
        let outcome = resolve_zone(&mut state.players, Zone::BaseB, &rules, &mut log).unwrap();
        // 18 dmg wipes the 3 villagers, whose 3 dmg still takes one Knight.
        // The two survivors then hit for 12 base.
        assert!(outcome.engaged);
        assert_eq!(outcome.units_lost(PlayerId::A), 1);
        let siege = outcome.siege.unwrap();
        assert_eq!(siege.town_center_damage, 12);
        assert_eq!(state.player(PlayerId::B).town_center_hp, 188);
    }

    #[test]
    fn missing_zone_is_an_internal_fault() {
        let rules = rules();
        let mut state = new_match(&rules);
        state.player_mut(PlayerId::B).buildings.remove(&Zone::TopA);
        let mut log = Vec::new();
        let err = resolve_zone(&mut state.players, Zone::TopA, &rules, &mut log).unwrap_err();
        assert!(matches!(err, SimError::MissingZone { mapping: "buildings", .. }));
    }

    #[test]
    fn resolve_all_reports_only_active_zones() {
        let rules = rules();
        let mut state = new_match(&rules);
        let report = resolve_all(&mut state, &rules).unwrap();
        assert!(report.zones.is_empty());
        assert!(state.log.is_empty());
    }
}
