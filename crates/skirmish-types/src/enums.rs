//! Enumeration types for the skirmish simulation.
//!
//! Every identifier a decision-maker can name (zones, unit and building
//! types, upgrade keys, resource kinds) is a closed enum. The wire spelling
//! returned by `as_str` is the same one serde uses, so the validator, the
//! observation payload and the render snapshot share one vocabulary.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A string did not name any variant of the expected enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownName {
    /// Which vocabulary was being parsed (e.g. `"unit type"`).
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Generates a closed, string-named enum with serde, `ts-rs`, `Display`
/// and `FromStr` all agreeing on the same spelling.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $name:ident as $kind:tt {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:tt
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical wire name of this variant.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownName {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Players and map
// ---------------------------------------------------------------------------

named_enum! {
    /// One of the two players in a match.
    PlayerId as "player" {
        /// The player whose base is `Base_A`.
        A => "A",
        /// The player whose base is `Base_B`.
        B => "B",
    }
}

impl PlayerId {
    /// The other player.
    pub const fn opponent(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// The fixed base zone holding this player's town center.
    pub const fn home_zone(self) -> Zone {
        match self {
            Self::A => Zone::BaseA,
            Self::B => Zone::BaseB,
        }
    }
}

named_enum! {
    /// A node of the fixed 8-zone map.
    ///
    /// Declaration order is the canonical zone order: combat iterates zones
    /// in this order and every `BTreeMap<Zone, _>` sorts the same way.
    Zone as "zone" {
        /// Player A's base.
        BaseA => "Base_A",
        /// Player A's top lane.
        TopA => "Top_A",
        /// Player A's middle lane.
        MidA => "Mid_A",
        /// Player A's bottom lane.
        BotA => "Bot_A",
        /// Player B's top lane.
        TopB => "Top_B",
        /// Player B's middle lane.
        MidB => "Mid_B",
        /// Player B's bottom lane.
        BotB => "Bot_B",
        /// Player B's base.
        BaseB => "Base_B",
    }
}

impl Zone {
    /// The player whose half of the map contains this zone.
    pub const fn side(self) -> PlayerId {
        match self {
            Self::BaseA | Self::TopA | Self::MidA | Self::BotA => PlayerId::A,
            Self::TopB | Self::MidB | Self::BotB | Self::BaseB => PlayerId::B,
        }
    }
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

named_enum! {
    /// A resource counter in a player's ledger, and a villager task.
    ResourceKind as "resource kind" {
        /// Food.
        Food => "food",
        /// Wood.
        Wood => "wood",
        /// Gold.
        Gold => "gold",
    }
}

// ---------------------------------------------------------------------------
// Units, buildings, upgrades
// ---------------------------------------------------------------------------

named_enum! {
    /// A trainable unit type.
    UnitType as "unit type" {
        /// Economic unit; gathers resources.
        Villager => "Villager",
        /// Cheap melee infantry.
        Militia => "Militia",
        /// Ranged unit, strong against infantry.
        Archer => "Archer",
        /// Heavy cavalry, strong against archers.
        Knight => "Knight",
        /// Siege engine with the highest attack.
        Catapult => "Catapult",
    }
}

named_enum! {
    /// Broad unit category used by class-wide counters.
    UnitClass as "unit class" {
        /// Foot soldiers and villagers.
        Infantry => "infantry",
        /// Missile units.
        Ranged => "ranged",
        /// Mounted units.
        Cavalry => "cavalry",
        /// Siege engines.
        Siege => "siege",
    }
}

named_enum! {
    /// A constructible building type.
    BuildingType as "building type" {
        /// Unlocks Militia and Knight.
        Barracks => "Barracks",
        /// Unlocks Archer.
        Range => "Range",
        /// Absorbs siege damage before the town center.
        Wall => "Wall",
        /// Fires at enemy units in its zone each tick.
        Tower => "Tower",
        /// Required for upgrades.
        Blacksmith => "Blacksmith",
    }
}

named_enum! {
    /// A researchable upgrade.
    UpgradeId as "upgrade" {
        /// First attack upgrade.
        Attack1 => "attack_1",
        /// First armor upgrade.
        Armor1 => "armor_1",
        /// Second attack upgrade; requires `attack_1`.
        Attack2 => "attack_2",
        /// Second armor upgrade; requires `armor_1`.
        Armor2 => "armor_2",
    }
}

// ---------------------------------------------------------------------------
// Ages
// ---------------------------------------------------------------------------

/// A civilization age, from 1 (Dark) to 4 (Imperial).
///
/// Ages only move forward; [`Age::next`] returns `None` at the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct Age(u8);

impl Age {
    /// Age 1, the starting age.
    pub const DARK: Self = Self(1);
    /// Age 2.
    pub const FEUDAL: Self = Self(2);
    /// Age 3.
    pub const CASTLE: Self = Self(3);
    /// Age 4, the final age.
    pub const IMPERIAL: Self = Self(4);
    /// The highest reachable age.
    pub const MAX: Self = Self::IMPERIAL;

    /// Build an age from its level, if the level is within 1..=4.
    pub const fn new(level: u8) -> Option<Self> {
        if level >= Self::DARK.0 && level <= Self::MAX.0 {
            Some(Self(level))
        } else {
            None
        }
    }

    /// The numeric level (1..=4).
    pub const fn level(self) -> u8 {
        self.0
    }

    /// The following age, or `None` if already at the maximum.
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(level) => Self::new(level),
            None => None,
        }
    }

    /// Display name of the age.
    pub const fn name(self) -> &'static str {
        match self.0 {
            1 => "Dark",
            2 => "Feudal",
            3 => "Castle",
            _ => "Imperial",
        }
    }
}

impl Default for Age {
    fn default() -> Self {
        Self::DARK
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Age {} ({})", self.0, self.name())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The result of a match. Written once by the victory evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum MatchOutcome {
    /// The match is still in progress.
    #[default]
    Undecided,
    /// The given player won.
    Victory(PlayerId),
    /// Neither player won.
    Draw,
}

impl MatchOutcome {
    /// Whether the match has ended.
    pub const fn is_decided(self) -> bool {
        !matches!(self, Self::Undecided)
    }

    /// The winning player, if there is one.
    pub const fn winner(self) -> Option<PlayerId> {
        match self {
            Self::Victory(player) => Some(player),
            Self::Undecided | Self::Draw => None,
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undecided => f.write_str("undecided"),
            Self::Victory(player) => write!(f, "player {player} wins"),
            Self::Draw => f.write_str("draw"),
        }
    }
}
