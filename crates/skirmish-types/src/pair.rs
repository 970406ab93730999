//! A value held once for each player.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::PlayerId;

/// One `T` per player, indexed by [`PlayerId`].
///
/// Serializes as `{"A": .., "B": ..}` so snapshots read naturally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerPair<T> {
    /// Player A's value.
    #[serde(rename = "A")]
    pub a: T,
    /// Player B's value.
    #[serde(rename = "B")]
    pub b: T,
}

impl<T> PlayerPair<T> {
    /// Pair up two values, A first.
    pub const fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    /// Build each side from the player id.
    pub fn from_fn(mut f: impl FnMut(PlayerId) -> T) -> Self {
        let a = f(PlayerId::A);
        let b = f(PlayerId::B);
        Self { a, b }
    }

    /// Borrow one player's value.
    pub const fn get(&self, player: PlayerId) -> &T {
        match player {
            PlayerId::A => &self.a,
            PlayerId::B => &self.b,
        }
    }

    /// Mutably borrow one player's value.
    pub const fn get_mut(&mut self, player: PlayerId) -> &mut T {
        match player {
            PlayerId::A => &mut self.a,
            PlayerId::B => &mut self.b,
        }
    }

    /// Mutably borrow both values at once: `player`'s first, then the
    /// opponent's.
    pub const fn split_mut(&mut self, player: PlayerId) -> (&mut T, &mut T) {
        match player {
            PlayerId::A => (&mut self.a, &mut self.b),
            PlayerId::B => (&mut self.b, &mut self.a),
        }
    }

    /// Transform both values.
    pub fn map<U>(self, mut f: impl FnMut(PlayerId, T) -> U) -> PlayerPair<U> {
        PlayerPair {
            a: f(PlayerId::A, self.a),
            b: f(PlayerId::B, self.b),
        }
    }

    /// `(player, &value)` for A then B.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        [(PlayerId::A, &self.a), (PlayerId::B, &self.b)].into_iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn split_mut_puts_acting_player_first() {
        let mut pair = PlayerPair::new(1_u32, 2_u32);
        let (own, other) = pair.split_mut(PlayerId::B);
        *own = 20;
        *other = 10;
        assert_eq!(pair, PlayerPair::new(10, 20));
    }

    #[test]
    fn serializes_with_player_keys() {
        let pair = PlayerPair::new(5_u64, 7_u64);
        let json = serde_json::to_value(pair).unwrap();
        assert_eq!(json, serde_json::json!({"A": 5, "B": 7}));
    }

    #[test]
    fn from_fn_and_map() {
        let pair = PlayerPair::from_fn(PlayerId::home_zone);
        let names = pair.map(|_, zone| zone.as_str());
        assert_eq!(names.a, "Base_A");
        assert_eq!(names.b, "Base_B");
        assert_eq!(pair.iter().count(), 2);
    }
}
