//! The three-counter resource bundle.
//!
//! [`Resources`] is used both as a player's ledger and as a cost. Counters
//! are unsigned and every operation saturates or is checked, so a ledger can
//! never go negative.

use core::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::ResourceKind;

/// Food, wood and gold amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Resources {
    /// Food.
    pub food: u32,
    /// Wood.
    pub wood: u32,
    /// Gold.
    pub gold: u32,
}

impl Resources {
    /// No resources at all.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Build a bundle from food, wood and gold amounts.
    pub const fn new(food: u32, wood: u32, gold: u32) -> Self {
        Self { food, wood, gold }
    }

    /// Amount of a single resource kind.
    pub const fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Food => self.food,
            ResourceKind::Wood => self.wood,
            ResourceKind::Gold => self.gold,
        }
    }

    /// Add `amount` of one kind, saturating at `u32::MAX`.
    pub const fn add(&mut self, kind: ResourceKind, amount: u32) {
        match kind {
            ResourceKind::Food => self.food = self.food.saturating_add(amount),
            ResourceKind::Wood => self.wood = self.wood.saturating_add(amount),
            ResourceKind::Gold => self.gold = self.gold.saturating_add(amount),
        }
    }

    /// Component-wise saturating sum.
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self {
            food: self.food.saturating_add(other.food),
            wood: self.wood.saturating_add(other.wood),
            gold: self.gold.saturating_add(other.gold),
        }
    }

    /// Component-wise subtraction, or `None` if any counter would go negative.
    pub const fn checked_sub(self, cost: Self) -> Option<Self> {
        let Some(food) = self.food.checked_sub(cost.food) else {
            return None;
        };
        let Some(wood) = self.wood.checked_sub(cost.wood) else {
            return None;
        };
        let Some(gold) = self.gold.checked_sub(cost.gold) else {
            return None;
        };
        Some(Self { food, wood, gold })
    }

    /// Whether every counter is at least the corresponding cost.
    pub const fn covers(&self, cost: &Self) -> bool {
        self.food >= cost.food && self.wood >= cost.wood && self.gold >= cost.gold
    }

    /// How many copies of `cost` these resources pay for, capped at `requested`.
    ///
    /// Each resource kind the cost actually uses contributes `held / cost`
    /// (integer floor); the result is the minimum over those kinds. A cost
    /// of zero in every kind is unbounded and returns `requested`.
    pub fn affordable_count(&self, cost: &Self, requested: u32) -> u32 {
        ResourceKind::ALL
            .iter()
            .filter_map(|&kind| {
                let held = self.get(kind);
                held.checked_div(cost.get(kind))
            })
            .fold(requested, u32::min)
    }

    /// Sum of all three counters.
    pub fn total(&self) -> u64 {
        u64::from(self.food)
            .saturating_add(u64::from(self.wood))
            .saturating_add(u64::from(self.gold))
    }

    /// `(kind, amount)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        ResourceKind::ALL.iter().map(|&kind| (kind, self.get(kind)))
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}f {}w {}g", self.food, self.wood, self.gold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affordable_count_takes_minimum_over_used_kinds() {
        let held = Resources::new(200, 150, 50);
        // Villager: food only.
        assert_eq!(held.affordable_count(&Resources::new(50, 0, 0), 10), 4);
        // Catapult: wood and gold.
        assert_eq!(held.affordable_count(&Resources::new(0, 50, 100), 10), 0);
        // Request below the ceiling is kept.
        assert_eq!(held.affordable_count(&Resources::new(50, 0, 0), 2), 2);
    }

    #[test]
    fn free_cost_returns_request() {
        let held = Resources::ZERO;
        assert_eq!(held.affordable_count(&Resources::ZERO, 7), 7);
    }

    #[test]
    fn checked_sub_refuses_to_go_negative() {
        let held = Resources::new(100, 10, 0);
        assert_eq!(
            held.checked_sub(Resources::new(60, 0, 0)),
            Some(Resources::new(40, 10, 0))
        );
        assert_eq!(held.checked_sub(Resources::new(0, 11, 0)), None);
    }

    #[test]
    fn covers_and_total() {
        let held = Resources::new(400, 200, 0);
        assert!(held.covers(&Resources::new(400, 200, 0)));
        assert!(!held.covers(&Resources::new(400, 200, 1)));
        assert_eq!(held.total(), 600);
    }

    #[test]
    fn add_saturates() {
        let mut held = Resources::new(u32::MAX, 0, 0);
        held.add(ResourceKind::Food, 5);
        held.add(ResourceKind::Gold, 5);
        assert_eq!(held, Resources::new(u32::MAX, 0, 5));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Resources::new(200, 150, 50).to_string(), "200f 150w 50g");
    }
}
