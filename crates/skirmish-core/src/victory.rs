//! Victory and turn-limit evaluation.
//!
//! Checked once per tick after combat, in order:
//!
//! 1. Both town centers at zero: draw
//! 2. One town center at zero: the other player wins
//! 3. Turn at or past the limit: higher score wins, equal scores draw
//!
//! Otherwise the match continues.

use serde::Serialize;

use skirmish_rules::RulesCatalog;
use skirmish_sim::{SimError, scores};
use skirmish_types::{MatchOutcome, MatchState, PlayerId, PlayerPair};

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VictoryReason {
    /// Both town centers fell in the same tick.
    MutualDestruction,
    /// One town center fell.
    TownCenterDestroyed {
        /// The player whose town center fell.
        fallen: PlayerId,
    },
    /// The turn limit was reached and scores decided it.
    TurnLimit {
        /// Final scores.
        scores: PlayerPair<u64>,
    },
}

/// A decided result with its log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VictoryCheck {
    /// The outcome to record.
    pub outcome: MatchOutcome,
    /// Why.
    pub reason: VictoryReason,
    /// Event log line announcing it.
    pub message: String,
}

/// Evaluate the end conditions without touching state.
///
/// Returns `None` while the match should continue.
pub fn evaluate_victory(
    state: &MatchState,
    rules: &RulesCatalog,
    turn_limit: u32,
) -> Result<Option<VictoryCheck>, SimError> {
    let fallen_a = state.player(PlayerId::A).town_center_hp == 0;
    let fallen_b = state.player(PlayerId::B).town_center_hp == 0;

    let check = match (fallen_a, fallen_b) {
        (true, true) => Some(VictoryCheck {
            outcome: MatchOutcome::Draw,
            reason: VictoryReason::MutualDestruction,
            message: String::from("Draw, both Town Centers destroyed!"),
        }),
        (true, false) | (false, true) => {
            let fallen = if fallen_a { PlayerId::A } else { PlayerId::B };
            let winner = fallen.opponent();
            Some(VictoryCheck {
                outcome: MatchOutcome::Victory(winner),
                reason: VictoryReason::TownCenterDestroyed { fallen },
                message: format!("Player {winner} wins, destroyed {fallen}'s Town Center!"),
            })
        }
        (false, false) if state.turn >= turn_limit => Some(turn_limit_check(scores(state, rules)?)),
        (false, false) => None,
    };
    Ok(check)
}

fn turn_limit_check(scores: PlayerPair<u64>) -> VictoryCheck {
    let (outcome, message) = match scores.a.cmp(&scores.b) {
        core::cmp::Ordering::Greater => (
            MatchOutcome::Victory(PlayerId::A),
            format!("Turn limit! A wins by score ({} vs {})", scores.a, scores.b),
        ),
        core::cmp::Ordering::Less => (
            MatchOutcome::Victory(PlayerId::B),
            format!("Turn limit! B wins by score ({} vs {})", scores.b, scores.a),
        ),
        core::cmp::Ordering::Equal => (
            MatchOutcome::Draw,
            format!("Turn limit! Draw ({} each)", scores.a),
        ),
    };
    VictoryCheck {
        outcome,
        reason: VictoryReason::TurnLimit { scores },
        message,
    }
}

/// Evaluate and, if decided, record the outcome and its log line.
///
/// Returns the outcome now held by `state`.
pub fn apply_victory(
    state: &mut MatchState,
    rules: &RulesCatalog,
    turn_limit: u32,
) -> Result<MatchOutcome, SimError> {
    if let Some(check) = evaluate_victory(state, rules, turn_limit)? {
        if state.conclude(check.outcome) {
            state.record(check.message);
        }
    }
    Ok(state.outcome())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skirmish_sim::new_match;

    use super::*;

    fn rules() -> RulesCatalog {
        RulesCatalog::standard()
    }

    #[test]
    fn match_continues_before_limit() {
        let rules = rules();
        let state = new_match(&rules);
        assert!(evaluate_victory(&state, &rules, 50).unwrap().is_none());
    }

    #[test]
    fn fallen_town_center_loses() {
        let rules = rules();
        let mut state = new_match(&rules);
        state.player_mut(PlayerId::B).town_center_hp = 0;
        let outcome = apply_victory(&mut state, &rules, 50).unwrap();
        assert_eq!(outcome, MatchOutcome::Victory(PlayerId::A));
        assert_eq!(
            state.log.entries().last().unwrap().message,
            "Player A wins, destroyed B's Town Center!"
        );
    }

    #[test]
    fn both_town_centers_is_a_draw_even_at_the_limit() {
        let rules = rules();
        let mut state = new_match(&rules);
        state.player_mut(PlayerId::A).town_center_hp = 0;
        state.player_mut(PlayerId::B).town_center_hp = 0;
        state.turn = 50;
        let check = evaluate_victory(&state, &rules, 50).unwrap().unwrap();
        assert_eq!(check.outcome, MatchOutcome::Draw);
        assert_eq!(check.reason, VictoryReason::MutualDestruction);
    }

    #[test]
    fn higher_score_wins_at_turn_limit() {
        let rules = rules();
        let mut state = new_match(&rules);
        // Both start at 150 from villagers.
        state.player_mut(PlayerId::A).resources_spent = 350;
        state.player_mut(PlayerId::B).resources_spent = 330;
        state.turn = 50;

        for _ in 0..3 {
            let check = evaluate_victory(&state, &rules, 50).unwrap().unwrap();
            assert_eq!(check.outcome, MatchOutcome::Victory(PlayerId::A));
            assert_eq!(
                check.reason,
                VictoryReason::TurnLimit {
                    scores: PlayerPair::new(500, 480)
                }
            );
            assert_eq!(check.message, "Turn limit! A wins by score (500 vs 480)");
        }
    }

    #[test]
    fn equal_scores_draw() {
        let rules = rules();
        let mut state = new_match(&rules);
        state.turn = 60;
        let outcome = apply_victory(&mut state, &rules, 50).unwrap();
        assert_eq!(outcome, MatchOutcome::Draw);
        assert_eq!(
            state.log.entries().last().unwrap().message,
            "Turn limit! Draw (150 each)"
        );
    }

    #[test]
    fn outcome_is_written_once() {
        let rules = rules();
        let mut state = new_match(&rules);
        state.player_mut(PlayerId::A).town_center_hp = 0;
        apply_victory(&mut state, &rules, 50).unwrap();
        let entries = state.log.len();

        state.player_mut(PlayerId::A).town_center_hp = 200;
        state.player_mut(PlayerId::B).town_center_hp = 0;
        let outcome = apply_victory(&mut state, &rules, 50).unwrap();
        assert_eq!(outcome, MatchOutcome::Victory(PlayerId::B));
        assert_eq!(state.log.len(), entries);
    }
}
