//! Tick cycle: the fixed-order turn loop body.
//!
//! Each tick runs through these phases:
//!
//! 1. **Economy** -- villager income, passive gold, production queue
//! 2. **Observation** -- one fog-of-war [`Observation`] per player
//! 3. **Decision** -- both deciders concurrently, each under its own timeout
//! 4. **Validation** -- raw output becomes a sanitized [`Command`]
//! 5. **Effects** -- age, tasks, research, construction, training, movement
//! 6. **Combat** -- towers, field combat and siege, zone by zone
//! 7. **Victory** -- town centers, then the turn limit
//!
//! The turn counter advances last. All mutation happens on a working copy
//! that replaces the caller's state only once every phase succeeded, so a
//! half-applied tick is never visible.
//!
//! [`Observation`]: skirmish_types::Observation

use core::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use skirmish_rules::RulesCatalog;
use skirmish_sim::state::describe_tasks;
use skirmish_sim::{
    InvariantViolation, SimError, ValidationReport, apply_economy, apply_effects, check_invariants,
    check_task_budget, resolve_all, scores, validate,
};
use skirmish_types::{Command, MatchOutcome, MatchState, PlayerId, PlayerPair, Resources, Zone};

use crate::config::MatchSettings;
use crate::decision::{Decider, DecisionKind, DecisionOutcome, solicit_decisions};
use crate::observation::build_observation;
use crate::victory::apply_victory;

/// Errors that abort a tick. The caller's state is left as it was.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The match already has an outcome.
    #[error("match already finished: {outcome}")]
    MatchFinished {
        /// The recorded outcome.
        outcome: MatchOutcome,
    },

    /// The simulation hit an internal fault.
    #[error("simulation fault: {source}")]
    Sim {
        /// The underlying simulation error.
        #[from]
        source: SimError,
    },
}

/// Phases of one tick, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    /// Income and production queue.
    Economy,
    /// Observation assembly and decision solicitation.
    Decision,
    /// Raw command sanitizing.
    Validation,
    /// Ordered command effects.
    Effects,
    /// Per-zone combat.
    Combat,
    /// Victory and turn limit.
    Victory,
}

impl TickPhase {
    /// Lowercase name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Economy => "economy",
            Self::Decision => "decision",
            Self::Validation => "validation",
            Self::Effects => "effects",
            Self::Combat => "combat",
            Self::Victory => "victory",
        }
    }
}

impl fmt::Display for TickPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The turn that was executed.
    pub turn: u32,
    /// How each decision call ended.
    pub decisions: PlayerPair<DecisionKind>,
    /// The sanitized command applied for each player.
    pub commands: PlayerPair<Command>,
    /// Entries dropped by validation for each player.
    pub rejected: PlayerPair<usize>,
    /// Economy income for each player.
    pub income: PlayerPair<Resources>,
    /// Zones where anything fought, in zone order.
    pub engaged_zones: Vec<Zone>,
    /// Town center damage dealt by each player's sieges.
    pub siege_damage: PlayerPair<u64>,
    /// Scores after the tick.
    pub scores: PlayerPair<u64>,
    /// Outcome after the tick.
    pub outcome: MatchOutcome,
}

/// Run one complete tick.
///
/// Decider failures never fail the tick: a timeout, error or panic counts
/// as an empty command and is noted in the event log.
///
/// # Errors
///
/// Returns [`TickError::MatchFinished`] if the match is already decided,
/// or [`TickError::Sim`] on an internal fault. In both cases `state` is
/// unchanged.
pub async fn run_tick(
    state: &mut MatchState,
    deciders: &PlayerPair<Arc<dyn Decider>>,
    rules: &RulesCatalog,
    settings: &MatchSettings,
) -> Result<TickSummary, TickError> {
    let outcome = state.outcome();
    if outcome.is_decided() {
        return Err(TickError::MatchFinished { outcome });
    }

    let mut next = state.clone();
    let turn = next.turn;
    info!(turn, match_id = %next.id, "Tick started");

    // --- Economy ---
    debug!(turn, phase = %TickPhase::Economy, "Phase started");
    let income = apply_economy(&mut next, rules);
    let mut violations = check_invariants(&next, rules);
    violations.extend(check_task_budget(&next));
    ensure_sound(violations)?;

    // --- Decision ---
    // Observations are built from post-economy state and owned by each call,
    // so neither decider can see the other's answer.
    debug!(turn, phase = %TickPhase::Decision, "Phase started");
    let observations = PlayerPair::from_fn(|id| build_observation(&next, id, settings));
    let outcomes = solicit_decisions(deciders, observations, settings.decision_timeout()).await;

    // --- Validation ---
    debug!(turn, phase = %TickPhase::Validation, "Phase started");
    let mut reports = PlayerPair::<ValidationReport>::default();
    for id in [PlayerId::A, PlayerId::B] {
        let decider = deciders.get(id).name();
        let outcome = outcomes.get(id);
        note_decision(&mut next, id, decider, outcome);

        let report = match outcome.response() {
            Some(raw) => validate(raw, next.player(id), rules),
            None => ValidationReport::default(),
        };
        for verdict in report.adjustments() {
            debug!(
                turn,
                player = %id,
                field = %verdict.field,
                index = ?verdict.index,
                outcome = ?verdict.outcome,
                "Command entry adjusted"
            );
        }
        next.record(format!("P{id} orders: {}", describe_command(&report.command)));
        *reports.get_mut(id) = report;
    }

    // --- Effects ---
    debug!(turn, phase = %TickPhase::Effects, "Phase started");
    let rejected = PlayerPair::from_fn(|id| reports.get(id).rejected_count());
    let commands = reports.map(|_, report| report.command);
    apply_effects(&mut next, &commands, rules)?;
    ensure_sound(check_invariants(&next, rules))?;

    // --- Combat ---
    debug!(turn, phase = %TickPhase::Combat, "Phase started");
    let combat = resolve_all(&mut next, rules)?;
    ensure_sound(check_invariants(&next, rules))?;

    // --- Victory ---
    debug!(turn, phase = %TickPhase::Victory, "Phase started");
    let outcome = apply_victory(&mut next, rules, settings.turn_limit)?;
    let scores = scores(&next, rules)?;

    next.turn = next.turn.saturating_add(1);
    *state = next;

    let summary = TickSummary {
        turn,
        decisions: outcomes.map(|_, outcome| outcome.kind()),
        commands,
        rejected,
        income: income.map(|_, report| report.income),
        engaged_zones: combat.engaged_zones(),
        siege_damage: PlayerPair::from_fn(|id| combat.siege_damage_by(id)),
        scores,
        outcome,
    };

    info!(
        turn,
        score_a = summary.scores.a,
        score_b = summary.scores.b,
        engaged_zones = summary.engaged_zones.len(),
        outcome = %outcome,
        "Tick completed"
    );

    Ok(summary)
}

/// Log a missing decision and record it in the event log.
fn note_decision(state: &mut MatchState, id: PlayerId, decider: &str, outcome: &DecisionOutcome) {
    let turn = state.turn;
    match outcome {
        DecisionOutcome::Responded(_) => {}
        DecisionOutcome::TimedOut => {
            warn!(turn, player = %id, decider, "Decision timed out");
            state.record(format!("P{id} decision timed out, no-op"));
        }
        DecisionOutcome::Failed(message) => {
            warn!(turn, player = %id, decider, error = %message, "Decision failed");
            state.record(format!("P{id} decision failed: {message}, no-op"));
        }
    }
}

fn ensure_sound(violations: Vec<InvariantViolation>) -> Result<(), SimError> {
    if violations.is_empty() {
        return Ok(());
    }
    Err(SimError::Invariants {
        count: violations.len(),
        violations,
    })
}

/// One-line summary of a sanitized command for the event log.
fn describe_command(command: &Command) -> String {
    if command.is_empty() {
        return String::from("none");
    }
    let mut parts = Vec::new();
    if command.advance_age {
        parts.push(String::from("advance_age"));
    }
    if !command.task_villagers.is_empty() {
        parts.push(format!("task={}", describe_tasks(&command.task_villagers)));
    }
    if !command.research.is_empty() {
        let list: Vec<_> = command.research.iter().map(|r| r.upgrade.to_string()).collect();
        parts.push(format!("research={}", list.join("+")));
    }
    if !command.build.is_empty() {
        let list: Vec<_> = command.build.iter().map(|b| b.building.to_string()).collect();
        parts.push(format!("build={}", list.join("+")));
    }
    if !command.train.is_empty() {
        let list: Vec<_> = command
            .train
            .iter()
            .map(|t| format!("{}x{}", t.count, t.unit))
            .collect();
        parts.push(format!("train={}", list.join("+")));
    }
    if !command.moves.is_empty() {
        let list: Vec<_> = command
            .moves
            .iter()
            .map(|m| format!("{}x{} {}->{}", m.count, m.unit, m.from, m.to))
            .collect();
        parts.push(format!("move={}", list.join("+")));
    }
    parts.join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use skirmish_sim::new_match;
    use skirmish_types::{
        BuildOrder, BuildingType, MoveOrder, ResearchOrder, ResourceKind, TrainOrder, UnitType,
        UpgradeId,
    };

    use super::*;
    use crate::decision::IdleDecider;

    fn idle_pair() -> PlayerPair<Arc<dyn Decider>> {
        PlayerPair::from_fn(|_| Arc::new(IdleDecider::new()) as Arc<dyn Decider>)
    }

    #[test]
    fn empty_command_describes_as_none() {
        assert_eq!(describe_command(&Command::default()), "none");
    }

    #[test]
    fn command_description_lists_fields_in_effect_order() {
        let command = Command {
            train: vec![TrainOrder {
                unit: UnitType::Villager,
                count: 2,
            }],
            build: vec![BuildOrder {
                building: BuildingType::Barracks,
            }],
            moves: vec![MoveOrder {
                unit: UnitType::Villager,
                count: 1,
                from: Zone::BaseA,
                to: Zone::MidA,
            }],
            advance_age: true,
            task_villagers: [(ResourceKind::Food, 2)].into_iter().collect(),
            research: vec![ResearchOrder {
                upgrade: UpgradeId::Attack1,
            }],
            ..Command::default()
        };
        let text = describe_command(&command);
        assert!(text.starts_with("advance_age, task="));
        assert!(text.contains("research=attack_1"));
        assert!(text.contains("build=Barracks"));
        assert!(text.contains("train=2xVillager"));
        assert!(text.ends_with("move=1xVillager Base_A->Mid_A"));
    }

    #[tokio::test]
    async fn finished_match_refuses_to_tick() {
        let rules = RulesCatalog::standard();
        let mut state = new_match(&rules);
        state.conclude(MatchOutcome::Draw);
        let before = state.clone();
        let err = run_tick(&mut state, &idle_pair(), &rules, &MatchSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TickError::MatchFinished {
                outcome: MatchOutcome::Draw
            }
        ));
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn corrupt_state_is_left_untouched() {
        let rules = RulesCatalog::standard();
        let mut state = new_match(&rules);
        state.player_mut(PlayerId::A).units.remove(&Zone::TopB);
        let before = state.clone();
        let err = run_tick(&mut state, &idle_pair(), &rules, &MatchSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TickError::Sim { .. }));
        assert_eq!(state, before);
    }

    #[tokio::test]
    async fn idle_tick_advances_turn_and_logs_orders() {
        let rules = RulesCatalog::standard();
        let mut state = new_match(&rules);
        let summary = run_tick(&mut state, &idle_pair(), &rules, &MatchSettings::default())
            .await
            .unwrap();
        assert_eq!(summary.turn, 1);
        assert_eq!(state.turn, 2);
        assert_eq!(summary.decisions, PlayerPair::new(DecisionKind::Responded, DecisionKind::Responded));
        assert!(summary.engaged_zones.is_empty());
        assert_eq!(summary.outcome, MatchOutcome::Undecided);
        let orders: Vec<_> = state
            .log
            .for_turn(1)
            .filter(|e| e.message.contains("orders"))
            .map(|e| e.message.clone())
            .collect();
        assert_eq!(orders, vec!["PA orders: none", "PB orders: none"]);
    }

    #[test]
    fn phase_names() {
        assert_eq!(TickPhase::Economy.to_string(), "economy");
        assert_eq!(TickPhase::Victory.as_str(), "victory");
    }
}
