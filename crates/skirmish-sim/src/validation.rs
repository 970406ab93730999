//! Command validation: untrusted JSON in, a legal [`Command`] out.
//!
//! Validation runs in two stages and never fails as a whole:
//!
//! 1. [`decode`] turns any [`serde_json::Value`] into a [`DraftCommand`].
//!    Every sub-entry becomes `Ok(order)` or `Err(Rejection)` depending on
//!    whether it is structurally sound (right JSON types, known names,
//!    positive integer counts). Nothing about the player is consulted.
//! 2. [`sanitize`] runs the rules pass against the acting player's current
//!    state: age and building prerequisites, affordability, adjacency and
//!    unit availability. Counts are clamped down rather than rejected where
//!    a smaller amount is legal.
//!
//! The resulting [`ValidationReport`] carries the sanitized [`Command`] plus
//! one [`Verdict`] per entry so callers can explain every dropped or reduced
//! action. Affordability is checked against the unmodified ledger for each
//! entry independently; nothing is reserved between sibling entries.

use core::fmt;
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use skirmish_rules::{RulesCatalog, RulesError};
use skirmish_types::{
    Age, BuildOrder, BuildingType, Command, MoveOrder, PlayerState, ResearchOrder, ResourceKind,
    Resources, TrainOrder, UnitType, UnknownName, UpgradeId, Zone,
};

use crate::state::rescale_tasks;

// ---------------------------------------------------------------------------
// Verdict vocabulary
// ---------------------------------------------------------------------------

/// Which part of a command a verdict refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandField {
    /// The command value itself.
    Root,
    /// `train`.
    Train,
    /// `build`.
    Build,
    /// `move`.
    Move,
    /// `attack`.
    Attack,
    /// `advance_age`.
    AdvanceAge,
    /// `task_villagers`.
    TaskVillagers,
    /// `research`.
    Research,
}

impl CommandField {
    /// The JSON key of the field.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Root => "<root>",
            Self::Train => "train",
            Self::Build => "build",
            Self::Move => "move",
            Self::Attack => "attack",
            Self::AdvanceAge => "advance_age",
            Self::TaskVillagers => "task_villagers",
            Self::Research => "research",
        }
    }
}

impl fmt::Display for CommandField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Why an entry was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The value was not a JSON object.
    #[error("expected an object")]
    NotAnObject,

    /// The field was not a JSON array.
    #[error("expected a list")]
    NotAList,

    /// A required key was absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A key held the wrong JSON type.
    #[error("field `{field}` must be {expected}")]
    WrongType {
        /// Offending key.
        field: &'static str,
        /// What was expected.
        expected: &'static str,
    },

    /// A name did not match the expected vocabulary.
    #[error("{0}")]
    UnknownName(#[from] UnknownName),

    /// A count was not a positive integer (or, for tasks, a non-negative one).
    #[error("invalid count {0}")]
    InvalidCount(String),

    /// The player's age is too low.
    #[error("requires {required}, player is in {current}")]
    AgeTooLow {
        /// Minimum age.
        required: Age,
        /// Player's age.
        current: Age,
    },

    /// A prerequisite building does not exist anywhere.
    #[error("requires a {0}")]
    MissingBuilding(BuildingType),

    /// A prerequisite upgrade has not been researched.
    #[error("requires upgrade {0}")]
    MissingUpgrade(UpgradeId),

    /// The upgrade is already researched.
    #[error("{0} already researched")]
    AlreadyResearched(UpgradeId),

    /// The player cannot pay even one instance.
    #[error("cannot afford {cost} with {held}")]
    Unaffordable {
        /// Cost of one instance.
        cost: Resources,
        /// Resources held.
        held: Resources,
    },

    /// Source and destination are not adjacent.
    #[error("{from} is not adjacent to {to}")]
    NotAdjacent {
        /// Source zone.
        from: Zone,
        /// Destination zone.
        to: Zone,
    },

    /// The player has none of that unit in the source zone.
    #[error("no {unit} in {zone}")]
    NoUnitsAvailable {
        /// Unit type.
        unit: UnitType,
        /// Source zone.
        zone: Zone,
    },

    /// The player is already in the final age.
    #[error("already in the final age")]
    MaxAgeReached,

    /// Attacks are implicit; explicit attack orders are ignored.
    #[error("attack orders are ignored; combat follows unit presence")]
    AttackIsImplicit,

    /// A rules lookup failed for this entry.
    #[error("{0}")]
    Rules(#[from] RulesError),
}

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerdictOutcome {
    /// Kept as requested.
    Accepted,
    /// Kept with a smaller count.
    Clamped {
        /// Count asked for.
        requested: u32,
        /// Count kept.
        granted: u32,
    },
    /// Dropped.
    Rejected(Rejection),
}

/// One entry's verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Field the entry belongs to.
    pub field: CommandField,
    /// Position within a list field, if any.
    pub index: Option<usize>,
    /// Result for the entry.
    pub outcome: VerdictOutcome,
}

impl Verdict {
    const fn new(field: CommandField, index: Option<usize>, outcome: VerdictOutcome) -> Self {
        Self {
            field,
            index,
            outcome,
        }
    }

    /// Whether the entry was dropped.
    pub const fn is_rejected(&self) -> bool {
        matches!(self.outcome, VerdictOutcome::Rejected(_))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{i}]: ", self.field)?,
            None => write!(f, "{}: ", self.field)?,
        }
        match &self.outcome {
            VerdictOutcome::Accepted => f.write_str("accepted"),
            VerdictOutcome::Clamped { requested, granted } => {
                write!(f, "clamped {requested} -> {granted}")
            }
            VerdictOutcome::Rejected(reason) => write!(f, "rejected ({reason})"),
        }
    }
}

/// Sanitized command plus a verdict for every entry considered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// The legal command.
    pub command: Command,
    /// Verdicts in field order, then entry order.
    pub verdicts: Vec<Verdict>,
}

impl ValidationReport {
    /// Verdicts that dropped or reduced an entry.
    pub fn adjustments(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts
            .iter()
            .filter(|v| !matches!(v.outcome, VerdictOutcome::Accepted))
    }

    /// Number of dropped entries.
    pub fn rejected_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_rejected()).count()
    }
}

// ---------------------------------------------------------------------------
// Stage 1: decode
// ---------------------------------------------------------------------------

/// A structurally decoded command, not yet checked against any player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftCommand {
    /// Decoded `train` entries.
    pub train: Vec<Result<TrainOrder, Rejection>>,
    /// Decoded `build` entries.
    pub build: Vec<Result<BuildOrder, Rejection>>,
    /// Decoded `move` entries.
    pub moves: Vec<Result<MoveOrder, Rejection>>,
    /// Whether `advance_age` was exactly `true`.
    pub advance_age: bool,
    /// Decoded `task_villagers` entries in key order.
    pub task_villagers: Vec<Result<(ResourceKind, u32), Rejection>>,
    /// Decoded `research` entries.
    pub research: Vec<Result<ResearchOrder, Rejection>>,
    /// Field-level problems (wrong container type, non-object root, ...).
    pub structural: Vec<(CommandField, Rejection)>,
}

/// Decode an arbitrary JSON value. Never fails; see [`DraftCommand`].
pub fn decode(raw: &Value) -> DraftCommand {
    let mut draft = DraftCommand::default();
    let Some(obj) = raw.as_object() else {
        draft.structural.push((CommandField::Root, Rejection::NotAnObject));
        return draft;
    };

    draft.train = decode_list(obj, CommandField::Train, &mut draft.structural, decode_train);
    draft.build = decode_list(obj, CommandField::Build, &mut draft.structural, decode_build);
    draft.moves = decode_list(obj, CommandField::Move, &mut draft.structural, decode_move);
    draft.research = decode_list(
        obj,
        CommandField::Research,
        &mut draft.structural,
        decode_research,
    );

    match obj.get("attack") {
        None | Some(Value::Null) => {}
        Some(Value::Array(items)) if items.is_empty() => {}
        Some(_) => draft
            .structural
            .push((CommandField::Attack, Rejection::AttackIsImplicit)),
    }

    match obj.get("advance_age") {
        None | Some(Value::Null | Value::Bool(false)) => {}
        Some(Value::Bool(true)) => draft.advance_age = true,
        Some(_) => draft.structural.push((
            CommandField::AdvanceAge,
            Rejection::WrongType {
                field: "advance_age",
                expected: "a boolean",
            },
        )),
    }

    match obj.get("task_villagers") {
        None | Some(Value::Null) => {}
        Some(Value::Object(tasks)) => {
            draft.task_villagers = tasks
                .iter()
                .map(|(key, count)| decode_task(key, count))
                .collect();
        }
        Some(_) => draft
            .structural
            .push((CommandField::TaskVillagers, Rejection::NotAnObject)),
    }

    draft
}

fn decode_list<T>(
    obj: &Map<String, Value>,
    field: CommandField,
    structural: &mut Vec<(CommandField, Rejection)>,
    entry: fn(&Value) -> Result<T, Rejection>,
) -> Vec<Result<T, Rejection>> {
    match obj.get(field.key()) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(entry).collect(),
        Some(_) => {
            structural.push((field, Rejection::NotAList));
            Vec::new()
        }
    }
}

fn entry_object(value: &Value) -> Result<&Map<String, Value>, Rejection> {
    value.as_object().ok_or(Rejection::NotAnObject)
}

fn name_field<T>(obj: &Map<String, Value>, field: &'static str) -> Result<T, Rejection>
where
    T: core::str::FromStr<Err = UnknownName>,
{
    let value = obj.get(field).ok_or(Rejection::MissingField(field))?;
    let text = value.as_str().ok_or(Rejection::WrongType {
        field,
        expected: "a string",
    })?;
    Ok(text.parse::<T>()?)
}

/// Parse a positive integer count. Absent means 1.
fn count_field(obj: &Map<String, Value>) -> Result<u32, Rejection> {
    let Some(value) = obj.get("count") else {
        return Ok(1);
    };
    match value.as_u64() {
        Some(0) | None => Err(Rejection::InvalidCount(value.to_string())),
        Some(n) => Ok(u32::try_from(n).unwrap_or(u32::MAX)),
    }
}

fn decode_train(value: &Value) -> Result<TrainOrder, Rejection> {
    let obj = entry_object(value)?;
    Ok(TrainOrder {
        unit: name_field(obj, "unit")?,
        count: count_field(obj)?,
    })
}

fn decode_build(value: &Value) -> Result<BuildOrder, Rejection> {
    let obj = entry_object(value)?;
    Ok(BuildOrder {
        building: name_field(obj, "building")?,
    })
}

fn decode_move(value: &Value) -> Result<MoveOrder, Rejection> {
    let obj = entry_object(value)?;
    Ok(MoveOrder {
        unit: name_field(obj, "unit")?,
        count: count_field(obj)?,
        from: name_field(obj, "from")?,
        to: name_field(obj, "to")?,
    })
}

fn decode_research(value: &Value) -> Result<ResearchOrder, Rejection> {
    let obj = entry_object(value)?;
    Ok(ResearchOrder {
        upgrade: name_field(obj, "upgrade")?,
    })
}

fn decode_task(key: &str, count: &Value) -> Result<(ResourceKind, u32), Rejection> {
    let kind = key.parse::<ResourceKind>()?;
    let n = count
        .as_u64()
        .ok_or_else(|| Rejection::InvalidCount(count.to_string()))?;
    Ok((kind, u32::try_from(n).unwrap_or(u32::MAX)))
}

// ---------------------------------------------------------------------------
// Stage 2: sanitize
// ---------------------------------------------------------------------------

/// Apply the rules pass to a draft for `player`. Never fails.
pub fn sanitize(draft: DraftCommand, player: &PlayerState, rules: &RulesCatalog) -> ValidationReport {
    let mut report = ValidationReport::default();
    let verdicts = &mut report.verdicts;

    for (field, reason) in draft.structural {
        verdicts.push(Verdict::new(field, None, VerdictOutcome::Rejected(reason)));
    }

    for (i, entry) in draft.train.into_iter().enumerate() {
        let checked = entry.and_then(|order| check_train(order, player, rules));
        if let Some(order) = settle(verdicts, CommandField::Train, Some(i), checked) {
            report.command.train.push(order);
        }
    }

    for (i, entry) in draft.build.into_iter().enumerate() {
        let checked = entry.and_then(|order| check_build(order, player, rules));
        if let Some(order) = settle(verdicts, CommandField::Build, Some(i), checked) {
            report.command.build.push(order);
        }
    }

    for (i, entry) in draft.moves.into_iter().enumerate() {
        let checked = entry.and_then(|order| check_move(order, player, rules));
        if let Some(order) = settle(verdicts, CommandField::Move, Some(i), checked) {
            report.command.moves.push(order);
        }
    }

    if draft.advance_age {
        let checked = check_advance_age(player, rules).map(|()| Checked::accepted(true));
        report.command.advance_age =
            settle(verdicts, CommandField::AdvanceAge, None, checked).unwrap_or(false);
    }

    report.command.task_villagers = check_tasks(draft.task_villagers, player, verdicts);

    for (i, entry) in draft.research.into_iter().enumerate() {
        let checked = entry.and_then(|order| check_research(order, player, rules));
        if let Some(order) = settle(verdicts, CommandField::Research, Some(i), checked) {
            report.command.research.push(order);
        }
    }

    report
}

/// Decode and sanitize in one step.
pub fn validate(raw: &Value, player: &PlayerState, rules: &RulesCatalog) -> ValidationReport {
    sanitize(decode(raw), player, rules)
}

/// A rules-checked entry, with the count it asked for if it was reduced.
struct Checked<T> {
    value: T,
    clamp: Option<(u32, u32)>,
}

impl<T> Checked<T> {
    const fn accepted(value: T) -> Self {
        Self { value, clamp: None }
    }

    fn counted(value: T, requested: u32, granted: u32) -> Self {
        let clamp = (granted < requested).then_some((requested, granted));
        Self { value, clamp }
    }
}

fn settle<T>(
    verdicts: &mut Vec<Verdict>,
    field: CommandField,
    index: Option<usize>,
    checked: Result<Checked<T>, Rejection>,
) -> Option<T> {
    match checked {
        Ok(Checked { value, clamp: None }) => {
            verdicts.push(Verdict::new(field, index, VerdictOutcome::Accepted));
            Some(value)
        }
        Ok(Checked {
            value,
            clamp: Some((requested, granted)),
        }) => {
            verdicts.push(Verdict::new(
                field,
                index,
                VerdictOutcome::Clamped { requested, granted },
            ));
            Some(value)
        }
        Err(reason) => {
            verdicts.push(Verdict::new(field, index, VerdictOutcome::Rejected(reason)));
            None
        }
    }
}

fn require_age(required: Age, player: &PlayerState) -> Result<(), Rejection> {
    if player.age < required {
        return Err(Rejection::AgeTooLow {
            required,
            current: player.age,
        });
    }
    Ok(())
}

fn require_affordable(cost: Resources, player: &PlayerState) -> Result<(), Rejection> {
    if !player.resources.covers(&cost) {
        return Err(Rejection::Unaffordable {
            cost,
            held: player.resources,
        });
    }
    Ok(())
}

fn check_train(
    order: TrainOrder,
    player: &PlayerState,
    rules: &RulesCatalog,
) -> Result<Checked<TrainOrder>, Rejection> {
    let stats = rules.unit(order.unit)?;
    require_age(stats.min_age, player)?;

    let mut unlockers = rules.unlocking_buildings(order.unit).peekable();
    if let Some(&first) = unlockers.peek() {
        if !unlockers.any(|b| player.has_building(b)) {
            return Err(Rejection::MissingBuilding(first));
        }
    }

    let granted = player.resources.affordable_count(&stats.cost, order.count);
    if granted == 0 {
        return Err(Rejection::Unaffordable {
            cost: stats.cost,
            held: player.resources,
        });
    }
    Ok(Checked::counted(
        TrainOrder {
            unit: order.unit,
            count: granted,
        },
        order.count,
        granted,
    ))
}

fn check_build(
    order: BuildOrder,
    player: &PlayerState,
    rules: &RulesCatalog,
) -> Result<Checked<BuildOrder>, Rejection> {
    let stats = rules.building(order.building)?;
    require_age(stats.min_age, player)?;
    require_affordable(stats.cost, player)?;
    Ok(Checked::accepted(order))
}

fn check_move(
    order: MoveOrder,
    player: &PlayerState,
    rules: &RulesCatalog,
) -> Result<Checked<MoveOrder>, Rejection> {
    if !rules.map().are_adjacent(order.from, order.to) {
        return Err(Rejection::NotAdjacent {
            from: order.from,
            to: order.to,
        });
    }
    let available = player.unit_count(order.from, order.unit);
    if available == 0 {
        return Err(Rejection::NoUnitsAvailable {
            unit: order.unit,
            zone: order.from,
        });
    }
    let granted = order.count.min(available);
    Ok(Checked::counted(
        MoveOrder {
            count: granted,
            ..order
        },
        order.count,
        granted,
    ))
}

fn check_advance_age(player: &PlayerState, rules: &RulesCatalog) -> Result<(), Rejection> {
    let next = player.age.next().ok_or(Rejection::MaxAgeReached)?;
    let cost = rules.age_cost(next)?;
    require_affordable(cost, player)
}

fn check_research(
    order: ResearchOrder,
    player: &PlayerState,
    rules: &RulesCatalog,
) -> Result<Checked<ResearchOrder>, Rejection> {
    if player.has_upgrade(order.upgrade) {
        return Err(Rejection::AlreadyResearched(order.upgrade));
    }
    let stats = rules.upgrade(order.upgrade)?;
    require_age(stats.min_age, player)?;
    if let Some(building) = stats.requires_building {
        if !player.has_building(building) {
            return Err(Rejection::MissingBuilding(building));
        }
    }
    if let Some(prior) = stats.requires_upgrade {
        if !player.has_upgrade(prior) {
            return Err(Rejection::MissingUpgrade(prior));
        }
    }
    require_affordable(stats.cost, player)?;
    Ok(Checked::accepted(order))
}

/// Keep well-formed task entries and rescale them to the villager budget.
fn check_tasks(
    entries: Vec<Result<(ResourceKind, u32), Rejection>>,
    player: &PlayerState,
    verdicts: &mut Vec<Verdict>,
) -> BTreeMap<ResourceKind, u32> {
    let mut requested = BTreeMap::new();
    for (i, entry) in entries.into_iter().enumerate() {
        match entry {
            Ok((kind, n)) => {
                requested.insert(kind, n);
            }
            Err(reason) => verdicts.push(Verdict::new(
                CommandField::TaskVillagers,
                Some(i),
                VerdictOutcome::Rejected(reason),
            )),
        }
    }

    let granted = rescale_tasks(&requested, player.total_villagers());
    for (kind, &asked) in &requested {
        let got = granted.get(kind).copied().unwrap_or(0);
        let outcome = if got < asked {
            VerdictOutcome::Clamped {
                requested: asked,
                granted: got,
            }
        } else {
            VerdictOutcome::Accepted
        };
        verdicts.push(Verdict::new(CommandField::TaskVillagers, None, outcome));
    }
    granted
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use skirmish_types::PlayerId;

    fn rules() -> RulesCatalog {
        RulesCatalog::standard()
    }

    fn starting_player() -> PlayerState {
        PlayerState::new(PlayerId::A, Resources::new(200, 150, 50), 3, 200)
    }

    fn rich_player(age: Age) -> PlayerState {
        let mut p = PlayerState::new(PlayerId::A, Resources::new(5000, 5000, 5000), 3, 200);
        p.age = age;
        p
    }

    #[test]
    fn non_object_root_yields_empty_command() {
        for raw in [json!(null), json!(42), json!("train"), json!([1, 2])] {
            let report = validate(&raw, &starting_player(), &rules());
            assert!(report.command.is_empty());
            assert_eq!(report.rejected_count(), 1);
            assert_eq!(report.verdicts.first().unwrap().field, CommandField::Root);
        }
    }

    #[test]
    fn train_clamps_to_affordable() {
        let raw = json!({"train": [{"unit": "Villager", "count": 10}]});
        let report = validate(&raw, &starting_player(), &rules());
        assert_eq!(
            report.command.train,
            vec![TrainOrder {
                unit: UnitType::Villager,
                count: 4
            }]
        );
        assert_eq!(
            report.verdicts.first().unwrap().outcome,
            VerdictOutcome::Clamped {
                requested: 10,
                granted: 4
            }
        );
    }

    #[test]
    fn train_defaults_count_to_one() {
        let raw = json!({"train": [{"unit": "Villager"}]});
        let report = validate(&raw, &starting_player(), &rules());
        assert_eq!(report.command.train.first().unwrap().count, 1);
    }

    #[test]
    fn train_rejects_bad_counts() {
        let raw = json!({"train": [
            {"unit": "Villager", "count": 0},
            {"unit": "Villager", "count": -2},
            {"unit": "Villager", "count": 1.5},
            {"unit": "Villager", "count": true},
            {"unit": "Villager", "count": "3"},
        ]});
        let report = validate(&raw, &starting_player(), &rules());
        assert!(report.command.train.is_empty());
        assert_eq!(report.rejected_count(), 5);
    }

    #[test]
    fn train_requires_age_and_building() {
        let raw = json!({"train": [{"unit": "Militia", "count": 1}]});
        let report = validate(&raw, &starting_player(), &rules());
        assert!(matches!(
            report.verdicts.first().unwrap().outcome,
            VerdictOutcome::Rejected(Rejection::AgeTooLow { .. })
        ));

        let feudal = rich_player(Age::FEUDAL);
        let report = validate(&raw, &feudal, &rules());
        assert_eq!(
            report.verdicts.first().unwrap().outcome,
            VerdictOutcome::Rejected(Rejection::MissingBuilding(BuildingType::Barracks))
        );

        let mut with_barracks = feudal;
        with_barracks.add_building(Zone::BaseA, BuildingType::Barracks, None);
        let report = validate(&raw, &with_barracks, &rules());
        assert_eq!(report.command.train.len(), 1);
    }

    #[test]
    fn one_bad_entry_does_not_void_siblings() {
        let raw = json!({"train": [
            {"unit": "Dragon", "count": 1},
            "not an object",
            {"unit": "Villager", "count": 1},
        ]});
        let report = validate(&raw, &starting_player(), &rules());
        assert_eq!(report.command.train.len(), 1);
        assert_eq!(report.rejected_count(), 2);
    }

    #[test]
    fn affordability_is_not_reserved_across_siblings() {
        // 200 food covers 4 villagers; both entries see the same ledger.
        let raw = json!({"train": [
            {"unit": "Villager", "count": 4},
            {"unit": "Villager", "count": 4},
        ]});
        let report = validate(&raw, &starting_player(), &rules());
        assert_eq!(report.command.train.len(), 2);
        assert!(report.command.train.iter().all(|o| o.count == 4));
    }

    #[test]
    fn build_is_all_or_nothing() {
        let mut player = rich_player(Age::CASTLE);
        player.resources = Resources::new(0, 80, 49);
        let raw = json!({"build": [{"building": "Tower"}, {"building": "Range"}]});
        let report = validate(&raw, &player, &rules());
        assert_eq!(
            report.command.build,
            vec![BuildOrder {
                building: BuildingType::Range
            }]
        );
    }

    #[test]
    fn build_checks_age() {
        let raw = json!({"build": [{"building": "Barracks"}]});
        let report = validate(&raw, &starting_player(), &rules());
        assert!(report.command.build.is_empty());
    }

    #[test]
    fn move_requires_adjacency_and_clamps() {
        let raw = json!({"move": [
            {"unit": "Villager", "count": 9, "from": "Base_A", "to": "Mid_A"},
            {"unit": "Villager", "count": 1, "from": "Base_A", "to": "Base_B"},
            {"unit": "Villager", "count": 1, "from": "Top_A", "to": "Mid_A"},
            {"unit": "Villager", "count": 1, "from": "Base_A", "to": "Nowhere"},
        ]});
        let report = validate(&raw, &starting_player(), &rules());
        assert_eq!(
            report.command.moves,
            vec![MoveOrder {
                unit: UnitType::Villager,
                count: 3,
                from: Zone::BaseA,
                to: Zone::MidA
            }]
        );
        let reasons: Vec<_> = report
            .verdicts
            .iter()
            .filter_map(|v| match &v.outcome {
                VerdictOutcome::Rejected(r) => Some(r.clone()),
                _ => None,
            })
            .collect();
        assert!(matches!(reasons.first(), Some(Rejection::NotAdjacent { .. })));
        assert!(matches!(reasons.get(1), Some(Rejection::NoUnitsAvailable { .. })));
        assert!(matches!(reasons.get(2), Some(Rejection::UnknownName(_))));
    }

    #[test]
    fn advance_age_needs_true_and_funds() {
        let player = starting_player();
        let report = validate(&json!({"advance_age": true}), &player, &rules());
        assert!(!report.command.advance_age);
        assert!(report.verdicts.first().unwrap().is_rejected());

        let rich = rich_player(Age::DARK);
        assert!(validate(&json!({"advance_age": true}), &rich, &rules()).command.advance_age);
        assert!(!validate(&json!({"advance_age": "yes"}), &rich, &rules()).command.advance_age);
        assert!(!validate(&json!({"advance_age": 1}), &rich, &rules()).command.advance_age);

        let maxed = rich_player(Age::IMPERIAL);
        let report = validate(&json!({"advance_age": true}), &maxed, &rules());
        assert_eq!(
            report.verdicts.first().unwrap().outcome,
            VerdictOutcome::Rejected(Rejection::MaxAgeReached)
        );
    }

    #[test]
    fn tasks_are_rescaled_to_villagers() {
        let raw = json!({"task_villagers": {"food": 4, "wood": 2, "stone": 5, "gold": -1}});
        let report = validate(&raw, &starting_player(), &rules());
        // 3 villagers, 6 requested: food 2, wood 1.
        assert_eq!(
            report.command.task_villagers,
            BTreeMap::from([(ResourceKind::Food, 2), (ResourceKind::Wood, 1)])
        );
        assert!(report.command.task_villagers.values().sum::<u32>() <= 3);
        assert_eq!(report.rejected_count(), 2);
    }

    #[test]
    fn tasks_within_budget_are_kept() {
        let raw = json!({"task_villagers": {"food": 3}});
        let report = validate(&raw, &starting_player(), &rules());
        assert_eq!(
            report.command.task_villagers,
            BTreeMap::from([(ResourceKind::Food, 3)])
        );
    }

    #[test]
    fn research_prerequisites() {
        let mut player = rich_player(Age::IMPERIAL);
        let raw = json!({"research": [{"upgrade": "attack_1"}, {"upgrade": "attack_2"}]});
        let report = validate(&raw, &player, &rules());
        assert!(report.command.research.is_empty());

        player.add_building(Zone::BaseA, BuildingType::Blacksmith, None);
        let report = validate(&raw, &player, &rules());
        assert_eq!(
            report.command.research,
            vec![ResearchOrder {
                upgrade: UpgradeId::Attack1
            }]
        );
        assert_eq!(
            report.verdicts.get(1).unwrap().outcome,
            VerdictOutcome::Rejected(Rejection::MissingUpgrade(UpgradeId::Attack1))
        );

        player.upgrades.push(UpgradeId::Attack1);
        let report = validate(&raw, &player, &rules());
        assert_eq!(
            report.verdicts.first().unwrap().outcome,
            VerdictOutcome::Rejected(Rejection::AlreadyResearched(UpgradeId::Attack1))
        );
        assert_eq!(report.command.research.len(), 1);
    }

    #[test]
    fn wrong_container_types_are_reported() {
        let raw = json!({
            "train": {"unit": "Villager"},
            "task_villagers": [1, 2],
            "attack": [{"zone": "Mid_B"}],
            "unknown_field": 1
        });
        let report = validate(&raw, &starting_player(), &rules());
        assert!(report.command.is_empty());
        let fields: Vec<_> = report.verdicts.iter().map(|v| v.field).collect();
        assert!(fields.contains(&CommandField::Train));
        assert!(fields.contains(&CommandField::TaskVillagers));
        assert!(fields.contains(&CommandField::Attack));
        assert!(report.command.attack.is_empty());
    }

    #[test]
    fn verdict_display() {
        let v = Verdict::new(
            CommandField::Train,
            Some(2),
            VerdictOutcome::Clamped {
                requested: 5,
                granted: 1,
            },
        );
        assert_eq!(v.to_string(), "train[2]: clamped 5 -> 1");
    }
}
