//! Outbound events consumed by presentation and logging collaborators.
//!
//! The core never exposes units for direct mutation. Everything a renderer,
//! combat log or replay tool needs is carried by the events in this module:
//! - [`BattleEvent`]: lifecycle transitions and resolved actions
//! - [`ActionReport`]: the full account of one resolved action
//! - [`PassiveActivation`]: a fired passive with its display metadata
//! - [`EventRecord`]: an event stamped with tick and sequence for the history
//!
//! All types serialize with serde so they can be shipped as JSON.
//!
//! # Example
//!
//! ```
//! use skirmish_core::output::{ActionKind, ActionReport};
//! use skirmish_core::catalog::SkillId;
//! use skirmish_core::unit::UnitId;
//!
//! let report = ActionReport::new(
//!     UnitId::new(1),
//!     ActionKind::Attack,
//!     SkillId::new("slash"),
//!     "Slash",
//! );
//! assert_eq!(report.total_damage(), 0);
//! assert!(!report.dodged);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{PassiveId, PassiveOutcome, SkillId, SkillKind, Trigger};
use crate::unit::{UnitId, UnitSnapshot};

// =============================================================================
// Action Reports
// =============================================================================

/// The kind of action a unit performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Damaged an opponent.
    Attack,
    /// Restored HP to an ally.
    Heal,
    /// Raised a guard.
    Defend,
    /// Recovered AP.
    Rest,
}

impl From<SkillKind> for ActionKind {
    fn from(kind: SkillKind) -> Self {
        match kind {
            SkillKind::Attack => Self::Attack,
            SkillKind::Heal => Self::Heal,
            SkillKind::Defend => Self::Defend,
            SkillKind::Wait => Self::Rest,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => write!(f, "attack"),
            Self::Heal => write!(f, "heal"),
            Self::Defend => write!(f, "defend"),
            Self::Rest => write!(f, "rest"),
        }
    }
}

/// One landed hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitRecord {
    /// HP removed by this hit.
    pub damage: u32,
    /// Whether the target's guard halved this hit.
    pub guarded: bool,
}

/// A passive that fired during an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveActivation {
    /// Owner of the passive.
    pub unit: UnitId,
    /// Catalog id.
    pub passive: PassiveId,
    /// Name to display.
    pub display_name: String,
    /// Trigger that fired it.
    pub trigger: Trigger,
    /// PP consumed.
    pub pp_spent: u32,
    /// What it did.
    pub outcome: PassiveOutcome,
}

/// Damage returned to an attacker by a counter-attack passive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterReport {
    /// Unit that countered.
    pub source: UnitId,
    /// Attacker that was struck back.
    pub target: UnitId,
    /// HP removed from the attacker.
    pub damage: u32,
    /// Whether the attacker's guard halved the counter.
    pub guarded: bool,
    /// Whether the counter downed the attacker.
    pub killed: bool,
}

/// The full account of one resolved action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionReport {
    /// Acting unit.
    pub actor: UnitId,
    /// What kind of action it was.
    pub kind: ActionKind,
    /// Skill used (the wait skill for rests).
    pub skill: SkillId,
    /// Skill display name.
    pub skill_name: String,
    /// AP consumed.
    pub ap_spent: u32,
    /// Target, if the action had one.
    pub target: Option<UnitId>,
    /// Landed hits, in order.
    pub hits: Vec<HitRecord>,
    /// Whether the attack rolled a critical.
    pub critical: bool,
    /// Whether the target dodged.
    pub dodged: bool,
    /// Whether the skill carried a defense-ignoring keyword.
    pub ignore_defense: bool,
    /// HP restored by a heal skill.
    pub healed: u32,
    /// AP restored by resting.
    pub ap_recovered: u32,
    /// Whether a guard was raised.
    pub guard_raised: bool,
    /// Passives fired during the action, in firing order.
    pub passives: Vec<PassiveActivation>,
    /// Counter-attack against the actor, if any.
    pub counter: Option<CounterReport>,
    /// Set when no valid target existed and the action had no effect.
    pub no_target: bool,
    /// Units downed by this action.
    pub deaths: Vec<UnitId>,
    /// Resulting state of the actor and target.
    pub units: Vec<UnitSnapshot>,
}

impl ActionReport {
    /// Creates an empty report for an action.
    #[must_use]
    pub fn new(actor: UnitId, kind: ActionKind, skill: SkillId, skill_name: &str) -> Self {
        Self {
            actor,
            kind,
            skill,
            skill_name: skill_name.to_string(),
            ap_spent: 0,
            target: None,
            hits: Vec::new(),
            critical: false,
            dodged: false,
            ignore_defense: false,
            healed: 0,
            ap_recovered: 0,
            guard_raised: false,
            passives: Vec::new(),
            counter: None,
            no_target: false,
            deaths: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Total HP removed from the target.
    #[must_use]
    pub fn total_damage(&self) -> u32 {
        self.hits.iter().map(|h| h.damage).sum()
    }

    /// Snapshot of a participant after the action.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.units.iter().find(|u| u.id == id)
    }

    /// Whether any passive with the given trigger fired.
    #[must_use]
    pub fn fired(&self, trigger: Trigger) -> bool {
        self.passives.iter().any(|p| p.trigger == trigger)
    }
}

// =============================================================================
// Lifecycle Events
// =============================================================================

/// Why an action did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The actor was downed before its action began.
    ActorDown,
    /// Another action is still in flight.
    ActionInFlight,
    /// No unit with that id exists.
    UnknownUnit,
    /// The battle is not running.
    NotRunning,
}

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    /// No enemy is standing.
    AlliedVictory,
    /// No ally is standing.
    EnemyVictory,
    /// Both sides fell to the same action.
    Draw,
}

impl fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlliedVictory => write!(f, "allied victory"),
            Self::EnemyVictory => write!(f, "enemy victory"),
            Self::Draw => write!(f, "draw"),
        }
    }
}

/// An event emitted by the battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BattleEvent {
    /// A battle began.
    BattleStarted {
        /// Initial state of every unit.
        units: Vec<UnitSnapshot>,
    },
    /// An action resolved.
    ActionResolved(ActionReport),
    /// An action request was dropped.
    ActionSkipped {
        /// Unit that would have acted.
        actor: UnitId,
        /// Why it did not.
        reason: SkipReason,
    },
    /// The in-flight action finished and the scheduler was released.
    ActionCompleted {
        /// Unit whose action completed.
        actor: UnitId,
        /// Whether a PP was regenerated.
        pp_regenerated: bool,
    },
    /// Tick advancement was frozen.
    Paused,
    /// Tick advancement resumed.
    Resumed,
    /// The battle reached a terminal state.
    BattleEnded {
        /// Result.
        outcome: BattleOutcome,
    },
}

impl BattleEvent {
    /// The action report, if this event carries one.
    #[must_use]
    pub const fn as_action(&self) -> Option<&ActionReport> {
        match self {
            Self::ActionResolved(report) => Some(report),
            _ => None,
        }
    }

    /// The outcome, if this event ends the battle.
    #[must_use]
    pub const fn outcome(&self) -> Option<BattleOutcome> {
        match self {
            Self::BattleEnded { outcome } => Some(*outcome),
            _ => None,
        }
    }
}

/// A battle event stamped with when it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Scheduler tick the event was emitted on.
    pub tick: u64,
    /// Monotonic index within the battle.
    pub sequence: u64,
    /// The event.
    pub event: BattleEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::Side;

    fn snapshot(id: u32) -> UnitSnapshot {
        UnitSnapshot {
            id: UnitId::new(id),
            side: Side::Ally,
            hp: 50,
            ap: 3,
            pp: 1,
            gauge: 0.0,
            alive: true,
            defending: false,
        }
    }

    #[test]
    fn action_kind_from_skill_kind() {
        assert_eq!(ActionKind::from(SkillKind::Attack), ActionKind::Attack);
        assert_eq!(ActionKind::from(SkillKind::Wait), ActionKind::Rest);
    }

    #[test]
    fn total_damage_sums_hits() {
        let mut report =
            ActionReport::new(UnitId::new(1), ActionKind::Attack, SkillId::new("x"), "X");
        report.hits.push(HitRecord { damage: 5, guarded: true });
        report.hits.push(HitRecord { damage: 7, guarded: false });
        assert_eq!(report.total_damage(), 12);
    }

    #[test]
    fn report_unit_lookup() {
        let mut report =
            ActionReport::new(UnitId::new(1), ActionKind::Rest, SkillId::new("wait"), "Wait");
        report.units.push(snapshot(1));
        assert!(report.unit(UnitId::new(1)).is_some());
        assert!(report.unit(UnitId::new(2)).is_none());
    }

    #[test]
    fn event_accessors() {
        let ended = BattleEvent::BattleEnded {
            outcome: BattleOutcome::Draw,
        };
        assert_eq!(ended.outcome(), Some(BattleOutcome::Draw));
        assert!(ended.as_action().is_none());
        assert!(BattleEvent::Paused.outcome().is_none());
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let event = BattleEvent::ActionSkipped {
            actor: UnitId::new(4),
            reason: SkipReason::ActorDown,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"action_skipped""#));
        assert!(json.contains(r#""reason":"actor_down""#));
        let back: BattleEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(BattleOutcome::AlliedVictory.to_string(), "allied victory");
    }
}
