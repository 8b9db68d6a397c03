//! Battle lifecycle controller.
//!
//! [`Battle`] owns every piece of encounter state and drives it through the
//! action loop:
//!
//! 1. **TICK**: the [`ReadinessScheduler`] fills gauges and picks a ready unit
//! 2. **SELECT**: [`select_skill`] picks the unit's best affordable skill
//! 3. **RESOLVE**: the [`ResolverSet`] mutates the roster and reports
//! 4. **CHECK**: the battle ends as soon as one side has nobody standing
//! 5. **COMPLETE**: the actor regenerates PP, its gauge resets and ticks resume
//!
//! Step 5 runs immediately when [`BattleConfig::auto_complete_actions`] is
//! set. Otherwise the presentation layer calls [`Battle::complete_action`]
//! once playback of the action finishes, and ticks stay blocked until then.
//!
//! # Phases
//!
//! ```text
//! Idle ──start──▶ Running ◀──resume── Paused
//!                    │  └────pause─────▶
//!                    ▼
//!                  Ended ──start──▶ Running
//! ```
//!
//! # Determinism
//!
//! Every random decision draws from the battle's [`RandomSource`]. The same
//! seed, configuration and sequence of calls produce the same history.
//!
//! # Example
//!
//! ```
//! use skirmish_core::battle::{Battle, BattlePhase};
//! use skirmish_core::catalog::Catalog;
//! use skirmish_core::config::{BattleConfig, UnitConfig};
//! use skirmish_core::unit::Side;
//!
//! let config = BattleConfig::default()
//!     .with_unit(UnitConfig::new(1, "Knight", Side::Ally))
//!     .with_unit(UnitConfig::new(2, "Goblin", Side::Enemy));
//!
//! let mut battle = Battle::new(config, Catalog::standard(), 7);
//! battle.start().unwrap();
//! assert_eq!(battle.phase(), BattlePhase::Running);
//!
//! let outcome = battle.run_until_end(100_000);
//! assert!(outcome.is_some());
//! ```

use std::fmt;

use tracing::{debug, info, trace};

use crate::catalog::{Catalog, SkillId, Trigger, WAIT_SKILL_ID};
use crate::config::BattleConfig;
use crate::error::LifecycleError;
use crate::output::{BattleEvent, BattleOutcome, EventRecord, SkipReason};
use crate::resolver::{HitContext, PassiveResolver, ResolutionContext, ResolverSet};
use crate::rng::{RandomSource, SeededRng};
use crate::roster::Roster;
use crate::scheduler::ReadinessScheduler;
use crate::selection::select_skill;
use crate::unit::{Side, Unit, UnitId};

// =============================================================================
// Phase
// =============================================================================

/// Where a battle is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattlePhase {
    /// Created but not started.
    Idle,
    /// Ticks advance and units act.
    Running,
    /// Ticks are frozen; all state is preserved.
    Paused,
    /// Terminal until the next start.
    Ended(BattleOutcome),
}

impl fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Ended(_) => write!(f, "ended"),
        }
    }
}

/// Decides the outcome from who is still standing.
///
/// Returns `None` while both sides have a living unit.
#[must_use]
pub fn determine_outcome(roster: &Roster) -> Option<BattleOutcome> {
    match (roster.side_alive(Side::Ally), roster.side_alive(Side::Enemy)) {
        (true, true) => None,
        (true, false) => Some(BattleOutcome::AlliedVictory),
        (false, true) => Some(BattleOutcome::EnemyVictory),
        (false, false) => Some(BattleOutcome::Draw),
    }
}

// =============================================================================
// Battle
// =============================================================================

/// A single encounter between two sides.
pub struct Battle {
    config: BattleConfig,
    catalog: Catalog,
    roster: Roster,
    scheduler: ReadinessScheduler,
    resolvers: ResolverSet,
    rng: Box<dyn RandomSource>,
    phase: BattlePhase,
    history: Vec<EventRecord>,
    sequence: u64,
}

impl fmt::Debug for Battle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Battle")
            .field("phase", &self.phase)
            .field("roster", &self.roster)
            .field("scheduler", &self.scheduler)
            .field("resolvers", &self.resolvers)
            .field("history", &format!("[{} events]", self.history.len()))
            .finish_non_exhaustive()
    }
}

impl Battle {
    /// Creates an idle battle with a ChaCha generator seeded by `seed`.
    ///
    /// Units are built from `config.units` against `catalog`.
    #[must_use]
    pub fn new(config: BattleConfig, catalog: Catalog, seed: u64) -> Self {
        Self::with_rng(config, catalog, Box::new(SeededRng::new(seed)))
    }

    /// Creates an idle battle drawing from `rng`.
    #[must_use]
    pub fn with_rng(config: BattleConfig, catalog: Catalog, rng: Box<dyn RandomSource>) -> Self {
        let roster = config.build_roster(&catalog);
        let scheduler = ReadinessScheduler::new(config.scheduler.clone());
        Self {
            config,
            catalog,
            roster,
            scheduler,
            resolvers: ResolverSet::default(),
            rng,
            phase: BattlePhase::Idle,
            history: Vec::new(),
            sequence: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    /// The outcome once ended.
    #[must_use]
    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.phase {
            BattlePhase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// All units, read-only.
    #[must_use]
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// A unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.roster.get(id)
    }

    /// Content lookups.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The configuration this battle was built from.
    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Every event emitted since the last start, in order.
    #[must_use]
    pub fn history(&self) -> &[EventRecord] {
        &self.history
    }

    /// Ticks run since the last start.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.scheduler.ticks()
    }

    /// Unit whose action has not completed yet.
    #[must_use]
    pub fn in_flight(&self) -> Option<UnitId> {
        self.scheduler.in_flight()
    }

    /// Resolver routing, for registering custom resolvers.
    #[must_use]
    pub fn resolvers_mut(&mut self) -> &mut ResolverSet {
        &mut self.resolvers
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Starts a fresh battle from `Idle` or `Ended`.
    ///
    /// Every unit is restored to full HP and its starting AP and PP, with a
    /// small random gauge head start. The history is cleared.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] while running or paused.
    pub fn start(&mut self) -> Result<Vec<BattleEvent>, LifecycleError> {
        match self.phase {
            BattlePhase::Idle | BattlePhase::Ended(_) => {}
            phase => {
                return Err(LifecycleError::InvalidTransition {
                    action: "start",
                    phase,
                })
            }
        }

        self.history.clear();
        self.sequence = 0;
        self.scheduler.reset();
        let jitter = self.config.scheduler.initial_gauge_jitter;
        for unit in self.roster.iter_mut() {
            let gauge = self.rng.range(jitter);
            unit.reset_for_battle(gauge);
        }
        self.phase = BattlePhase::Running;
        info!(units = self.roster.len(), "battle started");

        let mut events = Vec::new();
        let units = self.roster.snapshots();
        self.emit(BattleEvent::BattleStarted { units }, &mut events);
        self.check_end(&mut events);
        Ok(events)
    }

    /// Freezes tick advancement.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] unless running.
    pub fn pause(&mut self) -> Result<(), LifecycleError> {
        if self.phase != BattlePhase::Running {
            return Err(LifecycleError::InvalidTransition {
                action: "pause",
                phase: self.phase,
            });
        }
        self.phase = BattlePhase::Paused;
        info!(tick = self.tick(), "battle paused");
        self.emit(BattleEvent::Paused, &mut Vec::new());
        Ok(())
    }

    /// Resumes tick advancement.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] unless paused.
    pub fn resume(&mut self) -> Result<(), LifecycleError> {
        if self.phase != BattlePhase::Paused {
            return Err(LifecycleError::InvalidTransition {
                action: "resume",
                phase: self.phase,
            });
        }
        self.phase = BattlePhase::Running;
        info!(tick = self.tick(), "battle resumed");
        self.emit(BattleEvent::Resumed, &mut Vec::new());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Driving
    // -------------------------------------------------------------------------

    /// Advances wall time by `dt` seconds, running every tick that falls due.
    ///
    /// Does nothing unless running. Ticks left over when the battle ends
    /// mid-advance are dropped.
    pub fn advance(&mut self, dt: f64, speed_multiplier: f64) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        if self.phase != BattlePhase::Running {
            return events;
        }
        let due = self.scheduler.pending_ticks(dt);
        for _ in 0..due {
            if self.phase != BattlePhase::Running {
                break;
            }
            self.run_tick(speed_multiplier, &mut events);
        }
        events
    }

    /// Runs exactly one scheduler tick, bypassing the time accumulator.
    pub fn step_tick(&mut self, speed_multiplier: f64) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        if self.phase == BattlePhase::Running {
            self.run_tick(speed_multiplier, &mut events);
        }
        events
    }

    /// Asks `actor` to act now, outside the readiness order.
    ///
    /// Invalid requests never fail. They are reported as
    /// [`BattleEvent::ActionSkipped`]; a downed actor also has its gauge reset.
    pub fn request_action(&mut self, actor: UnitId) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        let reason = if self.phase != BattlePhase::Running {
            Some(SkipReason::NotRunning)
        } else if self.scheduler.is_blocked() {
            Some(SkipReason::ActionInFlight)
        } else {
            match self.roster.get_mut(actor) {
                None => Some(SkipReason::UnknownUnit),
                Some(unit) if !unit.is_alive() => {
                    unit.set_gauge(0.0);
                    Some(SkipReason::ActorDown)
                }
                Some(_) => None,
            }
        };

        if let Some(reason) = reason {
            debug!(%actor, ?reason, "action request skipped");
            self.emit(BattleEvent::ActionSkipped { actor, reason }, &mut events);
            return events;
        }

        self.scheduler.claim(actor);
        self.begin_action(actor, &mut events);
        events
    }

    /// Completes the in-flight action: the actor regenerates one PP, its
    /// gauge resets and ticks resume.
    ///
    /// Only needed when actions do not auto-complete. Returns no events if
    /// nothing is in flight.
    pub fn complete_action(&mut self) -> Vec<BattleEvent> {
        let mut events = Vec::new();
        self.finish_action(&mut events);
        events
    }

    /// Runs ticks until the battle ends or `max_ticks` ticks have run.
    ///
    /// Starts the battle if idle and completes actions as they resolve.
    /// Returns the outcome, if one was reached.
    pub fn run_until_end(&mut self, max_ticks: u64) -> Option<BattleOutcome> {
        if self.phase == BattlePhase::Idle && self.start().is_err() {
            return None;
        }
        let mut events = Vec::new();
        let mut ran = 0;
        while self.phase == BattlePhase::Running && ran < max_ticks {
            self.run_tick(1.0, &mut events);
            if self.scheduler.is_blocked() {
                self.finish_action(&mut events);
            }
            events.clear();
            ran += 1;
        }
        self.outcome()
    }

    // -------------------------------------------------------------------------
    // Action loop
    // -------------------------------------------------------------------------

    fn run_tick(&mut self, speed_multiplier: f64, events: &mut Vec<BattleEvent>) {
        if let Some(actor) = self.scheduler.tick(&mut self.roster, speed_multiplier) {
            self.begin_action(actor, events);
        }
    }

    fn begin_action(&mut self, actor: UnitId, events: &mut Vec<BattleEvent>) {
        let alive = self.roster.get(actor).is_some_and(Unit::is_alive);
        if !alive {
            debug!(%actor, "actor down before acting");
            self.emit(
                BattleEvent::ActionSkipped {
                    actor,
                    reason: SkipReason::ActorDown,
                },
                events,
            );
            self.scheduler.release(&mut self.roster);
            return;
        }

        let turn_start = if self.config.rules.extended_triggers {
            self.roster.get_mut(actor).and_then(|unit| {
                let mut context =
                    HitContext::new(actor, actor, SkillId::new(WAIT_SKILL_ID), 0);
                PassiveResolver::try_activate(
                    unit,
                    Trigger::OnTurnStart,
                    &mut context,
                    self.rng.as_mut(),
                )
            })
        } else {
            None
        };

        let Some(skill) = self.roster.get(actor).map(select_skill) else {
            self.scheduler.release(&mut self.roster);
            return;
        };
        trace!(%actor, skill = %skill.id, "skill selected");

        let mut ctx = ResolutionContext {
            roster: &mut self.roster,
            catalog: &self.catalog,
            rules: &self.config.rules,
            rng: self.rng.as_mut(),
        };
        let mut report = self.resolvers.dispatch(actor, &skill, &mut ctx);
        if let Some(activation) = turn_start {
            report.passives.insert(0, activation);
        }
        debug!(
            tick = self.scheduler.ticks(),
            %actor,
            kind = %report.kind,
            damage = report.total_damage(),
            "action resolved"
        );
        self.emit(BattleEvent::ActionResolved(report), events);

        if self.config.auto_complete_actions {
            self.finish_action(events);
        }
        self.check_end(events);
    }

    fn finish_action(&mut self, events: &mut Vec<BattleEvent>) {
        let Some(actor) = self.scheduler.in_flight() else {
            return;
        };
        let pp_regenerated = self
            .roster
            .get_mut(actor)
            .is_some_and(|unit| unit.is_alive() && unit.regen_pp());
        self.scheduler.release(&mut self.roster);
        self.emit(
            BattleEvent::ActionCompleted {
                actor,
                pp_regenerated,
            },
            events,
        );
    }

    /// Ends the battle if a side is wiped.
    fn check_end(&mut self, events: &mut Vec<BattleEvent>) {
        if !matches!(self.phase, BattlePhase::Running | BattlePhase::Paused) {
            return;
        }
        let Some(outcome) = determine_outcome(&self.roster) else {
            return;
        };
        self.phase = BattlePhase::Ended(outcome);
        info!(%outcome, tick = self.tick(), "battle ended");
        self.emit(BattleEvent::BattleEnded { outcome }, events);
    }

    fn emit(&mut self, event: BattleEvent, events: &mut Vec<BattleEvent>) {
        self.history.push(EventRecord {
            tick: self.scheduler.ticks(),
            sequence: self.sequence,
            event: event.clone(),
        });
        self.sequence += 1;
        events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnitConfig;
    use crate::rng::ScriptedRolls;
    use crate::unit::UnitStats;

    fn unit(id: u32, side: Side) -> Unit {
        Unit::new(UnitId::new(id), "u", side, UnitStats::default())
    }

    mod outcome_tests {
        use super::*;

        #[test]
        fn both_standing_is_undecided() {
            let mut roster = Roster::new();
            roster.insert(unit(1, Side::Ally));
            roster.insert(unit(2, Side::Enemy));
            assert_eq!(determine_outcome(&roster), None);
        }

        #[test]
        fn wiped_side_loses() {
            let mut roster = Roster::new();
            roster.insert(unit(1, Side::Ally));
            roster.insert(unit(2, Side::Enemy));
            roster.get_mut(UnitId::new(2)).unwrap().take_damage(1_000);
            assert_eq!(determine_outcome(&roster), Some(BattleOutcome::AlliedVictory));
            roster.get_mut(UnitId::new(1)).unwrap().take_damage(1_000);
            assert_eq!(determine_outcome(&roster), Some(BattleOutcome::Draw));
        }

        #[test]
        fn empty_ally_side_is_enemy_victory() {
            let mut roster = Roster::new();
            roster.insert(unit(2, Side::Enemy));
            assert_eq!(determine_outcome(&roster), Some(BattleOutcome::EnemyVictory));
        }
    }

    mod lifecycle_tests {
        use super::*;

        fn battle() -> Battle {
            let config = BattleConfig::default()
                .with_unit(UnitConfig::new(1, "A", Side::Ally))
                .with_unit(UnitConfig::new(2, "B", Side::Enemy));
            Battle::with_rng(config, Catalog::standard(), Box::new(ScriptedRolls::always_fail()))
        }

        #[test]
        fn phase_display() {
            assert_eq!(BattlePhase::Running.to_string(), "running");
            assert_eq!(
                BattlePhase::Ended(BattleOutcome::Draw).to_string(),
                "ended"
            );
        }

        #[test]
        fn pause_requires_running() {
            let mut b = battle();
            assert!(b.pause().is_err());
            b.start().unwrap();
            b.pause().unwrap();
            assert_eq!(b.phase(), BattlePhase::Paused);
            assert!(b.pause().is_err());
            assert!(b.start().is_err());
            b.resume().unwrap();
            assert!(b.resume().is_err());
        }

        #[test]
        fn paused_battle_ignores_time() {
            let mut b = battle();
            b.start().unwrap();
            let gauges: Vec<_> = b.roster().iter().map(Unit::gauge).collect();
            b.pause().unwrap();
            assert!(b.advance(10.0, 1.0).is_empty());
            assert!(b.step_tick(1.0).is_empty());
            let after: Vec<_> = b.roster().iter().map(Unit::gauge).collect();
            assert_eq!(gauges, after);
            assert_eq!(b.tick(), 0);
        }

        #[test]
        fn request_action_skips_when_idle() {
            let mut b = battle();
            let events = b.request_action(UnitId::new(1));
            assert_eq!(
                events,
                vec![BattleEvent::ActionSkipped {
                    actor: UnitId::new(1),
                    reason: SkipReason::NotRunning,
                }]
            );
        }

        #[test]
        fn start_with_one_side_ends_immediately() {
            let config = BattleConfig::default().with_unit(UnitConfig::new(1, "A", Side::Ally));
            let mut b = Battle::new(config, Catalog::standard(), 1);
            let events = b.start().unwrap();
            assert_eq!(
                events.last().and_then(BattleEvent::outcome),
                Some(BattleOutcome::AlliedVictory)
            );
            assert_eq!(b.outcome(), Some(BattleOutcome::AlliedVictory));
        }
    }
}
