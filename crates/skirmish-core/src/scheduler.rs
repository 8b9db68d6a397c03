//! Readiness-gauge scheduler.
//!
//! Every living unit fills a gauge in `[0, 100]` at a rate proportional to
//! its speed. The first unit found full, in roster order, acts; the
//! scheduler then blocks until that action completes.
//!
//! # Fixed Step
//!
//! Callers hand in wall-clock deltas. The scheduler banks them in an
//! accumulator and runs whole ticks of [`SchedulerConfig::tick_interval`],
//! so the same total time always yields the same number of ticks regardless
//! of how it was sliced.
//!
//! # Invariants
//!
//! - At most one unit is in flight at any time
//! - While blocked, no gauge changes
//! - Gauges of living units never decrease between ticks except on release
//! - Ties on the same tick go to the earlier unit in roster order
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::SchedulerConfig;
//! use skirmish_core::roster::Roster;
//! use skirmish_core::scheduler::ReadinessScheduler;
//! use skirmish_core::unit::{Side, Unit, UnitId, UnitStats};
//!
//! let mut roster = Roster::new();
//! roster.insert(Unit::new(UnitId::new(1), "Scout", Side::Ally, UnitStats::default()));
//!
//! let mut scheduler = ReadinessScheduler::new(SchedulerConfig::default());
//! // Speed 10 at 0.2 gauge per speed point fills in 50 ticks.
//! let actor = (0..50).find_map(|_| scheduler.tick(&mut roster, 1.0));
//! assert_eq!(actor, Some(UnitId::new(1)));
//! assert!(scheduler.is_blocked());
//! ```

use tracing::trace;

use crate::config::SchedulerConfig;
use crate::roster::Roster;
use crate::unit::UnitId;

/// Gauge scheduler with a fixed-step accumulator and a single in-flight slot.
#[derive(Debug, Clone)]
pub struct ReadinessScheduler {
    config: SchedulerConfig,
    /// Banked wall time not yet converted into ticks.
    accumulator: f64,
    in_flight: Option<UnitId>,
    ticks: u64,
}

impl ReadinessScheduler {
    /// Creates an idle scheduler.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            accumulator: 0.0,
            in_flight: None,
            ticks: 0,
        }
    }

    /// Scheduler constants.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Ticks run since the last reset.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Unit whose action is outstanding.
    #[must_use]
    pub fn in_flight(&self) -> Option<UnitId> {
        self.in_flight
    }

    /// Whether an action is outstanding.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Clears banked time, the tick count and any in-flight action.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.in_flight = None;
        self.ticks = 0;
    }

    /// Banks `dt` seconds and returns how many whole ticks are now due.
    ///
    /// At most `max_ticks_per_advance` ticks are returned and time beyond
    /// that is discarded.
    /// Negative or non-finite deltas are ignored.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pending_ticks(&mut self, dt: f64) -> u32 {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }
        let interval = self.config.tick_interval;
        if interval <= 0.0 || !interval.is_finite() {
            self.accumulator = 0.0;
            return 0;
        }

        let due = (self.accumulator / interval).floor();
        let cap = f64::from(self.config.max_ticks_per_advance);
        if due > cap {
            trace!(due, cap, "dropping scheduler backlog");
            self.accumulator %= interval;
        } else {
            self.accumulator -= due * interval;
        }
        due.min(cap) as u32
    }

    /// Gauge a unit with `speed` gains per tick.
    #[must_use]
    pub fn gain_per_tick(&self, speed: u32, speed_multiplier: f64) -> f64 {
        f64::from(speed) * self.config.gauge_per_speed * speed_multiplier.max(0.0)
    }

    /// Runs one tick.
    ///
    /// When unblocked, every living unit's gauge grows and the first full
    /// living unit in roster order becomes the in-flight actor, which is
    /// returned. When blocked the tick is counted and nothing else changes.
    pub fn tick(&mut self, roster: &mut Roster, speed_multiplier: f64) -> Option<UnitId> {
        self.ticks += 1;
        if self.in_flight.is_some() {
            return None;
        }

        for unit in roster.iter_mut().filter(|u| u.is_alive()) {
            let gain = self.gain_per_tick(unit.stats().speed, speed_multiplier);
            unit.fill_gauge(gain);
        }

        let actor = roster
            .iter()
            .find(|u| u.is_alive() && u.is_ready())
            .map(crate::unit::Unit::id)?;
        trace!(tick = self.ticks, %actor, "unit ready");
        self.in_flight = Some(actor);
        Some(actor)
    }

    /// Marks `actor` as in flight outside the normal readiness path.
    ///
    /// Returns `false` if another action is already outstanding.
    pub fn claim(&mut self, actor: UnitId) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.in_flight = Some(actor);
        true
    }

    /// Completes the in-flight action: the actor's gauge returns to zero and
    /// the scheduler unblocks. Returns the released actor.
    pub fn release(&mut self, roster: &mut Roster) -> Option<UnitId> {
        let actor = self.in_flight.take()?;
        if let Some(unit) = roster.get_mut(actor) {
            unit.set_gauge(0.0);
        }
        Some(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Side, Unit, UnitStats};

    fn unit(id: u32, side: Side, speed: u32) -> Unit {
        let stats = UnitStats {
            speed,
            ..UnitStats::default()
        };
        Unit::new(UnitId::new(id), "u", side, stats)
    }

    fn scheduler() -> ReadinessScheduler {
        ReadinessScheduler::new(SchedulerConfig::default())
    }

    mod accumulator_tests {
        use super::*;

        #[test]
        fn whole_ticks_only() {
            let mut s = scheduler();
            assert_eq!(s.pending_ticks(0.12), 2);
            assert_eq!(s.pending_ticks(0.05), 1);
            assert_eq!(s.pending_ticks(0.0), 0);
        }

        #[test]
        fn slicing_does_not_change_total() {
            let mut whole = scheduler();
            let mut sliced = scheduler();
            let total = whole.pending_ticks(1.0);
            let parts: u32 = (0..10).map(|_| sliced.pending_ticks(0.1)).sum();
            assert_eq!(total, 20);
            assert!(parts.abs_diff(total) <= 1);
        }

        #[test]
        fn backlog_is_capped() {
            let mut s = scheduler();
            assert_eq!(s.pending_ticks(1_000.0), 240);
            assert_eq!(s.pending_ticks(0.0), 0);
        }

        #[test]
        fn bad_deltas_are_ignored() {
            let mut s = scheduler();
            assert_eq!(s.pending_ticks(-5.0), 0);
            assert_eq!(s.pending_ticks(f64::NAN), 0);
            assert_eq!(s.pending_ticks(f64::INFINITY), 0);
        }
    }

    mod tick_tests {
        use super::*;

        #[test]
        fn gauges_grow_by_speed() {
            let mut roster = Roster::new();
            roster.insert(unit(1, Side::Ally, 10));
            roster.insert(unit(2, Side::Enemy, 20));
            let mut s = scheduler();
            assert!(s.tick(&mut roster, 1.0).is_none());
            assert!((roster.get(UnitId::new(1)).unwrap().gauge() - 2.0).abs() < 1e-9);
            assert!((roster.get(UnitId::new(2)).unwrap().gauge() - 4.0).abs() < 1e-9);
        }

        #[test]
        fn multiplier_scales_gain() {
            let mut roster = Roster::new();
            roster.insert(unit(1, Side::Ally, 10));
            let mut s = scheduler();
            s.tick(&mut roster, 2.5);
            assert!((roster.get(UnitId::new(1)).unwrap().gauge() - 5.0).abs() < 1e-9);
        }

        #[test]
        fn gauge_clamps_at_full() {
            let mut roster = Roster::new();
            roster.insert(unit(1, Side::Ally, 1_000));
            let mut s = scheduler();
            assert_eq!(s.tick(&mut roster, 1.0), Some(UnitId::new(1)));
            assert!((roster.get(UnitId::new(1)).unwrap().gauge() - 100.0).abs() < f64::EPSILON);
        }

        #[test]
        fn tie_goes_to_roster_order() {
            let mut roster = Roster::new();
            roster.insert(unit(9, Side::Enemy, 1_000));
            roster.insert(unit(5, Side::Ally, 500));
            let mut s = scheduler();
            assert_eq!(s.tick(&mut roster, 1.0), Some(UnitId::new(5)));
        }

        #[test]
        fn blocked_ticks_change_nothing() {
            let mut roster = Roster::new();
            roster.insert(unit(1, Side::Ally, 1_000));
            roster.insert(unit(2, Side::Enemy, 10));
            let mut s = scheduler();
            assert_eq!(s.tick(&mut roster, 1.0), Some(UnitId::new(1)));
            let before = roster.get(UnitId::new(2)).unwrap().gauge();
            for _ in 0..5 {
                assert!(s.tick(&mut roster, 1.0).is_none());
            }
            assert!((roster.get(UnitId::new(2)).unwrap().gauge() - before).abs() < f64::EPSILON);
            assert_eq!(s.ticks(), 6);
        }

        #[test]
        fn release_resets_actor_gauge() {
            let mut roster = Roster::new();
            roster.insert(unit(1, Side::Ally, 1_000));
            let mut s = scheduler();
            s.tick(&mut roster, 1.0);
            assert_eq!(s.release(&mut roster), Some(UnitId::new(1)));
            assert!(!s.is_blocked());
            assert!(roster.get(UnitId::new(1)).unwrap().gauge().abs() < f64::EPSILON);
            assert_eq!(s.release(&mut roster), None);
        }

        #[test]
        fn dead_units_neither_fill_nor_act() {
            let mut roster = Roster::new();
            roster.insert(unit(1, Side::Ally, 1_000));
            roster.insert(unit(2, Side::Enemy, 10));
            roster.get_mut(UnitId::new(1)).unwrap().take_damage(1_000);
            let mut s = scheduler();
            assert!(s.tick(&mut roster, 1.0).is_none());
            assert!(roster.get(UnitId::new(1)).unwrap().gauge().abs() < f64::EPSILON);
        }

        #[test]
        fn claim_respects_block() {
            let mut s = scheduler();
            assert!(s.claim(UnitId::new(1)));
            assert!(!s.claim(UnitId::new(2)));
            assert_eq!(s.in_flight(), Some(UnitId::new(1)));
        }
    }
}
