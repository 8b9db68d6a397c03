//! Unit module: the mutable combatant record.
//!
//! This module provides the core unit types for the encounter:
//! - [`UnitId`]: Unique identifier for a unit
//! - [`Side`]: Which party a unit fights for
//! - [`Unit`]: Stats, skills, passives, resources, status and readiness gauge
//! - [`UnitSnapshot`]: Serializable copy of a unit's live state
//!
//! # Invariants
//!
//! Every mutation goes through a method on [`Unit`] that clamps:
//! - `0 <= hp <= max_hp`, `0 <= ap <= max_ap`, `0 <= pp <= max_pp`
//! - the readiness gauge stays in `[0, 100]`
//! - alive ⇔ `hp > 0`; once downed, a unit stays downed until
//!   [`Unit::reset_for_battle`]
//!
//! # Example
//!
//! ```
//! use skirmish_core::unit::{Side, Unit, UnitId, UnitStats};
//!
//! let mut unit = Unit::new(UnitId::new(1), "Knight", Side::Ally, UnitStats::default());
//! assert!(unit.is_alive());
//! assert_eq!(unit.hp(), 100);
//! ```

pub mod components;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::{Passive, Skill};

pub use components::{Resources, StatusFlags, UnitStats, DEFAULT_AP_RECOVERY};

/// Gauge value at which a unit is ready to act.
pub const GAUGE_FULL: f64 = 100.0;

/// Unique identifier for a unit.
///
/// Unit ids are assigned by the roster configuration and must be unique
/// within an encounter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new `UnitId` from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value of this identifier.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for UnitId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// The party a unit fights for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The player's party. Iterated first by the scheduler.
    Ally,
    /// The opposing party.
    Enemy,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ally => write!(f, "Ally"),
            Self::Enemy => write!(f, "Enemy"),
        }
    }
}

/// A combatant.
///
/// Units are built once at encounter setup and live until the encounter is
/// dropped. Skills are kept sorted by ascending priority so selection can scan
/// front to back.
#[derive(Debug, Clone)]
pub struct Unit {
    id: UnitId,
    name: String,
    side: Side,
    stats: UnitStats,
    resources: Resources,
    starting: Resources,
    skills: Vec<Skill>,
    passives: Vec<Passive>,
    flags: StatusFlags,
    gauge: f64,
}

impl Unit {
    /// Creates a unit at full resources with no skills or passives.
    #[must_use]
    pub fn new(id: UnitId, name: &str, side: Side, stats: UnitStats) -> Self {
        let resources = Resources::full(&stats);
        let flags = if resources.hp == 0 {
            StatusFlags::DOWNED
        } else {
            StatusFlags::empty()
        };
        Self {
            id,
            name: name.to_string(),
            side,
            stats,
            resources,
            starting: resources,
            skills: Vec::new(),
            passives: Vec::new(),
            flags,
            gauge: 0.0,
        }
    }

    /// Replaces the skill list, sorting by ascending priority.
    ///
    /// The sort is stable, so skills sharing a priority keep their given order.
    #[must_use]
    pub fn with_skills(mut self, mut skills: Vec<Skill>) -> Self {
        skills.sort_by_key(|skill| skill.priority);
        self.skills = skills;
        self
    }

    /// Replaces the passive list. Order is preserved.
    #[must_use]
    pub fn with_passives(mut self, passives: Vec<Passive>) -> Self {
        self.passives = passives;
        self
    }

    /// Overrides the AP and PP a unit starts each battle with.
    ///
    /// Values are clamped to the unit's maxima.
    #[must_use]
    pub fn with_starting(mut self, ap: Option<u32>, pp: Option<u32>) -> Self {
        if let Some(ap) = ap {
            self.starting.ap = ap.min(self.stats.max_ap);
        }
        if let Some(pp) = pp {
            self.starting.pp = pp.min(self.stats.max_pp);
        }
        self.resources = self.starting;
        self
    }

    /// Unit id.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Side.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Configured stats.
    #[must_use]
    pub const fn stats(&self) -> &UnitStats {
        &self.stats
    }

    /// Current resources.
    #[must_use]
    pub const fn resources(&self) -> Resources {
        self.resources
    }

    /// Current HP.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.resources.hp
    }

    /// Current AP.
    #[must_use]
    pub const fn ap(&self) -> u32 {
        self.resources.ap
    }

    /// Current PP.
    #[must_use]
    pub const fn pp(&self) -> u32 {
        self.resources.pp
    }

    /// Skills in ascending priority order.
    #[must_use]
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Passives in evaluation order.
    #[must_use]
    pub fn passives(&self) -> &[Passive] {
        &self.passives
    }

    /// Status flags.
    #[must_use]
    pub const fn flags(&self) -> StatusFlags {
        self.flags
    }

    /// Whether the unit is still standing.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.flags.contains(StatusFlags::DOWNED)
    }

    /// Whether a guard is up.
    #[must_use]
    pub const fn is_defending(&self) -> bool {
        self.flags.contains(StatusFlags::DEFENDING)
    }

    /// Readiness gauge in `[0, 100]`.
    #[must_use]
    pub const fn gauge(&self) -> f64 {
        self.gauge
    }

    /// Whether the gauge is full.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.gauge >= GAUGE_FULL
    }

    /// HP as a fraction of max HP. Zero-max units report 0.
    #[must_use]
    pub fn hp_ratio(&self) -> f64 {
        if self.stats.max_hp == 0 {
            0.0
        } else {
            f64::from(self.resources.hp) / f64::from(self.stats.max_hp)
        }
    }

    /// Restores the unit for a fresh battle with the given starting gauge.
    pub fn reset_for_battle(&mut self, gauge: f64) {
        self.resources = Resources {
            hp: self.stats.max_hp,
            ..self.starting
        };
        self.flags = StatusFlags::empty();
        if self.resources.hp == 0 {
            self.flags.insert(StatusFlags::DOWNED);
        }
        self.set_gauge(gauge);
    }

    /// Copies the live state for reporting.
    #[must_use]
    pub fn snapshot(&self) -> UnitSnapshot {
        UnitSnapshot {
            id: self.id,
            side: self.side,
            hp: self.resources.hp,
            ap: self.resources.ap,
            pp: self.resources.pp,
            gauge: self.gauge,
            alive: self.is_alive(),
            defending: self.is_defending(),
        }
    }

    // -------------------------------------------------------------------------
    // Mutation points. All clamp; none fail.
    // -------------------------------------------------------------------------

    /// Removes HP, flooring at zero. Returns the HP actually lost.
    pub(crate) fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.resources.hp);
        self.resources.hp -= lost;
        if self.resources.hp == 0 {
            self.flags.insert(StatusFlags::DOWNED);
            self.flags.remove(StatusFlags::DEFENDING);
        }
        lost
    }

    /// Restores HP up to max. Downed units cannot be healed.
    /// Returns the HP actually restored.
    pub(crate) fn heal(&mut self, amount: u32) -> u32 {
        if !self.is_alive() {
            return 0;
        }
        let restored = amount.min(self.stats.max_hp - self.resources.hp);
        self.resources.hp += restored;
        restored
    }

    /// Consumes AP, flooring at zero. Returns the AP actually spent.
    pub(crate) fn spend_ap(&mut self, amount: u32) -> u32 {
        let spent = amount.min(self.resources.ap);
        self.resources.ap -= spent;
        spent
    }

    /// Restores AP up to max. Returns the AP actually restored.
    pub(crate) fn recover_ap(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.stats.max_ap - self.resources.ap);
        self.resources.ap += restored;
        restored
    }

    /// Consumes PP, flooring at zero. Returns the PP actually spent.
    pub(crate) fn spend_pp(&mut self, amount: u32) -> u32 {
        let spent = amount.min(self.resources.pp);
        self.resources.pp -= spent;
        spent
    }

    /// Regenerates one PP if below max. Returns whether PP was restored.
    pub(crate) fn regen_pp(&mut self) -> bool {
        if self.resources.pp < self.stats.max_pp {
            self.resources.pp += 1;
            true
        } else {
            false
        }
    }

    /// Raises a single-use guard.
    pub(crate) fn raise_guard(&mut self) {
        if self.is_alive() {
            self.flags.insert(StatusFlags::DEFENDING);
        }
    }

    /// Clears the guard. Returns whether one was up.
    pub(crate) fn consume_guard(&mut self) -> bool {
        let was_up = self.is_defending();
        self.flags.remove(StatusFlags::DEFENDING);
        was_up
    }

    /// Sets the gauge, clamped to `[0, 100]`.
    pub(crate) fn set_gauge(&mut self, value: f64) {
        self.gauge = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, GAUGE_FULL)
        };
    }

    /// Adds to the gauge, clamped to `[0, 100]`.
    pub(crate) fn fill_gauge(&mut self, amount: f64) {
        self.set_gauge(self.gauge + amount.max(0.0));
    }
}

/// A serializable view of a unit's live state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    /// Unit id.
    pub id: UnitId,
    /// Side.
    pub side: Side,
    /// Current HP.
    pub hp: u32,
    /// Current AP.
    pub ap: u32,
    /// Current PP.
    pub pp: u32,
    /// Readiness gauge.
    pub gauge: f64,
    /// Whether the unit is alive.
    pub alive: bool,
    /// Whether a guard is up.
    pub defending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Skill;

    fn unit() -> Unit {
        Unit::new(UnitId::new(7), "Test", Side::Enemy, UnitStats::default())
    }

    #[test]
    fn unit_id_display_and_debug() {
        let id = UnitId::new(3);
        assert_eq!(format!("{id}"), "3");
        assert_eq!(format!("{id:?}"), "UnitId(3)");
        assert_eq!(UnitId::from(3), id);
    }

    #[test]
    fn side_opponent_flips() {
        assert_eq!(Side::Ally.opponent(), Side::Enemy);
        assert_eq!(Side::Enemy.opponent(), Side::Ally);
    }

    #[test]
    fn skills_are_sorted_by_priority() {
        let unit = unit().with_skills(vec![
            Skill::attack("c", "C", 1, 1).with_priority(2),
            Skill::attack("a", "A", 1, 1).with_priority(0),
            Skill::attack("b", "B", 1, 1).with_priority(1),
        ]);
        let order: Vec<_> = unit.skills().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn damage_floors_at_zero_and_downs() {
        let mut unit = unit();
        assert_eq!(unit.take_damage(250), 100);
        assert_eq!(unit.hp(), 0);
        assert!(!unit.is_alive());
    }

    #[test]
    fn death_is_latched() {
        let mut unit = unit();
        unit.take_damage(100);
        assert_eq!(unit.heal(50), 0);
        assert!(!unit.is_alive());
        assert_eq!(unit.hp(), 0);
    }

    #[test]
    fn heal_caps_at_max() {
        let mut unit = unit();
        unit.take_damage(10);
        assert_eq!(unit.heal(30), 10);
        assert_eq!(unit.hp(), 100);
    }

    #[test]
    fn ap_is_clamped_both_ways() {
        let mut unit = unit();
        assert_eq!(unit.spend_ap(20), 8);
        assert_eq!(unit.ap(), 0);
        assert_eq!(unit.recover_ap(20), 8);
        assert_eq!(unit.ap(), 8);
    }

    #[test]
    fn pp_regen_stops_at_max() {
        let mut unit = unit();
        assert!(!unit.regen_pp());
        unit.spend_pp(1);
        assert!(unit.regen_pp());
        assert_eq!(unit.pp(), unit.stats().max_pp);
    }

    #[test]
    fn guard_is_single_use() {
        let mut unit = unit();
        unit.raise_guard();
        assert!(unit.is_defending());
        assert!(unit.consume_guard());
        assert!(!unit.is_defending());
        assert!(!unit.consume_guard());
    }

    #[test]
    fn gauge_is_clamped() {
        let mut unit = unit();
        unit.fill_gauge(250.0);
        assert_eq!(unit.gauge(), GAUGE_FULL);
        assert!(unit.is_ready());
        unit.set_gauge(-5.0);
        assert_eq!(unit.gauge(), 0.0);
        unit.fill_gauge(-10.0);
        assert_eq!(unit.gauge(), 0.0);
    }

    #[test]
    fn reset_restores_starting_state() {
        let mut unit = unit().with_starting(Some(4), Some(1));
        assert_eq!(unit.ap(), 4);
        unit.take_damage(100);
        unit.spend_ap(4);
        unit.reset_for_battle(12.0);
        assert!(unit.is_alive());
        assert_eq!(unit.hp(), 100);
        assert_eq!(unit.ap(), 4);
        assert_eq!(unit.pp(), 1);
        assert!((unit.gauge() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn starting_values_are_clamped() {
        let unit = unit().with_starting(Some(99), Some(99));
        assert_eq!(unit.ap(), unit.stats().max_ap);
        assert_eq!(unit.pp(), unit.stats().max_pp);
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut unit = unit();
        unit.raise_guard();
        unit.take_damage(30);
        let snap = unit.snapshot();
        assert_eq!(snap.hp, 70);
        assert!(snap.alive);
        assert!(snap.defending);
        assert_eq!(snap.side, Side::Enemy);
    }
}
