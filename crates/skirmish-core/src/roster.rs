//! Roster module: the container for every unit in an encounter.
//!
//! The roster provides:
//! - Unit storage in scheduler iteration order (allies, then enemies, each
//!   side in configured order)
//! - Lookups by [`UnitId`]
//! - Disjoint mutable access to two units for attacker/target resolution
//! - Side-level queries used by targeting and the end-of-battle check
//!
//! # Iteration Order
//!
//! Iteration order is part of the rules: when several units reach a full
//! gauge on the same tick, the first one in roster order acts. Inserting an
//! ally after enemies still places it before every enemy.
//!
//! # Example
//!
//! ```
//! use skirmish_core::roster::Roster;
//! use skirmish_core::unit::{Side, Unit, UnitId, UnitStats};
//!
//! let mut roster = Roster::new();
//! roster.insert(Unit::new(UnitId::new(10), "Goblin", Side::Enemy, UnitStats::default()));
//! roster.insert(Unit::new(UnitId::new(1), "Knight", Side::Ally, UnitStats::default()));
//!
//! let order: Vec<_> = roster.iter().map(|u| u.id().as_u32()).collect();
//! assert_eq!(order, vec![1, 10]);
//! ```

use tracing::warn;

use crate::unit::{Side, Unit, UnitId, UnitSnapshot};

/// Combat roster holding all units of both sides.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    /// Units in scheduler order.
    units: Vec<Unit>,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    /// Inserts a unit, keeping allies ahead of enemies.
    ///
    /// Returns `false` and leaves the roster unchanged if the id is taken.
    pub fn insert(&mut self, unit: Unit) -> bool {
        if self.index_of(unit.id()).is_some() {
            warn!(unit = %unit.id(), "duplicate unit id, ignoring");
            return false;
        }
        let position = match unit.side() {
            Side::Ally => self
                .units
                .iter()
                .position(|u| u.side() == Side::Enemy)
                .unwrap_or(self.units.len()),
            Side::Enemy => self.units.len(),
        };
        self.units.insert(position, unit);
        true
    }

    /// Returns the scheduler index of a unit.
    #[must_use]
    pub fn index_of(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|u| u.id() == id)
    }

    /// Returns a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id() == id)
    }

    /// Returns a mutable unit by id.
    #[must_use]
    pub(crate) fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id() == id)
    }

    /// Returns a unit by scheduler index.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Unit> {
        self.units.get(index)
    }

    /// Returns two distinct units mutably.
    ///
    /// Returns `None` if either id is unknown or both ids are the same.
    pub(crate) fn pair_mut(
        &mut self,
        first: UnitId,
        second: UnitId,
    ) -> Option<(&mut Unit, &mut Unit)> {
        let a = self.index_of(first)?;
        let b = self.index_of(second)?;
        if a == b {
            return None;
        }
        if a < b {
            let (left, right) = self.units.split_at_mut(b);
            Some((&mut left[a], &mut right[0]))
        } else {
            let (left, right) = self.units.split_at_mut(a);
            Some((&mut right[0], &mut left[b]))
        }
    }

    /// Iterates units in scheduler order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.iter()
    }

    /// Iterates units mutably in scheduler order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Unit> + '_ {
        self.units.iter_mut()
    }

    /// Iterates living units of one side in roster order.
    pub fn living(&self, side: Side) -> impl Iterator<Item = &Unit> + '_ {
        self.units
            .iter()
            .filter(move |u| u.side() == side && u.is_alive())
    }

    /// Whether a side has at least one living unit.
    #[must_use]
    pub fn side_alive(&self, side: Side) -> bool {
        self.living(side).next().is_some()
    }

    /// The living unit of `side` with the lowest HP ratio.
    ///
    /// Ties go to the unit earlier in roster order.
    #[must_use]
    pub fn most_wounded(&self, side: Side) -> Option<&Unit> {
        self.living(side).fold(None, |best: Option<&Unit>, unit| match best {
            Some(b) if b.hp_ratio() <= unit.hp_ratio() => Some(b),
            _ => Some(unit),
        })
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Snapshots of every unit in scheduler order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<UnitSnapshot> {
        self.units.iter().map(Unit::snapshot).collect()
    }
}
