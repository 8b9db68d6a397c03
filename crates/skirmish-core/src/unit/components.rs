//! State components carried by every unit.
//!
//! A unit's state is split into three parts:
//! - [`UnitStats`]: configured maxima and combat stats, fixed for the encounter
//! - [`Resources`]: current HP/AP/PP levels, mutated during resolution
//! - [`StatusFlags`]: boolean status bits (downed, defending)

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// AP restored by a rest action when a unit has no explicit `ap_recovery`.
pub const DEFAULT_AP_RECOVERY: u32 = 3;

bitflags! {
    /// Status bits for a unit.
    ///
    /// An empty set means "alive and not guarding".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// HP reached zero. Latched until the next battle start.
        const DOWNED = 0b0000_0001;
        /// A single-use guard is up; halves the next incoming hit.
        const DEFENDING = 0b0000_0010;
    }
}

/// Configured stats for a unit.
///
/// These values do not change during an encounter. Missing fields
/// deserialize from [`UnitStats::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitStats {
    /// Maximum hit points.
    pub max_hp: u32,
    /// Maximum action points.
    pub max_ap: u32,
    /// Maximum passive points.
    pub max_pp: u32,
    /// Readiness gauge growth rate.
    pub speed: u32,
    /// Flat reduction applied to every incoming hit.
    pub defense: u32,
    /// AP restored by resting. `None` uses [`DEFAULT_AP_RECOVERY`].
    pub ap_recovery: Option<u32>,
}

impl UnitStats {
    /// AP restored by a rest action.
    #[must_use]
    pub fn rest_recovery(&self) -> u32 {
        self.ap_recovery.unwrap_or(DEFAULT_AP_RECOVERY)
    }
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            max_hp: 100,
            max_ap: 8,
            max_pp: 3,
            speed: 10,
            defense: 0,
            ap_recovery: None,
        }
    }
}

/// Current resource levels.
///
/// Always within `0..=max` of the matching [`UnitStats`] field; the owning
/// [`Unit`](super::Unit) clamps at every mutation site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resources {
    /// Current hit points.
    pub hp: u32,
    /// Current action points.
    pub ap: u32,
    /// Current passive points.
    pub pp: u32,
}

impl Resources {
    /// Full resources for the given stats.
    #[must_use]
    pub fn full(stats: &UnitStats) -> Self {
        Self {
            hp: stats.max_hp,
            ap: stats.max_ap,
            pp: stats.max_pp,
        }
    }
}
