//! The per-action interception context.

use serde::{Deserialize, Serialize};

use crate::catalog::SkillId;
use crate::unit::UnitId;

/// Ephemeral data threaded through passive triggers during one attack.
///
/// Created fresh for each resolution and dropped when the action completes.
/// Passives intercept an attack by editing `damage_multiplier` and `dodged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitContext {
    /// Attacking unit.
    pub attacker: UnitId,
    /// Unit being attacked.
    pub target: UnitId,
    /// Skill being resolved.
    pub skill: SkillId,
    /// Damage after the critical roll, before the multiplier.
    pub damage: u32,
    /// Multiplier applied to `damage`. Starts at 1.
    pub damage_multiplier: f64,
    /// Set when the target avoided the attack.
    pub dodged: bool,
}

impl HitContext {
    /// Creates a context with a neutral multiplier.
    #[must_use]
    pub fn new(attacker: UnitId, target: UnitId, skill: SkillId, damage: u32) -> Self {
        Self {
            attacker,
            target,
            skill,
            damage,
            damage_multiplier: 1.0,
            dodged: false,
        }
    }

    /// Damage after the multiplier, floored.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn final_damage(&self) -> u32 {
        (f64::from(self.damage) * self.damage_multiplier.max(0.0)).floor() as u32
    }
}
