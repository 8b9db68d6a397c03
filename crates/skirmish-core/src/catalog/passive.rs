//! Passive skill definitions.
//!
//! A passive subscribes to one [`Trigger`] and carries a [`PassiveEffect`]
//! drawn from a closed set of outcome kinds. Activation bookkeeping (PP cost,
//! probability roll, first-match-wins) lives in
//! [`PassiveResolver`](crate::resolver::PassiveResolver).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PassiveId;
use crate::resolver::HitContext;
use crate::unit::Unit;

/// A combat event passives subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The owner is about to take an attack.
    OnBeingHit,
    /// The owner survived an attack.
    OnAfterHit,
    /// The owner is about to attack.
    OnAttack,
    /// The owner's turn is beginning.
    OnTurnStart,
    /// The owner was left at low HP by an attack.
    OnLowHp,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OnBeingHit => "on_being_hit",
            Self::OnAfterHit => "on_after_hit",
            Self::OnAttack => "on_attack",
            Self::OnTurnStart => "on_turn_start",
            Self::OnLowHp => "on_low_hp",
        };
        f.write_str(name)
    }
}

/// What a passive does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PassiveEffect {
    /// Scale the incoming or outgoing damage of the current attack.
    DamageMultiplier {
        /// Factor applied to the context multiplier.
        factor: f64,
    },
    /// Avoid the current attack entirely.
    Dodge,
    /// Strike the attacker back for fixed damage.
    CounterAttack {
        /// Damage before the attacker's guard and defense.
        damage: u32,
    },
    /// Restore HP to the owner.
    Heal {
        /// HP restored, capped by missing HP.
        amount: u32,
    },
    /// Restore AP to the owner.
    ApRecover {
        /// AP restored, capped by missing AP.
        amount: u32,
    },
}

/// The structured result of a fired passive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PassiveOutcome {
    /// The context multiplier was scaled.
    DamageMultiplied {
        /// Factor that was applied.
        factor: f64,
    },
    /// The attack was dodged.
    Dodged,
    /// A counter-attack was requested against the attacker.
    CounterAttack {
        /// Damage before mitigation.
        damage: u32,
    },
    /// HP actually restored.
    Healed {
        /// Amount restored.
        amount: u32,
    },
    /// AP actually restored.
    ApRecovered {
        /// Amount restored.
        amount: u32,
    },
}

impl PassiveEffect {
    /// Applies the effect to its owner and the current context.
    ///
    /// Counter-attacks are only reported here; the combat resolver applies
    /// the damage so it runs through the attacker's guard and defense.
    pub(crate) fn apply(self, owner: &mut Unit, context: &mut HitContext) -> PassiveOutcome {
        match self {
            Self::DamageMultiplier { factor } => {
                context.damage_multiplier *= factor.max(0.0);
                PassiveOutcome::DamageMultiplied { factor }
            }
            Self::Dodge => {
                context.damage_multiplier = 0.0;
                context.dodged = true;
                PassiveOutcome::Dodged
            }
            Self::CounterAttack { damage } => PassiveOutcome::CounterAttack { damage },
            Self::Heal { amount } => PassiveOutcome::Healed {
                amount: owner.heal(amount),
            },
            Self::ApRecover { amount } => PassiveOutcome::ApRecovered {
                amount: owner.recover_ap(amount),
            },
        }
    }
}

/// Immutable passive skill data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passive {
    /// Catalog id.
    pub id: PassiveId,
    /// Name shown when the passive fires.
    pub display_name: String,
    /// Event this passive listens for.
    pub trigger: Trigger,
    /// PP consumed on activation.
    #[serde(default)]
    pub pp_cost: u32,
    /// Activation probability in `[0, 1]`.
    pub probability: f64,
    /// Effect applied on activation.
    pub effect: PassiveEffect,
}

impl Passive {
    /// Creates a passive.
    #[must_use]
    pub fn new(
        id: &str,
        display_name: &str,
        trigger: Trigger,
        pp_cost: u32,
        probability: f64,
        effect: PassiveEffect,
    ) -> Self {
        Self {
            id: PassiveId::new(id),
            display_name: display_name.to_string(),
            trigger,
            pp_cost,
            probability,
            effect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SkillId;
    use crate::unit::{Side, UnitId, UnitStats};

    fn owner() -> Unit {
        Unit::new(UnitId::new(1), "Owner", Side::Ally, UnitStats::default())
    }

    fn context() -> HitContext {
        HitContext::new(UnitId::new(2), UnitId::new(1), SkillId::new("slash"), 10)
    }

    #[test]
    fn dodge_zeroes_the_multiplier() {
        let mut unit = owner();
        let mut ctx = context();
        let outcome = PassiveEffect::Dodge.apply(&mut unit, &mut ctx);
        assert_eq!(outcome, PassiveOutcome::Dodged);
        assert!(ctx.dodged);
        assert_eq!(ctx.damage_multiplier, 0.0);
    }

    #[test]
    fn multiplier_composes() {
        let mut unit = owner();
        let mut ctx = context();
        PassiveEffect::DamageMultiplier { factor: 0.5 }.apply(&mut unit, &mut ctx);
        PassiveEffect::DamageMultiplier { factor: 0.5 }.apply(&mut unit, &mut ctx);
        assert!((ctx.damage_multiplier - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn heal_reports_actual_amount() {
        let mut unit = owner();
        unit.take_damage(10);
        let mut ctx = context();
        let outcome = PassiveEffect::Heal { amount: 25 }.apply(&mut unit, &mut ctx);
        assert_eq!(outcome, PassiveOutcome::Healed { amount: 10 });
        assert_eq!(unit.hp(), unit.stats().max_hp);
    }

    #[test]
    fn counter_does_not_touch_the_owner() {
        let mut unit = owner();
        let mut ctx = context();
        let outcome = PassiveEffect::CounterAttack { damage: 7 }.apply(&mut unit, &mut ctx);
        assert_eq!(outcome, PassiveOutcome::CounterAttack { damage: 7 });
        assert_eq!(unit.hp(), unit.stats().max_hp);
        assert!(!ctx.dodged);
    }

    #[test]
    fn trigger_display_is_snake_case() {
        assert_eq!(Trigger::OnBeingHit.to_string(), "on_being_hit");
        assert_eq!(Trigger::OnLowHp.to_string(), "on_low_hp");
    }
}
