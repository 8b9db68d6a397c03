//! Combat resolver for attack skills.
//!
//! The `CombatResolver` runs the damage pipeline for one attacker, one target
//! and one skill:
//!
//! 1. Pick a living opponent; with none, report a no-effect action
//! 2. Consume the skill's AP cost
//! 3. Roll a critical (`floor(power × crit_multiplier)` on success)
//! 4. Fold the skill's keywords (hit count override, defense-ignore flag)
//! 5. Open a fresh [`HitContext`]; fire the target's `OnBeingHit` passive.
//!    A dodge ends the action here
//! 6. Split `floor(damage × multiplier)` evenly across the hits and apply each
//!    through [`mitigate`] (guard, then defense, floor at 1)
//! 7. If the target survived, fire its `OnAfterHit` passive; a counter-attack
//!    strikes the attacker through the same mitigation step
//!
//! With [`CombatRules::extended_triggers`](crate::config::CombatRules) the
//! attacker's `OnAttack` passive fires before step 5 and a surviving target
//! at low HP gets an `OnLowHp` passive after step 7.

use tracing::debug;

use super::{ActionResolver, HitContext, PassiveResolver, ResolutionContext};
use crate::catalog::{PassiveOutcome, Skill, SkillKind, Trigger};
use crate::config::CombatRules;
use crate::output::{ActionKind, ActionReport, CounterReport, HitRecord};
use crate::unit::{Unit, UnitId};

/// Applies one incoming hit to `unit` through its guard and defense.
///
/// A raised guard scales the hit by `rules.guard_factor` (floor, minimum 1)
/// and is consumed. Defense is then subtracted with a floor of 1, so a hit
/// that gets here always removes at least 1 HP from a living unit.
pub fn mitigate(unit: &mut Unit, incoming: u32, rules: &CombatRules) -> HitRecord {
    let guarded = unit.consume_guard();
    let mut damage = incoming;
    if guarded {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let halved = (f64::from(damage) * rules.guard_factor.max(0.0)).floor() as u32;
        damage = halved.max(1);
    }
    damage = damage.saturating_sub(unit.stats().defense).max(1);
    HitRecord {
        damage: unit.take_damage(damage),
        guarded,
    }
}

/// Resolver for attack skills.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::{ActionResolver, CombatResolver};
/// use skirmish_core::catalog::SkillKind;
///
/// let resolver = CombatResolver::new();
/// assert!(resolver.handles().contains(&SkillKind::Attack));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CombatResolver;

impl CombatResolver {
    /// Creates a new combat resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn roll_damage(skill: &Skill, ctx: &mut ResolutionContext<'_>) -> (u32, bool) {
        let base = u32::try_from(skill.power).unwrap_or(0);
        let critical = ctx.rng.chance(ctx.rules.crit_chance);
        if critical {
            let boosted = (f64::from(base) * ctx.rules.crit_multiplier).floor() as u32;
            (boosted, true)
        } else {
            (base, false)
        }
    }
}

impl ActionResolver for CombatResolver {
    fn handles(&self) -> &[SkillKind] {
        &[SkillKind::Attack]
    }

    fn resolve(
        &self,
        actor: UnitId,
        skill: &Skill,
        ctx: &mut ResolutionContext<'_>,
    ) -> ActionReport {
        let mut report =
            ActionReport::new(actor, ActionKind::Attack, skill.id.clone(), &skill.name);

        let Some(side) = ctx.roster.get(actor).map(Unit::side) else {
            report.no_target = true;
            return report;
        };
        let Some(target) = ctx.pick_opponent(side.opponent()) else {
            report.no_target = true;
            ctx.finish(&mut report);
            return report;
        };
        report.target = Some(target);

        let (damage, critical) = Self::roll_damage(skill, ctx);
        report.critical = critical;
        let profile = ctx.catalog.keyword_profile(skill);
        report.ignore_defense = profile.ignore_defense;

        let rules = ctx.rules;
        let Some((attacker, defender)) = ctx.roster.pair_mut(actor, target) else {
            report.no_target = true;
            ctx.finish(&mut report);
            return report;
        };

        report.ap_spent = attacker.spend_ap(skill.ap_cost);
        let mut hit = HitContext::new(actor, target, skill.id.clone(), damage);

        if rules.extended_triggers {
            report.passives.extend(PassiveResolver::try_activate(
                attacker,
                Trigger::OnAttack,
                &mut hit,
                ctx.rng,
            ));
        }

        report.passives.extend(PassiveResolver::try_activate(
            defender,
            Trigger::OnBeingHit,
            &mut hit,
            ctx.rng,
        ));

        if hit.dodged {
            report.dodged = true;
            debug!(%actor, %target, skill = %skill.id, "attack dodged");
            ctx.finish(&mut report);
            return report;
        }

        let final_damage = hit.final_damage();
        let per_hit = final_damage / profile.hits;
        for _ in 0..profile.hits {
            if !defender.is_alive() {
                break;
            }
            report.hits.push(mitigate(defender, per_hit, rules));
        }

        if defender.is_alive() {
            let after =
                PassiveResolver::try_activate(defender, Trigger::OnAfterHit, &mut hit, ctx.rng);
            if let Some(activation) = after {
                if let PassiveOutcome::CounterAttack { damage } = activation.outcome {
                    let record = mitigate(attacker, damage, rules);
                    report.counter = Some(CounterReport {
                        source: target,
                        target: actor,
                        damage: record.damage,
                        guarded: record.guarded,
                        killed: !attacker.is_alive(),
                    });
                }
                report.passives.push(activation);
            }
        }

        if rules.extended_triggers
            && defender.is_alive()
            && defender.hp_ratio() <= rules.low_hp_threshold
        {
            report.passives.extend(PassiveResolver::try_activate(
                defender,
                Trigger::OnLowHp,
                &mut hit,
                ctx.rng,
            ));
        }

        if !defender.is_alive() {
            report.deaths.push(target);
        }
        if !attacker.is_alive() {
            report.deaths.push(actor);
        }

        debug!(
            %actor,
            %target,
            skill = %skill.id,
            damage = report.total_damage(),
            critical,
            hits = report.hits.len(),
            "attack resolved"
        );
        ctx.finish(&mut report);
        report
    }
}
