//! Support resolver for heal and defend skills.
//!
//! - Heal: pays the AP cost, then restores `|power|` HP (capped by missing HP)
//!   to the living ally with the lowest HP ratio, the user included
//! - Defend: pays the AP cost and raises a single-use guard on the user

use tracing::debug;

use super::{ActionResolver, ResolutionContext};
use crate::catalog::{Skill, SkillKind};
use crate::output::{ActionKind, ActionReport};
use crate::unit::{Unit, UnitId};

/// Resolver for heal and defend skills.
#[derive(Debug, Clone, Default)]
pub struct SupportResolver;

impl SupportResolver {
    /// Creates a new support resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn heal(actor: UnitId, skill: &Skill, ctx: &mut ResolutionContext<'_>) -> ActionReport {
        let mut report = ActionReport::new(actor, ActionKind::Heal, skill.id.clone(), &skill.name);
        let Some(side) = ctx.roster.get(actor).map(Unit::side) else {
            report.no_target = true;
            return report;
        };
        if let Some(unit) = ctx.roster.get_mut(actor) {
            report.ap_spent = unit.spend_ap(skill.ap_cost);
        }

        let Some(target) = ctx.roster.most_wounded(side).map(Unit::id) else {
            report.no_target = true;
            ctx.finish(&mut report);
            return report;
        };
        report.target = Some(target);
        if let Some(unit) = ctx.roster.get_mut(target) {
            report.healed = unit.heal(skill.heal_amount());
        }

        debug!(%actor, %target, healed = report.healed, "heal resolved");
        ctx.finish(&mut report);
        report
    }

    fn defend(actor: UnitId, skill: &Skill, ctx: &mut ResolutionContext<'_>) -> ActionReport {
        let mut report =
            ActionReport::new(actor, ActionKind::Defend, skill.id.clone(), &skill.name);
        if let Some(unit) = ctx.roster.get_mut(actor) {
            report.ap_spent = unit.spend_ap(skill.ap_cost);
            unit.raise_guard();
            report.guard_raised = unit.is_defending();
        }

        debug!(%actor, "guard raised");
        ctx.finish(&mut report);
        report
    }
}

impl ActionResolver for SupportResolver {
    fn handles(&self) -> &[SkillKind] {
        &[SkillKind::Heal, SkillKind::Defend]
    }

    fn resolve(
        &self,
        actor: UnitId,
        skill: &Skill,
        ctx: &mut ResolutionContext<'_>,
    ) -> ActionReport {
        match skill.kind {
            SkillKind::Heal => Self::heal(actor, skill, ctx),
            _ => Self::defend(actor, skill, ctx),
        }
    }
}
