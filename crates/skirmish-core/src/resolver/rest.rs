//! Rest resolver for the wait skill.

use tracing::debug;

use super::{ActionResolver, ResolutionContext};
use crate::catalog::{Skill, SkillKind};
use crate::output::{ActionKind, ActionReport};
use crate::unit::UnitId;

/// Resolver for resting: restores the unit's `ap_recovery`, capped at max AP.
#[derive(Debug, Clone, Default)]
pub struct RestResolver;

impl RestResolver {
    /// Creates a new rest resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ActionResolver for RestResolver {
    fn handles(&self) -> &[SkillKind] {
        &[SkillKind::Wait]
    }

    fn resolve(
        &self,
        actor: UnitId,
        skill: &Skill,
        ctx: &mut ResolutionContext<'_>,
    ) -> ActionReport {
        let mut report = ActionReport::new(actor, ActionKind::Rest, skill.id.clone(), &skill.name);
        if let Some(unit) = ctx.roster.get_mut(actor) {
            report.ap_spent = unit.spend_ap(skill.ap_cost);
            let recovery = unit.stats().rest_recovery();
            report.ap_recovered = unit.recover_ap(recovery);
        }
        debug!(%actor, recovered = report.ap_recovered, "rested");
        ctx.finish(&mut report);
        report
    }
}
