//! Resolver module: turns a selected skill into state mutations.
//!
//! Resolvers are the write phase of an action. The scheduler picks an actor,
//! selection picks a skill, and the resolver registered for that skill's kind
//! mutates the roster and reports what happened.
//!
//! # Architecture
//!
//! Each resolver declares which [`SkillKind`]s it handles via
//! [`ActionResolver::handles()`]. [`ResolverSet`] routes a skill to the first
//! resolver that handles its kind.
//!
//! # Invariants
//!
//! - A resolution runs to completion; nothing else mutates the roster meanwhile
//! - All randomness comes from the injected [`RandomSource`]
//! - Resolvers never fail: missing actors or targets produce a no-effect report
//!
//! # Available Resolvers
//!
//! - [`CombatResolver`]: attack skills (critical, keywords, passives, guard, defense)
//! - [`SupportResolver`]: heal and defend skills
//! - [`RestResolver`]: the wait skill, recovering AP

mod combat;
mod context;
mod passive;
mod rest;
mod support;

pub use combat::{mitigate, CombatResolver};
pub use context::HitContext;
pub use passive::PassiveResolver;
pub use rest::RestResolver;
pub use support::SupportResolver;

use tracing::warn;

use crate::catalog::{Catalog, Skill, SkillKind};
use crate::config::{CombatRules, TargetPolicy};
use crate::output::{ActionKind, ActionReport};
use crate::rng::RandomSource;
use crate::roster::Roster;
use crate::unit::{Side, UnitId};

/// Everything a resolver may read or mutate during one action.
pub struct ResolutionContext<'a> {
    /// All units; the only mutable state.
    pub roster: &'a mut Roster,
    /// Content lookups (keywords).
    pub catalog: &'a Catalog,
    /// Tunable combat constants.
    pub rules: &'a CombatRules,
    /// Source for critical, passive and targeting rolls.
    pub rng: &'a mut dyn RandomSource,
}

impl ResolutionContext<'_> {
    /// Fills `report.units` with the resulting state of the actor and target.
    pub(crate) fn finish(&self, report: &mut ActionReport) {
        report.units.clear();
        for id in std::iter::once(report.actor).chain(report.target) {
            if report.units.iter().any(|u| u.id == id) {
                continue;
            }
            if let Some(unit) = self.roster.get(id) {
                report.units.push(unit.snapshot());
            }
        }
    }

    /// Chooses the opponent an attack is aimed at.
    pub(crate) fn pick_opponent(&mut self, side: Side) -> Option<UnitId> {
        let candidates: Vec<_> = self.roster.living(side).collect();
        let chosen = match self.rules.target_policy {
            TargetPolicy::FirstAlive => candidates.first().copied(),
            TargetPolicy::LowestHp => candidates
                .iter()
                .copied()
                .fold(None, |best: Option<&crate::unit::Unit>, unit| match best {
                    Some(b) if b.hp() <= unit.hp() => Some(b),
                    _ => Some(unit),
                }),
            TargetPolicy::Random => {
                if candidates.is_empty() {
                    None
                } else {
                    candidates.get(self.rng.index(candidates.len())).copied()
                }
            }
        };
        chosen.map(crate::unit::Unit::id)
    }
}

/// Resolves one kind of action.
///
/// # Example
///
/// ```
/// use skirmish_core::resolver::{ActionResolver, ResolutionContext};
/// use skirmish_core::catalog::{Skill, SkillKind};
/// use skirmish_core::output::{ActionKind, ActionReport};
/// use skirmish_core::unit::UnitId;
///
/// struct Taunt;
///
/// impl ActionResolver for Taunt {
///     fn handles(&self) -> &[SkillKind] {
///         &[SkillKind::Defend]
///     }
///
///     fn resolve(
///         &self,
///         actor: UnitId,
///         skill: &Skill,
///         ctx: &mut ResolutionContext<'_>,
///     ) -> ActionReport {
///         ActionReport::new(actor, ActionKind::Defend, skill.id.clone(), &skill.name)
///     }
/// }
/// ```
pub trait ActionResolver: Send + Sync {
    /// Skill kinds this resolver handles.
    fn handles(&self) -> &[SkillKind];

    /// Resolves `skill` used by `actor`.
    fn resolve(&self, actor: UnitId, skill: &Skill, ctx: &mut ResolutionContext<'_>)
        -> ActionReport;
}

/// Routes skills to resolvers by kind.
pub struct ResolverSet {
    resolvers: Vec<Box<dyn ActionResolver>>,
}

impl std::fmt::Debug for ResolverSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverSet")
            .field("resolvers", &format!("[{} resolvers]", self.resolvers.len()))
            .finish()
    }
}

impl Default for ResolverSet {
    fn default() -> Self {
        Self {
            resolvers: vec![
                Box::new(CombatResolver::new()),
                Box::new(SupportResolver::new()),
                Box::new(RestResolver::new()),
            ],
        }
    }
}

impl ResolverSet {
    /// A set with no resolvers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Registers a resolver ahead of the existing ones, so it takes
    /// precedence for the kinds it handles.
    pub fn register(&mut self, resolver: Box<dyn ActionResolver>) {
        self.resolvers.insert(0, resolver);
    }

    /// Resolves `skill` for `actor` with the first matching resolver.
    ///
    /// With no matching resolver the action degrades to a no-effect report.
    pub fn dispatch(
        &self,
        actor: UnitId,
        skill: &Skill,
        ctx: &mut ResolutionContext<'_>,
    ) -> ActionReport {
        if let Some(resolver) = self
            .resolvers
            .iter()
            .find(|r| r.handles().contains(&skill.kind))
        {
            return resolver.resolve(actor, skill, ctx);
        }

        warn!(skill = %skill.id, kind = ?skill.kind, "no resolver for skill kind");
        let mut report = ActionReport::new(
            actor,
            ActionKind::from(skill.kind),
            skill.id.clone(),
            &skill.name,
        );
        report.no_target = true;
        ctx.finish(&mut report);
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRolls;
    use crate::unit::{Unit, UnitStats};

    fn roster() -> Roster {
        let mut roster = Roster::new();
        roster.insert(Unit::new(UnitId::new(1), "A", Side::Ally, UnitStats::default()));
        for id in 10..13 {
            roster.insert(Unit::new(UnitId::new(id), "E", Side::Enemy, UnitStats::default()));
        }
        roster
    }

    #[test]
    fn resolver_is_object_safe() {
        fn _accepts_boxed(_resolver: Box<dyn ActionResolver>) {}
        fn _accepts_slice(_resolvers: &[Box<dyn ActionResolver>]) {}
    }

    #[test]
    fn default_set_covers_every_kind() {
        let set = ResolverSet::default();
        for kind in [SkillKind::Attack, SkillKind::Heal, SkillKind::Defend, SkillKind::Wait] {
            assert!(set.resolvers.iter().any(|r| r.handles().contains(&kind)));
        }
    }

    #[test]
    fn empty_set_degrades_to_no_effect() {
        let mut roster = roster();
        let catalog = Catalog::new();
        let rules = CombatRules::default();
        let mut rng = ScriptedRolls::always_fail();
        let mut ctx = ResolutionContext {
            roster: &mut roster,
            catalog: &catalog,
            rules: &rules,
            rng: &mut rng,
        };
        let skill = Skill::attack("s", "S", 2, 10);
        let report = ResolverSet::empty().dispatch(UnitId::new(1), &skill, &mut ctx);
        assert!(report.no_target);
        assert_eq!(report.ap_spent, 0);
        assert_eq!(roster.get(UnitId::new(1)).unwrap().ap(), 8);
    }

    #[test]
    fn first_alive_policy() {
        let mut roster = roster();
        roster.get_mut(UnitId::new(10)).unwrap().take_damage(1_000);
        let catalog = Catalog::new();
        let rules = CombatRules::default();
        let mut rng = ScriptedRolls::always_fail();
        let mut ctx = ResolutionContext {
            roster: &mut roster,
            catalog: &catalog,
            rules: &rules,
            rng: &mut rng,
        };
        assert_eq!(ctx.pick_opponent(Side::Enemy), Some(UnitId::new(11)));
    }

    #[test]
    fn lowest_hp_policy() {
        let mut roster = roster();
        roster.get_mut(UnitId::new(12)).unwrap().take_damage(30);
        let catalog = Catalog::new();
        let rules = CombatRules {
            target_policy: TargetPolicy::LowestHp,
            ..CombatRules::default()
        };
        let mut rng = ScriptedRolls::always_fail();
        let mut ctx = ResolutionContext {
            roster: &mut roster,
            catalog: &catalog,
            rules: &rules,
            rng: &mut rng,
        };
        assert_eq!(ctx.pick_opponent(Side::Enemy), Some(UnitId::new(12)));
    }

    #[test]
    fn random_policy_uses_rng() {
        let mut roster = roster();
        let catalog = Catalog::new();
        let rules = CombatRules {
            target_policy: TargetPolicy::Random,
            ..CombatRules::default()
        };
        let mut rng = ScriptedRolls::new([0.5]);
        let mut ctx = ResolutionContext {
            roster: &mut roster,
            catalog: &catalog,
            rules: &rules,
            rng: &mut rng,
        };
        assert_eq!(ctx.pick_opponent(Side::Enemy), Some(UnitId::new(11)));
        assert_eq!(ctx.pick_opponent(Side::Ally), Some(UnitId::new(1)));
    }
}
