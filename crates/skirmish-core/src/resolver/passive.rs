//! Passive trigger resolution.
//!
//! For a given unit and trigger, the first passive that matches the trigger,
//! is affordable and passes its probability roll fires. Nothing else for that
//! trigger fires on the same unit in the same event.
//!
//! # Roll Order
//!
//! Candidates are examined in the unit's passive order. A candidate the unit
//! cannot pay for is skipped without consuming a draw, so PP shortages do not
//! shift the random sequence of later rolls.

use tracing::trace;

use super::HitContext;
use crate::catalog::Trigger;
use crate::output::PassiveActivation;
use crate::rng::RandomSource;
use crate::unit::Unit;

/// Finds and fires passives for trigger events.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveResolver;

impl PassiveResolver {
    /// Fires at most one passive of `unit` listening for `trigger`.
    ///
    /// On activation the PP cost is deducted before the effect runs against
    /// `unit` and `context`. Downed units never activate passives.
    pub fn try_activate(
        unit: &mut Unit,
        trigger: Trigger,
        context: &mut HitContext,
        rng: &mut dyn RandomSource,
    ) -> Option<PassiveActivation> {
        if !unit.is_alive() {
            return None;
        }

        let pp = unit.pp();
        let passive = unit
            .passives()
            .iter()
            .filter(|p| p.trigger == trigger)
            .find(|p| pp >= p.pp_cost && rng.roll_at_most(p.probability))
            .cloned()?;

        let pp_spent = unit.spend_pp(passive.pp_cost);
        let outcome = passive.effect.apply(unit, context);
        trace!(
            unit = %unit.id(),
            passive = %passive.id,
            %trigger,
            ?outcome,
            "passive activated"
        );

        Some(PassiveActivation {
            unit: unit.id(),
            passive: passive.id,
            display_name: passive.display_name,
            trigger,
            pp_spent,
            outcome,
        })
    }
}
