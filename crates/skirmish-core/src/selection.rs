//! Greedy skill selection.

use crate::catalog::Skill;
use crate::unit::Unit;

/// Picks the skill a ready unit will use.
///
/// Skills are scanned in ascending priority order and the first one the unit
/// can afford wins. With nothing affordable the unit rests with
/// [`Skill::wait`].
#[must_use]
pub fn select_skill(unit: &Unit) -> Skill {
    unit.skills()
        .iter()
        .find(|skill| skill.can_use(unit.ap()))
        .cloned()
        .unwrap_or_else(Skill::wait)
}
