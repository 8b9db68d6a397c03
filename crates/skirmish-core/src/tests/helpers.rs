//! Test helpers for building rosters and driving battles.

use crate::battle::Battle;
use crate::catalog::{Catalog, Skill, SkillSource};
use crate::config::{BattleConfig, SchedulerConfig, UnitConfig};
use crate::output::{ActionReport, BattleEvent};
use crate::rng::ScriptedRolls;
use crate::unit::{Side, UnitStats};

// =============================================================================
// Logging
// =============================================================================

/// Routes `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// =============================================================================
// Roster Setup
// =============================================================================

/// Stats with the given HP, speed and defense and defaults elsewhere.
pub fn stats(max_hp: u32, speed: u32, defense: u32) -> UnitStats {
    UnitStats {
        max_hp,
        speed,
        defense,
        ..UnitStats::default()
    }
}

/// An inline skill list.
pub fn skills(list: Vec<Skill>) -> SkillSource {
    SkillSource::Inline(list)
}

/// The basic attack used by the reference scenarios: 2 AP, 10 power.
pub fn jab() -> Skill {
    Skill::attack("jab", "Jab", 2, 10)
}

/// Scheduler constants with no starting gauge jitter.
pub fn flat_scheduler() -> SchedulerConfig {
    SchedulerConfig {
        initial_gauge_jitter: 0.0,
        ..SchedulerConfig::default()
    }
}

/// Attacker A (speed 15, 8 AP, jab only) against a defenseless
/// target B (100 HP, speed 10, wait only).
pub fn duel_config() -> BattleConfig {
    BattleConfig::default()
        .with_scheduler(flat_scheduler())
        .with_unit(
            UnitConfig::new(1, "A", Side::Ally)
                .with_stats(stats(100, 15, 0))
                .with_skills(skills(vec![jab()])),
        )
        .with_unit(
            UnitConfig::new(2, "B", Side::Enemy)
                .with_stats(stats(100, 10, 0))
                .with_skills(skills(vec![Skill::wait()])),
        )
}

// =============================================================================
// Battle Driving
// =============================================================================

/// Builds a battle whose rolls come from `draws` and then fail.
///
/// One leading zero draw per unit is inserted for the start-of-battle gauge
/// jitter, so `draws` begins with the first roll made during combat.
pub fn scripted_battle(config: BattleConfig, draws: impl IntoIterator<Item = f64>) -> Battle {
    let jitter = vec![0.0; config.units.len()];
    let rolls = ScriptedRolls::new(jitter.into_iter().chain(draws));
    Battle::with_rng(config, Catalog::standard(), Box::new(rolls))
}

/// Steps ticks until an action resolves, returning its report.
pub fn step_until_action(battle: &mut Battle, max_ticks: u32) -> Option<ActionReport> {
    for _ in 0..max_ticks {
        let report = battle
            .step_tick(1.0)
            .into_iter()
            .find_map(|event| match event {
                BattleEvent::ActionResolved(report) => Some(report),
                _ => None,
            });
        if report.is_some() {
            return report;
        }
    }
    None
}

/// Every action report in the battle history.
pub fn action_reports(battle: &Battle) -> Vec<&ActionReport> {
    battle
        .history()
        .iter()
        .filter_map(|record| record.event.as_action())
        .collect()
}
