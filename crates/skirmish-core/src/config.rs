//! Encounter configuration.
//!
//! A [`BattleConfig`] bundles everything needed to set up an encounter:
//! - [`CombatRules`]: critical, guard and targeting constants
//! - [`SchedulerConfig`]: tick size and gauge growth
//! - the roster as a list of [`UnitConfig`] records
//!
//! Every struct implements `Default` and deserializes with missing fields
//! filled from the defaults, so a JSON config only needs to name what it
//! changes.
//!
//! # Example
//!
//! ```
//! use skirmish_core::config::BattleConfig;
//!
//! let config = BattleConfig::from_json(r#"{
//!     "units": [
//!         { "id": 1, "name": "Knight", "side": "ally", "skills": "warrior" },
//!         { "id": 2, "name": "Goblin", "side": "enemy" }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(config.units.len(), 2);
//! assert!((config.rules.crit_chance - 0.15).abs() < f64::EPSILON);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, PassiveSource, SkillSource};
use crate::error::ConfigError;
use crate::roster::Roster;
use crate::unit::{Side, Unit, UnitId, UnitStats};

/// How an attacker picks among living opponents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPolicy {
    /// The first living opponent in roster order.
    #[default]
    FirstAlive,
    /// The living opponent with the least current HP.
    LowestHp,
    /// A uniformly random living opponent.
    Random,
}

/// Tunable combat constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatRules {
    /// Probability of a critical hit.
    pub crit_chance: f64,
    /// Damage multiplier on a critical hit.
    pub crit_multiplier: f64,
    /// Multiplier a raised guard applies to the next hit.
    pub guard_factor: f64,
    /// Attack targeting.
    pub target_policy: TargetPolicy,
    /// Fire `OnTurnStart`, `OnAttack` and `OnLowHp` passives.
    pub extended_triggers: bool,
    /// HP ratio at or below which `OnLowHp` fires.
    pub low_hp_threshold: f64,
}

impl Default for CombatRules {
    fn default() -> Self {
        Self {
            crit_chance: 0.15,
            crit_multiplier: 1.5,
            guard_factor: 0.5,
            target_policy: TargetPolicy::FirstAlive,
            extended_triggers: false,
            low_hp_threshold: 0.3,
        }
    }
}

/// Readiness scheduler constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds of wall time per scheduler tick.
    pub tick_interval: f64,
    /// Gauge gained per tick per point of speed.
    pub gauge_per_speed: f64,
    /// Upper bound on ticks run by one `advance` call. Excess time is dropped.
    pub max_ticks_per_advance: u32,
    /// Units start each battle with a gauge drawn from `[0, jitter)`.
    pub initial_gauge_jitter: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: 0.05,
            gauge_per_speed: 0.2,
            max_ticks_per_advance: 240,
            initial_gauge_jitter: 10.0,
        }
    }
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    /// Unique id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Side.
    pub side: Side,
    /// Stats.
    #[serde(default)]
    pub stats: UnitStats,
    /// Skill set name, id list or inline skills.
    #[serde(default)]
    pub skills: SkillSource,
    /// Passive set name, id list or inline passives.
    #[serde(default)]
    pub passives: PassiveSource,
    /// AP at battle start. Defaults to max AP.
    #[serde(default)]
    pub starting_ap: Option<u32>,
    /// PP at battle start. Defaults to max PP.
    #[serde(default)]
    pub starting_pp: Option<u32>,
}

impl UnitConfig {
    /// Creates a record with default stats and the default skill set.
    #[must_use]
    pub fn new(id: u32, name: &str, side: Side) -> Self {
        Self {
            id,
            name: name.to_string(),
            side,
            stats: UnitStats::default(),
            skills: SkillSource::default(),
            passives: PassiveSource::default(),
            starting_ap: None,
            starting_pp: None,
        }
    }

    /// Sets the stats.
    #[must_use]
    pub fn with_stats(mut self, stats: UnitStats) -> Self {
        self.stats = stats;
        self
    }

    /// Sets the skill source.
    #[must_use]
    pub fn with_skills(mut self, skills: SkillSource) -> Self {
        self.skills = skills;
        self
    }

    /// Sets the passive source.
    #[must_use]
    pub fn with_passives(mut self, passives: PassiveSource) -> Self {
        self.passives = passives;
        self
    }

    /// Sets the starting AP.
    #[must_use]
    pub fn with_starting_ap(mut self, ap: u32) -> Self {
        self.starting_ap = Some(ap);
        self
    }

    /// Sets the starting PP.
    #[must_use]
    pub fn with_starting_pp(mut self, pp: u32) -> Self {
        self.starting_pp = Some(pp);
        self
    }

    /// Builds the unit, resolving skills and passives against `catalog`.
    #[must_use]
    pub fn build(&self, catalog: &Catalog) -> Unit {
        Unit::new(UnitId::new(self.id), &self.name, self.side, self.stats.clone())
            .with_skills(catalog.resolve_skills(&self.skills))
            .with_passives(catalog.resolve_passives(&self.passives))
            .with_starting(self.starting_ap, self.starting_pp)
    }
}

/// Full encounter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Combat constants.
    pub rules: CombatRules,
    /// Scheduler constants.
    pub scheduler: SchedulerConfig,
    /// Release the scheduler as soon as an action resolves. When false, the
    /// presentation layer calls `Battle::complete_action` after playback.
    pub auto_complete_actions: bool,
    /// Roster records.
    pub units: Vec<UnitConfig>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            rules: CombatRules::default(),
            scheduler: SchedulerConfig::default(),
            auto_complete_actions: true,
            units: Vec::new(),
        }
    }
}

impl BattleConfig {
    /// Parses and validates a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::OutOfRange`] for values [`validate`](Self::validate) rejects.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OutOfRange`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field,
                    reason: format!("{value} is not a probability"),
                })
            }
        }
        fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field,
                    reason: format!("{value} is negative"),
                })
            }
        }

        probability("rules.crit_chance", self.rules.crit_chance)?;
        non_negative("rules.crit_multiplier", self.rules.crit_multiplier)?;
        non_negative("rules.guard_factor", self.rules.guard_factor)?;
        probability("rules.low_hp_threshold", self.rules.low_hp_threshold)?;
        non_negative("scheduler.gauge_per_speed", self.scheduler.gauge_per_speed)?;
        non_negative("scheduler.initial_gauge_jitter", self.scheduler.initial_gauge_jitter)?;
        if self.scheduler.tick_interval <= 0.0 || self.scheduler.tick_interval.is_nan() {
            return Err(ConfigError::OutOfRange {
                field: "scheduler.tick_interval",
                reason: format!("{} must be positive", self.scheduler.tick_interval),
            });
        }
        Ok(())
    }

    /// Adds a roster record.
    #[must_use]
    pub fn with_unit(mut self, unit: UnitConfig) -> Self {
        self.units.push(unit);
        self
    }

    /// Sets the combat rules.
    #[must_use]
    pub fn with_rules(mut self, rules: CombatRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the scheduler constants.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Sets whether actions complete without presentation acknowledgement.
    #[must_use]
    pub fn with_auto_complete(mut self, auto_complete: bool) -> Self {
        self.auto_complete_actions = auto_complete;
        self
    }

    /// Builds the roster. Duplicate ids after the first are dropped.
    #[must_use]
    pub fn build_roster(&self, catalog: &Catalog) -> Roster {
        let mut roster = Roster::new();
        for unit in &self.units {
            roster.insert(unit.build(catalog));
        }
        roster
    }
}
