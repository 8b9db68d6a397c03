//! # Skirmish Core
//!
//! Turn resolution for party-vs-party auto battles.
//!
//! Units on two sides fill readiness gauges at a rate set by their speed. The
//! first full unit acts: it greedily picks its best affordable skill, the
//! skill resolves against the roster, and the battle ends when one side has
//! nobody standing. Rendering, audio and input live outside this crate and
//! consume the [`BattleEvent`]s it emits.
//!
//! ## Architecture
//!
//! - **Units** ([`unit`], [`roster`]): stats, resources, status flags and gauges
//! - **Content** ([`catalog`]): skills, keywords, passives and named sets
//! - **Scheduling** ([`scheduler`], [`selection`]): who acts next and with what
//! - **Resolvers** ([`resolver`]): attack, heal, defend and rest pipelines,
//!   with passive triggers intercepting hits
//! - **Lifecycle** ([`battle`]): start, pause, resume and end detection
//!
//! ## Usage
//!
//! ```
//! use skirmish_core::{Battle, BattleConfig, Catalog};
//!
//! let config = BattleConfig::from_json(r#"{
//!     "units": [
//!         { "id": 1, "name": "Knight", "side": "ally", "skills": "warrior" },
//!         { "id": 2, "name": "Rogue", "side": "ally", "skills": "rogue", "passives": "duelist" },
//!         { "id": 3, "name": "Ogre", "side": "enemy",
//!           "stats": { "max_hp": 220, "max_ap": 8, "max_pp": 3, "speed": 7, "defense": 4 } }
//!     ]
//! }"#).unwrap();
//!
//! let mut battle = Battle::new(config, Catalog::standard(), 42);
//! battle.start().unwrap();
//! for _ in 0..10_000 {
//!     for event in battle.advance(0.5, 1.0) {
//!         // hand `event` to the presentation layer
//!         let _ = event;
//!     }
//!     if battle.outcome().is_some() {
//!         break;
//!     }
//! }
//! assert!(battle.outcome().is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod battle;
pub mod catalog;
pub mod config;
pub mod error;
pub mod output;
pub mod resolver;
pub mod rng;
pub mod roster;
pub mod scheduler;
pub mod selection;
pub mod unit;

pub use battle::{Battle, BattlePhase};
pub use catalog::Catalog;
pub use config::{BattleConfig, CombatRules, SchedulerConfig, TargetPolicy, UnitConfig};
pub use error::{ConfigError, LifecycleError};
pub use output::{ActionReport, BattleEvent, BattleOutcome};
pub use rng::{RandomSource, SeededRng};
pub use unit::{Side, Unit, UnitId};

#[cfg(test)]
mod tests;
