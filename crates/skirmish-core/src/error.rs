//! Error types.
//!
//! Combat resolution never fails; these errors cover the two places where a
//! caller can hand the core something it cannot use: malformed configuration
//! and lifecycle calls that make no sense in the current phase.

use thiserror::Error;

use crate::battle::BattlePhase;

/// Problems with configuration input.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The input was not valid JSON for the expected shape.
    #[error("could not parse battle config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value was outside its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    OutOfRange {
        /// Offending field.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// A lifecycle transition requested from the wrong phase.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The transition is not allowed from the current phase.
    #[error("cannot {action} a battle that is {phase}")]
    InvalidTransition {
        /// Requested transition.
        action: &'static str,
        /// Phase the battle was in.
        phase: BattlePhase,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_error_message() {
        let err = LifecycleError::InvalidTransition {
            action: "pause",
            phase: BattlePhase::Idle,
        };
        assert_eq!(err.to_string(), "cannot pause a battle that is idle");
    }

    #[test]
    fn parse_error_wraps_serde() {
        let err: ConfigError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("could not parse battle config"));
    }
}
