//! Cross-module tests for the battle loop.
//!
//! - `determinism.rs`: same seed and inputs give the same history
//! - `integration.rs`: end-to-end encounters driven through [`Battle`](crate::battle::Battle)
//! - `properties.rs`: proptest checks of scheduler and resolution invariants
//! - `helpers.rs`: roster builders and scripted battles

mod determinism;
mod helpers;

pub use helpers::*;
