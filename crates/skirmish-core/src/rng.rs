//! Injectable randomness for critical and passive rolls.
//!
//! Every random decision in the core draws from a [`RandomSource`] owned by
//! the encounter, never from a global generator. [`SeededRng`] gives
//! reproducible encounters from a `u64` seed; [`ScriptedRolls`] replays a
//! fixed list of draws so tests can force individual outcomes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// A source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send {
    /// Returns the next uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Succeeds when the draw is strictly below `probability`.
    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// Succeeds when the draw is at most `probability`.
    ///
    /// A non-positive probability never succeeds and consumes no draw.
    fn roll_at_most(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        self.next_f64() <= probability
    }

    /// Uniform value in `[0, max)`.
    fn range(&mut self, max: f64) -> f64 {
        self.next_f64() * max
    }

    /// Uniform index in `0..len`. Returns 0 for `len <= 1`.
    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len - 1)
    }
}

/// Deterministic generator backed by `ChaCha8Rng`.
#[derive(Debug, Clone)]
pub struct SeededRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededRng {
    /// Creates a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for SeededRng {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed queue of draws, then repeats a fallback value.
///
/// # Example
///
/// ```
/// use skirmish_core::rng::{RandomSource, ScriptedRolls};
///
/// // Force a critical hit (draw 0.0 < 0.15), then fail every other roll.
/// let mut rolls = ScriptedRolls::new([0.0]).with_fallback(0.99);
/// assert!(rolls.chance(0.15));
/// assert!(!rolls.chance(0.15));
/// ```
#[derive(Debug, Clone)]
pub struct ScriptedRolls {
    queue: VecDeque<f64>,
    fallback: f64,
    consumed: usize,
}

impl ScriptedRolls {
    /// Creates a script from the given draws. The fallback defaults to `0.999`,
    /// which fails every roll with probability below it.
    #[must_use]
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            queue: draws.into_iter().collect(),
            fallback: 0.999,
            consumed: 0,
        }
    }

    /// A script that fails every roll with probability below `0.999`.
    #[must_use]
    pub fn always_fail() -> Self {
        Self::new([])
    }

    /// A script that succeeds every roll with positive probability.
    #[must_use]
    pub fn always_succeed() -> Self {
        Self::new([]).with_fallback(0.0)
    }

    /// Sets the value returned once the queue is exhausted.
    #[must_use]
    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback.clamp(0.0, 0.999_999);
        self
    }

    /// Appends draws to the end of the queue.
    pub fn push(&mut self, draws: impl IntoIterator<Item = f64>) {
        self.queue.extend(draws);
    }

    /// Number of draws taken so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }
}

impl RandomSource for ScriptedRolls {
    fn next_f64(&mut self) -> f64 {
        self.consumed += 1;
        self.queue.pop_front().unwrap_or(self.fallback)
    }
}
