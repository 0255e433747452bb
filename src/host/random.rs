//! # Random Sources
//!
//! Seeded [`RandomSource`] implementations.

use crate::RandomSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A reproducible random source backed by [`StdRng`].
///
/// # Examples
///
/// ```
/// use loot_forge::{RandomSource, StdRandom};
///
/// let mut a = StdRandom::seeded(7);
/// let mut b = StdRandom::seeded(7);
/// assert_eq!(a.uniform(), b.uniform());
/// ```
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Creates a random source from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for StdRandom {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed sequence of values, cycling when exhausted.
///
/// Useful for driving the engine down a known path in tests.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    position: usize,
}

impl SequenceRandom {
    /// Creates a source replaying `values`. An empty list always yields 0.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            position: 0,
        }
    }
}

impl RandomSource for SequenceRandom {
    fn uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}
