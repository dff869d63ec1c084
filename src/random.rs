//! Per-ray random number generation.
//!
//! Every ray owns one [`RngContext`]: a ChaCha20 generator keyed by the global
//! seed and running on its own stream selected by the ray index. Streams never
//! overlap, so rays sample independently and a run is reproducible from the
//! seed no matter how the work is scheduled.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;

/// Exclusively owned random state of one ray.
#[derive(Debug, Clone, PartialEq)]
pub struct RngContext {
    rng: ChaCha20Rng,
}

impl RngContext {
    /// Context for ray `index` under `seed`.
    pub fn new(seed: u64, index: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        rng.set_stream(index);
        Self { rng }
    }

    /// Build contexts for `n` rays in parallel.
    pub fn population(seed: u64, n: usize) -> Vec<Self> {
        (0..n)
            .into_par_iter()
            .map(|i| Self::new(seed, i as u64))
            .collect()
    }

    /// Generate a random f32 in [0.0, 1.0)
    pub fn uniform(&mut self) -> f32 {
        self.rng.random()
    }

    /// Generate a random f32 in [min, max)
    pub fn uniform_range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.uniform()
    }

    /// Stream id, equal to the ray index the context was built for.
    pub fn stream(&self) -> u64 {
        self.rng.get_stream()
    }
}

/// RNG Context Initializer kernel: reseed `states[i]` as ray `i` under `seed`.
pub fn prep_rand(states: &mut [RngContext], seed: u64) {
    states
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, state)| *state = RngContext::new(seed, i as u64));
}
