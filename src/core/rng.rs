//! Deterministic random number generation for dead-time simulation.
//!
//! Interleave-mode livetime accounting needs two kinds of draws: a uniform
//! deviate gating each trigger against the precomputed efficiency, and a
//! Poisson deviate counting invisible background triggers over an elapsed
//! interval. Both come through the [`DeadtimeDraws`] trait so the random
//! source is an explicit, injectable dependency; tests supply a scripted
//! fake instead of a real generator.
//!
//! The production source is ChaCha8 seeded from a `u64`: the same seed
//! reproduces an identical simulated run.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Source of the random deviates consumed by interleave-mode dead-time
/// accounting.
pub trait DeadtimeDraws {
    /// Uniform deviate in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Poisson deviate with the given mean.
    fn poisson(&mut self, mean: f64) -> u64;
}

/// Deterministic ChaCha8-backed random source.
#[derive(Clone, Debug)]
pub struct TriggerRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl TriggerRng {
    /// Create a new generator with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Capture the current state for checkpointing.
    #[must_use]
    pub fn state(&self) -> TriggerRngState {
        TriggerRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &TriggerRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

impl DeadtimeDraws for TriggerRng {
    fn uniform(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    fn poisson(&mut self, mean: f64) -> u64 {
        if mean <= 0.0 {
            return 0;
        }
        if mean < 30.0 {
            // Knuth: multiply uniforms until the product drops below e^-mean.
            let limit = (-mean).exp();
            let mut k: u64 = 0;
            let mut p = 1.0;
            loop {
                p *= self.uniform();
                if p <= limit {
                    return k;
                }
                k += 1;
            }
        }
        // Gaussian approximation for large means; twelve uniforms make an
        // approximately standard normal deviate.
        let z: f64 = (0..12).map(|_| self.uniform()).sum::<f64>() - 6.0;
        let value = mean + z * mean.sqrt();
        if value < 0.0 {
            0
        } else {
            value.round() as u64
        }
    }
}

/// Serializable generator state, O(1) regardless of how many deviates
/// have been drawn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRngState {
    /// Original seed.
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter).
    pub word_pos: u128,
}

/// Scripted random source for tests.
///
/// Returns queued values in order; an exhausted queue yields `0.0`
/// uniforms (always passes an efficiency gate) and `0` Poisson counts.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDraws {
    uniforms: std::collections::VecDeque<f64>,
    poissons: std::collections::VecDeque<u64>,
}

impl ScriptedDraws {
    /// Empty script: every uniform is 0.0, every Poisson count is 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue uniform deviates to return.
    #[must_use]
    pub fn with_uniforms(mut self, values: impl IntoIterator<Item = f64>) -> Self {
        self.uniforms.extend(values);
        self
    }

    /// Queue Poisson counts to return.
    #[must_use]
    pub fn with_poissons(mut self, values: impl IntoIterator<Item = u64>) -> Self {
        self.poissons.extend(values);
        self
    }
}

impl DeadtimeDraws for ScriptedDraws {
    fn uniform(&mut self) -> f64 {
        self.uniforms.pop_front().unwrap_or(0.0)
    }

    fn poisson(&mut self, _mean: f64) -> u64 {
        self.poissons.pop_front().unwrap_or(0)
    }
}
