//! Deterministic uniform source.
//!
//! RULE: Nothing in the engine may call any platform RNG.
//! All randomness flows through the engine's own UniformSource,
//! seeded from a single u64. This means:
//!   - Two engines with the same seed and the same call sequence
//!     produce the same values, bit for bit.
//!   - Engines never share state; there is no process-wide generator.

use crate::types::Seed;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Uniform values in [0.0, 1.0) from a seeded PCG stream.
#[derive(Debug, Clone)]
pub struct UniformSource {
    seed:  Seed,
    inner: Pcg64Mcg,
}

impl UniformSource {
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Seed from the wall clock. Not reproducible across runs.
    pub fn from_clock() -> Self {
        Self::new(clock_seed())
    }

    /// Restart the stream from `seed`. Earlier draws are unaffected.
    pub fn reseed(&mut self, seed: Seed) {
        self.seed = seed;
        self.inner = Pcg64Mcg::seed_from_u64(seed);
    }

    /// The seed most recently applied.
    pub fn seed(&self) -> Seed {
        self.seed
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

fn clock_seed() -> Seed {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
