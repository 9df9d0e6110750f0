//! Seeded random number generation for Monte Carlo pricing.
//!
//! Everything is driven by a Mersenne Twister (MT19937-64, via `rand_mt`)
//! so a given seed reproduces the same paths on every platform.  The uniform
//! generator implements [`rand::RngCore`] and can be handed to anything in
//! the `rand` ecosystem.

use ql_core::Real;
use rand::RngCore;
use rand_mt::Mt19937GenRand64;

use crate::distributions::normal_cdf_inverse;

/// Uniform deviates on the open interval `(0, 1)`.
#[derive(Debug, Clone)]
pub struct MersenneTwisterUniformRng {
    rng: Mt19937GenRand64,
}

impl MersenneTwisterUniformRng {
    /// Create a new generator with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mt19937GenRand64::new(seed),
        }
    }

    /// Next deviate, built from the top 53 bits and centred in its bucket so
    /// neither 0 nor 1 can be returned.
    pub fn next_real(&mut self) -> Real {
        const SCALE: Real = 1.0 / (1u64 << 53) as Real;
        ((self.next_u64() >> 11) as Real + 0.5) * SCALE
    }
}

impl RngCore for MersenneTwisterUniformRng {
    fn next_u32(&mut self) -> u32 {
        (self.rng.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.rng.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Standard normal deviates by inverse-transform sampling.
#[derive(Debug, Clone)]
pub struct GaussianRng {
    uniform: MersenneTwisterUniformRng,
}

impl GaussianRng {
    /// Create a generator backed by a Mersenne Twister with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            uniform: MersenneTwisterUniformRng::new(seed),
        }
    }

    /// Next standard-normal deviate.
    pub fn next_gaussian(&mut self) -> Real {
        // the uniform is strictly inside (0, 1), so the inverse cannot fail
        normal_cdf_inverse(self.uniform.next_real()).unwrap_or(0.0)
    }

    /// Fill `out` with standard-normal deviates.
    pub fn fill(&mut self, out: &mut [Real]) {
        for z in out.iter_mut() {
            *z = self.next_gaussian();
        }
    }
}
