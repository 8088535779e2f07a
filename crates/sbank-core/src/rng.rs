//! Deterministic RNG wrapper.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Deterministic RNG handle owning the single proposal stream of a run.
///
/// The handle wraps `StdRng` and is created exactly once per run from the
/// master seed. It is passed by mutable reference to whoever draws samples;
/// nothing in the workspace reseeds it or keeps a global copy, so bank
/// contents are a pure function of the seed and the seed bank.
#[derive(Debug, Clone)]
pub struct RngHandle {
    rng: StdRng,
    seed: u64,
}

impl RngHandle {
    /// Creates a new RNG handle from a master seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Master seed the handle was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}
