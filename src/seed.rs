//! Random number generator state and seeding.
//!
//! Two streams are kept: a general-purpose one (weight init, shuffling)
//! and one reserved for accelerator-side draws. [`Generators`] can be
//! passed around explicitly; for script-style code there is also a
//! process-wide instance, created from entropy on first use and changed
//! only by [`set_seeds`] and by draws taken through the `with_*` helpers.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Seed used when the caller has no preference.
pub const DEFAULT_SEED: u64 = 42;

/// The general-purpose and accelerator random number generators.
#[derive(Debug, Clone)]
pub struct Generators {
    cpu: StdRng,
    accelerator: StdRng,
    seed: Option<u64>,
}

impl Generators {
    /// Both streams seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            cpu: StdRng::seed_from_u64(seed),
            accelerator: StdRng::seed_from_u64(seed),
            seed: Some(seed),
        }
    }

    /// Unseeded generators drawing from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            cpu: StdRng::from_entropy(),
            accelerator: StdRng::from_entropy(),
            seed: None,
        }
    }

    /// Resets both streams to `seed`. Calling this twice with the same seed
    /// replays the same draws.
    pub fn set_seeds(&mut self, seed: u64) {
        self.cpu = StdRng::seed_from_u64(seed);
        self.accelerator = StdRng::seed_from_u64(seed);
        self.seed = Some(seed);
    }

    /// General-purpose stream.
    pub fn cpu(&mut self) -> &mut StdRng {
        &mut self.cpu
    }

    /// Accelerator stream.
    pub fn accelerator(&mut self) -> &mut StdRng {
        &mut self.accelerator
    }

    /// The last seed applied, or `None` when running from entropy.
    pub fn initial_seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for Generators {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

static GLOBAL: Lazy<Mutex<Generators>> = Lazy::new(|| Mutex::new(Generators::from_entropy()));

fn global() -> MutexGuard<'static, Generators> {
    // Generator state is replaced wholesale, so a panic mid-draw cannot
    // leave it inconsistent.
    GLOBAL.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Seeds the process-wide general-purpose and accelerator generators.
///
/// Every subsequent draw from either stream is deterministic relative to
/// this call until the next one.
pub fn set_seeds(seed: u64) {
    global().set_seeds(seed);
    log::debug!("process-wide generators seeded with {}", seed);
}

/// The seed last passed to [`set_seeds`], if any.
pub fn initial_seed() -> Option<u64> {
    global().initial_seed()
}

/// Runs `f` with exclusive access to the process-wide generators.
///
/// The lock is not reentrant: `f` must not call back into this module,
/// directly or through [`PatchEmbedding::new`](crate::nn::PatchEmbedding::new)
/// or an unseeded shuffling `DataLoader`, or it deadlocks.
pub fn with_generators<T>(f: impl FnOnce(&mut Generators) -> T) -> T {
    f(&mut global())
}

/// Runs `f` with the process-wide general-purpose stream. Same locking rule
/// as [`with_generators`].
pub fn with_cpu_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    with_generators(|g| f(g.cpu()))
}

/// Runs `f` with the process-wide accelerator stream. Same locking rule as
/// [`with_generators`].
pub fn with_accelerator_rng<T>(f: impl FnOnce(&mut StdRng) -> T) -> T {
    with_generators(|g| f(g.accelerator()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn draw(rng: &mut StdRng, n: usize) -> Vec<u64> {
        (0..n).map(|_| rng.gen()).collect()
    }

    #[test]
    fn test_same_seed_replays_draws() {
        let mut g = Generators::new(7);
        let first_cpu = draw(g.cpu(), 8);
        let first_acc = draw(g.accelerator(), 8);

        g.set_seeds(7);
        assert_eq!(draw(g.cpu(), 8), first_cpu);
        assert_eq!(draw(g.accelerator(), 8), first_acc);
    }

    #[test]
    fn test_streams_are_independent() {
        let mut g = Generators::new(11);
        let _ = draw(g.cpu(), 100);
        let acc = draw(g.accelerator(), 4);

        let mut fresh = Generators::new(11);
        assert_eq!(draw(fresh.accelerator(), 4), acc);
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut a = Generators::new(1);
        let mut b = Generators::new(2);
        assert_ne!(draw(a.cpu(), 4), draw(b.cpu(), 4));
    }

    #[test]
    fn test_default_seed() {
        let g = Generators::default();
        assert_eq!(g.initial_seed(), Some(DEFAULT_SEED));
        assert_eq!(Generators::from_entropy().initial_seed(), None);
    }
}
