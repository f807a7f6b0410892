//! Injected source of randomness.
//!
//! The engine draws every random decision through [`RandomSource`] so runs
//! can be seeded for reproducibility or scripted in tests.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

pub trait RandomSource {
    /// Uniform integer in `[0, upper)`. `upper` is never zero.
    fn index(&mut self, upper: usize) -> usize;

    /// Uniform float in `[0, 1)`
    fn unit(&mut self) -> f64;
}

impl RandomSource for ChaCha8Rng {
    fn index(&mut self, upper: usize) -> usize {
        self.gen_range(0..upper)
    }

    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}
