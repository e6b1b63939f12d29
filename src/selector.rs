use rand::Rng;

use crate::types::Operation;

/// Source of the uniform draws the generator needs.
///
/// Implemented for every [`rand::Rng`], so a seeded `StdRng` gives
/// reproducible runs.
pub trait RandomSource {
    /// Uniform integer in `[0, upper)`. `upper` must be non-zero.
    fn below(&mut self, upper: u64) -> u64;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;
}

impl<R: Rng> RandomSource for R {
    fn below(&mut self, upper: u64) -> u64 {
        self.gen_range(0..upper)
    }

    fn unit(&mut self) -> f64 {
        self.gen()
    }
}

pub const KEY_PREFIX: &str = "KEY";

/// Picks the next operation: a write with probability `1 / ratio`, a read
/// otherwise, on a key drawn uniformly from `[0, max_keys)`.
#[derive(Debug, Clone, Copy)]
pub struct OperationSelector {
    max_keys: u64,
    ratio: u32,
}

impl OperationSelector {
    /// `max_keys` and `ratio` are clamped to at least 1.
    pub fn new(max_keys: u64, ratio: u32) -> Self {
        Self {
            max_keys: max_keys.max(1),
            ratio: ratio.max(1),
        }
    }

    pub fn write_probability(&self) -> f64 {
        1.0 / self.ratio as f64
    }

    pub fn next<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Operation {
        let key = format!("{}{}", KEY_PREFIX, rng.below(self.max_keys));
        match rng.below(self.ratio as u64) {
            0 => Operation::Write { key },
            _ => Operation::Read { key },
        }
    }
}
