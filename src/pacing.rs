use std::time::Duration;

use crate::selector::RandomSource;

/// Random pause before each request, uniform over `[0, max_pause)`.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    max_pause: Duration,
}

impl Pacer {
    pub fn new(max_pause: Duration) -> Self {
        Self { max_pause }
    }

    pub fn max_pause(&self) -> Duration {
        self.max_pause
    }

    pub fn next_delay<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Duration {
        self.max_pause.mul_f64(rng.unit().clamp(0.0, 1.0))
    }
}
