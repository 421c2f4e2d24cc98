// Background sampling
// Independent Bernoulli draw per background index

use rand::Rng;

/// Decides which background indices become examples
#[derive(Debug, Clone, Copy)]
pub struct BackgroundSampler {
    rate: f64,
}

impl BackgroundSampler {
    pub fn new(rate: f64) -> Self {
        BackgroundSampler {
            rate: rate.clamp(0.0, 1.0),
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// One uniform draw per call, so the RNG stream advances identically
    /// regardless of the outcome
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen::<f64>() < self.rate
    }
}
