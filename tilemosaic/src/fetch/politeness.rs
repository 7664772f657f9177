//! Pacing for rate-limited providers.

use rand::Rng;
use std::time::Duration;

/// Default pause after each request to a rate-limited provider.
pub const DEFAULT_POLITE_DELAY: Duration = Duration::from_secs(5);

/// Default upper bound of the random extra pause.
pub const DEFAULT_POLITE_JITTER: Duration = Duration::from_secs(1);

/// Randomized pause inserted between requests to a rate-limited provider.
///
/// Each pause is `base + uniform(0, jitter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolitenessPolicy {
    pub base: Duration,
    pub jitter: Duration,
}

impl PolitenessPolicy {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// No pause at all.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn is_disabled(&self) -> bool {
        self.base.is_zero() && self.jitter.is_zero()
    }

    /// Draws the next pause.
    pub fn pause<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.jitter.is_zero() {
            return self.base;
        }
        self.base + self.jitter.mul_f64(rng.random::<f64>())
    }
}

impl Default for PolitenessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_POLITE_DELAY, DEFAULT_POLITE_JITTER)
    }
}
