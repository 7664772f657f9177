//! Scheduler configuration.

use std::time::Duration;

use super::politeness::PolitenessPolicy;

/// Default number of simultaneous downloads.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default extra attempts for transient failures.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Delay before the first retry; doubles for each further attempt.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Settings for a [`super::FetchScheduler`].
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    concurrency: usize,
    request_timeout: Duration,
    max_retries: u32,
    retry_delay: Duration,
    politeness: PolitenessPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            politeness: PolitenessPolicy::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of simultaneous downloads (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_politeness(mut self, politeness: PolitenessPolicy) -> Self {
        self.politeness = politeness;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn politeness(&self) -> PolitenessPolicy {
        self.politeness
    }

    /// Backoff before retry number `attempt` (1-based).
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.retry_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.concurrency(), DEFAULT_CONCURRENCY);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_retries(), 2);
        assert_eq!(config.politeness(), PolitenessPolicy::default());
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        let config = SchedulerConfig::new().with_concurrency(0);
        assert_eq!(config.concurrency(), 1);
    }

    #[test]
    fn test_retry_delay_doubles() {
        let config = SchedulerConfig::new().with_retry_delay(Duration::from_millis(100));
        assert_eq!(config.retry_delay(1), Duration::from_millis(100));
        assert_eq!(config.retry_delay(2), Duration::from_millis(200));
        assert_eq!(config.retry_delay(3), Duration::from_millis(400));
    }
}
