//! Retry policy: attempt ceiling and capped exponential backoff

use crate::config::schema::FetchConfig;
use std::time::Duration;

/// How a response status is treated by the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 2xx
    Success,
    /// Worth another attempt (5xx, 408, 429)
    Transient,
    /// Retrying cannot help, or classification is switched off
    Final,
}

/// Attempt ceiling and backoff curve for remote reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
    /// Retry transient HTTP statuses instead of returning them at once
    pub retry_server_errors: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            min_delay: Duration::from_secs(config.backoff_min_secs),
            max_delay: Duration::from_secs(config.backoff_max_secs),
            retry_server_errors: config.retry_server_errors,
        }
    }

    /// Wait after the given failed attempt (1-based)
    ///
    /// One second doubled per attempt, clamped to `[min_delay, max_delay]`:
    /// with the defaults the waits are 2s, 2s, 4s, 8s, 10s, 10s...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let raw = Duration::from_secs(2u64.saturating_pow(exponent));
        raw.clamp(self.min_delay, self.max_delay.max(self.min_delay))
    }

    /// Classify an HTTP status under this policy
    pub fn classify(&self, status: u16) -> StatusClass {
        if (200..300).contains(&status) {
            return StatusClass::Success;
        }
        if !self.retry_server_errors {
            return StatusClass::Final;
        }
        match status {
            408 | 429 | 500..=599 => StatusClass::Transient,
            _ => StatusClass::Final,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backoff_curve() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=6).map(|n| policy.delay_after(n).as_secs()).collect();
        assert_eq!(delays, vec![2, 2, 4, 8, 10, 10]);
    }

    #[test]
    fn huge_attempt_numbers_stay_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(200), Duration::from_secs(10));
    }

    #[test]
    fn permissive_classification_never_retries_statuses() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.classify(200), StatusClass::Success);
        assert_eq!(policy.classify(503), StatusClass::Final);
        assert_eq!(policy.classify(404), StatusClass::Final);
    }

    #[test]
    fn strict_classification_separates_transient_from_permanent() {
        let policy = RetryPolicy {
            retry_server_errors: true,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.classify(503), StatusClass::Transient);
        assert_eq!(policy.classify(429), StatusClass::Transient);
        assert_eq!(policy.classify(404), StatusClass::Final);
        assert_eq!(policy.classify(204), StatusClass::Success);
    }
}
