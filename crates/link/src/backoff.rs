//! Reconnect timing.

use navglass_core::RetryConfig;
use std::time::Duration;

/// Exponential backoff between reconnect attempts.
///
/// Delays start at `initial_delay_ms` and double per consecutive failure,
/// capped at `max_delay_ms`. After `max_retries` consecutive failures no
/// further delay is handed out.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    initial: Duration,
    max: Duration,
    max_retries: u32,
    attempts: u32,
}

impl ReconnectBackoff {
    /// Create from retry settings
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            initial: Duration::from_millis(config.initial_delay_ms),
            max: Duration::from_millis(config.max_delay_ms),
            max_retries: config.max_retries,
            attempts: 0,
        }
    }

    /// Delay before the next attempt, or `None` once retries are exhausted
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_retries {
            return None;
        }

        let factor = 1u32.checked_shl(self.attempts).unwrap_or(u32::MAX);
        let delay = self.initial.saturating_mul(factor).min(self.max);
        self.attempts += 1;
        Some(delay)
    }

    /// Forget past failures after a successful connection
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Consecutive attempts handed out since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retry(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay_ms,
            max_delay_ms,
        }
    }

    #[test]
    fn test_doubles_and_caps() {
        let mut backoff = ReconnectBackoff::new(&retry(10, 1000, 5000));
        let delays: Vec<u64> = std::iter::from_fn(|| backoff.next_delay())
            .take(5)
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 5000, 5000]);
    }

    #[test]
    fn test_exhausts() {
        let mut backoff = ReconnectBackoff::new(&retry(2, 10, 100));
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert_eq!(backoff.next_delay(), None);
        assert_eq!(backoff.attempts(), 2);
    }

    #[test]
    fn test_reset() {
        let mut backoff = ReconnectBackoff::new(&retry(3, 100, 1000));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_large_attempt_counts_saturate() {
        let mut backoff = ReconnectBackoff::new(&retry(u32::MAX, 1000, 30000));
        for _ in 0..64 {
            assert!(backoff.next_delay().unwrap() <= Duration::from_millis(30000));
        }
    }
}
