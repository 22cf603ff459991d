//! Exponential reconnect backoff
//!
//! The first delay of a cycle is free (`None`), later delays double up to a ceiling
//! and carry up to one second of jitter.

use std::time::Duration;

const BASE: u32 = 2;

/// Returned once a backoff cycle has used all of its attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Reconnect attempts exhausted after {attempts} attempts")]
pub struct BackoffExhausted {
    pub attempts: u32,
}

/// Exponential backoff with jitter and an optional attempt cap
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    max_attempts: Option<u32>,
    max_delay: Duration,
    attempt: u32,
    exponent: u32,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Some(5), Duration::from_secs(64))
    }
}

impl ExponentialBackoff {
    /// Create a backoff; `max_attempts = None` never exhausts
    #[must_use]
    pub fn new(max_attempts: Option<u32>, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            max_delay,
            attempt: 0,
            exponent: 0,
        }
    }

    /// Values handed out in the current cycle
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Next delay of the cycle
    ///
    /// `Ok(None)` means retry immediately. With `max_attempts = Some(n)` a cycle
    /// yields `n - 1` values before reporting exhaustion.
    pub fn next_delay(&mut self) -> Result<Option<Duration>, BackoffExhausted> {
        if self.attempt == 0 {
            self.attempt = 1;
            return Ok(None);
        }

        if let Some(max_attempts) = self.max_attempts {
            if self.attempt >= max_attempts.saturating_sub(1) {
                return Err(BackoffExhausted {
                    attempts: self.attempt,
                });
            }
        }

        let base = BASE
            .checked_pow(self.exponent)
            .map_or(self.max_delay, |secs| Duration::from_secs(u64::from(secs)));
        let delay = if base >= self.max_delay {
            self.max_delay
        } else {
            self.exponent += 1;
            base
        };
        self.attempt += 1;

        Ok(Some(delay + Duration::from_secs_f64(rand::random::<f64>())))
    }

    /// Sleep for the next delay and return it
    pub async fn delay(&mut self) -> Result<Option<Duration>, BackoffExhausted> {
        let delay = self.next_delay()?;
        if let Some(delay) = delay {
            tracing::info!(
                delay_ms = delay.as_millis() as u64,
                attempt = self.attempt,
                "Backing off"
            );
            tokio::time::sleep(delay).await;
        }
        Ok(delay)
    }

    /// Start a new cycle
    pub fn reset(&mut self) {
        self.attempt = 0;
        self.exponent = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_within(delay: Option<Duration>, low: u64) {
        let delay = delay.expect("expected a delay");
        assert!(delay >= Duration::from_secs(low), "{delay:?} below {low}s");
        assert!(delay < Duration::from_secs(low + 1), "{delay:?} above {}s", low + 1);
    }

    #[test]
    fn test_default_sequence() {
        let mut backoff = ExponentialBackoff::default();
        assert_eq!(backoff.next_delay().unwrap(), None);
        assert_within(backoff.next_delay().unwrap(), 1);
        assert_within(backoff.next_delay().unwrap(), 2);
        assert_within(backoff.next_delay().unwrap(), 4);
        assert_eq!(
            backoff.next_delay(),
            Err(BackoffExhausted { attempts: 4 })
        );
        // Stays exhausted until reset
        assert!(backoff.next_delay().is_err());
    }

    #[test]
    fn test_delay_is_capped() {
        let mut backoff = ExponentialBackoff::new(None, Duration::from_secs(4));
        assert_eq!(backoff.next_delay().unwrap(), None);
        assert_within(backoff.next_delay().unwrap(), 1);
        assert_within(backoff.next_delay().unwrap(), 2);
        assert_within(backoff.next_delay().unwrap(), 4);
        assert_within(backoff.next_delay().unwrap(), 4);
        assert_within(backoff.next_delay().unwrap(), 4);
    }

    #[test]
    fn test_unbounded_never_exhausts() {
        let mut backoff = ExponentialBackoff::new(None, Duration::from_secs(1));
        for _ in 0..100 {
            assert!(backoff.next_delay().is_ok());
        }
    }

    #[test]
    fn test_reset_restarts_cycle() {
        let mut backoff = ExponentialBackoff::default();
        for _ in 0..4 {
            backoff.next_delay().unwrap();
        }
        assert!(backoff.next_delay().is_err());

        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay().unwrap(), None);
        assert_within(backoff.next_delay().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_first_delay_does_not_sleep() {
        let mut backoff = ExponentialBackoff::default();
        let started = std::time::Instant::now();
        assert_eq!(backoff.delay().await.unwrap(), None);
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
