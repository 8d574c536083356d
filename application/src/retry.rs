//! Retry policy with exponential backoff and jitter.
//!
//! Applied once, at the position-generator boundary, so every role call gets
//! the same treatment:
//! - retryable gateway errors (unavailable, rate limited, timeout) are retried
//! - everything else fails immediately
//! - delays grow exponentially up to a cap, with full jitter

use crate::ports::llm_gateway::GatewayError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Bounded retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1)
    pub max_attempts: u32,
    /// Base delay for exponential backoff (in milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay cap (in milliseconds)
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 4000,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_delays(mut self, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self.max_delay_ms = max_delay_ms.max(base_delay_ms);
        self
    }

    /// Upper bound of the delay before retry number `attempt` (0-based).
    pub fn backoff_cap(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms))
    }

    /// Jittered delay in `[0, backoff_cap(attempt)]`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let cap = self.backoff_cap(attempt).as_millis() as u64;
        if cap == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=cap))
    }

    /// Run `op`, retrying retryable failures.
    pub async fn run<T, F, Fut>(&self, operation: &str, op: F) -> Result<T, GatewayError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, GatewayError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt + 1 < attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation = %operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Text generation failed, retrying: {}",
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy::default().with_delays(100, 1000);
        assert_eq!(policy.backoff_cap(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_cap(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_cap(3), Duration::from_millis(800));
        assert_eq!(policy.backoff_cap(4), Duration::from_millis(1000));
        assert_eq!(policy.backoff_cap(60), Duration::from_millis(1000));
    }

    #[test]
    fn test_delay_within_cap() {
        let policy = RetryPolicy::default().with_delays(50, 400);
        for attempt in 0..6 {
            assert!(policy.delay_for(attempt) <= policy.backoff_cap(attempt));
        }
        assert_eq!(RetryPolicy::none().delay_for(3), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_until_success() {
        let calls = Mutex::new(0u32);
        let policy = RetryPolicy::default().with_max_attempts(3);

        let result = policy
            .run("test", || {
                let attempt = {
                    let mut calls = calls.lock().unwrap();
                    *calls += 1;
                    *calls
                };
                async move {
                    if attempt < 3 {
                        Err(GatewayError::ServiceUnavailable("503".into()))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_attempts() {
        let calls = Mutex::new(0u32);
        let policy = RetryPolicy::default().with_max_attempts(2);

        let result: Result<(), _> = policy
            .run("test", || {
                *calls.lock().unwrap() += 1;
                async { Err(GatewayError::Timeout) }
            })
            .await;

        assert_eq!(result, Err(GatewayError::Timeout));
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = Mutex::new(0u32);
        let result: Result<(), _> = RetryPolicy::default()
            .run("test", || {
                *calls.lock().unwrap() += 1;
                async { Err(GatewayError::RequestFailed("401".into())) }
            })
            .await;

        assert!(matches!(result, Err(GatewayError::RequestFailed(_))));
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
