//! Retry with backoff and deadline enforcement for external calls
//!
//! Every search and generation call made by a research strategy goes through
//! [`Resilience::call`]. Each attempt races a deadline. Retryable failures
//! (`RateLimited`, `Transient`) are retried with exponential backoff,
//! preferring a server-advertised reset delay for rate limits.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use super::rate_limit::RateLimiter;
use crate::error::CallError;

/// Retry policy for failed external calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: usize,

    /// Delay after the first failed attempt
    #[serde(with = "humantime_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between attempts
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,

    /// Added on top of a server-advertised reset delay
    #[serde(with = "humantime_serde")]
    pub reset_padding: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            reset_padding: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    /// Set the delay after the first failure
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum backoff duration
    pub fn with_max_delay(mut self, max: Duration) -> Self {
        self.max_delay = max;
        self
    }

    /// Calculate the backoff after `attempt` failed attempts (1-based)
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as u32;
        let multiplier = 2u32.saturating_pow(exponent);
        self.initial_delay.saturating_mul(multiplier).min(self.max_delay)
    }

    /// Delay before the next attempt given the error that just happened
    pub fn delay_after(&self, attempt: usize, error: &CallError) -> Duration {
        match error.retry_after() {
            Some(hint) => hint + self.reset_padding,
            None => self.delay_for_attempt(attempt),
        }
    }

    /// Check if another attempt is allowed after `attempts` attempts
    pub fn should_retry(&self, attempts: usize) -> bool {
        attempts < self.max_attempts
    }

    /// Create a single-attempt policy
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}

/// Deadline + retry wrapper around asynchronous remote calls
///
/// Holds no mutable state, so one instance can be shared by every strategy
/// and chain of a run.
#[derive(Debug, Clone, Default)]
pub struct Resilience {
    policy: RetryPolicy,
}

impl Resilience {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `op` under the retry policy, each attempt bounded by `deadline`.
    ///
    /// When `limiter` is given, every attempt first waits for a slot on it.
    /// Limiter waits and backoff sleeps do not count against the deadline. An
    /// attempt that outlives it yields [`CallError::Timeout`], which is never
    /// retried.
    pub async fn call<T, F, Fut>(
        &self,
        operation: &str,
        deadline: Duration,
        limiter: Option<&RateLimiter>,
        mut op: F,
    ) -> Result<T, CallError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            if let Some(limiter) = limiter {
                limiter.acquire().await;
            }

            debug!(operation, attempt, "Calling external service");

            let error = match tokio::time::timeout(deadline, op()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => e,
                Err(_) => {
                    warn!(operation, attempt, deadline_ms = deadline.as_millis() as u64, "Call deadline elapsed");
                    return Err(CallError::Timeout {
                        operation: operation.to_string(),
                        after: deadline,
                    });
                }
            };

            if !error.is_retryable() {
                return Err(error);
            }

            if !self.policy.should_retry(attempt) {
                warn!(operation, attempts = attempt, error = %error, "Giving up after retries");
                return Err(CallError::MaxRetriesExceeded {
                    operation: operation.to_string(),
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = self.policy.delay_after(attempt, &error);
            warn!(
                operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retryable failure, backing off"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
