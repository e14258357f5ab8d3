use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Bounded retry schedule with a linear delay of `base_delay * attempt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay slept after the given 1-based failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Every attempt of a labelled operation failed.
#[derive(Debug, thiserror::Error)]
#[error("{label} failed after {attempts} attempts: {source}")]
pub struct RetryExhausted<E>
where
    E: std::error::Error + 'static,
{
    pub label: String,
    pub attempts: u32,
    #[source]
    pub source: E,
}

/// Runs `operation` until it succeeds or the policy's attempt budget is spent.
///
/// Every error is treated as retryable. A policy with zero attempts still runs once.
pub async fn with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(label, attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if attempt >= max_attempts => {
                warn!(label, attempts = attempt, error = %error, "retry budget exhausted");
                return Err(RetryExhausted {
                    label: label.to_string(),
                    attempts: attempt,
                    source: error,
                });
            }
            Err(error) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    label,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
