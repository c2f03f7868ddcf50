//! Bounded retry with exponential backoff under a hard deadline.
//!
//! Every failed attempt `n` (1-based) waits `base_delay * 2^(n-1)` before the
//! next one. The deadline covers all attempts and backoff sleeps together;
//! once it passes, the pending attempt is dropped and nothing is retried.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Outcome of a policy run that did not succeed.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E> {
    /// The overall deadline elapsed. Never retried.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// Every attempt failed; carries the last failure.
    #[error("failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

impl<E> RetryError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RetryError::TimedOut(_))
    }
}

/// Retry, backoff and timeout settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failure; doubled after each further failure.
    pub base_delay: Duration,
    /// Wall-clock bound for the whole run.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::search()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, timeout: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), base_delay, timeout }
    }

    /// Policy for a full search: 4 attempts, 1s base delay, 45s deadline.
    pub fn search() -> Self {
        Self::new(4, Duration::from_secs(1), Duration::from_secs(45))
    }

    /// Backoff to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exp)
    }

    /// Run `operation` until it succeeds, attempts run out, or the deadline passes.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts.max(1);

        let attempts = async {
            let mut attempt = 0u32;
            loop {
                attempt += 1;
                match operation().await {
                    Ok(value) => return Ok(value),
                    Err(last) if attempt >= max_attempts => {
                        return Err(RetryError::Exhausted { attempts: attempt, last });
                    }
                    Err(e) => {
                        let delay = self.delay_for(attempt);
                        tracing::warn!(attempt, max_attempts, ?delay, "attempt failed, retrying: {}", e);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        };

        match tokio::time::timeout(self.timeout, attempts).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "operation timed out");
                Err(RetryError::TimedOut(self.timeout))
            }
        }
    }
}
