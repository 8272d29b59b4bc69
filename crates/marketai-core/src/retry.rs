use std::fmt;
use std::future::Future;
use std::time::Duration;

use marketai_provider::InferenceError;
use thiserror::Error;
use tokio::time;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Errors the retry loop knows how to classify.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

impl Retryable for InferenceError {
    fn is_transient(&self) -> bool {
        InferenceError::is_transient(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError<E> {
    /// A non-retryable failure; returned on the attempt it happened.
    #[error("{0}")]
    Permanent(E),
    /// Every attempt failed transiently.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

/// Bounded exponential backoff: waits `initial_delay * 2^i` after the
/// i-th (0-based) transient failure, with no jitter and no total cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_INITIAL_DELAY)
    }
}

impl RetryPolicy {
    /// `max_attempts` below 1 is raised to 1.
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(attempt_index))
    }

    /// Total sleep when every attempt fails transiently.
    pub fn worst_case_delay(&self) -> Duration {
        (0..self.max_attempts - 1)
            .map(|i| self.delay_for(i))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Run `operation` until it succeeds, fails permanently, or runs out of
    /// attempts. The wait is an async sleep, so concurrent calls each keep
    /// their own timer.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + fmt::Display,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => {
                    tracing::warn!(attempt = attempt + 1, "permanent error, not retrying: {err}");
                    return Err(RetryError::Permanent(err));
                }
                Err(err) if attempt + 1 >= self.max_attempts => {
                    tracing::warn!(
                        attempts = self.max_attempts,
                        "transient error on final attempt, giving up: {err}"
                    );
                    return Err(RetryError::Exhausted {
                        attempts: self.max_attempts,
                        last: err,
                    });
                }
                Err(err) => {
                    let backoff = self.delay_for(attempt);
                    attempt += 1;
                    tracing::warn!(
                        "transient error (attempt {attempt}/{}), backing off {}ms: {err}",
                        self.max_attempts,
                        backoff.as_millis()
                    );
                    time::sleep(backoff).await;
                }
            }
        }
    }
}
