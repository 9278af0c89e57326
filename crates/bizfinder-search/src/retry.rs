//! Retry policy for data-source retrieval.
//!
//! Failures are retried with exponential backoff until the attempt budget is
//! spent. Cancellation and malformed requests are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::error::SearchError;

/// How many times to try an operation and how long to wait in between.
///
/// The wait before retry `n` (1-based) is `base_delay * multiplier^(n-1)`,
/// so with the defaults the schedule is 5s, 10s, 20s, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never less than 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
            multiplier: 2,
        }
    }
}

/// The error left over after a retried operation gave up.
#[derive(Debug)]
pub struct RetryFailure {
    pub attempts: u32,
    pub last_error: SearchError,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, multiplier: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            multiplier: multiplier.max(1),
        }
    }

    /// Delay to wait before the given retry (1 = first retry).
    ///
    /// Saturates instead of overflowing on extreme configurations.
    #[must_use]
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1);
        let factor = self.multiplier.saturating_pow(exponent);
        self.base_delay.saturating_mul(factor)
    }

    /// The full sleep schedule between attempts, in order.
    #[must_use]
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts.max(1))
            .map(|retry| self.delay_before_retry(retry))
            .collect()
    }

    /// Runs `operation` until it succeeds, hits a non-retriable error, or the
    /// attempt budget is exhausted.
    ///
    /// Backoff sleeps end early if `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns a [`RetryFailure`] carrying the number of attempts made and the
    /// last error seen.
    pub async fn run<T, F, Fut>(
        &self,
        cancel: &CancelToken,
        mut operation: F,
    ) -> Result<T, RetryFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1u32;

        loop {
            if let Err(err) = cancel.check() {
                return Err(RetryFailure {
                    attempts: attempt - 1,
                    last_error: err,
                });
            }

            let err = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !is_retriable(&err) || attempt >= max_attempts {
                return Err(RetryFailure {
                    attempts: attempt,
                    last_error: err,
                });
            }

            let delay = self.delay_before_retry(attempt);
            tracing::warn!(
                attempt,
                max_attempts,
                delay_secs = delay.as_secs_f64(),
                error = %err,
                "data source attempt failed, retrying after backoff"
            );

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancel.cancelled() => {
                    return Err(RetryFailure {
                        attempts: attempt,
                        last_error: SearchError::Cancelled,
                    });
                }
            }
            attempt += 1;
        }
    }
}

/// Returns `false` for errors that another attempt cannot fix.
///
/// Client-side 4xx responses (other than 429) are not retried; everything
/// network- or server-shaped is.
fn is_retriable(err: &SearchError) -> bool {
    match err {
        SearchError::Cancelled
        | SearchError::InvalidRequest(_)
        | SearchError::InvalidUrl { .. } => false,
        SearchError::UnexpectedStatus { status, .. } => !(400..500).contains(status),
        _ => true,
    }
}
