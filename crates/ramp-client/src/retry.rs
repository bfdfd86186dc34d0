//! Backoff schedule for calls to the Ramp API.
//!
//! Rate limits (429), connection failures, timeouts and 5xx responses are
//! transient and get another attempt; everything else surfaces at once.

use crate::error::{RampError, RampResult};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_MAX_DELAY_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Extra attempts after the first call; `0` disables retrying.
    pub max_retries: u32,
    /// Wait before the first retry; doubled for each one after.
    pub base_delay_secs: u64,
    /// Upper bound on any single wait, `Retry-After` included.
    pub max_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1)
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, base_delay_secs: u64) -> Self {
        Self {
            max_retries,
            base_delay_secs,
            max_delay_secs: DEFAULT_MAX_DELAY_SECS,
        }
    }

    /// Single attempt, errors returned as-is.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// `attempt` counts from zero for the initial call.
    #[must_use]
    pub fn should_retry(&self, attempt: u32, error: &RampError) -> bool {
        attempt < self.max_retries && is_transient(error)
    }

    /// Server-provided `Retry-After` when present, else `base * 2^attempt`;
    /// both clamped to `max_delay_secs`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &RampError) -> Duration {
        let wanted = if let RampError::RateLimited {
            retry_after_secs: Some(secs),
        } = error
        {
            *secs
        } else {
            2u64.checked_pow(attempt)
                .map_or(u64::MAX, |factor| self.base_delay_secs.saturating_mul(factor))
        };
        Duration::from_secs(wanted.min(self.max_delay_secs))
    }

    /// Drive `call` under this policy.
    ///
    /// A transient failure that outlives the budget comes back as
    /// [`RampError::MaxRetriesExceeded`]; with retries disabled the original
    /// error is returned untouched.
    pub async fn execute<F, Fut, T>(&self, label: &str, mut call: F) -> RampResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RampResult<T>>,
    {
        let mut attempt = 0u32;
        let error = loop {
            let error = match call().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(request = label, retries = attempt, "Ramp request recovered");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !self.should_retry(attempt, &error) {
                break error;
            }

            let wait = self.delay_for(attempt, &error);
            attempt += 1;
            debug!(
                request = label,
                retry = attempt,
                of = self.max_retries,
                wait_secs = wait.as_secs(),
                error = %error,
                "Transient Ramp failure, backing off"
            );
            tokio::time::sleep(wait).await;
        };

        if self.max_retries == 0 || !is_transient(&error) {
            return Err(error);
        }

        let attempts = attempt + 1;
        warn!(request = label, attempts, error = %error, "Giving up on Ramp request");
        Err(RampError::MaxRetriesExceeded {
            attempts,
            message: format!("{label}: {error}"),
        })
    }
}

fn is_transient(error: &RampError) -> bool {
    error.is_retryable() || error.is_server_error()
}
