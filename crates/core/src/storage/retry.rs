//! Bounded retries with exponential backoff for remote storage calls.

use std::future::Future;
use std::time::Duration;

use hub_shared::config::StorageTuning;
use tracing::warn;

use super::error::StorageError;

const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// How often and how patiently a remote operation is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Policy with `max_attempts` total attempts (at least one).
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: MAX_BACKOFF,
        }
    }

    /// Cap the delay between attempts.
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Total attempts, including the first.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out.
    ///
    /// A transport failure on the last attempt is returned as
    /// [`StorageError::NetworkFailure`] carrying the attempt count.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> Result<T, StorageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(StorageError::NetworkFailure { message, .. }) if attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %message,
                        "storage request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(StorageError::NetworkFailure { message, .. }) => {
                    return Err(StorageError::NetworkFailure {
                        attempts: attempt,
                        message,
                    });
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(StorageTuning::default())
    }
}

impl From<StorageTuning> for RetryPolicy {
    fn from(tuning: StorageTuning) -> Self {
        Self::new(tuning.max_attempts, tuning.retry_base_delay)
    }
}
