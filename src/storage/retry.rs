use std::fmt::Display;

use tokio::time::{sleep, Duration};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    max_retries: u32,
    initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(50),
        }
    }
}

impl RetryConfig {
    /// `max_retries` is the total number of attempts and is clamped to at least one.
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            initial_delay,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay after the `attempt`-th failure (1-based). Saturates instead of overflowing.
    pub fn backoff(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt.saturating_sub(1))
            .and_then(|factor| self.initial_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }
}

/// Runs `operation` until it succeeds or the attempts are used up, doubling
/// the delay after every failure. Returns the last error.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, operation: F) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempts = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if attempts >= config.max_retries {
                    return Err(e);
                }
                let delay = config.backoff(attempts);
                warn!(attempt = attempts, error = %e, "operation failed, retrying in {:?}", delay);
                sleep(delay).await;
            }
        }
    }
}
