//! Retry mechanism with backoff and cancellation
//!
//! Implements retry logic for transient failures like connection resets and
//! 503 responses. The error of the last attempt is the one returned.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{Backoff, RetryConfig};
use crate::error::{Error, Result};
use crate::observe::{RetryObserver, TracingObserver};

/// Retry a fallible async operation with backoff
///
/// Shorthand for [`Retry::new`] with the tracing observer and no cancellation.
///
/// # Example
/// ```ignore
/// let result = retry_with_backoff(
///     &config,
///     || async { client.stat(bucket, key).await },
///     is_retryable_error,
/// ).await;
/// ```
pub async fn retry_with_backoff<T, F, Fut, R>(
    config: &RetryConfig,
    operation: F,
    is_retryable: R,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
    R: Fn(&Error) -> bool,
{
    Retry::new(config)
        .run("operation", operation, is_retryable)
        .await
}

/// A configured retry loop
pub struct Retry<'a> {
    config: &'a RetryConfig,
    observer: &'a dyn RetryObserver,
    cancel: Option<&'a CancellationToken>,
}

impl<'a> Retry<'a> {
    pub fn new(config: &'a RetryConfig) -> Self {
        Self {
            config,
            observer: &TracingObserver,
            cancel: None,
        }
    }

    pub fn observer(mut self, observer: &'a dyn RetryObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Abort attempts and backoff sleeps once `token` is cancelled
    pub fn cancel_on(mut self, token: Option<&'a CancellationToken>) -> Self {
        self.cancel = token;
        self
    }

    /// Run `operation` until it succeeds, fails permanently, or the budget is spent
    ///
    /// `op` names the operation in observer events.
    pub async fn run<T, F, Fut, R>(&self, op: &str, mut operation: F, is_retryable: R) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
        R: Fn(&Error) -> bool,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome = tokio::select! {
                biased;
                _ = cancelled(self.cancel) => return Err(Error::Cancelled),
                outcome = operation() => outcome,
            };

            let e = match outcome {
                Ok(result) => return Ok(result),
                Err(e) => e,
            };

            if !is_retryable(&e) {
                return Err(e);
            }
            if attempt >= max_attempts {
                self.observer.exhausted(op, attempt, &e);
                return Err(e);
            }

            let backoff = calculate_backoff(self.config, attempt);
            self.observer.retrying(op, attempt, backoff, &e);

            tokio::select! {
                biased;
                _ = cancelled(self.cancel) => return Err(Error::Cancelled),
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }
}

async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Wait before the attempt following the `failed`-th failure
fn calculate_backoff(config: &RetryConfig, failed: u32) -> Duration {
    let base_ms = match config.backoff {
        Backoff::Linear => config.initial_backoff_ms.saturating_mul(u64::from(failed)),
        Backoff::Exponential => config
            .initial_backoff_ms
            .saturating_mul(1u64 << failed.saturating_sub(1).min(10)),
    };
    Duration::from_millis(base_ms.min(config.max_backoff_ms))
}

/// Check if an error is retryable (transient)
pub fn is_retryable_error(error: &Error) -> bool {
    error.is_transient()
}

/// Retry configuration builder for easy customization
#[derive(Debug, Clone)]
pub struct RetryBuilder {
    config: RetryConfig,
}

impl RetryBuilder {
    pub fn new() -> Self {
        Self {
            config: RetryConfig::default(),
        }
    }

    pub fn max_attempts(mut self, n: u32) -> Self {
        self.config.max_attempts = n;
        self
    }

    pub fn initial_backoff_ms(mut self, ms: u64) -> Self {
        self.config.initial_backoff_ms = ms;
        self
    }

    pub fn max_backoff_ms(mut self, ms: u64) -> Self {
        self.config.max_backoff_ms = ms;
        self
    }

    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.config.backoff = backoff;
        self
    }

    pub fn build(self) -> RetryConfig {
        self.config
    }
}

impl Default for RetryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
