//! Observation hooks for retried operations
//!
//! The retry engine and the bucket lister report through a [`RetryObserver`]
//! handed to them instead of logging to a fixed sink.

use std::time::Duration;

use crate::error::Error;

/// Receives retry and pagination events
///
/// All methods default to doing nothing.
pub trait RetryObserver: Send + Sync {
    /// A transient failure on `attempt` will be retried after `backoff`
    fn retrying(&self, _op: &str, _attempt: u32, _backoff: Duration, _error: &Error) {}

    /// The retry budget ran out; `error` is returned to the caller
    fn exhausted(&self, _op: &str, _attempts: u32, _error: &Error) {}

    /// A listing page was validated and its items committed
    fn page_committed(&self, _bucket: &str, _marker: &str, _items: usize, _truncated: bool) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn retrying(&self, op: &str, attempt: u32, backoff: Duration, error: &Error) {
        if matches!(error, Error::MalformedResponse(_)) {
            tracing::warn!(
                op,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %error,
                "Rejected response, retrying"
            );
        } else {
            tracing::debug!(
                op,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                error = %error,
                "Retrying after transient error"
            );
        }
    }

    fn exhausted(&self, op: &str, attempts: u32, error: &Error) {
        tracing::warn!(op, attempts, error = %error, "Giving up after transient errors");
    }

    fn page_committed(&self, bucket: &str, marker: &str, items: usize, truncated: bool) {
        tracing::trace!(bucket, marker, items, truncated, "Committed listing page");
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RetryObserver for NoopObserver {}
