//! Bounded retry with a fixed delay.
//!
//! Request volume is low enough that exponential backoff and jitter buy
//! nothing here; the policy is a flat sleep between attempts, bounded by
//! `max_retries`. Only transient failures (see
//! [`UpstreamError::is_transient`]) consume extra attempts.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::upstream::UpstreamError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            // A policy that never attempts is useless; clamp to one try.
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Run `op` up to `policy.max_attempts` times.
///
/// Attempts are numbered from 1. The first success short-circuits. A failed
/// attempt is repeated only when the error is transient and attempts remain,
/// after sleeping exactly `policy.delay`. The last observed error is
/// returned unchanged.
pub async fn run_with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if attempt < policy.max_attempts && err.is_transient() {
            warn!(
                attempt,
                max_attempts = policy.max_attempts,
                delay_ms = policy.delay.as_millis() as u64,
                error = %err,
                "Transient upstream failure, retrying"
            );
            tokio::time::sleep(policy.delay).await;
        } else {
            return Err(err);
        }
    }
}
