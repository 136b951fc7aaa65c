//! Retry with exponential back-off and jitter for external calls.
//!
//! Each client crate decides which of its errors are transient and hands a
//! classifier to [`retry_with_backoff`]. Non-retriable errors are returned
//! immediately.

use std::future::Future;
use std::time::Duration;

/// Upper bound on a single back-off sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// Bounded retry settings shared by every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Base delay; the n-th retry sleeps `backoff_base_ms * 2^(n-1)` ± 25 %.
    pub backoff_base_ms: u64,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    /// No retries at all.
    #[must_use]
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// Jittered delay before retry number `attempt` (1-based), capped at 60 s.
    fn delay_ms(&self, attempt: u32) -> u64 {
        let computed = self
            .backoff_base_ms
            .saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
        let capped = computed.min(MAX_DELAY_MS);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let jittered = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
        jittered
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1_000)
    }
}

/// Runs `operation`, retrying on errors for which `is_retriable` returns `true`.
///
/// `label` names the external call in the retry log line.
///
/// # Errors
///
/// Returns the first non-retriable error, or the last error once
/// `policy.max_retries` retries are exhausted.
pub async fn retry_with_backoff<T, E, F, Fut, C>(
    policy: RetryPolicy,
    label: &str,
    is_retriable: C,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = policy.delay_ms(attempt);
                tracing::warn!(
                    call = label,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
