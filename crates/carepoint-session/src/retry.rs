//! Retry with exponential back-off and jitter for profile lookups.
//!
//! [`retry_with_backoff`] wraps a fallible async operation, retries it on
//! transient errors (timeouts, connection failures, 5xx) and reports how
//! many attempts it made. Everything else is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::SessionError;

const MAX_DELAY_MS: u64 = 60_000;

/// Bounded retry schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based), before jitter.
    #[must_use]
    pub fn base_delay_ms(&self, retry: u32) -> u64 {
        let computed = self
            .backoff_base_ms
            .saturating_mul(1u64 << retry.saturating_sub(1).min(10));
        computed.min(MAX_DELAY_MS)
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// Timeouts, connection failures and HTTP 5xx are transient. Client errors,
/// malformed bodies and invalid input are not.
pub(crate) fn is_retriable(err: &SessionError) -> bool {
    match err {
        SessionError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        SessionError::InvalidUserId(_)
        | SessionError::Deserialize { .. }
        | SessionError::InvalidBaseUrl(_) => false,
    }
}

/// Runs `operation` with up to `policy.max_retries` additional attempts on
/// transient errors.
///
/// Back-off schedule with `backoff_base_ms = 2_000`:
///
/// | Retry | Sleep before it                  |
/// |-------|----------------------------------|
/// | 1     | 2 000 ms × 2⁰ ± 25 % jitter      |
/// | 2     | 2 000 ms × 2¹ ± 25 % jitter      |
/// | 3     | 2 000 ms × 2² ± 25 % jitter      |
///
/// Delay is capped at 60 s. Returns the final result together with the
/// number of attempts made.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> (Result<T, SessionError>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SessionError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return (Ok(value), attempt + 1),
            Err(err) => {
                if !is_retriable(&err) || attempt >= policy.max_retries {
                    return (Err(err), attempt + 1);
                }
                attempt += 1;
                let capped = policy.base_delay_ms(attempt);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms,
                    error = %err,
                    "profile lookup failed; retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
