//! Retry with exponential back-off and jitter for the search API client.
//!
//! Network failures, 429 and 5xx responses are retried. A rejected API key,
//! other 4xx statuses and malformed bodies are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::IngestError;

pub(crate) fn is_retriable(err: &IngestError) -> bool {
    match err {
        IngestError::Http(_) | IngestError::RateLimited { .. } => true,
        IngestError::UnexpectedStatus { status, .. } => *status >= 500,
        _ => false,
    }
}

const MAX_DELAY_MS: u64 = 60_000;

/// Wait before retry `attempt` (1-based): `backoff_base_ms * 2^(attempt-1)`
/// scaled by `jitter`, never shorter than a rate limit's `Retry-After`, and
/// capped at 60 s.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn retry_delay_ms(err: &IngestError, attempt: u32, backoff_base_ms: u64, jitter: f64) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(10));
    let backoff = (computed.min(MAX_DELAY_MS) as f64 * jitter) as u64;
    let server_hint = match err {
        IngestError::RateLimited { retry_after_secs } => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    backoff.max(server_hint).min(MAX_DELAY_MS)
}

/// Runs `operation` with up to `max_retries` additional attempts on
/// transient errors.
///
/// Back-off doubles per attempt with ±25 % jitter; see [`retry_delay_ms`].
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, IngestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, IngestError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let jitter = rand::random::<f64>() * 0.5 + 0.75;
                let delay_ms = retry_delay_ms(&err, attempt, backoff_base_ms, jitter);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "search API transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
