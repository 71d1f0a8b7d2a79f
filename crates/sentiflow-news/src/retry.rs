//! Retry with exponential back-off and jitter for the NewsAPI client.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, HTTP 429, 5xx). API-level errors and
//! malformed bodies are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::NewsError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 429 and 5xx.
///
/// **Not retriable:** [`NewsError::ApiError`] (bad key, bad query, result
/// limit), [`NewsError::Deserialize`] and configuration errors.
pub(crate) fn is_retriable(err: &NewsError) -> bool {
    match err {
        NewsError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status()
                    .is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
        }
        NewsError::Transient { .. } => true,
        NewsError::ApiError { .. }
        | NewsError::Deserialize { .. }
        | NewsError::NoApiKeys
        | NewsError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// With `backoff_base_ms = 1_000` the sleeps before attempts 2, 3 and 4 are
/// 1 s, 2 s and 4 s, each with ±25 % jitter. Delay is capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, NewsError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NewsError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "NewsAPI transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
