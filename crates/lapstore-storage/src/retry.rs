//! Retry with exponential back-off and jitter for storage requests.
//!
//! Only transient failures are retried (timeouts, connection errors, 429 and
//! 5xx responses). A 4xx such as a duplicate object name is returned at once.

use std::future::Future;
use std::time::Duration;

use crate::error::StorageError;

const MAX_DELAY_MS: u64 = 30_000;

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The wait before retry `n` is `backoff_base_ms * 2^(n-1)` with ±25 % jitter,
/// capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, StorageError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
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
                    "transient storage error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
