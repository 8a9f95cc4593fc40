//! # Retry Policy & Run-Level Errors
//!
//! Exceptions never cross a stage boundary as control flow — every
//! fallible call resolves to an ordinary `Result`, surfaced via
//! `retry_with_backoff`: the single knob (`OPERATION_RETRIES`) for
//! transient RPC/HTTP errors.

use std::time::Duration;
use thiserror::Error;

/// Number of attempts for any retried I/O operation (chain RPC, external
/// API call). Bounds both total attempts and, combined with the backoff
/// schedule, total wall time.
pub const OPERATION_RETRIES: u32 = 3;

/// Base delay for the exponential backoff schedule used by
/// `retry_with_backoff`.
const BASE_BACKOFF: Duration = Duration::from_millis(200);

/// Run-fatal and per-provider transient errors. Per-request errors are `RequestErrorCode`, not this type.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// A chain RPC call did not succeed within `OPERATION_RETRIES` attempts.
    #[error("chain RPC failed after {attempts} attempts: {reason}")]
    ChainRpcExhausted {
        /// Attempts actually made.
        attempts: u32,
        /// Underlying failure reason.
        reason: String,
    },

    /// The master HDNode could not be derived; this is run-fatal.
    #[error("failed to derive master HDNode: {0}")]
    MasterKeyDerivationFailed(String),

    /// Configuration was malformed in a way that admits no resolution;
    /// run-fatal.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Retry an async operation up to `OPERATION_RETRIES` times with
/// exponential backoff, surfacing the last error as a value rather than
/// propagating an exception out of the calling stage (the `go` idiom).
/// Does not retry per-request semantic errors (decoding, authorization) —
/// only the I/O-shaped failures this helper's `Fut` wraps.
pub async fn retry_with_backoff<T, E, F, Fut>(mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= OPERATION_RETRIES {
                    return Err(err);
                }
                let backoff = BASE_BACKOFF * 2u32.pow(attempt - 1);
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_without_retry_on_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &'static str> = retry_with_backoff(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(7) }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_up_to_the_configured_limit_then_surfaces_the_error() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &'static str> = retry_with_backoff(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("transient") }
        })
        .await;
        assert_eq!(result.unwrap_err(), "transient");
        assert_eq!(calls.load(Ordering::SeqCst), OPERATION_RETRIES);
    }

    #[tokio::test]
    async fn recovers_after_a_transient_failure() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &'static str> = retry_with_backoff(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n == 0 { Err("first try fails") } else { Ok(42) } }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }
}
