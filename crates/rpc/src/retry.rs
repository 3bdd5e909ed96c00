//! Exponential-backoff retry wrapper around fallible RPC calls.

use std::time::Duration;

use backoff::{backoff::Backoff, ExponentialBackoff, ExponentialBackoffBuilder};

use crate::error::RpcError;

/// Builds the exponential-backoff policy used for every RPC call: a short initial interval,
/// a 2x multiplier, and a ceiling so a flapping endpoint doesn't stall a worker indefinitely.
fn policy() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(250))
        .with_multiplier(2.0)
        .with_max_interval(Duration::from_secs(10))
        .with_max_elapsed_time(Some(Duration::from_secs(60)))
        .build()
}

/// Runs `attempt` under exponential backoff, retrying only while
/// [`RpcError::is_retryable`] returns `true`.
///
/// The first attempt always runs immediately. A permanent error short-circuits the retry loop
/// and is returned to the caller unchanged.
pub async fn with_retry<T, F, Fut>(mut attempt: F) -> Result<T, RpcError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, RpcError>>,
{
    let mut backoff = policy();
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => match backoff.next_backoff() {
                Some(delay) => {
                    tracing::warn!(error = %err, delay_ms = delay.as_millis(), "retrying rpc call");
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::error!(error = %err, "rpc call exhausted retry budget");
                    return Err(err);
                }
            },
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test]
    async fn succeeds_without_retry_on_first_try() {
        let result: Result<u32, RpcError> = with_retry(|| async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let attempts = AtomicU32::new(0);
        let result = with_retry(|| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(RpcError::Http { status: 503 })
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, RpcError> = with_retry(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(RpcError::Application { code: -32600, message: "bad request".into() }) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
