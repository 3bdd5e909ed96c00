//! RPC error kinds and their retry classification.

use thiserror::Error;

/// An error returned by a JSON-RPC call.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The underlying HTTP transport failed (connection reset, DNS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server responded with a non-2xx HTTP status that isn't a JSON-RPC error payload.
    #[error("http status {status}")]
    Http {
        /// The HTTP status code returned.
        status: u16,
    },

    /// The response body wasn't valid JSON, or didn't match the expected envelope shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The node returned a well-formed JSON-RPC error payload.
    #[error("rpc error {code}: {message}")]
    Application {
        /// The JSON-RPC error code.
        code: i64,
        /// The JSON-RPC error message.
        message: String,
    },

    /// A response that violated a data invariant the caller depends on (e.g. `fee_history`
    /// returning an empty array).
    #[error("data invariant violated: {0}")]
    DataInvariant(String),
}

/// Walks a transport error's source chain looking for a DNS resolution failure.
///
/// `reqwest::Error::is_connect()` is true for both "couldn't resolve the name" and "resolved
/// fine but the connection was refused/reset", and reqwest exposes no public way to tell these
/// apart. The underlying hyper connector's error `Display` does distinguish them, wording DNS
/// failures as "dns error: ...", so that's what this checks.
fn is_dns_failure(err: &reqwest::Error) -> bool {
    if !err.is_connect() {
        return false;
    }

    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(err) = cause {
        if err.to_string().to_ascii_lowercase().contains("dns") {
            return true;
        }
        cause = err.source();
    }
    false
}

impl RpcError {
    /// Returns `true` if this error represents a transient condition worth retrying with
    /// backoff: network failures (other than DNS resolution), 5xx responses, and HTTP 429 (rate
    /// limiting).
    ///
    /// Everything else — DNS resolution failures, 4xx (other than 429), malformed JSON, and
    /// in-band application errors — is treated as permanent for that call: a name that doesn't
    /// resolve won't resolve any differently on the next attempt, so the sub-batch fails
    /// immediately instead of burning the retry budget.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(err) => !err.is_builder() && !err.is_redirect() && !is_dns_failure(err),
            Self::Http { status } => *status == 429 || (500..600).contains(status),
            Self::Decode(_) | Self::Application { .. } | Self::DataInvariant(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_5xx_and_429_are_retryable() {
        assert!(RpcError::Http { status: 500 }.is_retryable());
        assert!(RpcError::Http { status: 429 }.is_retryable());
        assert!(!RpcError::Http { status: 404 }.is_retryable());
    }

    #[test]
    fn application_and_decode_errors_are_never_retryable() {
        assert!(!RpcError::Application { code: -32600, message: "bad request".into() }.is_retryable());
        assert!(!RpcError::DataInvariant("empty fee history".into()).is_retryable());
    }

    #[tokio::test]
    async fn dns_resolution_failures_are_not_retried() {
        // ".invalid" is reserved by RFC 2606 to never resolve, so this is a DNS failure on any
        // network (including one with no connectivity at all, which also fails to resolve it).
        let result = reqwest::Client::new().get("http://host.invalid/").send().await;
        let reqwest_err = result.expect_err("a reserved .invalid host must never resolve");
        assert!(reqwest_err.is_connect(), "expected a connect-phase failure, got {reqwest_err:?}");

        let err = RpcError::Transport(reqwest_err);
        assert!(!err.is_retryable(), "DNS resolution failures should fail the sub-batch immediately");
    }
}
