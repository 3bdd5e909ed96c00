//! A thin async JSON-RPC 2.0 client for the handful of `eth_*` calls this system needs.

use std::time::Duration;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::RpcError,
    methods::{Block, BlockId, BlockIdHex, FeeHistory, TransactionReceipt},
    retry::with_retry,
};

/// Default per-call timeout for batch work (block/receipt/balance fetches). Configurable via
/// [`RpcClient::with_timeout`]; the liveness probe used by the out-of-scope host ranker needs a
/// much shorter timeout (~2s) and is expected to build its own client with one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(500);

#[derive(Serialize)]
struct Envelope<'a, P> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct Response<T> {
    result: Option<T>,
    error: Option<ResponseError>,
}

#[derive(Deserialize)]
struct ResponseError {
    code: i64,
    message: String,
}

/// A JSON-RPC client bound to a single endpoint.
///
/// One `RpcClient` is created per worker process and reused across every call that worker
/// makes; it holds its own [`reqwest::Client`] connection pool.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RpcClient {
    /// Builds a client targeting `endpoint`, with the default per-call timeout
    /// ([`DEFAULT_TIMEOUT`]).
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client fails to build (e.g. TLS backend
    /// initialization failure).
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RpcError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Builds a client targeting `endpoint`, with an explicit per-call timeout.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client fails to build (e.g. TLS backend
    /// initialization failure).
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint: endpoint.into() })
    }

    /// Issues a single JSON-RPC call, retrying transient failures with exponential backoff.
    async fn call<P, T>(&self, method: &str, params: P) -> Result<T, RpcError>
    where
        P: Serialize + Clone,
        T: DeserializeOwned,
    {
        with_retry(|| async {
            let envelope = Envelope { jsonrpc: "2.0", id: 1, method, params: params.clone() };
            let http_response = self.http.post(&self.endpoint).json(&envelope).send().await?;
            let status = http_response.status();
            if !status.is_success() {
                return Err(RpcError::Http { status: status.as_u16() });
            }
            let body: Value = http_response.json().await?;
            let response: Response<T> = serde_json::from_value(body)?;
            if let Some(error) = response.error {
                return Err(RpcError::Application { code: error.code, message: error.message });
            }
            response.result.ok_or_else(|| {
                RpcError::DataInvariant(format!("{method} returned neither result nor error"))
            })
        })
        .await
    }

    /// Fetches a block with full transaction objects, as `eth_getBlockByNumber(number, true)`.
    ///
    /// # Errors
    /// Returns [`RpcError`] on transport failure, a non-2xx status, a malformed response, or a
    /// `null` result (unknown block).
    pub async fn get_block(&self, number: u64) -> Result<Block, RpcError> {
        self.call("eth_getBlockByNumber", (BlockIdHex(BlockId::Number(number)), true)).await
    }

    /// Fetches a transaction's receipt, as `eth_getTransactionReceipt(hash)`.
    ///
    /// # Errors
    /// Returns [`RpcError`] on transport failure, a non-2xx status, or a malformed response.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: &str,
    ) -> Result<TransactionReceipt, RpcError> {
        self.call("eth_getTransactionReceipt", (tx_hash,)).await
    }

    /// Fetches the deployed bytecode at `address` as of `block`, as `eth_getCode(address, block)`.
    ///
    /// # Errors
    /// Returns [`RpcError`] on transport failure, a non-2xx status, or a malformed response.
    pub async fn get_code(&self, address: &str, block: BlockId) -> Result<String, RpcError> {
        self.call("eth_getCode", (address, BlockIdHex(block))).await
    }

    /// Fetches the number of transactions sent from `address`, as
    /// `eth_getTransactionCount(address, block)`.
    ///
    /// # Errors
    /// Returns [`RpcError`] on transport failure, a non-2xx status, or a malformed response.
    pub async fn get_transaction_count(
        &self,
        address: &str,
        block: BlockId,
    ) -> Result<u128, RpcError> {
        let raw: String = self.call("eth_getTransactionCount", (address, BlockIdHex(block))).await?;
        crate::methods::parse_quantity(&raw)
    }

    /// Fetches `address`'s wei balance as of `block`, as `eth_getBalance(address, block)`.
    ///
    /// # Errors
    /// Returns [`RpcError`] on transport failure, a non-2xx status, or a malformed response.
    pub async fn get_balance(&self, address: &str, block: BlockId) -> Result<u128, RpcError> {
        let raw: String = self.call("eth_getBalance", (address, BlockIdHex(block))).await?;
        crate::methods::parse_quantity(&raw)
    }

    /// Fetches base fees for `block_count` blocks ending at `newest_block`, as
    /// `eth_feeHistory(block_count, newest_block, reward_percentiles)`.
    ///
    /// # Errors
    /// Returns [`RpcError`] on transport failure, a non-2xx status, a malformed response, or an
    /// empty `baseFeePerGas` array.
    pub async fn fee_history(
        &self,
        block_count: u64,
        newest_block: u64,
        reward_percentiles: &[f64],
    ) -> Result<FeeHistory, RpcError> {
        self.call(
            "eth_feeHistory",
            (
                format!("0x{block_count:x}"),
                BlockIdHex(BlockId::Number(newest_block)),
                reward_percentiles.to_vec(),
            ),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn ok_body(result: Value) -> Value {
        serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": result})
    }

    #[tokio::test]
    async fn get_balance_decodes_a_quantity_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(Value::from("0x2386f26fc10000"))))
            .mount(&server)
            .await;

        let client = RpcClient::new(server.uri()).unwrap();
        let balance = client.get_balance("0xabc", BlockId::Latest).await.unwrap();
        assert_eq!(balance, 0x2386f26fc10000);
    }

    #[tokio::test]
    async fn application_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "method not found"}}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = RpcClient::new(server.uri()).unwrap();
        let err = client.get_balance("0xabc", BlockId::Latest).await.unwrap_err();
        assert!(matches!(err, RpcError::Application { code: -32601, .. }));
    }

    #[tokio::test]
    async fn transient_http_failure_is_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(Value::from("0x0"))))
            .mount(&server)
            .await;

        let client = RpcClient::new(server.uri()).unwrap();
        let balance = client.get_balance("0xabc", BlockId::Latest).await.unwrap();
        assert_eq!(balance, 0);
    }

    #[tokio::test]
    async fn get_code_sends_block_number_as_a_hex_quantity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_body(Value::from("0x6001"))))
            .mount(&server)
            .await;

        let client = RpcClient::new(server.uri()).unwrap();
        let code = client.get_code("0xabc", BlockId::Number(19)).await.unwrap();
        assert_eq!(code, "0x6001");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["params"][1], "0x13");
    }
}
