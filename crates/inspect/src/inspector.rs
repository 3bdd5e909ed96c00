//! The generic inspector loop: resume, partition, bound concurrency, dispatch, join.

use std::sync::Arc;

use rpc::RpcClient;
use storage::Gateway;
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, info, warn};

use crate::{batch, error::InspectError};

/// Sub-batch size defaults, matching the source system's own tuning.
pub const DEFAULT_BLOCK_BATCH_SIZE: i64 = 20;
/// Default contract sub-batch size.
pub const DEFAULT_CONTRACT_BATCH_SIZE: usize = 50;
/// Default cap on simultaneous in-flight sub-batches per inspector.
pub const DEFAULT_MAX_CONCURRENCY: usize = 1;

/// The unit of work an [`Inspector`] dispatches: either a contiguous block range or an explicit
/// list of contract addresses.
#[derive(Debug, Clone)]
pub enum TaskSpec {
    /// Inspect blocks in `[a, b)`.
    BlockRange {
        /// Inclusive lower bound.
        a: i64,
        /// Exclusive upper bound.
        b: i64,
    },
    /// Inspect this explicit list of contract addresses.
    ContractList(Vec<String>),
}

/// Which batch fetcher an [`Inspector`] drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorKind {
    /// Discover newly deployed time-locked-candidate contracts.
    Tlsc,
    /// Compute per-block economic summaries.
    Block,
    /// Record contract balances.
    Contract,
}

/// The lifecycle of one dispatched sub-batch, logged at every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubBatchState {
    Running,
    Committed,
    Failed,
    Cancelled,
}

/// Drives one inspector kind over one task specification, against one RPC endpoint and one
/// database session.
///
/// This is the unit that runs inside a single worker process: one `Inspector`, one
/// [`RpcClient`], one [`Gateway`], bounding its own concurrency with an internal semaphore.
pub struct Inspector {
    kind: InspectorKind,
    rpc: RpcClient,
    gateway: Gateway,
    block_batch_size: i64,
    contract_batch_size: usize,
    max_concurrency: usize,
}

impl Inspector {
    /// Builds an inspector for `kind`, bound to `rpc` and `gateway`, using the default batch
    /// sizes and concurrency cap.
    #[must_use]
    pub fn new(kind: InspectorKind, rpc: RpcClient, gateway: Gateway) -> Self {
        Self {
            kind,
            rpc,
            gateway,
            block_batch_size: DEFAULT_BLOCK_BATCH_SIZE,
            contract_batch_size: DEFAULT_CONTRACT_BATCH_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Overrides the default sub-batch sizes.
    #[must_use]
    pub fn with_batch_sizes(mut self, block_batch_size: i64, contract_batch_size: usize) -> Self {
        self.block_batch_size = block_batch_size;
        self.contract_batch_size = contract_batch_size;
        self
    }

    /// Overrides the default cap on simultaneous in-flight sub-batches.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Runs this inspector over `task`, partitioning it into sub-batches, dispatching them under
    /// the configured concurrency cap, and awaiting them all.
    ///
    /// A sub-batch failure is logged and returned to the caller; other already-dispatched
    /// sub-batches are still allowed to finish (their successful writes remain committed), but
    /// the overall run is reported as failed so the worker process exits non-zero.
    ///
    /// # Errors
    /// Returns the first [`InspectError`] encountered; the sub-batch that raised it has been
    /// logged as `FAILED` before this returns.
    pub async fn run(&self, task: TaskSpec) -> Result<(), InspectError> {
        match (&self.kind, task) {
            (InspectorKind::Tlsc, TaskSpec::BlockRange { a, b }) => self.run_block_batches(a, b, InspectorKind::Tlsc).await,
            (InspectorKind::Block, TaskSpec::BlockRange { a, b }) => self.run_block_batches(a, b, InspectorKind::Block).await,
            (InspectorKind::Contract, TaskSpec::ContractList(addresses)) => {
                self.run_contract_batches(addresses).await
            }
            (kind, task) => panic!("inspector kind {kind:?} is incompatible with task {task:?}"),
        }
    }

    /// Applies the resume check: looks up the last block already written below `b`, and if it
    /// exceeds `a`, advances the starting point past it.
    ///
    /// `Tlsc` and `Block` inspectors checkpoint against different tables (discovered contracts
    /// vs. economic summaries), so the lookup is dispatched on `self.kind`.
    ///
    /// # Errors
    /// Returns [`InspectError`] on a database failure.
    pub async fn resume_from(&self, a: i64, b: i64) -> Result<i64, InspectError> {
        let last = match self.kind {
            InspectorKind::Tlsc => self.gateway.last_written_contract_block(b).await?,
            InspectorKind::Block => self.gateway.last_written_block(b).await?,
            InspectorKind::Contract => None,
        };

        match last {
            Some(last) if last > a => Ok(last + 1),
            _ => Ok(a),
        }
    }

    async fn run_block_batches(
        &self,
        a: i64,
        b: i64,
        kind: InspectorKind,
    ) -> Result<(), InspectError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        let mut start = a;
        while start < b {
            let end = (start + self.block_batch_size).min(b);
            let permit = Arc::clone(&semaphore).acquire_owned().await.expect("semaphore not closed");
            let rpc = self.rpc.clone();
            let gateway = self.gateway.clone();
            let max_concurrency = self.max_concurrency;

            tasks.spawn(async move {
                let _permit = permit;
                debug!(start, end, state = ?SubBatchState::Running, "sub-batch running");
                let outcome = match kind {
                    InspectorKind::Tlsc => {
                        batch::tlsc_batch(&rpc, &gateway, start, end, max_concurrency).await
                    }
                    InspectorKind::Block => {
                        batch::block_economics_batch(&rpc, &gateway, start, end).await
                    }
                    InspectorKind::Contract => unreachable!("contract kind has no block sub-batches"),
                };
                (start, end, outcome)
            });

            start = end;
        }

        self.join_all(tasks).await
    }

    async fn run_contract_batches(&self, addresses: Vec<String>) -> Result<(), InspectError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for chunk in addresses.chunks(self.contract_batch_size) {
            let chunk = chunk.to_vec();
            let permit = Arc::clone(&semaphore).acquire_owned().await.expect("semaphore not closed");
            let rpc = self.rpc.clone();
            let gateway = self.gateway.clone();

            tasks.spawn(async move {
                let _permit = permit;
                debug!(size = chunk.len(), state = ?SubBatchState::Running, "sub-batch running");
                let outcome = batch::contract_info_batch(&rpc, &gateway, &chunk).await;
                (0i64, chunk.len() as i64, outcome)
            });
        }

        self.join_all(tasks).await
    }

    async fn join_all(
        &self,
        mut tasks: JoinSet<(i64, i64, Result<(), InspectError>)>,
    ) -> Result<(), InspectError> {
        let mut first_error = None;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((start, end, Ok(()))) => {
                    info!(start, end, state = ?SubBatchState::Committed, "sub-batch committed");
                }
                Ok((start, end, Err(err))) => {
                    warn!(start, end, state = ?SubBatchState::Failed, error = %err, "sub-batch failed");
                    first_error.get_or_insert(err);
                }
                Err(join_err) if join_err.is_cancelled() => {
                    warn!(state = ?SubBatchState::Cancelled, "sub-batch cancelled");
                }
                Err(join_err) => {
                    warn!(error = %join_err, "sub-batch task panicked");
                    first_error.get_or_insert(InspectError::Join(join_err));
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use rpc::RpcClient;
    use wiremock::{matchers::body_partial_json, Mock, MockServer, ResponseTemplate};

    use super::*;

    async fn memory_gateway() -> Gateway {
        Gateway::connect("sqlite::memory:").await.expect("in-memory db opens")
    }

    fn rpc_result(value: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": value}))
    }

    #[tokio::test]
    async fn resume_from_returns_the_requested_start_when_nothing_is_written() {
        let rpc = RpcClient::new("http://127.0.0.1:1").unwrap();
        let gateway = memory_gateway().await;
        let inspector = Inspector::new(InspectorKind::Block, rpc, gateway);

        assert_eq!(inspector.resume_from(500, 600).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn resume_from_skips_past_already_written_blocks_within_the_requested_range() {
        let rpc = RpcClient::new("http://127.0.0.1:1").unwrap();
        let gateway = memory_gateway().await;
        gateway
            .insert_blocks(&[storage::Block {
                block_number: 499,
                miner_address: "0xminer".to_owned(),
                coinbase_transfer: 0.0,
                base_fee_per_gas: 1.0,
                gas_fee: 0.1,
                gas_used: 21000,
                gas_limit: 30_000_000,
            }])
            .await
            .unwrap();
        let inspector = Inspector::new(InspectorKind::Block, rpc, gateway);

        // 499 < b=600 and 499 > a=400, so the resumed start must skip past the written block.
        assert_eq!(inspector.resume_from(400, 600).await.unwrap(), 500);
        // 499 is not strictly past a=500, so there is nothing to skip.
        assert_eq!(inspector.resume_from(500, 600).await.unwrap(), 500);
        // The written block falls outside [a, b) entirely (b=450 excludes it), so it must not
        // affect the resumed start at all.
        assert_eq!(inspector.resume_from(400, 450).await.unwrap(), 400);
    }

    #[tokio::test]
    async fn resume_from_checkpoints_tlsc_inspectors_against_discovered_contracts() {
        let rpc = RpcClient::new("http://127.0.0.1:1").unwrap();
        let gateway = memory_gateway().await;
        gateway
            .insert_contracts(&[storage::Contract {
                contract_address: "0xabc".to_owned(),
                bytecode: "0x43".to_owned(),
                from_address: "0xdeployer".to_owned(),
                tx_hash: "0xtx".to_owned(),
                block_number: 499,
            }])
            .await
            .unwrap();
        let inspector = Inspector::new(InspectorKind::Tlsc, rpc, gateway);

        assert_eq!(inspector.resume_from(400, 600).await.unwrap(), 500);
    }

    #[tokio::test]
    async fn contract_inspector_run_records_every_nonzero_balance_across_batches() {
        let server = MockServer::start().await;
        Mock::given(body_partial_json(serde_json::json!({"method": "eth_getBalance"})))
            .respond_with(rpc_result(serde_json::Value::from("0x1")))
            .mount(&server)
            .await;

        let rpc = RpcClient::new(server.uri()).unwrap();
        let gateway = memory_gateway().await;
        let inspector = Inspector::new(InspectorKind::Contract, rpc, gateway.clone())
            .with_batch_sizes(DEFAULT_BLOCK_BATCH_SIZE, 2)
            .with_max_concurrency(2);

        let addresses: Vec<String> = (0..5).map(|i| format!("0xaddr{i}")).collect();
        inspector.run(TaskSpec::ContractList(addresses)).await.unwrap();

        let map = gateway.contract_info_map().await.unwrap();
        assert_eq!(map.len(), 5);
    }
}
