//! The three batch fetchers: TLSC discovery, block economics, and contract balances.

use std::sync::Arc;

use dasm::{is_potentially_time_locked, BytecodeSource};
use rpc::{BlockId, RpcClient};
use storage::{Block, Contract, ContractInfo, Gateway};
use tokio::{sync::Semaphore, task::JoinSet};

use crate::error::InspectError;

/// Wei per whole native-token unit, matching the source system's own scaling.
const ETH_TO_WEI: f64 = 1e18;

fn decode_bytecode(address: &str, code: &str) -> Result<Vec<u8>, InspectError> {
    code.extract().map(|b| b.as_ref().to_vec()).map_err(|source| InspectError::MalformedBytecode {
        address: address.to_owned(),
        source,
    })
}

/// Scans blocks `[a, b)` for newly deployed time-locked candidate contracts, bounded-concurrent
/// across blocks via a semaphore, and bulk-inserts the result.
///
/// # Errors
/// Returns [`InspectError`] on the first unrecoverable RPC or database failure.
pub async fn tlsc_batch(
    rpc: &RpcClient,
    gateway: &Gateway,
    a: i64,
    b: i64,
    max_concurrency: usize,
) -> Result<(), InspectError> {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for block_number in a..b {
        let permit = Arc::clone(&semaphore).acquire_owned().await.expect("semaphore not closed");
        let rpc = rpc.clone();
        tasks.spawn(async move {
            let _permit = permit;
            fetch_tlsc_candidates(&rpc, block_number).await
        });
    }

    let mut contracts = Vec::new();
    while let Some(outcome) = tasks.join_next().await {
        contracts.extend(outcome??);
    }

    gateway.insert_contracts(&contracts).await?;
    Ok(())
}

async fn fetch_tlsc_candidates(
    rpc: &RpcClient,
    block_number: i64,
) -> Result<Vec<Contract>, InspectError> {
    let block = rpc.get_block(block_number as u64).await?;
    let mut discovered = Vec::new();

    for tx in &block.transactions {
        if tx.to_address.is_some() {
            continue;
        }

        let receipt = rpc.get_transaction_receipt(&tx.hash).await?;
        let Some(contract_address) = receipt.contract_address else {
            continue;
        };

        let code = rpc.get_code(&contract_address, BlockId::Number(block_number as u64)).await?;
        if code == "0x" {
            continue;
        }

        let bytes = decode_bytecode(&contract_address, &code)?;
        if !is_potentially_time_locked(&bytes) {
            continue;
        }

        discovered.push(Contract {
            contract_address,
            bytecode: code,
            from_address: tx.from_address.clone(),
            tx_hash: tx.hash.clone(),
            block_number,
        });
    }

    Ok(discovered)
}

/// Computes block economic summaries for `[a, b)`, detecting new largest-transaction records
/// against a snapshot of `contract_info_map()`, and bulk-writes blocks and info updates.
///
/// # Errors
/// Returns [`InspectError`] on the first unrecoverable RPC or database failure.
pub async fn block_economics_batch(
    rpc: &RpcClient,
    gateway: &Gateway,
    a: i64,
    b: i64,
) -> Result<(), InspectError> {
    let mut known = gateway.contract_info_map().await?;

    let base_fees = rpc
        .fee_history((b - a) as u64, (b - 1) as u64, &[2.0, 98.0])
        .await?
        .base_fees()?;

    let mut blocks = Vec::new();
    let mut updates = Vec::new();

    for (i, block_number) in (a..b).enumerate() {
        let block = rpc.get_block(block_number as u64).await?;
        let base_fee_per_gas = base_fees[i] as f64 / ETH_TO_WEI;

        let mut coinbase_transfer = 0.0;
        let mut transaction_fees = 0.0;
        let mut burnt_fees = 0.0;

        for tx in &block.transactions {
            let receipt = rpc.get_transaction_receipt(&tx.hash).await?;
            let gas_used = receipt.gas_used as f64;
            let transaction_value = tx.value as f64 / ETH_TO_WEI;

            transaction_fees += (receipt.effective_gas_price as f64 / ETH_TO_WEI) * gas_used;
            burnt_fees += base_fee_per_gas * gas_used;

            let contract_address = receipt
                .to
                .as_deref()
                .filter(|addr| known.contains_key(*addr))
                .or_else(|| Some(receipt.from_address.as_str()).filter(|addr| known.contains_key(*addr)));

            if let Some(address) = contract_address {
                let exceeds = known.get(address).copied().flatten().is_none_or(|current| transaction_value > current);
                if exceeds {
                    known.insert(address.to_owned(), Some(transaction_value));
                    updates.push(ContractInfo {
                        contract_address: address.to_owned(),
                        eth_balance: 0.0,
                        largest_tx_hash: Some(tx.hash.clone()),
                        largest_tx_block_number: Some(block_number),
                        largest_tx_value: Some(transaction_value),
                    });
                }
            }

            if receipt.to.as_deref() == Some(block.miner.as_str()) {
                coinbase_transfer += transaction_value;
            }
        }

        blocks.push(Block {
            block_number,
            miner_address: block.miner.clone(),
            coinbase_transfer,
            base_fee_per_gas,
            gas_fee: transaction_fees - burnt_fees,
            gas_used: block.gas_used as i64,
            gas_limit: block.gas_limit as i64,
        });
    }

    gateway.insert_blocks(&blocks).await?;
    gateway.update_contract_info(&updates).await?;
    Ok(())
}

/// Fetches current balances for `contracts`, skipping zero-balance addresses, and bulk-inserts
/// the rest as fresh [`ContractInfo`] rows awaiting their `largest_tx_*` fields.
///
/// # Errors
/// Returns [`InspectError`] on the first unrecoverable RPC or database failure.
pub async fn contract_info_batch(
    rpc: &RpcClient,
    gateway: &Gateway,
    contracts: &[String],
) -> Result<(), InspectError> {
    let mut rows = Vec::new();

    for address in contracts {
        let balance = rpc.get_balance(address, BlockId::Latest).await?;
        if balance == 0 {
            continue;
        }

        rows.push(ContractInfo {
            contract_address: address.clone(),
            eth_balance: balance as f64 / ETH_TO_WEI,
            largest_tx_hash: None,
            largest_tx_block_number: None,
            largest_tx_value: None,
        });
    }

    gateway.insert_contract_info(&rows).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use rpc::RpcClient;
    use wiremock::{matchers::body_partial_json, Mock, MockServer, ResponseTemplate};

    use super::*;

    fn rpc_result(value: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({"jsonrpc": "2.0", "id": 1, "result": value}))
    }

    async fn memory_gateway() -> Gateway {
        Gateway::connect("sqlite::memory:").await.expect("in-memory db opens")
    }

    #[tokio::test]
    async fn contract_info_batch_skips_zero_balances() {
        let server = MockServer::start().await;
        Mock::given(body_partial_json(serde_json::json!({"method": "eth_getBalance", "params": ["0xzero", "latest"]})))
            .respond_with(rpc_result(serde_json::Value::from("0x0")))
            .mount(&server)
            .await;
        Mock::given(body_partial_json(serde_json::json!({"method": "eth_getBalance", "params": ["0xfunded", "latest"]})))
            .respond_with(rpc_result(serde_json::Value::from("0xde0b6b3a7640000")))
            .mount(&server)
            .await;

        let rpc = RpcClient::new(server.uri()).unwrap();
        let gateway = memory_gateway().await;
        contract_info_batch(&rpc, &gateway, &["0xzero".to_owned(), "0xfunded".to_owned()]).await.unwrap();

        let map = gateway.contract_info_map().await.unwrap();
        assert!(!map.contains_key("0xzero"));
        assert!(map.contains_key("0xfunded"));
    }

    #[tokio::test]
    async fn tlsc_batch_records_only_time_locked_contract_creations() {
        let server = MockServer::start().await;

        Mock::given(body_partial_json(serde_json::json!({"method": "eth_getBlockByNumber"})))
            .respond_with(rpc_result(serde_json::json!({
                "miner": "0xminer",
                "gasUsed": "0x5208",
                "gasLimit": "0x1c9c380",
                "transactions": [
                    {"hash": "0xcreate", "from": "0xdeployer", "to": null, "value": "0x0"},
                    {"hash": "0xtransfer", "from": "0xa", "to": "0xb", "value": "0x1"},
                ],
            })))
            .mount(&server)
            .await;

        Mock::given(body_partial_json(serde_json::json!({"method": "eth_getTransactionReceipt", "params": ["0xcreate"]})))
            .respond_with(rpc_result(serde_json::json!({
                "contractAddress": "0xnewcontract",
                "from": "0xdeployer",
                "to": null,
                "gasUsed": "0x186a0",
                "effectiveGasPrice": "0x3b9aca00",
            })))
            .mount(&server)
            .await;

        Mock::given(body_partial_json(serde_json::json!({"method": "eth_getCode", "params": ["0xnewcontract", "0x64"]})))
            .respond_with(rpc_result(serde_json::Value::from("0x43")))
            .mount(&server)
            .await;

        let rpc = RpcClient::new(server.uri()).unwrap();
        let gateway = memory_gateway().await;
        tlsc_batch(&rpc, &gateway, 100, 101, 1).await.unwrap();

        let found = gateway.contracts_in_range(0, 1000).await.unwrap();
        assert_eq!(found, vec![(100, "0xnewcontract".to_owned())]);
    }

    #[tokio::test]
    async fn block_economics_batch_computes_gas_fee_as_tip_minus_burn() {
        let server = MockServer::start().await;

        Mock::given(body_partial_json(serde_json::json!({"method": "eth_feeHistory"})))
            .respond_with(rpc_result(serde_json::json!({"baseFeePerGas": ["0xde0b6b3a7640000"]})))
            .mount(&server)
            .await;

        Mock::given(body_partial_json(serde_json::json!({"method": "eth_getBlockByNumber"})))
            .respond_with(rpc_result(serde_json::json!({
                "miner": "0xminer",
                "gasUsed": "0x1",
                "gasLimit": "0x1c9c380",
                "transactions": [
                    {"hash": "0xtx", "from": "0xa", "to": "0xminer", "value": "0xde0b6b3a7640000"},
                ],
            })))
            .mount(&server)
            .await;

        Mock::given(body_partial_json(serde_json::json!({"method": "eth_getTransactionReceipt"})))
            .respond_with(rpc_result(serde_json::json!({
                "contractAddress": null,
                "from": "0xa",
                "to": "0xminer",
                "gasUsed": "0x1",
                "effectiveGasPrice": "0x1bc16d674ec80000",
            })))
            .mount(&server)
            .await;

        let rpc = RpcClient::new(server.uri()).unwrap();
        let gateway = memory_gateway().await;
        block_economics_batch(&rpc, &gateway, 100, 101).await.unwrap();

        let rows = gateway.blocks_in_range(0, 1000).await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];

        assert_eq!(row.block_number, 100);
        assert!(
            (row.coinbase_transfer - 1.0).abs() < 1e-9,
            "coinbase_transfer should equal the single tx's 1 ETH value"
        );
        assert!(
            (row.gas_fee - 1.0).abs() < 1e-9,
            "effective price 2 ETH/gas minus base fee 1 ETH/gas, over 1 gas unit"
        );
    }
}
