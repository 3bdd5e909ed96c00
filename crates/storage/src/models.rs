//! Row types stored by the persistence gateway.

use sqlx::FromRow;

/// A discovered time-locked-candidate contract.
///
/// Created once, at discovery, and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Contract {
    /// The contract's address, hex-encoded. Primary key.
    pub contract_address: String,
    /// The contract's deployed bytecode, hex-encoded.
    pub bytecode: String,
    /// The address that sent the deployment transaction.
    pub from_address: String,
    /// The hash of the deployment transaction.
    pub tx_hash: String,
    /// The block the contract was deployed in.
    pub block_number: i64,
}

/// An economic projection for a [`Contract`], keyed by the same address.
///
/// `largest_tx_*` is mutated monotonically: a later write only ever increases
/// `largest_tx_value`, never decreases it.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ContractInfo {
    /// References [`Contract::contract_address`].
    pub contract_address: String,
    /// The contract's native-token balance, in whole units (not wei).
    pub eth_balance: f64,
    /// The hash of the largest-value transaction observed touching this contract, if any.
    pub largest_tx_hash: Option<String>,
    /// The block number of the largest-value transaction observed, if any.
    pub largest_tx_block_number: Option<i64>,
    /// The value of the largest transaction observed, in whole native-token units, if any.
    pub largest_tx_value: Option<f64>,
}

/// An economic summary for a single block.
///
/// Created at most once per block number; re-runs are idempotent on insert conflict.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Block {
    /// The block's number. Primary key.
    pub block_number: i64,
    /// The block's miner (coinbase) address.
    pub miner_address: String,
    /// Sum of transaction values sent directly to the miner address within this block.
    pub coinbase_transfer: f64,
    /// The block's EIP-1559 base fee per gas, in whole native-token units.
    pub base_fee_per_gas: f64,
    /// Total priority fee paid to the miner: `transaction_fees - burnt_fees`.
    pub gas_fee: f64,
    /// Total gas used by the block.
    pub gas_used: i64,
    /// The block's gas limit.
    pub gas_limit: i64,
}
