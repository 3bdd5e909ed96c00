//! Async JSON-RPC client for the subset of `eth_*` calls a block/contract inspector needs,
//! with exponential-backoff retry for transient endpoint failures.

mod client;
mod error;
mod methods;
mod retry;

pub use client::RpcClient;
pub use error::RpcError;
pub use methods::{
    parse_quantity, Block, BlockId, BlockIdHex, FeeHistory, Transaction, TransactionReceipt,
};
pub use retry::with_retry;
