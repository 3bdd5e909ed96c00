//! Errors surfaced by batch fetchers and the inspector loop.

use thiserror::Error;

/// An error from a batch fetcher or the inspector that dispatches them.
#[derive(Debug, Error)]
pub enum InspectError {
    /// A JSON-RPC call failed (after exhausting retries, for transient failures).
    #[error(transparent)]
    Rpc(#[from] rpc::RpcError),

    /// A database operation failed.
    #[error(transparent)]
    Storage(#[from] storage::StorageError),

    /// A contract's bytecode was not valid hex.
    #[error("malformed bytecode for {address}: {source}")]
    MalformedBytecode {
        /// The contract address whose bytecode failed to decode.
        address: String,
        /// The underlying hex-decoding error.
        source: hex::FromHexError,
    },

    /// A sub-batch task panicked or was cancelled before completing.
    #[error("sub-batch task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}
