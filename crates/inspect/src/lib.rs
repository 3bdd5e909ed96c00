//! Batch fetchers and the bounded-concurrency inspector loop that drives them.

mod batch;
mod error;
mod inspector;

pub use batch::{block_economics_batch, contract_info_batch, tlsc_batch};
pub use error::InspectError;
pub use inspector::{
    Inspector, InspectorKind, TaskSpec, DEFAULT_BLOCK_BATCH_SIZE, DEFAULT_CONTRACT_BATCH_SIZE,
    DEFAULT_MAX_CONCURRENCY,
};
