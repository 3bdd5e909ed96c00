//! Persistence gateway over a relational store of discovered contracts, their economic
//! projections, and per-block economic summaries.

mod error;
mod gateway;
mod models;

pub use error::StorageError;
pub use gateway::Gateway;
pub use models::{Block, Contract, ContractInfo};
