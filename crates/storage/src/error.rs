//! Errors raised by the persistence gateway.

use thiserror::Error;

/// An error from the persistence gateway.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Any failure surfaced by the underlying database driver: connection, query, or
    /// row-decoding errors.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
