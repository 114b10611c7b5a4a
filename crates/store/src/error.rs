use std::sync::Arc;

use thiserror::Error;

/// Errors produced by a backing store.
///
/// Cloneable so that one failed multi-key query can be propagated verbatim
/// to every request of the affected batch.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The underlying database query failed.
    #[error("database error: {0}")]
    Database(Arc<sqlx::Error>),

    /// The store could not serve the call at all.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(Arc::new(err))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
