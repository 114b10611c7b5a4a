use std::time::Duration;

use store::StoreError;
use thiserror::Error;

/// Errors returned by [`ReadBatcher::read`](crate::ReadBatcher::read).
///
/// An absent key is not an error; it comes back as `Ok(None)`.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The multi-key query for this read's batch failed. Every member of
    /// the batch receives the same cause. No retry is attempted at this
    /// layer; the batcher cannot know whether the failure is transient.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No outcome arrived within the caller-side wait bound. The request
    /// stays in its batch and may still be resolved against the store; that
    /// outcome is discarded.
    #[error("read timed out after {waited:?}")]
    Timeout { waited: Duration },

    /// The batcher has been stopped; no new reads are admitted.
    #[error("batcher is shut down")]
    Closed,
}

/// Rejected configuration, reported at start rather than as a hang later.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_batch_size must be at least 1")]
    ZeroBatchSize,

    #[error("worker_count must be at least 1")]
    ZeroWorkers,

    #[error("batching_timeout must be non-zero")]
    ZeroBatchingTimeout,

    #[error("read_timeout must be non-zero")]
    ZeroReadTimeout,

    #[error("arrival_capacity must be at least 1")]
    ZeroArrivalCapacity,
}
