use store::{Row, StoreError};
use tokio::sync::oneshot;

/// Outcome delivered on a request's reply slot: `Ok(Some(row))` for a found
/// key, `Ok(None)` for an absent one, `Err` when the whole batch failed.
/// Caller-side timeouts never travel through the slot.
pub(crate) type ReadOutcome = Result<Option<Row>, StoreError>;

/// A single point read in flight.
///
/// The reply slot is a oneshot sender: write-once and consumed by the send,
/// so a second write is unrepresentable. Exactly one worker resolves each
/// request.
#[derive(Debug)]
pub(crate) struct ReadRequest {
    pub(crate) key: String,
    pub(crate) reply: oneshot::Sender<ReadOutcome>,
}

/// An open or flushed group of requests resolved by one store query.
///
/// Owned exclusively by the accumulator while open, then moved into the
/// worker queue on flush. Never exceeds the configured maximum size.
pub(crate) type Batch = Vec<ReadRequest>;
