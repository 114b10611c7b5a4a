//! Backing key/value store seam for the read micro-batcher.
//!
//! The batcher only needs one capability from a store: given a set of keys,
//! return the subset found with their payloads, or fail. [`KeyValueStore`]
//! captures that seam; [`PostgresStore`] is the production implementation
//! and [`InMemoryStore`] backs tests and benchmarks.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod row;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use row::Row;
pub use store::KeyValueStore;
