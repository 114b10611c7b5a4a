use std::collections::HashMap;

use async_trait::async_trait;

use crate::Result;

/// Core trait for backing store implementations.
///
/// All implementations must be safe for concurrent invocation from multiple
/// workers without external synchronization (Send + Sync).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetches many keys in one call.
    ///
    /// Returns the subset of `keys` present in the store, mapped to their
    /// payloads. An absent key is simply missing from the returned map, not
    /// an error; only a failed call is. Duplicate keys in `keys` are
    /// permitted and resolve to the same entry.
    async fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, String>>;
}
