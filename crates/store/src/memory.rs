use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{KeyValueStore, Result};

/// In-memory store implementation for testing and benchmarks.
///
/// Provides the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry.
    pub async fn insert(&self, key: impl Into<String>, payload: impl Into<String>) {
        self.entries
            .write()
            .await
            .insert(key.into(), payload.into());
    }

    /// Removes an entry, returning its payload if it existed.
    pub async fn remove(&self, key: &str) -> Option<String> {
        self.entries.write().await.remove(key)
    }

    /// Returns the number of entries stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true when the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Clears all entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn multi_get(&self, keys: &[String]) -> Result<HashMap<String, String>> {
        let entries = self.entries.read().await;
        let mut found = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(payload) = entries.get(key) {
                found.insert(key.clone(), payload.clone());
            }
        }
        Ok(found)
    }
}
