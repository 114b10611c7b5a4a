use serde::{Deserialize, Serialize};

/// A single stored entry: a primary key and its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub key: String,
    pub payload: String,
}

impl Row {
    /// Creates a row from a key and payload.
    pub fn new(key: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }
}
