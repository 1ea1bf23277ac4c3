//! Storage layer: the persisted note index and its backing store.
//!
//! Holds the index data model and the [`IndexStore`] seam used by the
//! core passes, plus the JSON file implementation.

pub mod json;
pub mod models;

use std::path::PathBuf;
use thiserror::Error;

pub use json::JsonIndexStore;
pub use models::{Index, IndexEntry, Metadata};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The index is missing, unreadable or malformed. These cases are not
    /// distinguished: callers recover from all of them the same way.
    #[error("index unreadable at {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("failed to encode index: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write index: {0}")]
    Write(#[from] std::io::Error),
}

#[async_trait::async_trait]
pub trait IndexStore: Send + Sync {
    /// Returns the previously persisted index, or [`StoreError::Unreadable`].
    async fn load(&self) -> Result<Index, StoreError>;

    /// Persists a complete index. Readers never observe a partial write.
    async fn save(&self, index: &Index) -> Result<(), StoreError>;
}
