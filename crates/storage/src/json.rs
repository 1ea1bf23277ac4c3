//! JSON file backed index store.

use crate::{Index, IndexStore, StoreError};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Stores the whole index as a single JSON object at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonIndexStore {
    path: PathBuf,
}

impl JsonIndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unreadable(&self, reason: impl ToString) -> StoreError {
        StoreError::Unreadable {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl IndexStore for JsonIndexStore {
    async fn load(&self) -> Result<Index, StoreError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| self.unreadable(e))?;
        let index: Index = serde_json::from_slice(&bytes).map_err(|e| self.unreadable(e))?;
        debug!(path = %self.path.display(), entries = index.len(), "loaded index");
        Ok(index)
    }

    async fn save(&self, index: &Index) -> Result<(), StoreError> {
        let data = serde_json::to_vec(index)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &data))
            .await
            .map_err(io::Error::other)??;
        debug!(path = %self.path.display(), entries = index.len(), "saved index");
        Ok(())
    }
}

/// Writes to a temporary file next to `path` and renames it into place, so
/// the index is either the old or the new content, never a partial write.
fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
