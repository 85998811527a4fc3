use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use super::{Store, StoreError};

/// Stores each key as `<cache_dir>/<key>.json`.
pub struct FileStore {
    cache_dir: PathBuf,
}

impl FileStore {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create cache directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        // Keys become file names; keep them to a safe alphabet.
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.cache_dir.join(format!("{}.json", key)))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|source| StoreError::Read { path: path.clone(), source })?;
        debug!(key, bytes = contents.len(), "Store hit");
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        std::fs::write(&path, value).map_err(|source| StoreError::Write { path, source })?;
        debug!(key, bytes = value.len(), "Store write");
        Ok(())
    }
}
