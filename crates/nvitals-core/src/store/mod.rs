//! Client-side key-value storage.
//!
//! This module provides the `Store` capability shared by the time series
//! loader (read-only year cache) and the tutorial wizard (persisted "seen"
//! flag):
//!
//! - `FileStore`: one JSON file per key under the cache directory
//! - `MemoryStore`: in-memory store for tests and ephemeral sessions
//! - `YearCache`: typed access to cached yearly datasets

pub mod file;
pub mod memory;
pub mod year_cache;

use std::path::PathBuf;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use year_cache::YearCache;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid store key: {0}")]
    InvalidKey(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Process-wide string key-value storage.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
