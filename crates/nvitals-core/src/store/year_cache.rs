use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::models::YearDataset;

use super::{Store, StoreError};

/// Default namespace prefix for year cache keys.
pub const DEFAULT_NAMESPACE: &str = "nvitals";

/// Default cache schema version. Bump when the cached record shape changes.
pub const DEFAULT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum YearCacheError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cached dataset for {year} is malformed: {source}")]
    Malformed {
        year: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode dataset for {year}: {source}")]
    Encode {
        year: u16,
        #[source]
        source: serde_json::Error,
    },
}

/// Yearly datasets stored under `<namespace>_year_<YYYY>_v<version>`.
#[derive(Clone)]
pub struct YearCache {
    store: Arc<dyn Store>,
    namespace: String,
    version: u32,
}

impl YearCache {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self::with_namespace(store, DEFAULT_NAMESPACE, DEFAULT_VERSION)
    }

    pub fn with_namespace(store: Arc<dyn Store>, namespace: &str, version: u32) -> Self {
        Self {
            store,
            namespace: namespace.to_string(),
            version,
        }
    }

    pub fn cache_key(&self, year: u16) -> String {
        format!("{}_year_{}_v{}", self.namespace, year, self.version)
    }

    /// Load the cached dataset for `year`. `Ok(None)` is a cache miss.
    pub fn load(&self, year: u16) -> Result<Option<YearDataset>, YearCacheError> {
        let key = self.cache_key(year);
        let Some(raw) = self.store.get(&key)? else {
            debug!(year, key = %key, "Year cache miss");
            return Ok(None);
        };

        let dataset: YearDataset = serde_json::from_str(&raw)
            .map_err(|source| YearCacheError::Malformed { year, source })?;
        debug!(year, counties = dataset.len(), "Year cache hit");
        Ok(Some(dataset))
    }

    pub fn save(&self, year: u16, dataset: &YearDataset) -> Result<(), YearCacheError> {
        let raw = serde_json::to_string(dataset)
            .map_err(|source| YearCacheError::Encode { year, source })?;
        self.store.set(&self.cache_key(year), &raw)?;
        Ok(())
    }
}
