//! Per-county time series loading.
//!
//! For each report year the loader reads the local year cache first and only
//! fetches from the network on a cache miss. The years are visited one after
//! another; the first failure stops the loop and whatever years were already
//! found are kept. The loader never writes to the cache.

pub mod tracker;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, YearSource};
use crate::models::{CountyRecord, TimeSeries, REPORT_YEARS};
use crate::store::year_cache::{YearCache, YearCacheError};
use crate::store::StoreError;

pub use tracker::{LoadTicket, LoadTracker};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to fetch {year} data: {source}")]
    Fetch {
        year: u16,
        #[source]
        source: ApiError,
    },

    #[error("Failed to parse {year} data: {source}")]
    Parse {
        year: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read cached {year} data: {source}")]
    CacheRead {
        year: u16,
        #[source]
        source: StoreError,
    },
}

impl LoadError {
    pub fn year(&self) -> u16 {
        match self {
            LoadError::Fetch { year, .. }
            | LoadError::Parse { year, .. }
            | LoadError::CacheRead { year, .. } => *year,
        }
    }

    fn from_cache(year: u16, err: YearCacheError) -> Self {
        match err {
            YearCacheError::Store(source) => LoadError::CacheRead { year, source },
            YearCacheError::Malformed { source, .. } | YearCacheError::Encode { source, .. } => {
                LoadError::Parse { year, source }
            }
        }
    }

    fn from_fetch(year: u16, err: ApiError) -> Self {
        match err {
            ApiError::Malformed(source) => LoadError::Parse { year, source },
            source => LoadError::Fetch { year, source },
        }
    }
}

/// Where a year's dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearSourceKind {
    Cache,
    Network,
}

/// Result of one loader run. Partial series are kept on failure.
#[derive(Debug)]
pub struct LoadOutcome {
    pub fips: String,
    pub series: TimeSeries,
    pub failure: Option<LoadError>,
    pub finished_at: DateTime<Utc>,
}

impl LoadOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Read-through loader over the year cache and a network source.
#[derive(Clone)]
pub struct TimeSeriesLoader {
    cache: YearCache,
    source: Arc<dyn YearSource>,
    years: Vec<u16>,
}

impl TimeSeriesLoader {
    pub fn new(cache: YearCache, source: Arc<dyn YearSource>) -> Self {
        Self {
            cache,
            source,
            years: REPORT_YEARS.to_vec(),
        }
    }

    /// Override the year list (kept in the given order).
    pub fn with_years(mut self, years: &[u16]) -> Self {
        self.years = years.to_vec();
        self
    }

    pub fn years(&self) -> &[u16] {
        &self.years
    }

    /// Look up one county in one year: cache first, then network on a miss.
    ///
    /// `Ok(None)` means the year's dataset has no entry for `fips`.
    pub async fn load_year(
        &self,
        fips: &str,
        year: u16,
    ) -> Result<Option<(CountyRecord, YearSourceKind)>, LoadError> {
        if let Some(dataset) = self
            .cache
            .load(year)
            .map_err(|e| LoadError::from_cache(year, e))?
        {
            return Ok(dataset
                .get(fips)
                .cloned()
                .map(|r| (r, YearSourceKind::Cache)));
        }

        let dataset = self
            .source
            .fetch_year(year)
            .await
            .map_err(|e| LoadError::from_fetch(year, e))?;
        Ok(dataset
            .get(fips)
            .cloned()
            .map(|r| (r, YearSourceKind::Network)))
    }

    /// Load every configured year for `fips`, stopping at the first failure.
    pub async fn load(&self, fips: &str) -> LoadOutcome {
        self.load_years(fips, None).await
    }

    /// Like `load`, but `year` was already looked up (e.g. for the report
    /// snapshot) and is taken from `snapshot` instead of being read again.
    pub async fn load_with_snapshot(
        &self,
        fips: &str,
        year: u16,
        snapshot: Option<CountyRecord>,
    ) -> LoadOutcome {
        self.load_years(fips, Some((year, snapshot))).await
    }

    async fn load_years(
        &self,
        fips: &str,
        known: Option<(u16, Option<CountyRecord>)>,
    ) -> LoadOutcome {
        let mut series = TimeSeries::new();
        let mut failure = None;
        let (known_year, mut known_record) = match known {
            Some((year, record)) => (Some(year), record),
            None => (None, None),
        };

        for &year in &self.years {
            if known_year == Some(year) {
                if let Some(record) = known_record.take() {
                    series.insert(year, record);
                }
                continue;
            }

            match self.load_year(fips, year).await {
                Ok(Some((record, kind))) => {
                    debug!(fips, year, source = ?kind, "Loaded year");
                    series.insert(year, record);
                }
                Ok(None) => {
                    debug!(fips, year, "County absent from year dataset");
                }
                Err(e) => {
                    warn!(fips, year, error = %e, "Error loading time series");
                    failure = Some(e);
                    break;
                }
            }
        }

        info!(
            fips,
            years = series.len(),
            complete = failure.is_none(),
            "Time series load finished"
        );

        LoadOutcome {
            fips: fips.to_string(),
            series,
            failure,
            finished_at: Utc::now(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use futures::future::BoxFuture;

    use crate::models::YearDataset;
    use crate::store::MemoryStore;

    enum Scripted {
        Data(YearDataset),
        ServerError,
        Unparseable,
    }

    /// Scripted network source that records which years were requested.
    #[derive(Default)]
    struct FakeSource {
        responses: HashMap<u16, Scripted>,
        calls: Mutex<Vec<u16>>,
    }

    impl FakeSource {
        fn ok(mut self, year: u16, dataset: YearDataset) -> Self {
            self.responses.insert(year, Scripted::Data(dataset));
            self
        }

        fn server_error(mut self, year: u16) -> Self {
            self.responses.insert(year, Scripted::ServerError);
            self
        }

        fn unparseable(mut self, year: u16) -> Self {
            self.responses.insert(year, Scripted::Unparseable);
            self
        }

        fn calls(&self) -> Vec<u16> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl YearSource for FakeSource {
        fn fetch_year(&self, year: u16) -> BoxFuture<'_, Result<YearDataset, ApiError>> {
            self.calls.lock().unwrap().push(year);
            let response = match self.responses.get(&year) {
                Some(Scripted::Data(dataset)) => Ok(dataset.clone()),
                Some(Scripted::ServerError) => Err(ApiError::ServerError("boom".to_string())),
                Some(Scripted::Unparseable) => Err(ApiError::Malformed(
                    serde_json::from_str::<YearDataset>("<html>").unwrap_err(),
                )),
                None => Err(ApiError::NotFound(format!("/api/years/{}", year))),
            };
            Box::pin(async move { response })
        }
    }

    fn record(fips: &str, rate: f64) -> CountyRecord {
        CountyRecord {
            fips: fips.to_string(),
            death_rate: Some(rate),
            ..Default::default()
        }
    }

    fn dataset(records: &[CountyRecord]) -> YearDataset {
        records.iter().map(|r| (r.fips.clone(), r.clone())).collect()
    }

    fn cache_with(entries: &[(u16, &str)]) -> YearCache {
        let store = MemoryStore::with_entries(
            entries
                .iter()
                .map(|(year, raw)| (format!("nvitals_year_{}_v1", year), raw.to_string())),
        );
        YearCache::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let cache = cache_with(&[(2018, r#"{"01001": {"fips": "01001", "DrugDeathRate": 25.4}}"#)]);
        let source = Arc::new(FakeSource::default());
        let loader = TimeSeriesLoader::new(cache, source.clone()).with_years(&[2018]);

        let outcome = loader.load("01001").await;
        assert!(outcome.is_complete());
        assert_eq!(outcome.series[&2018].death_rate, Some(25.4));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cache_hit_without_county_does_not_fetch() {
        let cache = cache_with(&[(2018, r#"{"99999": {"fips": "99999"}}"#)]);
        let source = Arc::new(FakeSource::default().ok(2018, dataset(&[record("01001", 1.0)])));
        let loader = TimeSeriesLoader::new(cache, source.clone()).with_years(&[2018]);

        let outcome = loader.load("01001").await;
        assert!(outcome.is_complete());
        assert!(outcome.series.is_empty());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cache_miss_falls_back_to_network_in_order() {
        let cache = cache_with(&[(2019, r#"{"01001": {"fips": "01001", "DrugDeathRate": 30.0}}"#)]);
        let source = Arc::new(
            FakeSource::default()
                .ok(2018, dataset(&[record("01001", 25.4)]))
                .ok(2020, dataset(&[record("02013", 9.0)])),
        );
        let loader = TimeSeriesLoader::new(cache, source.clone()).with_years(&[2018, 2019, 2020]);

        let outcome = loader.load("01001").await;
        assert!(outcome.is_complete());
        assert_eq!(source.calls(), vec![2018, 2020]);
        assert_eq!(outcome.series.keys().copied().collect::<Vec<_>>(), vec![2018, 2019]);
    }

    #[tokio::test]
    async fn test_fetch_failure_stops_and_keeps_partial_series() {
        let cache = cache_with(&[]);
        let source = Arc::new(
            FakeSource::default()
                .ok(2018, dataset(&[record("01001", 25.4)]))
                .server_error(2019)
                .ok(2020, dataset(&[record("01001", 40.0)])),
        );
        let loader = TimeSeriesLoader::new(cache, source.clone());

        let outcome = loader.load("01001").await;
        assert_eq!(source.calls(), vec![2018, 2019]);
        assert_eq!(outcome.series.len(), 1);
        assert!(outcome.series.contains_key(&2018));
        let failure = outcome.failure.expect("failure recorded");
        assert_eq!(failure.year(), 2019);
        assert!(matches!(failure, LoadError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_malformed_cache_entry_is_parse_failure() {
        let cache = cache_with(&[
            (2018, r#"{"01001": {"fips": "01001", "DrugDeathRate": 25.4}}"#),
            (2019, "<html>"),
        ]);
        let source = Arc::new(FakeSource::default());
        let loader = TimeSeriesLoader::new(cache, source.clone());

        let outcome = loader.load("01001").await;
        assert_eq!(outcome.series.len(), 1);
        assert!(matches!(outcome.failure, Some(LoadError::Parse { year: 2019, .. })));
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_response_stops_as_parse_failure() {
        let cache = cache_with(&[]);
        let source = Arc::new(
            FakeSource::default()
                .ok(2018, dataset(&[record("01001", 25.4)]))
                .ok(2019, dataset(&[record("01001", 27.0)]))
                .unparseable(2020)
                .ok(2021, dataset(&[record("01001", 40.0)])),
        );
        let loader = TimeSeriesLoader::new(cache, source.clone());

        let outcome = loader.load("01001").await;
        assert_eq!(source.calls(), vec![2018, 2019, 2020]);
        assert_eq!(outcome.series.keys().copied().collect::<Vec<_>>(), vec![2018, 2019]);
        assert!(matches!(outcome.failure, Some(LoadError::Parse { year: 2020, .. })));
    }

    #[tokio::test]
    async fn test_known_snapshot_year_is_not_fetched_again() {
        let cache = cache_with(&[]);
        let source = Arc::new(
            FakeSource::default()
                .ok(2018, dataset(&[record("01001", 25.4)]))
                .ok(2019, dataset(&[record("01001", 27.0)])),
        );
        let loader = TimeSeriesLoader::new(cache, source.clone()).with_years(&[2018, 2019, 2020]);

        let outcome = loader
            .load_with_snapshot("01001", 2020, Some(record("01001", 31.0)))
            .await;
        assert!(outcome.is_complete());
        assert_eq!(source.calls(), vec![2018, 2019]);
        assert_eq!(outcome.series[&2020].death_rate, Some(31.0));

        let outcome = loader.load_with_snapshot("01001", 2019, None).await;
        assert_eq!(source.calls(), vec![2018, 2019, 2018, 2020]);
        assert!(!outcome.series.contains_key(&2019));
    }

    #[tokio::test]
    async fn test_load_year_reports_source() {
        let cache = cache_with(&[(2023, r#"{"01001": {"fips": "01001"}}"#)]);
        let source = Arc::new(FakeSource::default().ok(2022, dataset(&[record("01001", 3.0)])));
        let loader = TimeSeriesLoader::new(cache, source);

        let (_, kind) = loader.load_year("01001", 2023).await.unwrap().unwrap();
        assert_eq!(kind, YearSourceKind::Cache);
        let (_, kind) = loader.load_year("01001", 2022).await.unwrap().unwrap();
        assert_eq!(kind, YearSourceKind::Network);
    }
}
