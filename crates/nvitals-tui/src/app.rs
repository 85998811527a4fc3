//! Application state management for nvitals.
//!
//! This module contains the `App` struct that hosts the county report and the
//! tutorial: it owns the snapshot record for the displayed county, starts
//! background loads, and applies their results when they come back.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use nvitals_core::api::{ApiClient, YearSource};
use nvitals_core::loader::{LoadOutcome, LoadTicket, LoadTracker, TimeSeriesLoader};
use nvitals_core::models::{normalize_fips, CountyRecord, FIPS_WIDTH, REPORT_YEARS};
use nvitals_core::report::{ReportMode, ReportView};
use nvitals_core::store::{FileStore, MemoryStore, Store, YearCache};
use nvitals_core::tutorial::{TutorialWizard, TUTORIAL_STEPS};
use nvitals_core::Config;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 16;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    EnteringFips,
    ShowingHelp,
    /// A blocking message the user must dismiss (e.g. clipboard failure)
    Acknowledging,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from background load tasks.
enum BackgroundResult {
    /// Snapshot record for the selected year (None if the county has no entry)
    Snapshot {
        ticket: LoadTicket,
        fips: String,
        name: String,
        year: u16,
        record: Option<CountyRecord>,
    },
    /// The snapshot lookup failed
    SnapshotFailed {
        ticket: LoadTicket,
        fips: String,
        name: String,
        error: String,
    },
    /// A finished time series load
    TimeSeries {
        ticket: LoadTicket,
        outcome: LoadOutcome,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    loader: TimeSeriesLoader,

    pub state: AppState,
    pub report: Option<ReportView>,
    pub tutorial: TutorialWizard,

    /// FIPS input buffer for the "open county" prompt
    pub fips_input: String,
    /// County whose snapshot is being fetched
    pub pending_county: Option<String>,
    /// Message shown while in `AppState::Acknowledging`
    pub acknowledgment: Option<String>,
    pub status_message: Option<String>,

    /// Frame counter driving the loading spinner
    pub tick: usize,

    tracker: LoadTracker,
    result_rx: mpsc::Receiver<BackgroundResult>,
    result_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    /// Create the application with the on-disk store and the HTTP client.
    pub fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn Store> = match config.cache_dir().and_then(FileStore::new) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(error = %e, "Cache directory unavailable, using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        let api = ApiClient::new(&config.api_base_url).context("Failed to create API client")?;
        Ok(Self::with_services(config, store, Arc::new(api)))
    }

    /// Create the application over explicit storage and network source.
    pub fn with_services(
        config: Config,
        store: Arc<dyn Store>,
        source: Arc<dyn YearSource>,
    ) -> Self {
        let cache = YearCache::with_namespace(
            store.clone(),
            &config.cache_namespace,
            config.cache_version,
        );
        let loader = TimeSeriesLoader::new(cache, source);
        let tutorial = TutorialWizard::mount(store, TUTORIAL_STEPS);
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            config,
            loader,
            state: AppState::Normal,
            report: None,
            tutorial,
            fips_input: String::new(),
            pending_county: None,
            acknowledgment: None,
            status_message: None,
            tick: 0,
            tracker: LoadTracker::new(),
            result_rx: rx,
            result_tx: tx,
        }
    }

    /// The year whose record is shown in the summary and metric tiles.
    pub fn selected_year(&self) -> u16 {
        self.config
            .selected_year
            .trim()
            .parse()
            .ok()
            .filter(|y| REPORT_YEARS.contains(y))
            .unwrap_or(REPORT_YEARS[REPORT_YEARS.len() - 1])
    }

    // =========================================================================
    // Opening counties
    // =========================================================================

    /// Open the report for a county: fetch its snapshot, then its time series.
    ///
    /// Any load still running for a previous county is left to finish, but its
    /// result is discarded.
    pub fn open_county(&mut self, fips: &str, name: Option<&str>) {
        let ticket = self.tracker.begin();
        let fips = fips.to_string();
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| format!("County {}", fips));
        let year = self.selected_year();

        info!(fips = %fips, generation = ticket.generation(), "Opening county report");
        self.pending_county = Some(fips.clone());
        self.status_message = Some(format!("Loading {}...", name));

        let loader = self.loader.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = match loader.load_year(&fips, year).await {
                Ok(found) => BackgroundResult::Snapshot {
                    ticket,
                    fips,
                    name,
                    year,
                    record: found.map(|(record, _)| record),
                },
                Err(e) => BackgroundResult::SnapshotFailed {
                    ticket,
                    fips,
                    name,
                    error: e.to_string(),
                },
            };
            Self::send_result(&tx, result).await;
        });
    }

    /// Open the county typed into the FIPS prompt.
    pub fn submit_fips_input(&mut self) {
        let input = std::mem::take(&mut self.fips_input);
        self.state = AppState::Normal;
        match normalize_fips(&input) {
            Some(fips) => self.open_county(&fips, None),
            None => {
                self.status_message = Some(format!("Invalid FIPS code: {}", input.trim()));
            }
        }
    }

    /// Start the time series load. `snapshot` is the selected year's lookup,
    /// when it succeeded, so that year is not read twice.
    fn start_time_series_load(
        &mut self,
        ticket: LoadTicket,
        fips: String,
        snapshot: Option<(u16, Option<CountyRecord>)>,
    ) {
        if let Some(ref mut report) = self.report {
            report.begin_load();
        }

        let loader = self.loader.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let outcome = match snapshot {
                Some((year, record)) => loader.load_with_snapshot(&fips, year, record).await,
                None => loader.load(&fips).await,
            };
            Self::send_result(&tx, BackgroundResult::TimeSeries { ticket, outcome }).await;
        });
    }

    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send background result - receiver dropped");
        }
    }

    /// Apply all finished background work. Called once per frame.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_background_result(result);
        }
    }

    fn process_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Snapshot {
                ticket,
                fips,
                name,
                year,
                record,
            } => {
                if !self.tracker.is_current(ticket) {
                    debug!(fips = %fips, "Discarding snapshot from superseded load");
                    return;
                }
                self.pending_county = None;

                let snapshot = match record.clone() {
                    Some(record) => {
                        self.status_message = None;
                        record
                    }
                    None => {
                        self.status_message = Some(format!("No {} data for {}", year, fips));
                        CountyRecord {
                            fips: fips.clone(),
                            ..Default::default()
                        }
                    }
                };

                self.report = Some(ReportView::new(&name, &fips, snapshot, &year.to_string()));
                self.start_time_series_load(ticket, fips, Some((year, record)));
            }
            BackgroundResult::SnapshotFailed {
                ticket,
                fips,
                name,
                error,
            } => {
                if !self.tracker.is_current(ticket) {
                    return;
                }
                warn!(fips = %fips, error = %error, "Failed to load county snapshot");
                self.pending_county = None;
                self.status_message = Some(format!("Failed to load {}: {}", fips, error));

                // The report still opens so the other years can be shown
                let snapshot = CountyRecord {
                    fips: fips.clone(),
                    ..Default::default()
                };
                let year = self.selected_year().to_string();
                self.report = Some(ReportView::new(&name, &fips, snapshot, &year));
                self.start_time_series_load(ticket, fips, None);
            }
            BackgroundResult::TimeSeries { ticket, outcome } => {
                if !self.tracker.is_current(ticket) {
                    debug!(fips = %outcome.fips, "Discarding time series from superseded load");
                    return;
                }
                let partial = outcome.failure.is_some();
                if let Some(ref mut report) = self.report {
                    if report.finish_load(outcome) && partial {
                        self.status_message = Some("Some years could not be loaded".to_string());
                    }
                }
            }
        }
    }

    // =========================================================================
    // Report actions
    // =========================================================================

    pub fn toggle_report_mode(&mut self) {
        if let Some(ref mut report) = self.report {
            report.toggle_mode();
        }
    }

    /// Copy the share link for the open county to the clipboard.
    pub fn copy_link(&mut self) {
        let Some(ref report) = self.report else {
            return;
        };

        let url = match report.share_url(&self.config.share_origin) {
            Ok(url) => url,
            Err(e) => {
                self.acknowledge(format!("Could not build share link: {}", e));
                return;
            }
        };

        match write_clipboard(&url) {
            Ok(()) => {
                info!(url = %url, "Share link copied");
                self.status_message = Some("Link copied to clipboard!".to_string());
            }
            Err(e) => {
                warn!(error = %e, "Clipboard write failed");
                self.acknowledge(format!("Could not copy link: {}\n\n{}", e, url));
            }
        }
    }

    /// Save the loaded time series as CSV into the export directory.
    pub fn download_data(&mut self) -> Option<PathBuf> {
        let report = self.report.as_ref()?;
        match report.write_export(&self.config.export_dir()) {
            Ok(path) => {
                self.status_message = Some(format!("Saved {}", path.display()));
                Some(path)
            }
            Err(e) => {
                error!(error = %e, "CSV export failed");
                self.status_message = Some(format!("Export failed: {}", e));
                None
            }
        }
    }

    pub fn acknowledge(&mut self, message: String) {
        self.acknowledgment = Some(message);
        self.state = AppState::Acknowledging;
    }

    pub fn dismiss_acknowledgment(&mut self) {
        self.acknowledgment = None;
        self.state = AppState::Normal;
    }

    pub fn report_mode(&self) -> Option<ReportMode> {
        self.report.as_ref().map(|r| r.mode())
    }
}

fn write_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Clipboard unavailable")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to write clipboard")?;
    Ok(())
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character should be accepted into the FIPS prompt
pub fn can_add_fips_char(current_len: usize, c: char) -> bool {
    current_len < FIPS_WIDTH && c.is_ascii_digit()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;
    use futures::future::BoxFuture;
    use nvitals_core::api::ApiError;
    use nvitals_core::models::{TimeSeries, YearDataset};
    use nvitals_core::report::SeriesStatus;
    use nvitals_core::tutorial::TUTORIAL_SEEN_KEY;

    /// Source that fails every fetch, so tests only see cached data.
    struct NoNetwork;

    impl YearSource for NoNetwork {
        fn fetch_year(&self, year: u16) -> BoxFuture<'_, Result<YearDataset, ApiError>> {
            Box::pin(async move { Err(ApiError::NotFound(format!("/api/years/{}", year))) })
        }
    }

    fn cached_store() -> Arc<MemoryStore> {
        cached_store_for(&REPORT_YEARS)
    }

    fn cached_store_for(years: &[u16]) -> Arc<MemoryStore> {
        let mut entries = vec![(
            TUTORIAL_SEEN_KEY.to_string(),
            "true".to_string(),
        )];
        for &year in years {
            entries.push((
                format!("nvitals_year_{}_v1", year),
                format!(
                    r#"{{"01001": {{"fips": "01001", "DrugDeathRate": {}.5, "Population": 58805}}}}"#,
                    year - 2000
                ),
            ));
        }
        Arc::new(MemoryStore::with_entries(entries))
    }

    pub(crate) fn app_with_store(store: Arc<dyn Store>) -> App {
        App::with_services(Config::default(), store, Arc::new(NoNetwork))
    }

    pub(crate) fn test_app() -> App {
        app_with_store(cached_store())
    }

    async fn settle(app: &mut App) {
        for _ in 0..50 {
            app.check_background_tasks();
            let loaded = app
                .report
                .as_ref()
                .map(|r| !r.is_loading() && r.loaded_at().is_some())
                .unwrap_or(false);
            if loaded {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_open_county_loads_snapshot_and_series() {
        let mut app = test_app();
        app.open_county("01001", Some("Autauga County"));
        settle(&mut app).await;

        let report = app.report.as_ref().expect("report opened");
        assert_eq!(report.county_name(), "Autauga County");
        assert_eq!(report.snapshot().death_rate, Some(23.5));
        assert_eq!(report.series().len(), 6);
        assert_eq!(report.status(), &SeriesStatus::Loaded);
        assert!(app.pending_county.is_none());
    }

    #[tokio::test]
    async fn test_missing_county_opens_empty_snapshot_with_partial_series() {
        let mut app = test_app();
        app.open_county("99999", None);
        settle(&mut app).await;

        let report = app.report.as_ref().expect("report opened");
        assert_eq!(report.county_name(), "County 99999");
        assert_eq!(report.snapshot().death_rate, None);
        assert!(report.series().is_empty());
        assert_eq!(app.status_message.as_deref(), Some("No 2023 data for 99999"));
    }

    #[tokio::test]
    async fn test_failed_snapshot_still_shows_cached_years() {
        let store = cached_store_for(&[2018, 2019, 2020, 2021, 2022]);
        let mut app = app_with_store(store);
        app.open_county("01001", None);
        settle(&mut app).await;

        let report = app.report.as_ref().expect("report opened");
        assert_eq!(report.snapshot().death_rate, None);
        assert_eq!(
            report.series().keys().copied().collect::<Vec<_>>(),
            vec![2018, 2019, 2020, 2021, 2022]
        );
        assert!(matches!(report.status(), SeriesStatus::Partial { .. }));
        assert_eq!(report.chart_rows().map(|rows| rows.len()), Some(5));
        assert_eq!(
            app.status_message.as_deref(),
            Some("Some years could not be loaded")
        );
    }

    #[tokio::test]
    async fn test_superseded_series_is_discarded() {
        let mut app = test_app();
        let stale = app.tracker.begin();
        let current = app.tracker.begin();
        app.report = Some(ReportView::new(
            "Autauga County",
            "01001",
            CountyRecord::default(),
            "2023",
        ));
        if let Some(ref mut report) = app.report {
            report.begin_load();
        }

        let mut series = TimeSeries::new();
        series.insert(
            2018,
            CountyRecord {
                fips: "01001".to_string(),
                death_rate: Some(99.0),
                ..Default::default()
            },
        );
        app.process_background_result(BackgroundResult::TimeSeries {
            ticket: stale,
            outcome: LoadOutcome {
                fips: "01001".to_string(),
                series: series.clone(),
                failure: None,
                finished_at: Utc::now(),
            },
        });
        assert!(app.report.as_ref().unwrap().is_loading());

        app.process_background_result(BackgroundResult::TimeSeries {
            ticket: current,
            outcome: LoadOutcome {
                fips: "01001".to_string(),
                series,
                failure: None,
                finished_at: Utc::now(),
            },
        });
        assert!(!app.report.as_ref().unwrap().is_loading());
    }

    #[tokio::test]
    async fn test_toggle_mode_does_not_refetch() {
        let mut app = test_app();
        app.open_county("01001", None);
        settle(&mut app).await;

        let before = app.report.as_ref().unwrap().series().clone();
        for _ in 0..4 {
            app.toggle_report_mode();
            app.check_background_tasks();
        }
        assert_eq!(app.report_mode(), Some(ReportMode::Summary));
        assert_eq!(app.report.as_ref().unwrap().series(), &before);
        assert!(app.result_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_download_data_writes_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            export_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let mut app = App::with_services(config, cached_store(), Arc::new(NoNetwork));
        app.open_county("01001", Some("Autauga County"));
        settle(&mut app).await;

        let path = app.download_data().expect("export written");
        let csv = std::fs::read_to_string(path).unwrap();
        assert_eq!(csv.lines().count(), 7);
        assert!(csv.contains("2018,18.5,N/A,N/A,N/A,58805"));
    }

    #[tokio::test]
    async fn test_invalid_fips_input() {
        let mut app = test_app();
        app.state = AppState::EnteringFips;
        app.fips_input = "12a".to_string();
        app.submit_fips_input();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.pending_county.is_none());
        assert_eq!(app.status_message.as_deref(), Some("Invalid FIPS code: 12a"));
    }

    #[test]
    fn test_tutorial_closed_when_seen() {
        let app = test_app();
        assert!(!app.tutorial.is_open());
    }

    #[test]
    fn test_selected_year_falls_back_to_latest() {
        let mut app = test_app();
        app.config.selected_year = "1999".to_string();
        assert_eq!(app.selected_year(), 2023);
        app.config.selected_year = "2020".to_string();
        assert_eq!(app.selected_year(), 2020);
    }

    #[test]
    fn test_can_add_fips_char() {
        assert!(can_add_fips_char(0, '0'));
        assert!(can_add_fips_char(4, '9'));
        assert!(!can_add_fips_char(5, '1'));
        assert!(!can_add_fips_char(0, 'a'));
        assert!(!can_add_fips_char(0, '-'));
    }
}
