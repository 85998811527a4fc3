//! County report view state.
//!
//! A `ReportView` is one report session for one county: the host hands it the
//! snapshot record for the selected year, starts a time series load, and the
//! view turns the snapshot and the loaded series into display rows.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::loader::LoadOutcome;
use crate::models::{state_name, CountyRecord, TimeSeries};
use crate::utils::{
    format_income, format_margin, format_number, format_percent, format_population, NOT_AVAILABLE,
};

use super::chart::{chart_rows, ChartRow, SUPPRESSED_LABEL};
use super::export::{export_csv, export_file_name, write_export};
use super::share::share_url;
use super::ReportError;

/// Compact overview or the expanded report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Summary,
    Full,
}

/// Progress of the time series backing the chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesStatus {
    NotLoaded,
    Loading,
    Loaded,
    /// Loaded with a failure part way; the series holds the years before it.
    Partial { error: String },
}

/// A labelled statistic with an optional caption.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub label: String,
    pub value: String,
    pub note: Option<String>,
}

impl Metric {
    fn new(label: impl Into<String>, value: String, note: Option<&str>) -> Self {
        Self {
            label: label.into(),
            value,
            note: note.map(str::to_string),
        }
    }
}

/// One row of the socioeconomic indicator table.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow {
    pub label: &'static str,
    pub value: String,
}

pub struct ReportView {
    county_name: String,
    fips: String,
    snapshot: CountyRecord,
    selected_year: String,
    mode: ReportMode,
    series: TimeSeries,
    status: SeriesStatus,
    loaded_at: Option<DateTime<Utc>>,
}

impl ReportView {
    pub fn new(county_name: &str, fips: &str, snapshot: CountyRecord, selected_year: &str) -> Self {
        Self {
            county_name: county_name.to_string(),
            fips: fips.to_string(),
            snapshot,
            selected_year: selected_year.to_string(),
            mode: ReportMode::Summary,
            series: TimeSeries::new(),
            status: SeriesStatus::NotLoaded,
            loaded_at: None,
        }
    }

    pub fn county_name(&self) -> &str {
        &self.county_name
    }

    pub fn fips(&self) -> &str {
        &self.fips
    }

    pub fn snapshot(&self) -> &CountyRecord {
        &self.snapshot
    }

    pub fn selected_year(&self) -> &str {
        &self.selected_year
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn status(&self) -> &SeriesStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == SeriesStatus::Loading
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    // =========================================================================
    // Mode
    // =========================================================================

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ReportMode::Summary => ReportMode::Full,
            ReportMode::Full => ReportMode::Summary,
        };
    }

    pub fn show_full(&mut self) {
        self.mode = ReportMode::Full;
    }

    pub fn show_summary(&mut self) {
        self.mode = ReportMode::Summary;
    }

    // =========================================================================
    // Loading
    // =========================================================================

    pub fn begin_load(&mut self) {
        self.status = SeriesStatus::Loading;
    }

    /// Replace the series with a finished load for this county.
    ///
    /// Returns false (and changes nothing) if the outcome is for another county.
    pub fn finish_load(&mut self, outcome: LoadOutcome) -> bool {
        if outcome.fips != self.fips {
            debug!(expected = %self.fips, got = %outcome.fips, "Ignoring load for another county");
            return false;
        }

        self.status = match outcome.failure {
            Some(ref e) => SeriesStatus::Partial {
                error: e.to_string(),
            },
            None => SeriesStatus::Loaded,
        };
        self.series = outcome.series;
        self.loaded_at = Some(outcome.finished_at);
        true
    }

    // =========================================================================
    // Display rows
    // =========================================================================

    /// `"<State> • FIPS: <fips>"`
    pub fn header_line(&self) -> String {
        format!("{} • FIPS: {}", state_name(&self.fips), self.fips)
    }

    fn overdose_value(&self, unit: &str) -> String {
        if self.snapshot.suppressed {
            SUPPRESSED_LABEL.to_string()
        } else {
            match self.snapshot.death_rate {
                Some(rate) => format!("{:.1}{}", rate, unit),
                None => NOT_AVAILABLE.to_string(),
            }
        }
    }

    /// The four summary-mode statistics, from the snapshot only.
    pub fn summary_metrics(&self) -> Vec<Metric> {
        vec![
            Metric::new(
                format!("Drug Overdose Rate ({})", self.selected_year),
                self.overdose_value(" per 100k"),
                None,
            ),
            Metric::new("Population", format_population(self.snapshot.population), None),
            Metric::new("Poverty Rate", format_percent(self.snapshot.poverty_rate), None),
            Metric::new(
                "Political Lean",
                format_margin(self.snapshot.political_margin),
                None,
            ),
        ]
    }

    /// The quick-stat tiles at the top of the full report.
    pub fn full_metrics(&self) -> Vec<Metric> {
        let year = &self.selected_year;
        vec![
            Metric::new(
                format!("Drug Overdose Rate ({})", year),
                self.overdose_value(""),
                Some("per 100,000 population"),
            ),
            Metric::new(
                format!("Suicide Rate ({})", year),
                format_number(self.snapshot.suicide_rate, 1),
                Some("per 100,000 population"),
            ),
            Metric::new(
                format!("Population ({})", year),
                format_population(self.snapshot.population),
                Some(self.snapshot.setting.display_name()),
            ),
            Metric::new(
                format!("Political Lean ({})", year),
                format_margin(self.snapshot.political_margin),
                Some("Republican margin"),
            ),
        ]
    }

    /// Trend chart rows, or `None` while the series is loading.
    pub fn chart_rows(&self) -> Option<Vec<ChartRow>> {
        if self.is_loading() {
            None
        } else {
            Some(chart_rows(&self.series))
        }
    }

    pub fn indicator_rows(&self) -> Vec<IndicatorRow> {
        vec![
            IndicatorRow {
                label: "Poverty Rate",
                value: format_percent(self.snapshot.poverty_rate),
            },
            IndicatorRow {
                label: "Unemployment Rate",
                value: format_percent(self.snapshot.unemployment_rate),
            },
            IndicatorRow {
                label: "Median Income (Estimated)",
                value: format_income(self.snapshot.median_income),
            },
            IndicatorRow {
                label: "Setting",
                value: self.snapshot.setting.display_name().to_string(),
            },
        ]
    }

    // =========================================================================
    // Actions
    // =========================================================================

    pub fn export_csv(&self) -> Result<String, ReportError> {
        export_csv(&self.series)
    }

    pub fn export_file_name(&self) -> String {
        export_file_name(&self.county_name, &self.fips)
    }

    pub fn write_export(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        write_export(dir, &self.county_name, &self.fips, &self.series)
    }

    pub fn share_url(&self, origin: &str) -> Result<String, ReportError> {
        share_url(origin, &self.fips)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadError;
    use crate::api::ApiError;
    use crate::models::Setting;

    fn snapshot() -> CountyRecord {
        CountyRecord {
            fips: "01001".to_string(),
            death_rate: Some(25.4),
            suicide_rate: Some(17.2),
            political_margin: Some(44.2),
            unemployment_rate: Some(3.1),
            poverty_rate: Some(12.5),
            median_income: Some(58731.0),
            population: Some(58805),
            setting: Setting::Rural,
            ..Default::default()
        }
    }

    fn outcome(fips: &str, years: &[(u16, f64)], failure: Option<LoadError>) -> LoadOutcome {
        LoadOutcome {
            fips: fips.to_string(),
            series: years
                .iter()
                .map(|&(y, rate)| {
                    (
                        y,
                        CountyRecord {
                            fips: fips.to_string(),
                            death_rate: Some(rate),
                            ..Default::default()
                        },
                    )
                })
                .collect(),
            failure,
            finished_at: Utc::now(),
        }
    }

    #[test]
    fn test_summary_metrics() {
        let view = ReportView::new("Autauga County", "01001", snapshot(), "2023");
        let values: Vec<String> = view.summary_metrics().into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec!["25.4 per 100k", "58,805", "12.5%", "R+44.2%"]);
        assert_eq!(view.summary_metrics()[0].label, "Drug Overdose Rate (2023)");
    }

    #[test]
    fn test_suppressed_snapshot_never_shows_rate() {
        let record = CountyRecord {
            suppressed: true,
            ..snapshot()
        };
        let mut view = ReportView::new("Autauga County", "01001", record.clone(), "2023");
        assert_eq!(view.summary_metrics()[0].value, "Suppressed");
        assert_eq!(view.full_metrics()[0].value, "Suppressed");

        view.begin_load();
        let mut loaded = outcome("01001", &[], None);
        loaded.series.insert(2023, record);
        view.finish_load(loaded);
        let rows = view.chart_rows().unwrap();
        assert_eq!(rows[0].label, "Suppressed");
        for metric in view.summary_metrics().iter().chain(view.full_metrics().iter()) {
            assert!(!metric.value.contains("25.4"));
        }
    }

    #[test]
    fn test_absent_fields_render_na() {
        let record = CountyRecord {
            fips: "01001".to_string(),
            ..Default::default()
        };
        let view = ReportView::new("Autauga County", "01001", record, "2023");

        let values: Vec<String> = view.summary_metrics().into_iter().map(|m| m.value).collect();
        assert_eq!(values, vec!["N/A", "N/A", "N/A", "N/A"]);

        let indicators: Vec<String> = view.indicator_rows().into_iter().map(|r| r.value).collect();
        assert_eq!(indicators, vec!["N/A", "N/A", "$N/A", "Unknown"]);

        for metric in view.full_metrics() {
            assert!(!metric.value.contains("null"));
            assert!(!metric.value.contains("undefined"));
            assert_ne!(metric.value, "0");
        }
    }

    #[test]
    fn test_indicator_rows() {
        let view = ReportView::new("Autauga County", "01001", snapshot(), "2023");
        let rows = view.indicator_rows();
        assert_eq!(rows[0].label, "Poverty Rate");
        assert_eq!(rows[1].value, "3.1%");
        assert_eq!(rows[2].value, "$58,731");
        assert_eq!(rows[3].value, "Rural");
    }

    #[test]
    fn test_full_metrics_notes() {
        let view = ReportView::new("Autauga County", "01001", snapshot(), "2021");
        let tiles = view.full_metrics();
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[1].label, "Suicide Rate (2021)");
        assert_eq!(tiles[2].note.as_deref(), Some("Rural"));
        assert_eq!(tiles[3].note.as_deref(), Some("Republican margin"));
    }

    #[test]
    fn test_toggle_mode_keeps_series() {
        let mut view = ReportView::new("Autauga County", "01001", snapshot(), "2023");
        view.begin_load();
        assert!(view.chart_rows().is_none());
        view.finish_load(outcome("01001", &[(2018, 20.0), (2019, 30.0)], None));

        let before = view.series().clone();
        for _ in 0..5 {
            view.toggle_mode();
        }
        assert_eq!(view.mode(), ReportMode::Full);
        assert_eq!(view.series(), &before);
        assert_eq!(view.status(), &SeriesStatus::Loaded);
    }

    #[test]
    fn test_finish_load_ignores_other_county() {
        let mut view = ReportView::new("Autauga County", "01001", snapshot(), "2023");
        view.begin_load();
        assert!(!view.finish_load(outcome("06037", &[(2018, 20.0)], None)));
        assert!(view.is_loading());
        assert!(view.series().is_empty());
    }

    #[test]
    fn test_partial_load_keeps_years() {
        let mut view = ReportView::new("Autauga County", "01001", snapshot(), "2023");
        view.begin_load();
        let failure = LoadError::Fetch {
            year: 2020,
            source: ApiError::ServerError("boom".to_string()),
        };
        view.finish_load(outcome("01001", &[(2018, 20.0), (2019, 30.0)], Some(failure)));

        assert!(matches!(view.status(), SeriesStatus::Partial { .. }));
        assert_eq!(view.chart_rows().unwrap().len(), 2);
    }

    #[test]
    fn test_header_and_actions() {
        let view = ReportView::new("Autauga County", "01001", snapshot(), "2023");
        assert_eq!(view.header_line(), "Alabama • FIPS: 01001");
        assert_eq!(view.export_file_name(), "Autauga_County_01001_data.csv");
        assert_eq!(
            view.share_url("https://nvitals.org").unwrap(),
            "https://nvitals.org/?county=01001"
        );
    }
}
