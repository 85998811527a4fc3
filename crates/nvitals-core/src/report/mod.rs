//! County report: summary/full view state, trend chart, export and sharing.

pub mod chart;
pub mod export;
pub mod share;
pub mod view;

use thiserror::Error;

pub use chart::{chart_rows, chart_scale, ChartRow, MIN_CHART_SCALE, SUPPRESSED_LABEL};
pub use export::{export_csv, export_file_name, write_export, EXPORT_HEADER};
pub use share::{share_url, SHARE_PARAM};
pub use view::{IndicatorRow, Metric, ReportMode, ReportView, SeriesStatus};

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("Invalid share origin: {0}")]
    InvalidOrigin(#[from] url::ParseError),
}
