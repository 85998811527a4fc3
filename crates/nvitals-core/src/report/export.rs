//! CSV export of a county's time series.
//!
//! The document is comma-delimited with `\n` line endings and no quoting.
//! Values are written as stored; the suppression display rule does not apply
//! to exports.

use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use crate::models::TimeSeries;
use crate::utils::NOT_AVAILABLE;

use super::ReportError;

pub const EXPORT_HEADER: [&str; 6] = [
    "Year",
    "Drug Death Rate",
    "Suicide Rate",
    "Unemployment",
    "Poverty Rate",
    "Population",
];

fn cell<T: ToString>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Render the series as a CSV document, one row per loaded year.
pub fn export_csv(series: &TimeSeries) -> Result<String, ReportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(EXPORT_HEADER)?;
    for (year, record) in series {
        writer.write_record([
            year.to_string(),
            cell(record.death_rate),
            cell(record.suicide_rate),
            cell(record.unemployment_rate),
            cell(record.poverty_rate),
            cell(record.population),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Encoding(e.to_string()))
}

/// `<name with whitespace runs replaced by _>_<fips>_data.csv`
pub fn export_file_name(county_name: &str, fips: &str) -> String {
    let mut name = String::with_capacity(county_name.len());
    let mut in_whitespace = false;
    for c in county_name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                name.push('_');
            }
            in_whitespace = true;
        } else {
            name.push(c);
            in_whitespace = false;
        }
    }
    format!("{}_{}_data.csv", name, fips)
}

/// Write the export into `dir`, returning the path of the new file.
pub fn write_export(
    dir: &Path,
    county_name: &str,
    fips: &str,
    series: &TimeSeries,
) -> Result<PathBuf, ReportError> {
    let contents = export_csv(series)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(county_name, fips));
    std::fs::write(&path, contents)?;
    info!(path = %path.display(), years = series.len(), "Exported time series");
    Ok(path)
}
