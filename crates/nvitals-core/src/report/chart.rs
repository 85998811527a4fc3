use crate::models::TimeSeries;
use crate::utils::format_number;

/// Lower bound on the chart's scale so low-rate counties get short bars.
pub const MIN_CHART_SCALE: f64 = 50.0;

/// Label shown instead of a rate for suppressed records.
pub const SUPPRESSED_LABEL: &str = "Suppressed";

/// One horizontal bar in the overdose trend chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub year: u16,
    /// Bar width in percent of the chart, in `[0, 100]`.
    pub width_percent: f64,
    pub label: String,
    pub suppressed: bool,
}

impl ChartRow {
    /// Bar width as a ratio in `[0, 1]`.
    pub fn ratio(&self) -> f64 {
        self.width_percent / 100.0
    }
}

/// Chart denominator: the largest death rate in the series, at least 50.
///
/// Suppressed years still contribute their stored rate; absent rates count as 0.
pub fn chart_scale(series: &TimeSeries) -> f64 {
    series
        .values()
        .map(|r| r.death_rate.unwrap_or(0.0))
        .fold(MIN_CHART_SCALE, f64::max)
}

pub fn chart_rows(series: &TimeSeries) -> Vec<ChartRow> {
    let scale = chart_scale(series);

    series
        .iter()
        .map(|(&year, record)| {
            let rate = record.death_rate.unwrap_or(0.0).max(0.0);
            let label = if record.suppressed {
                SUPPRESSED_LABEL.to_string()
            } else {
                format_number(record.death_rate, 1)
            };
            ChartRow {
                year,
                width_percent: (rate / scale * 100.0).min(100.0),
                label,
                suppressed: record.suppressed,
            }
        })
        .collect()
}
