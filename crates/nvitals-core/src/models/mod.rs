//! Data models for county statistics.
//!
//! - `CountyRecord`: one county's statistics for one year
//! - `YearDataset`, `TimeSeries`: per-year and per-county collections
//! - FIPS helpers for validating codes and naming states

pub mod fips;
pub mod record;

pub use fips::{normalize_fips, state_name, FIPS_WIDTH};
pub use record::{CountyRecord, Setting, TimeSeries, YearDataset, REPORT_YEARS};
