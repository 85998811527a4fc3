use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Years covered by the county report, in display order.
pub const REPORT_YEARS: [u16; 6] = [2018, 2019, 2020, 2021, 2022, 2023];

/// One county's dataset for a single year, keyed by FIPS code.
pub type YearDataset = HashMap<String, CountyRecord>;

/// Per-year records for one county. Years with no data are absent keys.
pub type TimeSeries = BTreeMap<u16, CountyRecord>;

/// Urban/rural classification of a county.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Setting {
    Urban,
    Rural,
    #[default]
    Unknown,
}

impl Setting {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()) {
            Some(v) if v == "urban" => Setting::Urban,
            Some(v) if v == "rural" => Setting::Rural,
            _ => Setting::Unknown,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Setting::Urban => "Urban",
            Setting::Rural => "Rural",
            Setting::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl<'de> Deserialize<'de> for Setting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(Setting::parse(raw.as_deref()))
    }
}

/// Statistics for one county in one year.
///
/// `suppressed` dominates `death_rate`: a suppressed record must never show
/// its stored rate in any rendered view.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CountyRecord {
    pub fips: String,
    #[serde(rename = "DrugDeaths", default, deserialize_with = "finite")]
    pub death_count: Option<f64>,
    #[serde(rename = "DrugDeathRate", default, deserialize_with = "finite")]
    pub death_rate: Option<f64>,
    #[serde(rename = "Is_Suppressed", default, deserialize_with = "flag")]
    pub suppressed: bool,
    #[serde(rename = "SuicideRate", default, deserialize_with = "finite")]
    pub suicide_rate: Option<f64>,
    #[serde(rename = "RepublicanMargin", default, deserialize_with = "finite")]
    pub political_margin: Option<f64>,
    #[serde(rename = "UnemploymentRate", default, deserialize_with = "finite")]
    pub unemployment_rate: Option<f64>,
    #[serde(rename = "PovertyRate", default, deserialize_with = "finite")]
    pub poverty_rate: Option<f64>,
    #[serde(rename = "MedianIncome", default, deserialize_with = "finite")]
    pub median_income: Option<f64>,
    #[serde(rename = "Population", default, deserialize_with = "whole")]
    pub population: Option<u64>,
    #[serde(rename = "urban_rural", default)]
    pub setting: Setting,
}

impl CountyRecord {
    /// The death rate only when it may be shown to the user.
    pub fn visible_death_rate(&self) -> Option<f64> {
        if self.suppressed {
            None
        } else {
            self.death_rate
        }
    }
}

fn finite<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()))
}

// Population arrives as a float in some dataset years (e.g. 10234.0).
fn whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.round() as u64))
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value: Option<bool> = Option::deserialize(deserializer)?;
    Ok(value.unwrap_or(false))
}
