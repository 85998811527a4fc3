//! nvitals core - county drug overdose statistics.
//!
//! This crate holds everything the dashboard needs that is not terminal UI:
//!
//! - `models`: county records, yearly datasets, FIPS helpers
//! - `store`: key-value storage for the year cache and persisted flags
//! - `api`: HTTP client for the yearly dataset endpoint
//! - `loader`: cache-first, per-year time series loader
//! - `report`: report view state, trend chart, CSV export, share links
//! - `tutorial`: first-run tutorial wizard
//! - `config`: application configuration

pub mod api;
pub mod config;
pub mod loader;
pub mod models;
pub mod report;
pub mod store;
pub mod tutorial;
pub mod utils;

pub use config::Config;
