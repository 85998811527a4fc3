//! HTTP client for the yearly county datasets.
//!
//! `ApiClient` fetches `GET /api/years/<YYYY>`, whose body is a JSON object
//! mapping FIPS codes to county records. The `YearSource` trait is the seam
//! the time series loader fetches through.

pub mod client;
pub mod error;

use futures::future::BoxFuture;

use crate::models::YearDataset;

pub use client::ApiClient;
pub use error::ApiError;

/// Anything that can produce the full dataset for one year.
pub trait YearSource: Send + Sync {
    fn fetch_year(&self, year: u16) -> BoxFuture<'_, Result<YearDataset, ApiError>>;
}
