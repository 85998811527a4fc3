//! API client for the county dataset server.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{header, Client};
use tracing::debug;

use crate::models::YearDataset;

use super::{ApiError, YearSource};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the yearly dataset endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url` (e.g. `https://example.org`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn year_url(&self, year: u16) -> String {
        format!("{}/api/years/{}", self.base_url, year)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Fetch the full dataset for one year.
    pub async fn fetch_year(&self, year: u16) -> Result<YearDataset, ApiError> {
        let url = self.year_url(year);
        debug!(url = %url, "Fetching year dataset");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        let dataset: YearDataset = serde_json::from_str(&text)?;

        debug!(year, counties = dataset.len(), "Fetched year dataset");
        Ok(dataset)
    }
}

impl YearSource for ApiClient {
    fn fetch_year(&self, year: u16) -> BoxFuture<'_, Result<YearDataset, ApiError>> {
        Box::pin(ApiClient::fetch_year(self, year))
    }
}
