use url::Url;

use super::ReportError;

/// Query parameter the dashboard reads the county from on load.
pub const SHARE_PARAM: &str = "county";

/// Build `<origin>/?county=<fips>`.
pub fn share_url(origin: &str, fips: &str) -> Result<String, ReportError> {
    let mut url = Url::parse(origin)?;
    url.set_path("/");
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut().append_pair(SHARE_PARAM, fips);
    Ok(url.to_string())
}
