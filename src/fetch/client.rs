// src/fetch/client.rs
use crate::extractors::table::{ListingTables, TableExtractor};
use crate::fetch::models::{ListingSource, CURRENT_TABLE_ID, DEPRECATED_TABLE_ID};
use crate::utils::error::FetchError;
use reqwest::header;
use std::time::Duration;

const USER_AGENT: &str = concat!("escooter_extractor/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Creates a reqwest client configured for the listing site.
fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
}

/// Downloads a page as text. Non-2xx responses are errors; there are no retries.
pub async fn fetch_text(url: &str) -> Result<String, FetchError> {
    let client = build_client()?; // Propagate client build error if any

    tracing::info!("Downloading page from: {}", url);
    tracing::debug!("Using User-Agent: {}", USER_AGENT);

    let response = client.get(url)
        .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*")
        .send()
        .await?; // Propagates reqwest::Error as FetchError::Network

    // Check if the request was successful (status code 2xx)
    let status = response.status();
    if !status.is_success() {
        tracing::error!("HTTP error status: {} for URL: {}", status, url);
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        return Err(FetchError::Http(status));
    }

    let body = response.text().await?;
    tracing::debug!("Successfully downloaded {} bytes from {}", body.len(), url);

    Ok(body)
}

/// Fetches the listing page once and extracts both tables from it.
/// Returns the raw markup too, for debug dumps.
pub async fn fetch_listing(source: &ListingSource) -> Result<(String, ListingTables), FetchError> {
    let html = fetch_text(&source.url).await?;
    let tables = TableExtractor::new().extract_listing(&html, CURRENT_TABLE_ID, DEPRECATED_TABLE_ID);
    tracing::info!(
        "Extracted {} current and {} deprecated rows",
        tables.current.rows.len(),
        tables.deprecated.rows.len()
    );
    Ok((html, tables))
}
