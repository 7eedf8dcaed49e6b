//! HTTP fetching of score sheets and rosters.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, LAST_MODIFIED};
use tracing::debug;

/// A fetched document and the time its source says it was last changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub body: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// GETs `url` and returns its body as text.
///
/// # Errors
///
/// Returns an error on transport failures and non-success status codes.
pub async fn fetch_text<C: HttpClient>(client: &C, url: &str) -> Result<Fetched> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client
        .execute(req)
        .await
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()?;

    let last_modified = parse_last_modified(resp.headers());
    let body = resp.text().await?;
    debug!(bytes = body.len(), ?last_modified, "Fetched document");

    Ok(Fetched {
        body,
        last_modified,
    })
}

/// Reads the `Last-Modified` header (RFC 2822 / HTTP-date format).
pub fn parse_last_modified(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let value = headers.get(LAST_MODIFIED)?.to_str().ok()?;
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
