//! Shared HTTP client construction and endpoint URL building.
//!
//! All platform calls (token, report create/status, download) go through one
//! `reqwest::Client` built here so timeouts and User-Agent stay consistent.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::constants::{CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/nicksrandall/ledger-report";

/// Connect and per-request timeouts for platform calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// TCP/TLS connect timeout in seconds.
    pub connect_secs: u64,
    /// Whole-request timeout in seconds.
    pub request_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: CONNECT_TIMEOUT_SECS,
            request_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Default User-Agent for all platform requests.
#[must_use]
pub fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("ledger-report/{version} (+{PROJECT_UA_URL})")
}

/// Builds the HTTP client used for every platform call.
///
/// # Errors
///
/// Returns the underlying `reqwest::Error` when the TLS backend or system
/// configuration cannot be initialised.
pub fn build_http_client(timeouts: HttpTimeouts) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.request_secs))
        .user_agent(default_user_agent())
        .gzip(true)
        .build()
}

/// Parses a base URL and normalises it to end with `/`, so relative joins
/// append instead of replacing the last path segment.
///
/// # Errors
///
/// Returns the parse error for strings that are not absolute URLs.
pub fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Joins a relative endpoint path onto a normalised base URL.
#[must_use]
pub fn endpoint(base: &Url, relative: &str) -> Url {
    base.join(relative.trim_start_matches('/'))
        .unwrap_or_else(|_| base.clone())
}
