//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use ledger_report_core::http_client::{HttpTimeouts, build_http_client, parse_base_url};
use ledger_report_core::{Credentials, ManualClock, TokenProvider};
use url::Url;
use wiremock::MockServer;

pub const CLIENT_ID: &str = "client-123";
pub const CLIENT_SECRET: &str = "s3cret";
pub const SUBSCRIPTION_KEY: &str = "sub-key";

/// `Basic base64("client-123:s3cret")`.
pub const BASIC_AUTH: &str = "Basic Y2xpZW50LTEyMzpzM2NyZXQ=";

pub fn credentials() -> Credentials {
    Credentials::new(CLIENT_ID, CLIENT_SECRET, SUBSCRIPTION_KEY)
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap()
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(epoch()))
}

pub fn base_url(server: &MockServer) -> Url {
    parse_base_url(&server.uri()).unwrap()
}

pub fn client() -> reqwest::Client {
    build_http_client(HttpTimeouts {
        connect_secs: 5,
        request_secs: 10,
    })
    .unwrap()
}

pub fn token_provider(server: &MockServer, clock: Arc<ManualClock>) -> TokenProvider {
    TokenProvider::new(client(), &base_url(server), credentials(), clock)
}
