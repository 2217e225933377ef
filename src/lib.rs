//! Ledger Report Core Library
//!
//! Retrieves asynchronously generated ledger reports from the payment
//! platform: authenticate, request a report for a date range, poll until it
//! is ready, download it and store it on disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`auth`] - Credentials and the caching token provider
//! - [`gateway`] - The three report API calls (create, status, fetch)
//! - [`lifecycle`] - Request → poll → download state machine
//! - [`sink`] - Persistence of downloaded reports
//! - [`clock`] - Injectable time source and wait
//! - [`http_client`] - Shared reqwest client and endpoint URL helpers

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod clock;
pub mod constants;
pub mod gateway;
pub mod http_client;
pub mod lifecycle;
pub mod sink;

// Re-export commonly used types
pub use auth::{AccessToken, AuthError, Credentials, TokenProvider, TokenSource};
pub use clock::{Clock, ManualClock, SystemClock};
pub use gateway::{
    GatewayError, HttpReportGateway, ReportGateway, ReportHandle, ReportRequest, ReportStatus,
};
pub use lifecycle::{
    Backoff, LifecycleOrchestrator, LifecycleState, Outcome, OutcomeCategory, PollPolicy,
};
pub use sink::{FileSink, ReportArtifact, ResultSink, SinkError};
