//! Report lifecycle orchestrator: request, poll, download, store.
//!
//! ```text
//! REQUESTING ──► POLLING ──► DOWNLOADING ──► DONE
//!     │             │              │
//!     ▼             ▼              ▼
//! AUTH_FAILED   POLL_EXHAUSTED  DOWNLOAD_FAILED / STORE_FAILED
//! REQUEST_FAILED (AUTH_FAILED)
//! ```
//!
//! The orchestrator runs one report strictly sequentially. The only
//! suspension point is the wait between status checks, which goes through the
//! injected [`Clock`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use ledger_report_core::auth::{Credentials, TokenProvider};
//! use ledger_report_core::clock::SystemClock;
//! use ledger_report_core::gateway::HttpReportGateway;
//! use ledger_report_core::http_client::{HttpTimeouts, build_http_client, parse_base_url};
//! use ledger_report_core::lifecycle::LifecycleOrchestrator;
//! use ledger_report_core::sink::FileSink;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = build_http_client(HttpTimeouts::default())?;
//! let base = parse_base_url("https://api.vipps.no")?;
//! let credentials = Credentials::new("id", "secret", "key");
//! let clock = Arc::new(SystemClock);
//!
//! let gateway = HttpReportGateway::new(client.clone(), &base, credentials.subscription_key());
//! let tokens = TokenProvider::new(client, &base, credentials, clock.clone());
//! let orchestrator = LifecycleOrchestrator::new(
//!     Arc::new(tokens),
//!     Arc::new(gateway),
//!     Arc::new(FileSink::new(".")),
//!     clock,
//! );
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?;
//! let end = NaiveDate::from_ymd_opt(2024, 1, 31).ok_or("bad date")?;
//! let outcome = orchestrator.run(start, end).await;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

mod poll;
mod state;

pub use poll::{
    Backoff, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_MAX_DELAY, PollDecision, PollFailure, PollPolicy,
    classify_poll_error,
};
pub use state::{LifecycleState, Outcome, OutcomeCategory};

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::auth::{AccessToken, TokenSource};
use crate::clock::Clock;
use crate::gateway::{ReportGateway, ReportHandle, ReportRequest, ReportStatus};
use crate::sink::{ReportArtifact, ResultSink};

/// Drives one report from request to stored file.
///
/// Not meant to be run concurrently against one shared session unless the
/// [`TokenSource`] serialises refreshes (the bundled
/// [`TokenProvider`](crate::auth::TokenProvider) does).
pub struct LifecycleOrchestrator {
    tokens: Arc<dyn TokenSource>,
    gateway: Arc<dyn ReportGateway>,
    sink: Arc<dyn ResultSink>,
    clock: Arc<dyn Clock>,
    policy: PollPolicy,
}

impl LifecycleOrchestrator {
    /// Creates an orchestrator with the default poll policy (10 checks, 5s apart).
    #[must_use]
    pub fn new(
        tokens: Arc<dyn TokenSource>,
        gateway: Arc<dyn ReportGateway>,
        sink: Arc<dyn ResultSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tokens,
            gateway,
            sink,
            clock,
            policy: PollPolicy::default(),
        }
    }

    /// Replaces the poll policy.
    #[must_use]
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the active poll policy.
    #[must_use]
    pub fn poll_policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Retrieves the CSV report for `start..=end`.
    ///
    /// An inverted range ends in [`LifecycleState::RequestFailed`] before any
    /// network call.
    pub async fn run(&self, start: NaiveDate, end: NaiveDate) -> Outcome {
        match ReportRequest::new(start, end) {
            Ok(request) => self.run_request(&request).await,
            Err(error) => Outcome::failure(
                LifecycleState::RequestFailed,
                format!("report request rejected before sending: {error}"),
            ),
        }
    }

    /// Retrieves the report described by `request`.
    #[instrument(skip_all, fields(start = %request.start_date(), end = %request.end_date()))]
    pub async fn run_request(&self, request: &ReportRequest) -> Outcome {
        let outcome = match self.execute(request).await {
            Ok(outcome) | Err(outcome) => outcome,
        };

        match &outcome {
            Outcome::Success { report_id, locator } => {
                info!(report_id = %report_id, path = %locator.display(), state = %LifecycleState::Done, "report retrieved");
            }
            Outcome::Failure { state, detail } => {
                warn!(state = %state, detail = %detail, "report retrieval failed");
            }
        }
        outcome
    }

    async fn execute(&self, request: &ReportRequest) -> Result<Outcome, Outcome> {
        let handle = self.request(request).await?;
        let download_url = self.poll(&handle).await?;
        self.download(&handle, &download_url).await
    }

    /// REQUESTING: token, then create-report.
    async fn request(&self, request: &ReportRequest) -> Result<ReportHandle, Outcome> {
        debug!(state = %LifecycleState::Requesting, "entering state");
        let token = self.token("requesting report").await?;

        let handle = self
            .gateway
            .create_report(&token, request)
            .await
            .map_err(|error| {
                Outcome::failure(
                    LifecycleState::RequestFailed,
                    format!("report request failed: {error}"),
                )
            })?;

        info!(report_id = %handle, "report accepted; polling for completion");
        Ok(handle)
    }

    /// POLLING: status checks until completed, failed or out of attempts.
    ///
    /// Returns the download URL on completion.
    async fn poll(&self, handle: &ReportHandle) -> Result<String, Outcome> {
        debug!(state = %LifecycleState::Polling, report_id = %handle, "entering state");
        let mut attempt: u32 = 0;

        loop {
            let token = self.token("polling report status").await?;
            attempt += 1;

            let observed = match self.gateway.get_status(&token, handle).await {
                Ok(ReportStatus::Completed { download_url }) => {
                    info!(report_id = %handle, attempt, "report ready");
                    return Ok(download_url);
                }
                Ok(ReportStatus::Failed { status }) => {
                    return Err(Outcome::failure(
                        LifecycleState::PollExhausted,
                        format!(
                            "report {handle} failed on the platform with status {status} (status check {attempt})"
                        ),
                    ));
                }
                Ok(ReportStatus::Pending { status }) => {
                    info!(report_id = %handle, attempt, status = %status, "report not ready yet");
                    format!("status {status}")
                }
                Err(error) => match classify_poll_error(&error) {
                    PollFailure::Permanent => {
                        return Err(Outcome::failure(
                            LifecycleState::PollExhausted,
                            format!("unusable status response for report {handle}: {error}"),
                        ));
                    }
                    PollFailure::Transient => {
                        warn!(report_id = %handle, attempt, error = %error, "status check failed");
                        error.to_string()
                    }
                },
            };

            match self.policy.after_attempt(attempt) {
                PollDecision::Wait { delay, .. } => self.clock.sleep(delay).await,
                PollDecision::GiveUp { reason } => {
                    return Err(Outcome::failure(
                        LifecycleState::PollExhausted,
                        format!(
                            "report {handle} not ready after {attempt} status check(s), {reason}; last observed: {observed}"
                        ),
                    ));
                }
            }
        }
    }

    /// DOWNLOADING: fetch the file, then hand it to the sink.
    async fn download(&self, handle: &ReportHandle, url: &str) -> Result<Outcome, Outcome> {
        debug!(state = %LifecycleState::Downloading, report_id = %handle, "entering state");

        let bytes = self.gateway.fetch_file(url).await.map_err(|error| {
            Outcome::failure(
                LifecycleState::DownloadFailed,
                format!("download of report {handle} failed: {error}"),
            )
        })?;

        let artifact = ReportArtifact::new(handle.report_id(), bytes);
        let locator = self.sink.store(&artifact).await.map_err(|error| {
            Outcome::failure(
                LifecycleState::StoreFailed,
                format!("report {handle} downloaded but could not be saved: {error}"),
            )
        })?;

        Ok(Outcome::Success {
            report_id: handle.report_id().to_string(),
            locator,
        })
    }

    async fn token(&self, phase: &str) -> Result<AccessToken, Outcome> {
        self.tokens.valid_token().await.map_err(|error| {
            Outcome::failure(
                LifecycleState::AuthFailed,
                format!("authentication failed while {phase}: {error}"),
            )
        })
    }
}
