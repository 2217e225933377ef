//! Report API gateway: create a report, read its status, fetch the file.
//!
//! The gateway performs exactly one HTTP call per operation and never
//! retries; retry decisions belong to the lifecycle orchestrator.
//!
//! - [`ReportGateway`] - async trait the orchestrator depends on
//! - [`HttpReportGateway`] - reqwest implementation
//! - [`ReportRequest`], [`ReportHandle`], [`ReportStatus`] - call parameters and results

mod client;
mod error;
mod report;

pub use client::HttpReportGateway;
pub use error::GatewayError;
pub use report::{ReportFormat, ReportHandle, ReportRequest, ReportRequestError, ReportStatus};

use async_trait::async_trait;

use crate::auth::AccessToken;

/// The three remote report operations.
///
/// Uses `async_trait` so the orchestrator can hold `Arc<dyn ReportGateway>`.
#[async_trait]
pub trait ReportGateway: Send + Sync {
    /// Submits a report-generation request and returns its handle.
    async fn create_report(
        &self,
        token: &AccessToken,
        request: &ReportRequest,
    ) -> Result<ReportHandle, GatewayError>;

    /// Reads the current status of a report job.
    async fn get_status(
        &self,
        token: &AccessToken,
        handle: &ReportHandle,
    ) -> Result<ReportStatus, GatewayError>;

    /// Downloads a finished report from the URL the platform returned.
    async fn fetch_file(&self, url: &str) -> Result<Vec<u8>, GatewayError>;
}
