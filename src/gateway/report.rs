//! Report request, handle and status types.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Output format of a ledger report. Only CSV is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum ReportFormat {
    /// Comma-separated values.
    #[default]
    #[serde(rename = "CSV")]
    Csv,
}

/// Rejected report parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportRequestError {
    /// The range ends before it starts.
    #[error("invalid date range: start date {start} is after end date {end}")]
    InvertedRange {
        /// Requested first day.
        start: NaiveDate,
        /// Requested last day.
        end: NaiveDate,
    },
}

/// Body of a create-report call.
///
/// Serialises to exactly `{"format":"CSV","startDate":"YYYY-MM-DD","endDate":"YYYY-MM-DD"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    format: ReportFormat,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl ReportRequest {
    /// Creates a CSV report request for `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportRequestError::InvertedRange`] when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportRequestError> {
        if start > end {
            return Err(ReportRequestError::InvertedRange { start, end });
        }
        Ok(Self {
            format: ReportFormat::Csv,
            start_date: start,
            end_date: end,
        })
    }

    /// First day covered by the report.
    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day covered by the report.
    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Requested output format.
    #[must_use]
    pub fn format(&self) -> ReportFormat {
        self.format
    }
}

/// Identifier of a server-side report job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportHandle {
    report_id: String,
}

impl ReportHandle {
    /// Wraps a report id returned by the platform.
    #[must_use]
    pub fn new(report_id: impl Into<String>) -> Self {
        Self {
            report_id: report_id.into(),
        }
    }

    /// Returns the report id.
    #[must_use]
    pub fn report_id(&self) -> &str {
        &self.report_id
    }
}

impl fmt::Display for ReportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report_id)
    }
}

/// Status strings the platform uses for jobs that will never complete.
const FAILURE_STATUSES: [&str; 6] = ["FAILED", "ERROR", "CANCELLED", "CANCELED", "EXPIRED", "REJECTED"];

/// Server-reported state of a report job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportStatus {
    /// Still generating, or a status string this client does not recognise.
    Pending {
        /// Raw status string as reported.
        status: String,
    },
    /// Ready for download.
    Completed {
        /// Absolute URL of the generated file.
        download_url: String,
    },
    /// The platform gave up on the job.
    Failed {
        /// Raw status string as reported.
        status: String,
    },
}

impl ReportStatus {
    /// Interprets a raw status string and optional report URL.
    ///
    /// Matching is case-insensitive. Unknown statuses map to
    /// [`ReportStatus::Pending`].
    ///
    /// # Errors
    ///
    /// Returns a reason string when the status is `COMPLETED` but no usable
    /// URL accompanies it.
    pub fn from_parts(status: &str, report_url: Option<String>) -> Result<Self, String> {
        let normalized = status.trim();
        if normalized.eq_ignore_ascii_case("COMPLETED") {
            return report_url
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .map(|download_url| Self::Completed { download_url })
                .ok_or_else(|| "status COMPLETED without reportUrl".to_string());
        }

        if FAILURE_STATUSES
            .iter()
            .any(|failure| normalized.eq_ignore_ascii_case(failure))
        {
            return Ok(Self::Failed {
                status: normalized.to_string(),
            });
        }

        Ok(Self::Pending {
            status: normalized.to_string(),
        })
    }

    /// Short label used in logs and diagnostics.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Pending { status } | Self::Failed { status } => status,
            Self::Completed { .. } => "COMPLETED",
        }
    }
}
