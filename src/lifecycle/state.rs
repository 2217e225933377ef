//! Lifecycle states and the terminal outcome handed to callers.

use std::fmt;
use std::path::{Path, PathBuf};

/// States of one report retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Obtaining a token and submitting the report request.
    Requesting,
    /// Checking report status until it completes, fails or attempts run out.
    Polling,
    /// Fetching the finished file and handing it to the sink.
    Downloading,
    /// Report stored.
    Done,
    /// No usable token could be obtained.
    AuthFailed,
    /// The create-report call failed.
    RequestFailed,
    /// The report never became available (attempts exhausted, server-reported
    /// failure, or an unusable status response).
    PollExhausted,
    /// Fetching the finished file failed.
    DownloadFailed,
    /// The downloaded file could not be persisted.
    StoreFailed,
}

impl LifecycleState {
    /// Returns true for `Done` and every failure state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Requesting | Self::Polling | Self::Downloading)
    }

    /// Returns the stable upper-case label used in logs and diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requesting => "REQUESTING",
            Self::Polling => "POLLING",
            Self::Downloading => "DOWNLOADING",
            Self::Done => "DONE",
            Self::AuthFailed => "AUTH_FAILED",
            Self::RequestFailed => "REQUEST_FAILED",
            Self::PollExhausted => "POLL_EXHAUSTED",
            Self::DownloadFailed => "DOWNLOAD_FAILED",
            Self::StoreFailed => "STORE_FAILED",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse result surfaced to a driving caller such as the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCategory {
    /// Report stored.
    Success,
    /// Credentials were rejected or the token endpoint was unusable.
    AuthenticationFailure,
    /// Request, poll, download or store failed.
    RetrievalFailure,
}

impl OutcomeCategory {
    /// Process exit code for this category: 0, 2 or 1.
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::AuthenticationFailure => 2,
            Self::RetrievalFailure => 1,
        }
    }
}

/// Terminal result of a report retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The report was downloaded and stored.
    Success {
        /// Report id assigned by the platform.
        report_id: String,
        /// Absolute path of the stored file.
        locator: PathBuf,
    },
    /// Retrieval stopped in a failure state.
    Failure {
        /// The failure state reached.
        state: LifecycleState,
        /// Which phase failed and the last known status code/body.
        detail: String,
    },
}

impl Outcome {
    pub(crate) fn failure(state: LifecycleState, detail: impl Into<String>) -> Self {
        Self::Failure {
            state,
            detail: detail.into(),
        }
    }

    /// Returns the terminal state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        match self {
            Self::Success { .. } => LifecycleState::Done,
            Self::Failure { state, .. } => *state,
        }
    }

    /// Maps the outcome onto the tri-state caller surface.
    #[must_use]
    pub fn category(&self) -> OutcomeCategory {
        match self.state() {
            LifecycleState::Done => OutcomeCategory::Success,
            LifecycleState::AuthFailed => OutcomeCategory::AuthenticationFailure,
            _ => OutcomeCategory::RetrievalFailure,
        }
    }

    /// Returns true when the report was stored.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the stored file path on success.
    #[must_use]
    pub fn locator(&self) -> Option<&Path> {
        match self {
            Self::Success { locator, .. } => Some(locator),
            Self::Failure { .. } => None,
        }
    }

    /// Returns the failure detail, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { detail, .. } => Some(detail),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { report_id, locator } => {
                write!(f, "report {report_id} saved to {}", locator.display())
            }
            Self::Failure { state, detail } => write!(f, "{state}: {detail}"),
        }
    }
}
