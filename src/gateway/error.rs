//! Error types for report API calls.

use thiserror::Error;

/// Errors returned by the report gateway.
///
/// HTTP-status failures and body-shape failures are separate variants so the
/// orchestrator can retry the former while polling and fail fast on the latter.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The endpoint answered with a non-200 status.
    #[error("HTTP {status} from {url}: {body}")]
    NonOkStatus {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Response body, kept verbatim for diagnosis.
        body: String,
    },

    /// The endpoint answered 200 but the body was not the expected JSON shape.
    #[error("malformed response from {url}: {reason}")]
    MalformedResponse {
        /// The request URL.
        url: String,
        /// What was missing or invalid.
        reason: String,
    },

    /// Network-level error (DNS, connection refused, TLS, timeout).
    #[error("network error calling {url}: {source}")]
    Transport {
        /// The request URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The platform handed back a download URL that does not parse.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl GatewayError {
    /// Creates a non-200 status error.
    pub fn non_ok(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::NonOkStatus {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns the HTTP status associated with the failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NonOkStatus { status, .. } => Some(*status),
            Self::MalformedResponse { .. } => Some(200),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::InvalidUrl { .. } => None,
        }
    }
}
