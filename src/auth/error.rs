//! Error types for the authentication exchange.

use thiserror::Error;

/// Errors that can occur while obtaining an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint answered with a non-200 status.
    #[error("[AUTH] token endpoint {url} returned HTTP {status}: {body}")]
    Rejected {
        /// The token endpoint URL.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Response body, kept verbatim for operator diagnosis.
        body: String,
    },

    /// The token endpoint could not be reached.
    #[error("[AUTH] network error calling {url}: {source}")]
    Transport {
        /// The token endpoint URL.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The token endpoint answered 200 but the body lacked the expected fields.
    #[error("[AUTH] malformed token response from {url}: {reason}")]
    MalformedResponse {
        /// The token endpoint URL.
        url: String,
        /// What was wrong with the body.
        reason: String,
    },
}

impl AuthError {
    /// Creates a rejected-credentials error.
    pub fn rejected(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Rejected {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns the HTTP status when the endpoint answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            Self::MalformedResponse { .. } => Some(200),
        }
    }
}
