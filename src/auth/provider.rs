//! Cached access-token provider with proactive refresh.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::clock::Clock;
use crate::constants::{ACCESS_TOKEN_PATH, SUBSCRIPTION_KEY_HEADER, TOKEN_SAFETY_MARGIN};
use crate::http_client::endpoint;

use super::{AccessToken, AuthError, Credentials};

/// Anything that can hand out a currently valid bearer token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a token that stays valid for at least the safety margin.
    async fn valid_token(&self) -> Result<AccessToken, AuthError>;
}

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<ExpiresIn>,
}

/// `expires_in` arrives as a JSON number from some gateways and as a numeric
/// string from others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Seconds(i64),
    Text(String),
}

impl ExpiresIn {
    fn seconds(&self) -> Option<i64> {
        match self {
            Self::Seconds(secs) => Some(*secs),
            Self::Text(raw) => raw.trim().parse().ok(),
        }
    }
}

/// Issues and caches access tokens for one set of credentials.
///
/// The cache mutex is held across check-then-refresh, so concurrent callers
/// sharing one provider trigger a single authentication call.
pub struct TokenProvider {
    client: Client,
    token_url: Url,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    margin: Duration,
    cache: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    /// Creates a provider that authenticates against `{base_url}/accessToken/get`.
    #[must_use]
    pub fn new(client: Client, base_url: &Url, credentials: Credentials, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            token_url: endpoint(base_url, ACCESS_TOKEN_PATH),
            credentials,
            clock,
            margin: TOKEN_SAFETY_MARGIN,
            cache: Mutex::new(None),
        }
    }

    /// Returns the cached token if usable, otherwise authenticates and caches
    /// the new token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the exchange fails. The cache is left
    /// untouched in that case.
    #[instrument(skip(self), fields(url = %self.token_url))]
    pub async fn get_valid_token(&self) -> Result<AccessToken, AuthError> {
        let mut cache = self.cache.lock().await;
        let now = self.clock.now();

        if let Some(token) = cache.as_ref()
            && token.is_usable_at(now, self.margin)
        {
            debug!(expires_at = %token.expires_at(), "reusing cached access token");
            return Ok(token.clone());
        }

        let token = self.authenticate().await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    /// Performs one authentication exchange without touching the cache.
    async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        let url = self.token_url.as_str();
        debug!("requesting new access token");

        let response = self
            .client
            .post(self.token_url.clone())
            .header("client_id", self.credentials.client_id())
            .header("client_secret", self.credentials.client_secret())
            .header(SUBSCRIPTION_KEY_HEADER, self.credentials.subscription_key())
            .basic_auth(
                self.credentials.client_id(),
                Some(self.credentials.client_secret()),
            )
            .send()
            .await
            .map_err(|e| AuthError::transport(url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::transport(url, e))?;

        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "authentication rejected");
            return Err(AuthError::rejected(url, status.as_u16(), body));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| AuthError::malformed(url, format!("invalid JSON: {e}")))?;

        let value = parsed
            .access_token
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AuthError::malformed(url, "missing access_token"))?;
        let expires_in = parsed
            .expires_in
            .as_ref()
            .and_then(ExpiresIn::seconds)
            .ok_or_else(|| AuthError::malformed(url, "missing or non-numeric expires_in"))?;

        let token = AccessToken::issued(value, self.clock.now(), expires_in);
        info!(expires_in, expires_at = %token.expires_at(), "authenticated");
        Ok(token)
    }
}

#[async_trait]
impl TokenSource for TokenProvider {
    async fn valid_token(&self) -> Result<AccessToken, AuthError> {
        self.get_valid_token().await
    }
}
