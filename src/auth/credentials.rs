//! API credentials supplied by the caller before any network activity.

use std::env;
use std::fmt;

/// Environment variable holding the client id.
pub const CLIENT_ID_ENV: &str = "LEDGER_CLIENT_ID";
/// Environment variable holding the client secret.
pub const CLIENT_SECRET_ENV: &str = "LEDGER_CLIENT_SECRET";
/// Environment variable holding the subscription key.
pub const SUBSCRIPTION_KEY_ENV: &str = "LEDGER_SUBSCRIPTION_KEY";

/// Client credentials for the platform API.
///
/// Values are opaque. `Debug` redacts them so they never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    subscription_key: String,
}

impl Credentials {
    /// Creates credentials from their three parts.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        subscription_key: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            subscription_key: subscription_key.into(),
        }
    }

    /// Reads credentials from `LEDGER_CLIENT_ID`, `LEDGER_CLIENT_SECRET` and
    /// `LEDGER_SUBSCRIPTION_KEY`.
    ///
    /// Returns the names of the variables that are missing or empty on failure.
    pub fn from_env() -> Result<Self, Vec<&'static str>> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Vec<&'static str>> {
        let mut missing = Vec::new();
        let mut read = |name: &'static str| {
            let value = lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };

        let client_id = read(CLIENT_ID_ENV);
        let client_secret = read(CLIENT_SECRET_ENV);
        let subscription_key = read(SUBSCRIPTION_KEY_ENV);

        if missing.is_empty() {
            Ok(Self::new(client_id, client_secret, subscription_key))
        } else {
            Err(missing)
        }
    }

    /// Returns the client id.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the subscription key.
    #[must_use]
    pub fn subscription_key(&self) -> &str {
        &self.subscription_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .field("subscription_key", &"<redacted>")
            .finish()
    }
}
