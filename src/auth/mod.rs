//! Credentials, access tokens and the caching token provider.
//!
//! - [`Credentials`] - client id, secret and subscription key (redacted in `Debug`)
//! - [`AccessToken`] - bearer token paired with its expiry
//! - [`TokenProvider`] - authenticates on demand and caches the token until it
//!   enters the 5-minute safety margin
//! - [`TokenSource`] - the seam the orchestrator depends on

mod credentials;
mod error;
mod provider;
mod token;

pub use credentials::{CLIENT_ID_ENV, CLIENT_SECRET_ENV, Credentials, SUBSCRIPTION_KEY_ENV};
pub use error::AuthError;
pub use provider::{TokenProvider, TokenSource};
pub use token::AccessToken;
