//! Constants for platform endpoints, timeouts and polling.

use std::time::Duration;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.vipps.no";

/// Path of the access-token endpoint, relative to the base URL.
pub const ACCESS_TOKEN_PATH: &str = "accessToken/get";

/// Path of the report collection, relative to the base URL.
pub const REPORT_PATH: &str = "vipps-report/v1/report";

/// Header carrying the API subscription key on every authenticated call.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default per-request timeout (60 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Remaining validity below which a cached token is refreshed (5 minutes).
pub const TOKEN_SAFETY_MARGIN: Duration = Duration::from_secs(300);

/// Default maximum number of status calls before giving up.
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 10;

/// Default wait between status calls (5 seconds).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default date range length when no start date is given.
pub const DEFAULT_RANGE_DAYS: u32 = 30;
