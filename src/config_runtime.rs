//! Merges command-line arguments with config file defaults.

use std::path::PathBuf;
use std::time::Duration;

use ledger_report_core::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_BASE_URL, DEFAULT_MAX_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL,
    REQUEST_TIMEOUT_SECS,
};
use ledger_report_core::http_client::HttpTimeouts;
use ledger_report_core::{Backoff, PollPolicy};

use crate::app_config::{BackoffSetting, FileConfig, VerbositySetting};
use crate::cli::{Args, BackoffArg};

/// Effective settings for one run, after command line and file are merged.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunSettings {
    pub(crate) base_url: String,
    pub(crate) output_dir: PathBuf,
    pub(crate) poll_policy: PollPolicy,
    pub(crate) timeouts: HttpTimeouts,
}

/// Command-line values win; file values fill the gaps; constants fill the rest.
pub(crate) fn resolve_run_settings(args: &Args, file_config: Option<&FileConfig>) -> RunSettings {
    let file = file_config.cloned().unwrap_or_default();

    let base_url = args
        .base_url
        .clone()
        .or(file.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let output_dir = args
        .output_dir
        .clone()
        .or(file.output_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let max_attempts = args
        .max_attempts
        .or(file.max_attempts)
        .unwrap_or(DEFAULT_MAX_POLL_ATTEMPTS);
    let interval = args
        .poll_interval
        .or(file.poll_interval_secs)
        .map_or(DEFAULT_POLL_INTERVAL, Duration::from_secs);
    let backoff = match args.backoff {
        Some(BackoffArg::Exponential) => Backoff::exponential(),
        Some(BackoffArg::Fixed) => Backoff::Fixed,
        None => match file.backoff {
            Some(BackoffSetting::Exponential) => Backoff::exponential(),
            Some(BackoffSetting::Fixed) | None => Backoff::Fixed,
        },
    };

    let timeouts = HttpTimeouts {
        connect_secs: file.connect_timeout_secs.unwrap_or(CONNECT_TIMEOUT_SECS),
        request_secs: file.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS),
    };

    RunSettings {
        base_url,
        output_dir,
        poll_policy: PollPolicy::new(max_attempts, interval, backoff),
        timeouts,
    }
}

/// Default log level when `RUST_LOG` is unset.
///
/// Priority: `--quiet` > `-v/-vv` > config `verbosity` > `info`.
pub(crate) fn resolve_default_log_level(
    args: &Args,
    file_config: Option<&FileConfig>,
) -> &'static str {
    if args.quiet {
        return "error";
    }
    if args.verbose > 0 {
        return if args.verbose == 1 { "debug" } else { "trace" };
    }
    match file_config.and_then(|cfg| cfg.verbosity) {
        Some(VerbositySetting::Quiet) => "error",
        Some(VerbositySetting::Verbose) => "debug",
        Some(VerbositySetting::Debug) => "trace",
        Some(VerbositySetting::Default) | None => "info",
    }
}
