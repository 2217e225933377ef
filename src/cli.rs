//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use chrono::{Days, NaiveDate};
use clap::{Parser, ValueEnum};

use ledger_report_core::constants::DEFAULT_RANGE_DAYS;

/// Fetch a CSV ledger report from the payment platform report API.
///
/// Credentials are read from LEDGER_CLIENT_ID, LEDGER_CLIENT_SECRET and
/// LEDGER_SUBSCRIPTION_KEY.
#[derive(Parser, Debug)]
#[command(name = "ledger-report")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// First day of the report (YYYY-MM-DD). Defaults to `--days` before the end date
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day of the report (YYYY-MM-DD). Defaults to today
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Range length in days when no start date is given (1-366)
    #[arg(long, default_value_t = DEFAULT_RANGE_DAYS, value_parser = clap::value_parser!(u32).range(1..=366))]
    pub days: u32,

    /// Directory the report is written to [default: current directory]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Platform API base URL [default: https://api.vipps.no]
    #[arg(long)]
    pub base_url: Option<String>,

    /// Maximum number of status checks before giving up (1-100) [default: 10]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_attempts: Option<u32>,

    /// Seconds between status checks (0-300) [default: 5]
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=300))]
    pub poll_interval: Option<u64>,

    /// Wait schedule between status checks [default: fixed]
    #[arg(long, value_enum)]
    pub backoff: Option<BackoffArg>,

    /// Path to a config file [default: $XDG_CONFIG_HOME/ledger-report/config.toml]
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,
}

/// Wait schedule selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackoffArg {
    /// Same interval before every check
    Fixed,
    /// Growing interval with jitter
    Exponential,
}

/// Resolves the inclusive report range from the arguments.
///
/// The end defaults to `today`; the start defaults to `days` before the end.
/// The range is not checked for order here.
#[must_use]
pub fn resolve_date_range(args: &Args, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let end = args.end.unwrap_or(today);
    let start = args.start.unwrap_or_else(|| {
        end.checked_sub_days(Days::new(u64::from(args.days)))
            .unwrap_or(NaiveDate::MIN)
    });
    (start, end)
}
