//! CLI entry point for the ledger report fetcher.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use ledger_report_core::auth::{CLIENT_ID_ENV, CLIENT_SECRET_ENV, SUBSCRIPTION_KEY_ENV};
use ledger_report_core::http_client::{build_http_client, parse_base_url};
use ledger_report_core::{
    Clock, Credentials, FileSink, HttpReportGateway, LifecycleOrchestrator, Outcome, SystemClock,
    TokenProvider,
};
use tracing::{debug, error, info};

mod app_config;
mod cli;
mod config_runtime;

use cli::{Args, resolve_date_range};
use config_runtime::{resolve_default_log_level, resolve_run_settings};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    let file_config = app_config::load_config(args.config.as_deref())?;

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let default_level = resolve_default_log_level(&args, file_config.as_ref());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, config_loaded = file_config.is_some(), "CLI arguments parsed");

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(missing) => bail!(
            "Missing credentials: set {} (expected {CLIENT_ID_ENV}, {CLIENT_SECRET_ENV}, {SUBSCRIPTION_KEY_ENV})",
            missing.join(", ")
        ),
    };

    let settings = resolve_run_settings(&args, file_config.as_ref());
    let base_url = parse_base_url(&settings.base_url)
        .with_context(|| format!("Invalid base URL '{}'", settings.base_url))?;
    let client = build_http_client(settings.timeouts).context("Failed to build HTTP client")?;

    let (start, end) = resolve_date_range(&args, chrono::Local::now().date_naive());
    info!(
        %start,
        %end,
        base_url = %base_url,
        output_dir = %settings.output_dir.display(),
        max_attempts = settings.poll_policy.max_attempts(),
        "Ledger report run starting"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let gateway = HttpReportGateway::new(client.clone(), &base_url, credentials.subscription_key());
    let tokens = TokenProvider::new(client, &base_url, credentials, Arc::clone(&clock));
    let orchestrator = LifecycleOrchestrator::new(
        Arc::new(tokens),
        Arc::new(gateway),
        Arc::new(FileSink::new(settings.output_dir)),
        clock,
    )
    .with_poll_policy(settings.poll_policy);

    let outcome = orchestrator.run(start, end).await;
    report_outcome(&outcome);
    std::process::exit(outcome.category().exit_code());
}

fn report_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Success { locator, .. } => println!("{}", locator.display()),
        Outcome::Failure { state, detail } => {
            error!(state = %state, "Ledger report retrieval failed");
            eprintln!("{state}: {detail}");
        }
    }
}
