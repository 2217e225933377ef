//! Configuration file loading for CLI defaults.
//!
//! The file is a flat `key = value` list (TOML-compatible subset): strings in
//! double quotes, bare integers, `#` comments.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// File-backed defaults. Every field is optional; command-line values win.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Platform API base URL.
    pub base_url: Option<String>,
    /// Directory reports are written to.
    pub output_dir: Option<PathBuf>,
    /// Maximum number of status checks (1..=100).
    pub max_attempts: Option<u32>,
    /// Seconds between status checks (0..=300).
    pub poll_interval_secs: Option<u64>,
    /// Wait schedule between status checks.
    pub backoff: Option<BackoffSetting>,
    /// HTTP connect timeout in seconds (1..=3600).
    pub connect_timeout_secs: Option<u64>,
    /// HTTP whole-request timeout in seconds (1..=3600).
    pub request_timeout_secs: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against the same ranges the CLI enforces.
    pub fn validate(&self) -> Result<()> {
        if let Some(max_attempts) = self.max_attempts
            && !(1..=100).contains(&max_attempts)
        {
            bail!("Invalid config value for `max_attempts`: {max_attempts}. Expected range: 1..=100");
        }

        if let Some(interval) = self.poll_interval_secs
            && interval > 300
        {
            bail!("Invalid config value for `poll_interval_secs`: {interval}. Expected range: 0..=300");
        }

        if let Some(base_url) = &self.base_url
            && url::Url::parse(base_url).is_err()
        {
            bail!("Invalid config value for `base_url`: '{base_url}' is not an absolute URL");
        }

        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("request_timeout_secs", self.request_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

/// Supported config backoff labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffSetting {
    Fixed,
    Exponential,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/ledger-report/config.toml`
/// 2. `$HOME/.config/ledger-report/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("ledger-report")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("ledger-report")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist. The default path is optional: a missing file
/// yields `None`.
pub fn load_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return load_file_config(path).map(Some);
    }

    match resolve_default_config_path() {
        Some(path) if path.exists() => load_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();
        let invalid = || format!("Invalid `{key}` value on line {line_no}");

        match key {
            "base_url" => cfg.base_url = Some(parse_string_literal(value).with_context(invalid)?),
            "output_dir" => {
                cfg.output_dir = Some(PathBuf::from(
                    parse_string_literal(value).with_context(invalid)?,
                ));
            }
            "max_attempts" => {
                let parsed = parse_integer_u64(value).with_context(invalid)?;
                cfg.max_attempts = Some(u32::try_from(parsed).with_context(invalid)?);
            }
            "poll_interval_secs" => {
                cfg.poll_interval_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "backoff" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.backoff = Some(parse_backoff(&parsed).with_context(invalid)?);
            }
            "connect_timeout_secs" => {
                cfg.connect_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "request_timeout_secs" => {
                cfg.request_timeout_secs = Some(parse_integer_u64(value).with_context(invalid)?);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value).with_context(invalid)?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(invalid)?);
            }
            unknown => bail!("Unknown configuration key: '{unknown}' on line {line_no}"),
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_backoff(value: &str) -> Result<BackoffSetting> {
    match value {
        "fixed" => Ok(BackoffSetting::Fixed),
        "exponential" => Ok(BackoffSetting::Exponential),
        _ => bail!("Expected one of: fixed, exponential"),
    }
}
