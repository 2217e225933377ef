//! Persistence of downloaded report files.
//!
//! A report is written to `<output_dir>/ledger_report_<reportId>.csv`. The
//! write goes to a `.part` file first and is renamed into place, so a failed
//! write never clobbers an earlier artifact for the same id.

mod error;

pub use error::SinkError;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// File name prefix for persisted reports.
const FILE_PREFIX: &str = "ledger_report_";

/// File extension for persisted reports.
const FILE_EXTENSION: &str = "csv";

/// Downloaded report bytes plus the id they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    report_id: String,
    bytes: Vec<u8>,
}

impl ReportArtifact {
    /// Pairs a report id with its downloaded content.
    #[must_use]
    pub fn new(report_id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            report_id: report_id.into(),
            bytes,
        }
    }

    /// Returns the report id.
    #[must_use]
    pub fn report_id(&self) -> &str {
        &self.report_id
    }

    /// Returns the raw content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns `ledger_report_<id>.csv`, or `None` when the id sanitises to nothing.
    #[must_use]
    pub fn suggested_file_name(&self) -> Option<String> {
        let component = sanitize_file_component(&self.report_id);
        if component.is_empty() {
            None
        } else {
            Some(format!("{FILE_PREFIX}{component}.{FILE_EXTENSION}"))
        }
    }
}

/// Durable storage for downloaded reports.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Stores the artifact and returns an absolute locator for it.
    async fn store(&self, artifact: &ReportArtifact) -> Result<PathBuf, SinkError>;
}

/// Writes reports into a directory on the local file system.
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    /// Creates a sink writing into `output_dir` (created on first store).
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Returns the configured output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[async_trait]
impl ResultSink for FileSink {
    #[instrument(skip(self, artifact), fields(report_id = %artifact.report_id(), bytes = artifact.bytes().len()))]
    async fn store(&self, artifact: &ReportArtifact) -> Result<PathBuf, SinkError> {
        let file_name = artifact
            .suggested_file_name()
            .ok_or_else(|| SinkError::UnusableReportId {
                report_id: artifact.report_id().to_string(),
            })?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| SinkError::io(self.output_dir.clone(), e))?;

        let final_path = self.output_dir.join(&file_name);
        let part_path = self.output_dir.join(format!("{file_name}.part"));

        if let Err(e) = tokio::fs::write(&part_path, artifact.bytes()).await {
            debug!(path = %part_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(SinkError::io(part_path, e));
        }

        if let Err(e) = tokio::fs::rename(&part_path, &final_path).await {
            let _ = tokio::fs::remove_file(&part_path).await;
            return Err(SinkError::io(final_path, e));
        }

        let locator = tokio::fs::canonicalize(&final_path)
            .await
            .map_err(|e| SinkError::io(final_path.clone(), e))?;

        info!(path = %locator.display(), "report saved");
        Ok(locator)
    }
}

/// Maps a report id onto characters safe in a file name.
///
/// Anything other than ASCII alphanumerics and `-` collapses into single
/// underscores, so ids like `../x` cannot escape the output directory.
fn sanitize_file_component(value: &str) -> String {
    let mut out = String::new();
    let mut prev_sep = false;
    for ch in value.chars() {
        let mapped = match ch {
            c if c.is_ascii_alphanumeric() || c == '-' => c,
            _ => '_',
        };
        if mapped == '_' {
            if !prev_sep {
                out.push('_');
                prev_sep = true;
            }
        } else {
            out.push(mapped);
            prev_sep = false;
        }
    }
    out.trim_matches('_').to_string()
}
