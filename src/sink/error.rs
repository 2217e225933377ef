//! Error types for artifact persistence.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while persisting a downloaded report.
///
/// None of these are retried.
#[derive(Debug, Error)]
pub enum SinkError {
    /// File system error (create directory, write, rename).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The report id has no characters usable in a file name.
    #[error("report id '{report_id}' cannot be turned into a file name")]
    UnusableReportId {
        /// The offending report id.
        report_id: String,
    },
}

impl SinkError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = SinkError::io(PathBuf::from("/tmp/ledger_report_R1.csv"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/ledger_report_R1.csv"), "Expected path in: {msg}");
        assert!(msg.contains("access denied"), "Expected cause in: {msg}");
    }
}
