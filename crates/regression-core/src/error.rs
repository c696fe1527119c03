//! Error taxonomy for regression comparison.

use std::path::PathBuf;

/// Errors produced while aggregating reports, extracting references or
/// talking to the checks platform.
#[derive(Debug, thiserror::Error)]
pub enum RegressionError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to parse test report {}: {reason}", path.display())]
    ReportParse { path: PathBuf, reason: String },

    #[error("no reference check run named '{suite}'")]
    ReferenceNotFound { suite: String },

    #[error("reference check run '{suite}' has no summary")]
    ReferenceSummaryMissing { suite: String },

    #[error(
        "reference summary for '{suite}' does not match the expected format\n  summary: {summary}\n  pattern: {pattern}"
    )]
    ReferenceSummaryMalformed {
        suite: String,
        summary: String,
        pattern: String,
    },

    #[error("platform error: {0}")]
    Platform(String),
}

impl RegressionError {
    /// Build a [`RegressionError::ReportParse`] for an in-memory document.
    pub(crate) fn report(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        RegressionError::ReportParse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for regression operations.
pub type Result<T> = std::result::Result<T, RegressionError>;
