//! Error types for regression-github

use regression_core::RegressionError;
use thiserror::Error;

/// Errors that can occur talking to the GitHub API
#[derive(Error, Debug)]
pub enum GithubError {
    /// Required setting missing
    #[error("GitHub client is not configured: {0}")]
    NotConfigured(String),

    /// Repository not in `owner/repo` form
    #[error("Invalid repository '{0}', expected owner/repo")]
    InvalidRepository(String),

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success response from the API
    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for GithubError {
    fn from(err: reqwest::Error) -> Self {
        GithubError::Http(err.to_string())
    }
}

impl From<GithubError> for RegressionError {
    fn from(err: GithubError) -> Self {
        match err {
            GithubError::NotConfigured(_) | GithubError::InvalidRepository(_) => {
                RegressionError::Configuration(err.to_string())
            }
            other => RegressionError::Platform(other.to_string()),
        }
    }
}
