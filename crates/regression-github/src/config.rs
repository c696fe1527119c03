//! GitHub client configuration

use serde::{Deserialize, Serialize};

use crate::error::GithubError;
use crate::Result;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// REST API base URL
    pub api_url: String,
    /// Repository in `owner/repo` form
    pub repository: Option<String>,
    /// Token sent as a bearer credential
    pub token: Option<String>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            repository: std::env::var("GITHUB_REPOSITORY").ok(),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

impl GithubConfig {
    /// Read `GITHUB_API_URL`, `GITHUB_REPOSITORY` and `GITHUB_TOKEN`
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific repository on github.com
    pub fn new(repository: &str) -> Self {
        GithubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            repository: Some(repository.to_string()),
            token: None,
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    /// Point at a different API host (GitHub Enterprise, test servers)
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// Split the repository into owner and name.
    pub fn owner_and_repo(&self) -> Result<(String, String)> {
        let repository = self
            .repository
            .as_deref()
            .ok_or_else(|| GithubError::NotConfigured("GITHUB_REPOSITORY is not set".into()))?;

        match repository.split_once('/') {
            Some((owner, repo))
                if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') =>
            {
                Ok((owner.to_string(), repo.to_string()))
            }
            _ => Err(GithubError::InvalidRepository(repository.to_string())),
        }
    }

    pub fn require_token(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| GithubError::NotConfigured("GITHUB_TOKEN is not set".into()))
    }
}
