//! Pull request context from the GitHub Actions event payload.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequest>,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: u64,
    head: Head,
}

#[derive(Debug, Deserialize)]
struct Head {
    sha: String,
}

/// The triggering pull request, when the workflow runs for one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestContext {
    pub number: u64,
    pub head_sha: String,
}

impl PullRequestContext {
    /// Read the event payload at `path`. Returns `None` for events that are
    /// not about a pull request.
    pub fn from_event_file(path: &Path) -> Result<Option<Self>> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event payload {}", path.display()))?;
        let payload: EventPayload = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse event payload {}", path.display()))?;

        Ok(payload.pull_request.map(|pr| PullRequestContext {
            number: pr.number,
            head_sha: pr.head.sha,
        }))
    }

    /// Read the payload named by `GITHUB_EVENT_PATH`, if set.
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var_os("GITHUB_EVENT_PATH") {
            Some(path) => Self::from_event_file(Path::new(&path)),
            None => Ok(None),
        }
    }
}
