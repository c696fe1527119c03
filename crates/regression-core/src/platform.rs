//! Checks platform abstractions.
//!
//! These traits are the only way the comparison reaches the outside world:
//! - `CheckRunSource`: check runs recorded against a commit or ref
//! - `ChecksPublisher`: PR comments and check-run creation
//!
//! In-memory fakes live in the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A check run as seen by the comparison: its name and summary text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    pub id: u64,
    pub name: String,
    pub summary: Option<String>,
}

/// Final conclusion of a published check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conclusion {
    Success,
    Failure,
}

impl Conclusion {
    pub fn from_failed(failed: bool) -> Self {
        if failed {
            Conclusion::Failure
        } else {
            Conclusion::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Conclusion::Success => "success",
            Conclusion::Failure => "failure",
        }
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed check run to create, or update if one with the same name
/// already exists on `head_sha`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunUpdate {
    pub name: String,
    pub head_sha: String,
    pub conclusion: Conclusion,
    pub title: String,
    pub summary: String,
}

/// Read access to check runs.
#[async_trait]
pub trait CheckRunSource: Send + Sync {
    /// All check runs recorded against `git_ref` (a branch, tag or SHA).
    async fn list_check_runs(&self, git_ref: &str) -> Result<Vec<CheckRun>>;
}

/// Write access to comments and check runs.
#[async_trait]
pub trait ChecksPublisher: Send + Sync {
    /// Post `body` as a comment on pull request `pr_number`.
    async fn post_comment(&self, pr_number: u64, body: &str) -> Result<()>;

    /// Create or update a completed check run. Returns its id.
    async fn upsert_check_run(&self, update: &CheckRunUpdate) -> Result<u64>;
}
