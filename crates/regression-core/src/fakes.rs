//! In-memory fakes for the platform traits (testing only)
//!
//! `MemoryChecks` satisfies both `CheckRunSource` and `ChecksPublisher`.
//! Check runs upserted on a SHA become visible to `list_check_runs` for that
//! SHA, so a summarize-then-compare cycle can be exercised end to end.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{RegressionError, Result};
use crate::platform::{CheckRun, CheckRunSource, CheckRunUpdate, ChecksPublisher};

/// A comment captured by [`MemoryChecks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedComment {
    pub pr_number: u64,
    pub body: String,
}

#[derive(Debug, Default)]
struct State {
    runs: HashMap<String, Vec<CheckRun>>,
    updates: Vec<CheckRunUpdate>,
    comments: Vec<PostedComment>,
    next_id: u64,
    fail_with: Option<String>,
}

/// In-memory checks platform keyed by git ref.
#[derive(Debug, Default)]
pub struct MemoryChecks {
    state: Mutex<State>,
}

impl MemoryChecks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a check run with `summary` on `git_ref`.
    pub fn with_check_run(self, git_ref: &str, name: &str, summary: Option<&str>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = state.next_id;
            state
                .runs
                .entry(git_ref.to_string())
                .or_default()
                .push(CheckRun {
                    id,
                    name: name.to_string(),
                    summary: summary.map(str::to_string),
                });
        }
        self
    }

    /// Make every subsequent call fail with a platform error.
    pub fn failing(self, message: &str) -> Self {
        self.state.lock().unwrap().fail_with = Some(message.to_string());
        self
    }

    pub fn comments(&self) -> Vec<PostedComment> {
        self.state.lock().unwrap().comments.clone()
    }

    pub fn check_run_updates(&self) -> Vec<CheckRunUpdate> {
        self.state.lock().unwrap().updates.clone()
    }

    fn check_failure(state: &State) -> Result<()> {
        match &state.fail_with {
            Some(message) => Err(RegressionError::Platform(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CheckRunSource for MemoryChecks {
    async fn list_check_runs(&self, git_ref: &str) -> Result<Vec<CheckRun>> {
        let state = self.state.lock().unwrap();
        Self::check_failure(&state)?;
        Ok(state.runs.get(git_ref).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl ChecksPublisher for MemoryChecks {
    async fn post_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state)?;
        state.comments.push(PostedComment {
            pr_number,
            body: body.to_string(),
        });
        Ok(())
    }

    async fn upsert_check_run(&self, update: &CheckRunUpdate) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        Self::check_failure(&state)?;
        state.updates.push(update.clone());

        let existing = state
            .runs
            .get(&update.head_sha)
            .and_then(|runs| runs.iter().find(|r| r.name == update.name))
            .map(|r| r.id);

        let id = match existing {
            Some(id) => id,
            None => {
                state.next_id += 1;
                state.next_id
            }
        };

        let runs = state.runs.entry(update.head_sha.clone()).or_default();
        runs.retain(|r| r.id != id);
        runs.push(CheckRun {
            id,
            name: update.name.clone(),
            summary: Some(update.summary.clone()),
        });
        Ok(id)
    }
}
