//! Wire types for the GitHub checks and issues APIs.

use chrono::{DateTime, Utc};
use regression_core::{CheckRun, CheckRunUpdate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRunList {
    pub total_count: u64,
    pub check_runs: Vec<CheckRunResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRunResponse {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub output: Option<CheckRunOutputResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRunOutputResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl From<CheckRunResponse> for CheckRun {
    fn from(run: CheckRunResponse) -> Self {
        CheckRun {
            id: run.id,
            name: run.name,
            summary: run.output.and_then(|o| o.summary),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckRunOutput {
    pub title: String,
    pub summary: String,
}

/// Body for both `POST /check-runs` and `PATCH /check-runs/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckRunRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_sha: Option<String>,
    pub status: &'static str,
    pub conclusion: &'static str,
    pub completed_at: DateTime<Utc>,
    pub output: CheckRunOutput,
}

impl CheckRunRequest {
    pub fn create(update: &CheckRunUpdate) -> Self {
        Self {
            head_sha: Some(update.head_sha.clone()),
            ..Self::update(update)
        }
    }

    pub fn update(update: &CheckRunUpdate) -> Self {
        Self {
            name: update.name.clone(),
            head_sha: None,
            status: "completed",
            conclusion: update.conclusion.as_str(),
            completed_at: Utc::now(),
            output: CheckRunOutput {
                title: update.title.clone(),
                summary: update.summary.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentRequest<'a> {
    pub body: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResource {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use regression_core::Conclusion;
    use serde_json::json;

    #[test]
    fn test_check_run_without_output_has_no_summary() {
        let run: CheckRunResponse =
            serde_json::from_value(json!({ "id": 5, "name": "h2spec", "output": null }))
                .expect("deserialize");
        let run = CheckRun::from(run);
        assert_eq!(run.summary, None);
    }

    #[test]
    fn test_create_request_includes_head_sha() {
        let update = CheckRunUpdate {
            name: "h2spec-regression".to_string(),
            head_sha: "abc".to_string(),
            conclusion: Conclusion::Failure,
            title: "Regression detected".to_string(),
            summary: "Regression detected in h2spec: 24 > 22".to_string(),
        };

        let create = serde_json::to_value(CheckRunRequest::create(&update)).expect("to_value");
        assert_eq!(create["head_sha"], "abc");
        assert_eq!(create["status"], "completed");
        assert_eq!(create["conclusion"], "failure");
        assert_eq!(create["output"]["summary"], update.summary);

        let patch = serde_json::to_value(CheckRunRequest::update(&update)).expect("to_value");
        assert!(patch.get("head_sha").is_none());
    }
}
