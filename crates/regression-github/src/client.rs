//! GitHub REST client
//!
//! Implements the checks platform traits over the check-runs and
//! issue-comments endpoints.

use async_trait::async_trait;
use regression_core::{CheckRun, CheckRunSource, CheckRunUpdate, ChecksPublisher};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::GithubConfig;
use crate::error::GithubError;
use crate::types::{
    ApiErrorBody, CheckRunList, CheckRunRequest, CommentRequest, CreatedResource,
};
use crate::Result;

const API_VERSION: &str = "2022-11-28";
const PER_PAGE: u64 = 100;

/// GitHub client bound to one repository
pub struct GithubClient {
    api_url: Url,
    owner: String,
    repo: String,
    http_client: reqwest::Client,
}

impl GithubClient {
    /// Create a client; fails when the token or repository is missing
    pub fn new(config: GithubConfig) -> Result<Self> {
        let (owner, repo) = config.owner_and_repo()?;
        let token = config.require_token()?;

        let api_url = Url::parse(&config.api_url)
            .map_err(|e| GithubError::NotConfigured(format!("invalid API URL: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("X-GitHub-Api-Version", HeaderValue::from_static(API_VERSION));
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| GithubError::NotConfigured("GITHUB_TOKEN is not a valid header".into()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("h2spec-regression/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(GithubClient {
            api_url,
            owner,
            repo,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GithubConfig::from_env())
    }

    /// `{api}/repos/{owner}/{repo}/<segments...>`, each segment escaped
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| GithubError::NotConfigured("API URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Check runs on `git_ref`, following pagination.
    ///
    /// `check_name` narrows the listing server-side.
    pub async fn check_runs_for_ref(
        &self,
        git_ref: &str,
        check_name: Option<&str>,
    ) -> Result<Vec<CheckRun>> {
        let url = self.endpoint(&["commits", git_ref, "check-runs"])?;
        let mut runs = Vec::new();
        let mut page = 1u64;

        loop {
            let mut request = self.http_client.get(url.clone()).query(&[
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ]);
            if let Some(name) = check_name {
                request = request.query(&[("check_name", name)]);
            }

            let list: CheckRunList = self.send(request).await?;
            let received = list.check_runs.len() as u64;
            runs.extend(list.check_runs.into_iter().map(CheckRun::from));
            debug!(git_ref = %git_ref, page = page, received = received, "Fetched check runs page");

            if received < PER_PAGE || runs.len() as u64 >= list.total_count {
                break;
            }
            page += 1;
        }

        Ok(runs)
    }

    /// Post a comment on an issue or pull request; returns the comment id
    pub async fn create_comment(&self, issue_number: u64, body: &str) -> Result<u64> {
        let url = self.endpoint(&["issues", &issue_number.to_string(), "comments"])?;
        let created: CreatedResource = self
            .send(self.http_client.post(url).json(&CommentRequest { body }))
            .await?;
        info!(issue = issue_number, comment_id = created.id, "Posted comment");
        Ok(created.id)
    }

    /// Update the check run named `update.name` on `update.head_sha`, or
    /// create it if none exists
    pub async fn create_or_update_check_run(&self, update: &CheckRunUpdate) -> Result<u64> {
        let existing = self
            .check_runs_for_ref(&update.head_sha, Some(&update.name))
            .await?
            .into_iter()
            .find(|run| run.name == update.name);

        let created: CreatedResource = match existing {
            Some(run) => {
                let url = self.endpoint(&["check-runs", &run.id.to_string()])?;
                self.send(
                    self.http_client
                        .patch(url)
                        .json(&CheckRunRequest::update(update)),
                )
                .await?
            }
            None => {
                let url = self.endpoint(&["check-runs"])?;
                self.send(
                    self.http_client
                        .post(url)
                        .json(&CheckRunRequest::create(update)),
                )
                .await?
            }
        };

        info!(
            check_run = %update.name,
            check_run_id = created.id,
            conclusion = %update.conclusion,
            "Published check run"
        );
        Ok(created.id)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);

    Err(GithubError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CheckRunSource for GithubClient {
    async fn list_check_runs(&self, git_ref: &str) -> regression_core::Result<Vec<CheckRun>> {
        Ok(self.check_runs_for_ref(git_ref, None).await?)
    }
}

#[async_trait]
impl ChecksPublisher for GithubClient {
    async fn post_comment(&self, pr_number: u64, body: &str) -> regression_core::Result<()> {
        self.create_comment(pr_number, body).await?;
        Ok(())
    }

    async fn upsert_check_run(&self, update: &CheckRunUpdate) -> regression_core::Result<u64> {
        Ok(self.create_or_update_check_run(update).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_url: &str) -> GithubClient {
        GithubClient::new(
            GithubConfig::new("summerwind/h2spec")
                .with_token("t")
                .with_api_url(api_url),
        )
        .expect("client")
    }

    #[test]
    fn test_new_requires_token() {
        let err = GithubClient::new(GithubConfig::new("o/r")).err().expect("error");
        assert!(matches!(err, GithubError::NotConfigured(_)));
    }

    #[test]
    fn test_endpoint_escapes_ref() {
        let c = client("https://api.github.com");
        let url = c
            .endpoint(&["commits", "feature/x", "check-runs"])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/summerwind/h2spec/commits/feature%2Fx/check-runs"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let c = client("https://ghe.example.com/api/v3");
        let url = c.endpoint(&["check-runs"]).expect("url");
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/summerwind/h2spec/check-runs"
        );
    }
}
