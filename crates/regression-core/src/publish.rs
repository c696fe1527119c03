//! Publishing comparison reports and reference summaries.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::ComparisonReport;
use crate::error::Result;
use crate::obs;
use crate::platform::{CheckRunUpdate, ChecksPublisher, Conclusion};
use crate::report::ReportLocator;
use crate::results::Results;
use crate::summary::format_summary;

/// Name of the check run that carries the comparison verdict.
pub const DEFAULT_CHECK_NAME: &str = "h2spec-regression";

/// Where a comparison report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    /// Pull request to comment on.
    pub pr_number: Option<u64>,
    /// Commit to attach the check run to.
    pub head_sha: Option<String>,
    pub check_name: String,
}

impl PublishTarget {
    pub fn new(pr_number: Option<u64>, head_sha: Option<String>) -> Self {
        Self {
            pr_number,
            head_sha,
            check_name: DEFAULT_CHECK_NAME.to_string(),
        }
    }

    pub fn with_check_name(mut self, check_name: impl Into<String>) -> Self {
        self.check_name = check_name.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pr_number.is_none() && self.head_sha.is_none()
    }
}

/// Post the report as a PR comment and/or a check run, as `target` allows.
pub async fn publish_report(
    publisher: &dyn ChecksPublisher,
    target: &PublishTarget,
    report: &ComparisonReport,
) -> Result<()> {
    if target.is_empty() {
        info!("No pull request or head SHA configured; report not published");
        return Ok(());
    }

    let body = report.body();

    if let Some(pr_number) = target.pr_number {
        publisher.post_comment(pr_number, &body).await?;
        obs::emit_report_published("comment", &pr_number.to_string());
    }

    if let Some(head_sha) = &target.head_sha {
        let update = CheckRunUpdate {
            name: target.check_name.clone(),
            head_sha: head_sha.clone(),
            conclusion: Conclusion::from_failed(report.regression()),
            title: report.title(),
            summary: body,
        };
        let id = publisher.upsert_check_run(&update).await?;
        obs::emit_report_published("check_run", &id.to_string());
    }

    Ok(())
}

/// Summary sentence for one suite's local report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub suite: String,
    pub results: Results,
    pub sentence: String,
}

/// Aggregate each suite's report and render its summary sentence.
pub fn summarize_suites(suites: &[String], reports: &ReportLocator) -> Result<Vec<SuiteSummary>> {
    suites
        .iter()
        .map(|suite| {
            let report = reports.load(suite)?;
            Ok(SuiteSummary {
                suite: suite.clone(),
                results: report.results,
                sentence: format_summary(&report.results, report.duration),
            })
        })
        .collect()
}

/// Record each summary as a check run named after its suite, so later
/// comparisons can use `head_sha` as their reference.
pub async fn publish_summaries(
    publisher: &dyn ChecksPublisher,
    head_sha: &str,
    summaries: &[SuiteSummary],
) -> Result<()> {
    for summary in summaries {
        let update = CheckRunUpdate {
            name: summary.suite.clone(),
            head_sha: head_sha.to_string(),
            conclusion: Conclusion::from_failed(summary.results.failed > 0),
            title: format!(
                "{} passed, {} failed",
                summary.results.passed, summary.results.failed
            ),
            summary: summary.sentence.clone(),
        };
        let id = publisher.upsert_check_run(&update).await?;
        obs::emit_report_published("check_run", &id.to_string());
    }
    Ok(())
}
