//! Batch comparison across suites.
//!
//! Suites are compared one at a time in input order. Any error aborts the
//! whole batch; a missing reference check run also stops the batch but is
//! reported as a [`RunOutcome`] so the caller picks the exit status.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classify::{classify, ComparisonReport, Verdict};
use crate::error::{RegressionError, Result};
use crate::obs;
use crate::platform::{CheckRun, CheckRunSource};
use crate::report::ReportLocator;
use crate::summary::extract_reference;

/// What to do when a suite has no reference check run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingReferencePolicy {
    /// Nothing to compare against yet; stop and succeed.
    #[default]
    SkipSuccess,
    /// Stop and fail.
    Fail,
}

impl MissingReferencePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissingReferencePolicy::SkipSuccess => "skip-success",
            MissingReferencePolicy::Fail => "fail",
        }
    }
}

impl std::fmt::Display for MissingReferencePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingReferencePolicy {
    type Err = RegressionError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "skip-success" => Ok(MissingReferencePolicy::SkipSuccess),
            "fail" => Ok(MissingReferencePolicy::Fail),
            other => Err(RegressionError::Configuration(format!(
                "unknown missing-reference policy '{other}' (expected skip-success or fail)"
            ))),
        }
    }
}

/// How a comparison batch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every suite was compared.
    Completed(ComparisonReport),
    /// `suite` had no reference check run; remaining suites were skipped.
    ReferenceMissing {
        suite: String,
        policy: MissingReferencePolicy,
    },
}

impl RunOutcome {
    /// Whether the process should exit successfully.
    pub fn is_success(&self) -> bool {
        match self {
            RunOutcome::Completed(report) => !report.regression(),
            RunOutcome::ReferenceMissing { policy, .. } => {
                *policy == MissingReferencePolicy::SkipSuccess
            }
        }
    }

    pub fn report(&self) -> Option<&ComparisonReport> {
        match self {
            RunOutcome::Completed(report) => Some(report),
            RunOutcome::ReferenceMissing { .. } => None,
        }
    }
}

/// Split a comma-separated suite list. Entries are trimmed and empty entries
/// dropped; an empty result is a configuration error.
pub fn parse_suite_list(raw: &str) -> Result<Vec<String>> {
    let suites: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if suites.is_empty() {
        return Err(RegressionError::Configuration(
            "suite list is empty".to_string(),
        ));
    }
    Ok(suites)
}

/// Compare one suite's local report against the reference check runs.
pub fn compare_suite(
    suite: &str,
    reports: &ReportLocator,
    reference_runs: &[CheckRun],
) -> Result<Verdict> {
    let current = reports.load(suite)?.results;
    let reference = extract_reference(suite, reference_runs)?;
    Ok(classify(suite, &current, &reference))
}

/// Compare every suite against the check runs recorded on `reference_ref`.
pub async fn compare_suites(
    suites: &[String],
    reports: &ReportLocator,
    source: &dyn CheckRunSource,
    reference_ref: &str,
    policy: MissingReferencePolicy,
) -> Result<RunOutcome> {
    if suites.is_empty() {
        return Err(RegressionError::Configuration(
            "no suites to compare".to_string(),
        ));
    }

    let reference_runs = source.list_check_runs(reference_ref).await?;
    info!(
        reference_ref = %reference_ref,
        check_runs = reference_runs.len(),
        "Loaded reference check runs"
    );

    let mut report = ComparisonReport::new();
    for suite in suites {
        match compare_suite(suite, reports, &reference_runs) {
            Ok(verdict) => {
                obs::emit_suite_compared(&verdict);
                report.push(verdict);
            }
            Err(RegressionError::ReferenceNotFound { suite }) => {
                obs::emit_reference_missing(&suite, reference_ref, policy);
                return Ok(RunOutcome::ReferenceMissing { suite, policy });
            }
            Err(e) => return Err(e),
        }
    }

    obs::emit_run_finished(report.verdicts.len(), report.regression());
    Ok(RunOutcome::Completed(report))
}
