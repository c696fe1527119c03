//! End-to-end comparison tests against in-memory check runs.

use std::path::Path;

use regression_core::fakes::MemoryChecks;
use regression_core::{
    compare_suites, publish_report, publish_summaries, summarize_suites, Conclusion,
    MissingReferencePolicy, PublishTarget, RegressionError, ReportLocator, Results, RunOutcome,
};
use tempfile::TempDir;

const REFERENCE_72_22: &str =
    "**94** tests were completed in **NaNms** with **72** passed, **22** failed and **0** skipped";

fn write_report(dir: &Path, suite: &str, groups: &[(u64, u64, u64, u64)]) {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites>\n");
    for (i, (tests, failures, errors, skipped)) in groups.iter().enumerate() {
        xml.push_str(&format!(
            "  <testsuite name=\"group {i}\" tests=\"{tests}\" failures=\"{failures}\" errors=\"{errors}\" skipped=\"{skipped}\"></testsuite>\n"
        ));
    }
    xml.push_str("</testsuites>\n");
    std::fs::write(dir.join(format!("{suite}.xml")), xml).expect("write report");
}

fn suites(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn setup() -> (TempDir, ReportLocator) {
    let dir = tempfile::tempdir().expect("tempdir");
    let locator = ReportLocator::new(dir.path(), ReportLocator::DEFAULT_PATTERN).expect("locator");
    (dir, locator)
}

/// Test: more failures than the reference is a regression and fails the run
#[tokio::test]
async fn test_regression_detected() {
    let (dir, locator) = setup();
    write_report(dir.path(), "h2spec", &[(50, 10, 4, 0), (44, 10, 0, 0)]);
    let checks = MemoryChecks::new().with_check_run("main", "h2spec", Some(REFERENCE_72_22));

    let outcome = compare_suites(
        &suites(&["h2spec"]),
        &locator,
        &checks,
        "main",
        MissingReferencePolicy::SkipSuccess,
    )
    .await
    .expect("compare");

    let report = outcome.report().expect("completed");
    assert_eq!(report.verdicts[0].current, Results::new(94, 70, 24, 0));
    assert_eq!(report.body(), "Regression detected in h2spec: 24 > 22");
    assert!(!outcome.is_success());
}

/// Test: fewer failures passes and reports the delta
#[tokio::test]
async fn test_improvement_passes() {
    let (dir, locator) = setup();
    write_report(dir.path(), "h2spec", &[(94, 20, 0, 0)]);
    let checks = MemoryChecks::new().with_check_run("main", "h2spec", Some(REFERENCE_72_22));

    let outcome = compare_suites(
        &suites(&["h2spec"]),
        &locator,
        &checks,
        "main",
        MissingReferencePolicy::SkipSuccess,
    )
    .await
    .expect("compare");

    assert!(outcome.is_success());
    assert_eq!(
        outcome.report().expect("completed").body(),
        "No regression in h2spec: failed count -2 (74 passed, 20 failed)"
    );
}

/// Test: one regressing suite fails the whole run; lines follow input order
#[tokio::test]
async fn test_any_regression_fails_batch() {
    let (dir, locator) = setup();
    write_report(dir.path(), "tls", &[(94, 22, 0, 0)]);
    write_report(dir.path(), "h2c", &[(94, 23, 0, 0)]);
    let checks = MemoryChecks::new()
        .with_check_run("main", "h2c", Some(REFERENCE_72_22))
        .with_check_run("main", "tls", Some(REFERENCE_72_22));

    let outcome = compare_suites(
        &suites(&["tls", "h2c"]),
        &locator,
        &checks,
        "main",
        MissingReferencePolicy::SkipSuccess,
    )
    .await
    .expect("compare");

    let report = outcome.report().expect("completed");
    let lines: Vec<&str> = report.verdicts.iter().map(|v| v.line.as_str()).collect();
    assert_eq!(
        lines,
        vec![
            "No regression in tls: failed count unchanged (72 passed, 22 failed)",
            "Regression detected in h2c: 23 > 22",
        ]
    );
    assert!(!outcome.is_success());
}

/// Test: missing reference stops the batch, outcome depends on the policy
#[tokio::test]
async fn test_missing_reference_stops_batch() {
    let (dir, locator) = setup();
    write_report(dir.path(), "first", &[(1, 0, 0, 0)]);
    write_report(dir.path(), "second", &[(1, 1, 0, 0)]);
    let checks = MemoryChecks::new().with_check_run("main", "second", Some(REFERENCE_72_22));

    for (policy, success) in [
        (MissingReferencePolicy::SkipSuccess, true),
        (MissingReferencePolicy::Fail, false),
    ] {
        let outcome = compare_suites(
            &suites(&["first", "second"]),
            &locator,
            &checks,
            "main",
            policy,
        )
        .await
        .expect("compare");

        assert_eq!(
            outcome,
            RunOutcome::ReferenceMissing {
                suite: "first".to_string(),
                policy,
            }
        );
        assert_eq!(outcome.is_success(), success);
    }
}

/// Test: a malformed reference summary aborts with diagnostics
#[tokio::test]
async fn test_malformed_summary_is_fatal() {
    let (dir, locator) = setup();
    write_report(dir.path(), "h2spec", &[(1, 0, 0, 0)]);
    let checks = MemoryChecks::new().with_check_run("main", "h2spec", Some("94 tests ran"));

    let err = compare_suites(
        &suites(&["h2spec"]),
        &locator,
        &checks,
        "main",
        MissingReferencePolicy::SkipSuccess,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RegressionError::ReferenceSummaryMalformed { .. }));
    assert!(err.to_string().contains("94 tests ran"));
}

/// Test: a missing local report is fatal even when a reference exists
#[tokio::test]
async fn test_missing_report_is_fatal() {
    let (_dir, locator) = setup();
    let checks = MemoryChecks::new().with_check_run("main", "h2spec", Some(REFERENCE_72_22));

    let err = compare_suites(
        &suites(&["h2spec"]),
        &locator,
        &checks,
        "main",
        MissingReferencePolicy::Fail,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RegressionError::ReportParse { .. }));
}

/// Test: platform errors propagate before any suite is compared
#[tokio::test]
async fn test_platform_error_propagates() {
    let (dir, locator) = setup();
    write_report(dir.path(), "h2spec", &[(1, 0, 0, 0)]);
    let checks = MemoryChecks::new().failing("bad credentials");

    let err = compare_suites(
        &suites(&["h2spec"]),
        &locator,
        &checks,
        "main",
        MissingReferencePolicy::SkipSuccess,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RegressionError::Platform(_)));
}

/// Test: empty suite list is a configuration error
#[tokio::test]
async fn test_empty_suites_rejected() {
    let (_dir, locator) = setup();
    let checks = MemoryChecks::new();
    let err = compare_suites(&[], &locator, &checks, "main", MissingReferencePolicy::Fail)
        .await
        .unwrap_err();
    assert!(matches!(err, RegressionError::Configuration(_)));
}

/// Test: summaries recorded on the reference commit are read back by compare
#[tokio::test]
async fn test_summarize_then_compare() {
    let (dir, locator) = setup();
    write_report(dir.path(), "h2spec", &[(60, 3, 1, 2), (34, 0, 0, 0)]);
    let checks = MemoryChecks::new();

    let summaries = summarize_suites(&suites(&["h2spec"]), &locator).expect("summarize");
    assert_eq!(summaries[0].results, Results::new(94, 88, 4, 2));
    publish_summaries(&checks, "base-sha", &summaries)
        .await
        .expect("publish summaries");

    let updates = checks.check_run_updates();
    assert_eq!(updates[0].name, "h2spec");
    assert_eq!(updates[0].conclusion, Conclusion::Failure);

    write_report(dir.path(), "h2spec", &[(94, 4, 0, 0)]);
    let outcome = compare_suites(
        &suites(&["h2spec"]),
        &locator,
        &checks,
        "base-sha",
        MissingReferencePolicy::Fail,
    )
    .await
    .expect("compare");

    assert!(outcome.is_success());
    let verdict = &outcome.report().expect("completed").verdicts[0];
    assert_eq!(verdict.reference, Results::new(94, 88, 4, 2));
    assert!(verdict.line.contains("failed count unchanged"));
}

/// Test: report is posted as a comment and as the regression check run
#[tokio::test]
async fn test_publish_report_to_comment_and_check() {
    let (dir, locator) = setup();
    write_report(dir.path(), "h2spec", &[(94, 24, 0, 0)]);
    let checks = MemoryChecks::new().with_check_run("main", "h2spec", Some(REFERENCE_72_22));

    let outcome = compare_suites(
        &suites(&["h2spec"]),
        &locator,
        &checks,
        "main",
        MissingReferencePolicy::SkipSuccess,
    )
    .await
    .expect("compare");
    let report = outcome.report().expect("completed");

    let target = PublishTarget::new(Some(42), Some("head-sha".to_string()));
    publish_report(&checks, &target, report).await.expect("publish");

    let comments = checks.comments();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].pr_number, 42);
    assert_eq!(comments[0].body, "Regression detected in h2spec: 24 > 22");

    let updates = checks.check_run_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].name, "h2spec-regression");
    assert_eq!(updates[0].head_sha, "head-sha");
    assert_eq!(updates[0].conclusion, Conclusion::Failure);
    assert_eq!(updates[0].summary, comments[0].body);
}

/// Test: nothing is published without a PR or head SHA
#[tokio::test]
async fn test_publish_without_target_is_noop() {
    let checks = MemoryChecks::new();
    let report = regression_core::ComparisonReport::new();
    publish_report(&checks, &PublishTarget::new(None, None), &report)
        .await
        .expect("publish");
    assert!(checks.comments().is_empty());
    assert!(checks.check_run_updates().is_empty());
}
