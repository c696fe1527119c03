//! Summary sentence codec.
//!
//! Reference results are not stored anywhere structured: each suite's check
//! run on the reference branch carries a summary sentence of the form
//!
//! ```text
//! **94** tests were completed in **NaNms** with **70** passed, **24** failed and **0** skipped
//! ```
//!
//! [`format_summary`] writes that sentence and [`parse_summary`] reads it
//! back. The two must stay in lockstep; older runs on the reference branch
//! are only readable while the grammar is unchanged.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use tracing::warn;

use crate::error::{RegressionError, Result};
use crate::platform::CheckRun;
use crate::results::Results;

/// Pattern matched against reference summaries.
///
/// Groups: 1 total, 2 duration (ignored), 3 passed, 4 failed, 5 skipped.
pub const SUMMARY_PATTERN: &str = r"\*\*(\d+)\*\* tests were completed in \*\*(\w+)ms\*\* with \*\*(\d+)\*\* passed, \*\*(\d+)\*\* failed and \*\*(\d+)\*\* skipped";

const UNKNOWN_DURATION: &str = "NaN";

fn summary_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SUMMARY_PATTERN).expect("summary pattern is valid"))
}

/// Render `results` as a summary sentence.
///
/// An unknown duration renders as `NaN`; a known one as whole milliseconds.
pub fn format_summary(results: &Results, duration: Option<Duration>) -> String {
    let duration = duration
        .map(|d| d.as_millis().to_string())
        .unwrap_or_else(|| UNKNOWN_DURATION.to_string());
    format!(
        "**{}** tests were completed in **{}ms** with **{}** passed, **{}** failed and **{}** skipped",
        results.total, duration, results.passed, results.failed, results.skipped
    )
}

/// Read counts back out of a summary sentence.
///
/// The sentence may be embedded in longer text. Returns `None` when the
/// pattern does not match or a count does not fit in a `u64`.
pub fn parse_summary(text: &str) -> Option<Results> {
    let caps = summary_regex().captures(text)?;
    let count = |i: usize| caps.get(i)?.as_str().parse::<u64>().ok();
    Some(Results {
        total: count(1)?,
        passed: count(3)?,
        failed: count(4)?,
        skipped: count(5)?,
    })
}

/// Extract the reference results for `suite` from the check runs recorded on
/// the reference commit.
///
/// The check run must be named exactly `suite` and carry a summary matching
/// [`SUMMARY_PATTERN`]. Extracted counts are trusted as-is.
pub fn extract_reference(suite: &str, check_runs: &[CheckRun]) -> Result<Results> {
    let run = check_runs
        .iter()
        .find(|run| run.name == suite)
        .ok_or_else(|| RegressionError::ReferenceNotFound {
            suite: suite.to_string(),
        })?;

    let summary = run
        .summary
        .as_deref()
        .ok_or_else(|| RegressionError::ReferenceSummaryMissing {
            suite: suite.to_string(),
        })?;

    let results =
        parse_summary(summary).ok_or_else(|| RegressionError::ReferenceSummaryMalformed {
            suite: suite.to_string(),
            summary: summary.to_string(),
            pattern: SUMMARY_PATTERN.to_string(),
        })?;

    if !results.is_consistent() {
        warn!(
            suite = %suite,
            total = results.total,
            passed = results.passed,
            failed = results.failed,
            skipped = results.skipped,
            "Reference counts do not add up; using them as recorded"
        );
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(name: &str, summary: Option<&str>) -> CheckRun {
        CheckRun {
            id: 1,
            name: name.to_string(),
            summary: summary.map(str::to_string),
        }
    }

    #[test]
    fn test_parse_nan_duration() {
        let text = "**94** tests were completed in **NaNms** with **70** passed, **24** failed and **0** skipped";
        assert_eq!(parse_summary(text), Some(Results::new(94, 70, 24, 0)));
    }

    #[test]
    fn test_parse_numeric_duration() {
        let text = "**10** tests were completed in **1234ms** with **7** passed, **2** failed and **1** skipped";
        assert_eq!(parse_summary(text), Some(Results::new(10, 7, 2, 1)));
    }

    #[test]
    fn test_parse_embedded_in_markdown() {
        let text = "## h2spec\n\n**3** tests were completed in **5ms** with **3** passed, **0** failed and **0** skipped\n\n<details>...</details>";
        assert_eq!(parse_summary(text), Some(Results::new(3, 3, 0, 0)));
    }

    #[test]
    fn test_parse_rejects_other_text() {
        assert_eq!(parse_summary("94 tests, 24 failed"), None);
        assert_eq!(
            parse_summary("**94** tests were completed in **NaNms** with **70** passed"),
            None
        );
    }

    #[test]
    fn test_parse_rejects_overflowing_count() {
        let text = "**99999999999999999999999** tests were completed in **1ms** with **0** passed, **0** failed and **0** skipped";
        assert_eq!(parse_summary(text), None);
    }

    #[test]
    fn test_format_known_and_unknown_duration() {
        let r = Results::new(94, 70, 24, 0);
        assert_eq!(
            format_summary(&r, None),
            "**94** tests were completed in **NaNms** with **70** passed, **24** failed and **0** skipped"
        );
        assert_eq!(
            format_summary(&r, Some(Duration::from_millis(1500))),
            "**94** tests were completed in **1500ms** with **70** passed, **24** failed and **0** skipped"
        );
    }

    #[test]
    fn test_format_then_parse_preserves_counts() {
        let samples = [
            (Results::new(0, 0, 0, 0), None),
            (Results::new(94, 70, 24, 0), Some(Duration::from_secs(3))),
            (Results::new(146, 140, 1, 5), Some(Duration::from_micros(900))),
        ];
        for (results, duration) in samples {
            let text = format_summary(&results, duration);
            assert_eq!(parse_summary(&text), Some(results), "sentence: {text}");
        }
    }

    #[test]
    fn test_extract_matching_run() {
        let runs = vec![
            run("build", Some("ok")),
            run(
                "h2spec",
                Some("**94** tests were completed in **NaNms** with **72** passed, **22** failed and **0** skipped"),
            ),
        ];
        let reference = extract_reference("h2spec", &runs).expect("extract");
        assert_eq!(reference, Results::new(94, 72, 22, 0));
    }

    #[test]
    fn test_extract_requires_exact_name() {
        let runs = vec![run("h2spec-tls", Some("whatever"))];
        let err = extract_reference("h2spec", &runs).unwrap_err();
        assert!(matches!(err, RegressionError::ReferenceNotFound { suite } if suite == "h2spec"));
    }

    #[test]
    fn test_extract_missing_summary() {
        let runs = vec![run("h2spec", None)];
        let err = extract_reference("h2spec", &runs).unwrap_err();
        assert!(matches!(err, RegressionError::ReferenceSummaryMissing { .. }));
    }

    #[test]
    fn test_extract_malformed_summary_carries_text() {
        let runs = vec![run("h2spec", Some("All tests passed"))];
        let err = extract_reference("h2spec", &runs).unwrap_err();
        match err {
            RegressionError::ReferenceSummaryMalformed {
                suite,
                summary,
                pattern,
            } => {
                assert_eq!(suite, "h2spec");
                assert_eq!(summary, "All tests passed");
                assert_eq!(pattern, SUMMARY_PATTERN);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extract_trusts_inconsistent_counts() {
        let runs = vec![run(
            "h2spec",
            Some("**10** tests were completed in **NaNms** with **1** passed, **1** failed and **1** skipped"),
        )];
        let reference = extract_reference("h2spec", &runs).expect("extract");
        assert_eq!(reference, Results::new(10, 1, 1, 1));
    }
}
