//! JUnit-style report aggregation.
//!
//! A report has a single `<testsuites>` root with zero or more `<testsuite>`
//! children. Each child carries `tests`, `failures`, `errors` and `skipped`
//! counts; these are folded into one [`Results`] record. Failures and errors
//! are both counted as `failed`, and `passed` is derived so the totals always
//! add up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::error::{RegressionError, Result};
use crate::results::Results;

const ROOT_ELEMENT: &str = "testsuites";
const GROUP_ELEMENT: &str = "testsuite";
const IN_MEMORY: &str = "<memory>";

/// Aggregated contents of one report document.
#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    pub results: Results,
    /// Sum of the per-group `time` attributes, when every group has one.
    pub duration: Option<Duration>,
}

impl TestReport {
    /// Read and aggregate the report at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let xml = std::fs::read_to_string(path)
            .map_err(|e| RegressionError::report(path, format!("cannot read file: {e}")))?;
        let report = Self::parse_document(&xml, path)?;
        debug!(
            path = %path.display(),
            total = report.results.total,
            failed = report.results.failed,
            "Aggregated test report"
        );
        Ok(report)
    }

    /// Aggregate a report held in memory.
    pub fn parse(xml: &str) -> Result<Self> {
        Self::parse_document(xml, Path::new(IN_MEMORY))
    }

    fn parse_document(xml: &str, path: &Path) -> Result<Self> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| RegressionError::report(path, format!("invalid XML: {e}")))?;

        let root = doc.root_element();
        if root.tag_name().name() != ROOT_ELEMENT {
            return Err(RegressionError::report(
                path,
                format!(
                    "expected <{ROOT_ELEMENT}> root element, found <{}>",
                    root.tag_name().name()
                ),
            ));
        }

        let mut results = Results::default();
        let mut seconds = 0.0_f64;
        let mut timed = true;
        let mut groups = 0usize;

        for group in root
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == GROUP_ELEMENT)
        {
            groups += 1;
            let name = group.attribute("name").unwrap_or("<unnamed>");
            let counts = GroupCounts::read(&group).map_err(|reason| {
                RegressionError::report(path, format!("testsuite '{name}': {reason}"))
            })?;

            let passed = counts.passed().ok_or_else(|| {
                RegressionError::report(
                    path,
                    format!(
                        "testsuite '{name}': failures + errors + skipped exceeds tests ({})",
                        counts.tests
                    ),
                )
            })?;

            results = accumulate(&results, &counts, passed)
                .ok_or_else(|| RegressionError::report(path, "counts overflow"))?;

            match group.attribute("time").and_then(parse_seconds) {
                Some(s) if (seconds + s).is_finite() => seconds += s,
                _ => timed = false,
            }
        }

        let duration = if timed && groups > 0 {
            Duration::try_from_secs_f64(seconds).ok()
        } else {
            None
        };

        Ok(TestReport { results, duration })
    }
}

struct GroupCounts {
    tests: u64,
    failures: u64,
    errors: u64,
    skipped: u64,
}

impl GroupCounts {
    fn read(node: &roxmltree::Node<'_, '_>) -> std::result::Result<Self, String> {
        Ok(Self {
            tests: count_attribute(node, "tests")?,
            failures: count_attribute(node, "failures")?,
            errors: count_attribute(node, "errors")?,
            skipped: count_attribute(node, "skipped")?,
        })
    }

    fn passed(&self) -> Option<u64> {
        self.tests
            .checked_sub(self.failures)?
            .checked_sub(self.errors)?
            .checked_sub(self.skipped)
    }
}

/// Adds one group's counts to the running totals, or `None` on overflow.
fn accumulate(results: &Results, counts: &GroupCounts, passed: u64) -> Option<Results> {
    // passed() succeeded, so failures + errors <= tests
    let failed = counts.failures + counts.errors;
    Some(Results {
        total: results.total.checked_add(counts.tests)?,
        passed: results.passed.checked_add(passed)?,
        failed: results.failed.checked_add(failed)?,
        skipped: results.skipped.checked_add(counts.skipped)?,
    })
}

fn count_attribute(node: &roxmltree::Node<'_, '_>, name: &str) -> std::result::Result<u64, String> {
    let raw = node
        .attribute(name)
        .ok_or_else(|| format!("missing attribute '{name}'"))?;
    raw.parse::<u64>()
        .map_err(|_| format!("attribute '{name}' is not a non-negative integer: '{raw}'"))
}

fn parse_seconds(raw: &str) -> Option<f64> {
    raw.parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
}

/// Resolves the report file for a suite from a directory and a file-name
/// template containing `{suite}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLocator {
    dir: PathBuf,
    pattern: String,
}

impl ReportLocator {
    pub const SUITE_PLACEHOLDER: &'static str = "{suite}";
    pub const DEFAULT_PATTERN: &'static str = "{suite}.xml";

    pub fn new(dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Result<Self> {
        let pattern = pattern.into();
        if !pattern.contains(Self::SUITE_PLACEHOLDER) {
            return Err(RegressionError::Configuration(format!(
                "report pattern '{pattern}' must contain {}",
                Self::SUITE_PLACEHOLDER
            )));
        }
        Ok(Self {
            dir: dir.into(),
            pattern,
        })
    }

    pub fn path_for(&self, suite: &str) -> PathBuf {
        self.dir
            .join(self.pattern.replace(Self::SUITE_PLACEHOLDER, suite))
    }

    /// Load and aggregate the report for `suite`.
    pub fn load(&self, suite: &str) -> Result<TestReport> {
        TestReport::load(&self.path_for(suite))
    }
}

impl Default for ReportLocator {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            pattern: Self::DEFAULT_PATTERN.to_string(),
        }
    }
}
