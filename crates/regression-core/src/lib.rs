//! h2spec regression core
//!
//! Compares the failure counts of a pull request's h2spec reports against
//! the reference counts recorded on the main branch:
//! - aggregates JUnit-style reports into [`Results`]
//! - reads reference [`Results`] back from check-run summary sentences
//! - classifies each suite and decides the overall outcome

pub mod classify;
pub mod compare;
pub mod error;
pub mod fakes;
pub mod obs;
pub mod platform;
pub mod publish;
pub mod report;
pub mod results;
pub mod summary;
pub mod telemetry;

pub use classify::{classify, ComparisonReport, FailedDelta, Verdict};
pub use compare::{
    compare_suite, compare_suites, parse_suite_list, MissingReferencePolicy, RunOutcome,
};
pub use error::{RegressionError, Result};
pub use platform::{CheckRun, CheckRunSource, CheckRunUpdate, ChecksPublisher, Conclusion};
pub use publish::{
    publish_report, publish_summaries, summarize_suites, PublishTarget, SuiteSummary,
    DEFAULT_CHECK_NAME,
};
pub use report::{ReportLocator, TestReport};
pub use results::Results;
pub use summary::{extract_reference, format_summary, parse_summary, SUMMARY_PATTERN};
pub use telemetry::init_tracing;
