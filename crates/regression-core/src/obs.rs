//! Structured log events for the comparison lifecycle.
//!
//! Every event carries an `event` field so JSON log lines can be filtered
//! without parsing messages:
//! - `suite.compared`
//! - `reference.missing`
//! - `run.finished`
//! - `report.published`

use tracing::{info, warn};

use crate::classify::Verdict;
use crate::compare::MissingReferencePolicy;

/// A suite was compared against its reference.
pub fn emit_suite_compared(verdict: &Verdict) {
    info!(
        event = "suite.compared",
        suite = %verdict.suite,
        current_failed = verdict.current.failed,
        reference_failed = verdict.reference.failed,
        regression = verdict.regression,
    );
}

/// No reference check run exists for `suite`; the batch stops here.
pub fn emit_reference_missing(suite: &str, reference_ref: &str, policy: MissingReferencePolicy) {
    warn!(
        event = "reference.missing",
        suite = %suite,
        reference_ref = %reference_ref,
        policy = %policy,
    );
}

/// All suites were compared.
pub fn emit_run_finished(suites: usize, regression: bool) {
    info!(event = "run.finished", suites = suites, regression = regression);
}

/// A report was published to the platform. `target` is `comment` or
/// `check_run`.
pub fn emit_report_published(target: &str, id: &str) {
    info!(event = "report.published", target = %target, id = %id);
}
