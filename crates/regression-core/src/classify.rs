//! Regression classification.
//!
//! A suite regresses when it has strictly more failures than its reference.
//! Only counts are compared: the same number of failures in different tests
//! is not a regression.

use serde::{Deserialize, Serialize};

use crate::results::Results;

/// Change in failure count for a suite that did not regress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedDelta {
    Unchanged,
    Fewer(u64),
}

impl std::fmt::Display for FailedDelta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailedDelta::Unchanged => f.write_str("unchanged"),
            FailedDelta::Fewer(n) => write!(f, "-{n}"),
        }
    }
}

/// Outcome of comparing one suite against its reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub suite: String,
    pub current: Results,
    pub reference: Results,
    pub regression: bool,
    pub line: String,
}

/// Compare `current` against `reference` for `suite`.
pub fn classify(suite: &str, current: &Results, reference: &Results) -> Verdict {
    let regression = current.failed > reference.failed;

    let line = if regression {
        format!(
            "Regression detected in {}: {} > {}",
            suite, current.failed, reference.failed
        )
    } else {
        let delta = if current.failed == reference.failed {
            FailedDelta::Unchanged
        } else {
            FailedDelta::Fewer(reference.failed - current.failed)
        };
        format!(
            "No regression in {}: failed count {} ({} passed, {} failed)",
            suite, delta, current.passed, current.failed
        )
    };

    Verdict {
        suite: suite.to_string(),
        current: *current,
        reference: *reference,
        regression,
        line,
    }
}

/// Ordered verdicts for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub verdicts: Vec<Verdict>,
}

impl ComparisonReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, verdict: Verdict) {
        self.verdicts.push(verdict);
    }

    /// Whether any suite regressed.
    pub fn regression(&self) -> bool {
        self.verdicts.iter().any(|v| v.regression)
    }

    /// Verdict lines joined in suite order.
    pub fn body(&self) -> String {
        self.verdicts
            .iter()
            .map(|v| v.line.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Short headline for check-run titles.
    pub fn title(&self) -> String {
        let regressed = self.verdicts.iter().filter(|v| v.regression).count();
        if regressed == 0 {
            format!("No regression in {} suite(s)", self.verdicts.len())
        } else {
            format!(
                "Regression detected in {} of {} suite(s)",
                regressed,
                self.verdicts.len()
            )
        }
    }
}
