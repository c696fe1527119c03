//! Normalized test counts.

use serde::{Deserialize, Serialize};

/// Pass/fail/skip counts for one suite run.
///
/// Counts produced by the report aggregator always satisfy
/// `total == passed + failed + skipped`. Counts read back from a reference
/// summary are taken as written and may not.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Results {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl Results {
    pub fn new(total: u64, passed: u64, failed: u64, skipped: u64) -> Self {
        Self {
            total,
            passed,
            failed,
            skipped,
        }
    }

    /// Whether `total` equals the sum of the other three counts.
    pub fn is_consistent(&self) -> bool {
        self.passed
            .checked_add(self.failed)
            .and_then(|n| n.checked_add(self.skipped))
            == Some(self.total)
    }
}
