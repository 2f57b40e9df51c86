//! Aggregate counts and the 0-100 quality score.

use serde::{Deserialize, Serialize};

use crate::verify::report::{CheckStatus, Severity, VerificationCheck};

/// Penalty per critical finding when deriving the score.
const CRITICAL_PENALTY: f64 = 10.0;
/// Penalty per warning finding.
const WARNING_PENALTY: f64 = 2.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
    pub score: f64,
}

impl VerificationSummary {
    /// Builds the summary from a run's full check list.
    ///
    /// Skips are excluded from the failure side of the score: a check that
    /// could not be attempted is not evidence of a bad filing. Each failed
    /// check then deducts a severity-weighted penalty.
    pub fn from_checks(checks: &[VerificationCheck]) -> Self {
        let mut summary = Self::default();
        summary.total = checks.len();
        for check in checks {
            match check.status {
                CheckStatus::Passed => summary.passed += 1,
                CheckStatus::Failed => summary.failed += 1,
                CheckStatus::Skipped => summary.skipped += 1,
            }
            match check.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Warning => summary.warning += 1,
                Severity::Info => summary.info += 1,
            }
        }
        summary.score = summary.derive_score();
        summary
    }

    fn derive_score(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        let base = (self.passed + self.skipped) as f64 / self.total as f64 * 100.0;
        let penalty =
            self.critical as f64 * CRITICAL_PENALTY + self.warning as f64 * WARNING_PENALTY;
        (base - penalty).clamp(0.0, 100.0)
    }
}
