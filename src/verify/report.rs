//! Check records produced by a verification run.

use serde::{Deserialize, Serialize};

use crate::binding::BindingStatus;
use crate::registry::CalcSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Passed,
    Failed,
    /// Verification could not be meaningfully performed; neither a pass
    /// nor a failure.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// One (calculation tree, context) evaluation.
    Calculation,
    /// Contradictory duplicate values for one concept in one context.
    DuplicateFacts,
    /// The same concept and period reported with different values across
    /// statements.
    CrossStatement,
    /// Company and taxonomy formulas disagree for the same concept.
    SourceComparison,
}

/// One evaluated finding. Numeric fields are populated for calculation
/// checks and left empty for structural findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationCheck {
    pub kind: CheckKind,
    pub status: CheckStatus,
    pub severity: Severity,
    pub concept: String,
    pub context_id: Option<String>,
    pub message: String,
    pub expected: Option<f64>,
    pub actual: Option<f64>,
    pub difference: Option<f64>,
    /// Decimals both sides were rounded at for the comparison.
    pub comparison_decimals: Option<i32>,
    pub missing_children: Vec<String>,
    pub skip_reason: Option<BindingStatus>,
    pub source: Option<CalcSource>,
}

impl VerificationCheck {
    pub fn finding(kind: CheckKind, status: CheckStatus, severity: Severity, concept: &str) -> Self {
        Self {
            kind,
            status,
            severity,
            concept: concept.to_string(),
            context_id: None,
            message: String::new(),
            expected: None,
            actual: None,
            difference: None,
            comparison_decimals: None,
            missing_children: Vec::new(),
            skip_reason: None,
            source: None,
        }
    }

    pub fn in_context(mut self, context_id: &str) -> Self {
        self.context_id = Some(context_id.to_string());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn passed(&self) -> bool {
        self.status == CheckStatus::Passed
    }

    pub fn skipped(&self) -> bool {
        self.status == CheckStatus::Skipped
    }
}
