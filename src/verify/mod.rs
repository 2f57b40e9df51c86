//! The verification pass: orchestration, checks, and summary.
//!
//! One filing's verification is synchronous and owns all of its state, so
//! independent filings can run on worker threads without any sharing.

pub mod consistency;
pub mod report;
pub mod summary;
pub mod verifier;

pub use report::{CheckKind, CheckStatus, Severity, VerificationCheck};
pub use summary::VerificationSummary;
pub use verifier::CalculationVerifier;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::VerifyConfig;
use crate::error::VerifyError;
use crate::fact::Fact;
use crate::grouping;
use crate::registry::{CalculationRelation, FormulaRegistry, RegistrySummary};
use crate::sign::{SignLookup, SignMarker};

/// Everything the engine needs for one filing, already materialized by
/// upstream collaborators. Read-only during verification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilingData {
    pub filing_id: String,
    pub facts: Vec<Fact>,
    pub relations: Vec<CalculationRelation>,
    #[serde(default)]
    pub sign_markers: Vec<SignMarker>,
}

/// The full outcome of verifying one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub filing_id: String,
    pub checks: Vec<VerificationCheck>,
    pub summary: VerificationSummary,
    pub registry: RegistrySummary,
}

/// Verifies one filing end to end.
///
/// Configuration problems and empty inputs are errors that prevent the run
/// from starting; they never surface as spurious skips.
pub fn verify_filing(data: &FilingData, config: &VerifyConfig) -> Result<VerificationReport, VerifyError> {
    config.validate()?;
    if data.facts.is_empty() {
        return Err(VerifyError::NoFacts);
    }
    if data.relations.is_empty() {
        return Err(VerifyError::NoCalculationsLoaded);
    }

    info!(
        filing = %data.filing_id,
        facts = data.facts.len(),
        relations = data.relations.len(),
        "verifying filing"
    );

    let groups = grouping::group_facts(&data.facts, config.duplicate_percentage_tolerance);
    let signs = SignLookup::new(&data.sign_markers);
    let mut registry = FormulaRegistry::new();
    registry.load_relations(&data.relations);
    if registry.is_empty() {
        return Err(VerifyError::NoCalculationsLoaded);
    }

    let verifier = CalculationVerifier::new(config, &groups, &signs);
    let mut checks = verifier.verify_all(&registry);
    checks.extend(consistency::duplicate_checks(&groups));
    checks.extend(consistency::cross_statement_checks(&groups));

    let summary = VerificationSummary::from_checks(&checks);
    info!(
        filing = %data.filing_id,
        total = summary.total,
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        score = summary.score,
        "verification complete"
    );

    Ok(VerificationReport {
        filing_id: data.filing_id.clone(),
        checks,
        summary,
        registry: registry.summary(),
    })
}

/// Verifies independent filings in parallel. No state crosses filing
/// boundaries, so each worker owns its groups, registry, and sign lookup.
pub fn verify_filings(
    filings: &[FilingData],
    config: &VerifyConfig,
) -> Result<Vec<VerificationReport>, VerifyError> {
    config.validate()?;
    filings
        .par_iter()
        .map(|data| verify_filing(data, config))
        .collect()
}
