//! Per-run configuration for the verification engine.
//!
//! One `VerifyConfig` is constructed per filing run and passed by value to
//! the components that need it. There is no process-wide state: two runs
//! with different configurations never interact.

use serde::{Deserialize, Serialize};

use crate::context::MatchLevel;
use crate::error::VerifyError;

/// Minimum fraction of a calculation's declared children that must be
/// found before the calculation is considered verifiable.
pub const DEFAULT_COMPLETENESS_THRESHOLD: f64 = 0.5;

/// When the weighted child sum exceeds the parent, overshoot up to this
/// fraction of the parent magnitude is classified as a rounding artifact
/// (warning) rather than a real inconsistency (critical).
pub const DEFAULT_OVERSHOOT_ROUNDING_THRESHOLD: f64 = 0.05;

/// Percentage tolerance used as a fallback when classifying duplicate
/// facts whose decimals attributes do not allow a precision comparison.
pub const DEFAULT_DUPLICATE_PERCENTAGE_TOLERANCE: f64 = 0.02;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Completeness gate for binding, in `0.0..=1.0`.
    pub completeness_threshold: f64,
    /// Overshoot ratio below which a failed sum is a warning, not critical.
    pub overshoot_rounding_threshold: f64,
    /// Percentage fallback for duplicate classification.
    pub duplicate_percentage_tolerance: f64,
    /// Granularity used when deciding whether a fallback context may stand
    /// in for the parent's context.
    pub match_level: MatchLevel,
    /// Whether missing children may be filled from compatible contexts.
    pub allow_dimensional_fallback: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            completeness_threshold: DEFAULT_COMPLETENESS_THRESHOLD,
            overshoot_rounding_threshold: DEFAULT_OVERSHOOT_ROUNDING_THRESHOLD,
            duplicate_percentage_tolerance: DEFAULT_DUPLICATE_PERCENTAGE_TOLERANCE,
            match_level: MatchLevel::Period,
            allow_dimensional_fallback: true,
        }
    }
}

impl VerifyConfig {
    /// Rejects configurations that would make a run meaningless.
    pub fn validate(&self) -> Result<(), VerifyError> {
        if !(0.0..=1.0).contains(&self.completeness_threshold) {
            return Err(VerifyError::InvalidThreshold(self.completeness_threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(VerifyConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let cfg = VerifyConfig {
            completeness_threshold: 1.5,
            ..VerifyConfig::default()
        };
        assert_eq!(cfg.validate(), Err(VerifyError::InvalidThreshold(1.5)));
    }
}
