//! Defines the error types for the verification engine.
//!
//! Verification findings (skips, failures, warnings) are never errors:
//! they are returned as data. This type only covers configuration states
//! that should prevent a run from starting at all.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerifyError {
    /// The registry holds no calculation trees from any source, so there is
    /// nothing to verify against.
    #[error("no calculation relations loaded; registry is empty")]
    NoCalculationsLoaded,

    /// The filing supplied no facts at all.
    #[error("no facts supplied for verification")]
    NoFacts,

    #[error("invalid completeness threshold {0}; must be within 0.0..=1.0")]
    InvalidThreshold(f64),
}
