//! Calculation-verification core for XBRL filings.
//!
//! Takes already-parsed facts, calculation relationships and sign markers
//! for one filing and checks every declared arithmetic relationship
//! ("Assets = Liabilities + Equity") against the reported values, honoring
//! the XBRL consistency rules: context equality, duplicate-fact
//! classification, decimal-precision-aware comparison, sign correction and
//! dimensional fallback.
//!
//! The crate is a pure in-memory transformation: no I/O, no document
//! parsing. One filing is verified synchronously on one thread; use
//! [`verify::verify_filings`] to fan independent filings out across a
//! rayon pool.

pub mod binding;
pub mod config;
pub mod context;
pub mod error;
pub mod fact;
pub mod grouping;
pub mod naming;
pub mod period;
pub mod registry;
pub mod sign;
pub mod tolerance;
pub mod verify;

// Re-export the top-level API for convenient access
pub use config::VerifyConfig;
pub use error::VerifyError;
pub use fact::Fact;
pub use registry::{CalcSource, CalculationRelation, FormulaRegistry};
pub use sign::SignMarker;
pub use verify::{verify_filing, verify_filings, FilingData, VerificationReport};
