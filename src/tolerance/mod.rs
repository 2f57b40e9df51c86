//! Decimal-precision-aware value comparison.
pub mod decimal;

pub use decimal::{compare, comparison_decimals, round_to_decimals, Decimals, ToleranceResult};
