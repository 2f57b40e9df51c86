//! Period extraction from context identifiers.
pub mod extractor;

pub use extractor::{extract, extract_period_portion, PeriodInfo, PeriodKind};
