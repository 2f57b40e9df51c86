//! The fact record handed to the engine by upstream readers.
//!
//! One explicit record type with optional fields; the upstream adapter is
//! responsible for normalizing whatever heterogeneous shapes the document
//! parser produced into this form. Facts are immutable once loaded and
//! owned by the filing's fact set for the duration of one run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tolerance::Decimals;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Concept name as reported (possibly namespace-qualified).
    pub concept: String,
    pub value: f64,
    pub unit: Option<String>,
    pub decimals: Decimals,
    pub context_id: String,
    /// Axis -> member qualifiers, empty for default contexts.
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_total: bool,
}

impl Fact {
    /// Minimal constructor for the common case; dimensions and flags
    /// default to empty/false.
    pub fn new(concept: &str, value: f64, context_id: &str) -> Self {
        Self {
            concept: concept.to_string(),
            value,
            unit: None,
            decimals: Decimals::Exact,
            context_id: context_id.to_string(),
            dimensions: BTreeMap::new(),
            is_abstract: false,
            is_total: false,
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn with_decimals(mut self, decimals: i32) -> Self {
        self.decimals = Decimals::Digits(decimals);
        self
    }

    pub fn has_dimensions(&self) -> bool {
        !self.dimensions.is_empty()
    }
}

/// Strings that statements use to publish a nil value (em-dash, `N/A`, ...).
const NIL_MARKERS: [&str; 9] = ["", "-", "--", "---", "\u{2014}", "\u{2013}", "nil", "N/A", "n/a"];

/// Parses a raw textual fact value into a number.
///
/// Nil markers and unparseable text both return `None`: the engine treats
/// such facts as missing rather than failing the run.
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if NIL_MARKERS.contains(&trimmed) || trimmed.eq_ignore_ascii_case("none") {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | '$'))
        .collect();
    cleaned.parse::<f64>().ok()
}
