//! Sign-correction lookup.
//!
//! Inline documents may display a value with a flipped sign (costs shown
//! positive, for instance) and mark the flip out of band. The upstream
//! reader hands those markers over as raw triples; this lookup resolves a
//! (concept, context) pair to a multiplier so the verifier can reconcile
//! displayed signs before doing arithmetic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::naming;
use crate::period;

/// A raw sign marker from the instance document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignMarker {
    pub concept: String,
    pub context_id: String,
    /// True when the displayed value must be negated.
    pub negated: bool,
}

impl SignMarker {
    pub fn negated(concept: &str, context_id: &str) -> Self {
        Self {
            concept: concept.to_string(),
            context_id: context_id.to_string(),
            negated: true,
        }
    }
}

/// Resolved multipliers, built once per run and consulted during scoring.
#[derive(Debug, Clone, Default)]
pub struct SignLookup {
    exact: HashMap<(String, String), f64>,
    by_concept: HashMap<String, Vec<(String, f64)>>,
}

impl SignLookup {
    pub fn new(markers: &[SignMarker]) -> Self {
        let mut lookup = Self::default();
        for marker in markers {
            let concept = naming::normalize(&marker.concept);
            let sign = if marker.negated { -1.0 } else { 1.0 };
            lookup
                .exact
                .insert((concept.clone(), marker.context_id.clone()), sign);
            lookup
                .by_concept
                .entry(concept)
                .or_default()
                .push((marker.context_id.clone(), sign));
        }
        lookup
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    /// Multiplier for a (concept, context) pair, default `+1`.
    ///
    /// Falls back from the exact context to any marker on the same concept
    /// whose context covers the same period portion. Dimensional hash
    /// suffixes differ between the marker's context and the fact's even
    /// when they describe the same slice.
    pub fn multiplier(&self, concept: &str, context_id: &str) -> f64 {
        let key = naming::normalize(concept);
        if let Some(&sign) = self.exact.get(&(key.clone(), context_id.to_string())) {
            return sign;
        }
        if let Some(entries) = self.by_concept.get(&key) {
            let portion = period_portion(context_id);
            for (marker_ctx, sign) in entries {
                if period_portion(marker_ctx) == portion {
                    return *sign;
                }
            }
        }
        1.0
    }

    /// Applies the correction: a `-1` multiplier forces the value to its
    /// negated magnitude, `+1` leaves it untouched.
    pub fn apply(&self, concept: &str, context_id: &str, value: f64) -> f64 {
        if self.multiplier(concept, context_id) < 0.0 {
            -value.abs()
        } else {
            value
        }
    }
}

/// A context without a hash suffix is already a bare period portion.
fn period_portion(context_id: &str) -> String {
    period::extract_period_portion(context_id).unwrap_or_else(|| context_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup() -> SignLookup {
        SignLookup::new(&[SignMarker::negated(
            "us-gaap:TreasuryStockValue",
            "Instant_12_31_2024",
        )])
    }

    #[test]
    fn exact_pair_resolves() {
        let lookup = lookup();
        assert_eq!(lookup.multiplier("TreasuryStockValue", "Instant_12_31_2024"), -1.0);
        assert_eq!(lookup.multiplier("TreasuryStockValue", "Instant_12_31_2023"), 1.0);
        assert_eq!(lookup.multiplier("Assets", "Instant_12_31_2024"), 1.0);
    }

    #[test]
    fn falls_back_on_matching_period_portion() {
        let lookup = lookup();
        // Same instant, different dimensional suffix on the fact's context.
        assert_eq!(
            lookup.multiplier("TreasuryStockValue", "Instant_12_31_2024_abc123hash"),
            -1.0
        );
    }

    #[test]
    fn apply_forces_negated_magnitude() {
        let lookup = lookup();
        // The displayed value may already be negative; correction pins the
        // sign rather than toggling it.
        assert_eq!(lookup.apply("TreasuryStockValue", "Instant_12_31_2024", 500.0), -500.0);
        assert_eq!(lookup.apply("TreasuryStockValue", "Instant_12_31_2024", -500.0), -500.0);
        assert_eq!(lookup.apply("Assets", "Instant_12_31_2024", 500.0), 500.0);
    }
}
