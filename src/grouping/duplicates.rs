//! Duplicate fact classification.
//!
//! A concept reported more than once in the same context is a duplicate.
//! Classification decides whether the extras are harmless (`Complete`),
//! reconcilable (`Consistent`, keep the finest precision) or contradictory
//! (`Inconsistent`, the concept is unusable in that context).

use serde::{Deserialize, Serialize};

use crate::fact::Fact;
use crate::tolerance;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateClass {
    /// Only one occurrence; not a duplicate at all.
    Unique,
    /// Identical raw values; extras can be ignored.
    Complete,
    /// Values agree under decimal tolerance but differ in precision; the
    /// finest-precision occurrence is the usable one.
    Consistent,
    /// Values disagree beyond tolerance; unusable for binding, surfaced
    /// as a critical finding.
    Inconsistent,
}

impl DuplicateClass {
    pub fn is_usable(self) -> bool {
        self != DuplicateClass::Inconsistent
    }
}

/// Classifies the occurrences of one concept in one context.
///
/// Pairs are compared under decimal tolerance; a relative difference within
/// `percentage_tolerance` also counts as consistent, covering filers that
/// restate the same figure at an unrelated precision.
pub fn classify_occurrences(occurrences: &[Fact], percentage_tolerance: f64) -> DuplicateClass {
    if occurrences.len() < 2 {
        return DuplicateClass::Unique;
    }

    let first = &occurrences[0];
    if occurrences[1..].iter().all(|f| f.value == first.value) {
        return DuplicateClass::Complete;
    }

    for (i, a) in occurrences.iter().enumerate() {
        for b in &occurrences[i + 1..] {
            if !values_agree(a, b, percentage_tolerance) {
                return DuplicateClass::Inconsistent;
            }
        }
    }
    DuplicateClass::Consistent
}

fn values_agree(a: &Fact, b: &Fact, percentage_tolerance: f64) -> bool {
    if tolerance::compare(a.value, a.decimals, b.value, b.decimals).equal {
        return true;
    }
    let larger = a.value.abs().max(b.value.abs());
    if larger == 0.0 {
        return true;
    }
    (a.value - b.value).abs() / larger <= percentage_tolerance
}

/// Index of the finest-precision occurrence, the usable value for a
/// `Consistent` duplicate. Exact precision beats any finite one; among
/// finite precisions the larger digit count wins.
pub fn most_precise_index(occurrences: &[Fact]) -> usize {
    let mut best = 0;
    for (i, fact) in occurrences.iter().enumerate().skip(1) {
        if fact.decimals.is_finer_than(occurrences[best].decimals) {
            best = i;
        }
    }
    best
}
