//! Decides whether two contexts are compatible for fact substitution.
//!
//! Used exclusively by the dimensional fallback: when a calculation child
//! is missing from the parent's context, a fact from another context may
//! stand in only if this matcher accepts the pair.

use serde::{Deserialize, Serialize};

use crate::period::{self, PeriodInfo, PeriodKind};

/// Granularity of context comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchLevel {
    /// Identical context identifiers only (strict C-Equal).
    Strict,
    /// Same period: matching period keys or matching extracted dates.
    Period,
    /// Loosest: same year is enough.
    Year,
}

/// How a pair of contexts relates, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchClass {
    Exact,
    PeriodMatch,
    YearMatch,
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct ContextMatcher {
    level: MatchLevel,
}

impl Default for ContextMatcher {
    fn default() -> Self {
        Self::new(MatchLevel::Period)
    }
}

impl ContextMatcher {
    pub fn new(level: MatchLevel) -> Self {
        Self { level }
    }

    /// True if `candidate` may stand in for a fact expected in `reference`.
    ///
    /// Identical identifiers are always compatible. `strict` forces exact
    /// matching regardless of the configured level.
    pub fn are_compatible(&self, reference: &str, candidate: &str, strict: bool) -> bool {
        if reference.is_empty() || candidate.is_empty() {
            return false;
        }
        if reference == candidate {
            return true;
        }
        if strict || self.level == MatchLevel::Strict {
            return false;
        }
        self.periods_match(&period::extract(reference), &period::extract(candidate))
    }

    /// Compares two already-extracted periods under the configured level.
    pub fn periods_match(&self, a: &PeriodInfo, b: &PeriodInfo) -> bool {
        // Exact normalized key is a match at any non-strict level.
        if !a.period_key.is_empty() && a.period_key == b.period_key {
            return true;
        }

        if a.kind != PeriodKind::Unknown && b.kind != PeriodKind::Unknown {
            if a.kind != b.kind {
                // Duration vs instant can never be compared.
                return false;
            }
            if a.start == b.start && a.end == b.end && a.end.is_some() {
                return true;
            }
        }

        if self.level == MatchLevel::Year {
            if let (Some(ya), Some(yb)) = (&a.year, &b.year) {
                return ya == yb;
            }
        }

        false
    }
}

/// Classifies how two context identifiers relate: identical, same period,
/// same year only, or unrelated.
pub fn classify_match(a: &str, b: &str) -> MatchClass {
    if a == b {
        return MatchClass::Exact;
    }
    let pa = period::extract(a);
    let pb = period::extract(b);

    if !pa.period_key.is_empty() && pa.period_key == pb.period_key {
        return MatchClass::PeriodMatch;
    }
    if pa.end.is_some() && pa.start == pb.start && pa.end == pb.end {
        return MatchClass::PeriodMatch;
    }
    if let (Some(ya), Some(yb)) = (&pa.year, &pb.year) {
        if ya == yb {
            return MatchClass::YearMatch;
        }
    }
    MatchClass::None
}
