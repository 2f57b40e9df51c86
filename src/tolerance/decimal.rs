//! Implements the XBRL rounding rules for comparing reported values.
//!
//! Two facts published at different precisions must be compared at the
//! lesser of the two: both values are rounded ("round half to even", the
//! banker's rounding the XBRL rules mandate) at the coarser
//! decimals attribute, and are equal iff the rounded forms agree within a
//! small epsilon. Canonical example: 532,000,000 at decimals -6 equals
//! 532,300,000 at decimals -5, because both round to 532 million at -6.

use serde::{Deserialize, Serialize};

/// Epsilon used when neither operand carries a finite precision.
pub const EPSILON_BASE: f64 = 0.5;

/// Scale factor for the epsilon at a finite precision:
/// `epsilon = 10^-d * EPSILON_MULTIPLIER` for `d >= 0`, else `EPSILON_BASE`.
pub const EPSILON_MULTIPLIER: f64 = 0.5;

/// The reported precision of a fact's value.
///
/// Positive digits are places after the decimal point; negative digits
/// round to a power of ten (`-6` = nearest million). `Exact` is the
/// sentinel for `decimals="INF"` (and for unspecified precision, which is
/// treated the same way): the value is taken as published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decimals {
    #[default]
    Exact,
    Digits(i32),
}

impl Decimals {
    /// Total precision ordering: `Exact` is finer than any finite value,
    /// and a larger digit count is finer (`2` beats `-3`).
    pub fn is_finer_than(self, other: Decimals) -> bool {
        match (self, other) {
            (Decimals::Exact, Decimals::Exact) => false,
            (Decimals::Exact, Decimals::Digits(_)) => true,
            (Decimals::Digits(_), Decimals::Exact) => false,
            (Decimals::Digits(a), Decimals::Digits(b)) => a > b,
        }
    }

    pub fn digits(self) -> Option<i32> {
        match self {
            Decimals::Exact => None,
            Decimals::Digits(d) => Some(d),
        }
    }
}

/// Outcome of a precision-aware comparison, with the intermediate values
/// retained for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceResult {
    pub equal: bool,
    pub rounded1: f64,
    pub rounded2: f64,
    /// The decimals both values were rounded at; `None` when both operands
    /// were exact.
    pub comparison_decimals: Option<i32>,
    /// Absolute difference of the rounded forms.
    pub difference: f64,
}

/// Precision to compare at: the coarser (numerically smaller) of the two.
/// An exact operand defers to the other's precision.
pub fn comparison_decimals(d1: Decimals, d2: Decimals) -> Option<i32> {
    match (d1.digits(), d2.digits()) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Rounds a value at the given decimals attribute using round half to even.
/// `None` means exact: the value is returned unchanged.
pub fn round_to_decimals(value: f64, decimals: Option<i32>) -> f64 {
    let Some(d) = decimals else {
        return value;
    };
    let scale = 10f64.powi(d);
    round_half_even(value * scale) / scale
}

/// Compares two values respecting their reported precisions. Total: always
/// returns a result for finite numeric inputs.
pub fn compare(v1: f64, d1: Decimals, v2: f64, d2: Decimals) -> ToleranceResult {
    let cmp_decimals = comparison_decimals(d1, d2);
    let rounded1 = round_to_decimals(v1, cmp_decimals);
    let rounded2 = round_to_decimals(v2, cmp_decimals);
    let difference = (rounded1 - rounded2).abs();

    let epsilon = match cmp_decimals {
        None => EPSILON_BASE,
        Some(d) if d >= 0 => 10f64.powi(-d) * EPSILON_MULTIPLIER,
        Some(_) => EPSILON_BASE,
    };

    ToleranceResult {
        equal: difference <= epsilon,
        rounded1,
        rounded2,
        comparison_decimals: cmp_decimals,
        difference,
    }
}

/// Round half to even at the integer boundary. `f64::round` rounds halves
/// away from zero, which the XBRL rules forbid.
fn round_half_even(x: f64) -> f64 {
    let floor = x.floor();
    let frac = x - floor;
    if frac > 0.5 {
        floor + 1.0
    } else if frac < 0.5 {
        floor
    } else if floor.rem_euclid(2.0) == 0.0 {
        floor
    } else {
        floor + 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.5, 0.0)] // half rounds to even, not away from zero
    #[case(1.5, 2.0)]
    #[case(2.5, 2.0)]
    #[case(-0.5, 0.0)]
    #[case(-1.5, -2.0)]
    #[case(0.6, 1.0)]
    #[case(-0.6, -1.0)]
    fn bankers_rounding(#[case] input: f64, #[case] expected: f64) {
        assert_eq!(round_half_even(input), expected);
    }

    #[rstest]
    #[case(1234.567, Some(2), 1234.57)]
    #[case(1234.567, Some(0), 1235.0)]
    #[case(1_234_567.0, Some(-3), 1_235_000.0)]
    #[case(532_300_000.0, Some(-6), 532_000_000.0)]
    #[case(1234.567, None, 1234.567)]
    fn rounds_at_decimals(#[case] value: f64, #[case] decimals: Option<i32>, #[case] expected: f64) {
        assert!((round_to_decimals(value, decimals) - expected).abs() < 1e-6);
    }

    #[test]
    fn compares_at_the_coarser_precision() {
        // Both round to 532,000,000 at decimals -6.
        let result = compare(
            532_000_000.0,
            Decimals::Digits(-6),
            532_300_000.0,
            Decimals::Digits(-5),
        );
        assert!(result.equal);
        assert_eq!(result.comparison_decimals, Some(-6));
        assert_eq!(result.difference, 0.0);
    }

    #[test]
    fn differing_beyond_tolerance_is_unequal() {
        let result = compare(
            532_000_000.0,
            Decimals::Digits(-6),
            533_600_000.0,
            Decimals::Digits(-5),
        );
        assert!(!result.equal);
        assert!(result.difference >= 1_000_000.0);
    }

    #[test]
    fn exact_sentinel_defers_to_the_other_operand() {
        let result = compare(1_000_000.4, Decimals::Exact, 1_000_000.0, Decimals::Digits(0));
        assert!(result.equal);
        assert_eq!(result.comparison_decimals, Some(0));
    }

    #[test]
    fn both_exact_uses_minimal_epsilon() {
        assert!(compare(100.0, Decimals::Exact, 100.4, Decimals::Exact).equal);
        assert!(!compare(100.0, Decimals::Exact, 101.0, Decimals::Exact).equal);
    }

    #[rstest]
    #[case(Decimals::Exact, Decimals::Digits(2), true)]
    #[case(Decimals::Digits(2), Decimals::Exact, false)]
    #[case(Decimals::Digits(2), Decimals::Digits(-3), true)]
    #[case(Decimals::Digits(-6), Decimals::Digits(-3), false)]
    #[case(Decimals::Exact, Decimals::Exact, false)]
    fn precision_ordering(#[case] a: Decimals, #[case] b: Decimals, #[case] finer: bool) {
        assert_eq!(a.is_finer_than(b), finer);
    }
}
