//! Labels a context as dimensional or default.
//!
//! Dimensional contexts carry axis/member qualifiers in their identifier,
//! meaning the fact is a dimensional slice (a segment, a class of stock)
//! rather than the consolidated total. Detection is structural, on the
//! identifier string, and makes no claim about what the axis means.

/// Substrings (case-insensitive) that mark a dimensionally-qualified
/// context identifier.
const DIMENSIONAL_INDICATORS: [&str; 2] = ["axis", "member"];

/// True if the identifier carries axis/member qualifiers beyond a bare
/// period encoding.
pub fn is_dimensional(context_id: &str) -> bool {
    if context_id.is_empty() {
        return false;
    }
    let lower = context_id.to_lowercase();
    DIMENSIONAL_INDICATORS.iter().any(|ind| lower.contains(ind))
}

/// True for default (non-dimensional) contexts.
pub fn is_default(context_id: &str) -> bool {
    !is_dimensional(context_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Duration_1_1_2024_To_12_31_2024_ClassOfStockAxis_CommonClassAMember", true)]
    #[case("Instant_12_31_2024_StatementEquityComponentsAxis", true)]
    #[case("Duration_1_1_2024_To_12_31_2024", false)]
    #[case("c-4", false)]
    #[case("", false)]
    fn classifies_by_structural_indicators(#[case] context_id: &str, #[case] dimensional: bool) {
        assert_eq!(is_dimensional(context_id), dimensional);
        assert_eq!(is_default(context_id), !dimensional);
    }
}
