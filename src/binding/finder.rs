//! Cross-context search for missing calculation children.
//!
//! When a child concept is absent from the parent's context it may still
//! exist elsewhere in the filing, reported against a context that encodes
//! the same period with a different identifier. The finder locates such a
//! substitute, refusing dimensionally-qualified candidates so a segment
//! slice never stands in for a consolidated figure.

use crate::context::{classifier, ContextMatcher};
use crate::grouping::{CrossRef, FactGroups};

#[derive(Debug, Clone, Copy, Default)]
pub struct FactFinder {
    matcher: ContextMatcher,
}

impl FactFinder {
    pub fn new(matcher: ContextMatcher) -> Self {
        Self { matcher }
    }

    /// Finds a substitute occurrence of `concept` compatible with
    /// `reference_context` and carrying a unit matching `unit`.
    pub fn find_substitute<'a>(
        &self,
        groups: &'a FactGroups,
        concept: &str,
        reference_context: &str,
        unit: Option<&str>,
    ) -> Option<&'a CrossRef> {
        groups.occurrences_of(concept).iter().find(|candidate| {
            candidate.context_id != reference_context
                && classifier::is_default(&candidate.context_id)
                && units_compatible(unit, candidate.unit.as_deref())
                && self
                    .matcher
                    .are_compatible(reference_context, &candidate.context_id, false)
        })
    }
}

/// An absent unit is treated as a wildcard; two present units must agree.
pub fn units_compatible(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DUPLICATE_PERCENTAGE_TOLERANCE as PCT;
    use crate::fact::Fact;
    use crate::grouping::group_facts;

    const REF: &str = "Duration_1_1_2024_To_12_31_2024_hashA";

    fn fact(concept: &str, value: f64, ctx: &str, unit: &str) -> Fact {
        Fact::new(concept, value, ctx).with_unit(unit).with_decimals(-3)
    }

    #[test]
    fn finds_same_period_occurrence_in_other_context() {
        let groups = group_facts(
            &[fact("Revenue", 100.0, "Duration_1_1_2024_To_12_31_2024", "USD")],
            PCT,
        );
        let finder = FactFinder::default();
        let found = finder.find_substitute(&groups, "Revenue", REF, Some("USD"));
        assert_eq!(found.map(|r| r.value), Some(100.0));
    }

    #[test]
    fn rejects_dimensional_candidates() {
        let ctx = "Duration_1_1_2024_To_12_31_2024_ProductAxis_WidgetMember";
        let groups = group_facts(&[fact("Revenue", 100.0, ctx, "USD")], PCT);
        let finder = FactFinder::default();
        assert!(finder.find_substitute(&groups, "Revenue", REF, Some("USD")).is_none());
    }

    #[test]
    fn rejects_unit_and_period_mismatches() {
        let groups = group_facts(
            &[
                fact("Revenue", 100.0, "Duration_1_1_2024_To_12_31_2024", "EUR"),
                fact("Revenue", 90.0, "Duration_1_1_2023_To_12_31_2023", "USD"),
            ],
            PCT,
        );
        let finder = FactFinder::default();
        assert!(finder.find_substitute(&groups, "Revenue", REF, Some("USD")).is_none());
    }

    #[test]
    fn unit_wildcard_when_absent() {
        assert!(units_compatible(None, Some("USD")));
        assert!(units_compatible(Some("usd"), Some("USD")));
        assert!(!units_compatible(Some("USD"), Some("EUR")));
    }
}
