//! Standalone consistency checks, independent of any calculation tree.
//!
//! Two reports over the whole fact set: contradictory duplicates within a
//! context, and the same concept reported for the same period with
//! different values across statements. The latter only fires beyond
//! tolerance; identical values across statements are ordinary
//! cross-referencing.

use std::collections::HashMap;

use crate::context::classifier;
use crate::grouping::{CrossRef, FactGroups};
use crate::period;
use crate::tolerance;
use crate::verify::report::{CheckKind, CheckStatus, Severity, VerificationCheck};

/// One critical finding per inconsistent duplicate.
pub fn duplicate_checks(groups: &FactGroups) -> Vec<VerificationCheck> {
    groups
        .inconsistent_duplicates()
        .into_iter()
        .map(|(context_id, concept, entry)| {
            let values: Vec<String> = entry
                .occurrences
                .iter()
                .map(|f| format!("{}", f.value))
                .collect();
            VerificationCheck::finding(
                CheckKind::DuplicateFacts,
                CheckStatus::Failed,
                Severity::Critical,
                concept,
            )
            .in_context(context_id)
            .with_message(format!(
                "concept reported {} times with contradictory values: {}",
                entry.occurrences.len(),
                values.join(", ")
            ))
        })
        .collect()
}

/// Warnings for concept+period pairs whose values diverge across contexts.
pub fn cross_statement_checks(groups: &FactGroups) -> Vec<VerificationCheck> {
    let mut checks = Vec::new();
    for (concept, occurrences) in groups.concept_index() {
        let mut by_period: HashMap<String, Vec<&CrossRef>> = HashMap::new();
        for occurrence in occurrences {
            if classifier::is_dimensional(&occurrence.context_id) {
                continue;
            }
            let key = period::extract(&occurrence.context_id).period_key;
            if key.is_empty() {
                continue;
            }
            by_period.entry(key).or_default().push(occurrence);
        }

        let mut periods: Vec<_> = by_period.into_iter().collect();
        periods.sort_by(|a, b| a.0.cmp(&b.0));
        for (period_key, refs) in periods {
            if let Some((a, b)) = first_divergent_pair(&refs) {
                checks.push(
                    VerificationCheck::finding(
                        CheckKind::CrossStatement,
                        CheckStatus::Failed,
                        Severity::Warning,
                        concept,
                    )
                    .in_context(&a.context_id)
                    .with_message(format!(
                        "period {period_key} reported as {} in {} but {} in {}",
                        a.value, a.context_id, b.value, b.context_id
                    )),
                );
            }
        }
    }
    checks.sort_by(|a, b| (a.concept.clone(), a.context_id.clone()).cmp(&(b.concept.clone(), b.context_id.clone())));
    checks
}

fn first_divergent_pair<'a>(refs: &[&'a CrossRef]) -> Option<(&'a CrossRef, &'a CrossRef)> {
    for (i, a) in refs.iter().enumerate() {
        for b in &refs[i + 1..] {
            if a.context_id == b.context_id {
                continue;
            }
            if !tolerance::compare(a.value, a.decimals, b.value, b.decimals).equal {
                return Some((a, b));
            }
        }
    }
    None
}
