//! Groups a filing's facts by context (the C-Equal partition).
//!
//! Facts are only comparable in a calculation when they share a context,
//! so every downstream component works through these groups. Concepts are
//! keyed by their normalized local name; lookups accept either the raw
//! qualified name or the local form.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::fact::Fact;
use crate::grouping::duplicates::{self, DuplicateClass};
use crate::naming;

/// Every occurrence of one concept in one context, with its duplicate
/// classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptFacts {
    pub occurrences: Vec<Fact>,
    pub classification: DuplicateClass,
}

impl ConceptFacts {
    /// The fact a calculation may use, or `None` when the occurrences are
    /// inconsistent. For consistent duplicates this is the finest-precision
    /// occurrence.
    pub fn usable(&self) -> Option<&Fact> {
        match self.classification {
            DuplicateClass::Inconsistent => None,
            DuplicateClass::Consistent => {
                Some(&self.occurrences[duplicates::most_precise_index(&self.occurrences)])
            }
            _ => self.occurrences.first(),
        }
    }
}

/// All facts sharing one context identifier, indexed by normalized concept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextGroup {
    pub context_id: String,
    concepts: HashMap<String, ConceptFacts>,
}

impl ContextGroup {
    pub fn get(&self, concept: &str) -> Option<&ConceptFacts> {
        self.concepts.get(&naming::normalize(concept))
    }

    pub fn contains(&self, concept: &str) -> bool {
        self.get(concept).is_some()
    }

    pub fn concepts(&self) -> impl Iterator<Item = (&String, &ConceptFacts)> {
        self.concepts.iter()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

/// One cross-context occurrence of a concept, the candidate pool for the
/// dimensional fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossRef {
    pub context_id: String,
    pub value: f64,
    pub unit: Option<String>,
    pub decimals: crate::tolerance::Decimals,
}

/// The grouped view of a filing's facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactGroups {
    groups: HashMap<String, ContextGroup>,
    by_concept: HashMap<String, Vec<CrossRef>>,
}

/// Partitions facts by context and classifies duplicates within each
/// partition. Abstract facts carry no values and are dropped here.
pub fn group_facts(facts: &[Fact], percentage_tolerance: f64) -> FactGroups {
    let mut groups: HashMap<String, ContextGroup> = HashMap::new();
    for fact in facts {
        if fact.is_abstract || fact.context_id.is_empty() {
            continue;
        }
        let group = groups
            .entry(fact.context_id.clone())
            .or_insert_with(|| ContextGroup {
                context_id: fact.context_id.clone(),
                concepts: HashMap::new(),
            });
        group
            .concepts
            .entry(naming::normalize(&fact.concept))
            .or_insert_with(|| ConceptFacts {
                occurrences: Vec::new(),
                classification: DuplicateClass::Unique,
            })
            .occurrences
            .push(fact.clone());
    }

    let mut by_concept: HashMap<String, Vec<CrossRef>> = HashMap::new();
    for group in groups.values_mut() {
        for (concept, entry) in group.concepts.iter_mut() {
            entry.classification =
                duplicates::classify_occurrences(&entry.occurrences, percentage_tolerance);
            if let Some(fact) = entry.usable() {
                by_concept.entry(concept.clone()).or_default().push(CrossRef {
                    context_id: fact.context_id.clone(),
                    value: fact.value,
                    unit: fact.unit.clone(),
                    decimals: fact.decimals,
                });
            }
        }
    }

    FactGroups { groups, by_concept }
}

impl FactGroups {
    pub fn get(&self, context_id: &str) -> Option<&ContextGroup> {
        self.groups.get(context_id)
    }

    pub fn contexts(&self) -> impl Iterator<Item = &ContextGroup> {
        self.groups.values()
    }

    /// Context identifiers in which the concept was reported, regardless
    /// of duplicate classification. An inconsistent occurrence still marks
    /// its context; the binding checker is the one to reject it.
    pub fn contexts_with_concept(&self, concept: &str) -> Vec<&str> {
        let mut contexts: Vec<&str> = self
            .groups
            .values()
            .filter(|group| group.contains(concept))
            .map(|group| group.context_id.as_str())
            .collect();
        contexts.sort_unstable();
        contexts
    }

    pub fn context_count(&self) -> usize {
        self.groups.len()
    }

    /// Total fact occurrences across all groups, duplicates included.
    pub fn total_facts(&self) -> usize {
        self.groups
            .values()
            .flat_map(|group| group.concepts.values())
            .map(|entry| entry.occurrences.len())
            .sum()
    }

    /// Iterates the whole cross-context index: normalized concept paired
    /// with every usable occurrence across contexts.
    pub fn concept_index(&self) -> impl Iterator<Item = (&str, &[CrossRef])> {
        self.by_concept
            .iter()
            .map(|(concept, refs)| (concept.as_str(), refs.as_slice()))
    }

    /// Cross-context occurrences of a concept, for fallback substitution.
    pub fn occurrences_of(&self, concept: &str) -> &[CrossRef] {
        self.by_concept
            .get(&naming::normalize(concept))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every (context, concept) pair whose occurrences contradict each
    /// other, for standalone reporting.
    pub fn inconsistent_duplicates(&self) -> Vec<(&str, &str, &ConceptFacts)> {
        let mut found = Vec::new();
        for group in self.groups.values() {
            for (concept, entry) in &group.concepts {
                if entry.classification == DuplicateClass::Inconsistent {
                    found.push((group.context_id.as_str(), concept.as_str(), entry));
                }
            }
        }
        found.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_DUPLICATE_PERCENTAGE_TOLERANCE as PCT;

    fn fact(concept: &str, value: f64, ctx: &str, decimals: i32) -> Fact {
        Fact::new(concept, value, ctx).with_unit("USD").with_decimals(decimals)
    }

    #[test]
    fn partitions_by_context_and_strips_namespaces() {
        let facts = vec![
            fact("us-gaap:Assets", 1_000_000.0, "c1", -3),
            fact("us-gaap:Liabilities", 600_000.0, "c1", -3),
            fact("us-gaap:Assets", 900_000.0, "c2", -3),
        ];
        let groups = group_facts(&facts, PCT);

        let c1 = groups.get("c1").unwrap();
        assert_eq!(c1.len(), 2);
        assert!(c1.contains("Assets"));
        assert!(c1.contains("us-gaap:Assets"));
        assert_eq!(groups.contexts_with_concept("Assets").len(), 2);
    }

    #[test]
    fn abstract_facts_are_dropped() {
        let mut abstract_fact = fact("us-gaap:AssetsAbstract", 0.0, "c1", 0);
        abstract_fact.is_abstract = true;
        let groups = group_facts(&[abstract_fact], PCT);
        assert!(groups.get("c1").is_none());
    }

    #[test]
    fn consistent_duplicate_uses_finest_precision() {
        let facts = vec![
            fact("us-gaap:Revenue", 532_000_000.0, "c1", -6),
            fact("us-gaap:Revenue", 532_300_000.0, "c1", -5),
        ];
        let groups = group_facts(&facts, PCT);
        let entry = groups.get("c1").unwrap().get("Revenue").unwrap();
        assert_eq!(entry.classification, DuplicateClass::Consistent);
        assert_eq!(entry.usable().unwrap().value, 532_300_000.0);
    }

    #[test]
    fn counts_contexts_and_occurrences() {
        let facts = vec![
            fact("us-gaap:Assets", 1_000_000.0, "c1", -3),
            fact("us-gaap:Assets", 1_000_000.0, "c1", -3),
            fact("us-gaap:Liabilities", 600_000.0, "c2", -3),
        ];
        let groups = group_facts(&facts, PCT);
        assert_eq!(groups.context_count(), 2);
        assert_eq!(groups.total_facts(), 3);
    }

    #[test]
    fn inconsistent_occurrences_still_mark_their_context() {
        let facts = vec![
            fact("us-gaap:Revenue", 500.0, "c1", 0),
            fact("us-gaap:Revenue", 900.0, "c1", 0),
            fact("us-gaap:Revenue", 500.0, "c2", 0),
        ];
        let groups = group_facts(&facts, PCT);
        assert_eq!(groups.contexts_with_concept("Revenue"), vec!["c1", "c2"]);
    }

    #[test]
    fn inconsistent_duplicate_has_no_usable_value() {
        let facts = vec![
            fact("us-gaap:Revenue", 500.0, "c1", 0),
            fact("us-gaap:Revenue", 900.0, "c1", 0),
        ];
        let groups = group_facts(&facts, PCT);
        let entry = groups.get("c1").unwrap().get("Revenue").unwrap();
        assert_eq!(entry.classification, DuplicateClass::Inconsistent);
        assert!(entry.usable().is_none());
        assert_eq!(groups.inconsistent_duplicates().len(), 1);
        // unusable values never enter the cross-context index
        assert!(groups.occurrences_of("Revenue").is_empty());
    }
}
