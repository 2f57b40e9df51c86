//! Calculation trees and the registry that holds them.
//!
//! Trees arrive as flat (parent, child, weight, order, role) tuples parsed
//! from a calculation linkbase by an upstream collaborator. The registry
//! assembles them per source (the filer's own linkbase versus the standard
//! taxonomy), keyed by normalized parent and role, and can diff a concept's
//! company tree against its taxonomy tree for informational reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::naming;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalcSource {
    Company,
    Taxonomy,
}

impl CalcSource {
    pub fn as_str(self) -> &'static str {
        match self {
            CalcSource::Company => "company",
            CalcSource::Taxonomy => "taxonomy",
        }
    }
}

/// One raw linkbase arc, as supplied by the upstream parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRelation {
    pub parent: String,
    pub child: String,
    pub weight: f64,
    pub order: f64,
    pub role: String,
    pub source: CalcSource,
}

/// One parent concept with its ordered, weighted children, scoped to a
/// statement role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationTree {
    pub parent: String,
    /// (child concept, weight), in declared order. Most trees have a
    /// handful of children.
    pub children: SmallVec<[(String, f64); 8]>,
    pub role: String,
    pub source: CalcSource,
}

impl CalculationTree {
    pub fn weight_of(&self, child: &str) -> Option<f64> {
        let key = naming::normalize(child);
        self.children
            .iter()
            .find(|(name, _)| naming::normalize(name) == key)
            .map(|(_, w)| *w)
    }
}

/// Diff of one concept's trees across the two sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaComparison {
    pub concept: String,
    pub company_only: Vec<String>,
    pub taxonomy_only: Vec<String>,
    /// (child, company weight, taxonomy weight) where the two disagree.
    pub weight_differences: Vec<(String, f64, f64)>,
}

impl FormulaComparison {
    pub fn agrees(&self) -> bool {
        self.company_only.is_empty()
            && self.taxonomy_only.is_empty()
            && self.weight_differences.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySummary {
    pub company_trees: usize,
    pub taxonomy_trees: usize,
    pub parents_in_both: usize,
}

/// Holds every calculation tree for one verification run. Populated once,
/// read-only thereafter.
#[derive(Debug, Clone, Default)]
pub struct FormulaRegistry {
    // keyed by (normalized parent, role) for deterministic iteration
    company: BTreeMap<(String, String), CalculationTree>,
    taxonomy: BTreeMap<(String, String), CalculationTree>,
}

impl FormulaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads raw arcs, dispatching each to its source's table. Children
    /// are ordered by the arc's `order` attribute within each tree.
    pub fn load_relations(&mut self, relations: &[CalculationRelation]) {
        let mut staged: BTreeMap<(CalcSource, String, String), Vec<&CalculationRelation>> =
            BTreeMap::new();
        for rel in relations {
            staged
                .entry((rel.source, naming::normalize(&rel.parent), rel.role.clone()))
                .or_default()
                .push(rel);
        }
        for ((source, parent_key, role), mut arcs) in staged {
            arcs.sort_by(|a, b| a.order.total_cmp(&b.order));
            let tree = CalculationTree {
                parent: arcs[0].parent.clone(),
                children: arcs
                    .iter()
                    .map(|rel| (rel.child.clone(), rel.weight))
                    .collect(),
                role,
                source,
            };
            self.table_mut(source).insert((parent_key, tree.role.clone()), tree);
        }
    }

    fn table_mut(&mut self, source: CalcSource) -> &mut BTreeMap<(String, String), CalculationTree> {
        match source {
            CalcSource::Company => &mut self.company,
            CalcSource::Taxonomy => &mut self.taxonomy,
        }
    }

    fn table(&self, source: CalcSource) -> &BTreeMap<(String, String), CalculationTree> {
        match source {
            CalcSource::Company => &self.company,
            CalcSource::Taxonomy => &self.taxonomy,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.company.is_empty() && self.taxonomy.is_empty()
    }

    pub fn trees(&self, source: CalcSource) -> impl Iterator<Item = &CalculationTree> {
        self.table(source).values()
    }

    /// All trees for one parent concept in one source, across roles.
    pub fn trees_for_parent(&self, source: CalcSource, concept: &str) -> Vec<&CalculationTree> {
        let key = naming::normalize(concept);
        self.table(source)
            .iter()
            .filter(|((parent, _), _)| *parent == key)
            .map(|(_, tree)| tree)
            .collect()
    }

    /// Diffs a concept's company tree against its taxonomy tree. `None`
    /// when the concept is missing from either source.
    pub fn compare_sources(&self, concept: &str) -> Option<FormulaComparison> {
        let company = self.trees_for_parent(CalcSource::Company, concept);
        let taxonomy = self.trees_for_parent(CalcSource::Taxonomy, concept);
        let (company, taxonomy) = (company.first()?, taxonomy.first()?);

        let mut company_only = Vec::new();
        let mut weight_differences = Vec::new();
        for (child, weight) in &company.children {
            match taxonomy.weight_of(child) {
                None => company_only.push(child.clone()),
                Some(tw) if tw != *weight => {
                    weight_differences.push((child.clone(), *weight, tw));
                }
                Some(_) => {}
            }
        }
        let taxonomy_only = taxonomy
            .children
            .iter()
            .filter(|(child, _)| company.weight_of(child).is_none())
            .map(|(child, _)| child.clone())
            .collect();

        Some(FormulaComparison {
            concept: company.parent.clone(),
            company_only,
            taxonomy_only,
            weight_differences,
        })
    }

    /// Comparisons for every parent present in both sources.
    pub fn compare_all(&self) -> Vec<FormulaComparison> {
        let mut seen = Vec::new();
        let mut out = Vec::new();
        for (parent_key, _) in self.company.keys() {
            if seen.contains(parent_key) {
                continue;
            }
            seen.push(parent_key.clone());
            if let Some(cmp) = self.compare_sources(parent_key) {
                out.push(cmp);
            }
        }
        out
    }

    /// The subset of comparisons where the sources disagree.
    pub fn mismatches(&self) -> Vec<FormulaComparison> {
        self.compare_all().into_iter().filter(|c| !c.agrees()).collect()
    }

    pub fn summary(&self) -> RegistrySummary {
        RegistrySummary {
            company_trees: self.company.len(),
            taxonomy_trees: self.taxonomy.len(),
            parents_in_both: self.compare_all().len(),
        }
    }
}
