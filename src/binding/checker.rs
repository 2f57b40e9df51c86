//! Binding: the precondition check for evaluating a calculation.
//!
//! A declared relationship only becomes verifiable in a context once the
//! parent and enough children are present there with usable, unit-compatible
//! values. The checker runs a fixed rule sequence and reports exactly one
//! outcome; the six skip statuses are terminal and mutually exclusive.

use serde::{Deserialize, Serialize};

use crate::binding::finder::{units_compatible, FactFinder};
use crate::config::VerifyConfig;
use crate::context::{classifier, ContextMatcher};
use crate::grouping::{ContextGroup, DuplicateClass, FactGroups};
use crate::tolerance::Decimals;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingStatus {
    Binds,
    SkipNoParent,
    SkipInconsistentParent,
    SkipInconsistentChild,
    SkipUnitMismatch,
    SkipNoChildren,
    SkipIncomplete,
}

impl BindingStatus {
    pub fn binds(self) -> bool {
        self == BindingStatus::Binds
    }

    pub fn describe(self) -> &'static str {
        match self {
            BindingStatus::Binds => "binds",
            BindingStatus::SkipNoParent => "parent concept not reported in this context",
            BindingStatus::SkipInconsistentParent => "parent has inconsistent duplicate values",
            BindingStatus::SkipInconsistentChild => "a child has inconsistent duplicate values",
            BindingStatus::SkipUnitMismatch => "child unit incompatible with parent unit",
            BindingStatus::SkipNoChildren => "no declared children reported in this context",
            BindingStatus::SkipIncomplete => "too few children found to verify",
        }
    }
}

/// One child located for a binding attempt. `via_fallback` marks values
/// substituted from a different context than the parent's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoundChild {
    pub concept: String,
    pub value: f64,
    pub weight: f64,
    pub unit: Option<String>,
    pub decimals: Decimals,
    pub context_id: String,
    pub via_fallback: bool,
}

/// Outcome of one (relationship, context) binding attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingResult {
    pub status: BindingStatus,
    pub context_id: String,
    pub parent_value: Option<f64>,
    pub parent_unit: Option<String>,
    pub parent_decimals: Decimals,
    pub found: Vec<FoundChild>,
    pub missing: Vec<String>,
    pub completeness: f64,
    /// The concept that triggered an inconsistency or unit skip.
    pub offending_concept: Option<String>,
}

impl BindingResult {
    fn skip(status: BindingStatus, context_id: &str) -> Self {
        Self {
            status,
            context_id: context_id.to_string(),
            parent_value: None,
            parent_unit: None,
            parent_decimals: Decimals::Exact,
            found: Vec::new(),
            missing: Vec::new(),
            completeness: 0.0,
            offending_concept: None,
        }
    }

    pub fn binds(&self) -> bool {
        self.status.binds()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BindingChecker {
    matcher: ContextMatcher,
    completeness_threshold: f64,
    allow_fallback: bool,
}

impl BindingChecker {
    pub fn new(config: &VerifyConfig) -> Self {
        Self {
            matcher: ContextMatcher::new(config.match_level),
            completeness_threshold: config.completeness_threshold,
            allow_fallback: config.allow_dimensional_fallback,
        }
    }

    /// Strict, single-context binding. Rules run in a fixed order; the
    /// first violated rule decides the status.
    pub fn check_binding(
        &self,
        group: &ContextGroup,
        parent: &str,
        children: &[(String, f64)],
    ) -> BindingResult {
        let context_id = group.context_id.as_str();

        let Some(parent_entry) = group.get(parent) else {
            return BindingResult::skip(BindingStatus::SkipNoParent, context_id);
        };
        if parent_entry.classification == DuplicateClass::Inconsistent {
            let mut result = BindingResult::skip(BindingStatus::SkipInconsistentParent, context_id);
            result.offending_concept = Some(parent.to_string());
            return result;
        }
        let Some(parent_fact) = parent_entry.usable() else {
            return BindingResult::skip(BindingStatus::SkipNoParent, context_id);
        };

        let mut found = Vec::new();
        let mut missing = Vec::new();
        for (child, weight) in children {
            let Some(entry) = group.get(child) else {
                missing.push(child.clone());
                continue;
            };
            if entry.classification == DuplicateClass::Inconsistent {
                // One inconsistent child invalidates the whole attempt.
                let mut result =
                    BindingResult::skip(BindingStatus::SkipInconsistentChild, context_id);
                result.offending_concept = Some(child.clone());
                return result;
            }
            let Some(fact) = entry.usable() else {
                missing.push(child.clone());
                continue;
            };
            if !units_compatible(parent_fact.unit.as_deref(), fact.unit.as_deref()) {
                let mut result = BindingResult::skip(BindingStatus::SkipUnitMismatch, context_id);
                result.offending_concept = Some(child.clone());
                return result;
            }
            found.push(FoundChild {
                concept: child.clone(),
                value: fact.value,
                weight: *weight,
                unit: fact.unit.clone(),
                decimals: fact.decimals,
                context_id: context_id.to_string(),
                via_fallback: false,
            });
        }

        self.finalize(
            context_id,
            parent_fact.value,
            parent_fact.unit.clone(),
            parent_fact.decimals,
            found,
            missing,
            children.len(),
        )
    }

    /// Binding with cross-context substitution for missing children.
    ///
    /// Never attempted when the parent's context is dimensional: blending a
    /// segment total with consolidated children is not meaningful, so the
    /// strict outcome stands.
    pub fn check_binding_with_fallback(
        &self,
        group: &ContextGroup,
        parent: &str,
        children: &[(String, f64)],
        groups: &FactGroups,
    ) -> BindingResult {
        let strict = self.check_binding(group, parent, children);
        if !self.allow_fallback
            || strict.missing.is_empty()
            || classifier::is_dimensional(&group.context_id)
        {
            return strict;
        }
        // Substitution only helps when children are missing; that includes
        // a binding that already clears the completeness gate, where an
        // unfilled child would leave the sum short. The remaining skip
        // reasons are unconditional.
        if !matches!(
            strict.status,
            BindingStatus::Binds | BindingStatus::SkipNoChildren | BindingStatus::SkipIncomplete
        ) {
            return strict;
        }

        let finder = FactFinder::new(self.matcher);
        let mut found = strict.found.clone();
        let mut still_missing = Vec::new();
        for concept in &strict.missing {
            let weight = children
                .iter()
                .find(|(name, _)| name == concept)
                .map(|(_, w)| *w)
                .unwrap_or(1.0);
            match finder.find_substitute(
                groups,
                concept,
                &group.context_id,
                strict.parent_unit.as_deref(),
            ) {
                Some(substitute) => found.push(FoundChild {
                    concept: concept.clone(),
                    value: substitute.value,
                    weight,
                    unit: substitute.unit.clone(),
                    decimals: substitute.decimals,
                    context_id: substitute.context_id.clone(),
                    via_fallback: true,
                }),
                None => still_missing.push(concept.clone()),
            }
        }

        if found.len() == strict.found.len() {
            // Nothing substituted: keep the strict outcome untouched.
            return strict;
        }

        let parent_value = match strict.parent_value {
            Some(v) => v,
            None => return strict,
        };
        self.finalize(
            &group.context_id,
            parent_value,
            strict.parent_unit.clone(),
            strict.parent_decimals,
            found,
            still_missing,
            children.len(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn finalize(
        &self,
        context_id: &str,
        parent_value: f64,
        parent_unit: Option<String>,
        parent_decimals: Decimals,
        found: Vec<FoundChild>,
        missing: Vec<String>,
        declared: usize,
    ) -> BindingResult {
        let completeness = if declared == 0 {
            0.0
        } else {
            found.len() as f64 / declared as f64
        };
        let status = if found.is_empty() {
            BindingStatus::SkipNoChildren
        } else if completeness < self.completeness_threshold {
            BindingStatus::SkipIncomplete
        } else {
            BindingStatus::Binds
        };
        BindingResult {
            status,
            context_id: context_id.to_string(),
            parent_value: Some(parent_value),
            parent_unit,
            parent_decimals,
            found,
            missing,
            completeness,
            offending_concept: None,
        }
    }
}
