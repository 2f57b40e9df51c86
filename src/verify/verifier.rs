//! Evaluates calculation trees against grouped facts.
//!
//! Per tree and per context where the parent is reported: bind, apply sign
//! corrections and weights, sum the children, compare to the parent under
//! decimal tolerance, and assign a severity. Skips are carried through as
//! checks so the summary can account for them; they are never scored as
//! failures.

use tracing::debug;

use crate::binding::{BindingChecker, BindingResult};
use crate::config::VerifyConfig;
use crate::grouping::FactGroups;
use crate::registry::{CalcSource, CalculationTree, FormulaRegistry};
use crate::sign::SignLookup;
use crate::tolerance::{self, Decimals};
use crate::verify::report::{CheckKind, CheckStatus, Severity, VerificationCheck};

pub struct CalculationVerifier<'a> {
    config: &'a VerifyConfig,
    groups: &'a FactGroups,
    signs: &'a SignLookup,
    checker: BindingChecker,
}

impl<'a> CalculationVerifier<'a> {
    pub fn new(config: &'a VerifyConfig, groups: &'a FactGroups, signs: &'a SignLookup) -> Self {
        Self {
            config,
            groups,
            signs,
            checker: BindingChecker::new(config),
        }
    }

    /// Runs every tree in the registry, both sources, plus the dual-source
    /// findings for concepts present in both.
    pub fn verify_all(&self, registry: &FormulaRegistry) -> Vec<VerificationCheck> {
        let mut checks = Vec::new();
        for source in [CalcSource::Company, CalcSource::Taxonomy] {
            for tree in registry.trees(source) {
                checks.extend(self.verify_tree(tree));
            }
        }
        let dual = self.dual_findings(registry, &checks);
        checks.extend(dual);
        checks
    }

    /// Evaluates one tree in every context where its parent is reported.
    pub fn verify_tree(&self, tree: &CalculationTree) -> Vec<VerificationCheck> {
        let mut contexts = self.groups.contexts_with_concept(&tree.parent);
        contexts.sort_unstable();

        let children: Vec<(String, f64)> = tree.children.iter().cloned().collect();
        let mut checks = Vec::new();
        for context_id in contexts {
            let Some(group) = self.groups.get(context_id) else {
                continue;
            };
            let binding =
                self.checker
                    .check_binding_with_fallback(group, &tree.parent, &children, self.groups);
            debug!(
                parent = %tree.parent,
                context = context_id,
                status = ?binding.status,
                "binding evaluated"
            );
            checks.push(if binding.binds() {
                self.evaluate(tree, &binding)
            } else {
                self.skipped(tree, &binding)
            });
        }
        checks
    }

    fn skipped(&self, tree: &CalculationTree, binding: &BindingResult) -> VerificationCheck {
        let mut check = VerificationCheck::finding(
            CheckKind::Calculation,
            CheckStatus::Skipped,
            Severity::Info,
            &tree.parent,
        )
        .in_context(&binding.context_id)
        .with_message(binding.status.describe());
        check.skip_reason = Some(binding.status);
        check.missing_children = binding.missing.clone();
        check.source = Some(tree.source);
        check
    }

    fn evaluate(&self, tree: &CalculationTree, binding: &BindingResult) -> VerificationCheck {
        let mut expected = 0.0;
        let mut sum_decimals = Decimals::Exact;
        for child in &binding.found {
            let corrected = self.signs.apply(&child.concept, &child.context_id, child.value);
            expected += corrected * child.weight;
            sum_decimals = coarser(sum_decimals, child.decimals);
        }

        let parent_value = binding.parent_value.unwrap_or(0.0);
        let actual = self
            .signs
            .apply(&tree.parent, &binding.context_id, parent_value);

        let result = tolerance::compare(expected, sum_decimals, actual, binding.parent_decimals);

        let (status, severity, message) = if result.equal {
            (
                CheckStatus::Passed,
                Severity::Info,
                format!("{} = sum of children within tolerance", tree.parent),
            )
        } else {
            let severity = self.failure_severity(expected, actual, !binding.missing.is_empty());
            (
                CheckStatus::Failed,
                severity,
                format!(
                    "{}: expected {expected:.2} from children, reported {actual:.2}",
                    tree.parent
                ),
            )
        };

        let mut check = VerificationCheck::finding(CheckKind::Calculation, status, severity, &tree.parent)
            .in_context(&binding.context_id)
            .with_message(message);
        check.expected = Some(expected);
        check.actual = Some(actual);
        check.difference = Some(result.difference);
        check.comparison_decimals = result.comparison_decimals;
        check.missing_children = binding.missing.clone();
        check.source = Some(tree.source);
        check
    }

    /// Severity of a failed comparison, from the shape of the discrepancy.
    fn failure_severity(&self, expected: f64, actual: f64, has_missing: bool) -> Severity {
        if expected != 0.0 && actual != 0.0 && expected.signum() != actual.signum() {
            return Severity::Critical;
        }
        let expected_mag = expected.abs();
        let actual_mag = actual.abs();
        if expected_mag > actual_mag {
            // The children overshoot the parent. A small ratio is
            // plausibly rounding; a large one is a real break.
            let ratio = if actual_mag == 0.0 {
                1.0
            } else {
                (expected_mag - actual_mag) / actual_mag
            };
            if ratio <= self.config.overshoot_rounding_threshold {
                Severity::Warning
            } else {
                Severity::Critical
            }
        } else if has_missing {
            // Shortfall with missing children: plausibly incomplete data.
            Severity::Warning
        } else {
            Severity::Critical
        }
    }

    /// Compares the two sources' verdicts per (concept, context) and
    /// reports disagreement as an informational finding.
    fn dual_findings(
        &self,
        registry: &FormulaRegistry,
        checks: &[VerificationCheck],
    ) -> Vec<VerificationCheck> {
        let mut findings = Vec::new();
        for comparison in registry.compare_all() {
            let key = crate::naming::normalize(&comparison.concept);
            let verdicts = |source: CalcSource| {
                checks
                    .iter()
                    .filter(|c| {
                        c.kind == CheckKind::Calculation
                            && !c.skipped()
                            && c.source == Some(source)
                            && crate::naming::normalize(&c.concept) == key
                    })
                    .collect::<Vec<_>>()
            };
            for company_check in verdicts(CalcSource::Company) {
                let disagrees = verdicts(CalcSource::Taxonomy).into_iter().any(|t| {
                    t.context_id == company_check.context_id && t.passed() != company_check.passed()
                });
                if disagrees {
                    let context = company_check.context_id.as_deref().unwrap_or("");
                    findings.push(
                        VerificationCheck::finding(
                            CheckKind::SourceComparison,
                            CheckStatus::Failed,
                            Severity::Info,
                            &comparison.concept,
                        )
                        .in_context(context)
                        .with_message("company and taxonomy formulas disagree on the verdict"),
                    );
                }
            }
            if !comparison.agrees() {
                // Structure-only diffs are informational; they must not
                // drag the score down the way a failed check does.
                findings.push(
                    VerificationCheck::finding(
                        CheckKind::SourceComparison,
                        CheckStatus::Passed,
                        Severity::Info,
                        &comparison.concept,
                    )
                    .with_message(format!(
                        "formula structure differs between sources ({} company-only, {} taxonomy-only, {} weight differences)",
                        comparison.company_only.len(),
                        comparison.taxonomy_only.len(),
                        comparison.weight_differences.len()
                    )),
                );
            }
        }
        findings
    }
}

/// The coarser (less precise) of two precisions drives a sum's precision.
fn coarser(a: Decimals, b: Decimals) -> Decimals {
    if a.is_finer_than(b) {
        b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::Fact;
    use crate::grouping::group_facts;
    use crate::registry::CalculationRelation;
    use crate::sign::SignMarker;

    const CTX: &str = "Duration_1_1_2024_To_12_31_2024";

    fn fact(concept: &str, value: f64, decimals: i32) -> Fact {
        Fact::new(concept, value, CTX).with_unit("USD").with_decimals(decimals)
    }

    fn tree(parent: &str, children: &[(&str, f64)]) -> CalculationTree {
        CalculationTree {
            parent: parent.to_string(),
            children: children.iter().map(|(c, w)| (c.to_string(), *w)).collect(),
            role: "http://example.com/role/BalanceSheet".to_string(),
            source: CalcSource::Company,
        }
    }

    fn run(
        facts: &[Fact],
        markers: &[SignMarker],
        tree: &CalculationTree,
        config: &VerifyConfig,
    ) -> Vec<VerificationCheck> {
        let groups = group_facts(facts, config.duplicate_percentage_tolerance);
        let signs = SignLookup::new(markers);
        CalculationVerifier::new(config, &groups, &signs).verify_tree(tree)
    }

    #[test]
    fn balanced_equation_passes_as_info() {
        let facts = [
            fact("Assets", 1_000_000.0, -3),
            fact("Liabilities", 600_000.0, -3),
            fact("Equity", 400_000.0, -3),
        ];
        let checks = run(
            &facts,
            &[],
            &tree("Assets", &[("Liabilities", 1.0), ("Equity", 1.0)]),
            &VerifyConfig::default(),
        );
        assert_eq!(checks.len(), 1);
        assert!(checks[0].passed());
        assert_eq!(checks[0].severity, Severity::Info);
        assert_eq!(checks[0].expected, Some(1_000_000.0));
    }

    #[test]
    fn small_overshoot_is_a_warning() {
        // Children exceed the parent by 0.2%, inside the 5% rounding band.
        let facts = [
            fact("Assets", 1_000_000.0, 0),
            fact("Liabilities", 602_000.0, 0),
            fact("Equity", 400_000.0, 0),
        ];
        let checks = run(
            &facts,
            &[],
            &tree("Assets", &[("Liabilities", 1.0), ("Equity", 1.0)]),
            &VerifyConfig::default(),
        );
        assert_eq!(checks[0].status, CheckStatus::Failed);
        assert_eq!(checks[0].severity, Severity::Warning);
    }

    #[test]
    fn large_overshoot_is_critical() {
        let facts = [
            fact("Assets", 1_000_000.0, 0),
            fact("Liabilities", 900_000.0, 0),
            fact("Equity", 400_000.0, 0),
        ];
        let checks = run(
            &facts,
            &[],
            &tree("Assets", &[("Liabilities", 1.0), ("Equity", 1.0)]),
            &VerifyConfig::default(),
        );
        assert_eq!(checks[0].severity, Severity::Critical);
    }

    #[test]
    fn opposite_signs_are_critical() {
        let facts = [
            fact("NetIncome", -500_000.0, 0),
            fact("Revenue", 500_000.0, 0),
        ];
        let checks = run(
            &facts,
            &[],
            &tree("NetIncome", &[("Revenue", 1.0)]),
            &VerifyConfig::default(),
        );
        assert_eq!(checks[0].severity, Severity::Critical);
    }

    #[test]
    fn shortfall_with_missing_children_is_a_warning() {
        let facts = [
            fact("Assets", 1_000_000.0, 0),
            fact("Cash", 400_000.0, 0),
        ];
        let checks = run(
            &facts,
            &[],
            &tree("Assets", &[("Cash", 1.0), ("Goodwill", 1.0)]),
            &VerifyConfig::default(),
        );
        assert_eq!(checks[0].status, CheckStatus::Failed);
        assert_eq!(checks[0].severity, Severity::Warning);
        assert_eq!(checks[0].missing_children, vec!["Goodwill".to_string()]);
    }

    #[test]
    fn sign_correction_composes_with_negative_weight() {
        // Sign marker forces the cost negative; weight -1 restores the
        // unsigned magnitude in the sum.
        let facts = [
            fact("GrossProfit", 400_000.0, 0),
            fact("Revenue", 1_000_000.0, 0),
            fact("CostOfRevenue", 600_000.0, 0),
        ];
        let markers = [SignMarker::negated("CostOfRevenue", CTX)];
        let checks = run(
            &facts,
            &markers,
            &tree("GrossProfit", &[("Revenue", 1.0), ("CostOfRevenue", 1.0)]),
            &VerifyConfig::default(),
        );
        // 1,000,000 + (-600,000) = 400,000
        assert!(checks[0].passed());

        let double_negated = run(
            &facts,
            &markers,
            &tree("GrossProfit", &[("Revenue", 1.0), ("CostOfRevenue", -1.0)]),
            &VerifyConfig::default(),
        );
        // (-600,000) * -1 = +600,000: sum overshoots to 1,600,000
        assert_eq!(double_negated[0].expected, Some(1_600_000.0));
    }

    #[test]
    fn inconsistent_parent_still_yields_a_skipped_check() {
        // The parent's context must be visited even though its duplicate
        // values make it unusable; the outcome is a skip, not silence.
        let facts = [
            fact("Assets", 1_000_000.0, 0),
            fact("Assets", 2_000_000.0, 0),
            fact("Liabilities", 600_000.0, 0),
        ];
        let checks = run(
            &facts,
            &[],
            &tree("Assets", &[("Liabilities", 1.0)]),
            &VerifyConfig::default(),
        );
        assert_eq!(checks.len(), 1);
        assert!(checks[0].skipped());
        assert_eq!(
            checks[0].skip_reason,
            Some(crate::binding::BindingStatus::SkipInconsistentParent)
        );
    }

    #[test]
    fn fallback_completes_a_short_but_binding_sum() {
        let other = "Duration_1_1_2024_To_12_31_2024_hashB";
        let facts = [
            fact("Assets", 1_000_000.0, 0),
            fact("Liabilities", 600_000.0, 0),
            Fact::new("Equity", 400_000.0, other).with_unit("USD").with_decimals(0),
        ];
        let checks = run(
            &facts,
            &[],
            &tree("Assets", &[("Liabilities", 1.0), ("Equity", 1.0)]),
            &VerifyConfig::default(),
        );
        assert_eq!(checks.len(), 1);
        assert!(checks[0].passed());
        assert_eq!(checks[0].expected, Some(1_000_000.0));
    }

    #[test]
    fn skip_carries_reason_and_is_not_failed() {
        let facts = [fact("Assets", 1_000_000.0, 0)];
        let checks = run(
            &facts,
            &[],
            &tree("Assets", &[("Liabilities", 1.0)]),
            &VerifyConfig::default(),
        );
        assert!(checks[0].skipped());
        assert!(checks[0].skip_reason.is_some());
        assert_eq!(checks[0].severity, Severity::Info);
    }

    #[test]
    fn dual_sources_report_structural_disagreement() {
        let mut registry = FormulaRegistry::new();
        let arcs: Vec<CalculationRelation> = [
            ("Assets", "Liabilities", 1.0, CalcSource::Company),
            ("Assets", "Equity", 1.0, CalcSource::Company),
            ("Assets", "Liabilities", 1.0, CalcSource::Taxonomy),
        ]
        .iter()
        .map(|(p, c, w, s)| CalculationRelation {
            parent: p.to_string(),
            child: c.to_string(),
            weight: *w,
            order: 1.0,
            role: "r".to_string(),
            source: *s,
        })
        .collect();
        registry.load_relations(&arcs);

        let facts = [
            fact("Assets", 1_000_000.0, -3),
            fact("Liabilities", 600_000.0, -3),
            fact("Equity", 400_000.0, -3),
        ];
        let config = VerifyConfig::default();
        let groups = group_facts(&facts, config.duplicate_percentage_tolerance);
        let signs = SignLookup::new(&[]);
        let checks = CalculationVerifier::new(&config, &groups, &signs).verify_all(&registry);

        let structural: Vec<_> = checks
            .iter()
            .filter(|c| c.kind == CheckKind::SourceComparison)
            .collect();
        assert!(!structural.is_empty());
        assert!(structural.iter().all(|c| c.severity == Severity::Info));
    }

    #[test]
    fn coarser_prefers_the_less_precise() {
        assert_eq!(coarser(Decimals::Digits(2), Decimals::Digits(-3)), Decimals::Digits(-3));
        assert_eq!(coarser(Decimals::Exact, Decimals::Digits(0)), Decimals::Digits(0));
        assert_eq!(coarser(Decimals::Exact, Decimals::Exact), Decimals::Exact);
    }
}
