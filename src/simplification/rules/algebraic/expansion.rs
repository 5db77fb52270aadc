use num::BigInt;
use std::sync::Arc;

use crate::core::expr::{Expr, ExprKind, NodeTag};
use crate::core::number::Number;
use crate::simplification::helpers::{Term, flatten_terms, rebuild_terms, term_count};
use crate::simplification::rules::{Rule, RuleCategory, RuleContext};

/// Expansion rules, search-only
pub(crate) mod rules {
    use super::*;

    /// Rule for distributing a product over a sum: a*(b+c) = a*b + a*c
    pub(crate) struct DistributeRule;

    impl Rule for DistributeRule {
        fn name(&self) -> &'static str {
            "distribute"
        }

        fn priority(&self) -> i32 {
            30
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Expansion
        }

        fn applies_to(&self) -> &[NodeTag] {
            &[NodeTag::Mul]
        }

        fn apply(&self, expr: &Arc<Expr>, context: &RuleContext) -> Option<Expr> {
            let ExprKind::Mul(a, b) = &expr.kind else {
                return None;
            };
            let (left, right) = (flatten_terms(a), flatten_terms(b));
            if left.len() == 1 && right.len() == 1 {
                return None;
            }
            if left.len() * right.len() > context.settings.max_expansion_term_count {
                return None;
            }
            let mut terms = Vec::with_capacity(left.len() * right.len());
            for l in &left {
                for r in &right {
                    terms.push(Term {
                        negated: l.negated != r.negated,
                        expr: Arc::new(Expr::mul(&l.expr, &r.expr)),
                    });
                }
            }
            Some(rebuild_terms(terms))
        }
    }

    /// Rule for dividing a sum term by term: (a+b)/c = a/c + b/c
    pub(crate) struct DistributeDivisionRule;

    impl Rule for DistributeDivisionRule {
        fn name(&self) -> &'static str {
            "distribute_division"
        }

        fn priority(&self) -> i32 {
            30
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Expansion
        }

        fn applies_to(&self) -> &[NodeTag] {
            &[NodeTag::Div]
        }

        fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
            let ExprKind::Div(numerator, denominator) = &expr.kind else {
                return None;
            };
            let terms = flatten_terms(numerator);
            if terms.len() == 1 {
                return None;
            }
            let terms = terms
                .into_iter()
                .map(|t| Term {
                    negated: t.negated,
                    expr: Arc::new(Expr::div(t.expr, denominator)),
                })
                .collect();
            Some(rebuild_terms(terms))
        }
    }

    /// Rule for the binomial expansion: (a+b)^n with a small positive integer n
    pub(crate) struct BinomialExpansionRule;

    impl Rule for BinomialExpansionRule {
        fn name(&self) -> &'static str {
            "binomial_expansion"
        }

        fn priority(&self) -> i32 {
            30
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Expansion
        }

        fn applies_to(&self) -> &[NodeTag] {
            &[NodeTag::Pow]
        }

        fn apply(&self, expr: &Arc<Expr>, context: &RuleContext) -> Option<Expr> {
            let ExprKind::Pow(base, exponent) = &expr.kind else {
                return None;
            };
            let (a, b, negated) = match &base.kind {
                ExprKind::Sum(a, b) => (a, b, false),
                ExprKind::Minus(a, b) => (a, b, true),
                _ => return None,
            };
            let n = exponent.as_number()?.as_i64()?;
            let limit = context.settings.max_expansion_term_count;
            if n < 2 || usize::try_from(n).ok()? >= limit {
                return None;
            }
            let mut terms = Vec::new();
            let mut binomial = BigInt::from(1);
            for k in 0..=n {
                let term = Expr::mul(
                    Number::integer(binomial.clone()),
                    Expr::mul(Expr::pow(a, n - k), Expr::pow(b, k)),
                );
                terms.push(Term {
                    negated: negated && k % 2 == 1,
                    expr: Arc::new(term),
                });
                binomial = binomial * (n - k) / (k + 1);
            }
            Some(rebuild_terms(terms))
        }
    }
}

pub(crate) fn get_expansion_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(rules::DistributeRule),
        Arc::new(rules::DistributeDivisionRule),
        Arc::new(rules::BinomialExpansionRule),
    ]
}

/// Whether an expansion result stays within the configured term budget.
pub(crate) fn within_term_budget(expr: &Expr, limit: usize) -> bool {
    term_count(expr) <= limit
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use crate::{Expr, Settings, var, with_settings};

    #[test]
    fn test_expand_square_of_sum() {
        let x = var("x");
        let e = Expr::pow(Expr::sum(x.clone(), 1), 2);
        let expected = Expr::sum(Expr::sum(Expr::pow(x.clone(), 2), Expr::mul(2, x)), 1);
        assert_eq!(e.expand(), expected);
    }

    #[test]
    fn test_expand_difference_product() {
        let (x, y) = (var("x"), var("y"));
        let e = Expr::mul(Expr::sum(x.clone(), y.clone()), Expr::minus(x.clone(), y.clone()));
        let expected = Expr::minus(Expr::pow(x, 2), Expr::pow(y, 2));
        assert_eq!(e.expand(), expected);
    }

    #[test]
    fn test_expansion_respects_term_budget() {
        let e = Expr::pow(Expr::sum(var("x"), var("y")), 30);
        let settings = Settings::default().with_max_expansion_term_count(10);
        let expanded = with_settings(settings, || e.expand());
        assert_eq!(expanded, e);
    }
}
