use std::sync::Arc;

use crate::core::expr::{Expr, ExprKind, NodeTag};
use crate::core::number::Number;
use crate::simplification::helpers::{
    Term, flatten_factors, flatten_terms, rebuild_product, rebuild_terms, split_coefficient,
    with_coefficient,
};
use crate::simplification::rules::{Rule, RuleCategory, RuleContext};

/// Whether two products have the same factors, in any order.
pub(crate) fn same_factors(a: &Arc<Expr>, b: &Arc<Expr>) -> bool {
    if a == b {
        return true;
    }
    let (left, right) = (flatten_factors(a), flatten_factors(b));
    if left.len() != right.len() || left.len() == 1 {
        return false;
    }
    let mut used = vec![false; right.len()];
    left.iter().all(|factor| {
        let found = right
            .iter()
            .enumerate()
            .find(|(i, candidate)| !used[*i] && *candidate == factor);
        match found {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Combination rules, search-only
pub(crate) mod rules {
    use super::*;

    /// Rule for collecting like terms: 2x + y - x + 1 - 3 = x + y - 2
    pub(crate) struct CollectLikeTermsRule;

    impl Rule for CollectLikeTermsRule {
        fn name(&self) -> &'static str {
            "collect_like_terms"
        }

        fn priority(&self) -> i32 {
            30
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Collection
        }

        fn applies_to(&self) -> &[NodeTag] {
            &[NodeTag::Sum, NodeTag::Minus]
        }

        fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
            let terms = flatten_terms(expr);
            let total = terms.len();
            let mut groups: Vec<(Arc<Expr>, Number)> = Vec::new();
            let mut constant: Option<Number> = None;

            for term in terms {
                if let Some(n) = term.expr.as_number() {
                    let n = if term.negated { -n } else { n.clone() };
                    constant = Some(match constant {
                        Some(c) => &c + &n,
                        None => n,
                    });
                    continue;
                }
                let (coefficient, base) = split_coefficient(&term.expr);
                let coefficient = if term.negated { -coefficient } else { coefficient };
                match groups.iter_mut().find(|(b, _)| same_factors(b, &base)) {
                    Some((_, c)) => *c = &*c + &coefficient,
                    None => groups.push((base, coefficient)),
                }
            }

            if groups.len() + usize::from(constant.is_some()) == total {
                return None;
            }

            let mut out = Vec::with_capacity(groups.len() + 1);
            for (base, coefficient) in groups {
                if coefficient.is_zero() {
                    continue;
                }
                out.push(signed_term(coefficient, base, out.is_empty()));
            }
            if let Some(c) = constant
                && !c.is_zero()
            {
                let first = out.is_empty();
                out.push(signed_term(c, Arc::new(Expr::integer(1)), first));
            }
            Some(rebuild_terms(out))
        }
    }

    /// Leading terms keep a negative coefficient, later ones become a subtraction.
    fn signed_term(coefficient: Number, base: Arc<Expr>, leading: bool) -> Term {
        let negated = coefficient.is_negative() && !leading;
        let coefficient = if negated { -coefficient } else { coefficient };
        let expr = if base.is_one() {
            Expr::number(coefficient)
        } else {
            with_coefficient(coefficient, base)
        };
        Term {
            negated,
            expr: Arc::new(expr),
        }
    }

    /// Rule for collecting like factors: x * 2 * x^3 / x = 2 * x^3
    pub(crate) struct CollectLikeFactorsRule;

    /// A base with its accumulated exponent, negative for denominators.
    struct Factor {
        base: Arc<Expr>,
        exponent: Expr,
    }

    impl Rule for CollectLikeFactorsRule {
        fn name(&self) -> &'static str {
            "collect_like_factors"
        }

        fn priority(&self) -> i32 {
            30
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Collection
        }

        fn applies_to(&self) -> &[NodeTag] {
            &[NodeTag::Mul, NodeTag::Div]
        }

        fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
            let mut coefficient = Number::one();
            let mut numbers = 0usize;
            let mut total = 0usize;
            let mut groups: Vec<Factor> = Vec::new();

            let mut stack = vec![(false, expr)];
            while let Some((inverted, node)) = stack.pop() {
                match &node.kind {
                    ExprKind::Mul(a, b) => {
                        stack.push((inverted, b));
                        stack.push((inverted, a));
                        continue;
                    }
                    ExprKind::Div(a, b) => {
                        stack.push((!inverted, b));
                        stack.push((inverted, a));
                        continue;
                    }
                    _ => {}
                }
                total += 1;
                if let Some(n) = node.as_number() {
                    numbers += 1;
                    coefficient = if inverted {
                        coefficient.checked_div(n)?
                    } else {
                        &coefficient * n
                    };
                    continue;
                }
                let (base, exponent) = match &node.kind {
                    ExprKind::Pow(base, exponent) => (Arc::clone(base), Arc::clone(exponent)),
                    _ => (Arc::clone(node), Arc::new(Expr::integer(1))),
                };
                let exponent = if inverted {
                    negate_exponent(&exponent)
                } else {
                    Expr::unshare(exponent)
                };
                match groups.iter_mut().find(|f| f.base == base) {
                    Some(factor) => {
                        let previous = std::mem::replace(&mut factor.exponent, Expr::integer(0));
                        factor.exponent = add_exponents(previous, exponent);
                    }
                    None => groups.push(Factor { base, exponent }),
                }
            }

            if groups.len() + numbers.min(1) == total {
                return None;
            }
            if coefficient.is_zero() {
                return Some(Expr::integer(0));
            }

            let mut numerator = Vec::new();
            let mut denominator = Vec::new();
            if !coefficient.is_one() {
                numerator.push(Arc::new(Expr::number(coefficient)));
            }
            for Factor { base, exponent } in groups {
                match exponent.as_number().cloned() {
                    Some(n) if n.is_zero() => {}
                    Some(n) if n.is_one() => numerator.push(base),
                    Some(n) if n.is_minus_one() => denominator.push(base),
                    Some(n) if n.is_negative() => {
                        denominator.push(Arc::new(Expr::pow(base, -n)));
                    }
                    _ => numerator.push(Arc::new(Expr::pow(base, exponent))),
                }
            }
            let numerator = rebuild_product(numerator);
            Some(if denominator.is_empty() {
                numerator
            } else {
                Expr::div(numerator, rebuild_product(denominator))
            })
        }
    }

    fn negate_exponent(exponent: &Arc<Expr>) -> Expr {
        match exponent.as_number() {
            Some(n) => Expr::number(-n),
            None => Expr::negate(exponent),
        }
    }

    fn add_exponents(a: Expr, b: Expr) -> Expr {
        match (a.as_number(), b.as_number()) {
            (Some(x), Some(y)) => Expr::number(x + y),
            _ => Expr::sum(a, b),
        }
    }
}

pub(crate) fn get_combination_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(rules::CollectLikeTermsRule),
        Arc::new(rules::CollectLikeFactorsRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;
    use crate::var;

    fn collect(rule: &dyn Rule, e: Expr) -> Option<Expr> {
        rule.apply(&Arc::new(e), &RuleContext::default())
    }

    #[test]
    fn test_like_terms() {
        let (x, y) = (var("x"), var("y"));
        // 2x + y - x + 1 - 3
        let e = Expr::minus(
            Expr::sum(
                Expr::minus(Expr::sum(Expr::mul(2, x.clone()), y.clone()), x.clone()),
                1,
            ),
            3,
        );
        let expected = Expr::minus(Expr::sum(x, y), 2);
        assert_eq!(collect(&CollectLikeTermsRule, e), Some(expected));
    }

    #[test]
    fn test_like_terms_cancel_regardless_of_factor_order() {
        let (x, y) = (var("x"), var("y"));
        let e = Expr::sum(Expr::mul(x.clone(), y.clone()), Expr::mul(-1, Expr::mul(y, x)));
        // -1 * (y * x) splits into coefficient -1 and base y * x
        assert_eq!(collect(&CollectLikeTermsRule, e), Some(Expr::integer(0)));
    }

    #[test]
    fn test_unrelated_terms_are_left_alone() {
        let e = Expr::sum(var("x"), var("y"));
        assert_eq!(collect(&CollectLikeTermsRule, e), None);
    }

    #[test]
    fn test_like_factors() {
        let x = var("x");
        // x * 2 * x^3 / x
        let e = Expr::div(Expr::mul(Expr::mul(x.clone(), 2), Expr::pow(x.clone(), 3)), x.clone());
        assert_eq!(
            collect(&CollectLikeFactorsRule, e),
            Some(Expr::mul(2, Expr::pow(x, 3)))
        );
    }

    #[test]
    fn test_like_factors_into_denominator() {
        let (x, y) = (var("x"), var("y"));
        let e = Expr::div(y.clone(), Expr::mul(x.clone(), Expr::pow(x.clone(), 2)));
        assert_eq!(
            collect(&CollectLikeFactorsRule, e),
            Some(Expr::div(y, Expr::pow(x, 3)))
        );
    }
}
