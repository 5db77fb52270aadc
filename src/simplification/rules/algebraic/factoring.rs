use std::sync::Arc;

use crate::core::expr::{Expr, ExprKind, NodeTag};
use crate::core::number::Number;
use crate::simplification::helpers::{flatten_factors, rebuild_product};
use crate::simplification::rules::{Rule, RuleCategory, RuleContext};

/// `x^n` with a positive integer `n` as `(x, n)`, any other non-number factor as `(f, 1)`.
fn power_parts(factor: &Arc<Expr>) -> Option<(&Arc<Expr>, i64)> {
    match &factor.kind {
        ExprKind::Number(_) => None,
        ExprKind::Pow(base, exponent) => match exponent.as_number().and_then(Number::as_i64) {
            Some(n) if n > 0 => Some((base, n)),
            _ => Some((factor, 1)),
        },
        _ => Some((factor, 1)),
    }
}

/// Replace `factors[index]` by `base^exponent`, dropping it when the exponent is zero.
fn lower_power(factors: &mut Vec<Arc<Expr>>, index: usize, base: &Arc<Expr>, exponent: i64) {
    match exponent {
        0 => {
            factors.remove(index);
        }
        1 => factors[index] = Arc::clone(base),
        n => factors[index] = Arc::new(Expr::pow(base, n)),
    }
}

/// Factoring rules, search-only
pub(crate) mod rules {
    use super::*;

    /// Rule for pulling out a common factor: a*b + a*c = a*(b + c), x^3 - x = x*(x^2 - 1)
    pub(crate) struct CommonFactorRule;

    impl Rule for CommonFactorRule {
        fn name(&self) -> &'static str {
            "common_factor"
        }

        fn priority(&self) -> i32 {
            30
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Factoring
        }

        fn applies_to(&self) -> &[NodeTag] {
            &[NodeTag::Sum, NodeTag::Minus]
        }

        fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
            let (a, b) = expr.as_binary()?;
            let mut left = flatten_factors(a);
            let mut right = flatten_factors(b);

            let mut common = None;
            'search: for (i, l) in left.iter().enumerate() {
                let Some((base, m)) = power_parts(l) else {
                    continue;
                };
                for (j, r) in right.iter().enumerate() {
                    if let Some((other, n)) = power_parts(r)
                        && base == other
                    {
                        common = Some((i, j, Arc::clone(base), m, n));
                        break 'search;
                    }
                }
            }
            let (i, j, base, m, n) = common?;
            let k = m.min(n);
            lower_power(&mut left, i, &base, m - k);
            lower_power(&mut right, j, &base, n - k);

            let factor = if k == 1 {
                Expr::unshare(base)
            } else {
                Expr::pow(base, k)
            };
            let (rest_left, rest_right) = (rebuild_product(left), rebuild_product(right));
            let rest = match &expr.kind {
                ExprKind::Minus(..) => Expr::minus(rest_left, rest_right),
                _ => Expr::sum(rest_left, rest_right),
            };
            Some(Expr::mul(factor, rest))
        }
    }

    /// Rule for the difference of squares: a^2 - b^2 = (a + b)*(a - b), x^2 - 4 = (x + 2)*(x - 2)
    pub(crate) struct DifferenceOfSquaresRule;

    /// Square root of an even power or of an exact perfect square.
    fn square_root(expr: &Arc<Expr>) -> Option<Expr> {
        match &expr.kind {
            ExprKind::Pow(base, exponent) => {
                let n = exponent.as_number()?.as_i64()?;
                if n <= 0 || n % 2 != 0 {
                    return None;
                }
                Some(if n == 2 {
                    (**base).clone()
                } else {
                    Expr::pow(base, n / 2)
                })
            }
            ExprKind::Number(c) if c.is_exact() && !c.is_negative() && !c.is_zero() => {
                let root = c.pow(&Number::rational(1, 2));
                root.is_exact().then(|| Expr::number(root))
            }
            _ => None,
        }
    }

    impl Rule for DifferenceOfSquaresRule {
        fn name(&self) -> &'static str {
            "difference_of_squares"
        }

        fn priority(&self) -> i32 {
            35
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Factoring
        }

        fn applies_to(&self) -> &[NodeTag] {
            &[NodeTag::Minus]
        }

        fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
            let ExprKind::Minus(a, b) = &expr.kind else {
                return None;
            };
            if a.is_number() && b.is_number() {
                return None;
            }
            let (p, q) = (Arc::new(square_root(a)?), Arc::new(square_root(b)?));
            Some(Expr::mul(Expr::sum(&p, &q), Expr::minus(p, q)))
        }
    }
}

pub(crate) fn get_factoring_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(rules::DifferenceOfSquaresRule),
        Arc::new(rules::CommonFactorRule),
    ]
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;
    use crate::var;

    fn factor(rule: &dyn Rule, e: Expr) -> Option<Expr> {
        rule.apply(&Arc::new(e), &RuleContext::default())
    }

    #[test]
    fn test_common_factor() {
        let (a, b, c) = (var("a"), var("b"), var("c"));
        let e = Expr::sum(Expr::mul(a.clone(), b.clone()), Expr::mul(a.clone(), c.clone()));
        assert_eq!(
            factor(&CommonFactorRule, e),
            Some(Expr::mul(a, Expr::sum(b, c)))
        );
    }

    #[test]
    fn test_common_power_factor() {
        let x = var("x");
        let e = Expr::minus(Expr::pow(x.clone(), 3), x.clone());
        assert_eq!(
            factor(&CommonFactorRule, e),
            Some(Expr::mul(x.clone(), Expr::minus(Expr::pow(x, 2), 1)))
        );
    }

    #[test]
    fn test_difference_of_squares() {
        let (x, y) = (var("x"), var("y"));
        let e = Expr::minus(Expr::pow(x.clone(), 2), Expr::pow(y.clone(), 2));
        let expected = Expr::mul(Expr::sum(x.clone(), y.clone()), Expr::minus(x.clone(), y));
        assert_eq!(factor(&DifferenceOfSquaresRule, e), Some(expected));

        let e = Expr::minus(Expr::pow(x.clone(), 2), 4);
        let expected = Expr::mul(Expr::sum(x.clone(), 2), Expr::minus(x.clone(), 2));
        assert_eq!(factor(&DifferenceOfSquaresRule, e), Some(expected));

        assert_eq!(factor(&DifferenceOfSquaresRule, Expr::minus(Expr::pow(x, 2), 3)), None);
    }
}
