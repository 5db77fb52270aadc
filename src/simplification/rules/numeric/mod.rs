use std::sync::Arc;

use crate::core::expr::evaluate::apply_function;
use crate::core::expr::{Expr, ExprKind, NodeTag, UnaryFn};
use crate::core::number::Number;
use crate::simplification::rules::{ARITHMETIC_TAGS, Rule, RuleCategory, RuleContext};

/// Numeric folding rules
pub(crate) mod rules {
    use super::*;

    /// Whether a folded value may replace the node it came from.
    ///
    /// Exact inputs only fold to exact outputs, so `2 ^ (1/2)` stays symbolic
    /// while `4 ^ (1/2)` becomes `2`. Once an operand is inexact the whole
    /// result is inexact anyway.
    fn accept(result: &Number, operands: &[&Number]) -> bool {
        result.is_finite() && (result.is_exact() || operands.iter().any(|n| !n.is_exact()))
    }

    /// Rule for folding an operator whose operands are both numbers: 2 + 3 = 5
    pub(crate) struct BinaryFoldRule;

    impl Rule for BinaryFoldRule {
        fn name(&self) -> &'static str {
            "binary_fold"
        }

        fn priority(&self) -> i32 {
            100
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Numeric
        }

        fn applies_to(&self) -> &[NodeTag] {
            ARITHMETIC_TAGS
        }

        fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
            let (a, b) = expr.as_binary()?;
            let (x, y) = (a.as_number()?, b.as_number()?);
            let result = match &expr.kind {
                ExprKind::Sum(..) => x + y,
                ExprKind::Minus(..) => x - y,
                ExprKind::Mul(..) => x * y,
                ExprKind::Div(..) => x.checked_div(y)?,
                ExprKind::Pow(..) => {
                    if x.is_zero() && (y.is_negative() || y.is_zero()) {
                        return None;
                    }
                    x.pow(y)
                }
                ExprKind::Log(..) => {
                    if x.is_zero() || x.is_one() || y.is_zero() {
                        return None;
                    }
                    Number::log(x, y)
                }
                _ => return None,
            };
            accept(&result, &[x, y]).then(|| Expr::number(result))
        }
    }

    /// Rule for functions of a number with an exact value: sin(0) = 0, 5! = 120
    pub(crate) struct FunctionFoldRule;

    const FUNCTION_TAGS: [NodeTag; 11] = [
        NodeTag::Unary(UnaryFn::Sin),
        NodeTag::Unary(UnaryFn::Cos),
        NodeTag::Unary(UnaryFn::Tan),
        NodeTag::Unary(UnaryFn::Cotan),
        NodeTag::Unary(UnaryFn::Arcsin),
        NodeTag::Unary(UnaryFn::Arccos),
        NodeTag::Unary(UnaryFn::Arctan),
        NodeTag::Unary(UnaryFn::Arccotan),
        NodeTag::Unary(UnaryFn::Abs),
        NodeTag::Unary(UnaryFn::Signum),
        NodeTag::Unary(UnaryFn::Factorial),
    ];

    impl Rule for FunctionFoldRule {
        fn name(&self) -> &'static str {
            "function_fold"
        }

        fn priority(&self) -> i32 {
            100
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Numeric
        }

        fn applies_to(&self) -> &[NodeTag] {
            &FUNCTION_TAGS
        }

        fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
            let ExprKind::Unary(func, arg) = &expr.kind else {
                return None;
            };
            let x = arg.as_number()?;
            if *func == UnaryFn::Cotan && x.is_zero() {
                return None;
            }
            let result = apply_function(*func, x);
            accept(&result, &[x]).then(|| Expr::number(result))
        }
    }
}

pub(crate) fn get_numeric_rules() -> Vec<Arc<dyn Rule>> {
    vec![Arc::new(rules::BinaryFoldRule), Arc::new(rules::FunctionFoldRule)]
}

#[cfg(test)]
mod tests {
    use super::rules::*;
    use super::*;

    fn fold(rule: &dyn Rule, e: Expr) -> Option<Expr> {
        rule.apply(&Arc::new(e), &RuleContext::default())
    }

    #[test]
    fn test_exact_folding() {
        assert_eq!(fold(&BinaryFoldRule, Expr::sum(2, 3)), Some(Expr::integer(5)));
        assert_eq!(
            fold(&BinaryFoldRule, Expr::div(1, 3)),
            Some(Expr::rational(1, 3))
        );
        assert_eq!(fold(&BinaryFoldRule, Expr::pow(4, Expr::rational(1, 2))), Some(Expr::integer(2)));
        assert_eq!(fold(&BinaryFoldRule, Expr::log(2, 8)), Some(Expr::integer(3)));
    }

    #[test]
    fn test_inexact_results_of_exact_operands_are_kept() {
        assert_eq!(fold(&BinaryFoldRule, Expr::pow(2, Expr::rational(1, 2))), None);
        assert_eq!(fold(&BinaryFoldRule, Expr::log(2, 3)), None);
        assert_eq!(fold(&FunctionFoldRule, Expr::sin(1)), None);
    }

    #[test]
    fn test_inexact_operands_fold() {
        let pi = std::f64::consts::PI;
        let folded = fold(&BinaryFoldRule, Expr::mul(pi, 2));
        assert!(folded.is_some_and(|e| e.as_number().is_some_and(|n| !n.is_exact())));
        assert!(fold(&FunctionFoldRule, Expr::sin(pi)).is_some());
        // 0.5 is stored exactly as 1/2
        assert_eq!(fold(&FunctionFoldRule, Expr::sin(0.5)), None);
    }

    #[test]
    fn test_division_by_zero_is_not_folded() {
        assert_eq!(fold(&BinaryFoldRule, Expr::div(1, 0)), None);
        assert_eq!(fold(&BinaryFoldRule, Expr::pow(0, -1)), None);
        assert_eq!(fold(&FunctionFoldRule, Expr::cotan(0)), None);
    }

    #[test]
    fn test_function_table_values() {
        assert_eq!(fold(&FunctionFoldRule, Expr::sin(0)), Some(Expr::integer(0)));
        assert_eq!(fold(&FunctionFoldRule, Expr::cos(0)), Some(Expr::integer(1)));
        assert_eq!(fold(&FunctionFoldRule, Expr::factorial(5)), Some(Expr::integer(120)));
        assert_eq!(fold(&FunctionFoldRule, Expr::abs(-3)), Some(Expr::integer(3)));
    }
}
