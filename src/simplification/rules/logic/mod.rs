use std::sync::Arc;

use crate::core::expr::evaluate::compare_numbers;
use crate::core::expr::{CmpOp, Expr, ExprKind, LogicOp, NodeTag};
use crate::simplification::patterns::dsl::*;
use crate::simplification::rules::{PatternRule, Rule, RuleCategory, RuleContext};

const BOOLEAN: RuleCategory = RuleCategory::Boolean;

const LOGIC_TAGS: [NodeTag; 5] = [
    NodeTag::Not,
    NodeTag::Logic(LogicOp::And),
    NodeTag::Logic(LogicOp::Or),
    NodeTag::Logic(LogicOp::Xor),
    NodeTag::Logic(LogicOp::Implies),
];

const COMPARE_TAGS: [NodeTag; 5] = [
    NodeTag::Compare(CmpOp::Equal),
    NodeTag::Compare(CmpOp::Less),
    NodeTag::Compare(CmpOp::Greater),
    NodeTag::Compare(CmpOp::LessOrEqual),
    NodeTag::Compare(CmpOp::GreaterOrEqual),
];

/// Boolean simplification rules
pub(crate) mod rules {
    use super::*;

    /// Rule for boolean literals: true and a = a, false or a = a, not true = false, ...
    pub(crate) struct LiteralLogicRule;

    impl Rule for LiteralLogicRule {
        fn name(&self) -> &'static str {
            "literal_logic"
        }

        fn priority(&self) -> i32 {
            88
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Boolean
        }

        fn applies_to(&self) -> &[NodeTag] {
            &LOGIC_TAGS
        }

        fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
            let (op, a, b) = match &expr.kind {
                ExprKind::Not(a) => return a.as_bool().map(|v| Expr::boolean(!v)),
                ExprKind::Logic(op, a, b) => (*op, a, b),
                _ => return None,
            };
            match (a.as_bool(), b.as_bool()) {
                (Some(x), Some(y)) => Some(Expr::boolean(op.apply(x, y))),
                (Some(x), None) => Some(with_left_literal(op, x, b)),
                (None, Some(y)) => Some(with_right_literal(op, a, y)),
                (None, None) => None,
            }
        }
    }

    fn with_left_literal(op: LogicOp, x: bool, b: &Arc<Expr>) -> Expr {
        match (op, x) {
            (LogicOp::And, false) => Expr::boolean(false),
            (LogicOp::Or, true) | (LogicOp::Implies, false) => Expr::boolean(true),
            (LogicOp::And | LogicOp::Implies, true) | (LogicOp::Or | LogicOp::Xor, false) => {
                (**b).clone()
            }
            (LogicOp::Xor, true) => Expr::not(b),
        }
    }

    fn with_right_literal(op: LogicOp, a: &Arc<Expr>, y: bool) -> Expr {
        match (op, y) {
            (LogicOp::And, false) => Expr::boolean(false),
            (LogicOp::Or | LogicOp::Implies, true) => Expr::boolean(true),
            (LogicOp::And, true) | (LogicOp::Or | LogicOp::Xor, false) => (**a).clone(),
            (LogicOp::Xor, true) | (LogicOp::Implies, false) => Expr::not(a),
        }
    }

    /// Rule for comparing two numbers: 1 < 2 = true
    pub(crate) struct CompareNumbersRule;

    impl Rule for CompareNumbersRule {
        fn name(&self) -> &'static str {
            "compare_numbers"
        }

        fn priority(&self) -> i32 {
            88
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Boolean
        }

        fn applies_to(&self) -> &[NodeTag] {
            &COMPARE_TAGS
        }

        fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
            let ExprKind::Compare(op, a, b) = &expr.kind else {
                return None;
            };
            compare_numbers(*op, a.as_number()?, b.as_number()?)
                .ok()
                .map(Expr::boolean)
        }
    }

    /// Rule for comparing a term with itself: a = a is true, a < a is false
    pub(crate) struct ReflexiveCompareRule;

    impl Rule for ReflexiveCompareRule {
        fn name(&self) -> &'static str {
            "reflexive_compare"
        }

        fn priority(&self) -> i32 {
            85
        }

        fn category(&self) -> RuleCategory {
            RuleCategory::Boolean
        }

        fn applies_to(&self) -> &[NodeTag] {
            &COMPARE_TAGS
        }

        fn apply(&self, expr: &Arc<Expr>, _context: &RuleContext) -> Option<Expr> {
            match &expr.kind {
                ExprKind::Compare(op, a, b) if a == b => Some(Expr::boolean(op.is_reflexive())),
                _ => None,
            }
        }
    }
}

pub(crate) fn get_logic_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        PatternRule::new("not_not", 88, BOOLEAN, not(not(any(A))), |b| b.arc(A).map(Expr::unshare)).boxed(),
        Arc::new(rules::LiteralLogicRule),
        Arc::new(rules::CompareNumbersRule),
        Arc::new(rules::ReflexiveCompareRule),
        PatternRule::new("and_self", 85, BOOLEAN, logic(LogicOp::And, any(A), any(A)), |b| {
            b.arc(A).map(Expr::unshare)
        })
        .boxed(),
        PatternRule::new("or_self", 85, BOOLEAN, logic(LogicOp::Or, any(A), any(A)), |b| {
            b.arc(A).map(Expr::unshare)
        })
        .boxed(),
        PatternRule::new("xor_self", 85, BOOLEAN, logic(LogicOp::Xor, any(A), any(A)), |_| {
            Some(Expr::boolean(false))
        })
        .boxed(),
        PatternRule::new("implies_self", 85, BOOLEAN, logic(LogicOp::Implies, any(A), any(A)), |_| {
            Some(Expr::boolean(true))
        })
        .boxed(),
    ]
}

#[cfg(test)]
mod tests {
    use crate::{Expr, var};

    #[test]
    fn test_double_negation() {
        let a = var("a");
        assert_eq!(Expr::not(Expr::not(a.clone())).inner_simplify(), a);
    }

    #[test]
    fn test_literals() {
        let a = var("a");
        assert_eq!(Expr::and(true, a.clone()).inner_simplify(), a);
        assert_eq!(Expr::and(a.clone(), false).inner_simplify(), Expr::boolean(false));
        assert_eq!(Expr::or(a.clone(), true).inner_simplify(), Expr::boolean(true));
        assert_eq!(Expr::xor(true, a.clone()).inner_simplify(), Expr::not(a.clone()));
        assert_eq!(Expr::implies(a.clone(), false).inner_simplify(), Expr::not(a.clone()));
        assert_eq!(Expr::implies(false, a).inner_simplify(), Expr::boolean(true));
        assert_eq!(Expr::not(true).inner_simplify(), Expr::boolean(false));
    }

    #[test]
    fn test_idempotent_operands() {
        let a = var("a");
        assert_eq!(Expr::and(a.clone(), a.clone()).inner_simplify(), a);
        assert_eq!(Expr::xor(a.clone(), a.clone()).inner_simplify(), Expr::boolean(false));
        assert_eq!(Expr::implies(a.clone(), a).inner_simplify(), Expr::boolean(true));
    }

    #[test]
    fn test_comparisons() {
        let x = var("x");
        assert_eq!(Expr::less(1, 2).inner_simplify(), Expr::boolean(true));
        assert_eq!(Expr::equal(Expr::rational(1, 2), 0.5).inner_simplify(), Expr::boolean(true));
        assert_eq!(Expr::equal(x.clone(), x.clone()).inner_simplify(), Expr::boolean(true));
        assert_eq!(Expr::less(x.clone(), x.clone()).inner_simplify(), Expr::boolean(false));
        let unordered = Expr::less(Expr::imaginary_unit(), 1);
        assert_eq!(unordered.clone().inner_simplify(), unordered);
        // comparisons fold after their operands
        let e = Expr::greater_or_equal(Expr::sum(x.clone(), 1), Expr::sum(x, 1));
        assert_eq!(e.inner_simplify(), Expr::boolean(true));
    }
}
