use std::sync::Arc;

use crate::core::expr::Expr;
use crate::simplification::patterns::dsl::*;
use crate::simplification::rules::{PatternRule, Rule, RuleCategory};

const ID: RuleCategory = RuleCategory::Identity;

pub(crate) fn get_identity_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        // additive identities
        PatternRule::new("add_zero_right", 95, ID, sum(any(A), lit(0)), |b| b.arc(A).map(Expr::unshare)).boxed(),
        PatternRule::new("add_zero_left", 95, ID, sum(lit(0), any(A)), |b| b.arc(A).map(Expr::unshare)).boxed(),
        PatternRule::new("sub_zero", 95, ID, minus(any(A), lit(0)), |b| b.arc(A).map(Expr::unshare)).boxed(),
        PatternRule::new("zero_minus", 95, ID, minus(lit(0), any(A)), |b| Some(Expr::negate(b.arc(A)?))).boxed(),
        PatternRule::new("sub_self", 95, ID, minus(any(A), any(A)), |_| Some(Expr::integer(0))).boxed(),
        // multiplicative identities
        PatternRule::new("mul_zero_right", 95, ID, mul(any(A), lit(0)), |_| Some(Expr::integer(0))).boxed(),
        PatternRule::new("mul_zero_left", 95, ID, mul(lit(0), any(A)), |_| Some(Expr::integer(0))).boxed(),
        PatternRule::new("mul_one_right", 95, ID, mul(any(A), lit(1)), |b| b.arc(A).map(Expr::unshare)).boxed(),
        PatternRule::new("mul_one_left", 95, ID, mul(lit(1), any(A)), |b| b.arc(A).map(Expr::unshare)).boxed(),
        PatternRule::new(
            "double_negation",
            92,
            ID,
            mul(lit(-1), mul(lit(-1), any(A))),
            |b| b.arc(A).map(Expr::unshare),
        )
        .boxed(),
        PatternRule::new("mul_self", 90, ID, mul(any(A), any(A)), |b| Some(Expr::pow(b.arc(A)?, 2))).boxed(),
        // division
        PatternRule::new("div_self", 95, ID, div(any(A), any(A)), |_| Some(Expr::integer(1)))
            .when(|b| b.get(A).is_some_and(|a| !a.is_zero()))
            .boxed(),
        PatternRule::new("zero_div", 95, ID, div(lit(0), any(A)), |_| Some(Expr::integer(0)))
            .when(|b| b.get(A).is_some_and(|a| !a.is_zero()))
            .boxed(),
        PatternRule::new("div_one", 95, ID, div(any(A), lit(1)), |b| b.arc(A).map(Expr::unshare)).boxed(),
        // trivial powers
        PatternRule::new("pow_zero", 95, ID, pow(any(A), lit(0)), |_| Some(Expr::integer(1)))
            .when(|b| b.get(A).is_some_and(|a| !a.is_zero()))
            .boxed(),
        PatternRule::new("pow_one", 95, ID, pow(any(A), lit(1)), |b| b.arc(A).map(Expr::unshare)).boxed(),
        PatternRule::new("one_pow", 95, ID, pow(lit(1), any(A)), |_| Some(Expr::integer(1))).boxed(),
        PatternRule::new("zero_pow", 95, ID, pow(lit(0), konst(A)), |_| Some(Expr::integer(0)))
            .when(|b| b.number(A).is_some_and(|n| n.to_f64().is_some_and(|x| x > 0.0)))
            .boxed(),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use crate::{Expr, var};

    #[test]
    fn test_additive_identities() {
        let x = var("x");
        assert_eq!(Expr::sum(x.clone(), 0).inner_simplify(), x);
        assert_eq!(Expr::sum(0, x.clone()).inner_simplify(), x);
        assert_eq!(Expr::minus(x.clone(), 0).inner_simplify(), x);
        assert_eq!(Expr::minus(0, x.clone()).inner_simplify(), Expr::negate(x.clone()));
        assert_eq!(Expr::minus(x.clone(), x).inner_simplify(), Expr::integer(0));
    }

    #[test]
    fn test_multiplicative_identities() {
        let x = var("x");
        assert_eq!(Expr::mul(x.clone(), 0).inner_simplify(), Expr::integer(0));
        assert_eq!(Expr::mul(1, x.clone()).inner_simplify(), x);
        assert_eq!(Expr::negate(Expr::negate(x.clone())).inner_simplify(), x);
        assert_eq!(Expr::mul(x.clone(), x.clone()).inner_simplify(), Expr::pow(x, 2));
    }

    #[test]
    fn test_division_and_powers() {
        let x = var("x");
        assert_eq!(Expr::div(x.clone(), x.clone()).inner_simplify(), Expr::integer(1));
        assert_eq!(Expr::div(0, x.clone()).inner_simplify(), Expr::integer(0));
        assert_eq!(Expr::div(x.clone(), 1).inner_simplify(), x);
        assert_eq!(Expr::pow(x.clone(), 0).inner_simplify(), Expr::integer(1));
        assert_eq!(Expr::pow(x.clone(), 1).inner_simplify(), x);
        assert_eq!(Expr::pow(1, x.clone()).inner_simplify(), Expr::integer(1));
        assert_eq!(Expr::pow(0, 3).inner_simplify(), Expr::integer(0));
    }

    #[test]
    fn test_zero_over_zero_is_left_alone() {
        let e = Expr::div(0, 0);
        assert_eq!(e.inner_simplify(), e);
    }
}
