use std::sync::Arc;

use crate::core::expr::Expr;
use crate::core::expr::UnaryFn::{self, Abs, Arccos, Arccotan, Arcsin, Arctan, Cos, Cotan, Signum, Sin, Tan};
use crate::simplification::patterns::Pattern;
use crate::simplification::patterns::dsl::*;
use crate::simplification::rules::{PatternRule, Rule, RuleCategory};

const FUNCTION: RuleCategory = RuleCategory::Function;
const TRIG: RuleCategory = RuleCategory::Trigonometric;
const TRIG_EXPANSION: RuleCategory = RuleCategory::TrigonometricExpansion;

/// Function identities applied by InnerSimplify.
fn function_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        PatternRule::new("abs_abs", 80, FUNCTION, func(Abs, func(Abs, any(A))), |b| {
            Some(Expr::abs(b.arc(A)?))
        })
        .boxed(),
        PatternRule::new("abs_negated", 80, FUNCTION, func(Abs, mul(lit(-1), any(A))), |b| {
            Some(Expr::abs(b.arc(A)?))
        })
        .boxed(),
        PatternRule::new("signum_signum", 80, FUNCTION, func(Signum, func(Signum, any(A))), |b| {
            Some(Expr::signum(b.arc(A)?))
        })
        .boxed(),
        // f(f^-1(a)) = a
        PatternRule::new("sin_arcsin", 80, FUNCTION, func(Sin, func(Arcsin, any(A))), |b| {
            b.arc(A).map(Expr::unshare)
        })
        .boxed(),
        PatternRule::new("cos_arccos", 80, FUNCTION, func(Cos, func(Arccos, any(A))), |b| {
            b.arc(A).map(Expr::unshare)
        })
        .boxed(),
        PatternRule::new("tan_arctan", 80, FUNCTION, func(Tan, func(Arctan, any(A))), |b| {
            b.arc(A).map(Expr::unshare)
        })
        .boxed(),
        PatternRule::new("cotan_arccotan", 80, FUNCTION, func(Cotan, func(Arccotan, any(A))), |b| {
            b.arc(A).map(Expr::unshare)
        })
        .boxed(),
        // parity
        PatternRule::new("sin_odd", 78, FUNCTION, func(Sin, mul(lit(-1), any(A))), |b| {
            Some(Expr::negate(Expr::sin(b.arc(A)?)))
        })
        .boxed(),
        PatternRule::new("cos_even", 78, FUNCTION, func(Cos, mul(lit(-1), any(A))), |b| {
            Some(Expr::cos(b.arc(A)?))
        })
        .boxed(),
        PatternRule::new("tan_odd", 78, FUNCTION, func(Tan, mul(lit(-1), any(A))), |b| {
            Some(Expr::negate(Expr::tan(b.arc(A)?)))
        })
        .boxed(),
        PatternRule::new("cotan_odd", 78, FUNCTION, func(Cotan, mul(lit(-1), any(A))), |b| {
            Some(Expr::negate(Expr::cotan(b.arc(A)?)))
        })
        .boxed(),
    ]
}

fn squared(f: UnaryFn) -> Pattern {
    pow(func(f, any(A)), lit(2))
}

/// Trigonometric normal forms, search-only.
fn identity_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        // sin^2 + cos^2 = 1
        PatternRule::new("pythagorean_sin_cos", 45, TRIG, sum(squared(Sin), squared(Cos)), |_| {
            Some(Expr::integer(1))
        })
        .boxed(),
        PatternRule::new("pythagorean_cos_sin", 45, TRIG, sum(squared(Cos), squared(Sin)), |_| {
            Some(Expr::integer(1))
        })
        .boxed(),
        // 1 - sin^2 = cos^2, 1 - cos^2 = sin^2
        PatternRule::new("one_minus_sin_squared", 45, TRIG, minus(lit(1), squared(Sin)), |b| {
            Some(Expr::pow(Expr::cos(b.arc(A)?), 2))
        })
        .boxed(),
        PatternRule::new("one_minus_cos_squared", 45, TRIG, minus(lit(1), squared(Cos)), |b| {
            Some(Expr::pow(Expr::sin(b.arc(A)?), 2))
        })
        .boxed(),
        // cos^2 - sin^2 = cos(2a)
        PatternRule::new("cos_double_angle", 45, TRIG, minus(squared(Cos), squared(Sin)), |b| {
            Some(Expr::cos(Expr::mul(2, b.arc(A)?)))
        })
        .boxed(),
        // sin*cos = sin(2a)/2
        PatternRule::new(
            "sin_double_angle",
            42,
            TRIG,
            mul(func(Sin, any(A)), func(Cos, any(A))),
            |b| Some(Expr::div(Expr::sin(Expr::mul(2, b.arc(A)?)), 2)),
        )
        .boxed(),
        PatternRule::new(
            "sin_double_angle_swapped",
            42,
            TRIG,
            mul(func(Cos, any(A)), func(Sin, any(A))),
            |b| Some(Expr::div(Expr::sin(Expr::mul(2, b.arc(A)?)), 2)),
        )
        .boxed(),
        // sin/cos = tan, cos/sin = cotan
        PatternRule::new("sin_over_cos", 45, TRIG, div(func(Sin, any(A)), func(Cos, any(A))), |b| {
            Some(Expr::tan(b.arc(A)?))
        })
        .boxed(),
        PatternRule::new("cos_over_sin", 45, TRIG, div(func(Cos, any(A)), func(Sin, any(A))), |b| {
            Some(Expr::cotan(b.arc(A)?))
        })
        .boxed(),
        // tan*cos = sin, cotan*sin = cos
        PatternRule::new("tan_times_cos", 45, TRIG, mul(func(Tan, any(A)), func(Cos, any(A))), |b| {
            Some(Expr::sin(b.arc(A)?))
        })
        .boxed(),
        PatternRule::new("cos_times_tan", 45, TRIG, mul(func(Cos, any(A)), func(Tan, any(A))), |b| {
            Some(Expr::sin(b.arc(A)?))
        })
        .boxed(),
        PatternRule::new(
            "cotan_times_sin",
            45,
            TRIG,
            mul(func(Cotan, any(A)), func(Sin, any(A))),
            |b| Some(Expr::cos(b.arc(A)?)),
        )
        .boxed(),
        PatternRule::new(
            "sin_times_cotan",
            45,
            TRIG,
            mul(func(Sin, any(A)), func(Cotan, any(A))),
            |b| Some(Expr::cos(b.arc(A)?)),
        )
        .boxed(),
    ]
}

/// Rewrite tan and cotan through sin and cos, search-only.
fn expansion_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        PatternRule::new("tan_to_sin_cos", 40, TRIG_EXPANSION, func(Tan, any(A)), |b| {
            Some(Expr::div(Expr::sin(b.arc(A)?), Expr::cos(b.arc(A)?)))
        })
        .boxed(),
        PatternRule::new("cotan_to_cos_sin", 40, TRIG_EXPANSION, func(Cotan, any(A)), |b| {
            Some(Expr::div(Expr::cos(b.arc(A)?), Expr::sin(b.arc(A)?)))
        })
        .boxed(),
    ]
}

pub(crate) fn get_trigonometric_rules() -> Vec<Arc<dyn Rule>> {
    let mut rules = function_rules();
    rules.extend(identity_rules());
    rules.extend(expansion_rules());
    rules
}

#[cfg(test)]
mod tests {
    use crate::{Expr, var};

    #[test]
    fn test_function_identities() {
        let x = var("x");
        assert_eq!(Expr::abs(Expr::abs(x.clone())).inner_simplify(), Expr::abs(x.clone()));
        assert_eq!(Expr::abs(Expr::negate(x.clone())).inner_simplify(), Expr::abs(x.clone()));
        assert_eq!(Expr::signum(Expr::signum(x.clone())).inner_simplify(), Expr::signum(x.clone()));
        assert_eq!(Expr::sin(Expr::arcsin(x.clone())).inner_simplify(), x);
    }

    #[test]
    fn test_parity() {
        let x = var("x");
        assert_eq!(Expr::cos(Expr::negate(x.clone())).inner_simplify(), Expr::cos(x.clone()));
        assert_eq!(
            Expr::sin(Expr::negate(x.clone())).inner_simplify(),
            Expr::negate(Expr::sin(x))
        );
    }

    #[test]
    fn test_pythagorean_identity_by_search() {
        let x = var("x");
        let e = Expr::sum(Expr::pow(Expr::sin(x.clone()), 2), Expr::pow(Expr::cos(x), 2));
        assert_eq!(e.clone().inner_simplify(), e);
        assert_eq!(e.simplify(), Expr::integer(1));
    }

    #[test]
    fn test_quotient_to_tangent_by_search() {
        let x = var("x");
        let e = Expr::div(Expr::sin(x.clone()), Expr::cos(x.clone()));
        assert_eq!(e.simplify(), Expr::tan(x));
    }
}
