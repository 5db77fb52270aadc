use std::sync::Arc;

use crate::core::expr::Expr;
use crate::simplification::patterns::Bindings;
use crate::simplification::patterns::dsl::*;
use crate::simplification::rules::{PatternRule, Rule, RuleCategory};

const POWER: RuleCategory = RuleCategory::Power;
const NEGATIVE_POWERS: RuleCategory = RuleCategory::NegativePowers;

fn non_number_bases(b: &Bindings) -> bool {
    b.get(A).is_some_and(|a| !a.is_number()) && b.get(B).is_some_and(|b| !b.is_number())
}

pub(crate) fn get_power_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        // a^(-1) = 1/a
        PatternRule::new("pow_minus_one", 75, POWER, pow(any(A), lit(-1)), |b| {
            Some(Expr::div(1, b.arc(A)?))
        })
        .boxed(),
        // a^n * a^m = a^(n+m)
        PatternRule::new(
            "pow_mul_same_base",
            70,
            POWER,
            mul(pow(any(A), any(B)), pow(any(A), any(C))),
            |b| Some(Expr::pow(b.arc(A)?, Expr::sum(b.arc(B)?, b.arc(C)?))),
        )
        .boxed(),
        // a^n * a = a^(n+1)
        PatternRule::new("pow_mul_base", 70, POWER, mul(pow(any(A), any(B)), any(A)), |b| {
            Some(Expr::pow(b.arc(A)?, Expr::sum(b.arc(B)?, 1)))
        })
        .boxed(),
        PatternRule::new("base_mul_pow", 70, POWER, mul(any(A), pow(any(A), any(B))), |b| {
            Some(Expr::pow(b.arc(A)?, Expr::sum(b.arc(B)?, 1)))
        })
        .boxed(),
        // a^n / a^m = a^(n-m)
        PatternRule::new(
            "pow_div_same_base",
            70,
            POWER,
            div(pow(any(A), any(B)), pow(any(A), any(C))),
            |b| Some(Expr::pow(b.arc(A)?, Expr::minus(b.arc(B)?, b.arc(C)?))),
        )
        .boxed(),
        // a / a^n = a^(1-n), a^n / a = a^(n-1)
        PatternRule::new("base_div_pow", 70, POWER, div(any(A), pow(any(A), any(B))), |b| {
            Some(Expr::pow(b.arc(A)?, Expr::minus(1, b.arc(B)?)))
        })
        .boxed(),
        PatternRule::new("pow_div_base", 70, POWER, div(pow(any(A), any(B)), any(A)), |b| {
            Some(Expr::pow(b.arc(A)?, Expr::minus(b.arc(B)?, 1)))
        })
        .boxed(),
        // a * (b / a) = b
        PatternRule::new("mul_reciprocal_right", 70, POWER, mul(any(A), div(any(B), any(A))), |b| {
            b.arc(B).map(Expr::unshare)
        })
        .when(|b| b.get(A).is_some_and(|a| !a.is_zero()))
        .boxed(),
        PatternRule::new("mul_reciprocal_left", 70, POWER, mul(div(any(B), any(A)), any(A)), |b| {
            b.arc(B).map(Expr::unshare)
        })
        .when(|b| b.get(A).is_some_and(|a| !a.is_zero()))
        .boxed(),
        // (a^b)^c = a^(b*c)
        PatternRule::new("pow_of_pow", 70, POWER, pow(pow(any(A), any(B)), any(C)), |b| {
            Some(Expr::pow(b.arc(A)?, Expr::mul(b.arc(B)?, b.arc(C)?)))
        })
        .boxed(),
        // a^n * (a * b) = a^(n+1) * b
        PatternRule::new(
            "pow_mul_base_product",
            68,
            POWER,
            mul(pow(any(A), any(B)), mul(any(A), any(C))),
            |b| {
                let power = Expr::pow(b.arc(A)?, Expr::sum(b.arc(B)?, 1));
                Some(Expr::mul(power, b.arc(C)?))
            },
        )
        .boxed(),
        // a^n * (a^m * b) = a^(n+m) * b
        PatternRule::new(
            "pow_mul_pow_product",
            68,
            POWER,
            mul(pow(any(A), any(B)), mul(pow(any(A), any(C)), any(D))),
            |b| {
                let power = Expr::pow(b.arc(A)?, Expr::sum(b.arc(B)?, b.arc(C)?));
                Some(Expr::mul(power, b.arc(D)?))
            },
        )
        .boxed(),
        // a * (a * b) = a^2 * b
        PatternRule::new("base_mul_base_product", 68, POWER, mul(any(A), mul(any(A), any(B))), |b| {
            Some(Expr::mul(Expr::pow(b.arc(A)?, 2), b.arc(B)?))
        })
        .boxed(),
        // (c/a)^n * a = c^n * a^(1-n)
        PatternRule::new(
            "quotient_pow_mul_base",
            66,
            POWER,
            mul(pow(div(konst(C), any(A)), any(B)), any(A)),
            |b| {
                let numerator = Expr::pow(b.arc(C)?, b.arc(B)?);
                Some(Expr::mul(numerator, Expr::pow(b.arc(A)?, Expr::minus(1, b.arc(B)?))))
            },
        )
        .boxed(),
        // (c/a)^n * a^m = c^n * a^(m-n)
        PatternRule::new(
            "quotient_pow_mul_pow",
            66,
            POWER,
            mul(pow(div(konst(C), any(A)), any(B)), pow(any(A), any(D))),
            |b| {
                let numerator = Expr::pow(b.arc(C)?, b.arc(B)?);
                let exponent = Expr::minus(b.arc(D)?, b.arc(B)?);
                Some(Expr::mul(numerator, Expr::pow(b.arc(A)?, exponent)))
            },
        )
        .boxed(),
        // a^n * b^n = (a*b)^n, symbolic bases only
        PatternRule::new(
            "pow_mul_same_exponent",
            65,
            POWER,
            mul(pow(any(A), any(C)), pow(any(B), any(C))),
            |b| Some(Expr::pow(Expr::mul(b.arc(A)?, b.arc(B)?), b.arc(C)?)),
        )
        .when(non_number_bases)
        .boxed(),
        // a^n / b^n = (a/b)^n, symbolic bases only
        PatternRule::new(
            "pow_div_same_exponent",
            65,
            POWER,
            div(pow(any(A), any(C)), pow(any(B), any(C))),
            |b| Some(Expr::pow(Expr::div(b.arc(A)?, b.arc(B)?), b.arc(C)?)),
        )
        .when(non_number_bases)
        .boxed(),
        // (a*x)^c = a^c * x^c for constant a and c
        PatternRule::new(
            "const_product_pow",
            65,
            POWER,
            pow(mul(konst(A), any(B)), konst(C)),
            |b| {
                let constant = Expr::pow(b.arc(A)?, b.arc(C)?);
                Some(Expr::mul(constant, Expr::pow(b.arc(B)?, b.arc(C)?)))
            },
        )
        .boxed(),
        // (a/b)/b = a/b^2
        PatternRule::new("div_div_same", 62, POWER, div(div(any(A), any(B)), any(B)), |b| {
            Some(Expr::div(b.arc(A)?, Expr::pow(b.arc(B)?, 2)))
        })
        .boxed(),
        // (a/b)/b^n = a/b^(n+1)
        PatternRule::new(
            "div_div_pow",
            62,
            POWER,
            div(div(any(A), any(B)), pow(any(B), any(C))),
            |b| Some(Expr::div(b.arc(A)?, Expr::pow(b.arc(B)?, Expr::sum(b.arc(C)?, 1)))),
        )
        .boxed(),
        // c^log(c, a) = a
        PatternRule::new("pow_of_log", 60, POWER, pow(any(C), log(any(C), any(A))), |b| {
            b.arc(A).map(Expr::unshare)
        })
        .boxed(),
        // a^(b / log(c, a)) = c^b
        PatternRule::new(
            "pow_over_log",
            60,
            POWER,
            pow(any(A), div(any(B), log(any(C), any(A)))),
            |b| Some(Expr::pow(b.arc(C)?, b.arc(B)?)),
        )
        .boxed(),
        // x * a^n = a^n * x
        PatternRule::new("variable_before_pow", 55, POWER, mul(variable(A), pow(any(B), any(C))), |b| {
            Some(Expr::mul(Expr::pow(b.arc(B)?, b.arc(C)?), b.arc(A)?))
        })
        .boxed(),
    ]
}

/// Search-only: move negative exponents into denominators.
pub(crate) fn get_negative_power_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        PatternRule::new("negative_pow_to_fraction", 40, NEGATIVE_POWERS, pow(any(A), neg_const(B)), |b| {
            let exponent = -b.number(B)?;
            Some(Expr::div(1, Expr::pow(b.arc(A)?, exponent)))
        })
        .boxed(),
        PatternRule::new(
            "mul_unit_fraction_right",
            40,
            NEGATIVE_POWERS,
            mul(any(A), div(lit(1), any(B))),
            |b| Some(Expr::div(b.arc(A)?, b.arc(B)?)),
        )
        .boxed(),
        PatternRule::new(
            "mul_unit_fraction_left",
            40,
            NEGATIVE_POWERS,
            mul(div(lit(1), any(B)), any(A)),
            |b| Some(Expr::div(b.arc(A)?, b.arc(B)?)),
        )
        .boxed(),
    ]
}

#[cfg(test)]
mod tests {
    use crate::{Expr, var};

    #[test]
    fn test_pow_of_pow() {
        let x = var("x");
        assert_eq!(Expr::pow(Expr::pow(x.clone(), 2), 3).inner_simplify(), Expr::pow(x, 6));
    }

    #[test]
    fn test_same_base_products_and_quotients() {
        let x = var("x");
        let e = Expr::mul(Expr::pow(x.clone(), 2), Expr::pow(x.clone(), 3));
        assert_eq!(e.inner_simplify(), Expr::pow(x.clone(), 5));
        let e = Expr::div(Expr::pow(x.clone(), 5), Expr::pow(x.clone(), 2));
        assert_eq!(e.inner_simplify(), Expr::pow(x.clone(), 3));
        let e = Expr::mul(Expr::pow(x.clone(), 2), x.clone());
        assert_eq!(e.inner_simplify(), Expr::pow(x.clone(), 3));
        let e = Expr::div(x.clone(), Expr::pow(x.clone(), 3));
        assert_eq!(e.inner_simplify(), Expr::pow(x.clone(), -2));
        let e = Expr::div(Expr::pow(x.clone(), 2), Expr::pow(x.clone(), 3));
        assert_eq!(e.inner_simplify(), Expr::div(1, x));
    }

    #[test]
    fn test_same_exponent_products() {
        let (x, y) = (var("x"), var("y"));
        let e = Expr::mul(Expr::pow(x.clone(), 2), Expr::pow(y.clone(), 2));
        assert_eq!(e.inner_simplify(), Expr::pow(Expr::mul(x.clone(), y.clone()), 2));
        let e = Expr::div(Expr::pow(x.clone(), 3), Expr::pow(y.clone(), 3));
        assert_eq!(e.inner_simplify(), Expr::pow(Expr::div(x, y), 3));
    }

    #[test]
    fn test_constant_factor_is_pulled_out_of_power() {
        let x = var("x");
        let e = Expr::pow(Expr::mul(2, x.clone()), 3);
        assert_eq!(e.inner_simplify(), Expr::mul(8, Expr::pow(x, 3)));
    }

    #[test]
    fn test_power_of_logarithm() {
        let (a, c) = (var("a"), var("c"));
        let e = Expr::pow(c.clone(), Expr::log(c.clone(), a.clone()));
        assert_eq!(e.inner_simplify(), a);
        let e = Expr::pow(var("a"), Expr::div(var("b"), Expr::log(c.clone(), var("a"))));
        assert_eq!(e.inner_simplify(), Expr::pow(c, var("b")));
    }

    #[test]
    fn test_variable_moves_after_power() {
        let (x, y) = (var("x"), var("y"));
        let e = Expr::mul(x.clone(), Expr::pow(y.clone(), 2));
        assert_eq!(e.inner_simplify(), Expr::mul(Expr::pow(y, 2), x));
    }

    #[test]
    fn test_reciprocal() {
        let x = var("x");
        assert_eq!(Expr::pow(x.clone(), -1).inner_simplify(), Expr::div(1, x.clone()));
        let e = Expr::mul(x.clone(), Expr::div(var("y"), x));
        assert_eq!(e.inner_simplify(), var("y"));
    }
}
