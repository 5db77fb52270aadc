use std::sync::Arc;

use crate::core::expr::Expr;
use crate::simplification::patterns::dsl::*;
use crate::simplification::rules::{PatternRule, Rule, RuleCategory};

const FRACTIONS: RuleCategory = RuleCategory::Fractions;

/// Search-only: combine nested and added fractions into a single quotient.
pub(crate) fn get_fraction_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        // (a/b)/c = a/(b*c)
        PatternRule::new("div_of_div", 40, FRACTIONS, div(div(any(A), any(B)), any(C)), |b| {
            Some(Expr::div(b.arc(A)?, Expr::mul(b.arc(B)?, b.arc(C)?)))
        })
        .boxed(),
        // a/(b/c) = (a*c)/b
        PatternRule::new("div_by_div", 40, FRACTIONS, div(any(A), div(any(B), any(C))), |b| {
            Some(Expr::div(Expr::mul(b.arc(A)?, b.arc(C)?), b.arc(B)?))
        })
        .boxed(),
        // (a/b)*c = (a*c)/b
        PatternRule::new("div_times", 40, FRACTIONS, mul(div(any(A), any(B)), any(C)), |b| {
            Some(Expr::div(Expr::mul(b.arc(A)?, b.arc(C)?), b.arc(B)?))
        })
        .boxed(),
        // a*(b/c) = (a*b)/c
        PatternRule::new("times_div", 40, FRACTIONS, mul(any(A), div(any(B), any(C))), |b| {
            Some(Expr::div(Expr::mul(b.arc(A)?, b.arc(B)?), b.arc(C)?))
        })
        .boxed(),
        // a/b + c/b = (a+c)/b
        PatternRule::new(
            "add_same_denominator",
            45,
            FRACTIONS,
            sum(div(any(A), any(B)), div(any(C), any(B))),
            |b| Some(Expr::div(Expr::sum(b.arc(A)?, b.arc(C)?), b.arc(B)?)),
        )
        .boxed(),
        PatternRule::new(
            "sub_same_denominator",
            45,
            FRACTIONS,
            minus(div(any(A), any(B)), div(any(C), any(B))),
            |b| Some(Expr::div(Expr::minus(b.arc(A)?, b.arc(C)?), b.arc(B)?)),
        )
        .boxed(),
        // a/b + c/d = (a*d + c*b)/(b*d)
        PatternRule::new(
            "add_fractions",
            40,
            FRACTIONS,
            sum(div(any(A), any(B)), div(any(C), any(D))),
            |b| {
                let numerator = Expr::sum(
                    Expr::mul(b.arc(A)?, b.arc(D)?),
                    Expr::mul(b.arc(C)?, b.arc(B)?),
                );
                Some(Expr::div(numerator, Expr::mul(b.arc(B)?, b.arc(D)?)))
            },
        )
        .boxed(),
        PatternRule::new(
            "sub_fractions",
            40,
            FRACTIONS,
            minus(div(any(A), any(B)), div(any(C), any(D))),
            |b| {
                let numerator = Expr::minus(
                    Expr::mul(b.arc(A)?, b.arc(D)?),
                    Expr::mul(b.arc(C)?, b.arc(B)?),
                );
                Some(Expr::div(numerator, Expr::mul(b.arc(B)?, b.arc(D)?)))
            },
        )
        .boxed(),
        // a + b/c = (a*c + b)/c
        PatternRule::new("add_to_fraction", 35, FRACTIONS, sum(any(A), div(any(B), any(C))), |b| {
            let numerator = Expr::sum(Expr::mul(b.arc(A)?, b.arc(C)?), b.arc(B)?);
            Some(Expr::div(numerator, b.arc(C)?))
        })
        .boxed(),
    ]
}
