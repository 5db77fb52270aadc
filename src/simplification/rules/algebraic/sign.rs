use std::sync::Arc;

use crate::core::expr::Expr;
use crate::simplification::patterns::dsl::*;
use crate::simplification::rules::{PatternRule, Rule, RuleCategory};

const SIGN: RuleCategory = RuleCategory::Sign;

/// Turn added negative multiples into subtractions.
pub(crate) fn get_sign_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        // a + (c * b) = a - ((-c) * b) for a negative constant c
        PatternRule::new(
            "sum_negative_multiple",
            50,
            SIGN,
            sum(any(A), mul(neg_const(C), any(B))),
            |b| {
                let positive = -b.number(C)?;
                Some(Expr::minus(b.arc(A)?, Expr::mul(positive, b.arc(B)?)))
            },
        )
        .boxed(),
        // a + c = a - (-c) for a negative constant c
        PatternRule::new("sum_negative_constant", 50, SIGN, sum(any(A), neg_const(C)), |b| {
            let positive = -b.number(C)?;
            Some(Expr::minus(b.arc(A)?, positive))
        })
        .boxed(),
    ]
}
