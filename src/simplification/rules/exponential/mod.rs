use std::sync::Arc;

use crate::core::expr::Expr;
use crate::simplification::patterns::dsl::*;
use crate::simplification::rules::{PatternRule, Rule, RuleCategory};

const LOG: RuleCategory = RuleCategory::Logarithm;
const COLLAPSE: RuleCategory = RuleCategory::LogarithmCollapse;

/// Logarithm rules: inner normalization plus the search-only collapse set
pub(crate) fn get_exponential_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        // log(b, 1) = 0
        PatternRule::new("log_one", 95, LOG, log(any(A), lit(1)), |_| Some(Expr::integer(0)))
            .when(|b| b.get(A).is_some_and(|a| !a.is_one()))
            .boxed(),
        // log(b, b) = 1
        PatternRule::new("log_self", 95, LOG, log(any(A), any(A)), |_| Some(Expr::integer(1)))
            .when(|b| b.get(A).is_some_and(|a| !a.is_one() && !a.is_zero()))
            .boxed(),
        // log(1/a, 1/b) = log(a, b)
        PatternRule::new(
            "log_reciprocal_both",
            72,
            LOG,
            log(div(lit(1), any(A)), div(lit(1), any(B))),
            |b| Some(Expr::log(b.arc(A)?, b.arc(B)?)),
        )
        .boxed(),
        // log(a, 1/b) = -log(a, b)
        PatternRule::new("log_reciprocal_argument", 70, LOG, log(any(A), div(lit(1), any(B))), |b| {
            Some(Expr::negate(Expr::log(b.arc(A)?, b.arc(B)?)))
        })
        .boxed(),
        // log(1/a, b) = -log(a, b)
        PatternRule::new("log_reciprocal_base", 70, LOG, log(div(lit(1), any(A)), any(B)), |b| {
            Some(Expr::negate(Expr::log(b.arc(A)?, b.arc(B)?)))
        })
        .boxed(),
        // log(b, y^p) = p * log(b, y)
        PatternRule::new("log_of_power", 70, LOG, log(any(A), pow(any(B), any(C))), |b| {
            Some(Expr::mul(b.arc(C)?, Expr::log(b.arc(A)?, b.arc(B)?)))
        })
        .boxed(),
        // Search-only: log(b, x) + log(b, y) = log(b, x*y)
        PatternRule::new(
            "log_sum_collapse",
            40,
            COLLAPSE,
            sum(log(any(A), any(B)), log(any(A), any(C))),
            |b| Some(Expr::log(b.arc(A)?, Expr::mul(b.arc(B)?, b.arc(C)?))),
        )
        .boxed(),
        // Search-only: log(b, x) - log(b, y) = log(b, x/y)
        PatternRule::new(
            "log_difference_collapse",
            40,
            COLLAPSE,
            minus(log(any(A), any(B)), log(any(A), any(C))),
            |b| Some(Expr::log(b.arc(A)?, Expr::div(b.arc(B)?, b.arc(C)?))),
        )
        .boxed(),
    ]
}
