//! Every templated rule keeps the value of the tree it rewrites.
//!
//! Templates are instantiated with concrete subtrees chosen per placeholder
//! type, both sides are evaluated at random positive points and compared.

#![allow(clippy::unwrap_used, reason = "Standard test relaxations")]

use quickcheck::{QuickCheck, TestResult};
use std::sync::Arc;

use crate::simplification::patterns::{Bindings, Pattern, Slot};
use crate::simplification::rules::{RuleContext, RuleRegistry};
use crate::{Complex64, Expr, Settings, var};

/// Candidates for a placeholder, positive at positive `x` and `y`
/// except where the placeholder demands a sign.
fn candidates(pattern: &Pattern) -> Vec<Expr> {
    let x = || var("x");
    let y = || var("y");
    match pattern {
        Pattern::Any(_) => vec![
            x(),
            y(),
            Expr::sum(x(), 1),
            Expr::mul(2, y()),
            Expr::mul(x(), y()),
            Expr::integer(3),
            Expr::rational(1, 2),
        ],
        Pattern::Const(_) => vec![Expr::integer(2), Expr::integer(3), Expr::rational(1, 2), Expr::rational(5, 3)],
        Pattern::Integer(_) => vec![Expr::integer(2), Expr::integer(3), Expr::integer(-1), Expr::integer(-2)],
        Pattern::NegativeInteger(_) => vec![Expr::integer(-1), Expr::integer(-3)],
        Pattern::PositiveInteger(_) => vec![Expr::integer(1), Expr::integer(2), Expr::integer(3)],
        Pattern::NegativeConst(_) => vec![Expr::integer(-2), Expr::rational(-1, 2)],
        Pattern::Variable(_) => vec![x(), y()],
        Pattern::Literal(_) | Pattern::Node(..) => vec![],
    }
}

/// Placeholders of a template in first-occurrence order.
fn placeholders(pattern: &Pattern, out: &mut Vec<(Slot, Pattern)>) {
    match pattern {
        Pattern::Node(_, children) => children.iter().for_each(|c| placeholders(c, out)),
        Pattern::Literal(_) => {}
        Pattern::Any(slot)
        | Pattern::Const(slot)
        | Pattern::Integer(slot)
        | Pattern::NegativeInteger(slot)
        | Pattern::PositiveInteger(slot)
        | Pattern::NegativeConst(slot)
        | Pattern::Variable(slot) => {
            if out.iter().all(|(s, _)| s != slot) {
                out.push((*slot, pattern.clone()));
            }
        }
    }
}

fn value_at(expr: &Expr, x: f64, y: f64) -> Option<Complex64> {
    let z = expr.substitute("x", x).substitute("y", y).eval().ok()?.to_complex64();
    (z.re.is_finite() && z.im.is_finite()).then_some(z)
}

#[test]
fn test_templated_rules_are_sound() {
    fn prop(choice: Vec<u8>, xs: u8, ys: u8) -> TestResult {
        let (x, y) = (0.25 + f64::from(xs) / 128.0, 0.25 + f64::from(ys) / 128.0);
        let context = RuleContext::new(Settings::current());
        let mut checked = 0;

        for rule in &RuleRegistry::global().rules {
            let Some(template) = rule.template() else {
                continue;
            };
            let mut slots = Vec::new();
            placeholders(template, &mut slots);
            let mut bindings = Bindings::default();
            for (i, (slot, kind)) in slots.iter().enumerate() {
                let pool = candidates(kind);
                let pick = choice.get(i).copied().map_or(0, usize::from) % pool.len();
                bindings.insert(*slot, pool[pick].clone());
            }
            let Ok(before) = template.instantiate(&bindings) else {
                continue;
            };
            let before = Arc::new(before);
            let Some(after) = rule.apply(&before, &context) else {
                continue;
            };
            let (Some(lhs), Some(rhs)) = (value_at(&before, x, y), value_at(&after, x, y)) else {
                continue;
            };
            if (lhs - rhs).norm() > 1e-6 * lhs.norm().max(rhs.norm()).max(1.0) {
                eprintln!("{}: {} = {} but {} = {}", rule.name(), before, lhs, after, rhs);
                return TestResult::failed();
            }
            checked += 1;
        }
        TestResult::from_bool(checked > 0)
    }
    QuickCheck::new()
        .tests(100)
        .quickcheck(prop as fn(Vec<u8>, u8, u8) -> TestResult);
}
