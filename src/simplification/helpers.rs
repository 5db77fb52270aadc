use std::sync::Arc;

use crate::core::expr::{Expr, ExprKind};
use crate::core::number::Number;

/// A summand with its sign: `negated` terms were reached through the right side of a `Minus`.
#[derive(Debug, Clone)]
pub(crate) struct Term {
    pub(crate) negated: bool,
    pub(crate) expr: Arc<Expr>,
}

/// Helper: Flatten nested `Sum` / `Minus` nodes into signed terms, left to right
pub(crate) fn flatten_terms(expr: &Arc<Expr>) -> Vec<Term> {
    let mut out = Vec::new();
    let mut stack = vec![(false, expr)];
    while let Some((negated, node)) = stack.pop() {
        match &node.kind {
            // pushed in reverse so the left operand is visited first
            ExprKind::Sum(a, b) => {
                stack.push((negated, b));
                stack.push((negated, a));
            }
            ExprKind::Minus(a, b) => {
                stack.push((!negated, b));
                stack.push((negated, a));
            }
            _ => out.push(Term {
                negated,
                expr: Arc::clone(node),
            }),
        }
    }
    out
}

/// Number of additive terms, without building the list.
pub(crate) fn term_count(expr: &Expr) -> usize {
    let mut count = 0;
    let mut stack = vec![expr];
    while let Some(node) = stack.pop() {
        match &node.kind {
            ExprKind::Sum(a, b) | ExprKind::Minus(a, b) => {
                stack.push(a);
                stack.push(b);
            }
            _ => count += 1,
        }
    }
    count
}

/// Helper: Rebuild a left-associative chain of `Sum` / `Minus` nodes
pub(crate) fn rebuild_terms(terms: Vec<Term>) -> Expr {
    let mut iter = terms.into_iter();
    let Some(first) = iter.next() else {
        return Expr::integer(0);
    };
    let mut acc = if first.negated {
        Expr::negate(first.expr)
    } else {
        Expr::unshare(first.expr)
    };
    for term in iter {
        acc = if term.negated {
            Expr::minus(acc, term.expr)
        } else {
            Expr::sum(acc, term.expr)
        };
    }
    acc
}

/// Helper: Flatten nested multiplication into a list of factors
pub(crate) fn flatten_factors(expr: &Arc<Expr>) -> Vec<Arc<Expr>> {
    let mut out = Vec::new();
    let mut stack = vec![expr];
    while let Some(node) = stack.pop() {
        if let ExprKind::Mul(a, b) = &node.kind {
            stack.push(b);
            stack.push(a);
        } else {
            out.push(Arc::clone(node));
        }
    }
    out
}

/// Helper: Rebuild a left-associative multiplication; an empty list is `1`
pub(crate) fn rebuild_product(factors: Vec<Arc<Expr>>) -> Expr {
    let mut iter = factors.into_iter();
    let Some(first) = iter.next() else {
        return Expr::integer(1);
    };
    iter.fold(Expr::unshare(first), |acc, factor| Expr::mul(acc, factor))
}

/// Helper to split off a numeric coefficient
/// e.g. 2*x -> (2, x)
///      x*3 -> (3, x)
///      x   -> (1, x)
pub(crate) fn split_coefficient(expr: &Arc<Expr>) -> (Number, Arc<Expr>) {
    if let ExprKind::Mul(a, b) = &expr.kind {
        if let Some(n) = a.as_number() {
            return (n.clone(), Arc::clone(b));
        }
        if let Some(n) = b.as_number() {
            return (n.clone(), Arc::clone(a));
        }
    }
    (Number::one(), Arc::clone(expr))
}

/// `coefficient * expr`, leaving out a unit coefficient.
pub(crate) fn with_coefficient(coefficient: Number, expr: Arc<Expr>) -> Expr {
    if coefficient.is_one() {
        Expr::unshare(expr)
    } else {
        Expr::mul(coefficient, expr)
    }
}
