//! Structural hashing.
//!
//! A node's hash combines its own discriminant and payload with the
//! precomputed hashes of its children, so hashing never recurses.

use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

use super::ExprKind;

/// Compute the structural hash of a node from its kind.
pub fn compute_expr_hash(kind: &ExprKind) -> u64 {
    let mut hasher = FxHasher::default();
    kind.hash(&mut hasher);
    hasher.finish()
}

impl Hash for ExprKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Number(n) => n.hash(state),
            Self::Variable(v) => v.hash(state),
            Self::Boolean(b) => b.hash(state),
            Self::Sum(a, b)
            | Self::Minus(a, b)
            | Self::Mul(a, b)
            | Self::Div(a, b)
            | Self::Pow(a, b)
            | Self::Log(a, b) => {
                a.hash.hash(state);
                b.hash.hash(state);
            }
            Self::Unary(func, a) => {
                func.hash(state);
                a.hash.hash(state);
            }
            Self::Derivative { expr, var, order } | Self::Integral { expr, var, order } => {
                expr.hash.hash(state);
                var.hash(state);
                order.hash(state);
            }
            Self::Limit {
                expr,
                var,
                point,
                side,
            } => {
                expr.hash.hash(state);
                var.hash(state);
                point.hash.hash(state);
                side.hash(state);
            }
            Self::Not(a) => a.hash.hash(state),
            Self::Logic(op, a, b) => {
                op.hash(state);
                a.hash.hash(state);
                b.hash.hash(state);
            }
            Self::Compare(op, a, b) => {
                op.hash(state);
                a.hash.hash(state);
                b.hash.hash(state);
            }
        }
    }
}
