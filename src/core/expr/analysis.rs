//! Memoized structural properties and traversal helpers.
//!
//! Every property here is a pure function of the node's own kind and its
//! children's (memoized) values, computed on first access and cached in the
//! node's `OnceLock` cells.

use num::{One, Signed};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{Expr, ExprKind};
use crate::core::known_symbols::Variable;

/// Simplification weights, lower total rate means simpler.
mod weights {
    pub const NODE: f64 = 2.0;
    pub const VARIABLE: f64 = 2.0;
    pub const DIVISION: f64 = 1.0;
    pub const UNIT_FRACTION: f64 = 2.0;
    pub const NEGATIVE_POWER: f64 = 8.0;
    pub const LOGARITHM: f64 = 0.5;
    pub const NEGATIVE_NUMBER: f64 = 4.0;
    pub const COMPARISON_WITH_ZERO: f64 = 2.0;
}

impl Expr {
    /// Number of nodes in the tree.
    pub fn complexity(&self) -> usize {
        *self
            .memo
            .complexity
            .get_or_init(|| 1 + self.children().iter().map(|c| c.complexity()).sum::<usize>())
    }

    /// Whether no numeric leaf is infinite or NaN.
    pub fn is_finite(&self) -> bool {
        *self.memo.is_finite.get_or_init(|| match &self.kind {
            ExprKind::Number(n) => n.is_finite(),
            _ => self.children().iter().all(|c| c.is_finite()),
        })
    }

    /// Distinct symbols (free variables and constants) occurring in the tree.
    pub fn vars_and_consts(&self) -> Arc<BTreeSet<Variable>> {
        Arc::clone(self.memo.symbols.get_or_init(|| {
            let mut set = BTreeSet::new();
            match &self.kind {
                ExprKind::Variable(v) => {
                    set.insert(v.clone());
                }
                ExprKind::Derivative { var, .. }
                | ExprKind::Integral { var, .. }
                | ExprKind::Limit { var, .. } => {
                    set.insert(var.clone());
                }
                _ => {}
            }
            for child in self.children() {
                set.extend(child.vars_and_consts().iter().cloned());
            }
            Arc::new(set)
        }))
    }

    /// Free variables (constants excluded), sorted by name.
    pub fn free_variables(&self) -> Vec<Variable> {
        self.vars_and_consts()
            .iter()
            .filter(|v| !v.is_constant())
            .cloned()
            .collect()
    }

    /// Whether `var` occurs anywhere in the tree.
    pub fn contains_variable(&self, var: &Variable) -> bool {
        self.vars_and_consts().contains(var)
    }

    /// Simplicity score used by `simplify` to rank candidates.
    pub fn simplified_rate(&self) -> f64 {
        *self.memo.rate.get_or_init(|| {
            self.own_rate() + self.children().iter().map(|c| c.simplified_rate()).sum::<f64>()
        })
    }

    fn own_rate(&self) -> f64 {
        let mut rate = weights::NODE;
        match &self.kind {
            ExprKind::Variable(_) => rate += weights::VARIABLE,
            ExprKind::Number(n) => {
                if n.is_negative() {
                    rate += weights::NEGATIVE_NUMBER;
                }
                if let Some(r) = n.as_ratio()
                    && !r.is_integer()
                    && r.numer().abs().is_one()
                {
                    rate += weights::UNIT_FRACTION;
                }
            }
            ExprKind::Div(..) => rate += weights::DIVISION,
            ExprKind::Pow(_, exponent) => {
                if exponent.as_number().is_some_and(|n| n.is_negative()) {
                    rate += weights::NEGATIVE_POWER;
                }
            }
            ExprKind::Log(..) => rate += weights::LOGARITHM,
            ExprKind::Compare(_, first, _) => {
                if first.is_zero() {
                    rate += weights::COMPARISON_WITH_ZERO;
                }
            }
            ExprKind::Boolean(_)
            | ExprKind::Sum(..)
            | ExprKind::Minus(..)
            | ExprKind::Mul(..)
            | ExprKind::Unary(..)
            | ExprKind::Derivative { .. }
            | ExprKind::Integral { .. }
            | ExprKind::Limit { .. }
            | ExprKind::Not(_)
            | ExprKind::Logic(..) => {}
        }
        rate
    }

    /// Pre-order traversal of every node, duplicates included.
    pub fn nodes(&self) -> Nodes<'_> {
        Nodes { stack: vec![self] }
    }

    /// Whether `needle` occurs as a subtree.
    pub fn contains(&self, needle: &Expr) -> bool {
        if needle.complexity() > self.complexity() {
            return false;
        }
        self.nodes().any(|node| node == needle)
    }
}

/// Pre-order iterator returned by [`Expr::nodes`].
pub struct Nodes<'a> {
    stack: Vec<&'a Expr>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a Expr;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().into_iter().rev().map(|c| &**c));
        Some(node)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, reason = "Standard test relaxations")]
mod tests {
    use crate::{Expr, Variable, var};

    #[test]
    fn test_complexity_counts_nodes() {
        let e = Expr::sum(Expr::pow(var("x"), 2), Expr::sin(var("y")));
        assert_eq!(e.complexity(), 6);
        assert_eq!(e.nodes().count(), 6);
    }

    #[test]
    fn test_nodes_outlive_the_child_view() {
        // sin(x) - 2
        let e = Expr::minus(Expr::sin(var("x")), 2);
        let order: Vec<&Expr> = e.nodes().collect();
        assert_eq!(
            order,
            [&e, &Expr::sin(var("x")), &var("x"), &Expr::integer(2)]
        );
    }

    #[test]
    fn test_symbols() {
        let e = Expr::mul(Expr::pi(), Expr::sum(var("y"), var("x")));
        let names: Vec<_> = e.vars_and_consts().iter().map(|v| v.name().to_string()).collect();
        assert_eq!(names, ["pi", "x", "y"]);
        assert_eq!(e.free_variables(), vec![Variable::new("x"), Variable::new("y")]);
        assert!(e.contains_variable(&Variable::pi()));
    }

    #[test]
    fn test_finiteness() {
        assert!(Expr::sum(var("x"), 1).is_finite());
        assert!(!Expr::sum(var("x"), f64::INFINITY).is_finite());
    }

    #[test]
    fn test_rate_prefers_fewer_variables_and_no_negatives() {
        let x = var("x");
        // node weight 2 + variable weight 2
        assert_eq!(x.simplified_rate(), 4.0);
        // 1/2 is a unit fraction: 2 + 2
        assert_eq!(Expr::rational(1, 2).simplified_rate(), 4.0);
        // -3: 2 + 4
        assert_eq!(Expr::integer(-3).simplified_rate(), 6.0);
        // x ^ -1: pow node 2 + 8, x 4, -1 6
        assert_eq!(Expr::pow(x.clone(), -1).simplified_rate(), 20.0);
        // 1 / x: div node 3, 1 -> 2, x -> 4
        assert_eq!(Expr::div(1, x).simplified_rate(), 9.0);
    }

    #[test]
    fn test_preorder_and_contains() {
        let e = Expr::minus(Expr::sin(var("x")), var("y"));
        let order: Vec<String> = e.nodes().map(ToString::to_string).collect();
        assert_eq!(order, ["sin(x) - y", "sin(x)", "x", "y"]);
        assert!(e.contains(&Expr::sin(var("x"))));
        assert!(!e.contains(&Expr::cos(var("x"))));
    }
}
