//! Pattern matching for rewrite rules.
//!
//! A [`Pattern`] mirrors the shape of an expression. Leaves of a pattern are
//! typed placeholders identified by a small slot number; matching is a single
//! deterministic top-down walk without backtracking. A slot used twice only
//! matches structurally equal subtrees.

use smallvec::SmallVec;
use std::sync::Arc;

use crate::core::error::MathError;
use crate::core::expr::{Expr, ExprKind, NodeTag};
use crate::core::number::{Number, NumberLevel};

/// Placeholder identifier.
pub(crate) type Slot = u8;

#[derive(Debug, Clone)]
pub(crate) enum Pattern {
    /// Any subtree
    Any(Slot),
    /// Any number
    Const(Slot),
    /// Any integer
    Integer(Slot),
    /// A strictly negative integer
    NegativeInteger(Slot),
    /// A strictly positive integer
    PositiveInteger(Slot),
    /// A strictly negative real number
    NegativeConst(Slot),
    /// Any variable (constants included)
    Variable(Slot),
    /// Exactly this number
    Literal(Number),
    /// A node of the given kind whose children match in order
    Node(NodeTag, Vec<Pattern>),
}

/// Subtrees captured by a successful match.
#[derive(Debug, Clone, Default)]
pub(crate) struct Bindings {
    slots: SmallVec<[(Slot, Arc<Expr>); 4]>,
}

impl Bindings {
    /// Bind `slot`, or check the existing binding is structurally equal.
    fn bind(&mut self, slot: Slot, expr: &Arc<Expr>) -> bool {
        match self.slots.iter().find(|(s, _)| *s == slot) {
            Some((_, bound)) => bound == expr,
            None => {
                self.slots.push((slot, Arc::clone(expr)));
                true
            }
        }
    }

    pub(crate) fn get(&self, slot: Slot) -> Option<&Arc<Expr>> {
        self.slots.iter().find(|(s, _)| *s == slot).map(|(_, e)| e)
    }

    /// The number bound to `slot`, if the binding is a number.
    pub(crate) fn number(&self, slot: Slot) -> Option<&Number> {
        self.get(slot)?.as_number()
    }

    /// Shared handle to the subtree bound to `slot`.
    ///
    /// A missing slot means the replacement refers to a slot its template
    /// never binds; the rule is then skipped.
    pub(crate) fn arc(&self, slot: Slot) -> Option<Arc<Expr>> {
        self.get(slot).cloned()
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, slot: Slot, expr: Expr) {
        self.slots.push((slot, Arc::new(expr)));
    }
}

impl Pattern {
    /// Match against the top of `expr`.
    pub(crate) fn matches(&self, expr: &Arc<Expr>) -> Option<Bindings> {
        let mut bindings = Bindings::default();
        self.match_into(expr, &mut bindings).then_some(bindings)
    }

    fn match_into(&self, expr: &Arc<Expr>, bindings: &mut Bindings) -> bool {
        match self {
            Self::Any(slot) => bindings.bind(*slot, expr),
            Self::Const(slot) => expr.is_number() && bindings.bind(*slot, expr),
            Self::Integer(slot) => {
                expr.as_number().is_some_and(Number::is_integer) && bindings.bind(*slot, expr)
            }
            Self::NegativeInteger(slot) => {
                expr.as_number()
                    .is_some_and(|n| n.is_integer() && n.is_negative())
                    && bindings.bind(*slot, expr)
            }
            Self::PositiveInteger(slot) => {
                expr.as_number()
                    .is_some_and(|n| n.is_integer() && !n.is_negative() && !n.is_zero())
                    && bindings.bind(*slot, expr)
            }
            Self::NegativeConst(slot) => {
                expr.as_number().is_some_and(|n| {
                    n.level() != NumberLevel::Complex && n.is_negative()
                }) && bindings.bind(*slot, expr)
            }
            Self::Variable(slot) => {
                matches!(expr.kind(), ExprKind::Variable(_)) && bindings.bind(*slot, expr)
            }
            Self::Literal(n) => expr.as_number() == Some(n),
            Self::Node(tag, children) => {
                if expr.tag() != *tag {
                    return false;
                }
                let actual = expr.children();
                actual.len() == children.len()
                    && children
                        .iter()
                        .zip(actual)
                        .all(|(pattern, child)| pattern.match_into(child, bindings))
            }
        }
    }

    /// Tag of the pattern's root node, `None` for a bare placeholder.
    pub(crate) fn root_tag(&self) -> Option<NodeTag> {
        match self {
            Self::Node(tag, _) => Some(*tag),
            Self::Literal(_)
            | Self::Const(_)
            | Self::Integer(_)
            | Self::NegativeInteger(_)
            | Self::PositiveInteger(_)
            | Self::NegativeConst(_) => Some(NodeTag::Number),
            Self::Variable(_) => Some(NodeTag::Variable),
            Self::Any(_) => None,
        }
    }

    /// Build the expression this pattern describes under `bindings`.
    pub(crate) fn instantiate(&self, bindings: &Bindings) -> Result<Expr, MathError> {
        match self {
            Self::Any(slot)
            | Self::Const(slot)
            | Self::Integer(slot)
            | Self::NegativeInteger(slot)
            | Self::PositiveInteger(slot)
            | Self::NegativeConst(slot)
            | Self::Variable(slot) => bindings
                .get(*slot)
                .map(|e| (**e).clone())
                .ok_or_else(|| MathError::internal(format!("pattern slot {slot} is unbound"))),
            Self::Literal(n) => Ok(Expr::number(n.clone())),
            Self::Node(tag, children) => {
                let children = children
                    .iter()
                    .map(|c| c.instantiate(bindings))
                    .collect::<Result<Vec<_>, _>>()?;
                Expr::from_tag(*tag, children)
            }
        }
    }
}

/// Terse constructors for writing rule templates.
pub(crate) mod dsl {
    use super::{Pattern, Slot};
    use crate::core::expr::{CmpOp, LogicOp, NodeTag, UnaryFn};
    use crate::core::number::Number;

    pub(crate) const A: Slot = 0;
    pub(crate) const B: Slot = 1;
    pub(crate) const C: Slot = 2;
    pub(crate) const D: Slot = 3;

    pub(crate) const fn any(slot: Slot) -> Pattern {
        Pattern::Any(slot)
    }

    pub(crate) const fn konst(slot: Slot) -> Pattern {
        Pattern::Const(slot)
    }

    pub(crate) const fn int(slot: Slot) -> Pattern {
        Pattern::Integer(slot)
    }

    pub(crate) const fn neg_int(slot: Slot) -> Pattern {
        Pattern::NegativeInteger(slot)
    }

    pub(crate) const fn pos_int(slot: Slot) -> Pattern {
        Pattern::PositiveInteger(slot)
    }

    pub(crate) const fn neg_const(slot: Slot) -> Pattern {
        Pattern::NegativeConst(slot)
    }

    pub(crate) const fn variable(slot: Slot) -> Pattern {
        Pattern::Variable(slot)
    }

    pub(crate) fn lit(n: i64) -> Pattern {
        Pattern::Literal(Number::integer(n))
    }

    fn node(tag: NodeTag, children: Vec<Pattern>) -> Pattern {
        Pattern::Node(tag, children)
    }

    pub(crate) fn sum(a: Pattern, b: Pattern) -> Pattern {
        node(NodeTag::Sum, vec![a, b])
    }

    pub(crate) fn minus(a: Pattern, b: Pattern) -> Pattern {
        node(NodeTag::Minus, vec![a, b])
    }

    pub(crate) fn mul(a: Pattern, b: Pattern) -> Pattern {
        node(NodeTag::Mul, vec![a, b])
    }

    pub(crate) fn div(a: Pattern, b: Pattern) -> Pattern {
        node(NodeTag::Div, vec![a, b])
    }

    pub(crate) fn pow(a: Pattern, b: Pattern) -> Pattern {
        node(NodeTag::Pow, vec![a, b])
    }

    pub(crate) fn log(base: Pattern, arg: Pattern) -> Pattern {
        node(NodeTag::Log, vec![base, arg])
    }

    pub(crate) fn func(f: UnaryFn, arg: Pattern) -> Pattern {
        node(NodeTag::Unary(f), vec![arg])
    }

    pub(crate) fn not(a: Pattern) -> Pattern {
        node(NodeTag::Not, vec![a])
    }

    pub(crate) fn logic(op: LogicOp, a: Pattern, b: Pattern) -> Pattern {
        node(NodeTag::Logic(op), vec![a, b])
    }

    pub(crate) fn cmp(op: CmpOp, a: Pattern, b: Pattern) -> Pattern {
        node(NodeTag::Compare(op), vec![a, b])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use super::dsl::*;
    use super::*;
    use crate::var;

    fn arc(e: Expr) -> Arc<Expr> {
        Arc::new(e)
    }

    #[test]
    fn test_repeated_slot_requires_equal_subtrees() {
        let p = minus(any(A), any(A));
        assert!(p.matches(&arc(Expr::minus(var("x"), var("x")))).is_some());
        assert!(p.matches(&arc(Expr::minus(var("x"), var("y")))).is_none());
    }

    #[test]
    fn test_typed_placeholders() {
        let p = pow(any(A), neg_int(B));
        assert!(p.matches(&arc(Expr::pow(var("x"), -2))).is_some());
        assert!(p.matches(&arc(Expr::pow(var("x"), 2))).is_none());
        assert!(p.matches(&arc(Expr::pow(var("x"), Expr::rational(-1, 2)))).is_none());

        let p = mul(konst(A), variable(B));
        let b = p.matches(&arc(Expr::mul(Expr::rational(1, 3), var("y")))).unwrap();
        assert_eq!(b.number(A), Some(&Number::rational(1, 3)));
        assert_eq!(**b.get(B).unwrap(), var("y"));
        assert!(p.matches(&arc(Expr::mul(var("y"), var("y")))).is_none());
    }

    #[test]
    fn test_literal_and_shape() {
        let p = pow(any(A), lit(-1));
        assert!(p.matches(&arc(Expr::pow(var("x"), -1))).is_some());
        assert!(p.matches(&arc(Expr::mul(var("x"), -1))).is_none());
    }

    #[test]
    fn test_instantiate_round_trips_a_match() {
        let p = mul(pow(any(A), any(B)), pow(any(A), any(C)));
        let e = Expr::mul(Expr::pow(var("x"), 2), Expr::pow(var("x"), var("n")));
        let bindings = p.matches(&arc(e.clone())).unwrap();
        assert_eq!(p.instantiate(&bindings).unwrap(), e);
    }
}
