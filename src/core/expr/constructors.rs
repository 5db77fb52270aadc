//! Expression constructors.
//!
//! Provides all constructor methods for building expressions. None of them
//! simplify: the tree comes out exactly as described by the arguments.

use std::sync::Arc;

use super::{ApproachFrom, CmpOp, Expr, ExprKind, LogicOp, UnaryFn};
use crate::core::known_symbols::Variable;
use crate::core::number::Number;

/// Anything that can become a child node.
///
/// Implemented for owned and borrowed expressions, shared `Arc<Expr>` nodes
/// (reused without copying), numbers, variables and booleans.
pub trait IntoNode {
    fn into_node(self) -> Arc<Expr>;
}

impl IntoNode for Arc<Expr> {
    #[inline]
    fn into_node(self) -> Arc<Expr> {
        self
    }
}

impl IntoNode for &Arc<Expr> {
    #[inline]
    fn into_node(self) -> Arc<Expr> {
        Arc::clone(self)
    }
}

impl<T: Into<Expr>> IntoNode for T {
    #[inline]
    fn into_node(self) -> Arc<Expr> {
        Arc::new(self.into())
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

impl From<Number> for Expr {
    fn from(n: Number) -> Self {
        Self::number(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        Self::integer(i64::from(n))
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Self::integer(n)
    }
}

impl From<f64> for Expr {
    fn from(x: f64) -> Self {
        Self::real(x)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Self::boolean(b)
    }
}

impl From<Variable> for Expr {
    fn from(v: Variable) -> Self {
        Self::new(ExprKind::Variable(v))
    }
}

impl From<&Variable> for Expr {
    fn from(v: &Variable) -> Self {
        Self::new(ExprKind::Variable(v.clone()))
    }
}

impl Expr {
    /// Take a shared node back by value, cloning only when it is still shared.
    pub(crate) fn unshare(expr: Arc<Self>) -> Self {
        Arc::try_unwrap(expr).unwrap_or_else(|shared| (*shared).clone())
    }

    // -------------------------------------------------------------------------
    // Leaves
    // -------------------------------------------------------------------------

    pub fn number(n: impl Into<Number>) -> Self {
        Self::new(ExprKind::Number(n.into()))
    }

    pub fn integer(n: i64) -> Self {
        Self::number(Number::integer(n))
    }

    /// `numerator / denominator` as a single exact number.
    pub fn rational(numerator: i64, denominator: i64) -> Self {
        Self::number(Number::rational(numerator, denominator))
    }

    /// Real number, downcast to an exact level when possible.
    pub fn real(x: f64) -> Self {
        Self::number(Number::real(x))
    }

    pub fn complex(re: impl Into<Number>, im: impl Into<Number>) -> Self {
        Self::number(Number::complex(re.into(), im.into()))
    }

    pub fn imaginary_unit() -> Self {
        Self::number(Number::imaginary_unit())
    }

    pub fn variable(name: impl Into<Variable>) -> Self {
        Self::new(ExprKind::Variable(name.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Self::new(ExprKind::Boolean(b))
    }

    pub fn pi() -> Self {
        Self::variable(Variable::pi())
    }

    pub fn e() -> Self {
        Self::variable(Variable::e())
    }

    // -------------------------------------------------------------------------
    // Arithmetic
    // -------------------------------------------------------------------------

    pub fn sum(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::new(ExprKind::Sum(a.into_node(), b.into_node()))
    }

    pub fn minus(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::new(ExprKind::Minus(a.into_node(), b.into_node()))
    }

    pub fn mul(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::new(ExprKind::Mul(a.into_node(), b.into_node()))
    }

    pub fn div(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::new(ExprKind::Div(a.into_node(), b.into_node()))
    }

    pub fn pow(base: impl IntoNode, exponent: impl IntoNode) -> Self {
        Self::new(ExprKind::Pow(base.into_node(), exponent.into_node()))
    }

    /// Logarithm of `arg` in base `base`.
    pub fn log(base: impl IntoNode, arg: impl IntoNode) -> Self {
        Self::new(ExprKind::Log(base.into_node(), arg.into_node()))
    }

    /// Natural logarithm, `log(e, arg)`.
    pub fn ln(arg: impl IntoNode) -> Self {
        Self::log(Self::e(), arg)
    }

    /// Square root, `arg ^ (1/2)`.
    pub fn sqrt(arg: impl IntoNode) -> Self {
        Self::pow(arg, Self::rational(1, 2))
    }

    /// Negation, `-1 * a`.
    pub fn negate(a: impl IntoNode) -> Self {
        Self::mul(Self::integer(-1), a)
    }

    // -------------------------------------------------------------------------
    // Functions
    // -------------------------------------------------------------------------

    pub fn unary(func: UnaryFn, arg: impl IntoNode) -> Self {
        Self::new(ExprKind::Unary(func, arg.into_node()))
    }

    pub fn sin(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Sin, arg)
    }

    pub fn cos(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Cos, arg)
    }

    pub fn tan(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Tan, arg)
    }

    pub fn cotan(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Cotan, arg)
    }

    pub fn arcsin(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Arcsin, arg)
    }

    pub fn arccos(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Arccos, arg)
    }

    pub fn arctan(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Arctan, arg)
    }

    pub fn arccotan(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Arccotan, arg)
    }

    pub fn abs(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Abs, arg)
    }

    pub fn signum(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Signum, arg)
    }

    pub fn factorial(arg: impl IntoNode) -> Self {
        Self::unary(UnaryFn::Factorial, arg)
    }

    // -------------------------------------------------------------------------
    // Calculus (deferred)
    // -------------------------------------------------------------------------

    pub fn derivative(expr: impl IntoNode, var: impl Into<Variable>, order: u32) -> Self {
        Self::new(ExprKind::Derivative {
            expr: expr.into_node(),
            var: var.into(),
            order,
        })
    }

    pub fn integral(expr: impl IntoNode, var: impl Into<Variable>, order: u32) -> Self {
        Self::new(ExprKind::Integral {
            expr: expr.into_node(),
            var: var.into(),
            order,
        })
    }

    pub fn limit(
        expr: impl IntoNode,
        var: impl Into<Variable>,
        point: impl IntoNode,
        side: ApproachFrom,
    ) -> Self {
        Self::new(ExprKind::Limit {
            expr: expr.into_node(),
            var: var.into(),
            point: point.into_node(),
            side,
        })
    }

    // -------------------------------------------------------------------------
    // Boolean and comparison
    // -------------------------------------------------------------------------

    pub fn not(a: impl IntoNode) -> Self {
        Self::new(ExprKind::Not(a.into_node()))
    }

    pub fn logic(op: LogicOp, a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::new(ExprKind::Logic(op, a.into_node(), b.into_node()))
    }

    pub fn and(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::logic(LogicOp::And, a, b)
    }

    pub fn or(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::logic(LogicOp::Or, a, b)
    }

    pub fn xor(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::logic(LogicOp::Xor, a, b)
    }

    pub fn implies(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::logic(LogicOp::Implies, a, b)
    }

    pub fn compare(op: CmpOp, a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::new(ExprKind::Compare(op, a.into_node(), b.into_node()))
    }

    pub fn equal(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::compare(CmpOp::Equal, a, b)
    }

    pub fn less(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::compare(CmpOp::Less, a, b)
    }

    pub fn greater(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::compare(CmpOp::Greater, a, b)
    }

    pub fn less_or_equal(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::compare(CmpOp::LessOrEqual, a, b)
    }

    pub fn greater_or_equal(a: impl IntoNode, b: impl IntoNode) -> Self {
        Self::compare(CmpOp::GreaterOrEqual, a, b)
    }
}
