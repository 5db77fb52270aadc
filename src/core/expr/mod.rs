//! Expression trees.
//!
//! This module defines:
//! - `Expr` - an immutable tree node with a precomputed structural hash
//! - `ExprKind` - the closed set of node kinds
//! - `NodeTag` - the kind of a node without its children
//!
//! # Architecture
//!
//! ## Binary operators
//! Operators are strictly binary and ordered: `a + b + c` is
//! `Sum(Sum(a, b), c)`. No flattening or reordering happens at construction;
//! constructors build exactly the tree they are given.
//!
//! ## Structural hashing
//! Each `Expr` carries a hash computed from its kind and its children's hashes.
//! Two expressions with different hashes are definitely not equal, so equality
//! checks reject almost every mismatch in O(1).
//!
//! ## Memoized properties
//! Node count, finiteness, symbol set and simplification rate are computed on
//! first request and stored per node in `OnceLock` cells, see `analysis.rs`.
//!
//! # Usage
//!
//! ```
//! use symb_engine::{Expr, var};
//!
//! let x = var("x");
//! // raw constructors build the tree as given
//! let raw = Expr::pow(Expr::pow(x.clone(), 2), 3);
//! assert_eq!(raw.to_string(), "(x ^ 2) ^ 3");
//! // operators normalize with `inner_simplify`
//! let sum = x.clone() - x;
//! assert_eq!(sum, Expr::integer(0));
//! ```

mod analysis;
mod constructors;
pub(crate) mod evaluate;
mod hash;
mod ops;
mod substitute;

use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, LazyLock, OnceLock};

use crate::core::error::MathError;
use crate::core::known_symbols::Variable;
use crate::core::number::Number;

pub use analysis::Nodes;
pub use constructors::IntoNode;
pub use hash::compute_expr_hash;

/// Cached leaf used during Drop to swap children out without allocating.
static DUMMY_ARC: LazyLock<Arc<Expr>> = LazyLock::new(|| Arc::new(Expr::new(ExprKind::Boolean(false))));

// =============================================================================
// EXPR - The main expression type
// =============================================================================

/// A symbolic mathematical expression.
///
/// Nodes are immutable and share unchanged subtrees through `Arc`. Equality
/// is structural.
#[derive(Clone)]
pub struct Expr {
    /// Structural hash for O(1) equality rejection
    pub(crate) hash: u64,
    /// The kind of expression (structure)
    pub(crate) kind: ExprKind,
    /// Lazily computed derived properties
    pub(crate) memo: Memo,
}

/// Derived properties, each computed at most once per node.
#[derive(Clone, Default)]
pub(crate) struct Memo {
    pub(crate) complexity: OnceLock<usize>,
    pub(crate) is_finite: OnceLock<bool>,
    pub(crate) symbols: OnceLock<Arc<BTreeSet<Variable>>>,
    pub(crate) rate: OnceLock<f64>,
}

impl Deref for Expr {
    type Target = ExprKind;
    fn deref(&self) -> &Self::Target {
        &self.kind
    }
}

// Structural equality based on KIND only (with hash fast-reject)
impl PartialEq for Expr {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        if self.hash != other.hash {
            return false;
        }
        self.kind == other.kind
    }
}

impl Eq for Expr {}

impl std::hash::Hash for Expr {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.kind, f)
    }
}

// =============================================================================
// EXPRKIND
// =============================================================================

/// The kind (structure) of an expression node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// Numeric constant
    Number(Number),
    /// Named symbol, possibly one of the built-in constants
    Variable(Variable),
    /// Boolean literal
    Boolean(bool),

    Sum(Arc<Expr>, Arc<Expr>),
    Minus(Arc<Expr>, Arc<Expr>),
    Mul(Arc<Expr>, Arc<Expr>),
    Div(Arc<Expr>, Arc<Expr>),
    Pow(Arc<Expr>, Arc<Expr>),
    /// `Log(base, argument)`
    Log(Arc<Expr>, Arc<Expr>),

    /// Single-argument function application
    Unary(UnaryFn, Arc<Expr>),

    /// Unevaluated derivative `d^order/d var^order expr`
    Derivative {
        expr: Arc<Expr>,
        var: Variable,
        order: u32,
    },
    /// Unevaluated `order`-fold antiderivative
    Integral {
        expr: Arc<Expr>,
        var: Variable,
        order: u32,
    },
    /// Unevaluated limit of `expr` as `var` approaches `point`
    Limit {
        expr: Arc<Expr>,
        var: Variable,
        point: Arc<Expr>,
        side: ApproachFrom,
    },

    Not(Arc<Expr>),
    Logic(LogicOp, Arc<Expr>, Arc<Expr>),
    Compare(CmpOp, Arc<Expr>, Arc<Expr>),
}

/// Built-in single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnaryFn {
    Sin,
    Cos,
    Tan,
    Cotan,
    Arcsin,
    Arccos,
    Arctan,
    Arccotan,
    Abs,
    Signum,
    Factorial,
}

impl UnaryFn {
    pub const ALL: [Self; 11] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Cotan,
        Self::Arcsin,
        Self::Arccos,
        Self::Arctan,
        Self::Arccotan,
        Self::Abs,
        Self::Signum,
        Self::Factorial,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Cotan => "cotan",
            Self::Arcsin => "arcsin",
            Self::Arccos => "arccos",
            Self::Arctan => "arctan",
            Self::Arccotan => "arccotan",
            Self::Abs => "abs",
            Self::Signum => "signum",
            Self::Factorial => "factorial",
        }
    }

    pub const fn is_trigonometric(self) -> bool {
        matches!(self, Self::Sin | Self::Cos | Self::Tan | Self::Cotan)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicOp {
    And,
    Or,
    Xor,
    Implies,
}

impl LogicOp {
    pub const fn name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Implies => "implies",
        }
    }

    pub const fn apply(self, a: bool, b: bool) -> bool {
        match self {
            Self::And => a && b,
            Self::Or => a || b,
            Self::Xor => a ^ b,
            Self::Implies => !a || b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Equal,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

impl CmpOp {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Less => "less",
            Self::Greater => "greater",
            Self::LessOrEqual => "lessorequal",
            Self::GreaterOrEqual => "greaterorequal",
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessOrEqual => "<=",
            Self::GreaterOrEqual => ">=",
        }
    }

    /// Whether `a op a` holds.
    pub const fn is_reflexive(self) -> bool {
        matches!(self, Self::Equal | Self::LessOrEqual | Self::GreaterOrEqual)
    }
}

/// Side from which a limit is approached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApproachFrom {
    Left,
    Right,
    BothSides,
}

// =============================================================================
// NODE TAGS
// =============================================================================

/// The kind of a node, without children or metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Number,
    Variable,
    Boolean,
    Sum,
    Minus,
    Mul,
    Div,
    Pow,
    Log,
    Unary(UnaryFn),
    Derivative,
    Integral,
    Limit,
    Not,
    Logic(LogicOp),
    Compare(CmpOp),
}

impl NodeTag {
    /// Fixed number of children of nodes with this tag.
    pub const fn arity(self) -> usize {
        match self {
            Self::Number | Self::Variable | Self::Boolean => 0,
            Self::Unary(_) | Self::Derivative | Self::Integral | Self::Not => 1,
            Self::Sum
            | Self::Minus
            | Self::Mul
            | Self::Div
            | Self::Pow
            | Self::Log
            | Self::Limit
            | Self::Logic(_)
            | Self::Compare(_) => 2,
        }
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Number => "number",
            Self::Variable => "variable",
            Self::Boolean => "boolean",
            Self::Sum => "sum",
            Self::Minus => "minus",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Pow => "pow",
            Self::Log => "log",
            Self::Unary(func) => func.name(),
            Self::Derivative => "derivative",
            Self::Integral => "integral",
            Self::Limit => "limit",
            Self::Not => "not",
            Self::Logic(op) => op.name(),
            Self::Compare(op) => op.name(),
        };
        f.write_str(name)
    }
}

/// Ordered child view of a node.
pub type Children<'a> = SmallVec<[&'a Arc<Expr>; 2]>;

impl Expr {
    /// Create a node from its kind, computing the structural hash.
    #[must_use]
    pub fn new(kind: ExprKind) -> Self {
        let hash = compute_expr_hash(&kind);
        Self {
            hash,
            kind,
            memo: Memo::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    /// Get the structural hash of the expression
    #[inline]
    pub const fn structural_hash(&self) -> u64 {
        self.hash
    }

    pub fn tag(&self) -> NodeTag {
        match &self.kind {
            ExprKind::Number(_) => NodeTag::Number,
            ExprKind::Variable(_) => NodeTag::Variable,
            ExprKind::Boolean(_) => NodeTag::Boolean,
            ExprKind::Sum(..) => NodeTag::Sum,
            ExprKind::Minus(..) => NodeTag::Minus,
            ExprKind::Mul(..) => NodeTag::Mul,
            ExprKind::Div(..) => NodeTag::Div,
            ExprKind::Pow(..) => NodeTag::Pow,
            ExprKind::Log(..) => NodeTag::Log,
            ExprKind::Unary(func, _) => NodeTag::Unary(*func),
            ExprKind::Derivative { .. } => NodeTag::Derivative,
            ExprKind::Integral { .. } => NodeTag::Integral,
            ExprKind::Limit { .. } => NodeTag::Limit,
            ExprKind::Not(_) => NodeTag::Not,
            ExprKind::Logic(op, ..) => NodeTag::Logic(*op),
            ExprKind::Compare(op, ..) => NodeTag::Compare(*op),
        }
    }

    /// Ordered children; leaves have none.
    pub fn children(&self) -> Children<'_> {
        let mut out = SmallVec::new();
        match &self.kind {
            ExprKind::Number(_) | ExprKind::Variable(_) | ExprKind::Boolean(_) => {}
            ExprKind::Sum(a, b)
            | ExprKind::Minus(a, b)
            | ExprKind::Mul(a, b)
            | ExprKind::Div(a, b)
            | ExprKind::Pow(a, b)
            | ExprKind::Log(a, b)
            | ExprKind::Logic(_, a, b)
            | ExprKind::Compare(_, a, b) => {
                out.push(a);
                out.push(b);
            }
            ExprKind::Unary(_, a)
            | ExprKind::Not(a)
            | ExprKind::Derivative { expr: a, .. }
            | ExprKind::Integral { expr: a, .. } => out.push(a),
            ExprKind::Limit { expr, point, .. } => {
                out.push(expr);
                out.push(point);
            }
        }
        out
    }

    /// Build a node from a tag and its children.
    ///
    /// Calculus tags carry a variable and cannot be built this way, use
    /// [`Expr::with_children`] on an existing node instead.
    pub fn from_tag(tag: NodeTag, children: Vec<Expr>) -> Result<Self, MathError> {
        if children.len() != tag.arity() {
            return Err(MathError::ArityMismatch {
                tag,
                expected: tag.arity(),
                got: children.len(),
            });
        }
        let mut it = children.into_iter().map(Arc::new);
        let mut next = || it.next().ok_or_else(|| MathError::internal("child count checked above"));
        let kind = match tag {
            NodeTag::Sum => ExprKind::Sum(next()?, next()?),
            NodeTag::Minus => ExprKind::Minus(next()?, next()?),
            NodeTag::Mul => ExprKind::Mul(next()?, next()?),
            NodeTag::Div => ExprKind::Div(next()?, next()?),
            NodeTag::Pow => ExprKind::Pow(next()?, next()?),
            NodeTag::Log => ExprKind::Log(next()?, next()?),
            NodeTag::Unary(func) => ExprKind::Unary(func, next()?),
            NodeTag::Not => ExprKind::Not(next()?),
            NodeTag::Logic(op) => ExprKind::Logic(op, next()?, next()?),
            NodeTag::Compare(op) => ExprKind::Compare(op, next()?, next()?),
            NodeTag::Number
            | NodeTag::Variable
            | NodeTag::Boolean
            | NodeTag::Derivative
            | NodeTag::Integral
            | NodeTag::Limit => return Err(MathError::MissingMetadata(tag)),
        };
        Ok(Self::new(kind))
    }

    /// Rebuild this node with new children, keeping its kind and metadata.
    pub fn with_children(&self, children: Vec<Expr>) -> Result<Self, MathError> {
        let tag = self.tag();
        if children.len() != tag.arity() {
            return Err(MathError::ArityMismatch {
                tag,
                expected: tag.arity(),
                got: children.len(),
            });
        }
        let children: SmallVec<[Arc<Expr>; 2]> = children.into_iter().map(Arc::new).collect();
        Ok(self.rebuild(&children))
    }

    /// Rebuild with already shared children. The count must match the arity.
    pub(crate) fn rebuild(&self, c: &[Arc<Expr>]) -> Self {
        debug_assert_eq!(c.len(), self.tag().arity());
        let kind = match &self.kind {
            ExprKind::Number(_) | ExprKind::Variable(_) | ExprKind::Boolean(_) => {
                return self.clone();
            }
            ExprKind::Sum(..) => ExprKind::Sum(c[0].clone(), c[1].clone()),
            ExprKind::Minus(..) => ExprKind::Minus(c[0].clone(), c[1].clone()),
            ExprKind::Mul(..) => ExprKind::Mul(c[0].clone(), c[1].clone()),
            ExprKind::Div(..) => ExprKind::Div(c[0].clone(), c[1].clone()),
            ExprKind::Pow(..) => ExprKind::Pow(c[0].clone(), c[1].clone()),
            ExprKind::Log(..) => ExprKind::Log(c[0].clone(), c[1].clone()),
            ExprKind::Unary(func, _) => ExprKind::Unary(*func, c[0].clone()),
            ExprKind::Derivative { var, order, .. } => ExprKind::Derivative {
                expr: c[0].clone(),
                var: var.clone(),
                order: *order,
            },
            ExprKind::Integral { var, order, .. } => ExprKind::Integral {
                expr: c[0].clone(),
                var: var.clone(),
                order: *order,
            },
            ExprKind::Limit { var, side, .. } => ExprKind::Limit {
                expr: c[0].clone(),
                var: var.clone(),
                point: c[1].clone(),
                side: *side,
            },
            ExprKind::Not(_) => ExprKind::Not(c[0].clone()),
            ExprKind::Logic(op, ..) => ExprKind::Logic(*op, c[0].clone(), c[1].clone()),
            ExprKind::Compare(op, ..) => ExprKind::Compare(*op, c[0].clone(), c[1].clone()),
        };
        Self::new(kind)
    }

    /// Apply `f` to every child; `None` when every child came back pointer-identical.
    pub(crate) fn map_children<E>(
        &self,
        mut f: impl FnMut(&Arc<Expr>) -> Result<Arc<Expr>, E>,
    ) -> Result<Option<Self>, E> {
        let children = self.children();
        if children.is_empty() {
            return Ok(None);
        }
        let mut changed = false;
        let mut mapped: SmallVec<[Arc<Expr>; 2]> = SmallVec::new();
        for child in children {
            let new = f(child)?;
            changed |= !Arc::ptr_eq(&new, child);
            mapped.push(new);
        }
        Ok(changed.then(|| self.rebuild(&mapped)))
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn as_number(&self) -> Option<&Number> {
        match &self.kind {
            ExprKind::Number(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.kind {
            ExprKind::Variable(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match &self.kind {
            ExprKind::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Both operands of an arithmetic binary node (`Sum`, `Minus`, `Mul`, `Div`, `Pow`, `Log`).
    pub fn as_binary(&self) -> Option<(&Arc<Expr>, &Arc<Expr>)> {
        match &self.kind {
            ExprKind::Sum(a, b)
            | ExprKind::Minus(a, b)
            | ExprKind::Mul(a, b)
            | ExprKind::Div(a, b)
            | ExprKind::Pow(a, b)
            | ExprKind::Log(a, b) => Some((a, b)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self.kind, ExprKind::Number(_))
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Number(_) | ExprKind::Variable(_) | ExprKind::Boolean(_)
        )
    }

    /// The number zero, exactly.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.as_number().is_some_and(|n| n.is_exact() && n.is_zero())
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.as_number().is_some_and(Number::is_one)
    }
}

// =============================================================================
// DROP IMPLEMENTATION - Iterative drop to prevent stack overflow
// =============================================================================

impl Drop for Expr {
    fn drop(&mut self) {
        fn drain_children(kind: &mut ExprKind, queue: &mut Vec<Arc<Expr>>) {
            let mut take = |slot: &mut Arc<Expr>| {
                queue.push(std::mem::replace(slot, Arc::clone(&DUMMY_ARC)));
            };
            match kind {
                ExprKind::Number(_) | ExprKind::Variable(_) | ExprKind::Boolean(_) => {}
                ExprKind::Sum(a, b)
                | ExprKind::Minus(a, b)
                | ExprKind::Mul(a, b)
                | ExprKind::Div(a, b)
                | ExprKind::Pow(a, b)
                | ExprKind::Log(a, b)
                | ExprKind::Logic(_, a, b)
                | ExprKind::Compare(_, a, b) => {
                    take(a);
                    take(b);
                }
                ExprKind::Unary(_, a)
                | ExprKind::Not(a)
                | ExprKind::Derivative { expr: a, .. }
                | ExprKind::Integral { expr: a, .. } => take(a),
                ExprKind::Limit { expr, point, .. } => {
                    take(expr);
                    take(point);
                }
            }
        }

        if self.is_leaf() {
            return;
        }
        let mut work_queue = Vec::new();
        drain_children(&mut self.kind, &mut work_queue);

        while let Some(child_arc) = work_queue.pop() {
            if let Ok(mut child_expr) = Arc::try_unwrap(child_arc) {
                drain_children(&mut child_expr.kind, &mut work_queue);
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, reason = "Standard test relaxations")]
mod tests {
    use super::*;
    use crate::var;

    #[test]
    fn test_constructors_do_not_reorder() {
        let e = Expr::mul(var("x"), 3);
        match e.kind() {
            ExprKind::Mul(a, b) => {
                assert_eq!(**a, var("x"));
                assert_eq!(**b, Expr::integer(3));
            }
            other => panic!("expected Mul, got {other:?}"),
        }
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let a = Expr::sum(Expr::sin(var("x")), 1);
        let b = Expr::sum(Expr::sin(var("x")), 1);
        let c = Expr::sum(1, Expr::sin(var("x")));
        assert_eq!(a, b);
        assert_eq!(a.structural_hash(), b.structural_hash());
        assert_ne!(a, c);
    }

    #[test]
    fn test_children_and_tags() {
        let e = Expr::log(2, var("y"));
        assert_eq!(e.tag(), NodeTag::Log);
        let children = e.children();
        assert_eq!(children.len(), 2);
        assert_eq!(**children[0], Expr::integer(2));
        assert!(var("x").children().is_empty());
    }

    #[test]
    fn test_from_tag_checks_arity() {
        let err = Expr::from_tag(NodeTag::Pow, vec![var("x")]).unwrap_err();
        assert_eq!(
            err,
            MathError::ArityMismatch {
                tag: NodeTag::Pow,
                expected: 2,
                got: 1
            }
        );
        let ok = Expr::from_tag(NodeTag::Unary(UnaryFn::Sin), vec![var("x")]).unwrap();
        assert_eq!(ok, Expr::sin(var("x")));
        assert_eq!(
            Expr::from_tag(NodeTag::Derivative, vec![var("x")]),
            Err(MathError::MissingMetadata(NodeTag::Derivative))
        );
    }

    #[test]
    fn test_with_children_keeps_metadata() {
        let d = Expr::derivative(Expr::sin(var("x")), "x", 2);
        let rebuilt = d.with_children(vec![Expr::cos(var("x"))]).unwrap();
        assert_eq!(rebuilt, Expr::derivative(Expr::cos(var("x")), "x", 2));
        assert!(d.with_children(vec![]).is_err());
    }

    #[test]
    fn test_deep_tree_drop_does_not_overflow() {
        let mut e = var("x");
        for i in 0..200_000 {
            e = Expr::sum(e, i);
        }
        drop(e);
    }
}
