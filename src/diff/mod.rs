//! Symbolic differentiation.
//!
//! [`Expr::differentiate`] builds the derivative of a tree and normalizes it
//! with `inner_simplify`. [`Expr::resolve_derivatives`] replaces every
//! deferred `Derivative` node of a tree by its value, so the result can be
//! compiled.
//!
//! Functions without a closed-form derivative here (`factorial`) and
//! integrals or limits over another variable stay deferred as `Derivative`
//! nodes.

mod engine;

use std::sync::Arc;

use crate::core::error::MathError;
use crate::core::expr::{Expr, ExprKind};
use crate::core::known_symbols::Variable;

impl Expr {
    /// First derivative with respect to `var`.
    ///
    /// # Errors
    /// - `NotDifferentiable` for boolean and comparison nodes
    /// - `Cancelled` when the installed cancellation token fires
    ///
    /// # Example
    /// ```
    /// use symb_engine::{Expr, var};
    ///
    /// let x = var("x");
    /// let d = Expr::sin(x.clone()).differentiate("x")?;
    /// assert_eq!(d, Expr::cos(x));
    /// # Ok::<(), symb_engine::MathError>(())
    /// ```
    pub fn differentiate(&self, var: impl Into<Variable>) -> Result<Self, MathError> {
        engine::resolve(&Arc::new(self.clone()), &var.into(), 1)
    }

    /// Replace every `Derivative` node by the derivative it stands for.
    ///
    /// # Errors
    /// See [`Expr::differentiate`].
    pub fn resolve_derivatives(&self) -> Result<Self, MathError> {
        resolve_node(&Arc::new(self.clone())).map(Self::unshare)
    }
}

fn resolve_node(node: &Arc<Expr>) -> Result<Arc<Expr>, MathError> {
    let rebuilt = match node.map_children(resolve_node)? {
        Some(rebuilt) => Arc::new(rebuilt),
        None => Arc::clone(node),
    };
    match &rebuilt.kind {
        ExprKind::Derivative { expr, var, order } => Ok(Arc::new(engine::resolve(expr, var, *order)?)),
        _ => Ok(rebuilt),
    }
}
