//! Symbolic expression engine.
//!
//! `symb_engine` represents mathematical expressions as immutable trees of
//! binary operators, unary functions, calculus nodes and boolean logic, and
//! offers three families of operations on them:
//!
//! - **Rewriting**: [`Expr::inner_simplify`] normalizes a tree with a catalogue
//!   of local rules; [`Expr::simplify`] additionally searches through
//!   expansion, factoring and identity rewrites for the least complex form.
//! - **Evaluation**: [`Expr::eval`] reduces a closed tree to an exact or
//!   inexact [`Number`].
//! - **Compilation**: [`Expr::compile`] lowers a tree to bytecode for a small
//!   stack machine with common subexpression elimination, for fast repeated
//!   numeric evaluation.
//!
//! Symbolic differentiation ([`Expr::differentiate`]) and substitution
//! ([`Expr::substitute`]) build on the same tree model.
//!
//! # Example
//! ```
//! use symb_engine::{Expr, var};
//!
//! let x = var("x");
//! let e = Expr::sum(Expr::pow(Expr::sin(x.clone()), 2), Expr::pow(Expr::cos(x), 2));
//! assert_eq!(e.simplify(), Expr::integer(1));
//! ```
//!
//! # Ambient state
//! Tolerances, rewrite budgets and the search depth live in [`Settings`],
//! installed per thread with [`with_settings`]. Long computations poll the
//! [`CancellationToken`] installed on the current thread.

mod core;
mod diff;
mod evaluator;
pub(crate) mod math;
mod simplification;

#[cfg(feature = "parallel")]
pub mod parallel;

#[cfg(test)]
mod tests;

pub use crate::core::{
    ApproachFrom, CancellationGuard, CancellationToken, CmpOp, DecimalContext, Expr, ExprKind, IntoNode, LogicOp,
    MathError, NodeTag, Nodes, Number, NumberLevel, Rounding, Settings, SettingsGuard, UnaryFn, Variable, var,
    with_settings,
};
pub use evaluator::{CompileOptions, CompiledFunction, Instruction, ParamName};
pub use num::complex::Complex64;
