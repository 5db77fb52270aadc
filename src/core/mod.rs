//! Core types for symbolic mathematics
//!
//! This module contains the fundamental types:
//! - `Expr` / `ExprKind` - Expression tree
//! - `Number` - Exact / inexact numeric tower
//! - `Variable` - Named symbols and the built-in constants
//! - `MathError` - Error types
//! - `Settings` / `CancellationToken` - Scoped ambient configuration

pub(crate) mod cancellation;
mod display;
pub(crate) mod error;
pub(crate) mod expr;
pub(crate) mod known_symbols;
pub(crate) mod number;
pub(crate) mod settings;

// Public re-exports (for external API)
pub use cancellation::{CancellationGuard, CancellationToken};
pub use error::MathError;
pub use expr::{ApproachFrom, CmpOp, Expr, ExprKind, IntoNode, LogicOp, NodeTag, Nodes, UnaryFn};
pub use known_symbols::{Variable, var};
pub use number::{Number, NumberLevel};
pub use settings::{DecimalContext, Rounding, Settings, SettingsGuard, with_settings};
