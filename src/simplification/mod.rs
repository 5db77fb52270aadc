//! Simplification framework.
//!
//! - [`Expr::inner_simplify`] is the cheap local normalization: rules are
//!   applied bottom-up to a fixpoint.
//! - [`Expr::simplify`] searches over alternative forms (fractions, powers,
//!   trigonometric identities, expansion, factoring) and keeps the one with the
//!   lowest [`Expr::simplified_rate`].
//!
//! Both degrade gracefully: when the rewrite budget runs out the partial
//! result is returned, and the infallible variants return the input when the
//! operation is cancelled. Any other error is an engine defect: the `try_*`
//! variants return it and the infallible ones log it and panic.

pub(crate) mod engine;
pub(crate) mod helpers;
pub(crate) mod patterns;
pub(crate) mod rules;
mod search;

use log::{debug, error};
use std::sync::Arc;

use crate::core::error::MathError;
use crate::core::expr::Expr;

fn run(expr: &Expr, f: impl FnOnce(&Arc<Expr>) -> Result<Arc<Expr>, MathError>) -> Result<Expr, MathError> {
    let shared = Arc::new(expr.clone());
    f(&shared).map(Expr::unshare)
}

/// Result of an infallible entry point: the input when cancelled.
///
/// # Panics
/// On any error other than `Cancelled`, after logging it.
fn or_input(expr: &Expr, op: &str, result: Result<Expr, MathError>) -> Expr {
    match result {
        Ok(done) => done,
        Err(MathError::Cancelled) => {
            debug!("{op} cancelled, returning the input");
            expr.clone()
        }
        Err(err) => {
            error!("{op} of {expr} failed: {err}");
            panic!("{op} failed: {err}");
        }
    }
}

impl Expr {
    /// Local normalization: constant folding, identities, power and sign rules.
    ///
    /// # Example
    /// ```
    /// use symb_engine::{Expr, var};
    ///
    /// let x = var("x");
    /// let e = Expr::pow(Expr::pow(x.clone(), 2), 3);
    /// assert_eq!(e.inner_simplify(), Expr::pow(x, 6));
    /// ```
    ///
    /// # Panics
    /// On an internal engine error; see [`Expr::try_inner_simplify`].
    #[must_use]
    pub fn inner_simplify(&self) -> Self {
        or_input(self, "inner_simplify", self.try_inner_simplify())
    }

    /// [`Expr::inner_simplify`] reporting cancellation and engine errors.
    ///
    /// # Errors
    /// - `MathError::Cancelled` when the installed cancellation token fires
    /// - `MathError::Internal` on a broken engine invariant
    pub fn try_inner_simplify(&self) -> Result<Self, MathError> {
        run(self, engine::inner_simplify)
    }

    /// Search for the simplest equivalent form.
    ///
    /// # Example
    /// ```
    /// use symb_engine::{Expr, var};
    ///
    /// let x = var("x");
    /// let e = Expr::sum(Expr::pow(Expr::sin(x.clone()), 2), Expr::pow(Expr::cos(x), 2));
    /// assert_eq!(e.simplify(), Expr::integer(1));
    /// ```
    ///
    /// # Panics
    /// On an internal engine error; see [`Expr::try_simplify`].
    #[must_use]
    pub fn simplify(&self) -> Self {
        or_input(self, "simplify", self.try_simplify())
    }

    /// [`Expr::simplify`] reporting cancellation and engine errors.
    ///
    /// # Errors
    /// See [`Expr::try_inner_simplify`].
    pub fn try_simplify(&self) -> Result<Self, MathError> {
        run(self, search::simplify)
    }

    /// Multiply out products and integer powers of sums.
    ///
    /// The number of resulting terms is bounded by
    /// `Settings::max_expansion_term_count`.
    ///
    /// # Panics
    /// On an internal engine error; see [`Expr::try_expand`].
    #[must_use]
    pub fn expand(&self) -> Self {
        or_input(self, "expand", self.try_expand())
    }

    /// # Errors
    /// See [`Expr::try_inner_simplify`].
    pub fn try_expand(&self) -> Result<Self, MathError> {
        run(self, engine::expand)
    }

    /// Combine fractions and logarithms, collect like terms and pull out
    /// common factors.
    ///
    /// # Panics
    /// On an internal engine error; see [`Expr::try_collapse`].
    #[must_use]
    pub fn collapse(&self) -> Self {
        or_input(self, "collapse", self.try_collapse())
    }

    /// # Errors
    /// See [`Expr::try_inner_simplify`].
    pub fn try_collapse(&self) -> Result<Self, MathError> {
        run(self, engine::collapse)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use super::{or_input, run};
    use crate::{CancellationToken, Expr, MathError, var};

    #[test]
    fn test_internal_errors_reach_fallible_callers() {
        let e = Expr::sum(var("x"), 1);
        let failed = run(&e, |_| Err(MathError::internal("rule catalogue gap")));
        assert_eq!(failed, Err(MathError::Internal("rule catalogue gap".to_string())));
    }

    #[test]
    #[should_panic(expected = "simplify failed: internal error: rule catalogue gap")]
    fn test_internal_errors_are_not_swallowed() {
        let e = Expr::sum(var("x"), 1);
        let _ = or_input(&e, "simplify", Err(MathError::internal("rule catalogue gap")));
    }

    #[test]
    fn test_cancelled_expand_and_collapse() {
        let e = Expr::mul(var("a"), Expr::sum(var("b"), var("c")));
        let token = CancellationToken::new();
        let _guard = token.install();
        token.cancel();
        assert_eq!(e.try_expand(), Err(MathError::Cancelled));
        assert_eq!(e.try_collapse(), Err(MathError::Cancelled));
        assert_eq!(e.expand(), e);
    }

    #[test]
    fn test_infallible_variants_return_input_when_cancelled() {
        let e = Expr::sum(var("x"), 0);
        let token = CancellationToken::new();
        let _guard = token.install();
        token.cancel();
        assert_eq!(e.try_simplify(), Err(MathError::Cancelled));
        assert_eq!(e.inner_simplify(), e);
    }

    #[test]
    fn test_collapse_combines_fractions() {
        let (a, b, c) = (var("a"), var("b"), var("c"));
        let e = Expr::minus(Expr::div(a.clone(), c.clone()), Expr::div(b.clone(), c.clone()));
        assert_eq!(e.collapse(), Expr::div(Expr::minus(a, b), c));
    }
}
