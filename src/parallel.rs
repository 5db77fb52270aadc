//! Batch operations on the Rayon thread pool.
//!
//! Settings and cancellation are thread-local, so every helper captures the
//! caller's [`Settings`] and installed [`CancellationToken`] and re-installs
//! them inside each worker.
//!
//! Enable with the `parallel` feature:
//! ```toml
//! symb_engine = { version = "0.1", features = ["parallel"] }
//! ```

use rayon::prelude::*;

use crate::core::cancellation::{self, CancellationToken};
use crate::core::settings::{Settings, with_settings};
use crate::{Expr, MathError, Variable};

/// A value bound to a variable at one evaluation point.
#[derive(Debug, Clone)]
pub enum Value {
    Num(f64),
    /// Symbolic substitution
    Expr(Expr),
    /// Keep the variable free at this point
    Skip,
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Num(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Num(f64::from(n))
    }
}

impl From<Expr> for Value {
    fn from(e: Expr) -> Self {
        Self::Expr(e)
    }
}

impl From<&Expr> for Value {
    fn from(e: &Expr) -> Self {
        Self::Expr(e.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Skip, Into::into)
    }
}

/// Ambient state of the calling thread.
#[derive(Clone)]
struct Ambient {
    settings: Settings,
    token: Option<CancellationToken>,
}

impl Ambient {
    fn capture() -> Self {
        Self {
            settings: Settings::current(),
            token: cancellation::current(),
        }
    }

    fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.token.as_ref().map(CancellationToken::install);
        with_settings(self.settings, f)
    }
}

/// `simplify` every expression.
///
/// # Errors
/// `Cancelled` when the caller's token fires.
pub fn simplify_parallel(exprs: &[Expr]) -> Result<Vec<Expr>, MathError> {
    let ambient = Ambient::capture();
    exprs
        .par_iter()
        .map(|e| ambient.run(|| e.try_simplify()))
        .collect()
}

/// Differentiate every expression with respect to `var`.
///
/// # Errors
/// The first error of any expression.
pub fn differentiate_parallel(exprs: &[Expr], var: impl Into<Variable>) -> Result<Vec<Expr>, MathError> {
    let var = var.into();
    let ambient = Ambient::capture();
    exprs
        .par_iter()
        .map(|e| ambient.run(|| e.differentiate(var.clone())))
        .collect()
}

/// Substitute and normalize each expression at many points.
///
/// `values[expr_idx][var_idx][point_idx]` is bound to `var_names[expr_idx][var_idx]`
/// at point `point_idx`. Shorter value columns leave the variable free at the
/// remaining points, as does [`Value::Skip`]. Mismatched dimensions give an
/// empty result for the affected expression.
///
/// # Example
/// ```
/// use symb_engine::parallel::{Value, evaluate_parallel};
/// use symb_engine::{Expr, var};
///
/// let e = Expr::mul(var("x"), var("y"));
/// let xs: Vec<Value> = vec![2.into(), 3.into()];
/// let ys: Vec<Value> = vec![Value::Skip, 4.into()];
/// let results = evaluate_parallel(&[&e], &[&["x", "y"]], &[&[&xs, &ys]]);
/// assert_eq!(results[0][0], Expr::mul(2, var("y")));
/// assert_eq!(results[0][1], Expr::integer(12));
/// ```
pub fn evaluate_parallel(exprs: &[&Expr], var_names: &[&[&str]], values: &[&[&[Value]]]) -> Vec<Vec<Expr>> {
    let n_exprs = exprs.len();
    if var_names.len() != n_exprs || values.len() != n_exprs {
        return vec![vec![]; n_exprs];
    }
    let ambient = Ambient::capture();

    (0..n_exprs)
        .into_par_iter()
        .map(|expr_idx| {
            let expr = exprs[expr_idx];
            let vars = var_names[expr_idx];
            let vals = values[expr_idx];
            if vars.len() != vals.len() {
                return vec![];
            }
            if vars.is_empty() {
                return vec![ambient.run(|| expr.inner_simplify())];
            }
            let n_points = vals.iter().map(|column| column.len()).max().unwrap_or(0);

            (0..n_points)
                .into_par_iter()
                .map(|point_idx| {
                    ambient.run(|| {
                        let bound = vars.iter().zip(vals.iter()).fold(expr.clone(), |acc, (name, column)| {
                            match column.get(point_idx) {
                                Some(Value::Num(n)) => acc.substitute(*name, *n),
                                Some(Value::Expr(e)) => acc.substitute(*name, e),
                                Some(Value::Skip) | None => acc,
                            }
                        });
                        bound.inner_simplify()
                    })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, reason = "Standard test relaxations")]
mod tests {
    use super::*;
    use crate::var;

    fn get_num(expr: &Expr) -> f64 {
        expr.as_number().and_then(crate::Number::to_f64).unwrap_or(f64::NAN)
    }

    #[test]
    fn test_single_expr_single_var() {
        let expr = Expr::pow(var("x"), 2);
        let vals: Vec<Value> = vec![0.into(), 1.into(), 2.into(), 3.into()];
        let results = evaluate_parallel(&[&expr], &[&["x"]], &[&[&vals]]);
        let nums: Vec<f64> = results[0].iter().map(get_num).collect();
        assert_eq!(nums, vec![0.0, 1.0, 4.0, 9.0]);
    }

    #[test]
    fn test_sparse_columns_and_substitution() {
        let expr = Expr::sum(var("x"), var("y"));
        let xs: Vec<Value> = vec![Value::Expr(var("t")), 1.into()];
        let ys: Vec<Value> = vec![Value::Skip];
        let results = evaluate_parallel(&[&expr], &[&["x", "y"]], &[&[&xs, &ys]]);
        assert_eq!(results[0][0], Expr::sum(var("t"), var("y")));
        assert_eq!(results[0][1], Expr::sum(1, var("y")));
    }

    #[test]
    fn test_dimension_mismatch() {
        let expr = var("x");
        let results = evaluate_parallel(&[&expr], &[&["x", "y"]], &[&[&[1.into()]]]);
        assert!(results[0].is_empty());
        assert_eq!(evaluate_parallel(&[&expr], &[], &[]), vec![Vec::<Expr>::new()]);
    }

    #[test]
    fn test_settings_reach_workers() {
        // level 0 keeps simplify at the inner fixpoint
        let exprs = vec![Expr::pow(var("x"), -2); 8];
        let flat = with_settings(Settings::default().with_simplify_level(0), || simplify_parallel(&exprs)).unwrap();
        assert!(flat.iter().all(|e| *e == exprs[0].inner_simplify()));
    }

    #[test]
    fn test_cancellation_reaches_workers() {
        let token = CancellationToken::new();
        token.cancel();
        let _guard = token.install();
        let exprs = vec![Expr::sin(var("x")); 4];
        assert_eq!(differentiate_parallel(&exprs, "x"), Err(MathError::Cancelled));
    }
}
