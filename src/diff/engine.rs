//! Differentiation rules.
//!
//! The derivative is built with a few inline shortcuts (`0 * a`, `1 * a`,
//! `a + 0`) so that intermediate trees stay small; the caller normalizes the
//! result with `inner_simplify` afterwards.

use std::sync::Arc;

use crate::core::cancellation;
use crate::core::error::MathError;
use crate::core::expr::{Expr, ExprKind, UnaryFn};
use crate::core::known_symbols::Variable;
use crate::core::number::Number;

fn add(a: Expr, b: Expr) -> Expr {
    match (a.is_zero(), b.is_zero()) {
        (true, _) => b,
        (_, true) => a,
        _ => Expr::sum(a, b),
    }
}

fn sub(a: Expr, b: Expr) -> Expr {
    match (a.is_zero(), b.is_zero()) {
        (_, true) => a,
        (true, _) => Expr::negate(b),
        _ => Expr::minus(a, b),
    }
}

fn mul(a: Expr, b: Expr) -> Expr {
    if a.is_zero() || b.is_zero() {
        Expr::integer(0)
    } else if a.is_one() {
        b
    } else if b.is_one() {
        a
    } else {
        Expr::mul(a, b)
    }
}

/// `ln(a)`, with `ln(e) = 1`.
fn ln(a: &Arc<Expr>) -> Expr {
    if a.as_variable().is_some_and(|v| *v == Variable::e()) {
        Expr::integer(1)
    } else {
        Expr::ln(a)
    }
}

/// Differentiates with respect to one variable.
pub(crate) struct Differentiator<'a> {
    var: &'a Variable,
}

impl<'a> Differentiator<'a> {
    pub(crate) const fn new(var: &'a Variable) -> Self {
        Self { var }
    }

    fn depends_on(&self, expr: &Expr) -> bool {
        expr.contains_variable(self.var)
    }

    /// First derivative, not simplified.
    pub(crate) fn derive(&self, expr: &Arc<Expr>) -> Result<Expr, MathError> {
        cancellation::check()?;
        if !self.depends_on(expr) && !has_deferred_nodes(expr) {
            return match &expr.kind {
                ExprKind::Boolean(_) | ExprKind::Not(_) | ExprKind::Logic(..) | ExprKind::Compare(..) => {
                    Err(MathError::NotDifferentiable(expr.tag().to_string()))
                }
                _ => Ok(Expr::integer(0)),
            };
        }

        Ok(match &expr.kind {
            ExprKind::Number(_) => Expr::integer(0),
            ExprKind::Variable(v) => Expr::integer(i64::from(v == self.var && !v.is_constant())),
            ExprKind::Sum(a, b) => add(self.derive(a)?, self.derive(b)?),
            ExprKind::Minus(a, b) => sub(self.derive(a)?, self.derive(b)?),
            // (a*b)' = a'*b + a*b'
            ExprKind::Mul(a, b) => add(
                mul(self.derive(a)?, Expr::unshare(Arc::clone(b))),
                mul(Expr::unshare(Arc::clone(a)), self.derive(b)?),
            ),
            // (a/b)' = (a'*b - a*b') / b^2
            ExprKind::Div(a, b) => {
                let db = self.derive(b)?;
                if db.is_zero() {
                    return Ok(Expr::div(self.derive(a)?, b));
                }
                let numerator = sub(
                    mul(self.derive(a)?, Expr::unshare(Arc::clone(b))),
                    mul(Expr::unshare(Arc::clone(a)), db),
                );
                Expr::div(numerator, Expr::pow(b, 2))
            }
            ExprKind::Pow(base, exponent) => self.derive_pow(base, exponent)?,
            ExprKind::Log(base, arg) => self.derive_log(base, arg)?,
            ExprKind::Unary(func, arg) => {
                let inner = self.derive(arg)?;
                match derive_function(*func, arg) {
                    Some(outer) => mul(outer, inner),
                    None => Expr::derivative(expr, self.var, 1),
                }
            }
            ExprKind::Derivative { expr: inner, var, order } => {
                let resolved = resolve(inner, var, *order)?;
                let stuck = match &resolved.kind {
                    ExprKind::Derivative { expr: same, var: v, order: n } if same == inner && v == var => {
                        Some(*n)
                    }
                    _ => None,
                };
                match stuck {
                    // nothing resolved, stack one more order on the node
                    Some(n) if var == self.var => Expr::derivative(inner, var, n + 1),
                    Some(_) if !self.depends_on(&resolved) => Expr::integer(0),
                    Some(_) => Expr::derivative(resolved, self.var, 1),
                    None => self.derive(&Arc::new(resolved))?,
                }
            }
            // d/dx of an x-antiderivative drops one order
            ExprKind::Integral { expr: inner, var, order } if var == self.var => {
                if *order <= 1 {
                    Expr::unshare(Arc::clone(inner))
                } else {
                    Expr::integral(inner, var, order - 1)
                }
            }
            ExprKind::Integral { .. } | ExprKind::Limit { .. } => Expr::derivative(expr, self.var, 1),
            ExprKind::Boolean(_) | ExprKind::Not(_) | ExprKind::Logic(..) | ExprKind::Compare(..) => {
                return Err(MathError::NotDifferentiable(expr.tag().to_string()));
            }
        })
    }

    fn derive_pow(&self, base: &Arc<Expr>, exponent: &Arc<Expr>) -> Result<Expr, MathError> {
        let db = self.derive(base)?;
        let de = self.derive(exponent)?;
        if de.is_zero() {
            // (a^n)' = n * a^(n-1) * a'
            let lowered = match exponent.as_number() {
                Some(n) => Expr::pow(base, n - &Number::one()),
                None => Expr::pow(base, Expr::minus(exponent, 1)),
            };
            return Ok(mul(mul(Expr::unshare(Arc::clone(exponent)), lowered), db));
        }
        // (a^b)' = a^b * (b' * ln(a) + b * a' / a)
        let log_term = mul(de, ln(base));
        let base_term = if db.is_zero() {
            Expr::integer(0)
        } else {
            Expr::div(mul(Expr::unshare(Arc::clone(exponent)), db), base)
        };
        Ok(mul(Expr::pow(base, exponent), add(log_term, base_term)))
    }

    fn derive_log(&self, base: &Arc<Expr>, arg: &Arc<Expr>) -> Result<Expr, MathError> {
        let da = self.derive(arg)?;
        let db = self.derive(base)?;
        if db.is_zero() {
            // log(b, a)' = a' / (a * ln(b))
            return Ok(Expr::div(da, mul(Expr::unshare(Arc::clone(arg)), ln(base))));
        }
        // log(b, a) = ln(a) / ln(b)
        let numerator = sub(
            mul(Expr::div(da, arg), ln(base)),
            mul(ln(arg), Expr::div(db, base)),
        );
        Ok(Expr::div(numerator, Expr::pow(ln(base), 2)))
    }

}

/// `f'(a)` for a built-in `f`, `None` when it has no closed form here.
fn derive_function(func: UnaryFn, a: &Arc<Expr>) -> Option<Expr> {
    let one_minus_square = || Expr::minus(1, Expr::pow(a, 2));
    let one_plus_square = || Expr::sum(1, Expr::pow(a, 2));
    Some(match func {
        UnaryFn::Sin => Expr::cos(a),
        UnaryFn::Cos => Expr::negate(Expr::sin(a)),
        UnaryFn::Tan => Expr::div(1, Expr::pow(Expr::cos(a), 2)),
        UnaryFn::Cotan => Expr::negate(Expr::div(1, Expr::pow(Expr::sin(a), 2))),
        UnaryFn::Arcsin => Expr::div(1, Expr::sqrt(one_minus_square())),
        UnaryFn::Arccos => Expr::negate(Expr::div(1, Expr::sqrt(one_minus_square()))),
        UnaryFn::Arctan => Expr::div(1, one_plus_square()),
        UnaryFn::Arccotan => Expr::negate(Expr::div(1, one_plus_square())),
        UnaryFn::Abs => Expr::signum(a),
        // zero wherever it is defined
        UnaryFn::Signum => Expr::integer(0),
        UnaryFn::Factorial => return None,
    })
}

fn has_deferred_nodes(expr: &Expr) -> bool {
    expr.nodes()
        .any(|node| matches!(node.kind, ExprKind::Derivative { .. }))
}

/// Differentiate `order` times, simplifying between steps.
pub(crate) fn resolve(expr: &Arc<Expr>, var: &Variable, order: u32) -> Result<Expr, MathError> {
    let differentiator = Differentiator::new(var);
    let mut current = Arc::clone(expr);
    for _ in 0..order {
        current = Arc::new(differentiator.derive(&current)?.try_inner_simplify()?);
    }
    Ok(Expr::unshare(current))
}
