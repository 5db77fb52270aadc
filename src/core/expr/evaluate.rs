//! Collapsing variable-free trees to a single value.
//!
//! Arithmetic stays exact (integers, rationals, exact complex numbers) for as
//! long as possible; transcendental functions go through `f64` / `Complex64`
//! and their results are rounded by the active decimal context.

use super::{CmpOp, Expr, ExprKind, UnaryFn};
use crate::core::error::MathError;
use crate::core::number::Number;
use crate::math;

impl Expr {
    /// Evaluate a tree without free variables to a number.
    ///
    /// The constants `pi` and `e` evaluate to their values.
    ///
    /// # Errors
    /// `MathError::CannotEvaluate` for free variables, booleans and
    /// unresolved derivatives, integrals or limits.
    ///
    /// # Example
    /// ```
    /// use symb_engine::{Expr, Number};
    ///
    /// let z = Expr::sum(3, Expr::mul(4, Expr::imaginary_unit()));
    /// assert_eq!(z.eval()?, Number::complex(Number::integer(3), Number::integer(4)));
    /// # Ok::<(), symb_engine::MathError>(())
    /// ```
    pub fn eval(&self) -> Result<Number, MathError> {
        match &self.kind {
            ExprKind::Number(n) => Ok(n.clone()),
            ExprKind::Variable(v) => v
                .constant_value()
                .map(Number::real)
                .ok_or_else(|| MathError::CannotEvaluate(format!("free variable `{v}`"))),
            ExprKind::Boolean(_) => Err(MathError::CannotEvaluate(
                "a boolean is not a number, use eval_bool".to_string(),
            )),
            ExprKind::Sum(a, b) => Ok(&a.eval()? + &b.eval()?),
            ExprKind::Minus(a, b) => Ok(&a.eval()? - &b.eval()?),
            ExprKind::Mul(a, b) => Ok(&a.eval()? * &b.eval()?),
            ExprKind::Div(a, b) => Ok(&a.eval()? / &b.eval()?),
            ExprKind::Pow(a, b) => Ok(a.eval()?.pow(&b.eval()?)),
            ExprKind::Log(base, arg) => Ok(Number::log(&base.eval()?, &arg.eval()?)),
            ExprKind::Unary(func, arg) => Ok(apply_function(*func, &arg.eval()?)),
            ExprKind::Derivative { .. } | ExprKind::Integral { .. } | ExprKind::Limit { .. } => {
                Err(MathError::CannotEvaluate(format!("unresolved `{}` node", self.tag())))
            }
            ExprKind::Not(_) | ExprKind::Logic(..) | ExprKind::Compare(..) => {
                Err(MathError::CannotEvaluate(
                    "a boolean expression is not a number, use eval_bool".to_string(),
                ))
            }
        }
    }

    /// Evaluate a boolean or comparison tree.
    ///
    /// # Errors
    /// `MathError::CannotEvaluate` when an operand cannot be evaluated or
    /// when an ordering comparison involves complex numbers.
    pub fn eval_bool(&self) -> Result<bool, MathError> {
        match &self.kind {
            ExprKind::Boolean(b) => Ok(*b),
            ExprKind::Not(a) => Ok(!a.eval_bool()?),
            ExprKind::Logic(op, a, b) => Ok(op.apply(a.eval_bool()?, b.eval_bool()?)),
            ExprKind::Compare(op, a, b) => compare_numbers(*op, &a.eval()?, &b.eval()?),
            ExprKind::Number(_)
            | ExprKind::Variable(_)
            | ExprKind::Sum(..)
            | ExprKind::Minus(..)
            | ExprKind::Mul(..)
            | ExprKind::Div(..)
            | ExprKind::Pow(..)
            | ExprKind::Log(..)
            | ExprKind::Unary(..)
            | ExprKind::Derivative { .. }
            | ExprKind::Integral { .. }
            | ExprKind::Limit { .. } => Err(MathError::CannotEvaluate(format!(
                "`{}` is not a boolean expression",
                self.tag()
            ))),
        }
    }
}

/// Apply a built-in function to a number, exactly where the result is exact.
pub(crate) fn apply_function(func: UnaryFn, x: &Number) -> Number {
    match func {
        UnaryFn::Abs if x.level() != crate::NumberLevel::Complex => {
            if x.is_negative() { -x } else { x.clone() }
        }
        UnaryFn::Abs => {
            // |z|² is exact for exact parts, the root decides the level
            let re = x.real_part();
            let im = x.imaginary_part();
            let squared = &(&re * &re) + &(&im * &im);
            squared.pow(&Number::rational(1, 2))
        }
        UnaryFn::Signum if x.level() != crate::NumberLevel::Complex => {
            if x.is_zero() {
                Number::zero()
            } else if x.is_negative() {
                Number::minus_one()
            } else {
                Number::one()
            }
        }
        UnaryFn::Factorial => x.factorial(),
        UnaryFn::Signum => Number::from_complex64(math::signum(x.to_complex64())),
        UnaryFn::Sin => Number::from_complex64(math::sin(x.to_complex64())),
        UnaryFn::Cos => Number::from_complex64(math::cos(x.to_complex64())),
        UnaryFn::Tan => Number::from_complex64(math::tan(x.to_complex64())),
        UnaryFn::Cotan => Number::from_complex64(math::cotan(x.to_complex64())),
        UnaryFn::Arcsin => Number::from_complex64(math::arcsin(x.to_complex64())),
        UnaryFn::Arccos => Number::from_complex64(math::arccos(x.to_complex64())),
        UnaryFn::Arctan => Number::from_complex64(math::arctan(x.to_complex64())),
        UnaryFn::Arccotan => Number::from_complex64(math::arccotan(x.to_complex64())),
    }
}

pub(crate) fn compare_numbers(op: CmpOp, a: &Number, b: &Number) -> Result<bool, MathError> {
    if op == CmpOp::Equal {
        return Ok(a.approx_eq(b));
    }
    let ordering = a.partial_cmp_value(b).ok_or_else(|| {
        MathError::CannotEvaluate(format!("`{a}` and `{b}` cannot be ordered"))
    })?;
    Ok(match op {
        CmpOp::Less => ordering.is_lt(),
        CmpOp::Greater => ordering.is_gt(),
        CmpOp::LessOrEqual => ordering.is_le(),
        CmpOp::GreaterOrEqual => ordering.is_ge(),
        CmpOp::Equal => ordering.is_eq(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use crate::{Expr, MathError, Number, NumberLevel, var};

    #[test]
    fn test_exact_arithmetic_stays_exact() {
        let e = Expr::sum(Expr::div(1, 3), Expr::div(2, 3));
        assert_eq!(e.eval().unwrap(), Number::integer(1));
        let e = Expr::pow(Expr::rational(2, 3), 3);
        assert_eq!(e.eval().unwrap(), Number::rational(8, 27));
    }

    #[test]
    fn test_functions() {
        assert_eq!(Expr::sin(0).eval().unwrap(), Number::integer(0));
        assert_eq!(Expr::factorial(5).eval().unwrap(), Number::integer(120));
        assert_eq!(Expr::abs(Expr::complex(3, 4)).eval().unwrap(), Number::integer(5));
        assert_eq!(Expr::signum(-7).eval().unwrap(), Number::integer(-1));
        let pi_half = Expr::sin(Expr::div(Expr::pi(), 2)).eval().unwrap();
        assert_eq!(pi_half, Number::integer(1));
        assert_eq!(Expr::sin(1).eval().unwrap().level(), NumberLevel::Real);
    }

    #[test]
    fn test_free_variable_is_an_error() {
        let err = Expr::sum(var("x"), 1).eval().unwrap_err();
        assert_eq!(err, MathError::CannotEvaluate("free variable `x`".to_string()));
    }

    #[test]
    fn test_deferred_nodes_are_errors() {
        let d = Expr::derivative(var("x"), "x", 1);
        assert!(matches!(d.eval(), Err(MathError::CannotEvaluate(_))));
    }

    #[test]
    fn test_eval_bool() {
        let e = Expr::and(Expr::less(1, 2), Expr::not(Expr::equal(Expr::rational(1, 2), 0.5)));
        assert!(!e.eval_bool().unwrap());
        let e = Expr::implies(false, Expr::greater(0, 1));
        assert!(e.eval_bool().unwrap());
        assert!(Expr::less(Expr::imaginary_unit(), 1).eval_bool().is_err());
    }
}
