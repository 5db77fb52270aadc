//! Display implementation for expressions.
//!
//! Human-readable infix notation with the fewest parentheses that still
//! reflect the exact tree shape:
//! - `x ^ 2 + 2 * x + 1`
//! - `sin(x) - (a - b)` (binary operators associate to the left)
//! - `log(2, x)`, `x!`, `derivative(sin(x), x)`

use std::fmt;

use crate::core::expr::{ApproachFrom, Expr, ExprKind, LogicOp, UnaryFn};
use crate::core::number::{Number, NumberLevel};

/// Binding strength of a node when printed, higher binds tighter.
mod prec {
    pub const IMPLIES: u8 = 1;
    pub const OR: u8 = 2;
    pub const AND: u8 = 3;
    pub const NOT: u8 = 4;
    pub const COMPARE: u8 = 5;
    pub const SUM: u8 = 6;
    pub const PRODUCT: u8 = 7;
    pub const NEGATIVE: u8 = 8;
    pub const POWER: u8 = 9;
    pub const ATOM: u8 = 10;
}

fn number_precedence(n: &Number) -> u8 {
    match n.level() {
        NumberLevel::Complex if !n.real_part().is_zero() => prec::SUM,
        NumberLevel::Complex if n.imaginary_part().is_one() => prec::ATOM,
        NumberLevel::Complex if n.imaginary_part().is_negative() => prec::NEGATIVE,
        NumberLevel::Complex | NumberLevel::Rational => prec::PRODUCT,
        _ if n.is_negative() => prec::NEGATIVE,
        _ => prec::ATOM,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr.kind() {
        ExprKind::Number(n) => number_precedence(n),
        ExprKind::Variable(_)
        | ExprKind::Boolean(_)
        | ExprKind::Log(..)
        | ExprKind::Unary(..)
        | ExprKind::Derivative { .. }
        | ExprKind::Integral { .. }
        | ExprKind::Limit { .. } => prec::ATOM,
        ExprKind::Sum(..) | ExprKind::Minus(..) => prec::SUM,
        ExprKind::Mul(..) | ExprKind::Div(..) => prec::PRODUCT,
        ExprKind::Pow(..) => prec::POWER,
        ExprKind::Not(_) => prec::NOT,
        ExprKind::Logic(op, ..) => logic_precedence(*op),
        ExprKind::Compare(..) => prec::COMPARE,
    }
}

const fn logic_precedence(op: LogicOp) -> u8 {
    match op {
        LogicOp::Implies => prec::IMPLIES,
        LogicOp::Or | LogicOp::Xor => prec::OR,
        LogicOp::And => prec::AND,
    }
}

/// Write `expr`, parenthesized when it binds looser than `min`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
    if precedence(expr) < min {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

/// Left-associative infix: the right operand needs parentheses at equal precedence.
fn write_infix(
    f: &mut fmt::Formatter<'_>,
    a: &Expr,
    symbol: &str,
    b: &Expr,
    level: u8,
) -> fmt::Result {
    write_operand(f, a, level)?;
    write!(f, " {symbol} ")?;
    write_operand(f, b, level + 1)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ExprKind::Number(n) => write!(f, "{n}"),
            ExprKind::Variable(v) => write!(f, "{v}"),
            ExprKind::Boolean(b) => write!(f, "{b}"),
            ExprKind::Sum(a, b) => write_infix(f, a, "+", b, prec::SUM),
            ExprKind::Minus(a, b) => write_infix(f, a, "-", b, prec::SUM),
            ExprKind::Mul(a, b) => write_infix(f, a, "*", b, prec::PRODUCT),
            ExprKind::Div(a, b) => write_infix(f, a, "/", b, prec::PRODUCT),
            ExprKind::Pow(a, b) => {
                // right-associative
                write_operand(f, a, prec::POWER + 1)?;
                f.write_str(" ^ ")?;
                write_operand(f, b, prec::POWER)
            }
            ExprKind::Log(base, arg) => write!(f, "log({base}, {arg})"),
            ExprKind::Unary(UnaryFn::Factorial, arg) => {
                write_operand(f, arg, prec::ATOM)?;
                f.write_str("!")
            }
            ExprKind::Unary(func, arg) => write!(f, "{}({arg})", func.name()),
            ExprKind::Derivative { expr, var, order } => {
                if *order == 1 {
                    write!(f, "derivative({expr}, {var})")
                } else {
                    write!(f, "derivative({expr}, {var}, {order})")
                }
            }
            ExprKind::Integral { expr, var, order } => {
                if *order == 1 {
                    write!(f, "integral({expr}, {var})")
                } else {
                    write!(f, "integral({expr}, {var}, {order})")
                }
            }
            ExprKind::Limit {
                expr,
                var,
                point,
                side,
            } => {
                let name = match side {
                    ApproachFrom::BothSides => "limit",
                    ApproachFrom::Left => "limitleft",
                    ApproachFrom::Right => "limitright",
                };
                write!(f, "{name}({expr}, {var}, {point})")
            }
            ExprKind::Not(a) => {
                f.write_str("not ")?;
                write_operand(f, a, prec::NOT)
            }
            ExprKind::Logic(op, a, b) => write_infix(f, a, op.name(), b, logic_precedence(*op)),
            ExprKind::Compare(op, a, b) => write_infix(f, a, op.symbol(), b, prec::COMPARE),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ApproachFrom, Expr, var};

    #[test]
    fn test_display_arithmetic() {
        let x = var("x");
        let e = Expr::sum(Expr::sum(Expr::pow(x.clone(), 2), Expr::mul(2, x.clone())), 1);
        assert_eq!(e.to_string(), "x ^ 2 + 2 * x + 1");
        let e = Expr::minus(var("a"), Expr::minus(var("b"), var("c")));
        assert_eq!(e.to_string(), "a - (b - c)");
        let e = Expr::mul(Expr::sum(var("a"), 1), Expr::integer(-3));
        assert_eq!(e.to_string(), "(a + 1) * -3");
    }

    #[test]
    fn test_display_powers() {
        let x = var("x");
        assert_eq!(Expr::pow(x.clone(), Expr::rational(1, 2)).to_string(), "x ^ (1/2)");
        assert_eq!(Expr::pow(x.clone(), -1).to_string(), "x ^ (-1)");
        assert_eq!(Expr::pow(x.clone(), Expr::pow(2, 3)).to_string(), "x ^ 2 ^ 3");
        assert_eq!(Expr::pow(Expr::complex(1, 2), 2).to_string(), "(1 + 2i) ^ 2");
    }

    #[test]
    fn test_display_functions_and_calculus() {
        let x = var("x");
        assert_eq!(Expr::factorial(Expr::sum(x.clone(), 1)).to_string(), "(x + 1)!");
        assert_eq!(Expr::log(2, x.clone()).to_string(), "log(2, x)");
        assert_eq!(
            Expr::derivative(Expr::sin(x.clone()), "x", 2).to_string(),
            "derivative(sin(x), x, 2)"
        );
        assert_eq!(
            Expr::limit(x.clone(), "x", 0, ApproachFrom::Left).to_string(),
            "limitleft(x, x, 0)"
        );
    }

    #[test]
    fn test_display_logic() {
        let e = Expr::not(Expr::and(var("a"), Expr::less(var("x"), 1)));
        assert_eq!(e.to_string(), "not (a and x < 1)");
        let e = Expr::or(Expr::and(var("a"), var("b")), var("c"));
        assert_eq!(e.to_string(), "a and b or c");
    }
}
