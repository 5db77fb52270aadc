//! Operator overloading for `Expr`.
//!
//! Operators build the node and immediately run `inner_simplify` on it, so
//! `x - x` is already `0`. Use the associated constructors (`Expr::sum`, ...)
//! to build a tree verbatim.

use std::ops::{Add, Div, Mul, Neg, Sub};

use super::Expr;

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $ctor:ident) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$ctor(self, rhs).inner_simplify()
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::$ctor(self, rhs).inner_simplify()
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$ctor(self, rhs).inner_simplify()
            }
        }

        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::$ctor(self, rhs).inner_simplify()
            }
        }

        impl_binary_op!(@scalar $trait, $method, $ctor, i32);
        impl_binary_op!(@scalar $trait, $method, $ctor, f64);
    };
    (@scalar $trait:ident, $method:ident, $ctor:ident, $scalar:ty) => {
        impl $trait<$scalar> for Expr {
            type Output = Expr;
            fn $method(self, rhs: $scalar) -> Expr {
                Expr::$ctor(self, rhs).inner_simplify()
            }
        }

        impl $trait<$scalar> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: $scalar) -> Expr {
                Expr::$ctor(self, rhs).inner_simplify()
            }
        }

        impl $trait<Expr> for $scalar {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::$ctor(self, rhs).inner_simplify()
            }
        }

        impl $trait<&Expr> for $scalar {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::$ctor(self, rhs).inner_simplify()
            }
        }
    };
}

impl_binary_op!(Add, add, sum);
impl_binary_op!(Sub, sub, minus);
impl_binary_op!(Mul, mul, mul);
impl_binary_op!(Div, div, div);

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self).inner_simplify()
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::negate(self).inner_simplify()
    }
}
