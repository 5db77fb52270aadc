//! The numeric tower: `Integer ⊂ Rational ⊂ Real ⊂ Complex`.
//!
//! Integers and rationals are exact. Reals are `f64` values rounded through
//! the active [`DecimalContext`](crate::DecimalContext). A complex number
//! holds two non-complex parts. Every constructor and every arithmetic result
//! is **downcast** to the lowest level that represents the value exactly:
//!
//! ```
//! use symb_engine::Number;
//!
//! assert_eq!(Number::rational(4, 2), Number::integer(2));
//! assert_eq!(Number::real(2.5), Number::rational(5, 2));
//! assert_eq!(Number::complex(Number::integer(3), Number::integer(0)), Number::integer(3));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use num::complex::Complex64;
use num::{BigInt, BigRational, One, Signed, ToPrimitive, Zero};
use num_traits::FromPrimitive;
use ordered_float::OrderedFloat;

use crate::core::settings::Settings;
use crate::math;

/// Largest exponent for which integer powers are computed exactly.
const MAX_EXACT_EXPONENT: u64 = 4096;
/// Largest bit size of an exact power result before falling back to `f64`.
const MAX_EXACT_POWER_BITS: u64 = 1 << 16;
/// Largest denominator accepted when reconstructing a rational from a real.
const MAX_RECONSTRUCTED_DENOMINATOR: i128 = 1_000_000;
/// Largest argument of an exact factorial.
const MAX_EXACT_FACTORIAL: u64 = 1000;

/// A number at one of the four levels of the tower.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Number {
    Integer(BigInt),
    Rational(BigRational),
    Real(OrderedFloat<f64>),
    Complex(Box<ComplexParts>),
}

/// Real and imaginary parts of a complex number, both non-complex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComplexParts {
    pub re: Number,
    pub im: Number,
}

/// Position of a number in the tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumberLevel {
    Integer,
    Rational,
    Real,
    Complex,
}

#[derive(Clone, Copy)]
enum Arith {
    Add,
    Sub,
    Mul,
}

impl Number {
    // -------------------------------------------------------------------------
    // Constructors
    // -------------------------------------------------------------------------

    pub fn integer(n: impl Into<BigInt>) -> Self {
        Self::Integer(n.into())
    }

    /// `numerator / denominator`, NaN for a zero denominator.
    pub fn rational(numerator: impl Into<BigInt>, denominator: impl Into<BigInt>) -> Self {
        let denominator = denominator.into();
        if denominator.is_zero() {
            return Self::nan();
        }
        Self::from_ratio(BigRational::new(numerator.into(), denominator))
    }

    pub fn from_ratio(ratio: BigRational) -> Self {
        if ratio.is_integer() {
            Self::Integer(ratio.to_integer())
        } else {
            Self::Rational(ratio)
        }
    }

    /// A real value, downcast when it is exactly representable.
    pub fn real(x: f64) -> Self {
        downcast_real(x, &Settings::current())
    }

    /// `re + im·i`. Parts may themselves be complex.
    pub fn complex(re: Number, im: Number) -> Self {
        if re.level() == NumberLevel::Complex || im.level() == NumberLevel::Complex {
            // (a + bi) + i(c + di) = (a - d) + (b + c)i
            let (a, b) = re.into_parts();
            let (c, d) = im.into_parts();
            return Self::complex(&a - &d, &b + &c);
        }
        Self::Complex(Box::new(ComplexParts { re, im })).downcast()
    }

    /// The imaginary unit `i`.
    pub fn imaginary_unit() -> Self {
        Self::Complex(Box::new(ComplexParts {
            re: Self::zero(),
            im: Self::one(),
        }))
    }

    /// Convert a floating point complex value.
    ///
    /// A part smaller than the other one by more than the decimal precision is
    /// rounding noise and becomes zero, so `(-4)^(1/2)` lands on `2i`.
    pub fn from_complex64(z: Complex64) -> Self {
        let settings = Settings::current();
        let negligible = 10f64.powi(-(settings.decimal_precision.precision as i32));
        let re = if z.re.abs() <= z.im.abs() * negligible { 0.0 } else { z.re };
        let im = if z.im.abs() <= z.re.abs() * negligible { 0.0 } else { z.im };
        if im == 0.0 {
            downcast_real(re, &settings)
        } else {
            Self::Complex(Box::new(ComplexParts {
                re: Self::raw_real(re),
                im: Self::raw_real(im),
            }))
            .downcast_with(&settings)
        }
    }

    pub fn zero() -> Self {
        Self::Integer(BigInt::zero())
    }

    pub fn one() -> Self {
        Self::Integer(BigInt::one())
    }

    pub fn minus_one() -> Self {
        Self::Integer(-BigInt::one())
    }

    pub fn nan() -> Self {
        Self::Real(OrderedFloat(f64::NAN))
    }

    fn raw_real(x: f64) -> Self {
        Self::Real(OrderedFloat(x))
    }

    // -------------------------------------------------------------------------
    // Downcasting
    // -------------------------------------------------------------------------

    /// Move the number to the lowest level that represents it exactly.
    #[must_use]
    pub fn downcast(self) -> Self {
        self.downcast_with(&Settings::current())
    }

    fn downcast_with(self, settings: &Settings) -> Self {
        match self {
            Self::Integer(_) => self,
            Self::Rational(r) => Self::from_ratio(r),
            Self::Real(x) => downcast_real(x.0, settings),
            Self::Complex(parts) => {
                let ComplexParts { re, im } = *parts;
                let re = re.downcast_with(settings);
                let im = im.downcast_with(settings);
                if im.is_zero_with(settings) {
                    re
                } else {
                    Self::Complex(Box::new(ComplexParts { re, im }))
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn level(&self) -> NumberLevel {
        match self {
            Self::Integer(_) => NumberLevel::Integer,
            Self::Rational(_) => NumberLevel::Rational,
            Self::Real(_) => NumberLevel::Real,
            Self::Complex(_) => NumberLevel::Complex,
        }
    }

    /// Exact numbers are integers, rationals and complex numbers with exact parts.
    pub fn is_exact(&self) -> bool {
        match self {
            Self::Integer(_) | Self::Rational(_) => true,
            Self::Real(_) => false,
            Self::Complex(parts) => parts.re.is_exact() && parts.im.is_exact(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.is_zero_with(&Settings::current())
    }

    fn is_zero_with(&self, settings: &Settings) -> bool {
        match self {
            Self::Integer(n) => n.is_zero(),
            Self::Rational(r) => r.is_zero(),
            Self::Real(x) => x.0.abs() < settings.precision_error_zero_range,
            Self::Complex(parts) => {
                parts.re.is_zero_with(settings) && parts.im.is_zero_with(settings)
            }
        }
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Self::Integer(n) if n.is_one())
    }

    pub fn is_minus_one(&self) -> bool {
        matches!(self, Self::Integer(n) if *n == -BigInt::one())
    }

    /// Strictly negative real number. Complex numbers are never negative.
    pub fn is_negative(&self) -> bool {
        match self {
            Self::Integer(n) => n.is_negative(),
            Self::Rational(r) => r.is_negative(),
            Self::Real(x) => x.0 < 0.0,
            Self::Complex(_) => false,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer(_))
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Self::Integer(_) | Self::Rational(_) => true,
            Self::Real(x) => x.0.is_finite(),
            Self::Complex(parts) => parts.re.is_finite() && parts.im.is_finite(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => n.to_i64(),
            _ => None,
        }
    }

    pub fn as_ratio(&self) -> Option<BigRational> {
        match self {
            Self::Integer(n) => Some(BigRational::from_integer(n.clone())),
            Self::Rational(r) => Some(r.clone()),
            Self::Real(_) | Self::Complex(_) => None,
        }
    }

    /// Value as `f64`, `None` for complex numbers.
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(n) => n.to_f64(),
            Self::Rational(r) => ratio_to_f64(r),
            Self::Real(x) => Some(x.0),
            Self::Complex(_) => None,
        }
    }

    pub fn to_complex64(&self) -> Complex64 {
        match self {
            Self::Complex(parts) => Complex64::new(
                parts.re.to_f64().unwrap_or(f64::NAN),
                parts.im.to_f64().unwrap_or(f64::NAN),
            ),
            _ => Complex64::new(self.to_f64().unwrap_or(f64::NAN), 0.0),
        }
    }

    pub fn real_part(&self) -> Self {
        match self {
            Self::Complex(parts) => parts.re.clone(),
            _ => self.clone(),
        }
    }

    pub fn imaginary_part(&self) -> Self {
        match self {
            Self::Complex(parts) => parts.im.clone(),
            _ => Self::zero(),
        }
    }

    fn into_parts(self) -> (Self, Self) {
        match self {
            Self::Complex(parts) => {
                let ComplexParts { re, im } = *parts;
                (re, im)
            }
            other => (other, Self::zero()),
        }
    }

    /// Equality within `precision_error_common` for inexact values.
    pub fn approx_eq(&self, other: &Self) -> bool {
        if self.is_exact() && other.is_exact() {
            return self == other;
        }
        let tolerance = Settings::current().precision_error_common;
        (self.to_complex64() - other.to_complex64()).norm() <= tolerance
    }

    /// Ordering of two real numbers, `None` when either is complex or NaN.
    pub fn partial_cmp_value(&self, other: &Self) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_ratio(), other.as_ratio()) {
            return Some(a.cmp(&b));
        }
        self.to_f64()?.partial_cmp(&other.to_f64()?)
    }

    // -------------------------------------------------------------------------
    // Arithmetic
    // -------------------------------------------------------------------------

    fn arith(&self, other: &Self, op: Arith) -> Self {
        if self.level() == NumberLevel::Complex || other.level() == NumberLevel::Complex {
            let (a, b) = self.clone().into_parts();
            let (c, d) = other.clone().into_parts();
            return match op {
                Arith::Add => Self::complex(&a + &c, &b + &d),
                Arith::Sub => Self::complex(&a - &c, &b - &d),
                Arith::Mul => Self::complex(&(&a * &c) - &(&b * &d), &(&a * &d) + &(&b * &c)),
            };
        }
        if let (Self::Integer(x), Self::Integer(y)) = (self, other) {
            return Self::Integer(match op {
                Arith::Add => x + y,
                Arith::Sub => x - y,
                Arith::Mul => x * y,
            });
        }
        if let (Some(x), Some(y)) = (self.as_ratio(), other.as_ratio()) {
            return Self::from_ratio(match op {
                Arith::Add => x + y,
                Arith::Sub => x - y,
                Arith::Mul => x * y,
            });
        }
        let x = self.to_f64().unwrap_or(f64::NAN);
        let y = other.to_f64().unwrap_or(f64::NAN);
        Self::real(match op {
            Arith::Add => x + y,
            Arith::Sub => x - y,
            Arith::Mul => x * y,
        })
    }

    /// `self / other`, `None` when `other` is zero.
    pub fn checked_div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        if self.level() == NumberLevel::Complex || other.level() == NumberLevel::Complex {
            // (a + bi) / (c + di) = ((ac + bd) + (bc - ad)i) / (c² + d²)
            let (a, b) = self.clone().into_parts();
            let (c, d) = other.clone().into_parts();
            let norm = &(&c * &c) + &(&d * &d);
            let re = (&(&a * &c) + &(&b * &d)).checked_div(&norm)?;
            let im = (&(&b * &c) - &(&a * &d)).checked_div(&norm)?;
            return Some(Self::complex(re, im));
        }
        if let (Some(x), Some(y)) = (self.as_ratio(), other.as_ratio()) {
            return Some(Self::from_ratio(x / y));
        }
        Some(Self::real(self.to_f64()? / other.to_f64()?))
    }

    /// `self ^ exponent`.
    ///
    /// Integral exponents on exact bases stay exact as long as the result is
    /// of reasonable size; everything else goes through floating point and is
    /// downcast afterwards.
    #[must_use]
    pub fn pow(&self, exponent: &Self) -> Self {
        if let Some(e) = exponent.as_i64()
            && e.unsigned_abs() <= MAX_EXACT_EXPONENT
            && let Some(exact) = self.exact_integer_power(e)
        {
            return exact;
        }
        match (self.to_f64(), exponent.to_f64()) {
            (Some(b), Some(e)) if b >= 0.0 || e.fract() == 0.0 => Self::real(b.powf(e)),
            _ => Self::from_complex64(math::pow(self.to_complex64(), exponent.to_complex64())),
        }
    }

    fn exact_integer_power(&self, e: i64) -> Option<Self> {
        if e < 0 {
            let positive = self.exact_integer_power(-e)?;
            return Self::one().checked_div(&positive).or_else(|| Some(Self::nan()));
        }
        let bits = match self {
            Self::Integer(n) => n.bits(),
            Self::Rational(r) => r.numer().bits().max(r.denom().bits()),
            Self::Complex(_) if self.is_exact() => 64,
            _ => return None,
        };
        if bits.saturating_mul(e as u64) > MAX_EXACT_POWER_BITS {
            return None;
        }
        let e = u32::try_from(e).ok()?;
        match self {
            Self::Integer(n) => Some(Self::Integer(n.pow(e))),
            Self::Rational(r) => Some(Self::from_ratio(BigRational::new(
                r.numer().pow(e),
                r.denom().pow(e),
            ))),
            _ => {
                // square-and-multiply keeps exact complex parts exact
                let mut result = Self::one();
                let mut base = self.clone();
                let mut e = e;
                while e > 0 {
                    if e & 1 == 1 {
                        result = &result * &base;
                    }
                    base = &base * &base;
                    e >>= 1;
                }
                Some(result)
            }
        }
    }

    /// Logarithm of `arg` in base `base`.
    pub fn log(base: &Self, arg: &Self) -> Self {
        if arg.is_one() {
            return Self::zero();
        }
        if base == arg && !base.is_one() && !base.is_zero() {
            return Self::one();
        }
        if let (Self::Integer(b), Self::Integer(a)) = (base, arg)
            && *b > BigInt::one()
            && a.is_positive()
        {
            let mut power = b.clone();
            let mut k = 1u32;
            while power < *a {
                power *= b;
                k += 1;
            }
            if power == *a {
                return Self::integer(k);
            }
        }
        Self::from_complex64(math::log(base.to_complex64(), arg.to_complex64()))
    }

    /// `n!` exact for small non-negative integers, via the gamma function otherwise.
    pub fn factorial(&self) -> Self {
        if let Self::Integer(n) = self {
            if n.is_negative() {
                return Self::nan();
            }
            if let Some(n) = n.to_u64()
                && n <= MAX_EXACT_FACTORIAL
            {
                let mut acc = BigInt::one();
                for k in 2..=n {
                    acc *= k;
                }
                return Self::Integer(acc);
            }
        }
        Self::from_complex64(math::factorial(self.to_complex64()))
    }
}

/// Round `x` through the decimal context and move it down the tower if possible.
fn downcast_real(x: f64, settings: &Settings) -> Number {
    if !x.is_finite() {
        return Number::raw_real(x);
    }
    let x = settings.decimal_precision.round(x);
    if !settings.downcasting_enabled {
        return Number::raw_real(x);
    }
    if x.abs() < settings.precision_error_zero_range {
        return Number::zero();
    }
    if x.fract() == 0.0
        && let Some(n) = BigInt::from_f64(x)
    {
        return Number::Integer(n);
    }
    match float_to_rational(x, settings.float_to_rational_iter_count) {
        Some(r) => Number::from_ratio(r),
        None => Number::raw_real(x),
    }
}

/// Continued-fraction reconstruction of a rational that converts back to exactly `x`.
fn float_to_rational(x: f64, iterations: u32) -> Option<BigRational> {
    if x.abs() >= 1e15 {
        return None;
    }
    let mut a = x.floor();
    let mut remainder = x - a;
    let (mut p_prev, mut q_prev) = (1i128, 0i128);
    let (mut p, mut q) = (a as i128, 1i128);
    for _ in 0..=iterations {
        if p as f64 / q as f64 == x {
            return Some(BigRational::new(BigInt::from(p), BigInt::from(q)));
        }
        if remainder == 0.0 {
            break;
        }
        let inverse = 1.0 / remainder;
        a = inverse.floor();
        remainder = inverse - a;
        let step = a as i128;
        let p_next = step.checked_mul(p)?.checked_add(p_prev)?;
        let q_next = step.checked_mul(q)?.checked_add(q_prev)?;
        if q_next > MAX_RECONSTRUCTED_DENOMINATOR {
            break;
        }
        (p_prev, q_prev, p, q) = (p, q, p_next, q_next);
    }
    None
}

fn ratio_to_f64(r: &BigRational) -> Option<f64> {
    let numer = r.numer().to_f64()?;
    let denom = r.denom().to_f64()?;
    if numer.is_finite() && denom.is_finite() {
        Some(numer / denom)
    } else {
        // both ends overflowed: scale down before dividing
        let shift = r.numer().bits().max(r.denom().bits()).saturating_sub(1000);
        let numer = (r.numer() >> shift).to_f64()?;
        let denom = (r.denom() >> shift).to_f64()?;
        Some(numer / denom)
    }
}

// =============================================================================
// OPERATOR TRAITS
// =============================================================================

impl Add for &Number {
    type Output = Number;
    fn add(self, rhs: Self) -> Number {
        self.arith(rhs, Arith::Add)
    }
}

impl Sub for &Number {
    type Output = Number;
    fn sub(self, rhs: Self) -> Number {
        self.arith(rhs, Arith::Sub)
    }
}

impl Mul for &Number {
    type Output = Number;
    fn mul(self, rhs: Self) -> Number {
        self.arith(rhs, Arith::Mul)
    }
}

/// Division by zero yields NaN, use [`Number::checked_div`] to detect it.
impl Div for &Number {
    type Output = Number;
    fn div(self, rhs: Self) -> Number {
        self.checked_div(rhs).unwrap_or_else(Number::nan)
    }
}

impl Neg for &Number {
    type Output = Number;
    fn neg(self) -> Number {
        match self {
            Number::Integer(n) => Number::Integer(-n),
            Number::Rational(r) => Number::Rational(-r),
            Number::Real(x) => Number::Real(OrderedFloat(-x.0)),
            Number::Complex(parts) => Number::Complex(Box::new(ComplexParts {
                re: -&parts.re,
                im: -&parts.im,
            })),
        }
    }
}

macro_rules! forward_owned_binop {
    ($($trait:ident :: $method:ident),*) => {
        $(
            impl $trait for Number {
                type Output = Number;
                fn $method(self, rhs: Self) -> Number {
                    (&self).$method(&rhs)
                }
            }
        )*
    };
}

forward_owned_binop!(Add::add, Sub::sub, Mul::mul, Div::div);

impl Neg for Number {
    type Output = Number;
    fn neg(self) -> Number {
        -&self
    }
}

// =============================================================================
// CONVERSIONS & FORMATTING
// =============================================================================

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Self::integer(n)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Self::integer(n)
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Self {
        Self::real(x)
    }
}

impl From<BigInt> for Number {
    fn from(n: BigInt) -> Self {
        Self::Integer(n)
    }
}

impl From<BigRational> for Number {
    fn from(r: BigRational) -> Self {
        Self::from_ratio(r)
    }
}

impl From<Complex64> for Number {
    fn from(z: Complex64) -> Self {
        Self::from_complex64(z)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            Self::Real(x) => write!(f, "{}", x.0),
            Self::Complex(parts) => {
                let ComplexParts { re, im } = parts.as_ref();
                let (sign, magnitude) = if im.is_negative() {
                    ("-", -im)
                } else {
                    ("+", im.clone())
                };
                let imaginary = if magnitude.is_one() {
                    "i".to_string()
                } else {
                    format!("{magnitude}i")
                };
                if re.is_zero() {
                    if sign == "-" {
                        write!(f, "-{imaginary}")
                    } else {
                        f.write_str(&imaginary)
                    }
                } else {
                    write!(f, "{re} {sign} {imaginary}")
                }
            }
        }
    }
}
