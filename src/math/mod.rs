//! Numeric kernels shared by the tree evaluator and the bytecode VM.
//!
//! All functions take and return `Complex64`. Purely real inputs inside a
//! function's real domain go through the `f64` routines, so real arguments
//! never pick up spurious imaginary noise.

use num::complex::Complex64;
use std::f64::consts::{FRAC_PI_2, PI};

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFICIENTS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

#[inline]
fn real(x: f64) -> Complex64 {
    Complex64::new(x, 0.0)
}

#[inline]
fn is_real(z: Complex64) -> bool {
    z.im == 0.0
}

/// Integral value of `z` when it is a real integer that fits an `i32`.
fn as_small_integer(z: Complex64) -> Option<i32> {
    if is_real(z) && z.re.fract() == 0.0 && z.re.abs() <= f64::from(i32::MAX) {
        Some(z.re as i32)
    } else {
        None
    }
}

pub fn sin(z: Complex64) -> Complex64 {
    if is_real(z) { real(z.re.sin()) } else { z.sin() }
}

pub fn cos(z: Complex64) -> Complex64 {
    if is_real(z) { real(z.re.cos()) } else { z.cos() }
}

pub fn tan(z: Complex64) -> Complex64 {
    if is_real(z) { real(z.re.tan()) } else { z.tan() }
}

pub fn cotan(z: Complex64) -> Complex64 {
    if is_real(z) {
        real(1.0 / z.re.tan())
    } else {
        Complex64::new(1.0, 0.0) / z.tan()
    }
}

pub fn arcsin(z: Complex64) -> Complex64 {
    if is_real(z) && z.re.abs() <= 1.0 {
        real(z.re.asin())
    } else {
        z.asin()
    }
}

pub fn arccos(z: Complex64) -> Complex64 {
    if is_real(z) && z.re.abs() <= 1.0 {
        real(z.re.acos())
    } else {
        z.acos()
    }
}

pub fn arctan(z: Complex64) -> Complex64 {
    if is_real(z) { real(z.re.atan()) } else { z.atan() }
}

/// `arccot(z) = arctan(1/z)`, with `arccot(0) = pi/2`.
pub fn arccotan(z: Complex64) -> Complex64 {
    if z == Complex64::new(0.0, 0.0) {
        real(FRAC_PI_2)
    } else if is_real(z) {
        real((1.0 / z.re).atan())
    } else {
        (Complex64::new(1.0, 0.0) / z).atan()
    }
}

pub fn abs(z: Complex64) -> Complex64 {
    real(z.norm())
}

/// `z / |z|`, zero for zero.
pub fn signum(z: Complex64) -> Complex64 {
    if z == Complex64::new(0.0, 0.0) {
        z
    } else if is_real(z) {
        real(z.re.signum())
    } else {
        z / z.norm()
    }
}

/// `z! = gamma(z + 1)`; exact products for small non-negative integers.
pub fn factorial(z: Complex64) -> Complex64 {
    if let Some(n) = as_small_integer(z)
        && (0..=170).contains(&n)
    {
        return real((1..=n).map(f64::from).product());
    }
    gamma(z + 1.0)
}

/// Lanczos approximation (g = 7, n = 9) with the reflection formula for `re < 1/2`.
pub fn gamma(z: Complex64) -> Complex64 {
    if is_real(z) && z.re <= 0.0 && z.re.fract() == 0.0 {
        return real(f64::NAN);
    }
    if z.re < 0.5 {
        let pi = real(PI);
        return pi / ((pi * z).sin() * gamma(1.0 - z));
    }
    let z = z - 1.0;
    let mut series = real(LANCZOS_COEFFICIENTS[0]);
    for (i, &c) in LANCZOS_COEFFICIENTS.iter().enumerate().skip(1) {
        series += c / (z + i as f64);
    }
    let t = z + LANCZOS_G + 0.5;
    (2.0 * PI).sqrt() * t.powc(z + 0.5) * (-t).exp() * series
}

/// `base ^ exponent`.
///
/// Integral exponents use repeated multiplication, so `3^2` is exactly `9`.
pub fn pow(base: Complex64, exponent: Complex64) -> Complex64 {
    if let Some(n) = as_small_integer(exponent) {
        if n < 0 && base == Complex64::new(0.0, 0.0) {
            return real(f64::NAN);
        }
        return base.powi(n);
    }
    if is_real(base) && is_real(exponent) && base.re >= 0.0 {
        return real(base.re.powf(exponent.re));
    }
    if base == Complex64::new(0.0, 0.0) {
        return if exponent.re > 0.0 {
            base
        } else {
            real(f64::NAN)
        };
    }
    base.powc(exponent)
}

/// Logarithm of `arg` in base `base`.
pub fn log(base: Complex64, arg: Complex64) -> Complex64 {
    if is_real(base) && is_real(arg) && base.re > 0.0 && arg.re > 0.0 {
        real(arg.re.ln() / base.re.ln())
    } else {
        arg.ln() / base.ln()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, reason = "Standard test relaxations")]
mod tests {
    use super::*;

    fn close(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() <= 1e-9 * (1.0 + b.norm())
    }

    #[test]
    fn test_integer_powers_are_exact() {
        assert_eq!(pow(real(3.0), real(2.0)), real(9.0));
        assert_eq!(pow(real(2.0), real(-2.0)), real(0.25));
        let i = Complex64::new(0.0, 1.0);
        assert_eq!(pow(i, real(2.0)), real(-1.0));
    }

    #[test]
    fn test_negative_base_fractional_power_is_complex() {
        let r = pow(real(-4.0), real(0.5));
        assert!(close(r, Complex64::new(0.0, 2.0)));
    }

    #[test]
    fn test_factorial_and_gamma() {
        assert_eq!(factorial(real(5.0)), real(120.0));
        assert!(close(factorial(real(0.5)), real(0.886_226_925_452_758)));
        assert!(close(gamma(real(-0.5)), real(-3.544_907_701_811_032)));
        assert!(gamma(real(-2.0)).re.is_nan());
    }

    #[test]
    fn test_real_inputs_stay_real() {
        assert_eq!(sin(real(0.0)), real(0.0));
        assert_eq!(arcsin(real(1.0)).im, 0.0);
        assert!(close(arcsin(real(2.0)), real(2.0).asin()));
        assert_eq!(arccotan(real(0.0)), real(FRAC_PI_2));
        assert!(close(log(real(2.0), real(8.0)), real(3.0)));
    }

    #[test]
    fn test_signum() {
        assert_eq!(signum(real(-3.0)), real(-1.0));
        assert_eq!(signum(real(0.0)), real(0.0));
        let s = signum(Complex64::new(3.0, 4.0));
        assert!(close(s, Complex64::new(0.6, 0.8)));
    }
}
