//! Ambient engine configuration.
//!
//! Settings are plain values. The active settings of a thread are the top of a
//! thread-local stack; [`Settings::scoped`] pushes an override and returns a
//! guard that pops it again on every exit path, unwinding included.
//!
//! ```
//! use symb_engine::{Settings, with_settings};
//!
//! let strict = Settings::default().with_max_rewrite_iterations(10);
//! let inside = with_settings(strict, || Settings::current().max_rewrite_iterations);
//! assert_eq!(inside, 10);
//! assert_eq!(Settings::current().max_rewrite_iterations, 10_000);
//! ```

use std::cell::RefCell;
use std::marker::PhantomData;

/// Rounding mode applied when an inexact value is cut to the decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round half away from zero.
    HalfUp,
    /// Banker's rounding.
    HalfEven,
    /// Truncate towards zero.
    Down,
}

/// Significant-digit context used to round every inexact (`Real`) result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalContext {
    /// Number of significant decimal digits kept, at most 17 are meaningful for `f64`.
    pub precision: u32,
    pub rounding: Rounding,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self {
            precision: 15,
            rounding: Rounding::HalfUp,
        }
    }
}

impl DecimalContext {
    pub const fn new(precision: u32, rounding: Rounding) -> Self {
        Self {
            precision,
            rounding,
        }
    }

    /// Round `x` to `precision` significant digits.
    ///
    /// Non-finite values, zero, and values whose scaling would overflow are
    /// returned unchanged.
    pub fn round(&self, x: f64) -> f64 {
        if !x.is_finite() || x == 0.0 || self.precision == 0 || self.precision >= 17 {
            return x;
        }
        let magnitude = x.abs().log10().floor() as i32;
        let shift = self.precision as i32 - 1 - magnitude;
        let scale = 10f64.powi(shift);
        if !scale.is_finite() || scale == 0.0 {
            return x;
        }
        let scaled = x * scale;
        if !scaled.is_finite() {
            return x;
        }
        let rounded = match self.rounding {
            Rounding::HalfUp => scaled.round(),
            Rounding::HalfEven => scaled.round_ties_even(),
            Rounding::Down => scaled.trunc(),
        };
        let result = rounded / scale;
        if result.is_finite() { result } else { x }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    /// Upper bound on the number of terms an expansion may produce.
    pub max_expansion_term_count: usize,
    /// Absolute magnitude below which an inexact value counts as zero.
    pub precision_error_zero_range: f64,
    /// Tolerance for approximate numeric comparison.
    pub precision_error_common: f64,
    /// Rounding context for inexact results.
    pub decimal_precision: DecimalContext,
    /// Continued-fraction steps tried when reconstructing a rational from a real.
    pub float_to_rational_iter_count: u32,
    /// Rewrite budget of a single `inner_simplify` call.
    pub max_rewrite_iterations: usize,
    /// Number of search rounds performed by `simplify`.
    pub simplify_level: usize,
    /// Whether arithmetic results are downcast to the lowest exact level.
    pub downcasting_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_expansion_term_count: 2000,
            precision_error_zero_range: 1e-16,
            precision_error_common: 1e-6,
            decimal_precision: DecimalContext::default(),
            float_to_rational_iter_count: 15,
            max_rewrite_iterations: 10_000,
            simplify_level: 2,
            downcasting_enabled: true,
        }
    }
}

thread_local! {
    static OVERRIDES: RefCell<Vec<Settings>> = const { RefCell::new(Vec::new()) };
}

impl Settings {
    /// The settings active on the current thread.
    pub fn current() -> Self {
        OVERRIDES.with(|stack| stack.borrow().last().copied().unwrap_or_default())
    }

    /// Make these settings active until the returned guard is dropped.
    #[must_use = "the override is removed as soon as the guard is dropped"]
    pub fn scoped(self) -> SettingsGuard {
        let depth = OVERRIDES.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(self);
            stack.len() - 1
        });
        SettingsGuard {
            depth,
            _not_send: PhantomData,
        }
    }

    #[must_use]
    pub const fn with_max_expansion_term_count(mut self, count: usize) -> Self {
        self.max_expansion_term_count = count;
        self
    }

    #[must_use]
    pub const fn with_precision_error_zero_range(mut self, range: f64) -> Self {
        self.precision_error_zero_range = range;
        self
    }

    #[must_use]
    pub const fn with_precision_error_common(mut self, tolerance: f64) -> Self {
        self.precision_error_common = tolerance;
        self
    }

    #[must_use]
    pub const fn with_decimal_precision(mut self, context: DecimalContext) -> Self {
        self.decimal_precision = context;
        self
    }

    #[must_use]
    pub const fn with_float_to_rational_iter_count(mut self, count: u32) -> Self {
        self.float_to_rational_iter_count = count;
        self
    }

    #[must_use]
    pub const fn with_max_rewrite_iterations(mut self, iterations: usize) -> Self {
        self.max_rewrite_iterations = iterations;
        self
    }

    #[must_use]
    pub const fn with_simplify_level(mut self, level: usize) -> Self {
        self.simplify_level = level;
        self
    }

    #[must_use]
    pub const fn with_downcasting(mut self, enabled: bool) -> Self {
        self.downcasting_enabled = enabled;
        self
    }
}

/// Restores the previously active settings when dropped.
///
/// Guards are tied to the thread that created them.
#[derive(Debug)]
pub struct SettingsGuard {
    depth: usize,
    _not_send: PhantomData<*const ()>,
}

impl Drop for SettingsGuard {
    fn drop(&mut self) {
        OVERRIDES.with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}

/// Run `f` with `settings` active on the current thread.
pub fn with_settings<R>(settings: Settings, f: impl FnOnce() -> R) -> R {
    let _guard = settings.scoped();
    f()
}
