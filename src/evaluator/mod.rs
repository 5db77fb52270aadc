//! Compiled expressions for fast repeated numeric evaluation.
//!
//! A tree is compiled once into flat bytecode for a small stack machine, then
//! called many times with different argument values.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐    ┌────────────┐    ┌─────────────────────┐
//! │    Expr     │ -> │  Compiler  │ -> │  CompiledFunction   │
//! │   (tree)    │    │ (CSE, emit)│    │   (stack machine)   │
//! └─────────────┘    └────────────┘    └─────────────────────┘
//!                                              │
//!                          ┌───────────────────┼───────────────────┐
//!                          ▼                   ▼                   ▼
//!                    ┌──────────┐       ┌──────────┐       ┌──────────┐
//!                    │   call   │       │call_batch│       │ parallel │
//!                    │ (scalar) │       │ (points) │       │  (Rayon) │
//!                    └──────────┘       └──────────┘       └──────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use symb_engine::{Expr, var};
//!
//! let x = var("x");
//! let e = Expr::sum(Expr::pow(x.clone(), 2), Expr::pow(x, 2));
//! let f = e.compile(&["x"])?;
//! assert_eq!(f.cache_size(), 1);
//! assert_eq!(f.call_real(&[3.0])?, 18.0);
//! # Ok::<(), symb_engine::MathError>(())
//! ```

mod compiler;
mod execution;
mod instruction;

pub use compiler::CompileOptions;
pub use instruction::Instruction;

use log::debug;
use num::complex::Complex64;
use std::fmt;
use std::sync::{Mutex, TryLockError};

use crate::core::error::MathError;
use crate::core::expr::Expr;
use crate::core::known_symbols::Variable;
use crate::core::settings::Settings;
use compiler::Compiler;
use execution::{Scratch, execute};

/// Types usable as parameter names: strings and [`Variable`]s.
pub trait ParamName {
    fn to_variable(&self) -> Variable;
}

impl<T: AsRef<str>> ParamName for T {
    fn to_variable(&self) -> Variable {
        Variable::new(self.as_ref())
    }
}

impl ParamName for Variable {
    fn to_variable(&self) -> Variable {
        self.clone()
    }
}

impl ParamName for &Variable {
    fn to_variable(&self) -> Variable {
        (*self).clone()
    }
}

/// Compiled expression: bytecode plus the parameter order.
///
/// `CompiledFunction` is `Send + Sync`. Calls reuse one scratch buffer behind
/// a mutex; a call that finds it busy allocates its own.
pub struct CompiledFunction {
    instructions: Box<[Instruction]>,
    params: Box<[Variable]>,
    stack_size: usize,
    cache_size: usize,
    scratch: Mutex<Scratch>,
}

impl CompiledFunction {
    /// Compile `expr` with the given parameter order.
    ///
    /// The constants `pi` and `e` are baked into the bytecode and take no
    /// argument position, even when listed in `params`.
    ///
    /// # Errors
    /// - `UnboundVariable`: a free variable is not in `params`
    /// - `UncompilableNode`: unresolved derivative, integral or limit, or a
    ///   boolean node
    pub fn compile<P: ParamName>(expr: &Expr, params: &[P], options: CompileOptions) -> Result<Self, MathError> {
        let params: Box<[Variable]> = params
            .iter()
            .map(ParamName::to_variable)
            .filter(|v| !v.is_constant())
            .collect();
        let mut compiler = Compiler::new(expr, &params, options);
        compiler.compile_expr(expr)?;
        let (instructions, stack_size, cache_size) = compiler.into_parts();
        debug!(
            "compiled {} nodes into {} instructions, {} cache slots, stack depth {}",
            expr.complexity(),
            instructions.len(),
            cache_size,
            stack_size
        );
        Ok(Self {
            instructions: instructions.into_boxed_slice(),
            stack_size,
            cache_size,
            scratch: Mutex::new(Scratch::new(stack_size, cache_size)),
            params,
        })
    }

    /// Evaluate at one point.
    ///
    /// # Errors
    /// `WrongArgumentCount` when `args` does not match the parameter list.
    pub fn call(&self, args: &[Complex64]) -> Result<Complex64, MathError> {
        if args.len() != self.params.len() {
            return Err(MathError::WrongArgumentCount {
                expected: self.params.len(),
                got: args.len(),
            });
        }
        match self.scratch.try_lock() {
            Ok(mut scratch) => execute(&self.instructions, args, &mut scratch),
            Err(TryLockError::Poisoned(poisoned)) => execute(&self.instructions, args, &mut poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => {
                let mut scratch = Scratch::new(self.stack_size, self.cache_size);
                execute(&self.instructions, args, &mut scratch)
            }
        }
    }

    /// Evaluate at a real point.
    ///
    /// Returns `NaN` when the result has a non-negligible imaginary part
    /// (relative to `Settings::precision_error_common`).
    ///
    /// # Errors
    /// `WrongArgumentCount` when `args` does not match the parameter list.
    pub fn call_real(&self, args: &[f64]) -> Result<f64, MathError> {
        let args: Vec<Complex64> = args.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        let z = self.call(&args)?;
        let tolerance = Settings::current().precision_error_common * z.re.abs().max(1.0);
        Ok(if z.im.abs() <= tolerance { z.re } else { f64::NAN })
    }

    /// Evaluate at many points.
    ///
    /// # Errors
    /// The first error of any point.
    pub fn call_batch<P: AsRef<[Complex64]>>(&self, points: &[P]) -> Result<Vec<Complex64>, MathError> {
        points.iter().map(|p| self.call(p.as_ref())).collect()
    }

    /// Evaluate at many points on the rayon thread pool.
    ///
    /// # Errors
    /// The first error of any point.
    #[cfg(feature = "parallel")]
    pub fn call_batch_parallel<P: AsRef<[Complex64]> + Sync>(
        &self,
        points: &[P],
    ) -> Result<Vec<Complex64>, MathError> {
        use rayon::prelude::*;
        points.par_iter().map(|p| self.call(p.as_ref())).collect()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Parameters in call order.
    #[must_use]
    pub fn params(&self) -> &[Variable] {
        &self.params
    }

    #[inline]
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Number of CSE cache slots.
    #[inline]
    #[must_use]
    pub const fn cache_size(&self) -> usize {
        self.cache_size
    }

    /// Maximum operand stack depth.
    #[inline]
    #[must_use]
    pub const fn stack_size(&self) -> usize {
        self.stack_size
    }
}

impl Clone for CompiledFunction {
    fn clone(&self) -> Self {
        Self {
            instructions: self.instructions.clone(),
            params: self.params.clone(),
            stack_size: self.stack_size,
            cache_size: self.cache_size,
            scratch: Mutex::new(Scratch::new(self.stack_size, self.cache_size)),
        }
    }
}

impl fmt::Debug for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFunction")
            .field("params", &self.params)
            .field("instruction_count", &self.instructions.len())
            .field("stack_size", &self.stack_size)
            .field("cache_size", &self.cache_size)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for CompiledFunction {
    /// One instruction per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{i:4}  {instruction}")?;
        }
        Ok(())
    }
}

impl Expr {
    /// Compile with common subexpression elimination.
    ///
    /// # Errors
    /// See [`CompiledFunction::compile`].
    pub fn compile<P: ParamName>(&self, params: &[P]) -> Result<CompiledFunction, MathError> {
        CompiledFunction::compile(self, params, CompileOptions::default())
    }

    /// Compile with explicit options.
    ///
    /// # Errors
    /// See [`CompiledFunction::compile`].
    pub fn compile_with<P: ParamName>(&self, params: &[P], options: CompileOptions) -> Result<CompiledFunction, MathError> {
        CompiledFunction::compile(self, params, options)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, reason = "Standard test relaxations")]
mod tests {
    use super::*;
    use crate::var;

    #[test]
    fn test_call_checks_argument_count() {
        let e = Expr::sum(var("x"), var("y"));
        let f = e.compile(&["x", "y"]).unwrap();
        assert_eq!(
            f.call(&[Complex64::new(1.0, 0.0)]),
            Err(MathError::WrongArgumentCount { expected: 2, got: 1 })
        );
    }

    #[test]
    fn test_constants_take_no_argument_position() {
        // pi * r^2
        let e = Expr::mul(Expr::pi(), Expr::pow(var("r"), 2));
        let f = e.compile(&["r", "pi"]).unwrap();
        assert_eq!(f.param_count(), 1);
        assert_eq!(f.params().to_vec(), vec![Variable::new("r")]);
        let area = f.call_real(&[2.0]).unwrap();
        assert!((area - 4.0 * std::f64::consts::PI).abs() < 1e-12);

        let f = e.compile(&["pi", "r"]).unwrap();
        assert_eq!(f.call_real(&[2.0]).unwrap(), area);
    }

    #[test]
    fn test_complex_arguments() {
        let e = Expr::mul(var("z"), var("z"));
        let f = e.compile(&["z"]).unwrap();
        let i = Complex64::new(0.0, 1.0);
        assert_eq!(f.call(&[i]).unwrap(), Complex64::new(-1.0, 0.0));
        // sqrt(-1) is not real
        let f = Expr::sqrt(var("x")).compile(&["x"]).unwrap();
        assert!(f.call_real(&[-1.0]).unwrap().is_nan());
        assert_eq!(f.call_real(&[4.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_batch_and_clone() {
        let e = Expr::sum(Expr::mul(2, var("x")), 1);
        let f = e.compile(&[Variable::new("x")]).unwrap();
        let points: Vec<Vec<Complex64>> = (0..4).map(|i| vec![Complex64::new(f64::from(i), 0.0)]).collect();
        let values = f.clone().call_batch(&points).unwrap();
        let reals: Vec<f64> = values.iter().map(|z| z.re).collect();
        assert_eq!(reals, vec![1.0, 3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_display_lists_instructions() {
        let f = Expr::sin(var("x")).compile(&["x"]).unwrap();
        assert_eq!(f.to_string(), "   0  push_var 0\n   1  call sin\n");
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_batch_matches_sequential() {
        let e = Expr::mul(Expr::cos(var("x")), var("x"));
        let f = e.compile(&["x"]).unwrap();
        let points: Vec<[Complex64; 1]> = (0..256).map(|i| [Complex64::new(f64::from(i) / 10.0, 0.0)]).collect();
        assert_eq!(f.call_batch_parallel(&points).unwrap(), f.call_batch(&points).unwrap());
    }
}
