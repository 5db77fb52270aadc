//! Stack machine executing compiled bytecode.
//!
//! Every call starts from an empty operand stack and must end with exactly
//! one value on it; anything else is a compiler defect and is reported as
//! `MathError::Internal`.

use num::complex::Complex64;

use super::instruction::Instruction;
use crate::core::error::MathError;
use crate::core::expr::UnaryFn;
use crate::math;

/// Operand stack and cache slots, reused across calls.
#[derive(Debug, Default)]
pub(crate) struct Scratch {
    stack: Vec<Complex64>,
    cache: Vec<Complex64>,
}

impl Scratch {
    pub(crate) fn new(stack_size: usize, cache_size: usize) -> Self {
        Self {
            stack: Vec::with_capacity(stack_size),
            cache: vec![Complex64::new(0.0, 0.0); cache_size],
        }
    }

    #[inline]
    fn pop(&mut self) -> Result<Complex64, MathError> {
        self.stack
            .pop()
            .ok_or_else(|| MathError::internal("operand stack underflow"))
    }
}

pub(crate) fn apply_function(func: UnaryFn, z: Complex64) -> Complex64 {
    match func {
        UnaryFn::Sin => math::sin(z),
        UnaryFn::Cos => math::cos(z),
        UnaryFn::Tan => math::tan(z),
        UnaryFn::Cotan => math::cotan(z),
        UnaryFn::Arcsin => math::arcsin(z),
        UnaryFn::Arccos => math::arccos(z),
        UnaryFn::Arctan => math::arctan(z),
        UnaryFn::Arccotan => math::arccotan(z),
        UnaryFn::Abs => math::abs(z),
        UnaryFn::Signum => math::signum(z),
        UnaryFn::Factorial => math::factorial(z),
    }
}

/// Run `code` with the given arguments. The argument count was checked by the caller.
pub(crate) fn execute(
    code: &[Instruction],
    args: &[Complex64],
    scratch: &mut Scratch,
) -> Result<Complex64, MathError> {
    scratch.stack.clear();
    for instruction in code {
        match *instruction {
            Instruction::PushConst(c) => scratch.stack.push(c),
            Instruction::PushVar(index) => {
                let value = args
                    .get(index)
                    .copied()
                    .ok_or_else(|| MathError::internal(format!("parameter index {index} out of range")))?;
                scratch.stack.push(value);
            }
            Instruction::SaveCache(slot) => {
                let top = scratch
                    .stack
                    .last()
                    .copied()
                    .ok_or_else(|| MathError::internal("save_cache on an empty stack"))?;
                let cell = scratch
                    .cache
                    .get_mut(slot)
                    .ok_or_else(|| MathError::internal(format!("cache slot {slot} out of range")))?;
                *cell = top;
            }
            Instruction::LoadCache(slot) => {
                let value = scratch
                    .cache
                    .get(slot)
                    .copied()
                    .ok_or_else(|| MathError::internal(format!("cache slot {slot} out of range")))?;
                scratch.stack.push(value);
            }
            Instruction::CallSum
            | Instruction::CallMinus
            | Instruction::CallMul
            | Instruction::CallDiv
            | Instruction::CallPow
            | Instruction::CallLog => {
                let first = scratch.pop()?;
                let second = scratch.pop()?;
                let value = match *instruction {
                    Instruction::CallSum => first + second,
                    Instruction::CallMinus => first - second,
                    Instruction::CallMul => first * second,
                    Instruction::CallDiv => first / second,
                    Instruction::CallPow => math::pow(first, second),
                    _ => math::log(first, second),
                };
                scratch.stack.push(value);
            }
            Instruction::CallFunction(func) => {
                let arg = scratch.pop()?;
                scratch.stack.push(apply_function(func, arg));
            }
        }
    }

    match scratch.stack.as_slice() {
        [result] => Ok(*result),
        rest => Err(MathError::internal(format!(
            "execution ended with {} values on the stack",
            rest.len()
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use super::*;

    fn c(x: f64) -> Complex64 {
        Complex64::new(x, 0.0)
    }

    #[test]
    fn test_first_operand_is_popped_first() {
        // 6 / 3: divisor pushed first
        let code = [Instruction::PushConst(c(3.0)), Instruction::PushConst(c(6.0)), Instruction::CallDiv];
        let mut scratch = Scratch::new(2, 0);
        assert_eq!(execute(&code, &[], &mut scratch).unwrap(), c(2.0));
    }

    #[test]
    fn test_cache_round_trip() {
        let code = [
            Instruction::PushVar(0),
            Instruction::SaveCache(0),
            Instruction::LoadCache(0),
            Instruction::CallMul,
        ];
        let mut scratch = Scratch::new(2, 1);
        assert_eq!(execute(&code, &[c(4.0)], &mut scratch).unwrap(), c(16.0));
    }

    #[test]
    fn test_stack_imbalance_is_internal_error() {
        let code = [Instruction::PushConst(c(1.0)), Instruction::PushConst(c(2.0))];
        let mut scratch = Scratch::default();
        assert!(matches!(execute(&code, &[], &mut scratch), Err(MathError::Internal(_))));
        let code = [Instruction::CallSum];
        assert!(matches!(execute(&code, &[], &mut scratch), Err(MathError::Internal(_))));
    }
}
