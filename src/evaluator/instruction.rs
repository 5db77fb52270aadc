//! Bytecode instruction definitions for the stack machine.
//!
//! Binary instructions pop their first operand, then their second one: the
//! compiler pushes the second operand before the first.

use num::complex::Complex64;
use std::fmt;

use crate::core::expr::UnaryFn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    /// Push a literal value
    PushConst(Complex64),
    /// Push the argument at this parameter index
    PushVar(usize),
    /// Copy the top of the stack into a cache slot, leaving the stack as is
    SaveCache(usize),
    /// Push the value held in a cache slot
    LoadCache(usize),

    CallSum,
    CallMinus,
    CallMul,
    CallDiv,
    CallPow,
    /// `log(first, second)`: the first operand is the base
    CallLog,
    /// Apply a built-in function to the top of the stack
    CallFunction(UnaryFn),
}

impl Instruction {
    /// Net change of the stack depth.
    pub(crate) const fn stack_effect(self) -> isize {
        match self {
            Self::PushConst(_) | Self::PushVar(_) | Self::LoadCache(_) => 1,
            Self::SaveCache(_) | Self::CallFunction(_) => 0,
            Self::CallSum | Self::CallMinus | Self::CallMul | Self::CallDiv | Self::CallPow | Self::CallLog => -1,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushConst(c) if c.im == 0.0 => write!(f, "push_const {}", c.re),
            Self::PushConst(c) => write!(f, "push_const {c}"),
            Self::PushVar(i) => write!(f, "push_var {i}"),
            Self::SaveCache(slot) => write!(f, "save_cache {slot}"),
            Self::LoadCache(slot) => write!(f, "load_cache {slot}"),
            Self::CallSum => f.write_str("sum"),
            Self::CallMinus => f.write_str("minus"),
            Self::CallMul => f.write_str("mul"),
            Self::CallDiv => f.write_str("div"),
            Self::CallPow => f.write_str("pow"),
            Self::CallLog => f.write_str("log"),
            Self::CallFunction(func) => write!(f, "call {}", func.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Instruction::PushConst(Complex64::new(2.0, 0.0)).to_string(), "push_const 2");
        assert_eq!(Instruction::PushVar(1).to_string(), "push_var 1");
        assert_eq!(Instruction::CallFunction(UnaryFn::Sin).to_string(), "call sin");
    }

    #[test]
    fn test_stack_effects() {
        assert_eq!(Instruction::LoadCache(0).stack_effect(), 1);
        assert_eq!(Instruction::SaveCache(0).stack_effect(), 0);
        assert_eq!(Instruction::CallLog.stack_effect(), -1);
    }
}
