//! Expression compiler for the bytecode VM.
//!
//! # Compilation Process
//!
//! 1. **CSE pre-pass**: walk every node of the tree once; a non-leaf subtree
//!    reached a second time is marked shared and gets the next cache slot.
//! 2. **Instruction emission**: post-order, second operand first. The first
//!    emission of a shared subtree is followed by `SaveCache`, every later
//!    occurrence is a single `LoadCache`.
//!
//! The compiler tracks the stack depth while emitting, so the VM can
//! preallocate its operand stack.

use num::complex::Complex64;
use rustc_hash::{FxHashMap, FxHashSet};

use super::instruction::Instruction;
use crate::core::error::MathError;
use crate::core::expr::{Expr, ExprKind};
use crate::core::known_symbols::Variable;

/// Compilation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Cache repeated subtrees instead of recomputing them
    pub cse: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { cse: true }
    }
}

impl CompileOptions {
    #[must_use]
    pub const fn with_cse(mut self, enabled: bool) -> Self {
        self.cse = enabled;
        self
    }
}

/// Assign cache slots to the non-leaf subtrees occurring more than once.
fn find_shared(root: &Expr) -> FxHashMap<&Expr, usize> {
    let mut seen: FxHashSet<&Expr> = FxHashSet::default();
    let mut shared: FxHashMap<&Expr, usize> = FxHashMap::default();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_leaf() {
            continue;
        }
        if !seen.insert(node) {
            let next_slot = shared.len();
            shared.entry(node).or_insert(next_slot);
        }
        // reversed so the first child is visited first
        stack.extend(node.children().into_iter().rev().map(|child| &**child));
    }
    shared
}

/// Internal compiler state for one expression.
pub(crate) struct Compiler<'a> {
    params: &'a [Variable],
    instructions: Vec<Instruction>,
    /// Shared subtree → cache slot
    shared: FxHashMap<&'a Expr, usize>,
    /// Whether each slot was already saved
    saved: Vec<bool>,
    current_stack: usize,
    max_stack: usize,
}

impl<'a> Compiler<'a> {
    pub(crate) fn new(root: &'a Expr, params: &'a [Variable], options: CompileOptions) -> Self {
        let shared = if options.cse {
            find_shared(root)
        } else {
            FxHashMap::default()
        };
        Self {
            params,
            instructions: Vec::with_capacity(root.complexity()),
            saved: vec![false; shared.len()],
            shared,
            current_stack: 0,
            max_stack: 0,
        }
    }

    #[inline]
    fn emit(&mut self, instruction: Instruction) {
        let depth = self.current_stack.saturating_add_signed(instruction.stack_effect());
        self.current_stack = depth;
        self.max_stack = self.max_stack.max(depth);
        self.instructions.push(instruction);
    }

    pub(crate) fn compile_expr(&mut self, expr: &'a Expr) -> Result<(), MathError> {
        let slot = self.shared.get(expr).copied();
        if let Some(slot) = slot
            && self.saved[slot]
        {
            self.emit(Instruction::LoadCache(slot));
            return Ok(());
        }

        match &expr.kind {
            ExprKind::Number(n) => self.emit(Instruction::PushConst(n.to_complex64())),
            ExprKind::Variable(v) => self.compile_variable(v)?,
            ExprKind::Sum(a, b) => self.compile_binary(a, b, Instruction::CallSum)?,
            ExprKind::Minus(a, b) => self.compile_binary(a, b, Instruction::CallMinus)?,
            ExprKind::Mul(a, b) => self.compile_binary(a, b, Instruction::CallMul)?,
            ExprKind::Div(a, b) => self.compile_binary(a, b, Instruction::CallDiv)?,
            ExprKind::Pow(a, b) => self.compile_binary(a, b, Instruction::CallPow)?,
            ExprKind::Log(base, arg) => self.compile_binary(base, arg, Instruction::CallLog)?,
            ExprKind::Unary(func, arg) => {
                self.compile_expr(arg)?;
                self.emit(Instruction::CallFunction(*func));
            }
            ExprKind::Boolean(_)
            | ExprKind::Derivative { .. }
            | ExprKind::Integral { .. }
            | ExprKind::Limit { .. }
            | ExprKind::Not(_)
            | ExprKind::Logic(..)
            | ExprKind::Compare(..) => {
                return Err(MathError::UncompilableNode(expr.tag().to_string()));
            }
        }

        if let Some(slot) = slot {
            self.emit(Instruction::SaveCache(slot));
            self.saved[slot] = true;
        }
        Ok(())
    }

    fn compile_binary(&mut self, first: &'a Expr, second: &'a Expr, call: Instruction) -> Result<(), MathError> {
        self.compile_expr(second)?;
        self.compile_expr(first)?;
        self.emit(call);
        Ok(())
    }

    fn compile_variable(&mut self, var: &Variable) -> Result<(), MathError> {
        if let Some(value) = var.constant_value() {
            self.emit(Instruction::PushConst(Complex64::new(value, 0.0)));
            return Ok(());
        }
        let index = self
            .params
            .iter()
            .position(|p| p == var)
            .ok_or_else(|| MathError::UnboundVariable(var.name().to_string()))?;
        self.emit(Instruction::PushVar(index));
        Ok(())
    }

    /// Instructions, maximum stack depth and cache slot count.
    pub(crate) fn into_parts(self) -> (Vec<Instruction>, usize, usize) {
        (self.instructions, self.max_stack, self.shared.len())
    }
}
