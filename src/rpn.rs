//! rpn.rs
//!
//! Compiles an expression tree into a flat postfix program and runs it on a
//! value stack.
//!
//! A [`Program`] implements the same [`Evaluate`] contract as the tree walker:
//! instructions are laid out in post-order, so the left operand of a binary
//! operator runs (and fails) before the right one. Variable names are
//! collected into slots at compile time and resolved against a [`Vars`]
//! table once per call, which makes [`Program::eval_batch`] cheap for many
//! argument values.

use num_complex::Complex;
use smallvec::SmallVec;

use crate::astnode::{BinaryKind, Node};
use crate::calc::{apply_binary, apply_function, normalize, EvalMode, Evaluate};
use crate::error::EvalError;
use crate::functions::FunctionKind;
use crate::variable::Vars;

/// Stack slots kept inline before spilling to the heap.
const STACK_INLINE: usize = 16;

type Stack = SmallVec<[Complex<f64>; STACK_INLINE]>;

/// One step of a compiled program.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Push a literal.
    Push(Complex<f64>),
    /// Push the argument `x`.
    Argument,
    /// Push the value of the variable in `slot`.
    Load { slot: usize, position: Option<usize> },
    /// Negate the top of the stack.
    Negate,
    /// Pop right then left, push `left op right`.
    Binary { kind: BinaryKind, position: Option<usize> },
    /// Apply a function to the top of the stack.
    Call { func: FunctionKind, position: Option<usize> },
}

/// A tree compiled to postfix order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    code: Vec<Instruction>,
    names: Vec<String>,
    depth: usize,
}

impl Program {
    /// Compiles a tree.
    pub fn compile(root: &Node) -> Self {
        let mut program = Self { code: Vec::with_capacity(root.size()), names: Vec::new(), depth: 0 };
        program.depth = program.emit(root);
        log::debug!(
            "compiled {} instructions, {} variable slots, stack depth {}",
            program.code.len(), program.names.len(), program.depth
        );
        program
    }

    /// Appends the instructions for `node` and returns the stack depth it needs.
    fn emit(&mut self, node: &Node) -> usize {
        match node {
            Node::Number(value) => {
                self.code.push(Instruction::Push(*value));
                1
            },
            Node::Argument => {
                self.code.push(Instruction::Argument);
                1
            },
            Node::Variable { name, position } => {
                let slot = self.slot(name);
                self.code.push(Instruction::Load { slot, position: *position });
                1
            },
            Node::UnaryMinus(operand) => {
                let depth = self.emit(operand);
                self.code.push(Instruction::Negate);
                depth
            },
            Node::Binary { kind, left, right, position } => {
                let l = self.emit(left);
                let r = self.emit(right);
                self.code.push(Instruction::Binary { kind: *kind, position: *position });
                l.max(r + 1)
            },
            Node::Call { func, arg, position } => {
                let depth = self.emit(arg);
                self.code.push(Instruction::Call { func: *func, position: *position });
                depth
            },
        }
    }

    fn slot(&mut self, name: &str) -> usize {
        match self.names.iter().position(|n| n == name) {
            Some(slot) => slot,
            None => {
                self.names.push(name.to_string());
                self.names.len() - 1
            },
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.code
    }

    /// Maximum number of values on the stack while running.
    pub fn stack_depth(&self) -> usize {
        self.depth
    }

    /// Names of the variables the program reads, in slot order.
    pub fn variables(&self) -> &[String] {
        &self.names
    }

    /// Looks every slot up in `vars`; missing names stay unresolved until used.
    fn bind(&self, vars: &Vars) -> SmallVec<[Option<Complex<f64>>; 8]> {
        self.names.iter().map(|name| vars.get(name)).collect()
    }

    fn run(
        &self,
        x: Complex<f64>,
        slots: &[Option<Complex<f64>>],
        mode: EvalMode,
        stack: &mut Stack,
    ) -> Result<Complex<f64>, EvalError> {
        stack.clear();
        for instruction in &self.code {
            match instruction {
                Instruction::Push(value) => stack.push(*value),
                Instruction::Argument => stack.push(x),
                Instruction::Load { slot, position } => match slots[*slot] {
                    Some(value) => stack.push(value),
                    None => return Err(EvalError::UndefinedVariable {
                        name: self.names[*slot].clone(),
                        position: *position,
                    }),
                },
                Instruction::Negate => {
                    let value = pop(stack);
                    stack.push(normalize(-value));
                },
                Instruction::Binary { kind, position } => {
                    let r = pop(stack);
                    let l = pop(stack);
                    stack.push(apply_binary(*kind, l, r, *position)?);
                },
                Instruction::Call { func, position } => {
                    let value = pop(stack);
                    stack.push(apply_function(*func, value, *position, mode)?);
                },
            }
        }
        Ok(pop(stack))
    }

    /// Evaluates the program for every argument in `xs`.
    ///
    /// Each result is the same value, or the same error, that evaluating the
    /// program for that argument alone would give. The variable lookup and the
    /// value stack are shared between the points of one call only.
    pub fn eval_batch(
        &self,
        xs: &[Complex<f64>],
        vars: &Vars,
        mode: EvalMode,
    ) -> Vec<Result<Complex<f64>, EvalError>> {
        let slots = self.bind(vars);
        let mut stack = Stack::with_capacity(self.depth);
        xs.iter()
            .map(|x| self.run(*x, &slots, mode, &mut stack))
            .collect()
    }
}

/// Programs are only built from trees, so every pop has a value to take.
fn pop(stack: &mut Stack) -> Complex<f64> {
    debug_assert!(!stack.is_empty(), "compiled program underflowed its stack");
    stack.pop().unwrap_or_default()
}

impl Evaluate for Program {
    fn eval_with(
        &self,
        x: Complex<f64>,
        vars: &Vars,
        mode: EvalMode,
    ) -> Result<Complex<f64>, EvalError> {
        let slots = self.bind(vars);
        let mut stack = Stack::with_capacity(self.depth);
        self.run(x, &slots, mode, &mut stack)
    }
}

impl From<&Node> for Program {
    fn from(node: &Node) -> Self {
        Self::compile(node)
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push(value) => write!(f, "{}", value),
            Self::Argument => write!(f, "x"),
            Self::Load { slot, .. } => write!(f, "${}", slot),
            Self::Negate => write!(f, "neg"),
            Self::Binary { kind, .. } => write!(f, "{}", kind),
            Self::Call { func, .. } => write!(f, "{}", func),
        }
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = self.code.iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        write!(f, "{}", text)
    }
}
