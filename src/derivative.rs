//! # derivative.rs
//!
//! Symbolic differentiation with respect to the argument `x`.
//!
//! Every rule builds a fresh tree from clones of the operands and applies the
//! chain rule by multiplying with the operand's own derivative. The raw result
//! is usually large and full of `*1` and `+0` terms; [`Node::derivative`]
//! passes it through the optimizer before returning it.

use crate::astnode::{BinaryKind, Node};
use crate::error::DerivativeError;
use crate::functions::FunctionKind;

impl Node {
    /// Derivative with respect to `x`, simplified.
    ///
    /// # Errors
    ///
    /// [`DerivativeError::Unsupported`] if the tree calls a function without a
    /// derivative rule (`cbrt`, `log2`, `erf`, `gamma`).
    ///
    /// # Examples
    ///
    /// ```
    /// use symcalc::parser::parse;
    ///
    /// let tree = parse("x^2").unwrap();
    /// assert_eq!(tree.derivative().unwrap().to_string(), "2*x");
    /// ```
    pub fn derivative(&self) -> Result<Node, DerivativeError> {
        let raw = self.differentiate()?;
        log::debug!("raw derivative has {} nodes", raw.size());
        Ok(raw.optimize())
    }

    /// Derivative with respect to `x`, exactly as the rules produce it.
    pub fn differentiate(&self) -> Result<Node, DerivativeError> {
        match self {
            Self::Number(_) | Self::Variable { .. } => Ok(Node::ZERO),
            Self::Argument => Ok(Node::ONE),
            Self::UnaryMinus(operand) => Ok(operand.differentiate()?.negative()),
            Self::Binary { kind, left, right, .. } => diff_binary(*kind, left, right),
            Self::Call { func, arg, position } => diff_function(*func, arg, *position),
        }
    }
}

/// Differentiate a binary operator expression.
///
/// ```text
/// (u ± v)' = u' ± v'
/// (u * v)' = v * u' + u * v'
/// (u / v)' = (v * u' - u * v') / v^2
/// (u ^ v)' = v * u^(v-1) * u' + u^v * ln(u) * v'
/// ```
fn diff_binary(kind: BinaryKind, left: &Node, right: &Node) -> Result<Node, DerivativeError> {
    let dl = left.differentiate()?;
    let dr = right.differentiate()?;
    let (u, v) = (left.clone(), right.clone());

    Ok(match kind {
        BinaryKind::Add => dl + dr,
        BinaryKind::Sub => dl - dr,
        BinaryKind::Mul => v * dl + u * dr,
        BinaryKind::Div => (v.clone() * dl - u * dr) / (v ^ Node::TWO),
        BinaryKind::Pow => {
            let base_term = v.clone() * (u.clone() ^ (v.clone() - Node::ONE)) * dl;
            let exponent_term = (u.clone() ^ v) * Node::call(FunctionKind::Log, u) * dr;
            base_term + exponent_term
        },
    })
}

/// Differentiate a function call; the outer derivative is multiplied by `a'`.
///
/// - `sin(a)` → `cos(a)`
/// - `cos(a)` → `-sin(a)`
/// - `tan(a)` → `1 / cos(a)^2`
/// - `arcsin(a)` → `1 / sqrt(1 - a^2)`
/// - `arccos(a)` → `-(1 / sqrt(1 - a^2))`
/// - `arctan(a)` → `1 / (1 + a^2)`
/// - `sinh(a)` → `cosh(a)`
/// - `cosh(a)` → `sinh(a)`
/// - `tanh(a)` → `1 / cosh(a)^2`
/// - `arcsinh(a)` → `1 / sqrt(a^2 + 1)`
/// - `arccosh(a)` → `1 / sqrt(a^2 - 1)`
/// - `arctanh(a)` → `1 / (1 - a^2)`
/// - `sqrt(a)` → `1 / (2 * sqrt(a))`
/// - `exp(a)` → `e^a`
/// - `ln(a)`, `log(a)` → `1 / a`
/// - `log10(a)` → `1 / (a * log(10))`
fn diff_function(
    func: FunctionKind,
    arg: &Node,
    position: Option<usize>,
) -> Result<Node, DerivativeError> {
    let a = arg.clone();
    let square = || arg.clone() ^ Node::TWO;

    let outer = match func {
        FunctionKind::Sin => Node::call(FunctionKind::Cos, a),
        FunctionKind::Cos => Node::call(FunctionKind::Sin, a).negative(),
        FunctionKind::Tan => Node::ONE / (Node::call(FunctionKind::Cos, a) ^ Node::TWO),
        FunctionKind::Arcsin => Node::ONE / (Node::ONE - square()).sqrt(),
        FunctionKind::Arccos => (Node::ONE / (Node::ONE - square()).sqrt()).negative(),
        FunctionKind::Arctan => Node::ONE / (Node::ONE + square()),
        FunctionKind::Sinh => Node::call(FunctionKind::Cosh, a),
        FunctionKind::Cosh => Node::call(FunctionKind::Sinh, a),
        FunctionKind::Tanh => Node::ONE / (Node::call(FunctionKind::Cosh, a) ^ Node::TWO),
        FunctionKind::Arcsinh => Node::ONE / (square() + Node::ONE).sqrt(),
        FunctionKind::Arccosh => Node::ONE / (square() - Node::ONE).sqrt(),
        FunctionKind::Arctanh => Node::ONE / (Node::ONE - square()),
        FunctionKind::Sqrt => Node::ONE / (Node::TWO * a.sqrt()),
        FunctionKind::Exp => a.exp(),
        FunctionKind::Ln | FunctionKind::Log => Node::ONE / a,
        FunctionKind::Log10 => Node::ONE / (a * Node::call(FunctionKind::Log, Node::number(10.0))),
        FunctionKind::Cbrt | FunctionKind::Log2 | FunctionKind::Erf | FunctionKind::Gamma => {
            return Err(DerivativeError::Unsupported { function: func, position });
        },
    };

    Ok(outer * arg.differentiate()?)
}
