//! # error.rs
//!
//! Error types reported while lexing, parsing, evaluating, differentiating
//! and exporting formulas.
//!
//! Every error that can be tied to the source text carries the byte offset of
//! the token that caused it.

use thiserror::Error;

use crate::functions::FunctionKind;

/// A character sequence that does not start any token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{position}: bad input")]
pub struct LexError {
    /// Byte offset of the offending character.
    pub position: usize,
}

/// Structural errors found by the shunting-yard parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{position}: mismatched closing parentheses")]
    MismatchedClose { position: usize },

    #[error("{position}: mismatched opening parentheses")]
    MismatchedOpen { position: usize },

    #[error("empty formula")]
    Empty,

    #[error("{position}: operator has no operands")]
    NoOperands { position: usize },

    #[error("{position}: some operands remain unparsed")]
    Unparsed { position: usize },

    #[error("{position}: could not parse number '{text}'")]
    BadNumber { text: String, position: usize },
}

impl ParseError {
    /// Byte offset of the error, if the error is tied to a token.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::MismatchedClose { position }
            | Self::MismatchedOpen { position }
            | Self::NoOperands { position }
            | Self::Unparsed { position }
            | Self::BadNumber { position, .. } => Some(*position),
            Self::Empty => None,
        }
    }
}

/// Failures of a tree walk. Evaluation stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String, position: Option<usize> },

    #[error("division by zero")]
    DivisionByZero { position: Option<usize> },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String, position: Option<usize> },

    #[error("logarithm of negative number in {function}")]
    LogOfNegative { function: FunctionKind, position: Option<usize> },
}

impl EvalError {
    /// Byte offset of the node that failed, when it came from source text.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::UndefinedVariable { position, .. }
            | Self::DivisionByZero { position }
            | Self::UnknownFunction { position, .. }
            | Self::LogOfNegative { position, .. } => *position,
        }
    }
}

/// Raised when differentiating a function without a derivative rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivativeError {
    #[error("unsupported derivative of '{function}'")]
    Unsupported { function: FunctionKind, position: Option<usize> },
}

/// Raised when a tree has no equivalent in the scripting runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("complex literal {value} has no real-valued script form")]
    ComplexLiteral { value: String },

    #[error("function '{function}' has no script equivalent")]
    UnsupportedFunction { function: FunctionKind },

    #[error("literal {value} is not finite")]
    NonFinite { value: String },
}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Derivative(#[from] DerivativeError),

    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// All errors collected while parsing one formula, in source order.
///
/// Lexical errors are accumulated over the whole input; at most one
/// structural [`ParseError`] follows them because it aborts parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.0))]
pub struct ParseErrors(pub Vec<Error>);

impl ParseErrors {
    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn join_messages(errors: &[Error]) -> String {
    errors.iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
