//! # parser.rs
//!
//! This module turns formula text into a [`Node`] tree.
//!
//! Parsing runs in two steps:
//! 1. The shunting-yard pass reorders the token stream from the [`Lexer`]
//!    into postfix order, resolving precedence and associativity with an
//!    operator stack.
//! 2. The postfix sequence is reduced right-to-left into a tree; every
//!    operator pops its operands from the end of the sequence.
//!
//! # Notes
//! - Unknown characters are collected as [`LexError`]s over the whole input.
//!   A structural [`ParseError`] stops parsing at once and is reported after
//!   the lexical errors collected so far.
//! - Parentheses right after a function name belong to the call; they do not
//!   produce a grouping node.
//! - `exp(a)` is stored as `e^a` and `ln` as `log`.

use num_complex::Complex;

use crate::astnode::{BinaryKind, Node, EULER_NAME};
use crate::error::{Error, LexError, ParseError, ParseErrors};
use crate::functions::FunctionKind;
use crate::lexer::{Lexer, IMAGINARY_UNIT};
use crate::token::{Operator, Token, TokenKind};
use crate::variable::ARGUMENT_NAME;

/// Parses `input` into an expression tree.
///
/// # Examples
///
/// ```
/// use symcalc::parser::parse;
///
/// let tree = parse("4x + 1").unwrap();
/// assert_eq!(tree.to_string(), "4*x+1");
/// ```
pub fn parse(input: &str) -> Result<Node, ParseErrors> {
    let mut output = postfix(input)?;
    if output.is_empty() {
        return Err(ParseErrors(vec![ParseError::Empty.into()]));
    }

    let root = pop_node(&mut output).map_err(|e| ParseErrors(vec![e.into()]))?;
    if let Some(rest) = output.last() {
        return Err(ParseErrors(vec![ParseError::Unparsed { position: rest.offset() }.into()]));
    }

    log::debug!("parsed {:?} into a tree of {} nodes", input, root.size());
    Ok(root)
}

/// Runs the shunting-yard pass and returns the tokens in postfix order.
///
/// Whitespace is dropped; the synthetic `*` tokens of implicit
/// multiplication are kept like written ones.
pub fn postfix(input: &str) -> Result<Vec<Token>, ParseErrors> {
    let mut errors: Vec<Error> = Vec::new();
    let mut output: Vec<Token> = Vec::new();
    let mut stack: Vec<Token> = Vec::new();

    for token in Lexer::new(input) {
        let result = match token.kind() {
            TokenKind::Whitespace | TokenKind::Error => Ok(()),
            TokenKind::Unknown => {
                errors.push(LexError { position: token.offset() }.into());
                Ok(())
            },
            TokenKind::Numeric | TokenKind::Identifier => {
                output.push(token);
                Ok(())
            },
            TokenKind::Operator => shunt_operator(token, &mut output, &mut stack),
        };
        if let Err(e) = result {
            errors.push(e.into());
            return Err(ParseErrors(errors));
        }
    }

    while let Some(token) = stack.pop() {
        if token.is_operator(Operator::Open) {
            errors.push(ParseError::MismatchedOpen { position: token.offset() }.into());
            return Err(ParseErrors(errors));
        }
        output.push(token);
    }

    if !errors.is_empty() {
        return Err(ParseErrors(errors));
    }
    Ok(output)
}

/// Places one operator token on the stack or the output.
fn shunt_operator(
    token: Token,
    output: &mut Vec<Token>,
    stack: &mut Vec<Token>,
) -> Result<(), ParseError> {
    let Some(op) = token.op() else {
        return Ok(());
    };

    match op {
        // prefix operators have no left operand waiting on the stack
        Operator::FunctionApply | Operator::Open | Operator::UnaryMinus => stack.push(token),
        Operator::Close => {
            loop {
                match stack.pop() {
                    Some(top) if top.is_operator(Operator::Open) => break,
                    Some(top) => output.push(top),
                    None => return Err(ParseError::MismatchedClose { position: token.offset() }),
                }
            }
            if stack.last().is_some_and(|t| t.is_operator(Operator::FunctionApply)) {
                if let Some(func) = stack.pop() {
                    output.push(func);
                }
            }
        },
        _ => {
            while let Some(top) = stack.last() {
                let Some(top_op) = top.op() else { break };
                if top_op == Operator::Open {
                    break;
                }
                let pops = top_op.precedence() > op.precedence()
                    || (top_op.precedence() == op.precedence() && !top_op.is_right_assoc());
                if !pops {
                    break;
                }
                if let Some(top) = stack.pop() {
                    output.push(top);
                }
            }
            stack.push(token);
        },
    }
    Ok(())
}

/// Pops the operand of an operator found at `position`.
fn pop_operand(output: &mut Vec<Token>, position: usize) -> Result<Node, ParseError> {
    if output.is_empty() {
        return Err(ParseError::NoOperands { position });
    }
    pop_node(output)
}

/// Reduces the tail of the postfix sequence into one tree.
fn pop_node(output: &mut Vec<Token>) -> Result<Node, ParseError> {
    let token = output.pop().ok_or(ParseError::Empty)?;
    let position = token.offset();

    match token.kind() {
        TokenKind::Numeric => Ok(Node::Number(parse_number(token.text(), position)?)),
        TokenKind::Identifier if token.text() == ARGUMENT_NAME => Ok(Node::Argument),
        TokenKind::Identifier => Ok(Node::Variable {
            name: token.text().to_string(),
            position: Some(position),
        }),
        TokenKind::Operator => match (token.op(), token.func()) {
            (Some(Operator::FunctionApply), Some(func)) => {
                let arg = pop_operand(output, position)?;
                Ok(build_call(func, arg, position))
            },
            (Some(Operator::UnaryMinus), _) => {
                let arg = pop_operand(output, position)?;
                Ok(Node::UnaryMinus(Box::new(arg)))
            },
            (Some(op), _) => {
                let kind = BinaryKind::from_operator(op).ok_or(ParseError::Unparsed { position })?;
                let right = pop_operand(output, position)?;
                let left = pop_operand(output, position)?;
                Ok(Node::Binary {
                    kind,
                    left: Box::new(left),
                    right: Box::new(right),
                    position: Some(position),
                })
            },
            (None, _) => Err(ParseError::Unparsed { position }),
        },
        _ => Err(ParseError::Unparsed { position }),
    }
}

fn build_call(func: FunctionKind, arg: Node, position: usize) -> Node {
    match func {
        FunctionKind::Exp => Node::Binary {
            kind: BinaryKind::Pow,
            left: Box::new(Node::Variable { name: EULER_NAME.to_string(), position: Some(position) }),
            right: Box::new(arg),
            position: Some(position),
        },
        FunctionKind::Ln => Node::Call { func: FunctionKind::Log, arg: Box::new(arg), position: Some(position) },
        func => Node::Call { func, arg: Box::new(arg), position: Some(position) },
    }
}

/// Converts a numeric lexeme into a complex value.
///
/// A trailing `i` marks the imaginary part. A combined literal such as
/// `1.5e-3+2i` is split at the `+` that is not an exponent sign; a bare `i`
/// is the imaginary unit. A literal that overflows to infinity is rejected,
/// so every number in a parsed tree has a textual form that parses back.
pub(crate) fn parse_number(text: &str, position: usize) -> Result<Complex<f64>, ParseError> {
    let value = parse_literal(text, position)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::BadNumber { text: text.to_string(), position })
    }
}

fn parse_literal(text: &str, position: usize) -> Result<Complex<f64>, ParseError> {
    let bad = || ParseError::BadNumber { text: text.to_string(), position };

    let Some(body) = text
        .strip_suffix(IMAGINARY_UNIT)
        .or_else(|| text.strip_suffix(IMAGINARY_UNIT.to_ascii_uppercase()))
    else {
        return text.parse::<f64>().map(Complex::from).map_err(|_| bad());
    };

    if body.is_empty() {
        return Ok(Complex::i());
    }

    let bytes = body.as_bytes();
    let split = (1..bytes.len())
        .find(|&k| bytes[k] == b'+' && !matches!(bytes[k - 1], b'e' | b'E'));

    match split {
        Some(k) => {
            let re = body[..k].parse::<f64>().map_err(|_| bad())?;
            let im = match &body[k + 1..] {
                "" => 1.0,
                digits => digits.parse::<f64>().map_err(|_| bad())?,
            };
            Ok(Complex::new(re, im))
        },
        None => {
            let im = body.parse::<f64>().map_err(|_| bad())?;
            Ok(Complex::new(0.0, im))
        },
    }
}

impl std::str::FromStr for Node {
    type Err = ParseErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
