//! # render.rs
//!
//! Text and LaTeX output for expression trees.
//!
//! The text form is the canonical one: it adds only the parentheses the
//! operator table requires, and parsing it again gives a tree that evaluates
//! to the same values.

use num_complex::Complex;

use crate::astnode::{BinaryKind, Node};
use crate::functions::FunctionKind;
use crate::token::Operator;

/// Binding strength of nodes that never need parentheses.
const ATOM: u8 = u8::MAX;

/// Greek letters rendered as markup commands when used as variable names.
const GREEK: &[&str] = &["pi", "phi"];

fn format_number(value: &Complex<f64>) -> String {
    if value.im == 0.0 {
        format!("{}", value.re)
    } else if value.re == 0.0 {
        format!("{}i", value.im)
    } else if value.im < 0.0 {
        format!("({}-{}i)", value.re, -value.im)
    } else {
        format!("({}+{}i)", value.re, value.im)
    }
}

impl Node {
    /// How tightly the rendered node binds when it appears as an operand.
    ///
    /// A literal printed with a leading minus behaves like a negation.
    fn binding(&self) -> u8 {
        match self {
            Self::Binary { kind, .. } => kind.precedence(),
            Self::UnaryMinus(_) => Operator::UnaryMinus.precedence(),
            Self::Number(v) if (v.im == 0.0 && v.re < 0.0) || (v.re == 0.0 && v.im < 0.0) => {
                Operator::UnaryMinus.precedence()
            },
            _ => ATOM,
        }
    }

    fn is_binary(&self) -> bool {
        matches!(self, Self::Binary { .. })
    }

    /// Whether the operand needs parentheses under a binary parent.
    ///
    /// At equal precedence only the operand on the associating side goes
    /// without them. `a*(b*c)` keeps its parentheses: floating-point products
    /// and sums are not associative, and the text must parse back to the
    /// same grouping.
    fn needs_parens(&self, parent: BinaryKind, is_left: bool) -> bool {
        let (mine, theirs) = (self.binding(), parent.precedence());
        if mine != theirs {
            return mine < theirs;
        }
        is_left == parent.is_right_assoc()
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", format_number(value)),
            Self::Argument => write!(f, "x"),
            Self::Variable { name, .. } => write!(f, "{}", name),
            Self::UnaryMinus(operand) if operand.is_binary() => write!(f, "-({})", operand),
            Self::UnaryMinus(operand) => write!(f, "-{}", operand),
            Self::Binary { kind, left, right, .. } => {
                if left.needs_parens(*kind, true) {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, "{}", kind)?;
                if right.needs_parens(*kind, false) {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            },
            Self::Call { func, arg, .. } => write!(f, "{}({})", func, arg),
        }
    }
}

/// Node impl `latex` and its helper impls
impl Node {
    /// Renders the tree as LaTeX math markup.
    ///
    /// Quotients with an operand longer than one character become `\frac`,
    /// exponents are braced, and function arguments are wrapped in
    /// auto-sized parentheses (`\sqrt` and `\sqrt[3]` use braces instead).
    ///
    /// # Examples
    ///
    /// ```
    /// use symcalc::parser::parse;
    ///
    /// assert_eq!(parse("(x+1)/2").unwrap().latex(), "\\frac{x+1}{2}");
    /// assert_eq!(parse("sin(x)^2").unwrap().latex(), "\\sin\\left(x\\right)^{2}");
    /// ```
    pub fn latex(&self) -> String {
        match self {
            Self::Number(value) if value.im != 0.0 && value.re != 0.0 => {
                let sign = if value.im < 0.0 { '-' } else { '+' };
                format!("\\left({}{}{}i\\right)", value.re, sign, value.im.abs())
            },
            Self::Number(value) => format_number(value),
            Self::Argument => "x".to_string(),
            Self::Variable { name, .. } if GREEK.contains(&name.as_str()) => format!("\\{}", name),
            Self::Variable { name, .. } => name.clone(),
            Self::UnaryMinus(operand) if operand.is_binary() => {
                format!("-\\left({}\\right)", operand.latex())
            },
            Self::UnaryMinus(operand) => format!("-{}", operand.latex()),
            Self::Binary { kind, left, right, .. } => latex_binary(*kind, left, right),
            Self::Call { func: FunctionKind::Sqrt, arg, .. } => format!("\\sqrt{{{}}}", arg.latex()),
            Self::Call { func: FunctionKind::Cbrt, arg, .. } => format!("\\sqrt[3]{{{}}}", arg.latex()),
            Self::Call { func, arg, .. } => format!("{}\\left({}\\right)", func.latex(), arg.latex()),
        }
    }

    /// True when the node renders as a `\frac`, which never needs grouping.
    fn is_fraction(&self) -> bool {
        match self {
            Self::Binary { kind: BinaryKind::Div, left, right, .. } => {
                left.latex().len() > 1 || right.latex().len() > 1
            },
            _ => false,
        }
    }

    fn latex_operand(&self, parent: BinaryKind, is_left: bool) -> String {
        if !self.is_fraction() && self.needs_parens(parent, is_left) {
            format!("\\left({}\\right)", self.latex())
        } else {
            self.latex()
        }
    }
}

fn latex_binary(kind: BinaryKind, left: &Node, right: &Node) -> String {
    match kind {
        BinaryKind::Div => {
            let (l, r) = (left.latex(), right.latex());
            if l.len() > 1 || r.len() > 1 {
                format!("\\frac{{{}}}{{{}}}", l, r)
            } else {
                format!("{}/{}", l, r)
            }
        },
        BinaryKind::Pow => format!("{}^{{{}}}", left.latex_operand(kind, true), right.latex()),
        BinaryKind::Mul => {
            let l = left.latex_operand(kind, true);
            let r = right.latex_operand(kind, false);
            if right.is_number() {
                format!("{} \\cdot {}", l, r)
            } else {
                format!("{} {}", l, r)
            }
        },
        BinaryKind::Add | BinaryKind::Sub => {
            format!("{}{}{}", left.latex_operand(kind, true), kind, right.latex_operand(kind, false))
        },
    }
}
