//! # astnode.rs
//!
//! The expression tree every other stage works on.
//!
//! A [`Node`] is an immutable value: the optimizer and the differentiator
//! build new trees and reuse the children they keep. Source positions ride
//! along on the variants that can fail at evaluation time so the error can
//! point back into the text; they are ignored by structural equality.

use num_complex::Complex;

use crate::functions::FunctionKind;
use crate::token::Operator;
use crate::variable::ARGUMENT_NAME;

/// Name of the variable that holds Euler's number in the default table.
pub(crate) const EULER_NAME: &str = "e";

#[doc(hidden)]
/// Internal macro to define the binary operators of the tree.
///
/// Each entry links the node kind to the token [`Operator`] it is parsed from,
/// which is where precedence and associativity live.
macro_rules! binary_kinds {
    ($($name:ident => { symbol: $symbol:expr, operator: $op:ident }),* $(,)?) => {
        /// Represents a binary operator in a mathematical expression.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum BinaryKind {
            $($name),*
        }

        impl BinaryKind {
            /// Source symbol of the operator.
            pub fn symbol(&self) -> &'static str {
                match self {
                    $(Self::$name => $symbol,)*
                }
            }

            /// The token operator this kind is parsed from.
            pub fn operator(&self) -> Operator {
                match self {
                    $(Self::$name => Operator::$op,)*
                }
            }

            /// Converts a token operator into a binary kind.
            ///
            /// Returns `None` for operators that do not build a binary node.
            pub fn from_operator(op: Operator) -> Option<Self> {
                match op {
                    $(Operator::$op => Some(Self::$name),)*
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for BinaryKind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.symbol())
            }
        }
    };
}

binary_kinds! {
    Add => { symbol: "+", operator: Add },
    Sub => { symbol: "-", operator: Subtract },
    Mul => { symbol: "*", operator: Multiply },
    Div => { symbol: "/", operator: Divide },
    Pow => { symbol: "^", operator: Power },
}

impl BinaryKind {
    pub fn precedence(&self) -> u8 {
        self.operator().precedence()
    }

    pub fn is_right_assoc(&self) -> bool {
        self.operator().is_right_assoc()
    }

    /// Applies the operator to two complex numbers.
    ///
    /// Division follows IEEE semantics here; callers that must reject a zero
    /// divisor check it before calling.
    pub(crate) fn apply(&self, l: Complex<f64>, r: Complex<f64>) -> Complex<f64> {
        use crate::functions::core::ComplexBackend;
        match self {
            Self::Add => l + r,
            Self::Sub => l - r,
            Self::Mul => l * r,
            Self::Div => l / r,
            Self::Pow => ComplexBackend::pow(&l, &r),
        }
    }
}

/// Expression tree node.
///
/// The set of variants is closed; every stage handles each of them with an
/// exhaustive `match`.
#[derive(Debug, Clone)]
pub enum Node {
    /// Numeric literal.
    Number(Complex<f64>),

    /// The free argument `x`, bound per evaluation.
    Argument,

    /// A named variable, resolved from a [`Vars`](crate::Vars) table when evaluated.
    Variable {
        name: String,
        position: Option<usize>,
    },

    /// Negation of the operand.
    UnaryMinus(Box<Node>),

    /// Binary operator applied to left and right expressions.
    Binary {
        kind: BinaryKind,
        left: Box<Node>,
        right: Box<Node>,
        position: Option<usize>,
    },

    /// Builtin function applied to its single operand.
    Call {
        func: FunctionKind,
        arg: Box<Node>,
        position: Option<usize>,
    },
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(l), Self::Number(r)) => l == r,
            (Self::Argument, Self::Argument) => true,
            (Self::Variable { name: l, .. }, Self::Variable { name: r, .. }) => l == r,
            (Self::UnaryMinus(l), Self::UnaryMinus(r)) => l == r,
            (
                Self::Binary { kind: lk, left: ll, right: lr, .. },
                Self::Binary { kind: rk, left: rl, right: rr, .. },
            ) => lk == rk && ll == rl && lr == rr,
            (
                Self::Call { func: lf, arg: la, .. },
                Self::Call { func: rf, arg: ra, .. },
            ) => lf == rf && la == ra,
            _ => false,
        }
    }
}

/// Distinguished literals the optimizer and differentiator match against.
impl Node {
    pub const ZERO: Node = Node::Number(Complex::new(0.0, 0.0));
    pub const ONE: Node = Node::Number(Complex::new(1.0, 0.0));
    pub const TWO: Node = Node::Number(Complex::new(2.0, 0.0));
    pub const MINUS_ONE: Node = Node::Number(Complex::new(-1.0, 0.0));
}

/// Node helper impl to create new nodes
impl Node {
    /// Create a real number node.
    pub fn number(value: f64) -> Self {
        Self::Number(Complex::new(value, 0.0))
    }

    /// Create a variable node without a source position.
    ///
    /// The name is lowercased; the argument name yields [`Node::Argument`].
    pub fn variable(name: &str) -> Self {
        let name = name.to_lowercase();
        if name == ARGUMENT_NAME {
            Self::Argument
        } else {
            Self::Variable { name, position: None }
        }
    }

    /// Create a function call node `func(arg)` without a source position.
    pub fn call(func: FunctionKind, arg: Self) -> Self {
        Self::Call { func, arg: Box::new(arg), position: None }
    }

    /// Create a binary node without a source position.
    pub fn binary(kind: BinaryKind, left: Self, right: Self) -> Self {
        Self::Binary { kind, left: Box::new(left), right: Box::new(right), position: None }
    }

    /// Internal helper to create an additional operator node `self + other`.
    pub(crate) fn add(self, other: Self) -> Self {
        Self::binary(BinaryKind::Add, self, other)
    }

    /// Internal helper to create a subtracted operator node `self - other`.
    pub(crate) fn sub(self, other: Self) -> Self {
        Self::binary(BinaryKind::Sub, self, other)
    }

    /// Internal helper to create a multiplied operator node `self * other`.
    pub(crate) fn mul(self, other: Self) -> Self {
        Self::binary(BinaryKind::Mul, self, other)
    }

    /// Internal helper to create a divided operator node `self / other`.
    pub(crate) fn div(self, other: Self) -> Self {
        Self::binary(BinaryKind::Div, self, other)
    }

    /// Internal helper to create a power node `self ^ other`.
    pub(crate) fn pow(self, other: Self) -> Self {
        Self::binary(BinaryKind::Pow, self, other)
    }

    /// Internal helper to create a negative node `-self`.
    pub(crate) fn negative(self) -> Self {
        Self::UnaryMinus(Box::new(self))
    }

    /// `e^self`; the exponential is always kept in power form.
    pub(crate) fn exp(self) -> Self {
        Self::Variable { name: EULER_NAME.to_string(), position: None }.pow(self)
    }

    pub(crate) fn sqrt(self) -> Self {
        Self::call(FunctionKind::Sqrt, self)
    }
}

/// Node queries
impl Node {
    /// Returns the literal value if the node is a number.
    pub fn as_number(&self) -> Option<Complex<f64>> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Source byte offset of the node, if it was parsed from text.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Variable { position, .. }
            | Self::Binary { position, .. }
            | Self::Call { position, .. } => *position,
            _ => None,
        }
    }

    /// True if the node is the variable holding Euler's number.
    pub(crate) fn is_euler(&self) -> bool {
        matches!(self, Self::Variable { name, .. } if name == EULER_NAME)
    }

    /// True when the tree mentions the free argument anywhere.
    pub fn contains_argument(&self) -> bool {
        match self {
            Self::Argument => true,
            Self::Number(_) | Self::Variable { .. } => false,
            Self::UnaryMinus(a) => a.contains_argument(),
            Self::Binary { left, right, .. } => left.contains_argument() || right.contains_argument(),
            Self::Call { arg, .. } => arg.contains_argument(),
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Self::Number(_) | Self::Argument | Self::Variable { .. } => 1,
            Self::UnaryMinus(a) => 1 + a.size(),
            Self::Binary { left, right, .. } => 1 + left.size() + right.size(),
            Self::Call { arg, .. } => 1 + arg.size(),
        }
    }
}

impl std::ops::Add<Node> for Node {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        self.add(rhs)
    }
}

impl std::ops::Sub<Node> for Node {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        self.sub(rhs)
    }
}

impl std::ops::Mul<Node> for Node {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        self.mul(rhs)
    }
}

impl std::ops::Div<Node> for Node {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        self.div(rhs)
    }
}

impl std::ops::BitXor<Node> for Node {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self::Output {
        self.pow(rhs)
    }
}

impl std::ops::Neg for Node {
    type Output = Self;
    fn neg(self) -> Self::Output {
        self.negative()
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

impl From<Complex<f64>> for Node {
    fn from(value: Complex<f64>) -> Self {
        Self::Number(value)
    }
}
