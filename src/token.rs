//! # token.rs
//!
//! Token types produced by the lexer and consumed by the shunting-yard parser,
//! together with the operator precedence table.

use crate::functions::FunctionKind;
use crate::lexer::Lexeme;

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Input exhausted (or the source failed).
    Error,
    /// A character that starts no token.
    Unknown,
    /// A run of spaces, tabs or Unicode space separators.
    Whitespace,
    /// A real, imaginary or combined complex literal.
    Numeric,
    /// A name that is not a builtin function.
    Identifier,
    /// One of `( ) + - * / ^`, a function name, or an inserted `*`.
    Operator,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Error => "Error",
            Self::Unknown => "Unknown",
            Self::Whitespace => "Whitespace",
            Self::Numeric => "Numeric",
            Self::Identifier => "Identifier",
            Self::Operator => "Operator",
        };
        write!(f, "{}", s)
    }
}

/// Precedence and associativity of an operator.
///
/// Higher precedence binds tighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorInfo {
    pub precedence: u8,
    pub is_right_assoc: bool,
}

#[doc(hidden)]
/// Internal macro to define all operators with their symbol and binding.
macro_rules! operators {
    ($($name:ident => {
        symbol: $symbol:expr,
        precedence: $prec:expr,
        right_assoc: $assoc:expr
    }),* $(,)?) => {
        /// Operator tag carried by an operator token.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Operator {
            $($name),*
        }

        impl Operator {
            /// Returns operator precedence and associativity.
            pub fn info(&self) -> OperatorInfo {
                match self {
                    $(Self::$name => OperatorInfo { precedence: $prec, is_right_assoc: $assoc },)*
                }
            }

            /// Source symbol of the operator.
            pub fn symbol(&self) -> &'static str {
                match self {
                    $(Self::$name => $symbol,)*
                }
            }
        }

        impl std::fmt::Display for Operator {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.symbol())
            }
        }
    };
}

operators! {
    FunctionApply   => { symbol: "func",  precedence: 6, right_assoc: true },
    Open            => { symbol: "(",     precedence: 0, right_assoc: false },
    Close           => { symbol: ")",     precedence: 0, right_assoc: false },
    Add             => { symbol: "+",     precedence: 1, right_assoc: false },
    Subtract        => { symbol: "-",     precedence: 1, right_assoc: false },
    UnaryMinus      => { symbol: "-",     precedence: 5, right_assoc: true },
    Multiply        => { symbol: "*",     precedence: 2, right_assoc: false },
    Divide          => { symbol: "/",     precedence: 2, right_assoc: false },
    Power           => { symbol: "^",     precedence: 4, right_assoc: true },
}

impl Operator {
    pub fn precedence(&self) -> u8 {
        self.info().precedence
    }

    pub fn is_right_assoc(&self) -> bool {
        self.info().is_right_assoc
    }

    /// Maps a single source character to its operator.
    ///
    /// `-` maps to [`Operator::Subtract`]; the lexer decides whether it is
    /// really a negation.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '(' => Some(Self::Open),
            ')' => Some(Self::Close),
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            '^' => Some(Self::Power),
            _ => None,
        }
    }
}

/// A classified piece of the input.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    lexeme: Lexeme,
    operator: Option<Operator>,
    function: Option<FunctionKind>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: Lexeme) -> Self {
        Self { kind, lexeme, operator: None, function: None }
    }

    pub fn operator(op: Operator, lexeme: Lexeme) -> Self {
        Self { kind: TokenKind::Operator, lexeme, operator: Some(op), function: None }
    }

    pub fn function(function: FunctionKind, lexeme: Lexeme) -> Self {
        Self {
            kind: TokenKind::Operator,
            lexeme,
            operator: Some(Operator::FunctionApply),
            function: Some(function),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Operator tag; `None` unless the token is an operator.
    pub fn op(&self) -> Option<Operator> {
        self.operator
    }

    /// Function identifier; `None` unless the token applies a function.
    pub fn func(&self) -> Option<FunctionKind> {
        self.function
    }

    pub fn lexeme(&self) -> &Lexeme {
        &self.lexeme
    }

    pub fn text(&self) -> &str {
        self.lexeme.text()
    }

    /// Byte offset of the token in the source.
    pub fn offset(&self) -> usize {
        *self.lexeme.start()
    }

    pub fn is_operator(&self, op: Operator) -> bool {
        self.operator == Some(op)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.operator {
            Some(Operator::FunctionApply) => write!(f, "{}", self.lexeme.text()),
            Some(op) => write!(f, "{}", op),
            None => write!(f, "'{}'", self.lexeme.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        let order = [
            Operator::FunctionApply,
            Operator::UnaryMinus,
            Operator::Power,
            Operator::Multiply,
            Operator::Add,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].precedence() > pair[1].precedence(), "{:?} > {:?}", pair[0], pair[1]);
        }
        assert_eq!(Operator::Multiply.precedence(), Operator::Divide.precedence());
        assert_eq!(Operator::Add.precedence(), Operator::Subtract.precedence());
    }

    #[test]
    fn test_associativity() {
        assert!(Operator::Power.is_right_assoc());
        assert!(Operator::UnaryMinus.is_right_assoc());
        assert!(Operator::FunctionApply.is_right_assoc());
        assert!(!Operator::Subtract.is_right_assoc());
        assert!(!Operator::Divide.is_right_assoc());
    }

    #[test]
    fn test_from_char() {
        assert_eq!(Operator::from_char('^'), Some(Operator::Power));
        assert_eq!(Operator::from_char('-'), Some(Operator::Subtract));
        assert_eq!(Operator::from_char(','), None);
    }

    #[test]
    fn test_display() {
        let tok = Token::operator(Operator::Multiply, Lexeme::new("*", 1..1));
        assert_eq!(tok.to_string(), "*");
        let tok = Token::new(TokenKind::Identifier, Lexeme::new("y", 0..1));
        assert_eq!(tok.to_string(), "'y'");
        assert_eq!(tok.offset(), 0);
    }
}
