//! lexer.rs
//!
//! This module provides the lexical analyzer for formulas.
//! [`Lexer::next_token`] classifies one token per call: numeric literals
//! (decimal, scientific notation, imaginary and combined complex literals),
//! identifiers, function names, single-character operators, whitespace runs
//! and unknown characters.
//!
//! The lexer also decides two things the grammar cannot see locally: whether a
//! `-` negates or subtracts, and where an implicit multiplication sits
//! (`4x`, `2(x+1)`, `(a)(b)`). An implicit multiplication is emitted as a
//! separate, zero-width `*` token before the token that follows it.

use std::ops::Range;

use crate::functions::FunctionKind;
use crate::token::{Operator, Token, TokenKind};

/// Constant char representing an imaginary unit
pub const IMAGINARY_UNIT: char = 'i';

/// Represents a single lexeme extracted from the input string.
///
/// A `Lexeme` stores a text slice and its span (start..end byte indices)
/// within the original input string. Identifier text is stored lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    text: String,
    span: Range<usize>,
}

impl Lexeme {
    /// Create a new `Lexeme`.
    ///
    /// # Argument
    ///
    /// * `text` - The slice of text corresponding to the lexeme.
    /// * `span` - The range of the lexeme in the original input string.
    pub fn new(text: &str, span: Range<usize>) -> Self {
        Self {
            text: text.to_string(),
            span
        }
    }

    /// Returns the text slice of the lexeme.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the start index of the lexeme in the original input string.
    pub fn start(&self) -> &usize {
        &self.span.start
    }

    /// Returns the end index of the lexeme in the original input string.
    pub fn end(&self) -> &usize {
        &self.span.end
    }

    /// Returns the span index (start, end) of the lexeme in the original input string.
    pub fn span(&self) -> &Range<usize> {
        &self.span
    }
}

impl std::fmt::Display for Lexeme
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{name} [{start}, {end})", name=self.text, start=self.span.start, end=self.span.end)
    }
}

fn is_space(c: char) -> bool {
    matches!(c,
        ' ' | '\t' | '\u{FEFF}'
        | '\u{00A0}' | '\u{1680}' | '\u{2000}'..='\u{200A}'
        | '\u{202F}' | '\u{205F}' | '\u{3000}')
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || (!c.is_ascii() && c.is_alphabetic())
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c == '_'
        || (!c.is_ascii() && (c.is_alphanumeric() || c == '\u{200C}' || c == '\u{200D}'))
}

fn is_imaginary_unit(b: u8) -> bool {
    b == b'i' || b == b'I'
}

/// Streaming lexer over a formula.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Kind and operator of the last token that was not whitespace.
    last: Option<(TokenKind, Option<Operator>)>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0, last: None }
    }

    /// Byte offset of the next unread character.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the next token.
    ///
    /// Once the input is exhausted every call returns a [`TokenKind::Error`]
    /// token positioned at the end of the input.
    pub fn next_token(&mut self) -> Token {
        let Some(c) = self.peek_char(self.pos) else {
            let end = self.input.len();
            return Token::new(TokenKind::Error, Lexeme::new("", end..end));
        };

        let starts_value = self.starts_number(self.pos) || is_ident_start(c) || c == '(';
        if starts_value && self.last_ends_value() {
            let token = Token::operator(Operator::Multiply, Lexeme::new("*", self.pos..self.pos));
            self.remember(&token);
            return token;
        }

        let start = self.pos;
        let token = if self.starts_number(start) {
            self.consume_number(start)
        } else if is_ident_start(c) {
            self.consume_identifier(start)
        } else if let Some(op) = Operator::from_char(c) {
            self.pos += c.len_utf8();
            let op = match op {
                Operator::Subtract if self.minus_is_unary() => Operator::UnaryMinus,
                op => op,
            };
            Token::operator(op, Lexeme::new(&self.input[start..self.pos], start..self.pos))
        } else if is_space(c) {
            while let Some(c) = self.peek_char(self.pos).filter(|c| is_space(*c)) {
                self.pos += c.len_utf8();
            }
            return Token::new(TokenKind::Whitespace, Lexeme::new(&self.input[start..self.pos], start..self.pos));
        } else {
            self.pos += c.len_utf8();
            Token::new(TokenKind::Unknown, Lexeme::new(&self.input[start..self.pos], start..self.pos))
        };

        log::trace!("token {} at {}", token, start);
        self.remember(&token);
        token
    }

    fn remember(&mut self, token: &Token) {
        self.last = Some((token.kind(), token.op()));
    }

    fn peek_char(&self, at: usize) -> Option<char> {
        self.input.get(at..).and_then(|s| s.chars().next())
    }

    fn byte(&self, at: usize) -> Option<u8> {
        self.input.as_bytes().get(at).copied()
    }

    fn is_digit_at(&self, at: usize) -> bool {
        self.byte(at).is_some_and(|b| b.is_ascii_digit())
    }

    fn starts_number(&self, at: usize) -> bool {
        self.is_digit_at(at) || (self.byte(at) == Some(b'.') && self.is_digit_at(at + 1))
    }

    fn last_ends_value(&self) -> bool {
        matches!(
            self.last,
            Some((TokenKind::Numeric, _))
                | Some((TokenKind::Identifier, _))
                | Some((TokenKind::Operator, Some(Operator::Close)))
        )
    }

    fn minus_is_unary(&self) -> bool {
        match self.last {
            None => true,
            Some((TokenKind::Operator, op)) => op != Some(Operator::Close),
            Some(_) => false,
        }
    }

    fn skip_digits(&self, mut at: usize) -> usize {
        while self.is_digit_at(at) {
            at += 1;
        }
        at
    }

    /// Scans one literal starting at `start` and returns its end.
    ///
    /// An exponent marker not followed by a digit is left for the next token,
    /// and so is an `i` that continues into an identifier.
    fn scan_number(&self, start: usize) -> usize {
        let mut end = self.skip_digits(start);
        if self.byte(end) == Some(b'.') && self.is_digit_at(end + 1) {
            end = self.skip_digits(end + 1);
        }

        if matches!(self.byte(end), Some(b'e') | Some(b'E')) {
            let mut at = end + 1;
            if matches!(self.byte(at), Some(b'+') | Some(b'-')) {
                at += 1;
            }
            if self.is_digit_at(at) {
                end = self.skip_digits(at);
            }
        }

        if self.byte(end).is_some_and(is_imaginary_unit)
            && !self.peek_char(end + 1).is_some_and(is_ident_continue)
        {
            end += 1;
        }
        end
    }

    /// Tries to extend a real literal ending at `end` with `+<imaginary>`.
    ///
    /// The merge only happens where the literal is a whole additive term, so
    /// reading `1+2i` as one token gives the same value as reading it as a sum.
    fn scan_complex_tail(&self, end: usize) -> Option<usize> {
        let standalone_start = match self.last {
            None => true,
            Some((TokenKind::Operator, Some(op))) => matches!(op, Operator::Open | Operator::Add),
            Some(_) => false,
        };
        if !standalone_start || self.byte(end) != Some(b'+') || !self.starts_number(end + 1) {
            return None;
        }

        let tail = self.scan_number(end + 1);
        if !self.byte(tail - 1).is_some_and(is_imaginary_unit) {
            return None;
        }

        let mut next = tail;
        while let Some(c) = self.peek_char(next).filter(|c| is_space(*c)) {
            next += c.len_utf8();
        }
        match self.peek_char(next) {
            None | Some(')') | Some('+') | Some('-') => Some(tail),
            Some(_) => None,
        }
    }

    fn consume_number(&mut self, start: usize) -> Token {
        let mut end = self.scan_number(start);
        if !self.byte(end - 1).is_some_and(is_imaginary_unit) {
            if let Some(tail) = self.scan_complex_tail(end) {
                end = tail;
            }
        }
        self.pos = end;
        Token::new(TokenKind::Numeric, Lexeme::new(&self.input[start..end], start..end))
    }

    fn consume_identifier(&mut self, start: usize) -> Token {
        let mut end = start;
        while let Some(c) = self.peek_char(end).filter(|c| is_ident_continue(*c)) {
            end += c.len_utf8();
        }
        self.pos = end;

        let ident = self.input[start..end].to_lowercase();
        let lexeme = Lexeme::new(&ident, start..end);
        if ident.len() == 1 && ident.starts_with(IMAGINARY_UNIT) {
            return Token::new(TokenKind::Numeric, lexeme);
        }
        match FunctionKind::lookup(&ident) {
            Some(func) => Token::function(func, lexeme),
            None => Token::new(TokenKind::Identifier, lexeme),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        match token.kind() {
            TokenKind::Error => None,
            _ => Some(token),
        }
    }
}

/// Splits the input string into tokens, dropping whitespace.
pub fn tokenize(input: &str) -> Vec<Token> {
    Lexer::new(input)
        .filter(|t| t.kind() != TokenKind::Whitespace)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_texts(input: &str) -> Vec<String> {
        tokenize(input).iter().map(|t| t.text().to_string()).collect()
    }

    fn lex_kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).iter().map(|t| t.kind()).collect()
    }

    fn lex_ops(input: &str) -> Vec<Option<Operator>> {
        tokenize(input).iter().map(|t| t.op()).collect()
    }

    fn single_numeric(input: &str) -> String {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token();
        assert_eq!(token.kind(), TokenKind::Numeric, "{input}");
        token.text().to_string()
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\u{00A0}\u{3000} ").is_empty());

        let mut lexer = Lexer::new("  \t ");
        let ws = lexer.next_token();
        assert_eq!(ws.kind(), TokenKind::Whitespace);
        assert_eq!(ws.lexeme().span(), &(0..4));
        assert_eq!(lexer.next_token().kind(), TokenKind::Error);
        assert_eq!(lexer.next_token().kind(), TokenKind::Error);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(single_numeric("1"), "1");
        assert_eq!(single_numeric("1.0"), "1.0");
        assert_eq!(single_numeric(".0"), ".0");
        assert_eq!(single_numeric("1."), "1");
        assert_eq!(single_numeric("1e+1"), "1e+1");
        assert_eq!(single_numeric("1e-1"), "1e-1");
        assert_eq!(single_numeric("1E5"), "1E5");
        assert_eq!(single_numeric("1.5e5"), "1.5e5");
        assert_eq!(single_numeric("1.5e5.5"), "1.5e5");
    }

    #[test]
    fn test_exponent_without_digits_is_left_alone() {
        assert_eq!(lex_texts("2e"), vec!["2", "*", "e"]);
        assert_eq!(lex_texts("2e+x"), vec!["2", "*", "e", "+", "x"]);
    }

    #[test]
    fn test_imaginary_numbers() {
        assert_eq!(single_numeric("i"), "i");
        assert_eq!(single_numeric("I"), "i");
        assert_eq!(single_numeric("1i"), "1i");
        assert_eq!(single_numeric("1.0i"), "1.0i");
        assert_eq!(single_numeric("1.0e5i"), "1.0e5i");
        // `i` followed by identifier characters starts a name instead
        assert_eq!(lex_texts("2in"), vec!["2", "*", "in"]);
    }

    #[test]
    fn test_combined_complex_literal() {
        assert_eq!(single_numeric("1+5i"), "1+5i");
        assert_eq!(single_numeric("1.3e-3+4.5e-7i"), "1.3e-3+4.5e-7i");
        assert_eq!(lex_texts("(1+2i)"), vec!["(", "1+2i", ")"]);
        assert_eq!(lex_texts("x+1+2i"), vec!["x", "+", "1+2i"]);
        assert_eq!(lex_texts("1+2i-x"), vec!["1+2i", "-", "x"]);
        assert_eq!(single_numeric("1 + i"), "1");
    }

    #[test]
    fn test_complex_literal_not_merged_across_binding_operators() {
        assert_eq!(lex_texts("x^1+2i"), vec!["x", "^", "1", "+", "2i"]);
        assert_eq!(lex_texts("x-1+2i"), vec!["x", "-", "1", "+", "2i"]);
        assert_eq!(lex_texts("1+2i*x"), vec!["1", "+", "2i", "*", "x"]);
        assert_eq!(lex_texts("1+2i^2"), vec!["1", "+", "2i", "^", "2"]);
    }

    #[test]
    fn test_identifiers_and_functions() {
        assert_eq!(lex_kinds("y"), vec![TokenKind::Identifier]);
        assert_eq!(lex_texts("Var_1"), vec!["var_1"]);
        assert_eq!(lex_texts("λt"), vec!["λt"]);

        let tokens = tokenize("SIN");
        assert_eq!(tokens[0].op(), Some(Operator::FunctionApply));
        assert_eq!(tokens[0].func(), Some(FunctionKind::Sin));
        assert_eq!(tokens[0].text(), "sin");
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex_ops("()+*/^"),
            vec![
                Some(Operator::Open), Some(Operator::Close), Some(Operator::Add),
                Some(Operator::Multiply), Some(Operator::Divide), Some(Operator::Power),
            ]
        );
    }

    #[test]
    fn test_unary_minus_detection() {
        assert_eq!(lex_ops("-x")[0], Some(Operator::UnaryMinus));
        assert_eq!(lex_ops("x-y")[1], Some(Operator::Subtract));
        assert_eq!(lex_ops("x--y")[2], Some(Operator::UnaryMinus));
        assert_eq!(lex_ops("(x)-y")[3], Some(Operator::Subtract));
        assert_eq!(lex_ops("2^-x")[2], Some(Operator::UnaryMinus));
        assert_eq!(lex_ops("( -1)")[1], Some(Operator::UnaryMinus));
        assert_eq!(lex_ops("sin -x")[1], Some(Operator::UnaryMinus));
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(lex_texts("4x"), vec!["4", "*", "x"]);
        assert_eq!(lex_texts("2(x+1)"), vec!["2", "*", "(", "x", "+", "1", ")"]);
        assert_eq!(lex_texts("(a)(b)"), vec!["(", "a", ")", "*", "(", "b", ")"]);
        assert_eq!(lex_texts("2 x"), vec!["2", "*", "x"]);
        assert_eq!(lex_texts("2sin(x)"), vec!["2", "*", "sin", "(", "x", ")"]);
        // no multiplication between a function and its operand
        assert_eq!(lex_texts("sin(x)"), vec!["sin", "(", "x", ")"]);
        assert_eq!(lex_texts("sin x"), vec!["sin", "x"]);
    }

    #[test]
    fn test_implicit_multiplication_takes_two_calls() {
        let mut lexer = Lexer::new("4x");
        assert_eq!(lexer.next_token().text(), "4");
        let mul = lexer.next_token();
        assert_eq!(mul.op(), Some(Operator::Multiply));
        assert_eq!(mul.lexeme().span(), &(1..1));
        assert_eq!(lexer.pos(), 1);
        assert_eq!(lexer.next_token().text(), "x");
    }

    #[test]
    fn test_unknown_characters() {
        assert_eq!(
            lex_kinds("x$3"),
            vec![TokenKind::Identifier, TokenKind::Unknown, TokenKind::Numeric]
        );
        let tokens = tokenize("1 + @");
        assert_eq!(tokens[2].kind(), TokenKind::Unknown);
        assert_eq!(tokens[2].offset(), 4);
        assert_eq!(lex_kinds("_"), vec![TokenKind::Unknown]);
        assert_eq!(lex_kinds("1\n"), vec![TokenKind::Numeric, TokenKind::Unknown]);
    }

    #[test]
    fn test_offsets_are_bytes() {
        let tokens = tokenize("λ+y");
        assert_eq!(tokens[0].lexeme().span(), &(0..2));
        assert_eq!(tokens[2].offset(), 3);
    }
}
