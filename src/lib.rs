//! # symcalc
//!
//! `symcalc` parses formulas in one argument `x`, evaluates them over
//! **complex numbers**, differentiates them symbolically and simplifies the
//! result.
//!
//! ## Overview
//! - Parse expressions with implicit multiplication (`4x`, `2 pi`, `(x+1)(x-1)`),
//!   complex literals (`2i`, `1.5+2i`) and 21 builtin functions.
//! - Evaluate with a tree walker or a compiled postfix [`Program`].
//! - Differentiate with respect to `x` and simplify the result.
//! - Render back to canonical text, LaTeX, or a Lua expression.
//!
//! Internally, the text is tokenized by the [`lexer`], turned into postfix
//! order with the Shunting-Yard algorithm and reduced into a [`Node`] tree by
//! the [`parser`].
//!
//! ## Example
//! ```rust
//! use num_complex::Complex;
//! use symcalc::Formula;
//!
//! let f = Formula::parse("sin(x)^2 + 4x").unwrap();
//! let y = f.calc(Complex::new(0.0, 0.0)).unwrap();
//! assert_eq!(y, Complex::new(0.0, 0.0));
//!
//! let df = f.derivative().unwrap();
//! println!("d/dx {} = {}", f, df);
//! println!("{}", df.latex());
//! ```
//!
//! ## Example: Configuring a Formula
//! ```rust
//! use num_complex::Complex;
//! use symcalc::FormulaBuilder;
//!
//! let f = FormulaBuilder::new("a*x^2 + a*x^2")
//!     .with_variable("a", Complex::new(0.0, 1.0))
//!     .optimize(true)
//!     .build()
//!     .unwrap();
//! assert_eq!(f.to_string(), "2*(a*x^2)");
//! assert_eq!(f.calc(Complex::new(1.0, 0.0)).unwrap(), Complex::new(0.0, 2.0));
//! ```
//!
//! ## Example: Retrieving All Names
//! ```rust
//! // Constants bound by default
//! let constant_names: Vec<&'static str> = symcalc::constants::names();
//! println!("Constants: {:?}", constant_names);
//!
//! // Functions
//! let function_names: &[&'static str] = symcalc::functions::names();
//! assert_eq!(function_names.len(), 21);
//! ```
//!
//! ## License
//! Licensed under either **MIT** or **Apache-2.0** at your option.

pub mod astnode;
pub mod builder;
pub mod calc;
pub mod constants;
pub mod derivative;
pub mod error;
pub mod formula;
pub mod functions;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod render;
pub mod rpn;
pub mod script;
pub mod token;
pub mod variable;

pub use astnode::{BinaryKind, Node};
pub use builder::FormulaBuilder;
pub use calc::{EvalMode, Evaluate};
pub use error::{DerivativeError, Error, EvalError, LexError, ParseError, ParseErrors, ScriptError};
pub use formula::{Formula, MAX_INTERVAL_POINTS};
pub use functions::FunctionKind;
pub use rpn::{Instruction, Program};
pub use variable::Vars;

/// Parses `text` into a [`Formula`] with the default constants bound.
///
/// # Examples
/// ```rust
/// let f = symcalc::parse("4x").unwrap();
/// assert_eq!(f.calc_real(5.0).unwrap(), 20.0);
/// assert!(symcalc::parse("(1+2").is_err());
/// ```
pub fn parse(text: &str) -> Result<Formula, ParseErrors> {
    Formula::parse(text)
}
