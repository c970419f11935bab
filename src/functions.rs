//! Top-level functions module.
//!
//! This module groups the builtin unary functions a formula may call:
//!
//! - `buildin`: the closed set of [`FunctionKind`]s and the case-insensitive
//!   name table the lexer consults.
//! - `core`: the complex backend abstraction (`ComplexBackend`) that supplies
//!   every numerical operation the evaluator needs.
//! - `special`: complex implementations that `num_complex` does not ship
//!   (error function, gamma, real-axis cube root).
pub(crate) mod buildin;
pub(crate) mod core;
pub(crate) mod special;

pub use buildin::FunctionKind;

/// Return the available function names.
///
/// The slice is static and intended for error messages or completion lists.
pub fn names() -> &'static [&'static str]
{
    FunctionKind::names()
}
