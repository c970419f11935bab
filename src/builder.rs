//! # builder.rs
//!
//! This module provides [`FormulaBuilder`], the configurable way to build a
//! [`Formula`].

use std::sync::Arc;

use num_complex::Complex;

use crate::error::ParseErrors;
use crate::formula::Formula;
use crate::parser;
use crate::variable::Vars;

/// Builder for [`Formula`] with custom variables and simplification settings.
#[derive(Debug, Clone)]
pub struct FormulaBuilder
{
    formula: String,
    vars: Vars,
    default_constants: bool,
    optimize: bool,
    simplify_derivatives: bool,
}

impl FormulaBuilder
{
    /// Creates a new `FormulaBuilder` for the given formula text.
    ///
    /// By default the constants `e`, `pi` and `phi` are bound, the parsed
    /// tree is kept as written, and derivatives are simplified.
    ///
    /// # Examples
    /// ```rust
    /// use symcalc::FormulaBuilder;
    /// use num_complex::Complex;
    ///
    /// let f = FormulaBuilder::new("a*x + 1")
    ///     .with_variable("a", 2.0)
    ///     .build()
    ///     .expect("Failed to parse 'a*x + 1'");
    /// assert_eq!(f.calc(Complex::new(3.0, 0.0)).unwrap(), Complex::new(7.0, 0.0));
    /// ```
    pub fn new(formula: &str) -> Self
    {
        Self {
            formula: formula.to_string(),
            vars: Vars::empty(),
            default_constants: true,
            optimize: false,
            simplify_derivatives: true,
        }
    }

    /// Adds every binding of `variables`, replacing earlier ones with the
    /// same name.
    pub fn with_variables(mut self, variables: Vars) -> Self
    {
        for (name, value) in variables.iter() {
            self.vars.set(name, *value);
        }
        self
    }

    /// Binds a single variable.
    pub fn with_variable<V>(mut self, name: &str, value: V) -> Self
    where
        Complex<f64>: From<V>,
    {
        self.vars.set(name, value);
        self
    }

    /// Starts from an empty table instead of the default constants.
    ///
    /// Constants bound explicitly with [`with_variable`](Self::with_variable)
    /// or [`with_variables`](Self::with_variables) are kept.
    pub fn without_default_constants(mut self) -> Self
    {
        self.default_constants = false;
        self
    }

    /// Optimizes the tree right after parsing.
    pub fn optimize(mut self, enabled: bool) -> Self
    {
        self.optimize = enabled;
        self
    }

    /// Whether [`Formula::derivative`] simplifies its result.
    pub fn simplify_derivatives(mut self, enabled: bool) -> Self
    {
        self.simplify_derivatives = enabled;
        self
    }

    /// Parses the formula and assembles the [`Formula`].
    ///
    /// # Errors
    ///
    /// Every lexical error in the text, followed by the structural parse error
    /// that stopped parsing, if any.
    pub fn build(&self) -> Result<Formula, ParseErrors>
    {
        let mut root = parser::parse(&self.formula)?;
        if self.optimize {
            root = root.optimize();
        }

        let mut vars = if self.default_constants { Vars::new() } else { Vars::empty() };
        for (name, value) in self.vars.iter() {
            vars.set(name, *value);
        }
        log::debug!(
            "built formula '{}' with {} variables (optimize: {}, simplify derivatives: {})",
            self.formula, vars.len(), self.optimize, self.simplify_derivatives
        );

        Ok(Formula::from_parts(root, Arc::new(vars), self.simplify_derivatives))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, EvalError, LexError};
    use approx::assert_abs_diff_eq;

    fn re(x: f64) -> Complex<f64> {
        Complex::new(x, 0.0)
    }

    #[test]
    fn test_defaults() {
        let f = FormulaBuilder::new("x + x").build().unwrap();
        assert_eq!(f.to_string(), "x+x");
        assert!(f.vars().contains("pi"));
        assert_eq!(f.derivative().unwrap().to_string(), "2");
    }

    #[test]
    fn test_optimize_after_parse() {
        let f = FormulaBuilder::new("x + x").optimize(true).build().unwrap();
        assert_eq!(f.to_string(), "2*x");
    }

    #[test]
    fn test_raw_derivatives() {
        let f = FormulaBuilder::new("3x").simplify_derivatives(false).build().unwrap();
        let df = f.derivative().unwrap();
        assert_eq!(df.to_string(), "x*0+3*1");
        assert_eq!(df.calc(re(1.0)).unwrap(), re(3.0));
        // the setting carries over to higher derivatives
        assert_eq!(df.derivative().unwrap().to_string(), "0*1+x*0+(1*0+3*0)");
    }

    #[test]
    fn test_variables() {
        let mut extra = Vars::empty();
        extra.set("b", 4.0);
        let f = FormulaBuilder::new("a + b + pi")
            .with_variable("A", 1.0)
            .with_variables(extra)
            .build()
            .unwrap();
        assert_abs_diff_eq!(f.calc(re(0.0)).unwrap().re, 5.0 + std::f64::consts::PI, epsilon = 1.0e-12);
    }

    #[test]
    fn test_without_default_constants() {
        let f = FormulaBuilder::new("pi*x")
            .without_default_constants()
            .build()
            .unwrap();
        assert_eq!(
            f.calc(re(1.0)).unwrap_err(),
            EvalError::UndefinedVariable { name: "pi".into(), position: Some(0) }
        );

        let f = FormulaBuilder::new("pi*x")
            .with_variable("pi", 3.0)
            .without_default_constants()
            .build()
            .unwrap();
        assert_eq!(f.calc(re(2.0)).unwrap(), re(6.0));
        assert!(!f.vars().contains("e"));
    }

    #[test]
    fn test_build_reports_all_lex_errors() {
        let errs = FormulaBuilder::new("1 + @ + $").build().unwrap_err();
        assert_eq!(errs.len(), 2);
        assert_eq!(errs.0[0], Error::Lex(LexError { position: 4 }));
        assert_eq!(errs.0[1], Error::Lex(LexError { position: 8 }));
    }
}
