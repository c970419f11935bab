//! # buildin.rs
//!
//! Builtin mathematical functions for formula evaluation.
//!
//! This module defines the closed set of unary functions a formula may call,
//! the case-insensitive name table used by the lexer, and the markup names
//! used by the LaTeX renderer.

use crate::functions::core::ComplexBackend;

use phf::Map;
use phf_macros::phf_map;

/// Error type for parsing builtin function names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownFunctionName;

macro_rules! define_functions {
    ( $( $variant:ident => { name: $name:expr, latex: $latex:expr, apply: $apply:expr } ), + $(,)? ) => {
        /// Identifier of a builtin unary function.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum FunctionKind {
            $( $variant ), +
        }

        impl FunctionKind {
            /// Canonical lowercase name, as accepted by the parser.
            pub fn name(&self) -> &'static str
            {
                match self {
                    $( Self::$variant => $name, )+
                }
            }

            /// Markup command used when rendering to LaTeX.
            pub fn latex(&self) -> &'static str
            {
                match self {
                    $( Self::$variant => $latex, )+
                }
            }

            /// Applies the function to a complex value.
            pub(crate) fn apply<T: ComplexBackend>(&self, x: &T) -> T
            {
                match self {
                    $( Self::$variant => $apply(x), )+
                }
            }

            /// Returns a list of all function names.
            pub fn names() -> &'static [&'static str]
            {
                &[ $( $name ),+ ]
            }
        }
    };
}

define_functions! {
    Arcsin  => { name: "arcsin",    latex: "\\arcsin",                  apply: |x: &T| x.asin() },
    Arccos  => { name: "arccos",    latex: "\\arccos",                  apply: |x: &T| x.acos() },
    Arctan  => { name: "arctan",    latex: "\\arctan",                  apply: |x: &T| x.atan() },
    Arcsinh => { name: "arcsinh",   latex: "\\operatorname{arcsinh}",   apply: |x: &T| x.asinh() },
    Arccosh => { name: "arccosh",   latex: "\\operatorname{arccosh}",   apply: |x: &T| x.acosh() },
    Arctanh => { name: "arctanh",   latex: "\\operatorname{arctanh}",   apply: |x: &T| x.atanh() },
    Sin     => { name: "sin",       latex: "\\sin",                     apply: |x: &T| x.sin() },
    Cos     => { name: "cos",       latex: "\\cos",                     apply: |x: &T| x.cos() },
    Tan     => { name: "tan",       latex: "\\tan",                     apply: |x: &T| x.tan() },
    Sinh    => { name: "sinh",      latex: "\\sinh",                    apply: |x: &T| x.sinh() },
    Cosh    => { name: "cosh",      latex: "\\cosh",                    apply: |x: &T| x.cosh() },
    Tanh    => { name: "tanh",      latex: "\\tanh",                    apply: |x: &T| x.tanh() },
    Sqrt    => { name: "sqrt",      latex: "\\sqrt",                    apply: |x: &T| x.sqrt() },
    Cbrt    => { name: "cbrt",      latex: "\\sqrt[3]",                 apply: |x: &T| x.cbrt() },
    Exp     => { name: "exp",       latex: "\\exp",                     apply: |x: &T| x.exp() },
    Ln      => { name: "ln",        latex: "\\ln",                      apply: |x: &T| x.ln() },
    Log     => { name: "log",       latex: "\\ln",                      apply: |x: &T| x.ln() },
    Log10   => { name: "log10",     latex: "\\log_{10}",                apply: |x: &T| x.log10() },
    Log2    => { name: "log2",      latex: "\\log_{2}",                 apply: |x: &T| x.log2() },
    Erf     => { name: "erf",       latex: "\\operatorname{erf}",       apply: |x: &T| x.erf() },
    Gamma   => { name: "gamma",     latex: "\\Gamma",                   apply: |x: &T| x.gamma() },
}

/// Lowercase function name to identifier.
static FUNCTIONS: Map<&'static str, FunctionKind> = phf_map! {
    "arcsin"    => FunctionKind::Arcsin,
    "arccos"    => FunctionKind::Arccos,
    "arctan"    => FunctionKind::Arctan,
    "arcsinh"   => FunctionKind::Arcsinh,
    "arccosh"   => FunctionKind::Arccosh,
    "arctanh"   => FunctionKind::Arctanh,
    "sin"       => FunctionKind::Sin,
    "cos"       => FunctionKind::Cos,
    "tan"       => FunctionKind::Tan,
    "sinh"      => FunctionKind::Sinh,
    "cosh"      => FunctionKind::Cosh,
    "tanh"      => FunctionKind::Tanh,
    "sqrt"      => FunctionKind::Sqrt,
    "cbrt"      => FunctionKind::Cbrt,
    "exp"       => FunctionKind::Exp,
    "ln"        => FunctionKind::Ln,
    "log"       => FunctionKind::Log,
    "log10"     => FunctionKind::Log10,
    "log2"      => FunctionKind::Log2,
    "erf"       => FunctionKind::Erf,
    "gamma"     => FunctionKind::Gamma,
};

impl FunctionKind {
    /// Looks a name up in the function table, ignoring ASCII case.
    pub fn lookup(name: &str) -> Option<Self>
    {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            FUNCTIONS.get(name.to_ascii_lowercase().as_str()).copied()
        } else {
            FUNCTIONS.get(name).copied()
        }
    }

    /// True for the logarithm family, which is undefined for negative reals
    /// in real-valued evaluation.
    pub fn is_logarithm(&self) -> bool
    {
        matches!(self, Self::Ln | Self::Log | Self::Log10 | Self::Log2)
    }
}

impl std::str::FromStr for FunctionKind {
    type Err = UnknownFunctionName;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        Self::lookup(s).ok_or(UnknownFunctionName)
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex;
    use approx::assert_abs_diff_eq;
    use std::str::FromStr;

    #[test]
    fn test_table_covers_every_name() {
        assert_eq!(FunctionKind::names().len(), 21);
        for name in FunctionKind::names() {
            let kind = FunctionKind::lookup(name).expect("every listed name resolves");
            assert_eq!(kind.name(), *name);
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(FunctionKind::lookup("SIN"), Some(FunctionKind::Sin));
        assert_eq!(FunctionKind::lookup("Log10"), Some(FunctionKind::Log10));
        assert_eq!(FunctionKind::lookup("sine"), None);
        assert_eq!(FunctionKind::lookup(""), None);
        assert!(FunctionKind::from_str("pow").is_err());
    }

    #[test]
    fn test_apply() {
        let x = Complex::new(0.5, 0.0);
        assert_abs_diff_eq!(FunctionKind::Sin.apply(&x).re, 0.5f64.sin(), epsilon = 1.0e-12);
        assert_abs_diff_eq!(FunctionKind::Arctanh.apply(&x).re, 0.5f64.atanh(), epsilon = 1.0e-12);
        assert_abs_diff_eq!(FunctionKind::Log2.apply(&x).re, -1.0, epsilon = 1.0e-12);
        assert_abs_diff_eq!(FunctionKind::Gamma.apply(&x).re, std::f64::consts::PI.sqrt(), epsilon = 1.0e-9);
    }

    #[test]
    fn test_ln_and_log_agree() {
        let x = Complex::new(-2.0, 1.0);
        assert_eq!(FunctionKind::Ln.apply(&x), FunctionKind::Log.apply(&x));
    }
}
