//! # formula.rs
//!
//! The [`Formula`] facade: one parsed tree plus the variable table it is
//! evaluated against.
//!
//! The table is held behind an [`Arc`]. Derivatives share it with the formula
//! they were taken from, and [`Formula::set_var`] copies it first when it is
//! shared, so a binding made on one formula never shows up in another.

use std::sync::Arc;

use num_complex::Complex;

use crate::astnode::Node;
use crate::calc::{EvalMode, Evaluate};
use crate::error::{DerivativeError, EvalError, ParseErrors, ScriptError};
use crate::parser;
use crate::rpn::Program;
use crate::script;
use crate::variable::Vars;

/// Largest number of points [`Formula::interval`] samples.
pub const MAX_INTERVAL_POINTS: usize = 1 << 24;

/// A parsed formula in the single argument `x`.
///
/// # Examples
///
/// ```
/// use symcalc::Formula;
/// use num_complex::Complex;
///
/// let mut f = Formula::parse("x^2 + a").unwrap();
/// f.set_var("a", 1.0);
/// assert_eq!(f.calc(Complex::new(2.0, 0.0)).unwrap(), Complex::new(5.0, 0.0));
///
/// let df = f.derivative().unwrap();
/// assert_eq!(df.to_string(), "2*x");
/// ```
#[derive(Debug, Clone)]
pub struct Formula {
    root: Node,
    vars: Arc<Vars>,
    simplify_derivatives: bool,
}

impl Formula {
    /// Parses `text` with the default constants `e`, `pi` and `phi` bound.
    pub fn parse(text: &str) -> Result<Self, ParseErrors> {
        let root = parser::parse(text)?;
        Ok(Self::new(root, Vars::new()))
    }

    /// Wraps an existing tree.
    pub fn new(root: Node, vars: Vars) -> Self {
        Self::from_parts(root, Arc::new(vars), true)
    }

    pub(crate) fn from_parts(root: Node, vars: Arc<Vars>, simplify_derivatives: bool) -> Self {
        Self { root, vars, simplify_derivatives }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    /// Binds a variable for this formula only.
    pub fn set_var<V>(&mut self, name: &str, value: V)
    where
        Complex<f64>: From<V>,
    {
        Arc::make_mut(&mut self.vars).set(name, value);
    }

    /// Replaces the tree with its simplified form.
    pub fn optimize(&mut self) {
        let root = std::mem::replace(&mut self.root, Node::ZERO);
        self.root = root.optimize();
    }

    /// Derivative with respect to `x` as a new formula sharing this one's
    /// variables.
    ///
    /// The result is simplified unless the formula was built with
    /// [`FormulaBuilder::simplify_derivatives`](crate::FormulaBuilder::simplify_derivatives)
    /// turned off.
    pub fn derivative(&self) -> Result<Self, DerivativeError> {
        let root = if self.simplify_derivatives {
            self.root.derivative()?
        } else {
            self.root.differentiate()?
        };
        Ok(self.derived(root))
    }

    /// Derivative with respect to `x` exactly as the rules produce it.
    pub fn derivative_raw(&self) -> Result<Self, DerivativeError> {
        let root = self.root.differentiate()?;
        Ok(self.derived(root))
    }

    fn derived(&self, root: Node) -> Self {
        Self::from_parts(root, Arc::clone(&self.vars), self.simplify_derivatives)
    }

    /// Evaluates at `x` with complex arithmetic.
    pub fn calc(&self, x: Complex<f64>) -> Result<Complex<f64>, EvalError> {
        self.root.eval(x, &self.vars)
    }

    /// Evaluates at a real `x` in real-valued mode and returns the real part.
    pub fn calc_real(&self, x: f64) -> Result<f64, EvalError> {
        self.root.eval_real(x, &self.vars)
    }

    /// Evaluates at every value of `xs`.
    ///
    /// Each entry equals what [`Formula::calc`] returns for that value.
    pub fn calc_n(&self, xs: &[Complex<f64>]) -> Vec<Result<Complex<f64>, EvalError>> {
        self.compile().eval_batch(xs, &self.vars, EvalMode::Complex)
    }

    /// Samples the formula in real-valued mode over `[min, max]`.
    ///
    /// The points are `min + i*step` for `i` in `0..=floor((max - min) / step)`.
    /// Every point carries its own result, so one failing point does not hide
    /// the others. A non-positive or non-finite step, or `max < min`, gives no
    /// points. So does a range that would need more than
    /// [`MAX_INTERVAL_POINTS`] points.
    pub fn interval(&self, min: f64, max: f64, step: f64) -> Vec<(f64, Result<f64, EvalError>)> {
        let bounds_ok = min.is_finite() && max.is_finite() && min <= max;
        if !bounds_ok || !step.is_finite() || step <= 0.0 {
            log::warn!("empty interval [{}, {}] with step {}", min, max, step);
            return Vec::new();
        }
        let span = ((max - min) / step).floor();
        if !span.is_finite() || span >= MAX_INTERVAL_POINTS as f64 {
            log::warn!("interval [{}, {}] with step {} exceeds {} points", min, max, step, MAX_INTERVAL_POINTS);
            return Vec::new();
        }
        let count = span as usize + 1;
        let xs: Vec<Complex<f64>> = (0..count)
            .map(|i| Complex::new(min + i as f64 * step, 0.0))
            .collect();
        let results = self.compile().eval_batch(&xs, &self.vars, EvalMode::Real);
        xs.iter()
            .zip(results)
            .map(|(x, result)| (x.re, result.map(|y| y.re)))
            .collect()
    }

    /// Compiles the tree into a postfix [`Program`].
    pub fn compile(&self) -> Program {
        Program::compile(&self.root)
    }

    pub fn latex(&self) -> String {
        self.root.latex()
    }

    /// Lua chunk returning `function(x)`, with the variables the tree reads
    /// bound to locals.
    pub fn to_lua(&self) -> Result<String, ScriptError> {
        script::lua_chunk(&self.root, &self.vars)
    }
}

impl std::str::FromStr for Formula {
    type Err = ParseErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn formula(text: &str) -> Formula {
        Formula::parse(text).unwrap()
    }

    fn re(x: f64) -> Complex<f64> {
        Complex::new(x, 0.0)
    }

    #[test]
    fn test_basic_values() {
        assert_eq!(formula("1+2*3").calc(re(0.0)).unwrap(), re(7.0));
        assert_eq!(formula("4x").calc(re(5.0)).unwrap(), re(20.0));
        assert_abs_diff_eq!(formula("sin(pi)").calc(re(0.0)).unwrap().re, 0.0, epsilon = 1.0e-6);
        assert_abs_diff_eq!(formula("sin(pi/2)").calc(re(0.0)).unwrap().re, 1.0, epsilon = 1.0e-12);
        assert_abs_diff_eq!(formula("ln(e)").calc(re(0.0)).unwrap().re, 1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn test_evaluation_errors() {
        assert_eq!(
            formula("4y").calc(re(5.0)).unwrap_err(),
            EvalError::UndefinedVariable { name: "y".into(), position: Some(1) }
        );
        assert!(matches!(
            formula("3/(5-x)").calc(re(5.0)).unwrap_err(),
            EvalError::DivisionByZero { .. }
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Formula::parse("").is_err());
        assert!(Formula::parse("1+(2*3").is_err());
        assert!(Formula::parse("1+2)").is_err());
        assert!("x^2".parse::<Formula>().is_ok());
    }

    #[test]
    fn test_optimize_in_place() {
        let mut f = formula("x*1 + 0");
        f.optimize();
        assert_eq!(f.to_string(), "x");
        assert_eq!(f.root(), &Node::Argument);
    }

    #[test]
    fn test_derivative_leaves_original() {
        let f = formula("x^2");
        let df = f.derivative().unwrap();
        assert_eq!(f.to_string(), "x^2");
        assert_eq!(df.to_string(), "2*x");
        assert!(Arc::ptr_eq(&f.vars, &df.vars));

        let raw = f.derivative_raw().unwrap();
        assert_ne!(raw.root(), df.root());
        assert_eq!(raw.calc(re(3.0)).unwrap(), df.calc(re(3.0)).unwrap());
    }

    #[test]
    fn test_set_var_is_local() {
        let mut f = formula("a*x");
        f.set_var("a", 2.0);
        let mut df = f.derivative().unwrap();
        assert_eq!(df.calc(re(0.0)).unwrap(), re(2.0));

        df.set_var("a", 10.0);
        assert_eq!(df.calc(re(0.0)).unwrap(), re(10.0));
        assert_eq!(f.calc(re(1.0)).unwrap(), re(2.0));
        assert!(!Arc::ptr_eq(&f.vars, &df.vars));
    }

    #[test]
    fn test_derivative_errors() {
        let err = formula("gamma(x)").derivative().unwrap_err();
        assert!(matches!(err, DerivativeError::Unsupported { .. }));
    }

    #[test]
    fn test_calc_real() {
        let f = formula("ln(x)");
        assert!(matches!(f.calc_real(-2.0), Err(EvalError::LogOfNegative { .. })));
        assert_abs_diff_eq!(f.calc_real(1.0).unwrap(), 0.0, epsilon = 1.0e-15);
    }

    #[test]
    fn test_calc_n_matches_calc() {
        let f = formula("sqrt(x)/(x-1) + a");
        let xs: Vec<Complex<f64>> = [-1.0, 0.0, 1.0, 2.0, 9.0].iter().map(|v| re(*v)).collect();
        let batch = f.calc_n(&xs);
        let single: Vec<_> = xs.iter().map(|x| f.calc(*x)).collect();
        assert_eq!(batch, single);
    }

    #[test]
    fn test_interval() {
        let points = formula("1/x").interval(-1.0, 1.0, 0.5);
        let xs: Vec<f64> = points.iter().map(|(x, _)| *x).collect();
        assert_eq!(xs, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(points[0].1, Ok(-1.0));
        assert!(matches!(points[2].1, Err(EvalError::DivisionByZero { .. })));
        assert_eq!(points[4].1, Ok(1.0));

        // the last point is dropped when the step does not divide the range
        assert_eq!(formula("x").interval(0.0, 1.0, 0.3).len(), 4);
        assert!(formula("x").interval(0.0, 1.0, 0.0).is_empty());
        assert!(formula("x").interval(1.0, 0.0, 0.1).is_empty());
        assert_eq!(formula("x").interval(2.0, 2.0, 1.0).len(), 1);
    }

    #[test]
    fn test_interval_too_many_points() {
        assert!(formula("x").interval(-1e308, 1e308, 1.0).is_empty());
        assert!(formula("x").interval(0.0, 1.0, 1e-300).is_empty());
        assert!(formula("x").interval(0.0, MAX_INTERVAL_POINTS as f64, 1.0).is_empty());
        assert_eq!(formula("x").interval(0.0, 1000.0, 0.5).len(), 2001);
    }

    #[test]
    fn test_optimize_idempotent() {
        let formulas = [
            "x+x", "-a*-b", "a*-b", "(-a)^2", "(-a)^3", "sin(-x)^-2", "x*x*x/x",
            "2*(x+1)-2*(x+1)", "e^(ln(x)*2)", "-(-(-x))", "log10(10)*x^1",
        ];
        for text in formulas {
            let mut once = formula(text);
            once.optimize();
            let mut twice = once.clone();
            twice.optimize();
            assert_eq!(once.root(), twice.root(), "{}", text);
        }
    }

    #[test]
    fn test_fixed_scenarios() {
        let optimized = |text: &str| {
            let mut f = formula(text);
            f.optimize();
            f.to_string()
        };
        assert_eq!(optimized("x+x"), "2*x");
        assert_eq!(optimized("-a*-b"), "a*b");
        assert_eq!(optimized("a*-b"), "-(a*b)");
        assert_eq!(optimized("(-a)^2"), "a^2");
        assert_eq!(optimized("(-a)^3"), "-(a^3)");

        let derived = |text: &str| formula(text).derivative().unwrap().to_string();
        assert_eq!(derived("x^2"), "2*x");
        assert_eq!(derived("ln(x)"), "1/x");
        assert_eq!(derived("sin(x)"), "cos(x)");
    }

    #[test]
    fn test_derivative_matches_finite_difference() {
        let formulas = [
            "x^3-2x+1", "sin(x)*cos(x)", "e^(x/2)", "sqrt(x^2+1)", "ln(x+2)",
            "arctan(x)", "x^x", "tanh(x)/x", "1/(1+x^2)", "log10(x+3)",
            "cosh(x)-sinh(x)", "arcsin(x/2)", "tan(x)^2", "exp(-x^2)", "2^x",
            "arccos(x/3)", "arcsinh(x)", "arccosh(x+2)", "arctanh(x/2)",
        ];
        let h = 1.0e-5;
        for text in formulas {
            let f = formula(text);
            let df = f.derivative().unwrap();
            for x0 in [0.3, 0.7, 1.1] {
                let forward = f.calc(re(x0 + h)).unwrap();
                let backward = f.calc(re(x0 - h)).unwrap();
                let estimate = (forward - backward) / (2.0 * h);
                let exact = df.calc(re(x0)).unwrap();
                let tolerance = 1.0e-5 * (1.0 + exact.norm());
                assert_abs_diff_eq!(exact.re, estimate.re, epsilon = tolerance);
                assert_abs_diff_eq!(exact.im, estimate.im, epsilon = tolerance);
            }
        }
    }

    #[test]
    fn test_round_trip() {
        let formulas = [
            "1+2*3", "x^2-3x+2", "-(x-1)^3", "sin(x)/(x+1)", "e^(2x)*cos(pi*x)",
            "(1+2i)*x-3i", "x/(1-x)/(2+x)", "2^-x", "--x", "log2(x+1)*gamma(x+1)",
        ];
        for text in formulas {
            let f = formula(text);
            let mut g = formula(&f.to_string());
            for x0 in [0.25, 0.5, 2.0] {
                assert_eq!(g.calc(re(x0)), f.calc(re(x0)), "{}", text);
            }

            // the optimized text parses back to an equal-valued formula too
            g.optimize();
            let h = formula(&g.to_string());
            for x0 in [0.25, 0.5, 2.0] {
                let expected = f.calc(re(x0)).unwrap();
                let got = h.calc(re(x0)).unwrap();
                assert_abs_diff_eq!(got.re, expected.re, epsilon = 1.0e-9);
                assert_abs_diff_eq!(got.im, expected.im, epsilon = 1.0e-9);
            }
        }
    }

    #[test]
    fn test_renderers() {
        let f = formula("(x+1)/2");
        assert_eq!(f.latex(), "\\frac{x+1}{2}");
        assert_eq!(
            formula("x*pi").to_lua().unwrap(),
            format!("local pi = {}\nreturn function(x) return (x*pi) end\n", std::f64::consts::PI)
        );
        assert!(formula("x+1i").to_lua().is_err());
    }
}
