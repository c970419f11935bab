//! # calc.rs
//!
//! Numeric evaluation of expression trees.
//!
//! [`Evaluate`] is the contract shared by every evaluator in the crate: the
//! recursive tree walker implemented here for [`Node`] and the compiled
//! postfix [`Program`](crate::rpn::Program). Both must produce identical
//! values and identical errors for the same tree.
//!
//! Evaluation is fail-fast. The left operand of a binary node is evaluated
//! before the right one, and the first error aborts the walk.

use num_complex::Complex;
use num_traits::Zero;

use crate::astnode::{BinaryKind, Node};
use crate::error::EvalError;
use crate::functions::FunctionKind;
use crate::variable::Vars;

/// Selects how function results outside the real line are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvalMode {
    /// Full complex arithmetic.
    #[default]
    Complex,
    /// Real-valued evaluation: logarithms of negative reals are errors.
    Real,
}

/// Evaluates a formula for one value of the argument `x`.
pub trait Evaluate {
    /// Evaluates with an explicit mode.
    fn eval_with(
        &self,
        x: Complex<f64>,
        vars: &Vars,
        mode: EvalMode,
    ) -> Result<Complex<f64>, EvalError>;

    /// Complex evaluation.
    fn eval(&self, x: Complex<f64>, vars: &Vars) -> Result<Complex<f64>, EvalError> {
        self.eval_with(x, vars, EvalMode::Complex)
    }

    /// Real-valued evaluation; returns the real part of the result.
    fn eval_real(&self, x: f64, vars: &Vars) -> Result<f64, EvalError> {
        self.eval_with(Complex::new(x, 0.0), vars, EvalMode::Real)
            .map(|value| value.re)
    }
}

/// Turns a negative zero in either part into a positive one.
///
/// Negating a real value leaves `-0` in its imaginary part, which puts the
/// value on the other side of the branch cut of `sqrt`, `log` and `powc`.
/// Every intermediate result passes through here so that `-4` and the
/// literal `-4` are the same number.
pub(crate) fn normalize(value: Complex<f64>) -> Complex<f64> {
    Complex::new(value.re + 0.0, value.im + 0.0)
}

/// Applies a binary operator, rejecting an exact zero divisor.
pub(crate) fn apply_binary(
    kind: BinaryKind,
    l: Complex<f64>,
    r: Complex<f64>,
    position: Option<usize>,
) -> Result<Complex<f64>, EvalError> {
    if kind == BinaryKind::Div && r.is_zero() {
        return Err(EvalError::DivisionByZero { position });
    }
    Ok(normalize(kind.apply(l, r)))
}

/// Applies a builtin function under the given mode.
pub(crate) fn apply_function(
    func: FunctionKind,
    value: Complex<f64>,
    position: Option<usize>,
    mode: EvalMode,
) -> Result<Complex<f64>, EvalError> {
    if mode == EvalMode::Real && func.is_logarithm() && value.im == 0.0 && value.re < 0.0 {
        return Err(EvalError::LogOfNegative { function: func, position });
    }
    Ok(normalize(func.apply(&value)))
}

/// Applies a builtin function given by name.
///
/// # Errors
///
/// [`EvalError::UnknownFunction`] if `name` is not in the function table.
///
/// # Examples
///
/// ```
/// use symcalc::calc::call_named;
/// use num_complex::Complex;
///
/// let y = call_named("COS", Complex::new(0.0, 0.0)).unwrap();
/// assert_eq!(y, Complex::new(1.0, 0.0));
/// assert!(call_named("cot", Complex::new(0.0, 0.0)).is_err());
/// ```
pub fn call_named(name: &str, value: Complex<f64>) -> Result<Complex<f64>, EvalError> {
    let func = FunctionKind::lookup(name)
        .ok_or_else(|| EvalError::UnknownFunction { name: name.to_string(), position: None })?;
    apply_function(func, value, None, EvalMode::Complex)
}

impl Evaluate for Node {
    fn eval_with(
        &self,
        x: Complex<f64>,
        vars: &Vars,
        mode: EvalMode,
    ) -> Result<Complex<f64>, EvalError> {
        match self {
            Self::Number(value) => Ok(*value),
            Self::Argument => Ok(x),
            Self::Variable { name, position } => vars.get(name)
                .ok_or_else(|| EvalError::UndefinedVariable { name: name.clone(), position: *position }),
            Self::UnaryMinus(operand) => Ok(normalize(-operand.eval_with(x, vars, mode)?)),
            Self::Binary { kind, left, right, position } => {
                let l = left.eval_with(x, vars, mode)?;
                let r = right.eval_with(x, vars, mode)?;
                apply_binary(*kind, l, r, *position)
            },
            Self::Call { func, arg, position } => {
                let value = arg.eval_with(x, vars, mode)?;
                apply_function(*func, value, *position, mode)
            },
        }
    }
}
