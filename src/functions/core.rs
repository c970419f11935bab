//! # core.rs
//!
//! Core trait definitions for complex number operations.
//!
//! This module defines the `ComplexBackend` trait which abstracts the
//! mathematical operations the evaluator performs, so the builtin function
//! table is written once against the trait instead of a concrete type.

use num_complex::Complex;
use num_traits::{One, Zero};

use crate::functions::special;

/// Trait for complex number mathematical operations.
pub(crate) trait ComplexBackend: Copy + Send + Sync + 'static
{
    fn sin(&self) -> Self;
    fn cos(&self) -> Self;
    fn tan(&self) -> Self;

    fn asin(&self) -> Self;
    fn acos(&self) -> Self;
    fn atan(&self) -> Self;

    fn sinh(&self) -> Self;
    fn cosh(&self) -> Self;
    fn tanh(&self) -> Self;

    fn asinh(&self) -> Self;
    fn acosh(&self) -> Self;
    fn atanh(&self) -> Self;

    fn exp(&self) -> Self;
    fn ln(&self) -> Self;
    fn log10(&self) -> Self;
    fn log2(&self) -> Self;

    fn sqrt(&self) -> Self;
    fn cbrt(&self) -> Self;
    fn erf(&self) -> Self;
    fn gamma(&self) -> Self;

    fn pow(&self, rhs: &Self) -> Self;
}

/// Returns true when `exp` is a real integer that fits into `i32`.
pub(crate) fn as_integer_exponent(exp: &Complex<f64>) -> Option<i32>
{
    let re = exp.re;
    if exp.im == 0.0 && re.fract() == 0.0 && re >= i32::MIN as f64 && re <= i32::MAX as f64 {
        Some(re as i32)
    } else {
        None
    }
}

/// Implementation of `ComplexBackend` for `num_complex::Complex<f64>`.
impl ComplexBackend for Complex<f64>
{
    fn sin(&self) -> Self { Complex::sin(*self) }
    fn cos(&self) -> Self { Complex::cos(*self) }
    fn tan(&self) -> Self { Complex::tan(*self) }

    fn asin(&self) -> Self { Complex::asin(*self) }
    fn acos(&self) -> Self { Complex::acos(*self) }
    fn atan(&self) -> Self { Complex::atan(*self) }

    fn sinh(&self) -> Self { Complex::sinh(*self) }
    fn cosh(&self) -> Self { Complex::cosh(*self) }
    fn tanh(&self) -> Self { Complex::tanh(*self) }

    fn asinh(&self) -> Self { Complex::asinh(*self) }
    fn acosh(&self) -> Self { Complex::acosh(*self) }
    fn atanh(&self) -> Self { Complex::atanh(*self) }

    fn exp(&self) -> Self { Complex::exp(*self) }
    fn ln(&self) -> Self { Complex::ln(*self) }
    fn log10(&self) -> Self { Complex::ln(*self) / std::f64::consts::LN_10 }
    fn log2(&self) -> Self { Complex::ln(*self) / std::f64::consts::LN_2 }

    fn sqrt(&self) -> Self { Complex::sqrt(*self) }
    fn cbrt(&self) -> Self { special::cbrt(*self) }
    fn erf(&self) -> Self { special::erf(*self) }
    fn gamma(&self) -> Self { special::gamma(*self) }

    /// Integer exponents use repeated multiplication so that e.g. `(-2)^2`
    /// stays exactly `4`; everything else goes through `powc`.
    fn pow(&self, rhs: &Self) -> Self {
        if Zero::is_zero(rhs) {
            return One::one();
        }
        match as_integer_exponent(rhs) {
            Some(n) => Complex::powi(self, n),
            None if Zero::is_zero(self) && rhs.re > 0.0 => Zero::zero(),
            None => Complex::powc(*self, *rhs),
        }
    }
}
