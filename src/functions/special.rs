//! # special.rs
//!
//! Special functions over the complex plane.
//!
//! On the real axis the `libm` implementations are used directly; elsewhere
//! the error function uses its Maclaurin series near the origin and a
//! continued fraction for `erfc` further out, and gamma uses the Lanczos
//! approximation with the reflection formula for `Re(z) < 1/2`.

use num_complex::Complex;
use std::f64::consts::PI;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

const ERF_SERIES_RADIUS: f64 = 3.0;
const ERF_SERIES_MAX_TERMS: usize = 200;
const ERFC_FRACTION_DEPTH: usize = 80;

/// Real cube root on the real axis, principal root elsewhere.
pub(crate) fn cbrt(z: Complex<f64>) -> Complex<f64>
{
    if z.im == 0.0 {
        return Complex::new(libm::cbrt(z.re), 0.0);
    }
    z.powf(1.0 / 3.0)
}

/// Error function.
pub(crate) fn erf(z: Complex<f64>) -> Complex<f64>
{
    if z.im == 0.0 {
        return Complex::new(libm::erf(z.re), 0.0);
    }
    if z.re < 0.0 {
        return -erf(-z);
    }
    if z.norm() < ERF_SERIES_RADIUS {
        erf_series(z)
    } else {
        Complex::new(1.0, 0.0) - erfc_fraction(z)
    }
}

// erf(z) = 2/sqrt(pi) * sum_n (-1)^n z^(2n+1) / (n! (2n+1))
fn erf_series(z: Complex<f64>) -> Complex<f64>
{
    let z2 = z * z;
    let mut power = z;
    let mut sum = z;
    for n in 1..ERF_SERIES_MAX_TERMS {
        power = -power * z2 / n as f64;
        let term = power / (2 * n + 1) as f64;
        sum += term;
        if term.norm() <= f64::EPSILON * sum.norm() {
            break;
        }
    }
    sum * (2.0 / PI.sqrt())
}

// erfc(z) = exp(-z^2)/sqrt(pi) * 1/(z + (1/2)/(z + 1/(z + (3/2)/(z + ...)))), Re(z) >= 0
fn erfc_fraction(z: Complex<f64>) -> Complex<f64>
{
    let mut f = z;
    for k in (1..=ERFC_FRACTION_DEPTH).rev() {
        f = z + (k as f64 / 2.0) / f;
    }
    (-z * z).exp() / PI.sqrt() / f
}

/// Gamma function.
pub(crate) fn gamma(z: Complex<f64>) -> Complex<f64>
{
    if z.im == 0.0 {
        return Complex::new(libm::tgamma(z.re), 0.0);
    }
    if z.re < 0.5 {
        // reflection: gamma(z) gamma(1-z) = pi / sin(pi z)
        return PI / ((z * PI).sin() * gamma(Complex::new(1.0, 0.0) - z));
    }

    let z = z - 1.0;
    let mut x = Complex::new(LANCZOS_COEFFS[0], 0.0);
    for (i, coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        x += *coeff / (z + i as f64);
    }
    let t = z + LANCZOS_G + 0.5;
    (2.0 * PI).sqrt() * t.powc(z + 0.5) * (-t).exp() * x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_cbrt_real_axis() {
        assert_abs_diff_eq!(cbrt(Complex::new(-8.0, 0.0)).re, -2.0, epsilon = 1.0e-12);
        assert_abs_diff_eq!(cbrt(Complex::new(27.0, 0.0)).re, 3.0, epsilon = 1.0e-12);
    }

    #[test]
    fn test_cbrt_off_axis_cubes_back() {
        let z = Complex::new(1.0, 2.0);
        let r = cbrt(z);
        let back = r * r * r;
        assert_abs_diff_eq!(back.re, z.re, epsilon = 1.0e-12);
        assert_abs_diff_eq!(back.im, z.im, epsilon = 1.0e-12);
    }

    #[test]
    fn test_erf_real() {
        assert_abs_diff_eq!(erf(Complex::new(0.5, 0.0)).re, 0.520_499_877_813_046_5, epsilon = 1.0e-12);
    }

    #[test]
    fn test_erf_complex_series_and_fraction_agree_with_reference() {
        // erf(1+i) = 1.3161512816979477 + 0.19045346923783471i
        let small = erf(Complex::new(1.0, 1.0));
        assert_abs_diff_eq!(small.re, 1.316_151_281_697_947_7, epsilon = 1.0e-9);
        assert_abs_diff_eq!(small.im, 0.190_453_469_237_834_7, epsilon = 1.0e-9);

        // erf(3+1i) is close to 1 from below
        let far = erf(Complex::new(3.0, 1.0));
        assert!((far - Complex::new(1.0, 0.0)).norm() < 1.0e-3);
    }

    #[test]
    fn test_erf_is_odd() {
        let z = Complex::new(0.3, -0.7);
        let a = erf(z);
        let b = erf(-z);
        assert_abs_diff_eq!(a.re, -b.re, epsilon = 1.0e-12);
        assert_abs_diff_eq!(a.im, -b.im, epsilon = 1.0e-12);
    }

    #[test]
    fn test_gamma_real_and_complex() {
        assert_abs_diff_eq!(gamma(Complex::new(5.0, 0.0)).re, 24.0, epsilon = 1.0e-9);
        // gamma(z+1) = z gamma(z)
        let z = Complex::new(1.5, 0.5);
        let lhs = gamma(z + 1.0);
        let rhs = z * gamma(z);
        assert_abs_diff_eq!(lhs.re, rhs.re, epsilon = 1.0e-9);
        assert_abs_diff_eq!(lhs.im, rhs.im, epsilon = 1.0e-9);
    }

    #[test]
    fn test_gamma_reflection_branch() {
        let z = Complex::new(-0.5, 0.25);
        let lhs = gamma(z + 1.0);
        let rhs = z * gamma(z);
        assert_abs_diff_eq!(lhs.re, rhs.re, epsilon = 1.0e-9);
        assert_abs_diff_eq!(lhs.im, rhs.im, epsilon = 1.0e-9);
    }
}
