//! # constants.rs
//!
//! Mathematical constants every variable table starts out with.
//!
//! The table is process-wide and immutable; [`Vars`](crate::variable::Vars)
//! copies it on construction so callers may override individual entries.

use num_complex::Complex;
use phf::Map;
use phf_macros::phf_map;

/// The golden ratio.
pub const PHI: f64 = 1.618_033_988_749_895;

/// Default constants by their (lowercase) name.
static CONSTANTS: Map<&'static str, Complex<f64>> = phf_map! {
    "e" => Complex::new(std::f64::consts::E, 0.0),
    "pi" => Complex::new(std::f64::consts::PI, 0.0),
    "phi" => Complex::new(PHI, 0.0),
};

/// Retrieves a default constant by name.
pub fn get(name: &str) -> Option<Complex<f64>>
{
    CONSTANTS.get(name).copied()
}

/// Returns an iterator over the default constants.
pub fn iter() -> impl Iterator<Item = (&'static str, Complex<f64>)>
{
    CONSTANTS.entries().map(|(name, value)| (*name, *value))
}

/// Returns a list of the default constant names.
pub fn names() -> Vec<&'static str>
{
    CONSTANTS.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(get("e"), Some(Complex::new(std::f64::consts::E, 0.0)));
        assert_eq!(get("pi"), Some(Complex::new(std::f64::consts::PI, 0.0)));
        assert_eq!(get("phi").map(|c| c.im), Some(0.0));
        assert_eq!(get("x"), None);
    }

    #[test]
    fn test_golden_ratio() {
        assert!((PHI - (1.0 + 5f64.sqrt()) / 2.0).abs() < 1.0e-15);
    }

    #[test]
    fn test_names_and_iter_len() {
        let mut names = names();
        names.sort();
        assert_eq!(names, vec!["e", "phi", "pi"]);
        assert_eq!(iter().count(), 3);
    }
}
