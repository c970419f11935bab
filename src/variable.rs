//! # variable.rs
//!
//! This module provides the `Vars` struct, which manages the table of named
//! variables a formula is evaluated against.
//!
//! Names are case-insensitive: every key is lowercased on the way in and on
//! lookup. The free argument `x` is never stored here; it is bound by the
//! caller of each evaluation.

use num_complex::Complex;
use std::collections::HashMap;

use crate::constants;

/// Name of the distinguished free argument.
pub const ARGUMENT_NAME: &str = "x";

/// A collection of named variables for expression evaluation.
///
/// # Examples
///
/// ```
/// use symcalc::Vars;
/// use num_complex::Complex;
///
/// let mut vars = Vars::default();
/// vars.set("A", Complex::new(1.0, 2.0));
///
/// assert!(vars.contains("a"));
/// assert!(vars.contains("pi"));
/// assert_eq!(vars.get("a"), Some(Complex::new(1.0, 2.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Vars {
    table: HashMap<String, Complex<f64>>,
}

fn normalize(name: &str) -> String {
    name.to_lowercase()
}

impl Vars {
    /// Creates a table seeded with the default constants `e`, `pi` and `phi`.
    pub fn new() -> Self {
        constants::iter().collect()
    }

    /// Creates a table without any constants.
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Binds `name` to `value`, replacing a previous binding or default.
    ///
    /// Binding the argument name `x` is ignored.
    pub fn set<V>(&mut self, name: &str, value: V)
    where
        Complex<f64>: From<V>,
    {
        let key = normalize(name);
        if key == ARGUMENT_NAME {
            log::warn!("ignoring binding for reserved argument name '{}'", name);
            return;
        }
        self.table.insert(key, Complex::from(value));
    }

    /// Binds several names at once.
    pub fn insert<V>(&mut self, items: &[(&str, V)])
    where
        V: Clone,
        Complex<f64>: From<V>,
    {
        for (name, value) in items {
            self.set(name, value.clone());
        }
    }

    /// Checks if a variable with the given name exists in the table.
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(&normalize(name))
    }

    /// Retrieves the value of a variable by name.
    pub fn get(&self, name: &str) -> Option<Complex<f64>> {
        match self.table.get(name) {
            Some(value) => Some(*value),
            None => self.table.get(&normalize(name)).copied(),
        }
    }

    /// Removes a binding, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Complex<f64>> {
        self.table.remove(&normalize(name))
    }

    /// Clears all variables from the table, constants included.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns an iterator over the bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Complex<f64>)> {
        self.table.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for Vars {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, V> FromIterator<(S, V)> for Vars
where
    S: AsRef<str>,
    Complex<f64>: From<V>,
{
    fn from_iter<T: IntoIterator<Item = (S, V)>>(iter: T) -> Self {
        let mut vars = Self::empty();
        for (name, value) in iter {
            vars.set(name.as_ref(), value);
        }
        vars
    }
}
