//! # optimizer.rs
//!
//! Rewrite-based simplification of expression trees.
//!
//! The optimizer works bottom-up: children are simplified first, then the
//! rules of the parent are tried in a fixed order and the first one that
//! matches wins. Every `fold_*` helper returns a tree that no rule matches
//! again, which is what makes [`Node::optimize`] idempotent and keeps it
//! linear in the size of the tree.

use num_complex::Complex;

use crate::astnode::{BinaryKind, Node};
use crate::calc::normalize;
use crate::functions::core::as_integer_exponent;
use crate::functions::FunctionKind;

/// Builds a literal, normalizing `-0` to `0` so it renders without a sign.
fn literal(value: Complex<f64>) -> Node {
    Node::Number(normalize(value))
}

/// Node impl `optimize` and its helper impls
impl Node {
    /// Simplifies the tree.
    ///
    /// Folds constant subexpressions, removes additive and multiplicative
    /// identities, moves numeric factors to the left, hoists signs out of
    /// products and quotients, and applies a few function identities such as
    /// `log(e) = 1` and `cos(-a) = cos(a)`.
    ///
    /// The result evaluates to the same value as the input wherever the input
    /// is defined. Applying `optimize` to its own output returns an equal tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use symcalc::parser::parse;
    ///
    /// let tree = parse("x + x").unwrap().optimize();
    /// assert_eq!(tree.to_string(), "2*x");
    /// ```
    pub fn optimize(self) -> Self {
        let before = self.size();
        let result = self.simplify();
        log::debug!("optimized tree from {} to {} nodes", before, result.size());
        result
    }

    fn simplify(self) -> Self {
        match self {
            Self::UnaryMinus(operand) => operand.simplify().negated(),
            Self::Binary { kind, left, right, position } => {
                Self::fold_binary(kind, left.simplify(), right.simplify(), position)
            },
            Self::Call { func, arg, position } => Self::fold_call(func, arg.simplify(), position),
            leaf => leaf,
        }
    }

    /// Negates a simplified node without leaving a double negation behind.
    fn negated(self) -> Self {
        match self {
            Self::Number(value) => literal(-value),
            Self::UnaryMinus(operand) => *operand,
            other => other.negative(),
        }
    }

    /// A negative real literal or an explicit negation.
    fn is_negative(&self) -> bool {
        match self {
            Self::Number(value) => value.im == 0.0 && value.re < 0.0,
            Self::UnaryMinus(_) => true,
            _ => false,
        }
    }

    fn is_negation(&self) -> bool {
        matches!(self, Self::UnaryMinus(_))
    }

    fn rebuild(kind: BinaryKind, left: Self, right: Self, position: Option<usize>) -> Self {
        Self::Binary { kind, left: Box::new(left), right: Box::new(right), position }
    }

    /// Internal helper to fold a binary operator with two simplified operands.
    ///
    /// Two numbers are combined into one unless the division is by zero or the
    /// result would not be finite; both cases are left for the evaluator to
    /// report or compute.
    fn fold_binary(kind: BinaryKind, left: Self, right: Self, position: Option<usize>) -> Self {
        if let (Self::Number(l), Self::Number(r)) = (&left, &right) {
            let divides_by_zero = kind == BinaryKind::Div && r.re == 0.0 && r.im == 0.0;
            if !divides_by_zero {
                let value = kind.apply(*l, *r);
                if value.is_finite() {
                    log::trace!("folded {} {} {} into {}", l, kind, r, value);
                    return literal(value);
                }
            }
        }

        match kind {
            BinaryKind::Add => Self::fold_add(left, right, position),
            BinaryKind::Sub => Self::fold_sub(left, right, position),
            BinaryKind::Mul => Self::fold_mul(left, right, position),
            BinaryKind::Div => Self::fold_div(left, right, position),
            BinaryKind::Pow => Self::fold_pow(left, right, position),
        }
    }

    /// - `a + 0` → `a`, `0 + a` → `a`
    /// - `a + (-b)` → `a - b`
    /// - `a + a` → `2 * a`
    fn fold_add(left: Self, right: Self, position: Option<usize>) -> Self {
        if right == Self::ZERO {
            return left;
        }
        if left == Self::ZERO {
            return right;
        }
        if right.is_negative() {
            return Self::fold_binary(BinaryKind::Sub, left, right.negated(), position);
        }
        if left == right {
            log::trace!("combined like terms {}", left);
            return Self::fold_binary(BinaryKind::Mul, Self::TWO, left, None);
        }
        Self::rebuild(BinaryKind::Add, left, right, position)
    }

    /// - `a - 0` → `a`, `0 - a` → `-a`
    /// - `a - (-b)` → `a + b`
    /// - `a - a` → `0`
    fn fold_sub(left: Self, right: Self, position: Option<usize>) -> Self {
        if right == Self::ZERO {
            return left;
        }
        if left == Self::ZERO {
            return right.negated();
        }
        if right.is_negative() {
            return Self::fold_binary(BinaryKind::Add, left, right.negated(), position);
        }
        if left == right {
            return Self::ZERO;
        }
        Self::rebuild(BinaryKind::Sub, left, right, position)
    }

    /// Multiplication identities, then the numeric factor is moved to the
    /// left, then signs are hoisted so at most one minus stays outside.
    fn fold_mul(left: Self, right: Self, position: Option<usize>) -> Self {
        if left == Self::ZERO || right == Self::ZERO {
            return Self::ZERO;
        }
        if left == Self::ONE {
            return right;
        }
        if right == Self::ONE {
            return left;
        }
        if left == Self::MINUS_ONE {
            return right.negated();
        }
        if right == Self::MINUS_ONE {
            return left.negated();
        }
        if right.is_number() && !left.is_number() {
            return Self::fold_binary(BinaryKind::Mul, right, left, position);
        }
        Self::hoist_signs(BinaryKind::Mul, left, right, position)
    }

    fn fold_div(left: Self, right: Self, position: Option<usize>) -> Self {
        if right == Self::ONE {
            return left;
        }
        if right == Self::MINUS_ONE {
            return left.negated();
        }
        Self::hoist_signs(BinaryKind::Div, left, right, position)
    }

    /// `(-a) op (-b)` → `a op b`; `(-a) op b` and `a op (-b)` → `-(a op b)`.
    fn hoist_signs(kind: BinaryKind, left: Self, right: Self, position: Option<usize>) -> Self {
        if left.is_negative() && right.is_negative() {
            return Self::fold_binary(kind, left.negated(), right.negated(), position);
        }
        if left.is_negation() {
            log::trace!("hoisted sign out of left operand of {}", kind);
            return Self::fold_binary(kind, left.negated(), right, position).negated();
        }
        if right.is_negation() {
            log::trace!("hoisted sign out of right operand of {}", kind);
            return Self::fold_binary(kind, left, right.negated(), position).negated();
        }
        Self::rebuild(kind, left, right, position)
    }

    /// Power identities.
    ///
    /// - `0 ^ a` → `0` when `a` is not a literal, or a literal with a positive
    ///   real part
    /// - `1 ^ a` → `1`, `a ^ 0` → `1`, `a ^ 1` → `a`
    /// - `a ^ (-k)` → `1 / a^k`
    /// - `10 ^ log10(a)` → `a`, `e ^ log(a)` → `a`
    /// - `(-a) ^ k` → `a^k` for even integers `k`, `-(a^k)` for odd ones
    fn fold_pow(base: Self, exp: Self, position: Option<usize>) -> Self {
        if base == Self::ZERO && exp.as_number().map_or(true, |e| e.re > 0.0) {
            return Self::ZERO;
        }
        if base == Self::ONE || exp == Self::ZERO {
            return Self::ONE;
        }
        if exp == Self::ONE {
            return base;
        }
        if exp.is_number() && exp.is_negative() {
            let power = Self::fold_binary(BinaryKind::Pow, base, exp.negated(), position);
            return Self::fold_binary(BinaryKind::Div, Self::ONE, power, None);
        }

        match (base, exp) {
            (base, Self::Call { func: FunctionKind::Log10, arg, .. }) if base == Self::number(10.0) => *arg,
            (base, Self::Call { func: FunctionKind::Log | FunctionKind::Ln, arg, .. }) if base.is_euler() => *arg,
            (Self::UnaryMinus(inner), exp) => match exp.as_number().as_ref().and_then(as_integer_exponent) {
                Some(k) if k % 2 == 0 => Self::fold_binary(BinaryKind::Pow, *inner, exp, position),
                Some(_) => Self::fold_binary(BinaryKind::Pow, *inner, exp, position).negated(),
                None => Self::rebuild(BinaryKind::Pow, Self::UnaryMinus(inner), exp, position),
            },
            (base, exp) => Self::rebuild(BinaryKind::Pow, base, exp, position),
        }
    }

    /// Function identities, constant folding of calls and even/odd symmetry.
    ///
    /// A logarithm of a negative real literal is left unfolded so real-valued
    /// evaluation can still report it.
    fn fold_call(func: FunctionKind, arg: Self, position: Option<usize>) -> Self {
        match func {
            FunctionKind::Log | FunctionKind::Ln if arg.is_euler() => return Self::ONE,
            FunctionKind::Log10 if arg == Self::number(10.0) => return Self::ONE,
            FunctionKind::Sin | FunctionKind::Tan if arg == Self::ZERO => return Self::ZERO,
            FunctionKind::Cos if arg == Self::ZERO => return Self::ONE,
            _ => {},
        }

        if let Self::Number(value) = &arg {
            let log_of_negative = func.is_logarithm() && value.im == 0.0 && value.re < 0.0;
            if !log_of_negative {
                let result = func.apply(value);
                if result.is_finite() {
                    log::trace!("folded {}({}) into {}", func, value, result);
                    return literal(result);
                }
            }
        }

        match (func, arg) {
            (FunctionKind::Sin | FunctionKind::Tan, Self::UnaryMinus(inner)) => {
                Self::fold_call(func, *inner, position).negated()
            },
            (FunctionKind::Cos, Self::UnaryMinus(inner)) => Self::fold_call(func, *inner, position),
            (func, arg) => Self::Call { func, arg: Box::new(arg), position },
        }
    }
}
