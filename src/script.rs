//! # script.rs
//!
//! Serializes trees into Lua source for an external, real-valued evaluator.
//!
//! Loading and running the chunk is up to the caller. The output is fully
//! parenthesized because Lua binds `^` tighter than unary minus, which the
//! formula grammar does not.

use crate::astnode::Node;
use crate::error::ScriptError;
use crate::functions::FunctionKind;
use crate::variable::Vars;

impl Node {
    /// Renders the tree as a Lua expression in the argument `x`.
    ///
    /// Variables are emitted as plain Lua names; see [`lua_chunk`] for a
    /// chunk that binds them.
    ///
    /// # Errors
    ///
    /// - [`ScriptError::ComplexLiteral`] for a literal with an imaginary part.
    /// - [`ScriptError::UnsupportedFunction`] for `cbrt`, `erf` and `gamma`.
    /// - [`ScriptError::NonFinite`] for an infinite or NaN literal built by hand.
    ///
    /// # Examples
    ///
    /// ```
    /// use symcalc::parser::parse;
    ///
    /// let lua = parse("2*sin(x)^2").unwrap().to_lua().unwrap();
    /// assert_eq!(lua, "(2*(math.sin(x)^2))");
    /// ```
    pub fn to_lua(&self) -> Result<String, ScriptError> {
        let mut out = String::new();
        self.write_lua(&mut out)?;
        Ok(out)
    }

    fn write_lua(&self, out: &mut String) -> Result<(), ScriptError> {
        match self {
            Self::Number(value) => {
                if !value.is_finite() {
                    return Err(ScriptError::NonFinite { value: value.to_string() });
                }
                if value.im != 0.0 {
                    return Err(ScriptError::ComplexLiteral { value: self.to_string() });
                }
                if value.re < 0.0 {
                    out.push_str(&format!("({})", value.re));
                } else {
                    out.push_str(&format!("{}", value.re));
                }
            },
            Self::Argument => out.push('x'),
            Self::Variable { name, .. } => out.push_str(name),
            Self::UnaryMinus(operand) => {
                out.push_str("(-");
                operand.write_lua(out)?;
                out.push(')');
            },
            Self::Binary { kind, left, right, .. } => {
                out.push('(');
                left.write_lua(out)?;
                out.push_str(kind.symbol());
                right.write_lua(out)?;
                out.push(')');
            },
            Self::Call { func, arg, .. } => {
                let a = arg.to_lua()?;
                out.push_str(&lua_call(*func, &a)?);
            },
        }
        Ok(())
    }

    /// Names of the variables the tree reads, in order of first use.
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Self::Variable { name, .. } => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            },
            Self::UnaryMinus(a) | Self::Call { arg: a, .. } => a.collect_variables(names),
            Self::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            },
            Self::Number(_) | Self::Argument => {},
        }
    }
}

/// Lua has no hyperbolic functions since 5.3, so they are spelled out with
/// `math.exp` and `math.log`.
fn lua_call(func: FunctionKind, a: &str) -> Result<String, ScriptError> {
    let code = match func {
        FunctionKind::Sin => format!("math.sin({})", a),
        FunctionKind::Cos => format!("math.cos({})", a),
        FunctionKind::Tan => format!("math.tan({})", a),
        FunctionKind::Arcsin => format!("math.asin({})", a),
        FunctionKind::Arccos => format!("math.acos({})", a),
        FunctionKind::Arctan => format!("math.atan({})", a),
        FunctionKind::Sinh => format!("((math.exp({a})-math.exp(-{a}))/2)", a = a),
        FunctionKind::Cosh => format!("((math.exp({a})+math.exp(-{a}))/2)", a = a),
        FunctionKind::Tanh => format!("((math.exp(2*{a})-1)/(math.exp(2*{a})+1))", a = a),
        FunctionKind::Arcsinh => format!("math.log({a}+math.sqrt({a}^2+1))", a = a),
        FunctionKind::Arccosh => format!("math.log({a}+math.sqrt({a}^2-1))", a = a),
        FunctionKind::Arctanh => format!("(0.5*math.log((1+{a})/(1-{a})))", a = a),
        FunctionKind::Sqrt => format!("math.sqrt({})", a),
        FunctionKind::Exp => format!("math.exp({})", a),
        FunctionKind::Ln | FunctionKind::Log => format!("math.log({})", a),
        FunctionKind::Log10 => format!("math.log({},10)", a),
        FunctionKind::Log2 => format!("math.log({},2)", a),
        FunctionKind::Cbrt | FunctionKind::Erf | FunctionKind::Gamma => {
            return Err(ScriptError::UnsupportedFunction { function: func });
        },
    };
    Ok(code)
}

/// Builds a Lua chunk returning `function(x)` for the tree.
///
/// Every variable the tree reads and `vars` defines is bound to a local
/// first. Names missing from `vars` are left as globals for the runtime to
/// provide.
///
/// # Errors
///
/// Same as [`Node::to_lua`]; a bound variable with an imaginary part is a
/// [`ScriptError::ComplexLiteral`].
pub fn lua_chunk(root: &Node, vars: &Vars) -> Result<String, ScriptError> {
    let body = root.to_lua()?;
    let mut chunk = String::new();
    for name in root.variables() {
        if let Some(value) = vars.get(&name) {
            if value.im != 0.0 {
                return Err(ScriptError::ComplexLiteral { value: format!("{}={}", name, value) });
            }
            chunk.push_str(&format!("local {} = {}\n", name, value.re));
        }
    }
    chunk.push_str(&format!("return function(x) return {} end\n", body));
    log::debug!("generated {} bytes of Lua", chunk.len());
    Ok(chunk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use num_complex::Complex;

    fn lua(input: &str) -> Result<String, ScriptError> {
        parse(input).unwrap().to_lua()
    }

    #[test]
    fn test_operators_are_parenthesized() {
        assert_eq!(lua("1+2*x").unwrap(), "(1+(2*x))");
        assert_eq!(lua("-x^2").unwrap(), "((-x)^2)");
        assert_eq!(lua("-(x^2)").unwrap(), "(-(x^2))");
        assert_eq!(lua("x-(-3)").unwrap(), "(x-(-3))");
        assert_eq!(lua("a/b").unwrap(), "(a/b)");
    }

    #[test]
    fn test_functions() {
        assert_eq!(lua("sin(x)").unwrap(), "math.sin(x)");
        assert_eq!(lua("arctan(x)").unwrap(), "math.atan(x)");
        assert_eq!(lua("ln(x)").unwrap(), "math.log(x)");
        assert_eq!(lua("log10(x)").unwrap(), "math.log(x,10)");
        assert_eq!(lua("log2(2x)").unwrap(), "math.log((2*x),2)");
        assert_eq!(lua("exp(x)").unwrap(), "(e^x)");
        assert_eq!(lua("sinh(x)").unwrap(), "((math.exp(x)-math.exp(-x))/2)");
        assert_eq!(
            Node::call(FunctionKind::Exp, Node::Argument).to_lua().unwrap(),
            "math.exp(x)"
        );
    }

    #[test]
    fn test_rejections() {
        assert_eq!(
            lua("x+2i").unwrap_err(),
            ScriptError::ComplexLiteral { value: "2i".into() }
        );
        for (input, function) in [
            ("cbrt(x)", FunctionKind::Cbrt),
            ("erf(x)", FunctionKind::Erf),
            ("1+gamma(x)", FunctionKind::Gamma),
        ] {
            assert_eq!(lua(input).unwrap_err(), ScriptError::UnsupportedFunction { function });
        }
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let tree = Node::Argument + Node::number(value);
            assert!(matches!(tree.to_lua(), Err(ScriptError::NonFinite { .. })));
        }
    }

    #[test]
    fn test_variables_in_order() {
        let tree = parse("b*x + a + b*pi").unwrap();
        assert_eq!(tree.variables(), vec!["b".to_string(), "a".to_string(), "pi".to_string()]);
    }

    #[test]
    fn test_chunk_binds_known_variables() {
        let mut vars = Vars::new();
        vars.set("a", 2.5);
        let chunk = lua_chunk(&parse("a*x+pi+k").unwrap(), &vars).unwrap();
        assert_eq!(
            chunk,
            format!(
                "local a = 2.5\nlocal pi = {}\nreturn function(x) return (((a*x)+pi)+k) end\n",
                std::f64::consts::PI
            )
        );

        vars.set("a", Complex::new(0.0, 1.0));
        assert!(lua_chunk(&parse("a*x").unwrap(), &vars).is_err());
    }
}
