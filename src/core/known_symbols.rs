//! Named symbols and the built-in mathematical constants.
//!
//! A [`Variable`] is a cheap-to-clone shared name. The names in [`CONSTANTS`]
//! denote fixed values: they are never treated as free parameters by the
//! compiler and they evaluate to their numeric value.

use std::fmt;
use std::sync::Arc;

use crate::core::expr::Expr;

/// Built-in constants and their values.
pub const CONSTANTS: &[(&str, f64)] = &[("pi", std::f64::consts::PI), ("e", std::f64::consts::E)];

/// A named symbol.
///
/// Ordering is lexicographic by name, which keeps symbol sets deterministic.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(Arc<str>);

impl Variable {
    /// Create a symbol with the given name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The `pi` constant.
    pub fn pi() -> Self {
        Self::new("pi")
    }

    /// The `e` constant.
    pub fn e() -> Self {
        Self::new("e")
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether this symbol is one of the built-in constants.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.constant_value().is_some()
    }

    /// Numeric value of a built-in constant, `None` for free symbols.
    pub fn constant_value(&self) -> Option<f64> {
        CONSTANTS
            .iter()
            .find(|(name, _)| *name == self.name())
            .map(|&(_, value)| value)
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variable({})", self.0)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Variable {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Variable {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&Variable> for Variable {
    fn from(var: &Variable) -> Self {
        var.clone()
    }
}

/// Create a variable expression.
///
/// # Example
/// ```
/// use symb_engine::var;
///
/// let x = var("x");
/// assert_eq!(x.to_string(), "x");
/// ```
pub fn var(name: &str) -> Expr {
    Expr::variable(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_are_recognised() {
        assert!(Variable::pi().is_constant());
        assert!(Variable::e().is_constant());
        assert!(!Variable::new("x").is_constant());
        assert_eq!(Variable::pi().constant_value(), Some(std::f64::consts::PI));
    }

    #[test]
    fn test_ordering_is_by_name() {
        let mut vars = vec![Variable::new("y"), Variable::new("a"), Variable::new("x")];
        vars.sort();
        let names: Vec<_> = vars.iter().map(Variable::name).collect();
        assert_eq!(names, ["a", "x", "y"]);
    }
}
