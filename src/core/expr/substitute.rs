//! Substitution and bottom-up replacement.
//!
//! All helpers here share every subtree they leave untouched.

use rustc_hash::FxHashMap;
use std::convert::Infallible;
use std::sync::Arc;

use super::{Expr, ExprKind};
use crate::core::known_symbols::Variable;

impl Expr {
    /// Replace every occurrence of `var` by `value`, without simplifying.
    ///
    /// # Example
    /// ```
    /// use symb_engine::{Expr, var};
    ///
    /// let e = Expr::pow(var("x"), 2).substitute("x", Expr::sum(var("y"), 1));
    /// assert_eq!(e.to_string(), "(y + 1) ^ 2");
    /// ```
    #[must_use]
    pub fn substitute(&self, var: impl Into<Variable>, value: impl Into<Expr>) -> Self {
        let mut bindings = FxHashMap::default();
        bindings.insert(var.into(), value.into());
        self.substitute_all(&bindings)
    }

    /// Replace several variables at once.
    #[must_use]
    pub fn substitute_all(&self, bindings: &FxHashMap<Variable, Expr>) -> Self {
        let bindings: FxHashMap<&Variable, Arc<Expr>> = bindings
            .iter()
            .map(|(var, value)| (var, Arc::new(value.clone())))
            .collect();
        let root = Arc::new(self.clone());
        Self::unshare(substitute_node(&root, &bindings))
    }

    /// Rewrite bottom-up: children first, then `f` on the rebuilt node.
    ///
    /// `f` returns `None` to keep a node as it is.
    #[must_use]
    pub fn replace(&self, mut f: impl FnMut(&Expr) -> Option<Expr>) -> Self {
        let root = Arc::new(self.clone());
        let replaced: Result<_, Infallible> = replace_node(&root, &mut f);
        match replaced {
            Ok(node) => Self::unshare(node),
            Err(never) => match never {},
        }
    }

    /// Replace every subtree structurally equal to `from` by `to`.
    #[must_use]
    pub fn replace_subtree(&self, from: &Expr, to: &Expr) -> Self {
        self.replace(|node| (node == from).then(|| to.clone()))
    }
}

fn substitute_node(node: &Arc<Expr>, bindings: &FxHashMap<&Variable, Arc<Expr>>) -> Arc<Expr> {
    if let ExprKind::Variable(v) = &node.kind {
        return bindings.get(v).map_or_else(|| Arc::clone(node), Arc::clone);
    }
    if !bindings.keys().any(|v| node.contains_variable(v)) {
        return Arc::clone(node);
    }
    let mapped: Result<_, Infallible> = node.map_children(|child| Ok(substitute_node(child, bindings)));
    match mapped {
        Ok(Some(rebuilt)) => Arc::new(rebuilt),
        Ok(None) => Arc::clone(node),
        Err(never) => match never {},
    }
}

fn replace_node<E>(
    node: &Arc<Expr>,
    f: &mut impl FnMut(&Expr) -> Option<Expr>,
) -> Result<Arc<Expr>, E> {
    let rebuilt = match node.map_children(|child| replace_node(child, f))? {
        Some(new) => Arc::new(new),
        None => Arc::clone(node),
    };
    Ok(match f(&rebuilt) {
        Some(replacement) => Arc::new(replacement),
        None => rebuilt,
    })
}

#[cfg(test)]
mod tests {
    use crate::{Expr, Variable, var};
    use rustc_hash::FxHashMap;

    #[test]
    fn test_substitute_all() {
        let e = Expr::sum(Expr::mul(var("x"), var("y")), var("x"));
        let mut map = FxHashMap::default();
        map.insert(Variable::new("x"), Expr::integer(2));
        map.insert(Variable::new("y"), var("z"));
        let result = e.substitute_all(&map);
        assert_eq!(result, Expr::sum(Expr::mul(2, var("z")), 2));
    }

    #[test]
    fn test_substitute_leaves_other_variables() {
        let e = Expr::sin(var("y"));
        assert_eq!(e.substitute("x", 1), e);
    }

    #[test]
    fn test_calculus_metadata_is_kept() {
        let e = Expr::derivative(Expr::mul(var("a"), var("x")), "x", 1);
        let result = e.substitute("a", 3);
        assert_eq!(result, Expr::derivative(Expr::mul(3, var("x")), "x", 1));
    }

    #[test]
    fn test_replace_subtree() {
        let s = Expr::sin(var("x"));
        let e = Expr::sum(Expr::pow(s.clone(), 2), s.clone());
        let t = var("t");
        assert_eq!(e.replace_subtree(&s, &t), Expr::sum(Expr::pow(t.clone(), 2), t));
    }
}
