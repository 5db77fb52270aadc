//! Rule application engine.
//!
//! Implements the bottom-up traversal behind `InnerSimplify` (children first,
//! then the node, rewriting it until no rule of the set fires) and the single
//! pass used by the search to produce alternative forms.

use log::{trace, warn};
use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::rules::algebraic::expansion::within_term_budget;
use super::rules::{RuleCategory, RuleContext, RuleRegistry, RuleSet};
use crate::core::cancellation;
use crate::core::error::MathError;
use crate::core::expr::Expr;
use crate::core::settings::Settings;

/// Upper bound on whole-tree passes of `expand` and `collapse`.
const MAX_PASSES: usize = 64;

/// How a node is treated once its children are done.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
    /// Rewrite until no rule fires, re-simplifying each replacement.
    Fixpoint,
    /// At most one rewrite per node.
    Once,
}

/// Applies one rule set to a tree.
///
/// A `Simplifier` lives for one call: the memo maps already visited subtrees
/// to their result and the rewrite budget is shared by the whole tree.
pub(crate) struct Simplifier {
    set: RuleSet,
    mode: Mode,
    context: RuleContext,
    budget: usize,
    exhausted: bool,
    memo: FxHashMap<Arc<Expr>, Arc<Expr>>,
}

impl Simplifier {
    pub(crate) fn new(set: RuleSet, settings: Settings) -> Self {
        Self {
            set,
            mode: Mode::Fixpoint,
            context: RuleContext::new(settings),
            budget: settings.max_rewrite_iterations,
            exhausted: false,
            memo: FxHashMap::default(),
        }
    }

    /// Rewrite each node at most once instead of running to a fixpoint.
    pub(crate) fn single_pass(mut self) -> Self {
        self.mode = Mode::Once;
        self
    }

    /// Whether the rewrite budget ran out; the result is then partial.
    pub(crate) const fn exhausted(&self) -> bool {
        self.exhausted
    }

    pub(crate) fn run(&mut self, expr: &Arc<Expr>) -> Result<Arc<Expr>, MathError> {
        self.simplify_node(expr, 0)
    }

    fn simplify_node(&mut self, expr: &Arc<Expr>, depth: usize) -> Result<Arc<Expr>, MathError> {
        if let Some(done) = self.memo.get(expr) {
            return Ok(Arc::clone(done));
        }
        cancellation::check()?;

        let rebuilt = self.simplify_children(expr, depth)?;
        let result = match self.mode {
            Mode::Fixpoint => self.rewrite_to_fixpoint(rebuilt, depth)?,
            Mode::Once => match self.rewrite(&rebuilt, depth)? {
                Some(next) => Arc::new(next),
                None => rebuilt,
            },
        };

        self.memo.insert(Arc::clone(expr), Arc::clone(&result));
        if self.mode == Mode::Fixpoint && !self.exhausted {
            self.memo.insert(Arc::clone(&result), Arc::clone(&result));
        }
        Ok(result)
    }

    fn simplify_children(&mut self, expr: &Arc<Expr>, depth: usize) -> Result<Arc<Expr>, MathError> {
        Ok(match expr.map_children(|child| self.simplify_node(child, depth + 1))? {
            Some(rebuilt) => Arc::new(rebuilt),
            None => Arc::clone(expr),
        })
    }

    fn rewrite_to_fixpoint(&mut self, mut current: Arc<Expr>, depth: usize) -> Result<Arc<Expr>, MathError> {
        while let Some(next) = self.rewrite(&current, depth)? {
            // the replacement may contain unsimplified subtrees
            current = self.simplify_children(&Arc::new(next), depth)?;
        }
        Ok(current)
    }

    /// Apply the first firing rule of the set, spending one unit of budget.
    fn rewrite(&mut self, current: &Arc<Expr>, depth: usize) -> Result<Option<Expr>, MathError> {
        if self.exhausted {
            return Ok(None);
        }
        let context = self.context.with_depth(depth);
        let rules = RuleRegistry::global().rules_for(self.set, current.tag());

        for rule in rules {
            let Some(next) = rule.apply(current, &context) else {
                continue;
            };
            if next == **current {
                continue;
            }
            cancellation::check()?;
            if self.budget == 0 {
                self.exhausted = true;
                warn!(
                    "rewrite budget of {} exhausted, returning a partially simplified tree",
                    self.context.settings.max_rewrite_iterations
                );
                return Ok(None);
            }
            self.budget -= 1;
            trace!("{}: {} => {}", rule.name(), current, next);
            return Ok(Some(next));
        }
        Ok(None)
    }
}

/// Run the inner rule set to a fixpoint.
pub(crate) fn inner_simplify(expr: &Arc<Expr>) -> Result<Arc<Expr>, MathError> {
    Simplifier::new(RuleSet::Inner, Settings::current()).run(expr)
}

/// One bottom-up pass of a search-only category, normalized afterwards.
pub(crate) fn apply_once(category: RuleCategory, expr: &Arc<Expr>) -> Result<Arc<Expr>, MathError> {
    let rewritten = Simplifier::new(category.rule_set(), Settings::current())
        .single_pass()
        .run(expr)?;
    if Arc::ptr_eq(&rewritten, expr) {
        return Ok(rewritten);
    }
    inner_simplify(&rewritten)
}

/// Multiply out products and integer powers of sums, collecting like terms.
///
/// Stops before the number of terms exceeds `max_expansion_term_count`,
/// returning the last form within the limit.
pub(crate) fn expand(expr: &Arc<Expr>) -> Result<Arc<Expr>, MathError> {
    let settings = Settings::current();
    let mut current = inner_simplify(expr)?;
    for _ in 0..MAX_PASSES {
        let expanded = apply_once(RuleCategory::Expansion, &current)?;
        let collected = apply_once(RuleCategory::Collection, &expanded)?;
        if !within_term_budget(&collected, settings.max_expansion_term_count) {
            warn!(
                "expansion stopped at {} terms",
                settings.max_expansion_term_count
            );
            break;
        }
        if collected == current {
            break;
        }
        current = collected;
    }
    Ok(current)
}

/// Fold an expanded form back: fractions are combined, logarithms merged,
/// like terms collected and common factors pulled out.
pub(crate) fn collapse(expr: &Arc<Expr>) -> Result<Arc<Expr>, MathError> {
    const PASSES: [RuleCategory; 4] = [
        RuleCategory::Fractions,
        RuleCategory::LogarithmCollapse,
        RuleCategory::Collection,
        RuleCategory::Factoring,
    ];
    let mut current = inner_simplify(expr)?;
    for _ in 0..MAX_PASSES {
        let mut next = Arc::clone(&current);
        for category in PASSES {
            next = apply_once(category, &next)?;
        }
        if next == current {
            break;
        }
        current = next;
    }
    Ok(current)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use super::*;
    use crate::{CancellationToken, var, with_settings};

    #[test]
    fn test_children_before_parent() {
        // (x*1)^(2-1) needs both children simplified before pow_one applies
        let e = Arc::new(Expr::pow(Expr::mul(var("x"), 1), Expr::minus(2, 1)));
        assert_eq!(*inner_simplify(&e).unwrap(), var("x"));
    }

    #[test]
    fn test_budget_exhaustion_returns_partial_result() {
        let mut e = var("x");
        for _ in 0..20 {
            e = Expr::mul(e, 1);
        }
        let e = Arc::new(e);
        let settings = Settings::default().with_max_rewrite_iterations(5);
        let mut simplifier = Simplifier::new(RuleSet::Inner, settings);
        let partial = simplifier.run(&e).unwrap();
        assert!(simplifier.exhausted());
        assert!(partial.complexity() < e.complexity());
        assert_ne!(*partial, var("x"));
    }

    #[test]
    fn test_single_pass_rewrites_each_node_once() {
        // the replacement is not revisited by the inner set
        let x = var("x");
        let e = Arc::new(Expr::tan(x.clone()));
        let once = Simplifier::new(RuleSet::Search(RuleCategory::TrigonometricExpansion), Settings::default())
            .single_pass()
            .run(&e)
            .unwrap();
        assert_eq!(*once, Expr::div(Expr::sin(x.clone()), Expr::cos(x)));
    }

    #[test]
    fn test_cancelled_simplification() {
        let token = CancellationToken::new();
        token.cancel();
        let _guard = token.install();
        let e = Arc::new(Expr::sum(var("x"), 0));
        assert_eq!(inner_simplify(&e), Err(MathError::Cancelled));
    }

    #[test]
    fn test_expand_is_bounded() {
        let e = Arc::new(Expr::pow(Expr::sum(var("a"), var("b")), 3));
        let settings = Settings::default().with_max_expansion_term_count(3);
        let bounded = with_settings(settings, || expand(&e)).unwrap();
        assert_eq!(bounded, e);
    }
}
