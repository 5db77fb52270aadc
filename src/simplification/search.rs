//! Breadth-limited search over alternative forms.
//!
//! Every round rewrites each frontier candidate with the search-only rule
//! categories, normalizes the results with the inner rule set and keeps the
//! ones not seen before. The answer is the candidate with the lowest
//! simplified rate, the earliest one on ties.

use log::debug;
use rustc_hash::FxHashSet;
use std::sync::Arc;

use super::engine::{apply_once, inner_simplify};
use super::rules::RuleCategory;
use crate::core::cancellation;
use crate::core::error::MathError;
use crate::core::expr::{Expr, ExprKind};
use crate::core::settings::Settings;

/// Candidates carried from one round to the next.
const MAX_FRONTIER: usize = 16;

/// Every candidate seen so far, in discovery order.
struct History {
    seen: FxHashSet<Arc<Expr>>,
    best: Arc<Expr>,
    best_rate: f64,
}

impl History {
    fn new(start: Arc<Expr>) -> Self {
        let best_rate = start.simplified_rate();
        let mut seen = FxHashSet::default();
        seen.insert(Arc::clone(&start));
        Self {
            seen,
            best: start,
            best_rate,
        }
    }

    /// Record a candidate; false if it was already known.
    fn push(&mut self, candidate: &Arc<Expr>) -> bool {
        if !self.seen.insert(Arc::clone(candidate)) {
            return false;
        }
        let rate = candidate.simplified_rate();
        if rate < self.best_rate {
            self.best_rate = rate;
            self.best = Arc::clone(candidate);
        }
        true
    }
}

fn contains_trigonometry(expr: &Expr) -> bool {
    expr.nodes()
        .any(|node| matches!(&node.kind, ExprKind::Unary(func, _) if func.is_trigonometric()))
}

/// Alternative forms of one candidate, already normalized.
fn alternatives(candidate: &Arc<Expr>) -> Result<Vec<Arc<Expr>>, MathError> {
    let mut out = Vec::with_capacity(9);
    for category in [
        RuleCategory::NegativePowers,
        RuleCategory::Fractions,
        RuleCategory::LogarithmCollapse,
        RuleCategory::Collection,
        RuleCategory::Factoring,
    ] {
        out.push(apply_once(category, candidate)?);
    }
    if contains_trigonometry(candidate) {
        out.push(apply_once(RuleCategory::Trigonometric, candidate)?);
        out.push(apply_once(RuleCategory::TrigonometricExpansion, candidate)?);
    }
    let expanded = apply_once(RuleCategory::Expansion, candidate)?;
    out.push(apply_once(RuleCategory::Collection, &expanded)?);
    out.push(expanded);
    Ok(out)
}

/// Search for the form with the lowest simplified rate.
///
/// Runs `simplify_level` rounds starting from the inner-simplified tree.
pub(crate) fn simplify(expr: &Arc<Expr>) -> Result<Arc<Expr>, MathError> {
    let settings = Settings::current();
    let start = inner_simplify(expr)?;
    let mut history = History::new(Arc::clone(&start));
    let mut frontier = vec![start];

    for round in 0..settings.simplify_level {
        let mut next = Vec::new();
        for candidate in &frontier {
            cancellation::check()?;
            for alternative in alternatives(candidate)? {
                if history.push(&alternative) {
                    next.push(alternative);
                }
            }
        }
        debug!(
            "simplify round {round}: {} new candidates, best rate {}",
            next.len(),
            history.best_rate
        );
        if next.is_empty() {
            break;
        }
        next.sort_by(|a, b| a.simplified_rate().total_cmp(&b.simplified_rate()));
        next.truncate(MAX_FRONTIER);
        frontier = next;
    }

    Ok(history.best)
}
