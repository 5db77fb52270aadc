//! Property-based tests over random expression trees.
//!
//! Uses quickcheck for:
//! - InnerSimplify idempotence and value preservation
//! - Compiled evaluation against tree evaluation, with and without CSE
//! - CSE slot count against a naive count of repeated subtrees
//! - Structural equality and hashing

#![allow(clippy::unwrap_used, clippy::float_cmp, reason = "Standard test relaxations")]

use quickcheck::{Arbitrary, Gen, QuickCheck, TestResult};
use std::hash::{BuildHasher, BuildHasherDefault};

use rustc_hash::{FxHashMap, FxHasher};

use crate::{CompileOptions, Complex64, Expr, var};

// ============================================================
// PART 1: EXPRESSION GENERATORS
// ============================================================

/// Random tree over `x`, `y` and small exact constants.
#[derive(Debug, Clone)]
struct ArbExpr(Expr);

impl Arbitrary for ArbExpr {
    fn arbitrary(g: &mut Gen) -> Self {
        let depth = g.size().min(4);
        Self(gen_expr(g, depth))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let children: Vec<Self> = self.0.children().into_iter().map(|c| Self((**c).clone())).collect();
        Box::new(children.into_iter())
    }
}

fn gen_leaf(g: &mut Gen) -> Expr {
    match u8::arbitrary(g) % 6 {
        0 | 1 => var("x"),
        2 => var("y"),
        3 => Expr::integer(i64::from(u8::arbitrary(g) % 5) + 1),
        4 => Expr::rational(1, i64::from(u8::arbitrary(g) % 4) + 2),
        _ => Expr::integer(-i64::from(u8::arbitrary(g) % 3) - 1),
    }
}

fn gen_expr(g: &mut Gen, depth: usize) -> Expr {
    if depth == 0 {
        return gen_leaf(g);
    }
    let sub = |g: &mut Gen| gen_expr(g, depth - 1);
    match u8::arbitrary(g) % 12 {
        0 | 1 => Expr::sum(sub(g), sub(g)),
        2 => Expr::minus(sub(g), sub(g)),
        3 | 4 => Expr::mul(sub(g), sub(g)),
        5 => Expr::div(sub(g), sub(g)),
        6 => {
            let exponent = [2, 3, -1][usize::from(u8::arbitrary(g)) % 3];
            Expr::pow(sub(g), exponent)
        }
        7 => Expr::sin(sub(g)),
        8 => Expr::cos(sub(g)),
        9 => Expr::ln(Expr::sum(Expr::abs(sub(g)), 1)),
        10 => Expr::arctan(sub(g)),
        _ => gen_leaf(g),
    }
}

/// Value of `expr` at `(x, y)`, `None` when it is undefined there.
fn value_at(expr: &Expr, x: f64, y: f64) -> Option<Complex64> {
    let z = expr.substitute("x", x).substitute("y", y).eval().ok()?.to_complex64();
    (z.re.is_finite() && z.im.is_finite()).then_some(z)
}

fn close(a: Complex64, b: Complex64) -> bool {
    (a - b).norm() <= 1e-6 * a.norm().max(b.norm()).max(1.0)
}

/// Sample point in [0.25, 2.25).
fn point(seed: u8) -> f64 {
    0.25 + f64::from(seed) / 128.0
}

// ============================================================
// PART 2: SIMPLIFICATION PROPERTIES
// ============================================================

#[test]
fn test_inner_simplify_is_idempotent() {
    fn prop(e: ArbExpr) -> bool {
        let once = e.0.inner_simplify();
        once.inner_simplify() == once
    }
    QuickCheck::new().tests(300).quickcheck(prop as fn(ArbExpr) -> bool);
}

#[test]
fn test_inner_simplify_preserves_value() {
    fn prop(e: ArbExpr, xs: u8, ys: u8) -> TestResult {
        let (x, y) = (point(xs), point(ys));
        let Some(before) = value_at(&e.0, x, y) else {
            return TestResult::discard();
        };
        match value_at(&e.0.inner_simplify(), x, y) {
            Some(after) => TestResult::from_bool(close(before, after)),
            None => TestResult::failed(),
        }
    }
    QuickCheck::new().tests(300).quickcheck(prop as fn(ArbExpr, u8, u8) -> TestResult);
}

// ============================================================
// PART 3: COMPILER PROPERTIES
// ============================================================

#[test]
fn test_compiled_matches_eval() {
    fn prop(e: ArbExpr, xs: u8, ys: u8) -> TestResult {
        let (x, y) = (point(xs), point(ys));
        let Some(expected) = value_at(&e.0, x, y) else {
            return TestResult::discard();
        };
        let f = e.0.compile(&["x", "y"]).unwrap();
        let got = f.call(&[Complex64::new(x, 0.0), Complex64::new(y, 0.0)]).unwrap();
        TestResult::from_bool(close(expected, got))
    }
    QuickCheck::new().tests(300).quickcheck(prop as fn(ArbExpr, u8, u8) -> TestResult);
}

#[test]
fn test_cse_does_not_change_results() {
    fn prop(e: ArbExpr, xs: u8) -> TestResult {
        // duplicate the tree so there is always something to share
        let doubled = Expr::mul(e.0.clone(), Expr::sum(e.0, var("y")));
        let args = [Complex64::new(point(xs), 0.0), Complex64::new(0.5, 0.0)];
        let with = doubled.compile(&["x", "y"]).unwrap();
        let without = doubled.compile_with(&["x", "y"], CompileOptions::default().with_cse(false)).unwrap();
        if !doubled.children()[0].is_leaf() && with.cache_size() == 0 {
            return TestResult::failed();
        }
        let (a, b) = (with.call(&args).unwrap(), without.call(&args).unwrap());
        if !(a.re.is_finite() && a.im.is_finite()) {
            return TestResult::discard();
        }
        TestResult::from_bool(a == b)
    }
    QuickCheck::new().tests(300).quickcheck(prop as fn(ArbExpr, u8) -> TestResult);
}

/// Distinct non-leaf subtrees occurring more than once, counted naively.
fn repeated_subtrees(e: &Expr) -> usize {
    let mut counts: FxHashMap<&Expr, usize> = FxHashMap::default();
    for node in e.nodes().filter(|n| !n.is_leaf()) {
        *counts.entry(node).or_default() += 1;
    }
    counts.values().filter(|&&n| n > 1).count()
}

#[test]
fn test_cse_slot_count_matches_repeated_subtrees() {
    fn prop(a: ArbExpr, b: ArbExpr) -> bool {
        let e = Expr::sum(Expr::mul(a.0.clone(), b.0.clone()), Expr::minus(b.0, a.0));
        let f = e.compile(&["x", "y"]).unwrap();
        f.cache_size() == repeated_subtrees(&e)
    }
    QuickCheck::new().tests(300).quickcheck(prop as fn(ArbExpr, ArbExpr) -> bool);
}

// ============================================================
// PART 4: STRUCTURAL EQUALITY
// ============================================================

fn fx_hash(e: &Expr) -> u64 {
    BuildHasherDefault::<FxHasher>::default().hash_one(e)
}

#[test]
fn test_equality_is_structural() {
    fn prop(a: ArbExpr, b: ArbExpr) -> bool {
        let (a, b) = (a.0, b.0);
        let rebuilt = a.with_children(a.children().into_iter().map(|c| (**c).clone()).collect()).unwrap();
        let copy = a.clone();
        let reflexive = copy == a && a == rebuilt && fx_hash(&a) == fx_hash(&rebuilt);
        let symmetric = (a == b) == (b == a);
        let hash_consistent = a != b || fx_hash(&a) == fx_hash(&b);
        reflexive && symmetric && hash_consistent
    }
    QuickCheck::new().tests(300).quickcheck(prop as fn(ArbExpr, ArbExpr) -> bool);
}

#[test]
fn test_equality_is_transitive() {
    fn prop(a: ArbExpr) -> bool {
        let b = a.0.replace(|_| None);
        let c = b.substitute("unused", 7);
        !(a.0 == b && b == c) || a.0 == c
    }
    QuickCheck::new().tests(200).quickcheck(prop as fn(ArbExpr) -> bool);
}
