//! Ambient settings and cancellation seen through the public operations.

#![allow(clippy::unwrap_used, clippy::float_cmp, reason = "Standard test relaxations")]

use std::thread;

use crate::{CancellationToken, Expr, MathError, Settings, var, with_settings};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `x * 1 * 1 * ... * 1`
fn unit_chain(len: usize) -> Expr {
    (0..len).fold(var("x"), |acc, _| Expr::mul(acc, 1))
}

#[test]
fn test_rewrite_budget_limits_work_not_correctness() {
    init_logging();
    let e = unit_chain(30);
    let partial = with_settings(Settings::default().with_max_rewrite_iterations(3), || e.inner_simplify());
    assert_ne!(partial, var("x"));
    assert!(partial.complexity() < e.complexity());
    assert_eq!(e.inner_simplify(), var("x"));
}

#[test]
fn test_simplify_level_zero_skips_search() {
    // x^-2 only becomes 1/x^2 in the search
    let e = Expr::pow(var("x"), -2);
    let flat = with_settings(Settings::default().with_simplify_level(0), || e.simplify());
    assert_eq!(flat, e.inner_simplify());
    assert_eq!(e.simplify(), Expr::div(1, Expr::pow(var("x"), 2)));
}

#[test]
fn test_expansion_respects_term_limit() {
    let e = Expr::pow(Expr::sum(var("a"), var("b")), 3);
    let limited = with_settings(Settings::default().with_max_expansion_term_count(3), || e.expand());
    assert_eq!(limited, e.inner_simplify());
    assert_ne!(e.expand(), e.inner_simplify());
}

#[test]
fn test_cancellation_from_another_thread() {
    init_logging();
    let token = CancellationToken::new();
    let remote = token.clone();
    thread::spawn(move || remote.cancel()).join().unwrap();

    let _guard = token.install();
    let e = Expr::sum(Expr::pow(Expr::sin(var("x")), 2), Expr::pow(Expr::cos(var("x")), 2));
    assert_eq!(e.try_simplify(), Err(MathError::Cancelled));
    assert_eq!(e.differentiate("x"), Err(MathError::Cancelled));
    // compilation does not observe the token
    assert!(e.compile(&["x"]).is_ok());
}

#[test]
fn test_threads_do_not_share_overrides() {
    let _guard = Settings::default().with_simplify_level(0).scoped();
    let e = Expr::pow(var("x"), -2);
    let other = thread::spawn(move || e.simplify()).join().unwrap();
    assert_eq!(other, Expr::div(1, Expr::pow(var("x"), 2)));
    assert_eq!(Settings::current().simplify_level, 0);
}
