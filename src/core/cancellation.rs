//! Cooperative cancellation.
//!
//! A [`CancellationToken`] is installed on the current thread with
//! [`CancellationToken::install`]. Long-running operations poll [`check`] and
//! unwind with [`MathError::Cancelled`] once the token is triggered, from any
//! thread holding a clone of it.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::error::MathError;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every operation observing this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Observe this token on the current thread until the guard is dropped.
    #[must_use = "the token is uninstalled as soon as the guard is dropped"]
    pub fn install(&self) -> CancellationGuard {
        let previous = ACTIVE.with(|active| active.borrow_mut().replace(self.clone()));
        CancellationGuard {
            previous,
            _not_send: PhantomData,
        }
    }
}

thread_local! {
    static ACTIVE: RefCell<Option<CancellationToken>> = const { RefCell::new(None) };
}

/// Reinstalls the previously active token (if any) when dropped.
#[derive(Debug)]
pub struct CancellationGuard {
    previous: Option<CancellationToken>,
    _not_send: PhantomData<*const ()>,
}

impl Drop for CancellationGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE.with(|active| *active.borrow_mut() = previous);
    }
}

/// The token observed by the current thread, if any.
#[cfg_attr(not(feature = "parallel"), allow(dead_code))]
pub(crate) fn current() -> Option<CancellationToken> {
    ACTIVE.with(|active| active.borrow().clone())
}

/// Fail with [`MathError::Cancelled`] if the current thread's token was triggered.
pub(crate) fn check() -> Result<(), MathError> {
    let cancelled = ACTIVE.with(|active| {
        active
            .borrow()
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    });
    if cancelled {
        Err(MathError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_without_token() {
        assert_eq!(check(), Ok(()));
    }

    #[test]
    fn test_cancel_is_observed_and_uninstalled() {
        let token = CancellationToken::new();
        {
            let _guard = token.install();
            assert_eq!(check(), Ok(()));
            token.clone().cancel();
            assert_eq!(check(), Err(MathError::Cancelled));
        }
        assert_eq!(check(), Ok(()));
    }

    #[test]
    fn test_nested_install_restores_previous() {
        let outer = CancellationToken::new();
        let inner = CancellationToken::new();
        outer.cancel();
        let _outer_guard = outer.install();
        {
            let _inner_guard = inner.install();
            assert_eq!(check(), Ok(()));
        }
        assert_eq!(check(), Err(MathError::Cancelled));
    }
}
