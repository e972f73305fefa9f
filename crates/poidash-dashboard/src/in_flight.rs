//! Double-submit protection for operator-triggered requests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared "request in flight" flag backing a trigger control.
///
/// Clones share the same flag, so a UI control and the task it spawns can
/// both observe it.
#[derive(Debug, Clone, Default)]
pub struct InFlightFlag(Arc<AtomicBool>);

impl InFlightFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the flag busy and returns a guard, or `None` if another
    /// request already holds it.
    #[must_use]
    pub fn try_begin(&self) -> Option<InFlightGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(Arc::clone(&self.0)))
    }

    /// Whether the trigger control should currently be disabled.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases its [`InFlightFlag`] when dropped, whichever way the request
/// finished.
#[derive(Debug)]
pub struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
