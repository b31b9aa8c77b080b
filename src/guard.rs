use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SLOT: AtomicU64 = AtomicU64::new(0);

thread_local! {
    // Slots of guards currently entered on this thread.
    static ACTIVE: RefCell<HashSet<u64>> = RefCell::new(HashSet::new());
}

/// Per-thread single-flight gate for one appender instance.
///
/// A guard never blocks and never synchronizes across threads; its only job
/// is to detect that the current thread is already inside the wrapped
/// processing step, so an appender that logs from its own append path cannot
/// recurse forever. Each instance gets its own slot, so two appenders on the
/// same thread do not gate each other.
#[derive(Debug)]
pub struct ReentrancyGuard {
    slot: u64,
}

impl ReentrancyGuard {
    pub fn new() -> Self {
        ReentrancyGuard {
            slot: NEXT_SLOT.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Try to enter the guarded section on the current thread.
    ///
    /// Returns `None` when this thread is already inside — the caller must
    /// treat the call as a no-op and drop the event. On `Some`, the section
    /// stays entered until the token is dropped, which happens on every exit
    /// path including unwinds.
    pub fn enter(&self) -> Option<GuardToken> {
        let entered = ACTIVE.with(|active| active.borrow_mut().insert(self.slot));
        entered.then(|| GuardToken { slot: self.slot })
    }
}

impl Default for ReentrancyGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof of a successful [`ReentrancyGuard::enter`]; releases on drop.
#[derive(Debug)]
pub struct GuardToken {
    slot: u64,
}

impl Drop for GuardToken {
    fn drop(&mut self) {
        // try_with: the thread-local may already be gone during thread
        // teardown, and Drop must not panic.
        let _ = ACTIVE.try_with(|active| {
            active.borrow_mut().remove(&self.slot);
        });
    }
}
