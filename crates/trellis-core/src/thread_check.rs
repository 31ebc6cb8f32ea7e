//! Owner-thread checks for single-threaded state.
//!
//! A sectioned model is mutated and drained from the thread that runs its
//! idle loop. The model records that thread in a [`ThreadAffinity`] when it is
//! created and calls [`ThreadAffinity::check`] at each entry point.
//!
//! Checks are on by default in debug builds only. Tests that deliberately
//! hand a model to another thread can turn them off with
//! [`set_thread_checks_enabled`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};

static CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Turn owner-thread checks on or off for the whole process.
pub fn set_thread_checks_enabled(enabled: bool) {
    CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
    crate::trellis_trace!(enabled, "thread checks toggled");
}

/// Whether owner-thread checks currently run.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// The thread that owns a piece of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl ThreadAffinity {
    /// Bind to the calling thread.
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    /// The owning thread.
    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Whether the calling thread is the owner.
    #[inline]
    pub fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Panic with `context` if checks are enabled and the calling thread is
    /// not the owner.
    #[inline]
    pub fn check(&self, context: &str) {
        if are_thread_checks_enabled() && !self.is_owner() {
            self.violation(context);
        }
    }

    #[cold]
    #[inline(never)]
    fn violation(&self, context: &str) -> ! {
        let caller = thread::current();
        panic!(
            "{context}: owned by thread {:?}, called from {:?} ({})",
            self.owner,
            caller.id(),
            caller.name().unwrap_or("<unnamed>"),
        )
    }
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}
