//! Observer notifications.
//!
//! [`Signal<Args>`] is a list of handlers called with a shared reference to
//! each emitted value. Handlers run synchronously on the emitting thread, in
//! the order they were connected.
//!
//! Models use signals for observers other than their single delegate, such
//! as a status label that follows a model's emptiness:
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use trellis_core::Signal;
//!
//! let is_empty_changed = Signal::<bool>::new();
//! let placeholder_visible = Arc::new(AtomicBool::new(true));
//!
//! let visible = placeholder_visible.clone();
//! let id = is_empty_changed.connect(move |&empty| visible.store(empty, Ordering::SeqCst));
//!
//! is_empty_changed.emit(false);
//! assert!(!placeholder_visible.load(Ordering::SeqCst));
//! assert!(is_empty_changed.disconnect(id));
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifies one handler connected to a [`Signal`].
    pub struct ConnectionId;
}

type Handler<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

struct Handlers<Args> {
    slots: SlotMap<ConnectionId, Handler<Args>>,
    blocked: bool,
}

/// A list of handlers notified on every emission.
///
/// Emission clones the handler list before calling anything, so a handler
/// may connect, disconnect or emit on the signal it is running for.
pub struct Signal<Args> {
    handlers: Mutex<Handlers<Args>>,
}

impl<Args: 'static> Signal<Args> {
    /// Create a signal with no handlers.
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Handlers {
                slots: SlotMap::with_key(),
                blocked: false,
            }),
        }
    }

    /// Add a handler. The returned id disconnects it again.
    pub fn connect<F>(&self, handler: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.handlers.lock().slots.insert(Arc::new(handler))
    }

    /// Remove a handler. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.handlers.lock().slots.remove(id).is_some()
    }

    /// Remove every handler.
    pub fn disconnect_all(&self) {
        self.handlers.lock().slots.clear();
    }

    /// Number of connected handlers.
    pub fn connection_count(&self) -> usize {
        self.handlers.lock().slots.len()
    }

    /// Suppress emissions until unblocked. Handlers stay connected.
    pub fn set_blocked(&self, blocked: bool) {
        self.handlers.lock().blocked = blocked;
    }

    /// Whether emissions are suppressed.
    pub fn is_blocked(&self) -> bool {
        self.handlers.lock().blocked
    }

    /// Call every handler with `args`.
    pub fn emit(&self, args: Args) {
        let handlers: Vec<Handler<Args>> = {
            let handlers = self.handlers.lock();
            if handlers.blocked {
                return;
            }
            handlers.slots.values().cloned().collect()
        };
        tracing::trace!(target: targets::SIGNAL, handlers = handlers.len(), "emit");
        for handler in &handlers {
            handler(&args);
        }
    }
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handlers = self.handlers.lock();
        f.debug_struct("Signal")
            .field("connections", &handlers.slots.len())
            .field("blocked", &handlers.blocked)
            .finish()
    }
}

static_assertions::assert_impl_all!(Signal<bool>: Send, Sync);
