//! Cooperative idle scheduling.
//!
//! An idle source is a callback that the host event loop invokes repeatedly
//! while it has nothing more urgent to do. The callback returns `true` to be
//! called again on a later tick and `false` once its work is finished, at
//! which point it is deregistered.
//!
//! Two schedulers are provided:
//!
//! - [`IdleQueue`]: a host-loop primitive. Each call to
//!   [`process_tick`](IdleQueue::process_tick) gives every registered source
//!   (up to the batch size) one invocation.
//! - [`ImmediateScheduler`]: runs a source to completion as soon as it is
//!   scheduled. Useful for tests and for hosts without an event loop.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::{IdleError, Result};
use crate::logging::{PerfSpan, span_names, targets};

/// A unique identifier for a registered idle source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdleSourceId(u64);

impl IdleSourceId {
    /// Get the raw u64 value of this source ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Global counter for generating unique source IDs.
static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

fn next_source_id() -> IdleSourceId {
    IdleSourceId(NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed))
}

/// A boxed idle callback. Returns `true` to be invoked again.
pub type IdleCallback = Box<dyn FnMut() -> bool + Send + 'static>;

/// Something that can run idle callbacks on behalf of a model or widget.
///
/// Implementations must keep invoking a scheduled callback, on the thread that
/// owns the scheduler, until it returns `false`.
pub trait IdleScheduler: Send + Sync {
    /// Register `callback` to run repeatedly until it returns `false`.
    fn schedule_idle(&self, callback: IdleCallback) -> IdleSourceId;
}

/// Internal source data.
struct IdleSource {
    id: IdleSourceId,
    callback: IdleCallback,
}

struct IdleSources {
    /// Sources waiting for their next invocation.
    pending: VecDeque<IdleSource>,
    /// Sources currently taken out of the queue by a running tick.
    in_flight: HashSet<IdleSourceId>,
    /// In-flight sources removed while they were running.
    cancelled: HashSet<IdleSourceId>,
    /// Maximum number of sources invoked per tick.
    batch_size: usize,
}

/// A cooperative idle loop.
///
/// Sources are invoked in registration order. A source that asks to be
/// called again is moved to the back of the queue, so long-running sources
/// share ticks fairly with newer ones. Callbacks run without the queue lock
/// held and may register further sources.
pub struct IdleQueue {
    inner: Mutex<IdleSources>,
}

impl IdleQueue {
    /// Default number of sources invoked per tick.
    pub const DEFAULT_BATCH_SIZE: usize = 10;

    /// Create a new, empty idle queue.
    pub fn new() -> Self {
        Self::with_batch_size(Self::DEFAULT_BATCH_SIZE)
    }

    /// Create an idle queue that invokes at most `batch_size` sources per tick.
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            inner: Mutex::new(IdleSources {
                pending: VecDeque::new(),
                in_flight: HashSet::new(),
                cancelled: HashSet::new(),
                batch_size: batch_size.max(1),
            }),
        }
    }

    /// Register a source. Equivalent to [`IdleScheduler::schedule_idle`].
    pub fn add<F>(&self, callback: F) -> IdleSourceId
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.schedule_idle(Box::new(callback))
    }

    /// Deregister a source before it finishes on its own.
    ///
    /// A source removed while its callback is running is dropped as soon as
    /// the callback returns.
    pub fn remove(&self, id: IdleSourceId) -> Result<()> {
        let mut inner = self.inner.lock();
        if let Some(pos) = inner.pending.iter().position(|s| s.id == id) {
            inner.pending.remove(pos);
            return Ok(());
        }
        if inner.in_flight.contains(&id) {
            inner.cancelled.insert(id);
            return Ok(());
        }
        crate::trellis_debug!(source = id.as_u64(), "remove of unknown idle source");
        Err(IdleError::UnknownSource(id))
    }

    /// Check if any sources are registered.
    pub fn has_pending(&self) -> bool {
        let inner = self.inner.lock();
        !inner.pending.is_empty() || !inner.in_flight.is_empty()
    }

    /// Get the number of registered sources.
    pub fn pending_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.pending.len() + inner.in_flight.len()
    }

    /// Set the maximum number of sources invoked per tick.
    pub fn set_batch_size(&self, size: usize) {
        self.inner.lock().batch_size = size.max(1);
    }

    /// Run one idle tick.
    ///
    /// Returns the number of source invocations performed.
    pub fn process_tick(&self) -> usize {
        let _span = PerfSpan::new(span_names::IDLE_TICK);
        let batch: Vec<IdleSource> = {
            let mut inner = self.inner.lock();
            let count = inner.pending.len().min(inner.batch_size);
            let batch: Vec<IdleSource> = inner.pending.drain(..count).collect();
            for source in &batch {
                inner.in_flight.insert(source.id);
            }
            batch
        };

        let invoked = batch.len();
        for mut source in batch {
            let again = (source.callback)();
            let mut inner = self.inner.lock();
            inner.in_flight.remove(&source.id);
            let cancelled = inner.cancelled.remove(&source.id);
            if again && !cancelled {
                inner.pending.push_back(source);
            } else {
                tracing::trace!(
                    target: targets::IDLE,
                    source = source.id.as_u64(),
                    cancelled,
                    "idle source finished"
                );
            }
        }
        invoked
    }

    /// Tick until no sources remain.
    ///
    /// Returns the number of ticks that did work. Fails with
    /// [`IdleError::TickLimitExceeded`] if sources are still registered after
    /// `max_ticks` ticks.
    pub fn run_until_idle(&self, max_ticks: usize) -> Result<usize> {
        let mut ticks = 0;
        while self.has_pending() {
            if ticks == max_ticks {
                return Err(IdleError::tick_limit(ticks, self.pending_count()));
            }
            self.process_tick();
            ticks += 1;
        }
        tracing::debug!(target: targets::IDLE, ticks, "idle queue drained");
        Ok(ticks)
    }
}

impl Default for IdleQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl IdleScheduler for IdleQueue {
    fn schedule_idle(&self, callback: IdleCallback) -> IdleSourceId {
        let id = next_source_id();
        self.inner
            .lock()
            .pending
            .push_back(IdleSource { id, callback });
        tracing::trace!(target: targets::IDLE, source = id.as_u64(), "idle source scheduled");
        id
    }
}

/// Scheduler that runs each source to completion inside `schedule_idle`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateScheduler;

impl ImmediateScheduler {
    /// Create a new immediate scheduler.
    pub fn new() -> Self {
        Self
    }
}

impl IdleScheduler for ImmediateScheduler {
    fn schedule_idle(&self, mut callback: IdleCallback) -> IdleSourceId {
        let id = next_source_id();
        let mut invocations = 0usize;
        while callback() {
            invocations += 1;
        }
        tracing::trace!(
            target: targets::IDLE,
            source = id.as_u64(),
            invocations = invocations + 1,
            "immediate source finished"
        );
        id
    }
}

static_assertions::assert_impl_all!(IdleQueue: Send, Sync);
static_assertions::assert_impl_all!(ImmediateScheduler: Send, Sync);
