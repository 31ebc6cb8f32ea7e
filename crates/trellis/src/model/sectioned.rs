//! Sectioned model: declared versus dispatched section/item state.
//!
//! A [`SectionedModel`] keeps two timelines of a two-level collection:
//!
//! - the **target** state, which the application declares through
//!   [`set_sections`](SectionedModel::set_sections) and
//!   [`set_items`](SectionedModel::set_items), and
//! - the **real** state, which is what the delegate has been told so far.
//!
//! Declaring new target state computes the difference against the real state
//! and queues it. The queue is drained on the idle scheduler a bounded number
//! of edits at a time, so a large reconciliation never blocks the UI thread
//! for long. Each applied edit is reported to the delegate.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use trellis_core::logging::{span_names, targets};
use trellis_core::{IdleScheduler, PerfSpan, Signal, ThreadAffinity};

use super::config::SectionedModelConfig;
use super::delegate::{ItemId, SectionId, SectionedModelDelegate};
use super::diff::{self, Change};

/// Signals emitted by a sectioned model, for observers other than the delegate.
pub struct SectionedModelSignals {
    /// Emitted when the declared content becomes empty (`true`) or non-empty.
    pub is_empty_changed: Signal<bool>,
    /// Emitted once the dispatch queue has fully drained.
    pub dispatch_completed: Signal<()>,
}

impl SectionedModelSignals {
    fn new() -> Self {
        Self {
            is_empty_changed: Signal::new(),
            dispatch_completed: Signal::new(),
        }
    }
}

/// Pending item edits for one section.
struct SectionChanges<S, I> {
    section: S,
    changes: VecDeque<Change<I>>,
}

/// One edit's worth of news for the delegate.
enum Notification<S, I> {
    SectionAdded(S, usize),
    SectionRemoved(S, usize),
    ItemAdded(I, usize, S),
    ItemRemoved(I, usize, S),
}

enum Step<S, I> {
    Applied(Notification<S, I>),
    Skipped,
    Drained,
}

struct ModelState<S, I> {
    target_sections: Vec<S>,
    real_sections: Vec<S>,
    target_items: HashMap<S, Vec<I>>,
    real_items: HashMap<S, Vec<I>>,
    section_changes: VecDeque<Change<S>>,
    item_changes: VecDeque<SectionChanges<S, I>>,
    idle_active: bool,
    is_empty: bool,
}

impl<S: SectionId, I: ItemId> ModelState<S, I> {
    fn new() -> Self {
        Self {
            target_sections: Vec::new(),
            real_sections: Vec::new(),
            target_items: HashMap::new(),
            real_items: HashMap::new(),
            section_changes: VecDeque::new(),
            item_changes: VecDeque::new(),
            idle_active: false,
            is_empty: true,
        }
    }

    /// Mark a drain session as registered. Returns `false` if one already was.
    fn claim_idle(&mut self) -> bool {
        if self.idle_active {
            return false;
        }
        self.idle_active = true;
        true
    }

    /// Recompute emptiness, returning the new value if it changed.
    fn update_is_empty(&mut self) -> Option<bool> {
        let is_empty = self
            .target_sections
            .iter()
            .all(|section| self.target_items.get(section).is_none_or(Vec::is_empty));
        if is_empty == self.is_empty {
            return None;
        }
        self.is_empty = is_empty;
        Some(is_empty)
    }

    fn discard_item_changes(&mut self, section: &S) {
        self.item_changes.retain(|batch| &batch.section != section);
    }

    /// Replace the section's pending item edits with a fresh difference
    /// against its dispatched items.
    ///
    /// Nothing is queued for a section that is not both declared and
    /// dispatched. Returns whether a batch was queued.
    fn queue_item_changes(&mut self, section: &S) -> bool {
        self.discard_item_changes(section);
        if !self.target_sections.contains(section) || !self.real_sections.contains(section) {
            return false;
        }

        let real = self.real_items.entry(section.clone()).or_default();
        let target = self
            .target_items
            .get(section)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let changes = diff::difference(real, target);
        if changes.is_empty() {
            return false;
        }

        tracing::debug!(
            target: targets::MODEL,
            ?section,
            changes = changes.len(),
            "queued item changes"
        );
        self.item_changes.push_back(SectionChanges {
            section: section.clone(),
            changes: changes.into(),
        });
        true
    }

    /// Queue item edits for sections that are declared and dispatched but
    /// whose items changed while they were undeclared.
    fn queue_stale_items(&mut self) -> bool {
        let empty: &[I] = &[];
        let stale: Vec<S> = self
            .target_sections
            .iter()
            .filter(|section| self.real_sections.contains(section))
            .filter(|section| {
                !self
                    .item_changes
                    .iter()
                    .any(|batch| &batch.section == *section)
            })
            .filter(|section| {
                let real = self.real_items.get(*section).map_or(empty, Vec::as_slice);
                let target = self.target_items.get(*section).map_or(empty, Vec::as_slice);
                real != target
            })
            .cloned()
            .collect();

        let mut queued = false;
        for section in &stale {
            queued |= self.queue_item_changes(section);
        }
        queued
    }

    fn pending_changes(&self) -> usize {
        self.section_changes.len()
            + self
                .item_changes
                .iter()
                .map(|batch| batch.changes.len())
                .sum::<usize>()
    }

    /// Apply the next queued edit to the real state.
    fn next_step(&mut self) -> Step<S, I> {
        if let Some(change) = self.section_changes.pop_front() {
            return self.apply_section_change(change);
        }

        while let Some(batch) = self.item_changes.front_mut() {
            let change = batch.changes.pop_front();
            let section = batch.section.clone();
            if batch.changes.is_empty() {
                self.item_changes.pop_front();
            }
            if let Some(change) = change {
                return self.apply_item_change(change, section);
            }
        }

        self.idle_active = false;
        Step::Drained
    }

    fn apply_section_change(&mut self, change: Change<S>) -> Step<S, I> {
        if !change.apply_to(&mut self.real_sections) {
            tracing::warn!(
                target: targets::MODEL,
                offset = change.offset(),
                section = ?change.element(),
                "section change out of range, skipping"
            );
            return Step::Skipped;
        }

        match change {
            Change::Insert { offset, element } => {
                // The consumer has just created an empty container for it.
                self.real_items.insert(element.clone(), Vec::new());
                self.queue_item_changes(&element);
                tracing::trace!(target: targets::MODEL, section = ?element, offset, "section added");
                Step::Applied(Notification::SectionAdded(element, offset))
            }
            Change::Remove { offset, element } => {
                self.discard_item_changes(&element);
                self.real_items.remove(&element);
                tracing::trace!(target: targets::MODEL, section = ?element, offset, "section removed");
                Step::Applied(Notification::SectionRemoved(element, offset))
            }
        }
    }

    fn apply_item_change(&mut self, change: Change<I>, section: S) -> Step<S, I> {
        let items = self.real_items.entry(section.clone()).or_default();
        if !change.apply_to(items) {
            tracing::warn!(
                target: targets::MODEL,
                ?section,
                offset = change.offset(),
                "item change out of range, skipping"
            );
            return Step::Skipped;
        }

        match change {
            Change::Insert { offset, element } => {
                tracing::trace!(target: targets::MODEL, ?section, item = ?element, offset, "item added");
                Step::Applied(Notification::ItemAdded(element, offset, section))
            }
            Change::Remove { offset, element } => {
                tracing::trace!(target: targets::MODEL, ?section, item = ?element, offset, "item removed");
                Step::Applied(Notification::ItemRemoved(element, offset, section))
            }
        }
    }
}

type DelegateRef<S, I> = Weak<dyn SectionedModelDelegate<S, I>>;

struct Shared<S, I> {
    state: Mutex<ModelState<S, I>>,
    delegate: Mutex<Option<DelegateRef<S, I>>>,
    signals: SectionedModelSignals,
    scheduler: Arc<dyn IdleScheduler>,
    config: SectionedModelConfig,
    affinity: ThreadAffinity,
}

impl<S: SectionId, I: ItemId> Shared<S, I> {
    fn delegate(&self) -> Option<Arc<dyn SectionedModelDelegate<S, I>>> {
        self.delegate.lock().as_ref().and_then(Weak::upgrade)
    }

    fn notify(&self, notification: Notification<S, I>) {
        let Some(delegate) = self.delegate() else {
            return;
        };
        match notification {
            Notification::SectionAdded(section, index) => delegate.section_added(&section, index),
            Notification::SectionRemoved(section, index) => {
                delegate.section_removed(&section, index)
            }
            Notification::ItemAdded(item, index, section) => {
                delegate.item_added(&item, index, &section)
            }
            Notification::ItemRemoved(item, index, section) => {
                delegate.item_removed(&item, index, &section)
            }
        }
    }

    fn notify_is_empty(&self, is_empty: bool) {
        tracing::debug!(target: targets::MODEL, is_empty, "emptiness changed");
        if let Some(delegate) = self.delegate() {
            delegate.is_empty_changed(is_empty);
        }
        self.signals.is_empty_changed.emit(is_empty);
    }

    fn notify_completed(&self) {
        tracing::debug!(target: targets::MODEL, "dispatch completed");
        if let Some(delegate) = self.delegate() {
            delegate.dispatch_completed();
        }
        self.signals.dispatch_completed.emit(());
    }
}

/// A two-level section/item collection that reconciles incrementally.
///
/// `SectionedModel` is a cheap, cloneable handle; clones share state. The
/// model holds its delegate weakly and is itself held only weakly by the idle
/// callback it registers, so dropping the last handle stops any pending
/// dispatch.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use trellis::model::SectionedModel;
/// use trellis_core::IdleQueue;
///
/// let idle = Arc::new(IdleQueue::new());
/// let model = SectionedModel::<&'static str, u32>::new(idle.clone());
///
/// model.set_sections(vec!["recent"]);
/// model.set_items(&"recent", vec![1, 2, 3]);
/// assert!(model.real_items(&"recent").is_empty());
///
/// idle.run_until_idle(100).unwrap();
/// assert_eq!(model.real_items(&"recent"), vec![1, 2, 3]);
/// ```
///
/// # Preconditions
///
/// Section identifiers must be unique within the sequence given to
/// [`set_sections`](Self::set_sections), and item identifiers unique within
/// a section. This is not checked; duplicates make the dispatched edits
/// ambiguous for identity-based lookups.
pub struct SectionedModel<S, I> {
    shared: Arc<Shared<S, I>>,
}

impl<S, I> Clone for SectionedModel<S, I> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: SectionId, I: ItemId> SectionedModel<S, I> {
    /// Create an empty model that drains on `scheduler`.
    pub fn new(scheduler: Arc<dyn IdleScheduler>) -> Self {
        Self::with_config(scheduler, SectionedModelConfig::default())
    }

    /// Create an empty model with custom configuration.
    pub fn with_config(scheduler: Arc<dyn IdleScheduler>, config: SectionedModelConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ModelState::new()),
                delegate: Mutex::new(None),
                signals: SectionedModelSignals::new(),
                scheduler,
                config,
                affinity: ThreadAffinity::current(),
            }),
        }
    }

    /// The configuration this model was created with.
    pub fn config(&self) -> SectionedModelConfig {
        self.shared.config
    }

    /// Signals for observers other than the delegate.
    pub fn signals(&self) -> &SectionedModelSignals {
        &self.shared.signals
    }

    /// Attach a delegate. The model keeps only a weak reference.
    pub fn set_delegate<D>(&self, delegate: &Arc<D>)
    where
        D: SectionedModelDelegate<S, I> + 'static,
    {
        let delegate: Arc<dyn SectionedModelDelegate<S, I>> = delegate.clone();
        *self.shared.delegate.lock() = Some(Arc::downgrade(&delegate));
    }

    /// Detach the delegate. Pending edits stay queued and keep draining.
    pub fn clear_delegate(&self) {
        *self.shared.delegate.lock() = None;
    }

    #[cfg(test)]
    pub(crate) fn has_delegate(&self) -> bool {
        self.shared.delegate().is_some()
    }

    /// Declare the section order.
    ///
    /// Replaces any section edits that have not been dispatched yet with the
    /// difference between the dispatched sections and `sections`.
    pub fn set_sections(&self, sections: Vec<S>) {
        self.shared.affinity.check("SectionedModel::set_sections");

        let (schedule, empty_change) = {
            let mut state = self.shared.state.lock();
            let changes = diff::difference(&state.real_sections, &sections);
            tracing::debug!(
                target: targets::MODEL,
                sections = sections.len(),
                changes = changes.len(),
                "set sections"
            );
            state.target_sections = sections;
            state.section_changes = changes.into();
            let queued = state.queue_stale_items();
            let schedule = (!state.section_changes.is_empty() || queued) && state.claim_idle();
            (schedule, state.update_is_empty())
        };

        if let Some(is_empty) = empty_change {
            self.shared.notify_is_empty(is_empty);
        }
        if schedule {
            self.start_idle();
        }
    }

    /// Declare the items of `section`.
    ///
    /// The items are always stored. Their difference is only queued once the
    /// section is both declared and dispatched; until then the items wait
    /// and are reconciled when the section is inserted or declared again. A
    /// new call for the same section supersedes any of its edits still in the
    /// queue.
    pub fn set_items(&self, section: &S, items: Vec<I>) {
        self.shared.affinity.check("SectionedModel::set_items");

        let (schedule, empty_change) = {
            let mut state = self.shared.state.lock();
            tracing::debug!(target: targets::MODEL, ?section, items = items.len(), "set items");
            state.target_items.insert(section.clone(), items);
            let schedule = state.queue_item_changes(section) && state.claim_idle();
            (schedule, state.update_is_empty())
        };

        if let Some(is_empty) = empty_change {
            self.shared.notify_is_empty(is_empty);
        }
        if schedule {
            self.start_idle();
        }
    }

    /// The declared sections, in order.
    pub fn sections(&self) -> Vec<S> {
        self.shared.state.lock().target_sections.clone()
    }

    /// The sections dispatched to the delegate so far, in order.
    pub fn real_sections(&self) -> Vec<S> {
        self.shared.state.lock().real_sections.clone()
    }

    /// The declared items of `section`, empty if none were declared.
    pub fn items(&self, section: &S) -> Vec<I> {
        self.shared
            .state
            .lock()
            .target_items
            .get(section)
            .cloned()
            .unwrap_or_default()
    }

    /// The items of `section` dispatched to the delegate so far.
    pub fn real_items(&self, section: &S) -> Vec<I> {
        self.shared
            .state
            .lock()
            .real_items
            .get(section)
            .cloned()
            .unwrap_or_default()
    }

    /// Position of `section` among the declared sections.
    pub fn index_of_section(&self, section: &S) -> Option<usize> {
        self.shared
            .state
            .lock()
            .target_sections
            .iter()
            .position(|s| s == section)
    }

    /// Position of `item` among the declared items of `section`.
    pub fn index_of_item(&self, item: &I, section: &S) -> Option<usize> {
        self.shared
            .state
            .lock()
            .target_items
            .get(section)?
            .iter()
            .position(|i| i == item)
    }

    /// Translate a dispatched item index into a declared item index.
    ///
    /// Returns `None` when the dispatched item is no longer declared (for
    /// example, its removal is still queued), or when the index or section is
    /// unknown. Callers should ignore the interaction in that case.
    pub fn target_index_for_item(&self, real_index: usize, section: &S) -> Option<usize> {
        let state = self.shared.state.lock();
        let item = state.real_items.get(section)?.get(real_index)?;
        state
            .target_items
            .get(section)?
            .iter()
            .position(|i| i == item)
    }

    /// Translate a dispatched section index into a declared section index.
    pub fn target_index_for_section(&self, real_index: usize) -> Option<usize> {
        let state = self.shared.state.lock();
        let section = state.real_sections.get(real_index)?;
        state.target_sections.iter().position(|s| s == section)
    }

    /// Whether every declared section is empty (or there are none).
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().is_empty
    }

    /// Whether an idle drain is registered.
    pub fn is_dispatching(&self) -> bool {
        self.shared.state.lock().idle_active
    }

    /// Number of queued edits not yet dispatched.
    pub fn pending_changes(&self) -> usize {
        self.shared.state.lock().pending_changes()
    }

    /// Dispatch up to the configured batch of queued edits.
    ///
    /// Only the source registered by `start_idle` runs this, so each idle
    /// session has exactly one source. Section edits drain before item edits.
    /// Returns `true` while edits remain and `false` once the queue is empty,
    /// after notifying `dispatch_completed`.
    fn process_pending(&self) -> bool {
        self.shared.affinity.check("SectionedModel::process_pending");
        let _span = PerfSpan::new(span_names::DRAIN);

        let batch_size = self.shared.config.batch_size.max(1);
        let mut applied = 0;
        while applied < batch_size {
            let step = self.shared.state.lock().next_step();
            match step {
                Step::Applied(notification) => {
                    applied += 1;
                    self.shared.notify(notification);
                }
                Step::Skipped => applied += 1,
                Step::Drained => {
                    self.shared.notify_completed();
                    return false;
                }
            }
        }
        tracing::trace!(
            target: targets::MODEL,
            applied,
            remaining = self.pending_changes(),
            "drain batch finished"
        );
        true
    }

    fn start_idle(&self) {
        let model = Arc::downgrade(&self.shared);
        self.shared.scheduler.schedule_idle(Box::new(move || {
            match model.upgrade() {
                Some(shared) => SectionedModel { shared }.process_pending(),
                None => false,
            }
        }));
    }
}

impl<S: SectionId, I: ItemId> fmt::Debug for SectionedModel<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("SectionedModel")
            .field("sections", &state.target_sections)
            .field("real_sections", &state.real_sections)
            .field("pending_changes", &state.pending_changes())
            .field("is_empty", &state.is_empty)
            .finish()
    }
}

static_assertions::assert_impl_all!(SectionedModel<String, u64>: Send, Sync, Clone);
