//! The delegate contract between a sectioned model and its consumer.

use std::fmt::Debug;
use std::hash::Hash;

/// Bounds required of a section identifier.
///
/// Section identifiers key the model's per-section state, so they must be
/// hashable. Order among sections is given by the sequence passed to
/// [`SectionedModel::set_sections`](super::SectionedModel::set_sections).
pub trait SectionId: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> SectionId for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Bounds required of an item identifier.
///
/// Items are compared by equality within their own section only; two
/// sections may hold equal items.
pub trait ItemId: Clone + Eq + Debug + Send + Sync + 'static {}

impl<T> ItemId for T where T: Clone + Eq + Debug + Send + Sync + 'static {}

/// Receives the edits a [`SectionedModel`](super::SectionedModel) dispatches.
///
/// Every call describes one edit that has just been applied to the model's
/// dispatched ("real") state. Implementations mirror the edit onto whatever
/// they display. Indices are positions in the real state at the time of the
/// call.
///
/// Calls are made on the thread that drains the model, with no model lock
/// held. A delegate may call back into the model; such calls are ordinary
/// mutations and are queued like any other.
pub trait SectionedModelDelegate<S, I>: Send + Sync {
    /// A section was inserted at `index`.
    fn section_added(&self, section: &S, index: usize);

    /// The section at `index` was removed, along with all of its items.
    fn section_removed(&self, section: &S, index: usize);

    /// `item` was inserted at `index` in `section`.
    fn item_added(&self, item: &I, index: usize, section: &S);

    /// `item` at `index` was removed from `section`.
    fn item_removed(&self, item: &I, index: usize, section: &S);

    /// All queued edits have been dispatched.
    fn dispatch_completed(&self) {}

    /// The declared content went from empty to non-empty or back.
    fn is_empty_changed(&self, is_empty: bool);
}
