//! A headless view that mirrors a sectioned model into containers.
//!
//! [`SectionedView`] is the delegate side of a
//! [`SectionedModel`](crate::model::SectionedModel). Every dispatched edit
//! becomes a container operation: inserting a section creates its optional
//! header and an empty container, inserting an item creates a widget through
//! the widget factory, and removals drop them again.
//!
//! User interaction arrives in displayed ("real") coordinates. The view
//! translates it through the model before emitting
//! [`activated`](SectionedView::activated), so handlers always see declared
//! indices.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use trellis_core::Signal;
use trellis_core::logging::targets;

use super::container::{ContainerKind, ItemContainer, SectionContainer};
use crate::error::{Result, ViewError};
use crate::model::{ItemId, SectionId, SectionedModel, SectionedModelDelegate};

/// Creates the widget for an item.
pub type WidgetFactory<I, W> = Arc<dyn Fn(&I) -> W + Send + Sync>;

/// Creates the optional header widget for a section.
pub type HeaderFactory<S, W> = Arc<dyn Fn(&S) -> Option<W> + Send + Sync>;

/// Chooses the container layout for a section.
pub type ContainerSelector<S> = Arc<dyn Fn(&S) -> ContainerKind + Send + Sync>;

/// An item activation, in declared coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation<S, I> {
    /// Index of the section among the declared sections.
    pub section_index: usize,
    /// Index of the item among the section's declared items.
    pub item_index: usize,
    /// The section identifier.
    pub section: S,
    /// The item identifier.
    pub item: I,
}

/// One displayed section.
struct SectionEntry<S, W> {
    section: S,
    header: Option<W>,
    container: SectionContainer<W>,
}

/// Builder for [`SectionedView`].
pub struct SectionedViewBuilder<S, I, W> {
    model: SectionedModel<S, I>,
    widget_factory: WidgetFactory<I, W>,
    header_factory: Option<HeaderFactory<S, W>>,
    container_selector: ContainerSelector<S>,
}

impl<S: SectionId, I: ItemId, W: Send + Sync + 'static> SectionedViewBuilder<S, I, W> {
    /// Set the header factory. Sections without a header return `None`.
    pub fn header<F>(mut self, factory: F) -> Self
    where
        F: Fn(&S) -> Option<W> + Send + Sync + 'static,
    {
        self.header_factory = Some(Arc::new(factory));
        self
    }

    /// Set the container layout selector. Defaults to lists everywhere.
    pub fn container_kind<F>(mut self, selector: F) -> Self
    where
        F: Fn(&S) -> ContainerKind + Send + Sync + 'static,
    {
        self.container_selector = Arc::new(selector);
        self
    }

    /// Build the view and attach it to the model as its delegate.
    pub fn build(self) -> Arc<SectionedView<S, I, W>> {
        let view = Arc::new(SectionedView {
            is_empty: AtomicBool::new(self.model.is_empty()),
            model: self.model,
            sections: Mutex::new(Vec::new()),
            widget_factory: self.widget_factory,
            header_factory: self.header_factory,
            container_selector: self.container_selector,
            activated: Signal::new(),
        });
        view.model.set_delegate(&view);
        view
    }
}

/// Mirrors a sectioned model into per-section containers.
pub struct SectionedView<S, I, W> {
    model: SectionedModel<S, I>,
    sections: Mutex<Vec<SectionEntry<S, W>>>,
    widget_factory: WidgetFactory<I, W>,
    header_factory: Option<HeaderFactory<S, W>>,
    container_selector: ContainerSelector<S>,
    is_empty: AtomicBool,
    /// Emitted when an item is activated and still declared.
    pub activated: Signal<Activation<S, I>>,
}

impl<S: SectionId, I: ItemId, W: Send + Sync + 'static> SectionedView<S, I, W> {
    /// Start building a view over `model`, creating item widgets with `factory`.
    pub fn builder<F>(model: SectionedModel<S, I>, factory: F) -> SectionedViewBuilder<S, I, W>
    where
        F: Fn(&I) -> W + Send + Sync + 'static,
    {
        SectionedViewBuilder {
            model,
            widget_factory: Arc::new(factory),
            header_factory: None,
            container_selector: Arc::new(|_| ContainerKind::List),
        }
    }

    /// The model this view mirrors.
    pub fn model(&self) -> &SectionedModel<S, I> {
        &self.model
    }

    /// Number of displayed sections.
    pub fn section_count(&self) -> usize {
        self.sections.lock().len()
    }

    /// Displayed section identifiers, in order.
    pub fn displayed_sections(&self) -> Vec<S> {
        self.sections
            .lock()
            .iter()
            .map(|entry| entry.section.clone())
            .collect()
    }

    /// Number of widgets displayed in `section`.
    pub fn item_count(&self, section: &S) -> Option<usize> {
        self.with_container(section, |container| container.len())
    }

    /// Run `f` against the container of `section`.
    pub fn with_container<R>(
        &self,
        section: &S,
        f: impl FnOnce(&SectionContainer<W>) -> R,
    ) -> Option<R> {
        let sections = self.sections.lock();
        sections
            .iter()
            .find(|entry| &entry.section == section)
            .map(|entry| f(&entry.container))
    }

    /// Whether `section` was given a header.
    pub fn has_header(&self, section: &S) -> bool {
        self.sections
            .lock()
            .iter()
            .any(|entry| &entry.section == section && entry.header.is_some())
    }

    /// Whether the empty placeholder should be shown.
    pub fn shows_placeholder(&self) -> bool {
        self.is_empty.load(Ordering::SeqCst)
    }

    /// Handle activation of the displayed row `row` in `section`.
    ///
    /// Returns the activation that was emitted, or `None` if the row no longer
    /// maps to a declared item (for example, its removal is still queued).
    pub fn activate(&self, section: &S, row: usize) -> Option<Activation<S, I>> {
        let section_index = self.model.index_of_section(section)?;
        let item_index = self.model.target_index_for_item(row, section)?;
        let item = self.model.items(section).get(item_index)?.clone();

        let activation = Activation {
            section_index,
            item_index,
            section: section.clone(),
            item,
        };
        tracing::debug!(
            target: targets::VIEW,
            section_index,
            item_index,
            "item activated"
        );
        self.activated.emit(activation.clone());
        Some(activation)
    }

    /// Like [`activate`](Self::activate), addressing the section by its
    /// displayed position.
    pub fn activate_at(&self, section_position: usize, row: usize) -> Option<Activation<S, I>> {
        let section = self.sections.lock().get(section_position)?.section.clone();
        self.activate(&section, row)
    }

    fn insert_section(&self, section: &S, index: usize) -> Result<()> {
        let mut sections = self.sections.lock();
        if index > sections.len() {
            return Err(ViewError::out_of_bounds(index, sections.len()));
        }
        let header = self
            .header_factory
            .as_ref()
            .and_then(|factory| factory(section));
        let container = SectionContainer::new((self.container_selector)(section));
        sections.insert(
            index,
            SectionEntry {
                section: section.clone(),
                header,
                container,
            },
        );
        Ok(())
    }

    fn remove_section(&self, section: &S, index: usize) -> Result<()> {
        let mut sections = self.sections.lock();
        match sections.get(index) {
            Some(entry) if &entry.section == section => {
                sections.remove(index);
                Ok(())
            }
            Some(_) => Err(ViewError::unknown_section(section)),
            None => Err(ViewError::out_of_bounds(index, sections.len())),
        }
    }

    fn insert_item(&self, item: &I, index: usize, section: &S) -> Result<()> {
        let widget = (self.widget_factory)(item);
        let mut sections = self.sections.lock();
        let entry = sections
            .iter_mut()
            .find(|entry| &entry.section == section)
            .ok_or_else(|| ViewError::unknown_section(section))?;
        entry.container.insert(index, widget)
    }

    fn remove_item(&self, index: usize, section: &S) -> Result<()> {
        let mut sections = self.sections.lock();
        let entry = sections
            .iter_mut()
            .find(|entry| &entry.section == section)
            .ok_or_else(|| ViewError::unknown_section(section))?;
        entry.container.remove_at(index).map(drop)
    }

    fn report(&self, operation: &'static str, result: Result<()>) {
        if let Err(err) = result {
            tracing::warn!(target: targets::VIEW, operation, %err, "view out of sync with model");
        }
    }
}

impl<S: SectionId, I: ItemId, W: Clone + Send + Sync + 'static> SectionedView<S, I, W> {
    /// Clones of the widgets displayed in `section`, in order.
    pub fn widgets(&self, section: &S) -> Vec<W> {
        self.with_container(section, |container| {
            (0..container.len())
                .filter_map(|index| container.get(index).cloned())
                .collect()
        })
        .unwrap_or_default()
    }

    /// Clone of the header widget of `section`.
    pub fn header(&self, section: &S) -> Option<W> {
        self.sections
            .lock()
            .iter()
            .find(|entry| &entry.section == section)
            .and_then(|entry| entry.header.clone())
    }
}

impl<S: SectionId, I: ItemId, W: Send + Sync + 'static> SectionedModelDelegate<S, I>
    for SectionedView<S, I, W>
{
    fn section_added(&self, section: &S, index: usize) {
        let result = self.insert_section(section, index);
        self.report("section_added", result);
    }

    fn section_removed(&self, section: &S, index: usize) {
        let result = self.remove_section(section, index);
        self.report("section_removed", result);
    }

    fn item_added(&self, item: &I, index: usize, section: &S) {
        let result = self.insert_item(item, index, section);
        self.report("item_added", result);
    }

    fn item_removed(&self, _item: &I, index: usize, section: &S) {
        let result = self.remove_item(index, section);
        self.report("item_removed", result);
    }

    fn is_empty_changed(&self, is_empty: bool) {
        self.is_empty.store(is_empty, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::ImmediateScheduler;

    fn view() -> Arc<SectionedView<&'static str, u32, String>> {
        let model = SectionedModel::new(Arc::new(ImmediateScheduler::new()));
        SectionedView::builder(model, |item: &u32| format!("row {item}"))
            .header(|section: &&'static str| (*section != "plain").then(|| section.to_uppercase()))
            .container_kind(|section: &&'static str| {
                if section.starts_with("grid") {
                    ContainerKind::Flow
                } else {
                    ContainerKind::List
                }
            })
            .build()
    }

    #[test]
    fn test_view_mirrors_model() {
        let view = view();
        let model = view.model().clone();
        model.set_sections(vec!["plain", "grid"]);
        model.set_items(&"plain", vec![1, 2]);
        model.set_items(&"grid", vec![3]);

        assert_eq!(view.displayed_sections(), vec!["plain", "grid"]);
        assert_eq!(view.widgets(&"plain"), vec!["row 1", "row 2"]);
        assert!(!view.has_header(&"plain"));
        assert_eq!(view.header(&"grid"), Some("GRID".to_string()));
        assert_eq!(
            view.with_container(&"grid", SectionContainer::kind),
            Some(ContainerKind::Flow)
        );
        assert!(!view.shows_placeholder());

        model.set_sections(vec!["grid"]);
        assert_eq!(view.section_count(), 1);
        assert_eq!(view.item_count(&"plain"), None);
        assert_eq!(view.item_count(&"grid"), Some(1));
    }

    #[test]
    fn test_placeholder_follows_emptiness() {
        let view = view();
        assert!(view.shows_placeholder());
        view.model().set_sections(vec!["a"]);
        view.model().set_items(&"a", vec![1]);
        assert!(!view.shows_placeholder());
        view.model().set_items(&"a", vec![]);
        assert!(view.shows_placeholder());
    }

    #[test]
    fn test_activation_uses_declared_indices() {
        let view = view();
        let model = view.model().clone();
        model.set_sections(vec!["a", "b"]);
        model.set_items(&"b", vec![10, 20, 30]);

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        view.activated.connect(move |activation| {
            received_clone.lock().push(activation.clone());
        });

        let activation = view.activate(&"b", 2).unwrap();
        assert_eq!(activation.section_index, 1);
        assert_eq!(activation.item_index, 2);
        assert_eq!(activation.item, 30);
        assert_eq!(view.activate_at(1, 0).map(|a| a.item), Some(10));
        assert_eq!(received.lock().len(), 2);
        assert!(view.activate(&"b", 7).is_none());
        assert!(view.activate_at(9, 0).is_none());
    }

    #[test]
    fn test_inconsistent_edit_is_reported_not_fatal() {
        let view = view();
        assert_eq!(
            view.insert_item(&1, 0, &"missing"),
            Err(ViewError::unknown_section(&"missing"))
        );
        view.item_removed(&1, 0, &"missing");
        view.section_removed(&"missing", 3);
        assert_eq!(view.section_count(), 0);
    }
}
