//! Controller pairing a sectioned model with its view.

use std::sync::Arc;

use trellis_core::{ConnectionId, IdleScheduler};

use super::sectioned_view::{Activation, SectionedView, SectionedViewBuilder};
use crate::model::{ItemId, SectionId, SectionedModel, SectionedModelConfig};

/// Owns a [`SectionedModel`] and the [`SectionedView`] that mirrors it.
///
/// The controller keeps the view alive (the model only holds it weakly) and is
/// the single place application code declares content through.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use trellis::widget::SectionedController;
/// use trellis_core::IdleQueue;
///
/// let idle = Arc::new(IdleQueue::new());
/// let controller = SectionedController::new(idle.clone(), |item: &u32| item.to_string());
///
/// controller.set_sections(vec!["numbers"]);
/// controller.set_items(&"numbers", vec![1, 2, 3]);
/// idle.run_until_idle(100).unwrap();
///
/// assert_eq!(controller.view().widgets(&"numbers"), vec!["1", "2", "3"]);
/// ```
pub struct SectionedController<S, I, W> {
    model: SectionedModel<S, I>,
    view: Arc<SectionedView<S, I, W>>,
}

impl<S: SectionId, I: ItemId, W: Send + Sync + 'static> SectionedController<S, I, W> {
    /// Create a controller with a default model and a list-only view.
    pub fn new<F>(scheduler: Arc<dyn IdleScheduler>, factory: F) -> Self
    where
        F: Fn(&I) -> W + Send + Sync + 'static,
    {
        let model = SectionedModel::new(scheduler);
        Self::from_builder(SectionedView::builder(model, factory))
    }

    /// Create a controller with a configured model, letting `configure`
    /// customize the view before it is attached.
    pub fn with_config<F, C>(
        scheduler: Arc<dyn IdleScheduler>,
        config: SectionedModelConfig,
        factory: F,
        configure: C,
    ) -> Self
    where
        F: Fn(&I) -> W + Send + Sync + 'static,
        C: FnOnce(SectionedViewBuilder<S, I, W>) -> SectionedViewBuilder<S, I, W>,
    {
        let model = SectionedModel::with_config(scheduler, config);
        Self::from_builder(configure(SectionedView::builder(model, factory)))
    }

    fn from_builder(builder: SectionedViewBuilder<S, I, W>) -> Self {
        let view = builder.build();
        Self {
            model: view.model().clone(),
            view,
        }
    }

    /// The model.
    pub fn model(&self) -> &SectionedModel<S, I> {
        &self.model
    }

    /// The view.
    pub fn view(&self) -> &Arc<SectionedView<S, I, W>> {
        &self.view
    }

    /// Declare the section order.
    pub fn set_sections(&self, sections: Vec<S>) {
        self.model.set_sections(sections);
    }

    /// Declare the items of `section`.
    pub fn set_items(&self, section: &S, items: Vec<I>) {
        self.model.set_items(section, items);
    }

    /// Call `handler` with `(section_index, item_index)` whenever an item is
    /// activated. Indices are in declared coordinates.
    pub fn on_activate_index<F>(&self, handler: F) -> ConnectionId
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        self.view
            .activated
            .connect(move |activation: &Activation<S, I>| {
                handler(activation.section_index, activation.item_index)
            })
    }

    /// Call `handler` with the section and item identifiers whenever an item
    /// is activated.
    pub fn on_activate_item<F>(&self, handler: F) -> ConnectionId
    where
        F: Fn(&S, &I) + Send + Sync + 'static,
    {
        self.view
            .activated
            .connect(move |activation: &Activation<S, I>| {
                handler(&activation.section, &activation.item)
            })
    }

    /// Remove an activation handler.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.view.activated.disconnect(id)
    }
}
