//! Headless widget layer driven by a sectioned model.
//!
//! - [`SectionedView`]: the model's delegate; mirrors sections into
//!   per-section [`SectionContainer`]s and translates activations
//! - [`SectionedController`]: owns a model and its view
//! - [`ListContainer`] / [`FlowContainer`]: the two container layouts

mod container;
mod controller;
mod sectioned_view;

pub use container::{ContainerKind, FlowContainer, ItemContainer, ListContainer, SectionContainer};
pub use controller::SectionedController;
pub use sectioned_view::{
    Activation, ContainerSelector, HeaderFactory, SectionedView, SectionedViewBuilder,
    WidgetFactory,
};
