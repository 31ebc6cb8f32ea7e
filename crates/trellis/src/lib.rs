//! Trellis: incremental reconciliation of sectioned collections.
//!
//! A [`SectionedModel`] tracks a two-level collection of sections and items.
//! Applications declare the desired state; the model diffs it against what
//! has already been shown and feeds the edits to a delegate a few at a time
//! from idle callbacks, so large updates never stall the UI thread.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use trellis::prelude::*;
//!
//! let idle = Arc::new(IdleQueue::new());
//! let controller = SectionedController::new(idle.clone(), |name: &String| name.len());
//!
//! controller.set_sections(vec!["fruit"]);
//! controller.set_items(&"fruit", vec!["apple".to_string(), "fig".to_string()]);
//! idle.run_until_idle(100).unwrap();
//!
//! assert_eq!(controller.view().widgets(&"fruit"), vec![5, 3]);
//! ```
//!
//! # Crates
//!
//! - `trellis-core`: idle scheduling, signals, thread affinity, logging
//! - `trellis`: the sectioned model and the widget layer

pub mod error;
pub mod model;
pub mod widget;

pub use error::{Result, ViewError};
pub use model::{
    Change, ItemId, SectionId, SectionedModel, SectionedModelConfig, SectionedModelDelegate,
    SectionedModelSignals,
};
pub use widget::{Activation, ContainerKind, SectionContainer, SectionedController, SectionedView};

/// Commonly used types.
pub mod prelude {
    pub use crate::model::{
        SectionedModel, SectionedModelConfig, SectionedModelDelegate, SectionedModelSignals,
    };
    pub use crate::widget::{
        Activation, ContainerKind, ItemContainer, SectionContainer, SectionedController,
        SectionedView,
    };
    pub use trellis_core::{IdleQueue, IdleScheduler, ImmediateScheduler, Signal};
}
