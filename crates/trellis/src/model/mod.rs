//! Sectioned model and its reconciliation machinery.
//!
//! # Core Types
//!
//! - [`SectionedModel`]: declared and dispatched section/item state, drained
//!   incrementally on an idle scheduler
//! - [`SectionedModelDelegate`]: receives each dispatched edit
//! - [`SectionedModelConfig`]: per-model tuning
//! - [`diff`]: ordered sequence differences
//!
//! # Architecture Overview
//!
//! ```text
//! set_sections / set_items
//!          │
//!          ▼
//! ┌─────────────────┐  diff   ┌──────────────┐  idle ticks  ┌──────────┐
//! │  target state   │────────>│  edit queue  │─────────────>│ delegate │
//! └─────────────────┘         └──────────────┘              └──────────┘
//!          ▲                         │ apply
//!          │ translate indices       ▼
//!          └──────────────── ┌──────────────┐
//!                            │  real state  │
//!                            └──────────────┘
//! ```

mod config;
mod delegate;
pub mod diff;
mod sectioned;

pub use config::SectionedModelConfig;
pub use delegate::{ItemId, SectionId, SectionedModelDelegate};
pub use diff::Change;
pub use sectioned::{SectionedModel, SectionedModelSignals};
