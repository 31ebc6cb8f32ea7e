//! Core systems for Trellis.
//!
//! This crate provides the plumbing the sectioned model and widget layer are
//! built on:
//!
//! - **Idle scheduling**: cooperative callbacks that run repeatedly until done
//! - **Signals**: direct-connection observer notifications
//! - **Thread affinity**: debug checks that UI state stays on one thread
//! - **Logging**: `tracing` targets and span helpers
//!
//! # Idle Example
//!
//! ```
//! use trellis_core::IdleQueue;
//!
//! let queue = IdleQueue::new();
//! let mut remaining = 3;
//! queue.add(move || {
//!     remaining -= 1;
//!     remaining > 0
//! });
//!
//! assert_eq!(queue.run_until_idle(100), Ok(3));
//! ```

mod error;
pub mod idle;
pub mod logging;
pub mod signal;
pub mod thread_check;

pub use error::{IdleError, Result};
pub use idle::{IdleCallback, IdleQueue, IdleScheduler, IdleSourceId, ImmediateScheduler};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use thread_check::ThreadAffinity;
