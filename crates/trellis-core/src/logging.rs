//! Logging facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. To see logs, install a
//! tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("trellis=debug,trellis_core=info")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`], so a filter directive
//! can isolate the model, the view layer or the idle loop.

/// Span names used throughout Trellis for tracing.
pub mod span_names {
    /// One drain tick of a sectioned model.
    pub const DRAIN: &str = "trellis::drain";
    /// Idle loop tick.
    pub const IDLE_TICK: &str = "trellis::idle_tick";
}

/// Target names for log filtering.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "trellis_core";
    /// Idle scheduler target.
    pub const IDLE: &str = "trellis_core::idle";
    /// Signal system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Sectioned model target.
    pub const MODEL: &str = "trellis::model";
    /// Widget layer target.
    pub const VIEW: &str = "trellis::view";
}

/// A guard that keeps a tracing span entered until it is dropped.
///
/// Useful for timing an operation with a subscriber that records span
/// durations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Trace-level event under the core target.
#[macro_export]
macro_rules! trellis_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "trellis_core", $($arg)*)
    };
}

/// Debug-level event under the core target.
#[macro_export]
macro_rules! trellis_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "trellis_core", $($arg)*)
    };
}
