//! Sectioned model configuration.

/// Tuning for a [`SectionedModel`](super::SectionedModel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionedModelConfig {
    /// Maximum number of edits dispatched per idle invocation.
    pub batch_size: usize,
}

impl SectionedModelConfig {
    /// Default number of edits dispatched per idle invocation.
    pub const DEFAULT_BATCH_SIZE: usize = 10;

    /// Create the default configuration.
    pub fn new() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the number of edits dispatched per idle invocation.
    ///
    /// Values below one are raised to one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

impl Default for SectionedModelConfig {
    fn default() -> Self {
        Self::new()
    }
}
