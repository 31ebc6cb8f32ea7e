//! Error types for the Trellis widget layer.

/// Result type alias for view operations.
pub type Result<T> = std::result::Result<T, ViewError>;

/// Errors raised when a view cannot mirror an edit.
///
/// These indicate that the view and its model disagree about what has been
/// dispatched, which only happens if something other than the model mutated
/// the view's containers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// The section has no container in the view.
    #[error("No container for section {section}")]
    UnknownSection { section: String },

    /// A position is outside the container or section list.
    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}

impl ViewError {
    /// Create an unknown-section error from any debuggable identifier.
    pub fn unknown_section(section: &impl std::fmt::Debug) -> Self {
        Self::UnknownSection {
            section: format!("{section:?}"),
        }
    }

    /// Create an out-of-bounds error.
    pub fn out_of_bounds(index: usize, len: usize) -> Self {
        Self::IndexOutOfBounds { index, len }
    }
}
