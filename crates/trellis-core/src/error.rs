//! Error types for Trellis core systems.

use crate::idle::IdleSourceId;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, IdleError>;

/// Errors raised by the cooperative idle scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdleError {
    /// The source ID is invalid or the source has already finished.
    #[error("Idle source {0:?} is not registered")]
    UnknownSource(IdleSourceId),

    /// Sources were still registered after the allowed number of ticks.
    #[error("Idle sources still pending after {ticks} ticks ({remaining} remaining)")]
    TickLimitExceeded { ticks: usize, remaining: usize },
}

impl IdleError {
    /// Create a tick limit error.
    pub fn tick_limit(ticks: usize, remaining: usize) -> Self {
        Self::TickLimitExceeded { ticks, remaining }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IdleError::tick_limit(5, 2);
        assert_eq!(
            err.to_string(),
            "Idle sources still pending after 5 ticks (2 remaining)"
        );
    }
}
