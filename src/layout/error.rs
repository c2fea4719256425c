//! Error types for the anchor layout engine

use thiserror::Error;

use super::tree::ViewId;

/// Errors that can occur while building or resolving anchor assertions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Basepoint built from baselines that do not span both axes
    #[error("invalid anchor combination '{anchor}': {reason}")]
    InvalidAnchorCombination { anchor: String, reason: String },

    /// A target or reference view is not (or no longer) part of the tree
    #[error("dangling reference to view {view}")]
    DanglingReference { view: ViewId },

    /// A layout pass was triggered again while it was still running
    #[error("re-entrant layout pass on container {container}")]
    ReentrantLayoutPass { container: ViewId },

    /// Tree operation on a view that does not exist
    #[error("view {view} not found")]
    ViewNotFound { view: ViewId },

    /// The container's participant is already borrowed by the caller
    #[error("layout participant of container {container} is busy")]
    ParticipantBusy { container: ViewId },

    /// Nested layout went deeper than the configured limit
    #[error("layout of view {view} exceeds the nesting limit of {limit}")]
    DepthExceeded { view: ViewId, limit: usize },
}

impl LayoutError {
    /// Create an invalid anchor combination error
    pub fn invalid_combination(anchor: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAnchorCombination {
            anchor: anchor.into(),
            reason: reason.into(),
        }
    }

    /// Create a dangling reference error
    pub fn dangling(view: ViewId) -> Self {
        Self::DanglingReference { view }
    }

    /// Create a re-entrant layout pass error
    pub fn reentrant(container: ViewId) -> Self {
        Self::ReentrantLayoutPass { container }
    }

    /// Create a busy participant error
    pub fn busy(container: ViewId) -> Self {
        Self::ParticipantBusy { container }
    }

    /// Create a view not found error
    pub fn not_found(view: ViewId) -> Self {
        Self::ViewNotFound { view }
    }

    /// Get the view this error is about, if any
    pub fn view(&self) -> Option<ViewId> {
        match self {
            Self::DanglingReference { view } => Some(*view),
            Self::ReentrantLayoutPass { container } | Self::ParticipantBusy { container } => {
                Some(*container)
            }
            Self::ViewNotFound { view } => Some(*view),
            Self::DepthExceeded { view, .. } => Some(*view),
            Self::InvalidAnchorCombination { .. } => None,
        }
    }

    /// Whether this error aborts the pass it occurred in under the default policy
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::DanglingReference { .. })
    }
}
