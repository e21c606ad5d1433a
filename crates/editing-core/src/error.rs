//! Edit rejection errors.

use reframe_common::error::ReframeError;

/// Why an edit was rejected. State is never modified when one is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("source duration must be positive, got {duration}")]
    InvalidDuration { duration: f64 },

    #[error("segment index {index} out of range ({count} segments)")]
    SegmentIndexOutOfRange { index: usize, count: usize },

    #[error("segment {index} is trimmed")]
    SegmentTrimmed { index: usize },

    #[error("segment {index} is not an edge segment")]
    NotEdgeSegment { index: usize },

    #[error("trimming segment {index} would hide the whole clip")]
    WouldHideEverything { index: usize },

    #[error("boundary at {time:.3}s is outside the source")]
    BoundaryOutOfRange { time: f64 },

    #[error("boundary at {time:.3}s coincides with an existing boundary")]
    DuplicateBoundary { time: f64 },

    #[error("invalid speed multiplier {speed}")]
    InvalidSpeed { speed: f64 },

    #[error("no keyframe near {time:.3}s")]
    KeyframeNotFound { time: f64 },

    #[error("nothing has been copied")]
    EmptyClipboard,

    #[error("invalid highlight duration {duration}")]
    InvalidHighlightDuration { duration: f64 },

    #[error("unknown clip {id}")]
    UnknownClip { id: String },

    #[error("invalid segment snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type alias for edit operations.
pub type EditResult<T> = Result<T, EditError>;

/// Log a rejected edit and return it as an error.
pub(crate) fn rejected<T>(err: EditError) -> EditResult<T> {
    tracing::warn!(error = %err, "Edit rejected");
    Err(err)
}

impl From<EditError> for ReframeError {
    fn from(err: EditError) -> Self {
        match err {
            EditError::UnknownClip { id } => ReframeError::UnknownClip { id },
            other => ReframeError::edit(other.to_string()),
        }
    }
}
