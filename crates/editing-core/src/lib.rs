//! Reframe Editing Core
//!
//! The synchronous engine behind the editor:
//! - **Segments:** Piecewise source-time to visual-time remapping with
//!   per-segment speed and edge trimming
//! - **Keyframe tracks:** Frame-quantized animation curves with permanent
//!   boundary keyframes
//! - **Crop / Highlight:** Track specializations for reframing and overlays
//! - **Trim coordination:** Keeps both tracks valid across trim/de-trim
//! - **Clip editor / session:** The per-clip triple and the active-clip
//!   save/load transaction
//!
//! This crate is pure computation with no I/O, async, or platform
//! dependencies. Rejected edits return [`EditError`] and leave state
//! untouched.

pub mod crop;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod segments;
pub mod session;
pub mod track;
pub mod trim;

pub use crop::CropTrack;
pub use editor::{ClipEditor, EditorSettings};
pub use error::{EditError, EditResult};
pub use highlight::{HighlightStyle, HighlightTrack};
pub use segments::{Segment, SegmentModel};
pub use session::EditSession;
pub use track::{KeyframeTrack, RemoveOutcome};
pub use trim::{TrimAwareTrack, TrimEdge, TrimTransition};
