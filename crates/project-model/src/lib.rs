//! Reframe Project Model
//!
//! Defines the core data contracts for Reframe projects:
//! - **Frames:** Canonical second/frame conversions and keyframe lookup
//! - **Keyframes:** Frame-domain keyframes (persisted) and time-domain
//!   keyframes (handed to renderers)
//! - **Regions:** Crop rectangles, highlight ellipses, aspect ratios
//! - **Segments:** Persisted segment boundaries, speeds, and trim range
//! - **Project:** Top-level metadata and per-clip snapshots
//!
//! Region coordinates are in source-video pixels. Keyframes are stored by
//! frame index so they survive framerate-independent time rounding.

pub mod frame;
pub mod keyframe;
pub mod project;
pub mod region;
pub mod segment;

pub use frame::*;
pub use keyframe::*;
pub use project::*;
pub use region::*;
pub use segment::*;
