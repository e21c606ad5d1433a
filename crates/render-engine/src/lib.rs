//! Reframe Render Engine
//!
//! The renderer-facing side of the editor. Nothing here draws pixels;
//! it turns editing state into what a renderer consumes.
//!
//! # Pipeline Architecture
//!
//! ```text
//! live ClipEditor ────┐
//!                     ├── filter keyframes to trim (+1 context each side)
//! saved ClipSnapshots ┘         │
//!                               ├── SegmentExportData (seconds)
//!                               ▼
//!                         ExportRequest ── validate ──► RenderBackend
//!                                                         │
//!                                                         ▼
//!                                                   request.json
//! ```
//!
//! [`compositor::compute_frame_plan`] samples the same state per output
//! frame for previews and parity checks.

pub mod compositor;
pub mod export;

pub use compositor::{compute_frame_plan, FramePlan, FramePlanEntry};
pub use export::*;
