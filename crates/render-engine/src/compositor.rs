//! Frame plan: what every output frame shows.
//!
//! Output frames are laid out on the visual timeline. Each one maps back
//! to a source time and samples the crop and highlight tracks there, which
//! is exactly what a renderer has to reproduce.

use serde::Serialize;

use reframe_common::error::{ReframeError, ReframeResult};
use reframe_editing_core::ClipEditor;
use reframe_project_model::region::{CropRect, HighlightRegion};

/// A single frame's composition instructions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramePlanEntry {
    /// Output frame number.
    pub output_frame: u64,

    /// Time on the edited timeline.
    pub visual_time: f64,

    /// Source time shown in this frame.
    pub source_time: f64,

    /// Region cropped from the source.
    pub crop: Option<CropRect>,

    /// Highlight overlay, when enabled and in span.
    pub highlight: Option<HighlightRegion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramePlan {
    pub clip_id: String,
    pub output_fps: f64,
    pub visual_duration: f64,
    pub frames: Vec<FramePlanEntry>,
}

impl FramePlan {
    /// Number of frames in which the source time steps faster than real time.
    pub fn sped_up_frames(&self) -> usize {
        let step = 1.0 / self.output_fps;
        self.frames
            .windows(2)
            .filter(|w| w[1].source_time - w[0].source_time > step + 1e-9)
            .count()
    }

    /// Frames with a highlight drawn.
    pub fn highlighted_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.highlight.is_some()).count()
    }
}

/// Sample every output frame of the clip's visual timeline.
pub fn compute_frame_plan(editor: &ClipEditor, output_fps: f64) -> ReframeResult<FramePlan> {
    if !(output_fps.is_finite() && output_fps > 0.0) {
        return Err(ReframeError::render(format!(
            "Output framerate must be positive, got {output_fps}"
        )));
    }

    let visual_duration = editor.visual_duration();
    let total_frames = (visual_duration * output_fps).ceil() as u64;
    let mut frames = Vec::with_capacity(total_frames as usize);

    for frame in 0..total_frames {
        let visual_time = frame as f64 / output_fps;
        let source_time = editor.visual_to_source(visual_time);
        frames.push(FramePlanEntry {
            output_frame: frame,
            visual_time,
            source_time,
            crop: editor.crop_at(source_time),
            highlight: editor.highlight_at(source_time),
        });
    }

    tracing::debug!(
        clip = editor.id(),
        frames = frames.len(),
        output_fps,
        "Frame plan computed"
    );

    Ok(FramePlan {
        clip_id: editor.id().to_string(),
        output_fps,
        visual_duration,
        frames,
    })
}
