//! Per-clip editor: one segment model plus its crop and highlight tracks.

use reframe_common::config::EditorDefaults;
use reframe_project_model::frame::{sanitize_framerate, FRAME_TOLERANCE};
use reframe_project_model::project::{ClipSnapshot, SourceMedia};
use reframe_project_model::region::{AspectRatio, CropRect, HighlightRegion};

use crate::crop::CropTrack;
use crate::error::{rejected, EditError, EditResult};
use crate::highlight::{HighlightStyle, HighlightTrack};
use crate::segments::SegmentModel;
use crate::track::RemoveOutcome;
use crate::trim::{toggle_trim, TrimAwareTrack, TrimTransition};

/// Knobs shared by every clip editor in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    /// Playhead distance, in frames, at which a keyframe counts as selected.
    pub frame_tolerance: i64,
    pub highlight: HighlightStyle,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            frame_tolerance: FRAME_TOLERANCE,
            highlight: HighlightStyle::default(),
        }
    }
}

impl EditorSettings {
    pub fn from_defaults(defaults: &EditorDefaults) -> Self {
        Self {
            frame_tolerance: defaults.frame_tolerance.max(0),
            highlight: HighlightStyle::from_defaults(defaults),
        }
    }
}

/// The live editing state of one clip.
#[derive(Debug, Clone)]
pub struct ClipEditor {
    id: String,
    name: String,
    source: SourceMedia,
    settings: EditorSettings,
    segments: SegmentModel,
    crop: CropTrack,
    highlight: HighlightTrack,
}

impl ClipEditor {
    /// Fresh state for a clip that has never been edited.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source: SourceMedia,
        aspect: AspectRatio,
        settings: EditorSettings,
    ) -> EditResult<Self> {
        let mut snapshot = ClipSnapshot::new(name, source);
        snapshot.id = id.into();
        Self::from_snapshot(&snapshot, aspect, settings)
    }

    /// Hydrate from a saved clip and re-establish permanent keyframes at
    /// the visible edges.
    pub fn from_snapshot(
        snapshot: &ClipSnapshot,
        aspect: AspectRatio,
        settings: EditorSettings,
    ) -> EditResult<Self> {
        let source = snapshot.source.clone();
        let duration = source.duration_secs;
        let fps = sanitize_framerate(source.framerate);
        let (width, height) = (f64::from(source.width), f64::from(source.height));

        let segments = match &snapshot.segments {
            Some(saved) => SegmentModel::from_snapshot(saved, duration, fps)?,
            None => SegmentModel::new(duration, fps)?,
        };
        let crop = CropTrack::from_keyframes(
            snapshot.crop_keyframes.clone(),
            duration,
            fps,
            width,
            height,
            aspect,
        );
        let highlight = HighlightTrack::from_snapshot(
            &snapshot.highlight,
            duration,
            fps,
            width,
            height,
            settings.highlight.clone(),
        );

        let mut editor = Self {
            id: snapshot.id.clone(),
            name: snapshot.name.clone(),
            source,
            settings,
            segments,
            crop,
            highlight,
        };
        editor.ensure_boundary_keyframes();
        tracing::debug!(
            clip = %editor.id,
            segments = editor.segments.segments().len(),
            crop_keyframes = editor.crop.keyframes().len(),
            "Clip hydrated"
        );
        Ok(editor)
    }

    /// Saveable state of this clip.
    pub fn to_snapshot(&self) -> ClipSnapshot {
        ClipSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            source: self.source.clone(),
            crop_keyframes: self.crop.keyframes().to_vec(),
            highlight: self.highlight.to_snapshot(),
            segments: Some(self.segments.to_snapshot()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &SourceMedia {
        &self.source
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn framerate(&self) -> f64 {
        self.segments.framerate()
    }

    pub fn duration(&self) -> f64 {
        self.segments.source_duration()
    }

    pub fn segments(&self) -> &SegmentModel {
        &self.segments
    }

    pub fn crop(&self) -> &CropTrack {
        &self.crop
    }

    pub fn highlight(&self) -> &HighlightTrack {
        &self.highlight
    }

    /// Split the segment under `source_time`. Returns the new boundary's
    /// segment index.
    pub fn add_boundary(&mut self, source_time: f64) -> EditResult<usize> {
        self.segments.add_boundary(source_time)
    }

    pub fn remove_boundary(&mut self, index: usize) -> EditResult<()> {
        self.segments.remove_boundary(index)
    }

    pub fn set_segment_speed(&mut self, index: usize, multiplier: f64) -> EditResult<()> {
        self.segments.set_segment_speed(index, multiplier)
    }

    /// Trim or restore an edge segment, carrying both tracks along.
    pub fn toggle_trim(&mut self, index: usize) -> EditResult<TrimTransition> {
        let mut tracks: [&mut dyn TrimAwareTrack; 2] = [&mut self.crop, &mut self.highlight];
        toggle_trim(&mut self.segments, &mut tracks, index)
    }

    /// Set the crop at the playhead. Times in hidden regions clamp to the
    /// visible range.
    pub fn set_crop(&mut self, time: f64, rect: CropRect) -> usize {
        let time = self.segments.clamp_to_visible_range(time);
        self.crop.set_crop(time, rect)
    }

    pub fn crop_at(&self, time: f64) -> Option<CropRect> {
        self.crop.crop_at(time)
    }

    pub fn selected_crop_keyframe(&self, current_time: f64) -> Option<usize> {
        self.crop
            .selected_index(current_time, self.settings.frame_tolerance)
    }

    /// Delete the crop keyframe under the playhead.
    pub fn delete_crop_keyframe(&mut self, current_time: f64) -> EditResult<RemoveOutcome> {
        match self
            .crop
            .remove_crop(current_time, self.settings.frame_tolerance)
        {
            RemoveOutcome::NotFound => rejected(EditError::KeyframeNotFound { time: current_time }),
            outcome => Ok(outcome),
        }
    }

    pub fn copy_crop(&mut self, time: f64) -> Option<CropRect> {
        self.crop.copy_crop(time)
    }

    pub fn paste_crop(&mut self, time: f64) -> EditResult<usize> {
        let time = self.segments.clamp_to_visible_range(time);
        match self.crop.paste_crop(time) {
            Some(index) => Ok(index),
            None => rejected(EditError::EmptyClipboard),
        }
    }

    pub fn set_target_aspect(&mut self, aspect: AspectRatio) {
        self.crop.set_aspect(aspect);
    }

    pub fn set_highlight_enabled(&mut self, enabled: bool) {
        self.highlight.set_enabled(enabled);
    }

    pub fn set_highlight_duration(&mut self, duration: f64) -> EditResult<()> {
        self.highlight.set_duration(duration)?;
        self.ensure_boundary_keyframes();
        Ok(())
    }

    pub fn set_highlight(&mut self, time: f64, region: HighlightRegion) -> usize {
        let time = self.segments.clamp_to_visible_range(time);
        self.highlight.set_region(time, region)
    }

    pub fn highlight_at(&self, time: f64) -> Option<HighlightRegion> {
        self.highlight.region_at(time)
    }

    pub fn selected_highlight_keyframe(&self, current_time: f64) -> Option<usize> {
        self.highlight
            .selected_index(current_time, self.settings.frame_tolerance)
    }

    pub fn delete_highlight_keyframe(&mut self, current_time: f64) -> EditResult<RemoveOutcome> {
        match self
            .highlight
            .remove_region(current_time, self.settings.frame_tolerance)
        {
            RemoveOutcome::NotFound => rejected(EditError::KeyframeNotFound { time: current_time }),
            outcome => Ok(outcome),
        }
    }

    pub fn copy_highlight(&mut self, time: f64) -> Option<HighlightRegion> {
        self.highlight.copy_region(time)
    }

    pub fn paste_highlight(&mut self, time: f64) -> EditResult<usize> {
        let time = self.segments.clamp_to_visible_range(time);
        match self.highlight.paste_region(time) {
            Some(index) => Ok(index),
            None => rejected(EditError::EmptyClipboard),
        }
    }

    /// Where a seek to `source_time` actually lands.
    pub fn clamp_seek(&self, source_time: f64) -> f64 {
        self.segments.clamp_to_visible_range(source_time)
    }

    /// Playback speed at `source_time`.
    pub fn playback_rate_at(&self, source_time: f64) -> f64 {
        self.segments
            .get_segment_at_time(source_time)
            .speed_multiplier
    }

    pub fn visual_duration(&self) -> f64 {
        self.segments.visual_duration()
    }

    pub fn source_to_visual(&self, source_time: f64) -> f64 {
        self.segments.source_time_to_visual_time(source_time)
    }

    pub fn visual_to_source(&self, visual_time: f64) -> f64 {
        self.segments.visual_time_to_source_time(visual_time)
    }

    fn ensure_boundary_keyframes(&mut self) {
        let (start, end) = (self.segments.visible_start(), self.segments.visible_end());
        self.crop.ensure_boundary_keyframes(start, end);
        self.highlight.ensure_boundary_keyframes(start, end);
    }
}
