//! Crop track: the reframing window over time.

use reframe_project_model::keyframe::Keyframe;
use reframe_project_model::region::{AspectRatio, CropRect};

use crate::track::{KeyframeTrack, RemoveOutcome};
use crate::trim::{restore_track, trim_track, TrimAwareTrack, TrimEdge};

/// Crop keyframes constrained to one aspect ratio inside the source frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CropTrack {
    track: KeyframeTrack<CropRect>,
    aspect: AspectRatio,
    source_width: f64,
    source_height: f64,
    duration: f64,
}

impl CropTrack {
    pub fn new(
        duration: f64,
        framerate: f64,
        source_width: f64,
        source_height: f64,
        aspect: AspectRatio,
    ) -> Self {
        Self {
            track: KeyframeTrack::new(framerate),
            aspect,
            source_width,
            source_height,
            duration,
        }
    }

    /// Hydrate from saved keyframes, re-constraining each to `aspect`.
    pub fn from_keyframes(
        keyframes: Vec<Keyframe<CropRect>>,
        duration: f64,
        framerate: f64,
        source_width: f64,
        source_height: f64,
        aspect: AspectRatio,
    ) -> Self {
        let mut crop = Self {
            track: KeyframeTrack::from_keyframes(keyframes, framerate),
            aspect,
            source_width,
            source_height,
            duration,
        };
        crop.reconstrain();
        crop
    }

    pub fn track(&self) -> &KeyframeTrack<CropRect> {
        &self.track
    }

    pub fn aspect(&self) -> AspectRatio {
        self.aspect
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The largest centered crop of the current aspect ratio.
    pub fn default_crop(&self) -> CropRect {
        CropRect::centered_for_aspect(self.source_width, self.source_height, self.aspect)
    }

    /// Place or update a crop keyframe. The rect is constrained to the
    /// aspect ratio and the source bounds first.
    pub fn set_crop(&mut self, time: f64, rect: CropRect) -> usize {
        let rect = self.constrain(&rect);
        let index = self.track.add_or_update_keyframe(time, rect, self.duration);
        tracing::debug!(time, index, "Crop keyframe set");
        index
    }

    /// The crop in effect at `time`.
    pub fn crop_at(&self, time: f64) -> Option<CropRect> {
        self.track.interpolate(time)
    }

    /// Delete the keyframe under the playhead. Permanent keyframes fall
    /// back to the default crop instead of disappearing.
    pub fn remove_crop(&mut self, time: f64, tolerance: i64) -> RemoveOutcome {
        let reset = self.default_crop();
        self.track.remove_or_reset_keyframe(time, tolerance, reset)
    }

    pub fn selected_index(&self, time: f64, tolerance: i64) -> Option<usize> {
        self.track.selected_index(time, tolerance)
    }

    pub fn copy_crop(&mut self, time: f64) -> Option<CropRect> {
        self.track.copy_keyframe(time)
    }

    pub fn paste_crop(&mut self, time: f64) -> Option<usize> {
        self.track.paste_keyframe(time, self.duration)
    }

    /// Switch aspect ratio, re-constraining every keyframe around its center.
    pub fn set_aspect(&mut self, aspect: AspectRatio) {
        if aspect == self.aspect {
            return;
        }
        self.aspect = aspect;
        self.reconstrain();
        tracing::debug!(%aspect, keyframes = self.track.len(), "Crop aspect changed");
    }

    /// Guarantee permanent keyframes at the visible edges.
    pub fn ensure_boundary_keyframes(&mut self, visible_start: f64, visible_end: f64) {
        let fallback = self.default_crop();
        self.track
            .ensure_boundary_keyframes(visible_start, visible_end, self.duration, &fallback);
    }

    pub fn keyframes(&self) -> &[Keyframe<CropRect>] {
        self.track.keyframes()
    }

    fn constrain(&self, rect: &CropRect) -> CropRect {
        rect.constrained_to_aspect(self.aspect, self.source_width, self.source_height)
    }

    fn reconstrain(&mut self) {
        let (aspect, w, h) = (self.aspect, self.source_width, self.source_height);
        self.track
            .map_payloads(|rect| rect.constrained_to_aspect(aspect, w, h));
    }
}

impl TrimAwareTrack for CropTrack {
    fn label(&self) -> &'static str {
        "crop"
    }

    fn span_end(&self) -> f64 {
        self.duration
    }

    fn reconstitute_for_trim(&mut self, hidden_start: f64, hidden_end: f64, boundary: f64, edge: TrimEdge) {
        trim_track(&mut self.track, hidden_start, hidden_end, boundary, edge, self.duration);
    }

    fn reconstitute_for_restore(&mut self, current_boundary: f64, restored_edge: f64) {
        restore_track(&mut self.track, current_boundary, restored_edge, self.duration);
    }
}
