//! Highlight track: an elliptical overlay with its own enable flag and
//! duration.
//!
//! The highlight runs from source time 0 to its duration, which never
//! exceeds the source. Outside that span, or while disabled, nothing is
//! drawn.

use reframe_common::config::EditorDefaults;
use reframe_project_model::frame::time_to_frame;
use reframe_project_model::keyframe::{Keyframe, KeyframeOrigin};
use reframe_project_model::project::HighlightSnapshot;
use reframe_project_model::region::HighlightRegion;

use crate::error::{rejected, EditError, EditResult};
use crate::track::{KeyframeTrack, RemoveOutcome};
use crate::trim::{restore_track, trim_track, TrimAwareTrack, TrimEdge};

/// Look of a freshly placed highlight.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightStyle {
    /// Radius as a fraction of the source height.
    pub radius_ratio: f64,
    pub color: String,
    pub opacity: f64,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            radius_ratio: 0.08,
            color: "#FFFF00".to_string(),
            opacity: 0.15,
        }
    }
}

impl HighlightStyle {
    pub fn from_defaults(defaults: &EditorDefaults) -> Self {
        Self {
            radius_ratio: defaults.highlight_radius_ratio,
            color: defaults.highlight_color.clone(),
            opacity: defaults.highlight_opacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightTrack {
    track: KeyframeTrack<HighlightRegion>,
    enabled: bool,
    duration: f64,
    source_duration: f64,
    source_width: f64,
    source_height: f64,
    style: HighlightStyle,
}

impl HighlightTrack {
    /// A disabled highlight spanning the whole source.
    pub fn new(
        source_duration: f64,
        framerate: f64,
        source_width: f64,
        source_height: f64,
        style: HighlightStyle,
    ) -> Self {
        Self {
            track: KeyframeTrack::new(framerate),
            enabled: false,
            duration: source_duration,
            source_duration,
            source_width,
            source_height,
            style,
        }
    }

    pub fn from_snapshot(
        snapshot: &HighlightSnapshot,
        source_duration: f64,
        framerate: f64,
        source_width: f64,
        source_height: f64,
        style: HighlightStyle,
    ) -> Self {
        let duration = match snapshot.duration_secs {
            Some(d) if d.is_finite() && d > 0.0 => d.min(source_duration),
            Some(d) => {
                tracing::warn!(duration = d, "Ignoring invalid saved highlight duration");
                source_duration
            }
            None => source_duration,
        };
        Self {
            track: KeyframeTrack::from_keyframes(snapshot.keyframes.clone(), framerate),
            enabled: snapshot.enabled,
            duration,
            source_duration,
            source_width,
            source_height,
            style,
        }
    }

    pub fn to_snapshot(&self) -> HighlightSnapshot {
        let full = time_to_frame(self.duration, self.track.framerate())
            == time_to_frame(self.source_duration, self.track.framerate());
        HighlightSnapshot {
            enabled: self.enabled,
            duration_secs: (!full).then_some(self.duration),
            keyframes: self.track.keyframes().to_vec(),
        }
    }

    pub fn track(&self) -> &KeyframeTrack<HighlightRegion> {
        &self.track
    }

    pub fn keyframes(&self) -> &[Keyframe<HighlightRegion>] {
        self.track.keyframes()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        tracing::debug!(enabled, "Highlight toggled");
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn style(&self) -> &HighlightStyle {
        &self.style
    }

    /// Centered circle in the configured style.
    pub fn default_region(&self) -> HighlightRegion {
        HighlightRegion::centered(
            self.source_width,
            self.source_height,
            self.style.radius_ratio,
            self.style.color.clone(),
            self.style.opacity,
        )
    }

    /// Change how long the highlight lasts. Clamped to the source.
    ///
    /// Shrinking drops keyframes past the new end and pins the value in
    /// effect there; growing carries the old end value out to the new end.
    pub fn set_duration(&mut self, duration: f64) -> EditResult<()> {
        if !(duration.is_finite() && duration > 0.0) {
            return rejected(EditError::InvalidHighlightDuration { duration });
        }
        let new_end = duration.min(self.source_duration);
        let old_end = self.duration;
        let fps = self.track.framerate();
        let (new_frame, old_frame) = (time_to_frame(new_end, fps), time_to_frame(old_end, fps));

        if new_frame < old_frame {
            let held = self.track.interpolate(new_end);
            self.track.delete_keyframes_in_range(new_end, old_end, old_end);
            if let Some(value) = held {
                self.track.add_or_update_keyframe_with_origin(
                    new_end,
                    value,
                    new_end,
                    KeyframeOrigin::Permanent,
                );
            }
        } else if new_frame > old_frame {
            if let Some(value) = self.track.interpolate(old_end) {
                if self
                    .track
                    .keyframe_at_frame(old_frame)
                    .is_some_and(|kf| kf.is_permanent())
                {
                    self.track.remove_frame(old_frame);
                }
                self.track.add_or_update_keyframe_with_origin(
                    new_end,
                    value,
                    new_end,
                    KeyframeOrigin::Permanent,
                );
            }
        }

        self.duration = new_end;
        tracing::debug!(old_end, new_end, "Highlight duration changed");
        Ok(())
    }

    /// Place or update a highlight keyframe. Times past the highlight's
    /// duration clamp to its end.
    pub fn set_region(&mut self, time: f64, region: HighlightRegion) -> usize {
        let mut region = region;
        region.opacity = region.opacity.clamp(0.0, 1.0);
        let index = self.track.add_or_update_keyframe(time, region, self.duration);
        tracing::debug!(time, index, "Highlight keyframe set");
        index
    }

    /// The highlight drawn at `time`, if any.
    pub fn region_at(&self, time: f64) -> Option<HighlightRegion> {
        if !self.enabled || time > self.duration + 1e-9 {
            return None;
        }
        self.track.interpolate(time)
    }

    /// The interpolated region regardless of enable flag and span.
    pub fn value_at(&self, time: f64) -> Option<HighlightRegion> {
        self.track.interpolate(time)
    }

    pub fn remove_region(&mut self, time: f64, tolerance: i64) -> RemoveOutcome {
        let reset = self.default_region();
        self.track.remove_or_reset_keyframe(time, tolerance, reset)
    }

    pub fn selected_index(&self, time: f64, tolerance: i64) -> Option<usize> {
        self.track.selected_index(time, tolerance)
    }

    pub fn copy_region(&mut self, time: f64) -> Option<HighlightRegion> {
        self.track.copy_keyframe(time)
    }

    pub fn paste_region(&mut self, time: f64) -> Option<usize> {
        self.track.paste_keyframe(time, self.duration)
    }

    /// Guarantee permanent keyframes at the visible edges that fall
    /// inside the highlight's span.
    pub fn ensure_boundary_keyframes(&mut self, visible_start: f64, visible_end: f64) {
        let end = visible_end.min(self.duration);
        if visible_start >= end {
            return;
        }
        let fallback = self.default_region();
        self.track
            .ensure_boundary_keyframes(visible_start, end, self.duration, &fallback);
    }
}

impl TrimAwareTrack for HighlightTrack {
    fn label(&self) -> &'static str {
        "highlight"
    }

    fn span_end(&self) -> f64 {
        self.duration
    }

    fn reconstitute_for_trim(&mut self, hidden_start: f64, hidden_end: f64, boundary: f64, edge: TrimEdge) {
        if boundary >= self.duration {
            tracing::debug!(boundary, span_end = self.duration, "Trim lies beyond highlight");
            return;
        }
        let hidden_end = hidden_end.min(self.duration);
        trim_track(&mut self.track, hidden_start, hidden_end, boundary, edge, self.duration);
    }

    fn reconstitute_for_restore(&mut self, current_boundary: f64, restored_edge: f64) {
        if current_boundary >= self.duration {
            return;
        }
        let restored_edge = restored_edge.min(self.duration);
        restore_track(&mut self.track, current_boundary, restored_edge, self.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlight() -> HighlightTrack {
        let mut track = HighlightTrack::new(60.0, 30.0, 1920.0, 1080.0, HighlightStyle::default());
        track.set_enabled(true);
        track.ensure_boundary_keyframes(0.0, 60.0);
        track
    }

    fn region_at_x(x: f64) -> HighlightRegion {
        HighlightRegion {
            x,
            y: 540.0,
            radius_x: 80.0,
            radius_y: 80.0,
            opacity: 0.5,
            color: "#FF0000".to_string(),
        }
    }

    #[test]
    fn test_disabled_highlight_draws_nothing() {
        let mut track = highlight();
        assert!(track.region_at(1.0).is_some());
        track.set_enabled(false);
        assert!(track.region_at(1.0).is_none());
        assert!(track.value_at(1.0).is_some());
    }

    #[test]
    fn test_region_absent_past_duration() {
        let mut track = highlight();
        track.set_duration(20.0).unwrap();
        assert!(track.region_at(20.0).is_some());
        assert!(track.region_at(20.5).is_none());
    }

    #[test]
    fn test_shrink_pins_value_at_new_end() {
        let mut track = highlight();
        track.set_region(10.0, region_at_x(100.0));
        track.set_region(30.0, region_at_x(300.0));
        track.set_region(50.0, region_at_x(500.0));

        track.set_duration(40.0).unwrap();
        let frames: Vec<i64> = track.keyframes().iter().map(|kf| kf.frame).collect();
        assert_eq!(frames, vec![0, 300, 900, 1200]);
        let end = &track.keyframes()[3];
        assert!(end.is_permanent());
        assert!((end.payload.x - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_grow_carries_end_value() {
        let mut track = highlight();
        track.set_duration(20.0).unwrap();
        track.set_region(20.0, region_at_x(700.0));
        track.set_duration(45.0).unwrap();

        assert!(track.track().keyframe_at_frame(600).is_none());
        let end = track.track().keyframe_at_frame(1350).unwrap();
        assert!(end.is_permanent());
        assert!((end.payload.x - 700.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_is_clamped_and_validated() {
        let mut track = highlight();
        track.set_duration(500.0).unwrap();
        assert_eq!(track.duration(), 60.0);
        assert!(track.set_duration(0.0).is_err());
        assert!(track.set_duration(f64::NAN).is_err());
        assert_eq!(track.duration(), 60.0);
    }

    #[test]
    fn test_trim_beyond_span_is_skipped() {
        let mut track = highlight();
        track.set_duration(30.0).unwrap();
        let before = track.clone();
        track.reconstitute_for_trim(40.0, 60.0, 40.0, TrimEdge::End);
        assert_eq!(track, before);
    }

    #[test]
    fn test_trim_is_clipped_to_span() {
        let mut track = highlight();
        track.set_duration(50.0).unwrap();
        track.set_region(45.0, region_at_x(450.0));
        track.reconstitute_for_trim(40.0, 60.0, 40.0, TrimEdge::End);

        let frames: Vec<i64> = track.keyframes().iter().map(|kf| kf.frame).collect();
        assert_eq!(frames, vec![0, 1200]);
        assert!((track.keyframes()[1].payload.x - 450.0).abs() < 1e-9);

        track.reconstitute_for_restore(40.0, 60.0);
        let end = track.track().keyframe_at_frame(1500).unwrap();
        assert!(end.is_permanent());
        assert!((end.payload.x - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_omits_full_duration() {
        let mut track = highlight();
        assert_eq!(track.to_snapshot().duration_secs, None);
        track.set_duration(12.0).unwrap();
        let snap = track.to_snapshot();
        assert_eq!(snap.duration_secs, Some(12.0));

        let restored =
            HighlightTrack::from_snapshot(&snap, 60.0, 30.0, 1920.0, 1080.0, HighlightStyle::default());
        assert_eq!(restored.duration(), 12.0);
        assert!(restored.is_enabled());
        assert_eq!(restored.keyframes(), track.keyframes());
    }
}
