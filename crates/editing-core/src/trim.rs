//! Trim coordination.
//!
//! Trimming an edge segment hides source time, and any keyframes in it.
//! Each track captures the value it needs, clears the hidden range, and
//! re-anchors a permanent keyframe on the new visible edge, all before
//! the segment flag moves. De-trimming runs the same steps in reverse.

use reframe_project_model::frame::time_to_frame;
use reframe_project_model::keyframe::{Interpolate, KeyframeOrigin};

use crate::error::EditResult;
use crate::segments::SegmentModel;
use crate::track::KeyframeTrack;

/// Which side of the clip a trimmed segment hides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimEdge {
    Start,
    End,
}

/// A track that follows trim transitions.
pub trait TrimAwareTrack {
    /// Short name for logs.
    fn label(&self) -> &'static str;

    /// Source time up to which this track has content.
    fn span_end(&self) -> f64;

    /// Source range `[hidden_start, hidden_end]` is about to be hidden and
    /// `boundary` becomes the visible edge on `edge`.
    fn reconstitute_for_trim(&mut self, hidden_start: f64, hidden_end: f64, boundary: f64, edge: TrimEdge);

    /// The edge at `current_boundary` is about to move back out to
    /// `restored_edge`.
    fn reconstitute_for_restore(&mut self, current_boundary: f64, restored_edge: f64);
}

/// Result of a successful trim toggle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimTransition {
    pub segment_index: usize,
    pub edge: TrimEdge,
    /// New trim state of the segment.
    pub trimmed: bool,
    /// Visible edge after the transition.
    pub boundary: f64,
}

/// Trim or de-trim edge segment `index`, keeping every track valid.
///
/// Nothing is modified when the toggle is rejected.
pub fn toggle_trim(
    segments: &mut SegmentModel,
    tracks: &mut [&mut dyn TrimAwareTrack],
    index: usize,
) -> EditResult<TrimTransition> {
    segments.check_trim_toggle(index)?;
    let segment = segments.segment(index)?.clone();
    let edge = if segment.is_first {
        TrimEdge::Start
    } else {
        TrimEdge::End
    };
    let (inner, outer) = match edge {
        TrimEdge::Start => (segment.source_end, segment.source_start),
        TrimEdge::End => (segment.source_start, segment.source_end),
    };

    let boundary = if segment.is_trimmed {
        for track in tracks.iter_mut() {
            tracing::debug!(track = track.label(), from = inner, to = outer, "Restoring edge");
            track.reconstitute_for_restore(inner, outer);
        }
        outer
    } else {
        for track in tracks.iter_mut() {
            tracing::debug!(
                track = track.label(),
                span_end = track.span_end(),
                boundary = inner,
                "Reconstituting edge"
            );
            track.reconstitute_for_trim(segment.source_start, segment.source_end, inner, edge);
        }
        inner
    };

    let trimmed = segments.toggle_trim_segment(index)?;
    tracing::info!(index, ?edge, trimmed, boundary, "Trim toggled");
    Ok(TrimTransition {
        segment_index: index,
        edge,
        trimmed,
        boundary,
    })
}

/// Capture, clear, and re-anchor one track for a newly hidden range.
///
/// The captured value is the user keyframe reaching furthest into the
/// hidden range, or the interpolated value at its far edge.
pub fn trim_track<T: Interpolate>(
    track: &mut KeyframeTrack<T>,
    hidden_start: f64,
    hidden_end: f64,
    boundary: f64,
    edge: TrimEdge,
    duration: f64,
) {
    let far_edge = match edge {
        TrimEdge::Start => hidden_start,
        TrimEdge::End => hidden_end,
    };
    let captured = track
        .keyframe_furthest_into(hidden_start, hidden_end, edge)
        .map(|kf| kf.payload.clone())
        .or_else(|| track.interpolate(far_edge));

    let removed = track.delete_keyframes_in_range(hidden_start, hidden_end, duration);

    if let Some(value) = captured {
        track.add_or_update_keyframe_with_origin(boundary, value, duration, KeyframeOrigin::Permanent);
    }
    tracing::debug!(removed, boundary, "Track trimmed");
}

/// Move the permanent keyframe at `current_boundary` out to `restored_edge`.
pub fn restore_track<T: Interpolate>(
    track: &mut KeyframeTrack<T>,
    current_boundary: f64,
    restored_edge: f64,
    duration: f64,
) {
    let Some(value) = track.interpolate(current_boundary) else {
        return;
    };
    let frame = time_to_frame(current_boundary, track.framerate());
    if track.keyframe_at_frame(frame).is_some_and(|kf| kf.is_permanent()) {
        track.remove_frame(frame);
    }
    track.add_or_update_keyframe_with_origin(restored_edge, value, duration, KeyframeOrigin::Permanent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::CropTrack;
    use reframe_project_model::region::{AspectRatio, CropRect};

    fn sixty_second_clip() -> (SegmentModel, CropTrack) {
        let mut segments = SegmentModel::new(60.0, 30.0).unwrap();
        segments.add_boundary(40.0).unwrap();
        let mut crop = CropTrack::new(60.0, 30.0, 1920.0, 1080.0, AspectRatio::PORTRAIT);
        crop.ensure_boundary_keyframes(0.0, 60.0);
        (segments, crop)
    }

    fn toggle(
        segments: &mut SegmentModel,
        crop: &mut CropTrack,
        index: usize,
    ) -> EditResult<TrimTransition> {
        let mut tracks: [&mut dyn TrimAwareTrack; 1] = [crop];
        toggle_trim(segments, &mut tracks, index)
    }

    fn rect_at_x(x: f64) -> CropRect {
        CropRect::new(x, 0.0, 607.5, 1080.0)
    }

    #[test]
    fn test_trim_end_moves_keyframe_value_to_boundary() {
        let (mut segments, mut crop) = sixty_second_clip();
        crop.set_crop(50.0, rect_at_x(900.0));
        let in_effect = crop.crop_at(50.0).unwrap();

        let transition = toggle(&mut segments, &mut crop, 1).unwrap();
        assert_eq!(transition.edge, TrimEdge::End);
        assert!(transition.trimmed);
        assert_eq!(transition.boundary, 40.0);

        assert!(crop.track().keyframe_at_frame(1500).is_none());
        let boundary = crop.track().keyframe_at_frame(1200).unwrap();
        assert!(boundary.is_permanent());
        assert_eq!(boundary.payload, in_effect);
        assert!(crop.track().keyframe_at_frame(1800).is_none());
        assert!(segments.segments()[1].is_trimmed);
    }

    #[test]
    fn test_trim_then_restore_recovers_edge_value() {
        let (mut segments, mut crop) = sixty_second_clip();
        crop.set_crop(60.0, rect_at_x(1200.0));
        crop.set_crop(20.0, rect_at_x(300.0));
        let original_end = crop.crop_at(60.0).unwrap();

        toggle(&mut segments, &mut crop, 1).unwrap();
        let transition = toggle(&mut segments, &mut crop, 1).unwrap();
        assert!(!transition.trimmed);
        assert_eq!(transition.boundary, 60.0);

        assert_eq!(crop.crop_at(60.0).unwrap(), original_end);
        assert!(crop.track().keyframe_at_frame(1200).is_none());
        assert!(crop.track().keyframe_at_frame(1800).unwrap().is_permanent());
    }

    #[test]
    fn test_restore_carries_hidden_user_keyframe_to_edge() {
        let (mut segments, mut crop) = sixty_second_clip();
        crop.set_crop(60.0, rect_at_x(1200.0));
        crop.set_crop(50.0, rect_at_x(900.0));
        let hidden = crop.crop_at(50.0).unwrap();
        let old_end = crop.crop_at(60.0).unwrap();
        assert_ne!(hidden, old_end);

        toggle(&mut segments, &mut crop, 1).unwrap();
        assert_eq!(crop.crop_at(40.0).unwrap(), hidden);

        let transition = toggle(&mut segments, &mut crop, 1).unwrap();
        assert!(!transition.trimmed);
        assert_eq!(transition.boundary, 60.0);

        let end = crop.track().keyframe_at_frame(1800).unwrap();
        assert!(end.is_permanent());
        assert_eq!(end.payload, hidden);
        assert!(crop.track().keyframe_at_frame(1500).is_none());
        assert!(crop.track().keyframe_at_frame(1200).is_none());
    }

    #[test]
    fn test_trim_start_captures_earliest_user_keyframe() {
        let mut segments = SegmentModel::new(60.0, 30.0).unwrap();
        segments.add_boundary(10.0).unwrap();
        let mut crop = CropTrack::new(60.0, 30.0, 1920.0, 1080.0, AspectRatio::PORTRAIT);
        crop.ensure_boundary_keyframes(0.0, 60.0);
        crop.set_crop(2.0, rect_at_x(100.0));
        crop.set_crop(8.0, rect_at_x(800.0));

        let transition = toggle(&mut segments, &mut crop, 0).unwrap();
        assert_eq!(transition.edge, TrimEdge::Start);
        assert_eq!(transition.boundary, 10.0);

        let kf = crop.track().keyframe_at_frame(300).unwrap();
        assert!(kf.is_permanent());
        assert!((kf.payload.x - 100.0).abs() < 1e-9);
        assert!(crop.track().keyframe_at_frame(0).is_none());
    }

    #[test]
    fn test_rejected_toggle_leaves_tracks_alone() {
        let mut segments = SegmentModel::new(60.0, 30.0).unwrap();
        segments.add_boundary(20.0).unwrap();
        segments.add_boundary(40.0).unwrap();
        let mut crop = CropTrack::new(60.0, 30.0, 1920.0, 1080.0, AspectRatio::PORTRAIT);
        crop.ensure_boundary_keyframes(0.0, 60.0);
        crop.set_crop(30.0, rect_at_x(500.0));
        let before = crop.clone();

        assert!(toggle(&mut segments, &mut crop, 1).is_err());
        assert_eq!(crop, before);
        assert!(segments.trim_range().is_none());
    }
}
