//! Segment model: the source-time to visual-time remapper.
//!
//! The source duration is partitioned into contiguous segments. Each has
//! a speed multiplier; the first and last may be trimmed, which keeps the
//! segment but drops its contribution to the visual timeline. The visual
//! timeline is always derived, never stored.

use reframe_project_model::frame::{snap_to_frame, time_to_frame};
use reframe_project_model::segment::{SegmentSnapshot, TrimRange};

use crate::error::{rejected, EditError, EditResult};

/// A contiguous range of source time.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub source_start: f64,
    pub source_end: f64,
    pub speed_multiplier: f64,
    pub is_trimmed: bool,
    pub is_first: bool,
    pub is_last: bool,
}

impl Segment {
    fn new(source_start: f64, source_end: f64, speed_multiplier: f64) -> Self {
        Self {
            index: 0,
            source_start,
            source_end,
            speed_multiplier,
            is_trimmed: false,
            is_first: false,
            is_last: false,
        }
    }

    /// Length in source seconds.
    pub fn source_len(&self) -> f64 {
        self.source_end - self.source_start
    }

    /// Length on the visual timeline; zero when trimmed.
    pub fn visual_len(&self) -> f64 {
        if self.is_trimmed {
            0.0
        } else {
            self.source_len() / self.speed_multiplier
        }
    }

    /// Whether `time` is inside this segment (inclusive on both ends).
    pub fn contains(&self, time: f64) -> bool {
        time >= self.source_start && time <= self.source_end
    }

    fn distance_to(&self, time: f64) -> f64 {
        if time < self.source_start {
            self.source_start - time
        } else if time > self.source_end {
            time - self.source_end
        } else {
            0.0
        }
    }
}

/// Ordered segments covering `[0, source_duration]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentModel {
    source_duration: f64,
    framerate: f64,
    segments: Vec<Segment>,
}

impl SegmentModel {
    /// A single untrimmed 1x segment covering the source.
    pub fn new(source_duration: f64, framerate: f64) -> EditResult<Self> {
        let mut model = Self {
            source_duration: 0.0,
            framerate,
            segments: vec![],
        };
        model.initialize(source_duration)?;
        Ok(model)
    }

    /// Restore from the persisted shape.
    pub fn from_snapshot(
        snapshot: &SegmentSnapshot,
        source_duration: f64,
        framerate: f64,
    ) -> EditResult<Self> {
        let mut model = Self::new(source_duration, framerate)?;

        if let Some(problem) = snapshot.problems(source_duration).into_iter().next() {
            return rejected(EditError::InvalidSnapshot(problem));
        }

        let mut segments: Vec<Segment> = snapshot
            .boundaries
            .windows(2)
            .zip(&snapshot.segment_speeds)
            .map(|(w, speed)| Segment::new(w[0], w[1], *speed))
            .collect();
        if let Some(last) = segments.last_mut() {
            last.source_end = source_duration;
        }
        model.segments = segments;
        model.reindex();

        if let Some(trim) = snapshot.trim_range {
            let first_end = model.segments[0].source_end;
            let last_start = model.segments[model.segments.len() - 1].source_start;
            let trims_start = trim.start > 0.0 && model.same_frame(trim.start, first_end);
            let trims_end =
                trim.end < source_duration && model.same_frame(trim.end, last_start);

            let start_ok = trims_start || model.same_frame(trim.start, 0.0);
            let end_ok = trims_end || model.same_frame(trim.end, source_duration);
            if !start_ok || !end_ok {
                return rejected(EditError::InvalidSnapshot(format!(
                    "trim range {:.3}..{:.3} does not line up with edge segments",
                    trim.start, trim.end
                )));
            }

            let last = model.segments.len() - 1;
            model.segments[0].is_trimmed = trims_start;
            model.segments[last].is_trimmed = trims_end;
            if model.segments.iter().all(|s| s.is_trimmed) {
                return rejected(EditError::InvalidSnapshot(
                    "trim range hides every segment".to_string(),
                ));
            }
        }

        Ok(model)
    }

    /// Persisted shape of the current layout.
    pub fn to_snapshot(&self) -> SegmentSnapshot {
        SegmentSnapshot {
            boundaries: self.boundaries(),
            segment_speeds: self.segment_speeds(),
            trim_range: self.trim_range(),
        }
    }

    /// Reset to one full-length, untrimmed 1x segment.
    pub fn initialize(&mut self, source_duration: f64) -> EditResult<()> {
        if !(source_duration.is_finite() && source_duration > 0.0) {
            return rejected(EditError::InvalidDuration {
                duration: source_duration,
            });
        }
        self.source_duration = source_duration;
        self.segments = vec![Segment::new(0.0, source_duration, 1.0)];
        self.reindex();
        tracing::debug!(duration = source_duration, "Segments initialized");
        Ok(())
    }

    pub fn source_duration(&self) -> f64 {
        self.source_duration
    }

    pub fn framerate(&self) -> f64 {
        self.framerate
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> EditResult<&Segment> {
        match self.segments.get(index) {
            Some(segment) => Ok(segment),
            None => rejected(EditError::SegmentIndexOutOfRange {
                index,
                count: self.segments.len(),
            }),
        }
    }

    /// Split the containing segment at the frame nearest `source_time`.
    ///
    /// Both halves keep the original speed. Returns the index of the new
    /// right-hand segment.
    pub fn add_boundary(&mut self, source_time: f64) -> EditResult<usize> {
        if !source_time.is_finite() {
            return rejected(EditError::BoundaryOutOfRange { time: source_time });
        }
        let time = snap_to_frame(source_time, self.framerate);
        if time <= 0.0 || time >= self.source_duration {
            return rejected(EditError::BoundaryOutOfRange { time });
        }
        if self
            .segments
            .iter()
            .any(|s| self.same_frame(s.source_start, time) || self.same_frame(s.source_end, time))
        {
            return rejected(EditError::DuplicateBoundary { time });
        }

        let Some(index) = self
            .segments
            .iter()
            .position(|s| time > s.source_start && time < s.source_end)
        else {
            return rejected(EditError::BoundaryOutOfRange { time });
        };
        if self.segments[index].is_trimmed {
            return rejected(EditError::SegmentTrimmed { index });
        }

        let mut right = self.segments[index].clone();
        right.source_start = time;
        self.segments[index].source_end = time;
        self.segments.insert(index + 1, right);
        self.reindex();

        tracing::debug!(time, index, "Segment boundary added");
        Ok(index + 1)
    }

    /// Merge segment `index` with segment `index + 1`.
    ///
    /// The left segment's speed wins. Trimmed segments cannot be merged.
    pub fn remove_boundary(&mut self, index: usize) -> EditResult<()> {
        if index + 1 >= self.segments.len() {
            return rejected(EditError::SegmentIndexOutOfRange {
                index,
                count: self.segments.len(),
            });
        }
        for i in [index, index + 1] {
            if self.segments[i].is_trimmed {
                return rejected(EditError::SegmentTrimmed { index: i });
            }
        }

        let right = self.segments.remove(index + 1);
        self.segments[index].source_end = right.source_end;
        self.reindex();

        tracing::debug!(index, "Segment boundary removed");
        Ok(())
    }

    pub fn set_segment_speed(&mut self, index: usize, multiplier: f64) -> EditResult<()> {
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return rejected(EditError::InvalidSpeed { speed: multiplier });
        }
        if self.segment(index)?.is_trimmed {
            return rejected(EditError::SegmentTrimmed { index });
        }
        self.segments[index].speed_multiplier = multiplier;
        tracing::debug!(index, multiplier, "Segment speed changed");
        Ok(())
    }

    /// Check whether segment `index` may flip its trim flag.
    pub fn check_trim_toggle(&self, index: usize) -> EditResult<()> {
        let segment = self.segment(index)?;
        if !(segment.is_first || segment.is_last) {
            return rejected(EditError::NotEdgeSegment { index });
        }
        if !segment.is_trimmed {
            let other_visible = self
                .segments
                .iter()
                .filter(|s| s.index != index && !s.is_trimmed)
                .count();
            if other_visible == 0 {
                return rejected(EditError::WouldHideEverything { index });
            }
        }
        Ok(())
    }

    /// Flip the trim flag of an edge segment. Returns the new state.
    ///
    /// This only touches the segment list; use the trim coordinator when
    /// keyframe tracks must follow.
    pub fn toggle_trim_segment(&mut self, index: usize) -> EditResult<bool> {
        self.check_trim_toggle(index)?;
        let segment = &mut self.segments[index];
        segment.is_trimmed = !segment.is_trimmed;
        tracing::debug!(index, trimmed = segment.is_trimmed, "Segment trim toggled");
        Ok(segment.is_trimmed)
    }

    /// Total length of the visual timeline.
    pub fn visual_duration(&self) -> f64 {
        self.segments.iter().map(Segment::visual_len).sum()
    }

    /// Map a source time onto the visual timeline.
    ///
    /// Times inside a trimmed segment collapse onto the adjacent visible
    /// boundary. Out-of-range input clamps.
    pub fn source_time_to_visual_time(&self, source_time: f64) -> f64 {
        let t = clamp_or_zero(source_time, 0.0, self.source_duration);
        let mut visual = 0.0;
        for segment in &self.segments {
            if t >= segment.source_end {
                visual += segment.visual_len();
                continue;
            }
            if !segment.is_trimmed {
                visual += (t - segment.source_start).max(0.0) / segment.speed_multiplier;
            }
            break;
        }
        visual
    }

    /// Map a visual time back onto the source. Out-of-range input clamps.
    pub fn visual_time_to_source_time(&self, visual_time: f64) -> f64 {
        let v = clamp_or_zero(visual_time, 0.0, self.visual_duration());
        let mut elapsed = 0.0;
        for segment in self.segments.iter().filter(|s| !s.is_trimmed) {
            let len = segment.visual_len();
            if v <= elapsed + len {
                let source = segment.source_start + (v - elapsed) * segment.speed_multiplier;
                return source.min(segment.source_end);
            }
            elapsed += len;
        }
        self.visible_end()
    }

    /// First visible source time.
    pub fn visible_start(&self) -> f64 {
        self.segments
            .iter()
            .find(|s| !s.is_trimmed)
            .map_or(0.0, |s| s.source_start)
    }

    /// Last visible source time.
    pub fn visible_end(&self) -> f64 {
        self.segments
            .iter()
            .rev()
            .find(|s| !s.is_trimmed)
            .map_or(self.source_duration, |s| s.source_end)
    }

    /// Nearest source time inside a non-trimmed segment.
    pub fn clamp_to_visible_range(&self, source_time: f64) -> f64 {
        clamp_or_zero(source_time, self.visible_start(), self.visible_end())
    }

    /// The segment containing `source_time`, or the nearest visible one
    /// when that segment is trimmed.
    pub fn get_segment_at_time(&self, source_time: f64) -> &Segment {
        let t = clamp_or_zero(source_time, 0.0, self.source_duration);
        let containing = self
            .segments
            .iter()
            .find(|s| t >= s.source_start && t < s.source_end)
            .unwrap_or(&self.segments[self.segments.len() - 1]);
        if !containing.is_trimmed {
            return containing;
        }
        self.segments
            .iter()
            .filter(|s| !s.is_trimmed)
            .min_by(|a, b| a.distance_to(t).total_cmp(&b.distance_to(t)))
            .unwrap_or(containing)
    }

    /// Visible window, if an edge segment is trimmed.
    pub fn trim_range(&self) -> Option<TrimRange> {
        self.segments
            .iter()
            .any(|s| s.is_trimmed)
            .then(|| TrimRange::new(self.visible_start(), self.visible_end()))
    }

    /// Every boundary in source seconds, including 0 and the duration.
    pub fn boundaries(&self) -> Vec<f64> {
        std::iter::once(0.0)
            .chain(self.segments.iter().map(|s| s.source_end))
            .collect()
    }

    pub fn segment_speeds(&self) -> Vec<f64> {
        self.segments.iter().map(|s| s.speed_multiplier).collect()
    }

    fn same_frame(&self, a: f64, b: f64) -> bool {
        time_to_frame(a, self.framerate) == time_to_frame(b, self.framerate)
    }

    fn reindex(&mut self) {
        let last = self.segments.len().saturating_sub(1);
        for (i, segment) in self.segments.iter_mut().enumerate() {
            segment.index = i;
            segment.is_first = i == 0;
            segment.is_last = i == last;
        }
    }
}

fn clamp_or_zero(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max.max(min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(duration: f64) -> SegmentModel {
        SegmentModel::new(duration, 30.0).unwrap()
    }

    #[test]
    fn test_initialize_single_segment() {
        let m = model(60.0);
        assert_eq!(m.segments().len(), 1);
        let s = &m.segments()[0];
        assert!(s.is_first && s.is_last && !s.is_trimmed);
        assert_eq!(s.speed_multiplier, 1.0);
        assert_eq!(m.visual_duration(), 60.0);
    }

    #[test]
    fn test_initialize_rejects_bad_duration() {
        assert!(matches!(
            SegmentModel::new(0.0, 30.0),
            Err(EditError::InvalidDuration { .. })
        ));
        assert!(SegmentModel::new(f64::NAN, 30.0).is_err());
    }

    #[test]
    fn test_add_boundary_snaps_to_frame() {
        let mut m = model(60.0);
        let idx = m.add_boundary(30.01).unwrap();
        assert_eq!(idx, 1);
        assert!((m.segments()[0].source_end - 30.0).abs() < 1e-9);
        assert!((m.segments()[1].source_start - 30.0).abs() < 1e-9);
        assert!(m.segments()[0].is_first && m.segments()[1].is_last);
    }

    #[test]
    fn test_add_boundary_rejects_duplicate_and_edges() {
        let mut m = model(60.0);
        m.add_boundary(30.0).unwrap();
        let before = m.clone();
        assert!(matches!(
            m.add_boundary(30.01),
            Err(EditError::DuplicateBoundary { .. })
        ));
        assert!(m.add_boundary(0.0).is_err());
        assert!(m.add_boundary(60.0).is_err());
        assert!(m.add_boundary(-3.0).is_err());
        assert_eq!(m, before);
    }

    #[test]
    fn test_add_boundary_rejects_trimmed_segment() {
        let mut m = model(60.0);
        m.add_boundary(40.0).unwrap();
        m.toggle_trim_segment(1).unwrap();
        assert!(matches!(
            m.add_boundary(50.0),
            Err(EditError::SegmentTrimmed { index: 1 })
        ));
    }

    #[test]
    fn test_split_inherits_speed() {
        let mut m = model(60.0);
        m.set_segment_speed(0, 2.0).unwrap();
        m.add_boundary(20.0).unwrap();
        assert_eq!(m.segment_speeds(), vec![2.0, 2.0]);
    }

    #[test]
    fn test_remove_boundary_left_speed_wins() {
        let mut m = model(60.0);
        m.add_boundary(30.0).unwrap();
        m.set_segment_speed(0, 0.5).unwrap();
        m.set_segment_speed(1, 2.0).unwrap();
        m.remove_boundary(0).unwrap();
        assert_eq!(m.segments().len(), 1);
        assert_eq!(m.segments()[0].speed_multiplier, 0.5);
        assert_eq!(m.segments()[0].source_end, 60.0);
    }

    #[test]
    fn test_remove_boundary_rejects_trimmed_and_out_of_range() {
        let mut m = model(60.0);
        m.add_boundary(10.0).unwrap();
        m.add_boundary(50.0).unwrap();
        m.toggle_trim_segment(0).unwrap();
        assert!(matches!(
            m.remove_boundary(0),
            Err(EditError::SegmentTrimmed { index: 0 })
        ));
        assert!(matches!(
            m.remove_boundary(2),
            Err(EditError::SegmentIndexOutOfRange { .. })
        ));
        m.remove_boundary(1).unwrap();
        assert_eq!(m.boundaries(), vec![0.0, 10.0, 60.0]);
    }

    #[test]
    fn test_set_speed_validation() {
        let mut m = model(60.0);
        assert!(matches!(
            m.set_segment_speed(0, 0.0),
            Err(EditError::InvalidSpeed { .. })
        ));
        assert!(m.set_segment_speed(0, -1.0).is_err());
        assert!(m.set_segment_speed(0, f64::INFINITY).is_err());
        assert!(m.set_segment_speed(3, 2.0).is_err());
        m.add_boundary(30.0).unwrap();
        m.toggle_trim_segment(1).unwrap();
        assert!(matches!(
            m.set_segment_speed(1, 2.0),
            Err(EditError::SegmentTrimmed { index: 1 })
        ));
    }

    #[test]
    fn test_toggle_trim_rules() {
        let mut m = model(60.0);
        assert!(matches!(
            m.toggle_trim_segment(0),
            Err(EditError::WouldHideEverything { index: 0 })
        ));

        m.add_boundary(20.0).unwrap();
        m.add_boundary(40.0).unwrap();
        assert!(matches!(
            m.toggle_trim_segment(1),
            Err(EditError::NotEdgeSegment { index: 1 })
        ));

        assert!(m.toggle_trim_segment(0).unwrap());
        assert!(m.toggle_trim_segment(2).unwrap());
        assert_eq!(m.segments().len(), 3);
        assert!((m.visual_duration() - 20.0).abs() < 1e-9);
        assert_eq!(m.trim_range(), Some(TrimRange::new(20.0, 40.0)));

        assert!(!m.toggle_trim_segment(0).unwrap());
        assert_eq!(m.trim_range(), Some(TrimRange::new(0.0, 40.0)));
    }

    #[test]
    fn test_cannot_trim_both_edges_of_two_segments() {
        let mut m = model(60.0);
        m.add_boundary(30.0).unwrap();
        m.toggle_trim_segment(0).unwrap();
        assert!(matches!(
            m.toggle_trim_segment(1),
            Err(EditError::WouldHideEverything { index: 1 })
        ));
    }

    #[test]
    fn test_speed_mapping() {
        let mut m = model(60.0);
        m.add_boundary(30.0).unwrap();
        m.set_segment_speed(1, 2.0).unwrap();
        assert!((m.visual_duration() - 45.0).abs() < 1e-9);
        assert!((m.source_time_to_visual_time(45.0) - 37.5).abs() < 1e-9);
        assert!((m.visual_time_to_source_time(37.5) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_mapping_clamps_out_of_domain() {
        let mut m = model(60.0);
        m.add_boundary(30.0).unwrap();
        m.set_segment_speed(1, 2.0).unwrap();
        assert_eq!(m.source_time_to_visual_time(-5.0), 0.0);
        assert!((m.source_time_to_visual_time(100.0) - 45.0).abs() < 1e-9);
        assert_eq!(m.visual_time_to_source_time(-1.0), 0.0);
        assert!((m.visual_time_to_source_time(1000.0) - 60.0).abs() < 1e-9);
        assert_eq!(m.source_time_to_visual_time(f64::NAN), 0.0);
    }

    #[test]
    fn test_trimmed_segments_contribute_nothing() {
        let mut m = model(60.0);
        m.add_boundary(10.0).unwrap();
        m.add_boundary(50.0).unwrap();
        m.toggle_trim_segment(0).unwrap();
        m.toggle_trim_segment(2).unwrap();

        assert_eq!(m.source_time_to_visual_time(5.0), 0.0);
        assert!((m.source_time_to_visual_time(30.0) - 20.0).abs() < 1e-9);
        assert!((m.source_time_to_visual_time(55.0) - 40.0).abs() < 1e-9);
        assert!((m.visual_time_to_source_time(0.0) - 10.0).abs() < 1e-9);
        assert!((m.visual_time_to_source_time(40.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_to_visible_range() {
        let mut m = model(60.0);
        m.add_boundary(10.0).unwrap();
        m.add_boundary(50.0).unwrap();
        m.toggle_trim_segment(0).unwrap();
        m.toggle_trim_segment(2).unwrap();
        assert_eq!(m.clamp_to_visible_range(3.0), 10.0);
        assert_eq!(m.clamp_to_visible_range(25.0), 25.0);
        assert_eq!(m.clamp_to_visible_range(59.0), 50.0);
    }

    #[test]
    fn test_get_segment_at_time_skips_trimmed() {
        let mut m = model(60.0);
        m.add_boundary(10.0).unwrap();
        m.add_boundary(50.0).unwrap();
        m.set_segment_speed(1, 1.5).unwrap();
        assert_eq!(m.get_segment_at_time(5.0).index, 0);

        m.toggle_trim_segment(0).unwrap();
        m.toggle_trim_segment(2).unwrap();
        assert_eq!(m.get_segment_at_time(5.0).index, 1);
        assert_eq!(m.get_segment_at_time(55.0).index, 1);
        assert_eq!(m.get_segment_at_time(60.0).index, 1);
        assert_eq!(m.get_segment_at_time(5.0).speed_multiplier, 1.5);
    }

    #[test]
    fn test_snapshot_round_trip_with_trim() {
        let mut m = model(60.0);
        m.add_boundary(10.0).unwrap();
        m.add_boundary(45.0).unwrap();
        m.set_segment_speed(1, 2.0).unwrap();
        m.toggle_trim_segment(2).unwrap();

        let snapshot = m.to_snapshot();
        assert_eq!(snapshot.boundaries, vec![0.0, 10.0, 45.0, 60.0]);
        assert_eq!(snapshot.trim_range, Some(TrimRange::new(0.0, 45.0)));

        let restored = SegmentModel::from_snapshot(&snapshot, 60.0, 30.0).unwrap();
        assert_eq!(restored, m);
    }

    #[test]
    fn test_from_snapshot_rejects_malformed() {
        let bad = SegmentSnapshot {
            boundaries: vec![0.0, 30.0, 60.0],
            segment_speeds: vec![1.0],
            trim_range: None,
        };
        assert!(matches!(
            SegmentModel::from_snapshot(&bad, 60.0, 30.0),
            Err(EditError::InvalidSnapshot(_))
        ));

        let misaligned_trim = SegmentSnapshot {
            boundaries: vec![0.0, 30.0, 60.0],
            segment_speeds: vec![1.0, 1.0],
            trim_range: Some(TrimRange::new(12.0, 60.0)),
        };
        assert!(SegmentModel::from_snapshot(&misaligned_trim, 60.0, 30.0).is_err());
    }
}
