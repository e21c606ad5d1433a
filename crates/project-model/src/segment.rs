//! Persisted segment layout.
//!
//! The live segment list is owned by the editing core; this is the shape
//! it is saved and loaded as.

use serde::{Deserialize, Serialize};

/// Source-time range hidden by trimming, expressed as the visible window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimRange {
    /// First visible source time.
    pub start: f64,
    /// Last visible source time.
    pub end: f64,
}

impl TrimRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }
}

/// Segment boundaries, speeds, and trim state as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSnapshot {
    /// Every boundary in source seconds, including `0` and the source
    /// duration. `n` boundaries describe `n - 1` segments.
    pub boundaries: Vec<f64>,

    /// Speed multiplier per segment.
    pub segment_speeds: Vec<f64>,

    /// Visible window when an edge segment is trimmed.
    #[serde(default)]
    pub trim_range: Option<TrimRange>,
}

impl SegmentSnapshot {
    /// A single untrimmed 1x segment covering `duration`.
    pub fn full(duration: f64) -> Self {
        Self {
            boundaries: vec![0.0, duration],
            segment_speeds: vec![1.0],
            trim_range: None,
        }
    }

    /// Structural problems with this snapshot, if any.
    pub fn problems(&self, duration: f64) -> Vec<String> {
        let mut problems = vec![];

        if self.boundaries.len() < 2 {
            problems.push("segments need at least two boundaries".to_string());
            return problems;
        }
        if self.segment_speeds.len() != self.boundaries.len() - 1 {
            problems.push(format!(
                "{} boundaries but {} segment speeds",
                self.boundaries.len(),
                self.segment_speeds.len()
            ));
        }
        if self.boundaries.windows(2).any(|w| w[1] <= w[0]) {
            problems.push("segment boundaries are not strictly increasing".to_string());
        }
        if self.boundaries[0].abs() > 1e-6 {
            problems.push("first segment boundary is not 0".to_string());
        }
        if let Some(last) = self.boundaries.last() {
            if (last - duration).abs() > 1e-3 {
                problems.push(format!(
                    "last segment boundary {last:.3}s does not match duration {duration:.3}s"
                ));
            }
        }
        if self
            .segment_speeds
            .iter()
            .any(|s| !s.is_finite() || *s <= 0.0)
        {
            problems.push("segment speeds must be positive".to_string());
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_snapshot_is_valid() {
        assert!(SegmentSnapshot::full(60.0).problems(60.0).is_empty());
    }

    #[test]
    fn test_problems_detects_mismatched_speeds() {
        let snap = SegmentSnapshot {
            boundaries: vec![0.0, 30.0, 60.0],
            segment_speeds: vec![1.0],
            trim_range: None,
        };
        let problems = snap.problems(60.0);
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("segment speeds"));
    }

    #[test]
    fn test_problems_detects_unsorted_and_bad_speed() {
        let snap = SegmentSnapshot {
            boundaries: vec![0.0, 40.0, 30.0, 60.0],
            segment_speeds: vec![1.0, 0.0, 1.0],
            trim_range: None,
        };
        let problems = snap.problems(60.0);
        assert!(problems.iter().any(|p| p.contains("strictly increasing")));
        assert!(problems.iter().any(|p| p.contains("positive")));
    }
}
