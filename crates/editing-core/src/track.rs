//! Generic keyframe track.
//!
//! Keyframes are stored on integer frames, unique and sorted ascending.
//! Interpolation is linear between the bracketing pair and holds the
//! nearest value outside the keyed range.

use reframe_project_model::frame::{
    find_keyframe_index_near_frame, time_to_frame, FRAME_TOLERANCE,
};
use reframe_project_model::keyframe::{Interpolate, Keyframe, KeyframeOrigin, TimedKeyframe};

use crate::trim::TrimEdge;

/// Positions this close to an integer frame are treated as on it.
const FRAME_SNAP_EPSILON: f64 = 1e-6;

/// What [`KeyframeTrack::remove_keyframe`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The keyframe was deleted.
    Removed,
    /// It was the last keyframe, so its payload was reset instead.
    Reset,
    /// No keyframe within tolerance.
    NotFound,
}

/// An ordered list of keyframes over one payload type.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T> {
    keyframes: Vec<Keyframe<T>>,
    framerate: f64,
    clipboard: Option<T>,
    /// The only keyframe left is a reset stand-in; the next add replaces it.
    placeholder: bool,
}

impl<T: Interpolate> KeyframeTrack<T> {
    /// Create a new empty track.
    pub fn new(framerate: f64) -> Self {
        Self {
            keyframes: Vec::new(),
            framerate,
            clipboard: None,
            placeholder: false,
        }
    }

    /// Hydrate from frame-domain keyframes. Sorts, and keeps the last
    /// keyframe when frames collide.
    pub fn from_keyframes(mut keyframes: Vec<Keyframe<T>>, framerate: f64) -> Self {
        keyframes.sort_by_key(|kf| kf.frame);
        let mut deduped: Vec<Keyframe<T>> = Vec::with_capacity(keyframes.len());
        for kf in keyframes {
            match deduped.last_mut() {
                Some(prev) if prev.frame == kf.frame => *prev = kf,
                _ => deduped.push(kf),
            }
        }
        Self {
            keyframes: deduped,
            framerate,
            clipboard: None,
            placeholder: false,
        }
    }

    pub fn framerate(&self) -> f64 {
        self.framerate
    }

    /// Get all keyframes (read-only).
    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn keyframe_at_frame(&self, frame: i64) -> Option<&Keyframe<T>> {
        self.keyframes
            .binary_search_by_key(&frame, |kf| kf.frame)
            .ok()
            .map(|i| &self.keyframes[i])
    }

    /// Insert or update the keyframe at the frame nearest `time`.
    ///
    /// An existing keyframe keeps its origin. Returns the keyframe index.
    pub fn add_or_update_keyframe(&mut self, time: f64, payload: T, duration: f64) -> usize {
        self.upsert(time, payload, duration, None)
    }

    /// Like [`add_or_update_keyframe`](Self::add_or_update_keyframe) but
    /// overrides the origin.
    pub fn add_or_update_keyframe_with_origin(
        &mut self,
        time: f64,
        payload: T,
        duration: f64,
        origin: KeyframeOrigin,
    ) -> usize {
        self.upsert(time, payload, duration, Some(origin))
    }

    fn upsert(
        &mut self,
        time: f64,
        payload: T,
        duration: f64,
        origin: Option<KeyframeOrigin>,
    ) -> usize {
        let end_frame = time_to_frame(duration, self.framerate).max(0);
        let frame = time_to_frame(time, self.framerate).clamp(0, end_frame);
        let on_edge = frame == 0 || frame == end_frame;

        if std::mem::take(&mut self.placeholder) && self.keyframes.len() == 1 {
            self.keyframes.clear();
        }

        match self.keyframes.binary_search_by_key(&frame, |kf| kf.frame) {
            Ok(i) => {
                let kf = &mut self.keyframes[i];
                kf.payload = payload;
                if let Some(origin) = origin {
                    kf.origin = origin;
                }
                if on_edge {
                    kf.origin = KeyframeOrigin::Permanent;
                }
                i
            }
            Err(i) => {
                let origin = if on_edge {
                    KeyframeOrigin::Permanent
                } else {
                    origin.unwrap_or_default()
                };
                self.keyframes.insert(i, Keyframe::new(frame, payload, origin));
                i
            }
        }
    }

    /// Remove the keyframe nearest `time` within [`FRAME_TOLERANCE`].
    ///
    /// The last remaining keyframe is never removed; its payload is reset
    /// to `reset` instead so the track always stays interpolable. That
    /// stand-in is replaced by the next added keyframe.
    pub fn remove_keyframe(&mut self, time: f64, reset: T) -> RemoveOutcome {
        self.remove_keyframe_within(time, FRAME_TOLERANCE, reset)
    }

    pub fn remove_keyframe_within(&mut self, time: f64, tolerance: i64, reset: T) -> RemoveOutcome {
        let Some(index) = self.selected_index(time, tolerance) else {
            return RemoveOutcome::NotFound;
        };
        if self.keyframes.len() == 1 {
            self.keyframes[0].payload = reset;
            self.placeholder = true;
            RemoveOutcome::Reset
        } else {
            self.keyframes.remove(index);
            RemoveOutcome::Removed
        }
    }

    /// Delete from the playhead the way the editor does: permanent
    /// keyframes are reset to `reset` in place, user keyframes are removed.
    pub fn remove_or_reset_keyframe(&mut self, time: f64, tolerance: i64, reset: T) -> RemoveOutcome {
        match self.selected_index(time, tolerance) {
            None => RemoveOutcome::NotFound,
            Some(index) if self.keyframes[index].is_permanent() => {
                self.keyframes[index].payload = reset;
                RemoveOutcome::Reset
            }
            Some(_) => self.remove_keyframe_within(time, tolerance, reset),
        }
    }

    /// Delete the keyframe at exactly `frame`, if any.
    pub fn remove_frame(&mut self, frame: i64) -> Option<Keyframe<T>> {
        self.placeholder = false;
        self.keyframes
            .binary_search_by_key(&frame, |kf| kf.frame)
            .ok()
            .map(|i| self.keyframes.remove(i))
    }

    /// Evaluate the track at a source time.
    ///
    /// Holds the first/last value outside the keyed range; `None` when the
    /// track is empty.
    pub fn interpolate(&self, time: f64) -> Option<T> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;

        let mut position = time * self.framerate;
        if (position - position.round()).abs() < FRAME_SNAP_EPSILON {
            position = position.round();
        }

        if position <= first.frame as f64 {
            return Some(first.payload.clone());
        }
        if position >= last.frame as f64 {
            return Some(last.payload.clone());
        }

        let idx = self
            .keyframes
            .partition_point(|kf| kf.frame as f64 <= position)
            .saturating_sub(1);
        let a = &self.keyframes[idx];
        if a.frame as f64 == position {
            return Some(a.payload.clone());
        }
        let b = &self.keyframes[idx + 1];
        let span = (b.frame - a.frame) as f64;
        let t = ((position - a.frame as f64) / span).clamp(0.0, 1.0);
        Some(T::interpolate(&a.payload, &b.payload, t))
    }

    /// Index of the keyframe under the playhead, within `tolerance` frames.
    ///
    /// Selection is always derived from the playhead, never stored.
    pub fn selected_index(&self, current_time: f64, tolerance: i64) -> Option<usize> {
        find_keyframe_index_near_frame(
            self.keyframes.iter().map(|kf| kf.frame),
            time_to_frame(current_time, self.framerate),
            tolerance,
        )
    }

    /// Capture the interpolated value at `time` into the clipboard.
    pub fn copy_keyframe(&mut self, time: f64) -> Option<T> {
        let value = self.interpolate(time)?;
        self.clipboard = Some(value.clone());
        Some(value)
    }

    /// Paste the clipboard at `time`. `None` when nothing was copied.
    pub fn paste_keyframe(&mut self, time: f64, duration: f64) -> Option<usize> {
        let value = self.clipboard.clone()?;
        Some(self.add_or_update_keyframe(time, value, duration))
    }

    /// Remove every keyframe with `start <= time <= end`, compared in
    /// frames. Returns how many were removed.
    pub fn delete_keyframes_in_range(&mut self, start: f64, end: f64, duration: f64) -> usize {
        let start_frame = time_to_frame(start.max(0.0), self.framerate);
        let end_frame = time_to_frame(end.min(duration), self.framerate);
        let before = self.keyframes.len();
        self.placeholder = false;
        self.keyframes
            .retain(|kf| kf.frame < start_frame || kf.frame > end_frame);
        before - self.keyframes.len()
    }

    /// The user keyframe reaching furthest into `[start, end]` from the
    /// visible side: the earliest when the start edge is hidden, the latest
    /// when the end edge is hidden.
    pub fn keyframe_furthest_into(&self, start: f64, end: f64, edge: TrimEdge) -> Option<&Keyframe<T>> {
        let start_frame = time_to_frame(start, self.framerate);
        let end_frame = time_to_frame(end, self.framerate);
        let mut inside = self.keyframes.iter().filter(|kf| {
            kf.origin == KeyframeOrigin::User && kf.frame >= start_frame && kf.frame <= end_frame
        });
        match edge {
            TrimEdge::Start => inside.next(),
            TrimEdge::End => inside.last(),
        }
    }

    /// Make sure permanent keyframes sit at `start` and `end`.
    ///
    /// Missing ones take the interpolated value there, or `fallback` when
    /// the track is empty. Existing ones are re-tagged permanent.
    pub fn ensure_boundary_keyframes(&mut self, start: f64, end: f64, duration: f64, fallback: &T) {
        for time in [start, end] {
            let frame = time_to_frame(time, self.framerate);
            match self.keyframes.binary_search_by_key(&frame, |kf| kf.frame) {
                Ok(i) => self.keyframes[i].origin = KeyframeOrigin::Permanent,
                Err(_) => {
                    let value = self.interpolate(time).unwrap_or_else(|| fallback.clone());
                    self.add_or_update_keyframe_with_origin(
                        time,
                        value,
                        duration,
                        KeyframeOrigin::Permanent,
                    );
                }
            }
        }
    }

    /// Keyframes in the time domain, for the render boundary.
    pub fn keyframes_for_export(&self) -> Vec<TimedKeyframe<T>> {
        self.keyframes
            .iter()
            .map(|kf| kf.to_timed(self.framerate))
            .collect()
    }

    /// Apply `f` to every payload in place.
    pub fn map_payloads(&mut self, mut f: impl FnMut(&T) -> T) {
        for kf in &mut self.keyframes {
            kf.payload = f(&kf.payload);
        }
    }
}
