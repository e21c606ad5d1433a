//! Keyframe wire types.
//!
//! [`Keyframe`] is the frame-domain form used for editing and persistence.
//! [`TimedKeyframe`] is the time-domain form handed to renderers.

use serde::{Deserialize, Serialize};

use crate::frame::frame_to_time;

/// Where a keyframe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeyframeOrigin {
    /// Placed by the user.
    #[default]
    User,
    /// Reconstituted at a visible start/end boundary.
    Permanent,
}

/// A payload anchored to an integer frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Frame index in the source video.
    pub frame: i64,

    /// Animated value.
    #[serde(flatten)]
    pub payload: T,

    #[serde(default)]
    pub origin: KeyframeOrigin,
}

impl<T> Keyframe<T> {
    pub fn new(frame: i64, payload: T, origin: KeyframeOrigin) -> Self {
        Self {
            frame,
            payload,
            origin,
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.origin == KeyframeOrigin::Permanent
    }
}

impl<T: Clone> Keyframe<T> {
    /// Convert to the time domain at the given framerate.
    pub fn to_timed(&self, framerate: f64) -> TimedKeyframe<T> {
        TimedKeyframe {
            time: frame_to_time(self.frame, framerate),
            payload: self.payload.clone(),
            origin: self.origin,
        }
    }
}

/// A payload anchored to a time in seconds (source domain).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedKeyframe<T> {
    /// Source time in seconds.
    pub time: f64,

    #[serde(flatten)]
    pub payload: T,

    #[serde(default)]
    pub origin: KeyframeOrigin,
}

/// Values that can be blended between two keyframes.
pub trait Interpolate: Clone {
    /// Blend from `from` toward `to`; `t` is in `[0.0, 1.0]`.
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        from + (to - from) * t
    }
}
