//! Frame and time conversions.
//!
//! Keyframes live on integer frames; everything user-facing is seconds.
//! These helpers are the only place the two domains are converted so that
//! rounding is identical everywhere.

/// Framerate assumed when a source reports none (or garbage).
pub const DEFAULT_FRAMERATE: f64 = 30.0;

/// Selection/removal window around a target frame, in frames on each side.
pub const FRAME_TOLERANCE: i64 = 1;

/// Replace a non-finite or non-positive framerate with [`DEFAULT_FRAMERATE`].
pub fn sanitize_framerate(framerate: f64) -> f64 {
    if framerate.is_finite() && framerate > 0.0 {
        framerate
    } else {
        DEFAULT_FRAMERATE
    }
}

/// Convert seconds to the nearest frame index.
pub fn time_to_frame(time_secs: f64, framerate: f64) -> i64 {
    (time_secs * framerate).round() as i64
}

/// Convert a frame index to seconds.
pub fn frame_to_time(frame: i64, framerate: f64) -> f64 {
    frame as f64 / framerate
}

/// Snap a time to the nearest frame boundary.
pub fn snap_to_frame(time_secs: f64, framerate: f64) -> f64 {
    frame_to_time(time_to_frame(time_secs, framerate), framerate)
}

/// Index of the frame closest to `target` that lies within `tolerance`.
///
/// Ties resolve to the earlier index. Returns `None` when no frame is
/// close enough. This is the only basis for keyframe "selection".
pub fn find_keyframe_index_near_frame<I>(frames: I, target: i64, tolerance: i64) -> Option<usize>
where
    I: IntoIterator<Item = i64>,
{
    let mut best: Option<(usize, i64)> = None;
    for (idx, frame) in frames.into_iter().enumerate() {
        let distance = (frame - target).abs();
        if distance > tolerance {
            continue;
        }
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((idx, distance)),
        }
    }
    best.map(|(idx, _)| idx)
}
