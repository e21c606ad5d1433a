//! Crop and highlight region types.
//!
//! All coordinates are in source-video pixels with `(0, 0)` at the
//! top-left corner.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::keyframe::Interpolate;

/// Smallest crop edge, in pixels.
const MIN_CROP_SIZE: f64 = 1.0;

/// A width:height ratio such as 16:9 or 9:16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub const LANDSCAPE: AspectRatio = AspectRatio {
        width: 16,
        height: 9,
    };
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };
    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1,
        height: 1,
    };

    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    /// Width divided by height.
    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::PORTRAIT
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(':')
            .ok_or_else(|| format!("aspect ratio must look like W:H, got {s:?}"))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid aspect width in {s:?}"))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid aspect height in {s:?}"))?;
        AspectRatio::new(width, height).ok_or_else(|| format!("aspect ratio {s:?} has a zero side"))
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(value: AspectRatio) -> Self {
        value.to_string()
    }
}

/// A rectangular crop region within the source frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The largest crop of the given aspect ratio that fits the source,
    /// centered.
    pub fn centered_for_aspect(source_width: f64, source_height: f64, aspect: AspectRatio) -> Self {
        let target = aspect.ratio();
        let (width, height) = if source_width / source_height > target {
            (source_height * target, source_height)
        } else {
            (source_width, source_width / target)
        };
        Self {
            x: (source_width - width) / 2.0,
            y: (source_height - height) / 2.0,
            width,
            height,
        }
    }

    /// Re-derive the width from the height so the rect matches `aspect`,
    /// keeping the center, then shrink and shift to stay inside the source.
    pub fn constrained_to_aspect(
        &self,
        aspect: AspectRatio,
        source_width: f64,
        source_height: f64,
    ) -> Self {
        let ratio = aspect.ratio();
        let (cx, cy) = self.center();

        let mut height = self.height.clamp(MIN_CROP_SIZE, source_height);
        let mut width = height * ratio;
        if width > source_width {
            width = source_width;
            height = width / ratio;
        }

        Self {
            x: (cx - width / 2.0).clamp(0.0, (source_width - width).max(0.0)),
            y: (cy - height / 2.0).clamp(0.0, (source_height - height).max(0.0)),
            width,
            height,
        }
    }

    /// The center point of this rect.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the rect lies entirely inside a source of the given size.
    pub fn fits_within(&self, source_width: f64, source_height: f64) -> bool {
        const EPS: f64 = 1e-6;
        self.x >= -EPS
            && self.y >= -EPS
            && self.right() <= source_width + EPS
            && self.bottom() <= source_height + EPS
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Linearly interpolate between two rects.
    pub fn lerp(a: &CropRect, b: &CropRect, t: f64) -> CropRect {
        let t = t.clamp(0.0, 1.0);
        CropRect {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            width: a.width + (b.width - a.width) * t,
            height: a.height + (b.height - a.height) * t,
        }
    }
}

impl Interpolate for CropRect {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        CropRect::lerp(from, to, t)
    }
}

/// An elliptical highlight drawn over the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRegion {
    /// Ellipse center X.
    pub x: f64,
    /// Ellipse center Y.
    pub y: f64,
    pub radius_x: f64,
    pub radius_y: f64,
    /// Fill opacity in `[0.0, 1.0]`.
    pub opacity: f64,
    /// Fill color as `#RRGGBB`.
    pub color: String,
}

impl HighlightRegion {
    /// A circular highlight centered in the source frame.
    pub fn centered(
        source_width: f64,
        source_height: f64,
        radius_ratio: f64,
        color: impl Into<String>,
        opacity: f64,
    ) -> Self {
        let radius = source_height * radius_ratio;
        Self {
            x: source_width / 2.0,
            y: source_height / 2.0,
            radius_x: radius,
            radius_y: radius,
            opacity: opacity.clamp(0.0, 1.0),
            color: color.into(),
        }
    }

    /// Check if a point is inside the ellipse.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        if self.radius_x <= 0.0 || self.radius_y <= 0.0 {
            return false;
        }
        let dx = (px - self.x) / self.radius_x;
        let dy = (py - self.y) / self.radius_y;
        dx * dx + dy * dy <= 1.0
    }

    /// Interpolate geometry, opacity, and color.
    pub fn lerp(a: &HighlightRegion, b: &HighlightRegion, t: f64) -> HighlightRegion {
        let t = t.clamp(0.0, 1.0);
        HighlightRegion {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            radius_x: a.radius_x + (b.radius_x - a.radius_x) * t,
            radius_y: a.radius_y + (b.radius_y - a.radius_y) * t,
            opacity: a.opacity + (b.opacity - a.opacity) * t,
            color: lerp_hex_color(&a.color, &b.color, t),
        }
    }
}

impl Interpolate for HighlightRegion {
    fn interpolate(from: &Self, to: &Self, t: f64) -> Self {
        HighlightRegion::lerp(from, to, t)
    }
}

fn parse_hex_color(color: &str) -> Option<[u8; 3]> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Blend two `#RRGGBB` colors; unparseable colors step at the midpoint.
fn lerp_hex_color(a: &str, b: &str, t: f64) -> String {
    if a == b {
        return a.to_string();
    }
    match (parse_hex_color(a), parse_hex_color(b)) {
        (Some(ca), Some(cb)) => {
            let mix = |i: usize| {
                (ca[i] as f64 + (cb[i] as f64 - ca[i] as f64) * t)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
            format!("#{:02X}{:02X}{:02X}", mix(0), mix(1), mix(2))
        }
        _ if t < 0.5 => a.to_string(),
        _ => b.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_parse_and_display() {
        let aspect: AspectRatio = "16:9".parse().unwrap();
        assert_eq!(aspect, AspectRatio::LANDSCAPE);
        assert_eq!(aspect.to_string(), "16:9");
        assert!("16x9".parse::<AspectRatio>().is_err());
        assert!("0:9".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_aspect_ratio_serializes_as_string() {
        let json = serde_json::to_string(&AspectRatio::PORTRAIT).unwrap();
        assert_eq!(json, "\"9:16\"");
        let parsed: AspectRatio = serde_json::from_str("\"1:1\"").unwrap();
        assert_eq!(parsed, AspectRatio::SQUARE);
    }

    #[test]
    fn test_centered_for_portrait_on_landscape_source() {
        let crop = CropRect::centered_for_aspect(1920.0, 1080.0, AspectRatio::PORTRAIT);
        assert!((crop.height - 1080.0).abs() < 1e-9);
        assert!((crop.width - 607.5).abs() < 1e-9);
        assert!((crop.x - 656.25).abs() < 1e-9);
        assert_eq!(crop.y, 0.0);
        assert!(crop.fits_within(1920.0, 1080.0));
    }

    #[test]
    fn test_centered_for_landscape_on_portrait_source() {
        let crop = CropRect::centered_for_aspect(1080.0, 1920.0, AspectRatio::LANDSCAPE);
        assert!((crop.width - 1080.0).abs() < 1e-9);
        assert!((crop.height - 607.5).abs() < 1e-9);
        assert_eq!(crop.x, 0.0);
    }

    #[test]
    fn test_constrained_to_aspect_keeps_center_and_bounds() {
        let loose = CropRect::new(100.0, 100.0, 300.0, 400.0);
        let fixed = loose.constrained_to_aspect(AspectRatio::SQUARE, 1920.0, 1080.0);
        assert!((fixed.width - fixed.height).abs() < 1e-9);
        assert!((fixed.center().0 - loose.center().0).abs() < 1e-9);
        assert!(fixed.fits_within(1920.0, 1080.0));
    }

    #[test]
    fn test_constrained_to_aspect_shifts_inside_source() {
        let near_edge = CropRect::new(1800.0, 0.0, 300.0, 300.0);
        let fixed = near_edge.constrained_to_aspect(AspectRatio::SQUARE, 1920.0, 1080.0);
        assert!(fixed.fits_within(1920.0, 1080.0));
        assert!((fixed.right() - 1920.0).abs() < 1e-9);
    }

    #[test]
    fn test_crop_lerp() {
        let a = CropRect::new(0.0, 0.0, 100.0, 100.0);
        let b = CropRect::new(50.0, 50.0, 100.0, 100.0);
        let mid = CropRect::lerp(&a, &b, 0.5);
        assert!((mid.x - 25.0).abs() < 1e-9);
        assert!((mid.y - 25.0).abs() < 1e-9);
        assert!((mid.width - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_highlight_contains() {
        let h = HighlightRegion::centered(200.0, 100.0, 0.1, "#FFFF00", 0.5);
        assert!(h.contains(100.0, 50.0));
        assert!(h.contains(109.0, 50.0));
        assert!(!h.contains(111.0, 50.0));
    }

    #[test]
    fn test_highlight_lerp_blends_color_and_opacity() {
        let a = HighlightRegion {
            x: 0.0,
            y: 0.0,
            radius_x: 10.0,
            radius_y: 10.0,
            opacity: 0.0,
            color: "#000000".to_string(),
        };
        let b = HighlightRegion {
            x: 10.0,
            opacity: 1.0,
            color: "#FF0080".to_string(),
            ..a.clone()
        };
        let mid = HighlightRegion::lerp(&a, &b, 0.5);
        assert!((mid.x - 5.0).abs() < 1e-9);
        assert!((mid.opacity - 0.5).abs() < 1e-9);
        assert_eq!(mid.color, "#800040");
    }

    #[test]
    fn test_highlight_lerp_unparseable_color_steps() {
        let a = HighlightRegion::centered(100.0, 100.0, 0.1, "yellow", 0.5);
        let b = HighlightRegion::centered(100.0, 100.0, 0.1, "red", 0.5);
        assert_eq!(HighlightRegion::lerp(&a, &b, 0.25).color, "yellow");
        assert_eq!(HighlightRegion::lerp(&a, &b, 0.75).color, "red");
    }
}
