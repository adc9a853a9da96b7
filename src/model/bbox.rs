//! Bounding boxes anchored to video frames.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box at a specific video frame.
///
/// Spatial fields are in the video's coordinate space, either absolute
/// pixels or normalized 0–1 — chosen consistently per sequence. Only
/// keyframe boxes are stored on a sequence; boxes for other frames are
/// derived by the interpolation engine.
///
/// Note: this type does NOT enforce spatial validity in the constructor,
/// allowing "malformed" boxes to exist in the model. Validation catches and
/// reports these issues rather than preventing them from being represented.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// The frame this box belongs to.
    pub frame_number: u32,
    /// True for authored keyframes, false for derived boxes.
    pub is_keyframe: bool,
}

impl BoundingBox {
    /// Creates an authored keyframe box.
    #[inline]
    pub fn keyframe(frame_number: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            frame_number,
            is_keyframe: true,
        }
    }

    /// Creates a derived (non-keyframe) box.
    #[inline]
    pub fn derived(frame_number: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            frame_number,
            is_keyframe: false,
        }
    }

    /// Returns the x coordinate of the right edge.
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Returns the y coordinate of the bottom edge.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Returns true if all spatial fields are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Returns true if the box lies fully inside the given video bounds.
    #[inline]
    pub fn fits_within(&self, bounds: &VideoBounds) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.right() <= bounds.width && self.bottom() <= bounds.height
    }
}

/// The spatial extent of a video, used for bounds checking.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoBounds {
    pub width: f64,
    pub height: f64,
}

impl VideoBounds {
    /// Creates new video bounds.
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}
