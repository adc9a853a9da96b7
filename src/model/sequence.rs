//! Bounding-box sequences: keyframes, interpolation segments, visibility.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::bbox::BoundingBox;

/// The easing law applied across an interpolation segment.
///
/// Unknown kinds are preserved as [`InterpolationKind::Other`] rather than
/// rejected at parse time, so the validator can report them as a named
/// error class with full context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterpolationKind {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Bezier,
    /// A kind this implementation does not recognize. Round-trips verbatim.
    Other(String),
}

impl InterpolationKind {
    /// The wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            InterpolationKind::Linear => "linear",
            InterpolationKind::EaseIn => "ease-in",
            InterpolationKind::EaseOut => "ease-out",
            InterpolationKind::EaseInOut => "ease-in-out",
            InterpolationKind::Bezier => "bezier",
            InterpolationKind::Other(s) => s,
        }
    }

    /// Parses a wire name, mapping unrecognized names to `Other`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "linear" => InterpolationKind::Linear,
            "ease-in" => InterpolationKind::EaseIn,
            "ease-out" => InterpolationKind::EaseOut,
            "ease-in-out" => InterpolationKind::EaseInOut,
            "bezier" => InterpolationKind::Bezier,
            other => InterpolationKind::Other(other.to_string()),
        }
    }

    /// Returns true for the enumerated kinds, false for `Other`.
    pub fn is_known(&self) -> bool {
        !matches!(self, InterpolationKind::Other(_))
    }
}

impl Serialize for InterpolationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InterpolationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(InterpolationKind::from_name(&name))
    }
}

/// A single Bézier control point; both coordinates constrained to [0,1]
/// for a valid sequence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
}

impl ControlPoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true if both coordinates are finite and within [0,1].
    #[inline]
    pub fn in_unit_range(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && (0.0..=1.0).contains(&self.x)
            && (0.0..=1.0).contains(&self.y)
    }
}

/// Per-axis Bézier control points for a `bezier` segment.
///
/// Each axis carries the inner control polygon of a curve with implied
/// endpoints (0,0) and (1,1); evaluating the curve at parameter `t` yields
/// that axis's eased parameter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BezierControls {
    #[serde(default)]
    pub x: Vec<ControlPoint>,
    #[serde(default)]
    pub y: Vec<ControlPoint>,
    #[serde(default)]
    pub width: Vec<ControlPoint>,
    #[serde(default)]
    pub height: Vec<ControlPoint>,
}

impl BezierControls {
    /// The per-axis control point arrays, paired with axis names for
    /// validation messages.
    pub fn axes(&self) -> [(&'static str, &[ControlPoint]); 4] {
        [
            ("x", self.x.as_slice()),
            ("y", self.y.as_slice()),
            ("width", self.width.as_slice()),
            ("height", self.height.as_slice()),
        ]
    }
}

/// A declared span between two keyframes plus the easing law used to
/// derive intermediate frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpolationSegment {
    /// Frame number of the starting keyframe.
    pub start_frame: u32,
    /// Frame number of the ending keyframe.
    pub end_frame: u32,
    pub kind: InterpolationKind,
    /// Present when `kind` is `bezier`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_points: Option<BezierControls>,
}

impl InterpolationSegment {
    /// Creates a non-bezier segment.
    pub fn new(start_frame: u32, end_frame: u32, kind: InterpolationKind) -> Self {
        Self {
            start_frame,
            end_frame,
            kind,
            control_points: None,
        }
    }

    /// Creates a bezier segment with the given per-axis control points.
    pub fn bezier(start_frame: u32, end_frame: u32, control_points: BezierControls) -> Self {
        Self {
            start_frame,
            end_frame,
            kind: InterpolationKind::Bezier,
            control_points: Some(control_points),
        }
    }
}

/// A frame interval during which the annotated object is declared present
/// or absent, independent of geometry. Bounds are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityRange {
    pub start_frame: u32,
    pub end_frame: u32,
    pub visible: bool,
}

impl VisibilityRange {
    pub fn new(start_frame: u32, end_frame: u32, visible: bool) -> Self {
        Self {
            start_frame,
            end_frame,
            visible,
        }
    }

    /// Returns true if `frame` lies inside this range (inclusive bounds).
    #[inline]
    pub fn contains(&self, frame: u32) -> bool {
        self.start_frame <= frame && frame <= self.end_frame
    }
}

/// Provenance tag for how a sequence's keyframes were produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackingSource {
    Manual,
    Tracked,
    Imported,
    /// A source this implementation does not recognize. Round-trips verbatim.
    Other(String),
}

impl TrackingSource {
    pub fn as_str(&self) -> &str {
        match self {
            TrackingSource::Manual => "manual",
            TrackingSource::Tracked => "tracked",
            TrackingSource::Imported => "imported",
            TrackingSource::Other(s) => s,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "manual" => TrackingSource::Manual,
            "tracked" => TrackingSource::Tracked,
            "imported" => TrackingSource::Imported,
            other => TrackingSource::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TrackingSource::Other(_))
    }
}

impl Serialize for TrackingSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TrackingSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        if name.is_empty() {
            return Err(D::Error::custom("tracking source must not be empty"));
        }
        Ok(TrackingSource::from_name(&name))
    }
}

/// A spatio-temporal bounding-box sequence.
///
/// Stores only authored keyframes plus the segments and visibility ranges
/// needed to derive a box for any other frame. The three count fields are
/// cached metadata: they must agree with `boxes` for a valid sequence but
/// are recomputed rather than trusted blindly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBoxSequence {
    /// Keyframe boxes, sorted ascending by frame number for a valid sequence.
    pub boxes: Vec<BoundingBox>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interpolation_segments: Vec<InterpolationSegment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visibility_ranges: Vec<VisibilityRange>,
    #[serde(default)]
    pub total_frames: u32,
    #[serde(default)]
    pub keyframe_count: usize,
    #[serde(default)]
    pub interpolated_frame_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_source: Option<TrackingSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_confidence: Option<f64>,
}

impl BoundingBoxSequence {
    /// Creates a sequence from parts and derives the count metadata.
    pub fn new(
        boxes: Vec<BoundingBox>,
        interpolation_segments: Vec<InterpolationSegment>,
        visibility_ranges: Vec<VisibilityRange>,
    ) -> Self {
        let mut seq = Self {
            boxes,
            interpolation_segments,
            visibility_ranges,
            ..Default::default()
        };
        seq.recompute_counts();
        seq
    }

    /// Looks up the keyframe at exactly `frame`, if any.
    ///
    /// Binary search; requires `boxes` sorted by frame number.
    pub fn keyframe_at(&self, frame: u32) -> Option<&BoundingBox> {
        self.boxes
            .binary_search_by_key(&frame, |b| b.frame_number)
            .ok()
            .map(|idx| &self.boxes[idx])
    }

    /// Returns true if the object is declared visible at `frame`.
    ///
    /// A sequence with no visibility ranges at all is visible everywhere.
    pub fn visible_at(&self, frame: u32) -> bool {
        if self.visibility_ranges.is_empty() {
            return true;
        }
        self.visibility_ranges
            .iter()
            .any(|r| r.visible && r.contains(frame))
    }

    /// The inclusive frame span covered by the keyframes, if any exist.
    pub fn keyframe_span(&self) -> Option<(u32, u32)> {
        match (self.boxes.first(), self.boxes.last()) {
            (Some(first), Some(last)) => Some((first.frame_number, last.frame_number)),
            _ => None,
        }
    }

    /// Re-derives the cached count metadata from the stored parts.
    ///
    /// `total_frames` is the keyframe span extent, `keyframe_count` the
    /// number of stored boxes, and `interpolated_frame_count` the number of
    /// intermediate frames covered by interpolation segments.
    pub fn recompute_counts(&mut self) {
        self.keyframe_count = self.boxes.len();
        // Saturating arithmetic keeps this total defined even for the
        // unsorted sequences the validator exists to report.
        self.total_frames = match self.keyframe_span() {
            Some((first, last)) => last.saturating_sub(first).saturating_add(1),
            None => 0,
        };
        self.interpolated_frame_count = self
            .interpolation_segments
            .iter()
            .map(|s| s.end_frame.saturating_sub(s.start_frame).saturating_sub(1))
            .sum();
    }

    /// Returns true if the cached counts agree with a fresh derivation.
    pub fn counts_in_sync(&self) -> bool {
        let mut fresh = self.clone();
        fresh.recompute_counts();
        fresh.total_frames == self.total_frames
            && fresh.keyframe_count == self.keyframe_count
            && fresh.interpolated_frame_count == self.interpolated_frame_count
    }
}
