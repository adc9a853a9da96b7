//! The interpolation engine: derives a box at any frame from a sparse set
//! of keyframes under the sequence's easing laws.
//!
//! The engine is a pure function over an immutable sequence. It performs no
//! I/O and holds no state, so it is safe to call concurrently from any
//! number of request handlers.
//!
//! Callers are expected to validate sequences first (see
//! [`crate::validation`]); the engine does not re-validate. Its behavior on
//! an invalid sequence is still deterministic, but only a valid sequence
//! gets the documented semantics.

mod easing;

pub use easing::{bezier_axis, ease_in, ease_in_out, ease_out, lerp};

use crate::model::{
    BezierControls, BoundingBox, BoundingBoxSequence, InterpolationKind, InterpolationSegment,
};

/// Derives the bounding box at `frame`, or `None` when the object has no
/// defined box there.
///
/// `None` is an explicit "not visible / gap" result, produced when:
/// - the frame falls outside every `visible = true` range (visibility is
///   authoritative over geometry),
/// - the frame lies outside the keyframe span, or
/// - the bracketing keyframe pair has no interpolation segment declared
///   between them. Gaps never hold the last keyframe's value.
///
/// At an exact keyframe frame the keyframe's box is returned unchanged.
pub fn interpolate(sequence: &BoundingBoxSequence, frame: u32) -> Option<BoundingBox> {
    if !sequence.visible_at(frame) {
        return None;
    }

    if let Some(keyframe) = sequence.keyframe_at(frame) {
        return Some(*keyframe);
    }

    let boxes = &sequence.boxes;
    // Bracketing pair via binary search over the sorted keyframe array.
    let idx = boxes.partition_point(|b| b.frame_number < frame);
    if idx == 0 || idx == boxes.len() {
        return None;
    }
    let (ka, kb) = (&boxes[idx - 1], &boxes[idx]);

    let segment = sequence
        .interpolation_segments
        .iter()
        .find(|s| s.start_frame == ka.frame_number && s.end_frame == kb.frame_number)?;

    let t = f64::from(frame - ka.frame_number) / f64::from(kb.frame_number - ka.frame_number);

    let (x, y, width, height) = match eased(segment, t) {
        Eased::Shared(t1) => (
            lerp(ka.x, kb.x, t1),
            lerp(ka.y, kb.y, t1),
            lerp(ka.width, kb.width, t1),
            lerp(ka.height, kb.height, t1),
        ),
        Eased::PerAxis(controls) => (
            lerp(ka.x, kb.x, bezier_axis(&controls.x, t)),
            lerp(ka.y, kb.y, bezier_axis(&controls.y, t)),
            lerp(ka.width, kb.width, bezier_axis(&controls.width, t)),
            lerp(ka.height, kb.height, bezier_axis(&controls.height, t)),
        ),
    };

    Some(BoundingBox::derived(frame, x, y, width, height))
}

enum Eased<'a> {
    Shared(f64),
    PerAxis(&'a BezierControls),
}

fn eased(segment: &InterpolationSegment, t: f64) -> Eased<'_> {
    match &segment.kind {
        InterpolationKind::Linear => Eased::Shared(t),
        InterpolationKind::EaseIn => Eased::Shared(ease_in(t)),
        InterpolationKind::EaseOut => Eased::Shared(ease_out(t)),
        InterpolationKind::EaseInOut => Eased::Shared(ease_in_out(t)),
        InterpolationKind::Bezier => match &segment.control_points {
            Some(controls) => Eased::PerAxis(controls),
            // Bezier without control points is invalid; fall back to the
            // linear law rather than guess.
            None => Eased::Shared(t),
        },
        // Unknown kinds are invalid; same fallback.
        InterpolationKind::Other(_) => Eased::Shared(t),
    }
}
