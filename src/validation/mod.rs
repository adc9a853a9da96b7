//! Sequence validation.
//!
//! This module enforces the structural and semantic invariants of a
//! bounding-box sequence before anything is persisted or exported:
//! - Keyframe ordering and uniqueness
//! - Interpolation segment integrity (kinds, bounds, control points)
//! - Visibility range ordering and non-overlap
//! - Spatial validity against optional video bounds
//! - Tracking metadata ranges and derived-count agreement
//!
//! All checks accumulate into one [`ValidationReport`]; a single call
//! surfaces the complete defect list rather than the first failure.

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::BTreeSet;

use crate::model::{Annotation, BoundingBoxSequence, InterpolationKind, VideoBounds};

/// Validates a sequence and returns a report of all issues found.
///
/// Bounds checks run only when `bounds` is supplied; everything else is
/// intrinsic to the sequence. No side effects.
pub fn validate_sequence(
    sequence: &BoundingBoxSequence,
    bounds: Option<&VideoBounds>,
) -> ValidationReport {
    let mut report = ValidationReport::new();

    validate_keyframes(sequence, bounds, &mut report);
    validate_segments(sequence, &mut report);
    validate_visibility(sequence, &mut report);
    validate_tracking(sequence, &mut report);
    validate_counts(sequence, &mut report);

    report
}

/// Validates an annotation: identity fields plus its sequence.
pub fn validate_annotation(
    annotation: &Annotation,
    bounds: Option<&VideoBounds>,
) -> ValidationReport {
    let mut report = validate_sequence(&annotation.sequence, bounds);

    if annotation.id.is_empty() {
        report.add(ValidationIssue::error(
            IssueCode::EmptyId,
            "Annotation id is empty",
            IssueContext::Annotation {
                id: annotation.id.to_string(),
            },
        ));
    }
    if annotation.video_id.is_empty() {
        report.add(ValidationIssue::error(
            IssueCode::EmptyId,
            "Owning video id is empty",
            IssueContext::Annotation {
                id: annotation.id.to_string(),
            },
        ));
    }

    report
}

/// Validates keyframe ordering, flags, and geometry.
fn validate_keyframes(
    sequence: &BoundingBoxSequence,
    bounds: Option<&VideoBounds>,
    report: &mut ValidationReport,
) {
    if sequence.boxes.is_empty() {
        report.add(ValidationIssue::error(
            IssueCode::NoKeyframes,
            "Sequence has no keyframes",
            IssueContext::Sequence,
        ));
        return;
    }

    for pair in sequence.boxes.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.frame_number < a.frame_number {
            report.add(ValidationIssue::error(
                IssueCode::UnsortedKeyframes,
                format!(
                    "Keyframe at frame {} follows keyframe at frame {}",
                    b.frame_number, a.frame_number
                ),
                IssueContext::Keyframe {
                    frame: b.frame_number,
                },
            ));
        } else if b.frame_number == a.frame_number {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateKeyframeFrame,
                format!("Multiple keyframes at frame {}", b.frame_number),
                IssueContext::Keyframe {
                    frame: b.frame_number,
                },
            ));
        }
    }

    for keyframe in &sequence.boxes {
        let context = IssueContext::Keyframe {
            frame: keyframe.frame_number,
        };

        if !keyframe.is_keyframe {
            report.add(ValidationIssue::error(
                IssueCode::NonKeyframeBox,
                "Stored box is not flagged as a keyframe",
                context.clone(),
            ));
        }

        if !keyframe.is_finite() {
            report.add(ValidationIssue::error(
                IssueCode::BoxNotFinite,
                format!(
                    "Non-finite box ({}, {}, {}, {})",
                    keyframe.x, keyframe.y, keyframe.width, keyframe.height
                ),
                context,
            ));
            // Skip further geometry checks on garbage coordinates.
            continue;
        }

        if keyframe.width <= 0.0 || keyframe.height <= 0.0 {
            report.add(ValidationIssue::warning(
                IssueCode::ZeroSizeBox,
                format!(
                    "Zero or negative size {}x{}",
                    keyframe.width, keyframe.height
                ),
                context.clone(),
            ));
        }

        if let Some(bounds) = bounds {
            if !keyframe.fits_within(bounds) {
                report.add(ValidationIssue::error(
                    IssueCode::BoxOutOfBounds,
                    format!(
                        "Box ({:.1}, {:.1}, {:.1}, {:.1}) extends outside video bounds {}x{}",
                        keyframe.x,
                        keyframe.y,
                        keyframe.width,
                        keyframe.height,
                        bounds.width,
                        bounds.height
                    ),
                    context,
                ));
            }
        }
    }
}

/// Validates interpolation segments against the keyframe set.
fn validate_segments(sequence: &BoundingBoxSequence, report: &mut ValidationReport) {
    let keyframe_frames: BTreeSet<u32> =
        sequence.boxes.iter().map(|b| b.frame_number).collect();

    for (index, segment) in sequence.interpolation_segments.iter().enumerate() {
        let context = IssueContext::Segment { index };

        if let InterpolationKind::Other(name) = &segment.kind {
            report.add(ValidationIssue::error(
                IssueCode::UnknownInterpolationKind,
                format!("Unknown interpolation kind '{}'", name),
                context.clone(),
            ));
        }

        if segment.start_frame >= segment.end_frame {
            report.add(ValidationIssue::error(
                IssueCode::InvertedSegmentBounds,
                format!(
                    "Segment start {} is not before end {}",
                    segment.start_frame, segment.end_frame
                ),
                context.clone(),
            ));
        }

        for (label, frame) in [("start", segment.start_frame), ("end", segment.end_frame)] {
            if !keyframe_frames.contains(&frame) {
                report.add(ValidationIssue::error(
                    IssueCode::SegmentBoundNotKeyframe,
                    format!("Segment {} frame {} matches no keyframe", label, frame),
                    context.clone(),
                ));
            }
        }

        match (&segment.kind, &segment.control_points) {
            (InterpolationKind::Bezier, None) => {
                report.add(ValidationIssue::error(
                    IssueCode::MissingBezierControls,
                    "Bezier segment has no control points",
                    context.clone(),
                ));
            }
            (_, Some(controls)) => {
                for (axis, points) in controls.axes() {
                    for point in points {
                        if !point.in_unit_range() {
                            report.add(ValidationIssue::error(
                                IssueCode::BezierControlOutOfRange,
                                format!(
                                    "Control point ({}, {}) on axis '{}' outside [0,1]",
                                    point.x, point.y, axis
                                ),
                                context.clone(),
                            ));
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Validates visibility range ordering, overlap, and keyframe coverage.
fn validate_visibility(sequence: &BoundingBoxSequence, report: &mut ValidationReport) {
    let ranges = &sequence.visibility_ranges;

    for (index, range) in ranges.iter().enumerate() {
        if range.start_frame > range.end_frame {
            report.add(ValidationIssue::error(
                IssueCode::InvertedVisibilityRange,
                format!(
                    "Range starts at frame {} but ends at frame {}",
                    range.start_frame, range.end_frame
                ),
                IssueContext::Range { index },
            ));
        }
    }

    for (index, pair) in ranges.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        if b.start_frame < a.start_frame {
            report.add(ValidationIssue::error(
                IssueCode::UnsortedVisibilityRanges,
                format!(
                    "Range starting at frame {} follows range starting at frame {}",
                    b.start_frame, a.start_frame
                ),
                IssueContext::Range { index: index + 1 },
            ));
        } else if b.start_frame <= a.end_frame {
            report.add(ValidationIssue::error(
                IssueCode::OverlappingVisibilityRanges,
                format!(
                    "Range [{}, {}] overlaps range [{}, {}]",
                    b.start_frame, b.end_frame, a.start_frame, a.end_frame
                ),
                IssueContext::Range { index: index + 1 },
            ));
        }
    }

    // With no ranges declared the sequence is visible everywhere, so
    // keyframe coverage only applies to sequences that declare ranges.
    if !ranges.is_empty() {
        for keyframe in &sequence.boxes {
            let covered = ranges
                .iter()
                .any(|r| r.visible && r.contains(keyframe.frame_number));
            if !covered {
                report.add(ValidationIssue::error(
                    IssueCode::KeyframeOutsideVisibleRange,
                    format!(
                        "Keyframe at frame {} lies in no visible range",
                        keyframe.frame_number
                    ),
                    IssueContext::Keyframe {
                        frame: keyframe.frame_number,
                    },
                ));
            }
        }
    }
}

/// Validates tracking provenance metadata.
fn validate_tracking(sequence: &BoundingBoxSequence, report: &mut ValidationReport) {
    if let Some(source) = &sequence.tracking_source {
        if !source.is_known() {
            report.add(ValidationIssue::error(
                IssueCode::UnknownTrackingSource,
                format!("Unknown tracking source '{}'", source.as_str()),
                IssueContext::Sequence,
            ));
        }
    }

    if let Some(confidence) = sequence.tracking_confidence {
        if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
            report.add(ValidationIssue::error(
                IssueCode::TrackingConfidenceOutOfRange,
                format!("Tracking confidence {} outside [0,1]", confidence),
                IssueContext::Sequence,
            ));
        }
    }
}

/// Warns when cached counts disagree with a fresh derivation.
fn validate_counts(sequence: &BoundingBoxSequence, report: &mut ValidationReport) {
    if !sequence.counts_in_sync() {
        let mut fresh = sequence.clone();
        fresh.recompute_counts();
        report.add(ValidationIssue::warning(
            IssueCode::CountMismatch,
            format!(
                "Cached counts (total {}, keyframes {}, interpolated {}) disagree with derived (total {}, keyframes {}, interpolated {})",
                sequence.total_frames,
                sequence.keyframe_count,
                sequence.interpolated_frame_count,
                fresh.total_frames,
                fresh.keyframe_count,
                fresh.interpolated_frame_count
            ),
            IssueContext::Sequence,
        ));
    }
}
