//! The export engine.
//!
//! Streams annotations back out in the line-oriented exchange format, one
//! `{"type": "annotation", "data": {...}}` object per line. Two shapes are
//! supported: the compact keyframes-only form that round-trips losslessly
//! through import, and a fully-interpolated form that materializes one
//! degenerate single-keyframe annotation per visible frame for consumers
//! that cannot run the interpolation engine themselves.

use std::io::Write;

use log::info;

use crate::error::SeqlabelError;
use crate::interp::interpolate;
use crate::model::{
    Annotation, AnnotationKind, BoundingBoxSequence, Id, Record, VisibilityRange,
};

/// Selects which annotations an export includes. Unset fields match
/// everything.
#[derive(Clone, Debug, Default)]
pub struct ExportFilter {
    /// Keep only type annotations belonging to this persona.
    pub persona_id: Option<Id>,
    /// Keep only annotations on this video.
    pub video_id: Option<Id>,
    /// Keep only annotations of this kind.
    pub kind: Option<AnnotationKind>,
}

impl ExportFilter {
    pub fn matches(&self, annotation: &Annotation) -> bool {
        if let Some(persona_id) = &self.persona_id {
            // Object annotations carry no persona and never match a
            // persona filter.
            if annotation.persona_id() != Some(persona_id) {
                return false;
            }
        }
        if let Some(video_id) = &self.video_id {
            if &annotation.video_id != video_id {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if annotation.kind() != kind {
                return false;
            }
        }
        true
    }
}

/// Shape and safety knobs for one export run.
#[derive(Clone, Copy, Debug)]
pub struct ExportOptions {
    /// Emit one degenerate annotation per visible frame instead of the
    /// keyframes-only form.
    pub include_interpolated: bool,
    /// Upper bound on the total frames a fully-interpolated export may
    /// visit, checked before any output is written.
    pub max_interpolated_frames: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_interpolated: false,
            max_interpolated_frames: 500_000,
        }
    }
}

/// Counters accumulated over one export run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Exchange lines written.
    pub annotation_count: usize,
    /// Source sequences exported.
    pub sequence_count: usize,
    /// Frames emitted that sit on an original keyframe.
    pub keyframe_count: usize,
    /// Frames emitted that were derived by interpolation.
    pub interpolated_frame_count: usize,
    /// Bytes written, newlines included.
    pub total_bytes: usize,
}

/// Streams the filtered annotations to `writer` and returns the stats.
///
/// In fully-interpolated mode the total frame count is bounded up front;
/// an oversized request fails before a single byte is written.
pub fn run_export<W: Write>(
    annotations: &[Annotation],
    filter: &ExportFilter,
    options: &ExportOptions,
    writer: &mut W,
) -> Result<ExportStats, SeqlabelError> {
    let selected: Vec<&Annotation> = annotations.iter().filter(|a| filter.matches(a)).collect();

    if options.include_interpolated {
        let requested: u64 = selected
            .iter()
            .filter_map(|a| a.sequence.keyframe_span())
            .map(|(first, last)| u64::from(last.saturating_sub(first)) + 1)
            .sum();
        if requested > options.max_interpolated_frames {
            return Err(SeqlabelError::FrameCeilingExceeded {
                requested,
                limit: options.max_interpolated_frames,
            });
        }
    }

    let mut stats = ExportStats::default();

    for annotation in selected {
        if options.include_interpolated {
            export_interpolated(annotation, writer, &mut stats)?;
        } else {
            write_record(&Record::Annotation(annotation.clone()), writer, &mut stats)?;
            stats.annotation_count += 1;
            stats.keyframe_count += annotation.sequence.keyframe_count;
        }
        stats.sequence_count += 1;
    }

    info!(
        "export wrote {} line(s), {} byte(s)",
        stats.annotation_count, stats.total_bytes
    );
    Ok(stats)
}

/// Emits one single-keyframe annotation per visible frame of the span.
///
/// Gap frames (no segment between the bracketing keyframes) and frames the
/// visibility ranges hide produce no output at all.
fn export_interpolated<W: Write>(
    annotation: &Annotation,
    writer: &mut W,
    stats: &mut ExportStats,
) -> Result<(), SeqlabelError> {
    let Some((first, last)) = annotation.sequence.keyframe_span() else {
        return Ok(());
    };

    for frame in first..=last {
        let Some(boxed) = interpolate(&annotation.sequence, frame) else {
            continue;
        };

        let mut frame_box = boxed;
        frame_box.is_keyframe = true;

        let mut degenerate = annotation.clone();
        degenerate.id = Id::new(format!("{}:{}", annotation.id, frame));
        degenerate.sequence = BoundingBoxSequence::new(
            vec![frame_box],
            Vec::new(),
            vec![VisibilityRange::new(frame, frame, true)],
        );

        write_record(&Record::Annotation(degenerate), writer, stats)?;
        stats.annotation_count += 1;
        if annotation.sequence.keyframe_at(frame).is_some() {
            stats.keyframe_count += 1;
        } else {
            stats.interpolated_frame_count += 1;
        }
    }
    Ok(())
}

fn write_record<W: Write>(
    record: &Record,
    writer: &mut W,
    stats: &mut ExportStats,
) -> Result<(), SeqlabelError> {
    let line = serde_json::to_string(record)
        .map_err(|e| SeqlabelError::Commit {
            message: format!("serializing export record: {}", e),
        })?;
    writer.write_all(line.as_bytes())?;
    writer.write_all(b"\n")?;
    stats.total_bytes += line.len() + 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BoundingBox, InterpolationKind, InterpolationSegment, TypeCategory, WorldKind,
    };

    fn tracked_annotation(id: &str, video: &str) -> Annotation {
        Annotation::object(
            id,
            video,
            WorldKind::Entity,
            "e1",
            BoundingBoxSequence::new(
                vec![
                    BoundingBox::keyframe(0, 0.0, 0.0, 10.0, 10.0),
                    BoundingBox::keyframe(4, 8.0, 8.0, 10.0, 10.0),
                ],
                vec![InterpolationSegment::new(0, 4, InterpolationKind::Linear)],
                vec![],
            ),
        )
    }

    fn exported_lines(
        annotations: &[Annotation],
        filter: &ExportFilter,
        options: &ExportOptions,
    ) -> (Vec<String>, ExportStats) {
        let mut out = Vec::new();
        let stats = run_export(annotations, filter, options, &mut out).expect("export succeeds");
        let text = String::from_utf8(out).expect("utf8");
        (text.lines().map(str::to_string).collect(), stats)
    }

    #[test]
    fn test_filter_by_video_and_kind() {
        let filter = ExportFilter {
            video_id: Some(Id::new("v1")),
            kind: Some(AnnotationKind::Object),
            ..Default::default()
        };
        assert!(filter.matches(&tracked_annotation("a1", "v1")));
        assert!(!filter.matches(&tracked_annotation("a2", "v2")));

        let typed = Annotation::typed(
            "t1",
            "v1",
            "p1",
            TypeCategory::EntityType,
            "et1",
            BoundingBoxSequence::new(
                vec![BoundingBox::keyframe(0, 0.0, 0.0, 1.0, 1.0)],
                vec![],
                vec![],
            ),
        );
        assert!(!filter.matches(&typed));
    }

    #[test]
    fn test_persona_filter_excludes_object_annotations() {
        let filter = ExportFilter {
            persona_id: Some(Id::new("p1")),
            ..Default::default()
        };
        assert!(!filter.matches(&tracked_annotation("a1", "v1")));

        let typed = Annotation::typed(
            "t1",
            "v1",
            "p1",
            TypeCategory::RoleType,
            "rt1",
            BoundingBoxSequence::new(
                vec![BoundingBox::keyframe(0, 0.0, 0.0, 1.0, 1.0)],
                vec![],
                vec![],
            ),
        );
        assert!(filter.matches(&typed));
    }

    #[test]
    fn test_keyframes_only_round_trips() {
        let annotation = tracked_annotation("a1", "v1");
        let (lines, stats) = exported_lines(
            &[annotation.clone()],
            &ExportFilter::default(),
            &ExportOptions::default(),
        );

        assert_eq!(lines.len(), 1);
        assert_eq!(stats.annotation_count, 1);
        assert_eq!(stats.sequence_count, 1);
        assert_eq!(stats.keyframe_count, 2);
        assert_eq!(stats.interpolated_frame_count, 0);
        assert_eq!(stats.total_bytes, lines[0].len() + 1);

        let record: Record = serde_json::from_str(&lines[0]).expect("parses back");
        match record {
            Record::Annotation(back) => assert_eq!(back, annotation),
            other => panic!("expected annotation, got {other:?}"),
        }
    }

    #[test]
    fn test_interpolated_emits_one_line_per_frame() {
        let annotation = tracked_annotation("a1", "v1");
        let options = ExportOptions {
            include_interpolated: true,
            ..Default::default()
        };
        let (lines, stats) =
            exported_lines(&[annotation], &ExportFilter::default(), &options);

        assert_eq!(lines.len(), 5);
        assert_eq!(stats.annotation_count, 5);
        assert_eq!(stats.keyframe_count, 2);
        assert_eq!(stats.interpolated_frame_count, 3);

        // Every line is a self-contained single-keyframe annotation.
        let Record::Annotation(frame2) =
            serde_json::from_str(&lines[2]).expect("parses back")
        else {
            panic!("expected annotation");
        };
        assert_eq!(frame2.id, Id::new("a1:2"));
        assert_eq!(frame2.sequence.boxes.len(), 1);
        let b = frame2.sequence.boxes[0];
        assert!(b.is_keyframe);
        assert_eq!(b.frame_number, 2);
        assert!((b.x - 4.0).abs() < 1e-9);
        assert!(frame2.sequence.interpolation_segments.is_empty());
        assert_eq!(
            frame2.sequence.visibility_ranges,
            vec![VisibilityRange::new(2, 2, true)]
        );
        assert_eq!(frame2.sequence.keyframe_count, 1);
        assert_eq!(frame2.sequence.total_frames, 1);
        assert_eq!(frame2.sequence.interpolated_frame_count, 0);
    }

    #[test]
    fn test_interpolated_skips_gap_frames() {
        // Keyframes at 0 and 4 but no segment between them: only the
        // keyframes themselves come out.
        let annotation = Annotation::object(
            "a1",
            "v1",
            WorldKind::Entity,
            "e1",
            BoundingBoxSequence::new(
                vec![
                    BoundingBox::keyframe(0, 0.0, 0.0, 10.0, 10.0),
                    BoundingBox::keyframe(4, 8.0, 8.0, 10.0, 10.0),
                ],
                vec![],
                vec![],
            ),
        );
        let options = ExportOptions {
            include_interpolated: true,
            ..Default::default()
        };
        let (lines, stats) =
            exported_lines(&[annotation], &ExportFilter::default(), &options);

        assert_eq!(lines.len(), 2);
        assert_eq!(stats.keyframe_count, 2);
        assert_eq!(stats.interpolated_frame_count, 0);
    }

    #[test]
    fn test_frame_ceiling_checked_before_writing() {
        let annotation = tracked_annotation("a1", "v1");
        let options = ExportOptions {
            include_interpolated: true,
            max_interpolated_frames: 3,
        };
        let mut out = Vec::new();
        let err = run_export(&[annotation], &ExportFilter::default(), &options, &mut out)
            .unwrap_err();

        match err {
            SeqlabelError::FrameCeilingExceeded { requested, limit } => {
                assert_eq!(requested, 5);
                assert_eq!(limit, 3);
            }
            other => panic!("expected FrameCeilingExceeded, got {other:?}"),
        }
        assert!(out.is_empty());
    }
}
