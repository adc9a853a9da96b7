//! Validation report types for structured error reporting.
//!
//! This module provides rich, structured validation results that can be
//! displayed to users, written to files, or processed programmatically.

use std::fmt;

/// The result of validating a sequence or annotation.
///
/// Contains all issues found during validation, categorized by severity.
/// Validation never fails fast: a single call surfaces the complete defect
/// list.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    /// All issues found during validation.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    /// Adds an issue to the report.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Returns the number of errors in the report.
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    /// Returns the number of warnings in the report.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Returns true if there are no errors.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// Returns true if there are no issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Formats every issue as a standalone message string.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|i| i.to_string()).collect()
    }

    /// Returns true if the report contains an issue with the given code.
    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation issue (error or warning).
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    /// The severity of the issue.
    pub severity: Severity,

    /// A stable code for the issue type.
    pub code: IssueCode,

    /// A human-readable description of the issue.
    pub message: String,

    /// Context about where the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    /// Creates a new validation issue.
    pub fn new(
        severity: Severity,
        code: IssueCode,
        message: impl Into<String>,
        context: IssueContext,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            context,
        }
    }

    /// Creates a new error.
    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Error, code, message, context)
    }

    /// Creates a new warning.
    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self::new(Severity::Warning, code, message, context)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// The severity of a validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// A warning that doesn't block persistence but may indicate problems.
    Warning,
    /// An error that indicates an invalid sequence.
    Error,
}

/// A stable code identifying the type of validation issue.
///
/// These codes can be used for filtering, ignoring specific issues,
/// or programmatic handling of validation results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IssueCode {
    // Keyframe issues
    /// The sequence has no keyframes at all.
    NoKeyframes,
    /// Keyframes are not sorted ascending by frame number.
    UnsortedKeyframes,
    /// Two keyframes share the same frame number.
    DuplicateKeyframeFrame,
    /// A stored box is not flagged as a keyframe.
    NonKeyframeBox,

    // Interpolation segment issues
    /// A segment uses an interpolation kind outside the enumerated set.
    UnknownInterpolationKind,
    /// A bezier segment carries no control points.
    MissingBezierControls,
    /// A bezier control point coordinate lies outside [0,1].
    BezierControlOutOfRange,
    /// A segment bound does not match any keyframe's frame number.
    SegmentBoundNotKeyframe,
    /// A segment's start frame is not strictly before its end frame.
    InvertedSegmentBounds,

    // Visibility range issues
    /// Two visibility ranges of the sequence overlap.
    OverlappingVisibilityRanges,
    /// Visibility ranges are not ordered by start frame.
    UnsortedVisibilityRanges,
    /// A visibility range's start frame exceeds its end frame.
    InvertedVisibilityRange,
    /// A keyframe's frame lies in no `visible = true` range.
    KeyframeOutsideVisibleRange,

    // Box geometry issues
    /// A box has non-finite coordinates (NaN or Infinity).
    BoxNotFinite,
    /// A box extends outside the supplied video bounds.
    BoxOutOfBounds,
    /// A box has zero or negative width or height.
    ZeroSizeBox,

    // Tracking metadata issues
    /// The tracking source is outside the enumerated set.
    UnknownTrackingSource,
    /// The tracking confidence lies outside [0,1].
    TrackingConfidenceOutOfRange,

    // Derived metadata issues
    /// Cached counts disagree with a fresh derivation.
    CountMismatch,

    // Annotation identity issues
    /// The annotation's own id or owning video id is empty.
    EmptyId,
}

/// Context about where a validation issue occurred.
#[derive(Clone, Debug)]
pub enum IssueContext {
    /// Issue with the sequence as a whole.
    Sequence,
    /// Issue with the keyframe at a specific frame.
    Keyframe { frame: u32 },
    /// Issue with an interpolation segment, by position.
    Segment { index: usize },
    /// Issue with a visibility range, by position.
    Range { index: usize },
    /// Issue with the wrapping annotation.
    Annotation { id: String },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Sequence => write!(f, "sequence"),
            IssueContext::Keyframe { frame } => write!(f, "keyframe at frame {}", frame),
            IssueContext::Segment { index } => write!(f, "segment {}", index),
            IssueContext::Range { index } => write!(f, "visibility range {}", index),
            IssueContext::Annotation { id } => write!(f, "annotation {}", id),
        }
    }
}
