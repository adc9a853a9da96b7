//! Core data model for spatio-temporal annotation sequences.
//!
//! This module defines the canonical representation of bounding-box
//! sequences and the exchange records that carry them. The interpolation
//! engine, the validator, and the import/export pipelines all work over
//! these types.
//!
//! # Design Principles
//!
//! 1. **Permissive Construction**: model types allow "invalid" data to be
//!    represented (unsorted keyframes, out-of-range control points, unknown
//!    interpolation kinds), so that validation can report issues rather
//!    than panic during parsing.
//!
//! 2. **Tagged Unions at the Boundary**: record payloads and annotation
//!    linkage are explicit enums deserialized once, not loose JSON accessed
//!    field by field.
//!
//! 3. **Derived Metadata**: the cached counts on a sequence are
//!    recomputable from its parts and never independently authoritative.

mod annotation;
mod bbox;
mod ids;
mod record;
mod sequence;

// Re-export core types for convenient access
pub use annotation::{Annotation, AnnotationBody, AnnotationKind, TypeCategory, WorldKind};
pub use bbox::{BoundingBox, VideoBounds};
pub use ids::{Id, RecordKind};
pub use record::{NamedRecord, Record, Reference, VideoRecord};
pub use sequence::{
    BezierControls, BoundingBoxSequence, ControlPoint, InterpolationKind, InterpolationSegment,
    TrackingSource, VisibilityRange,
};
