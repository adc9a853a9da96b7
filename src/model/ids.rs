//! Identifier types shared by all record kinds.
//!
//! Identifiers in the exchange format are opaque strings (UUIDs in
//! practice, but nothing relies on that). A single [`Id`] newtype is shared
//! by every record kind; [`RecordKind`] carries the kind alongside it where
//! the distinction matters (conflict detection, store lookups).

use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque identifier for a record in the exchange format.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub String);

impl Id {
    /// Creates a new Id from any string-like value.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random Id (UUID v4).
    ///
    /// Used by the import pipeline when resolving a duplicate-id conflict
    /// with the `create-new` policy.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the underlying string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the identifier is the empty string.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Id {
    fn from(id: &str) -> Self {
        Id::new(id)
    }
}

impl From<String> for Id {
    fn from(id: String) -> Self {
        Id(id)
    }
}

/// The kind of a record in the exchange format.
///
/// Matches the `type` tag of exchange lines one-to-one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    Annotation,
    Video,
    Persona,
    Collection,
    WorldEntity,
    WorldEvent,
    WorldTime,
    WorldLocation,
}

impl RecordKind {
    /// The `type` tag used in the exchange format.
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Annotation => "annotation",
            RecordKind::Video => "video",
            RecordKind::Persona => "persona",
            RecordKind::Collection => "collection",
            RecordKind::WorldEntity => "world-entity",
            RecordKind::WorldEvent => "world-event",
            RecordKind::WorldTime => "world-time",
            RecordKind::WorldLocation => "world-location",
        }
    }

    /// All record kinds, in a stable order.
    pub fn all() -> [RecordKind; 8] {
        [
            RecordKind::Annotation,
            RecordKind::Video,
            RecordKind::Persona,
            RecordKind::Collection,
            RecordKind::WorldEntity,
            RecordKind::WorldEvent,
            RecordKind::WorldTime,
            RecordKind::WorldLocation,
        ]
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_equality() {
        assert_eq!(Id::new("a"), Id::new("a"));
        assert_ne!(Id::new("a"), Id::new("b"));
    }

    #[test]
    fn test_random_ids_are_distinct() {
        assert_ne!(Id::random(), Id::random());
    }

    #[test]
    fn test_kind_names_roundtrip_serde() {
        for kind in RecordKind::all() {
            let json = serde_json::to_string(&kind).expect("serialize kind");
            assert_eq!(json, format!("\"{}\"", kind.name()));
            let back: RecordKind = serde_json::from_str(&json).expect("deserialize kind");
            assert_eq!(back, kind);
        }
    }
}
