//! Annotations: a sequence plus its identity and linkage.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{Id, RecordKind};
use super::sequence::BoundingBoxSequence;

/// The kind of world object an object annotation links to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorldKind {
    Entity,
    Event,
    Time,
    Location,
    Collection,
}

impl WorldKind {
    /// The record kind the linked identifier refers to.
    pub fn record_kind(&self) -> RecordKind {
        match self {
            WorldKind::Entity => RecordKind::WorldEntity,
            WorldKind::Event => RecordKind::WorldEvent,
            WorldKind::Time => RecordKind::WorldTime,
            WorldKind::Location => RecordKind::WorldLocation,
            WorldKind::Collection => RecordKind::Collection,
        }
    }
}

/// The ontology category a type annotation's `type_id` belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeCategory {
    EntityType,
    EventType,
    RoleType,
    RelationType,
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeCategory::EntityType => "entity-type",
            TypeCategory::EventType => "event-type",
            TypeCategory::RoleType => "role-type",
            TypeCategory::RelationType => "relation-type",
        };
        write!(f, "{}", name)
    }
}

/// The linkage half of an annotation: either a world object link or a
/// persona ontology type — never both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AnnotationBody {
    /// Links the sequence to a world object (entity, event, ...).
    Object {
        #[serde(rename = "linkedKind")]
        linked_kind: WorldKind,
        #[serde(rename = "linkedId")]
        linked_id: Id,
    },
    /// Tags the sequence with an ontology type from a persona.
    Type {
        #[serde(rename = "personaId")]
        persona_id: Id,
        #[serde(rename = "typeCategory")]
        type_category: TypeCategory,
        #[serde(rename = "typeId")]
        type_id: Id,
    },
}

impl AnnotationBody {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            AnnotationBody::Object { .. } => AnnotationKind::Object,
            AnnotationBody::Type { .. } => AnnotationKind::Type,
        }
    }
}

/// Discriminant of [`AnnotationBody`], used by export filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    Object,
    Type,
}

/// A bounding-box sequence with identity and linkage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: Id,
    /// The video this annotation belongs to.
    pub video_id: Id,
    #[serde(flatten)]
    pub body: AnnotationBody,
    pub sequence: BoundingBoxSequence,
}

impl Annotation {
    /// Creates an object annotation.
    pub fn object(
        id: impl Into<Id>,
        video_id: impl Into<Id>,
        linked_kind: WorldKind,
        linked_id: impl Into<Id>,
        sequence: BoundingBoxSequence,
    ) -> Self {
        Self {
            id: id.into(),
            video_id: video_id.into(),
            body: AnnotationBody::Object {
                linked_kind,
                linked_id: linked_id.into(),
            },
            sequence,
        }
    }

    /// Creates a type annotation.
    pub fn typed(
        id: impl Into<Id>,
        video_id: impl Into<Id>,
        persona_id: impl Into<Id>,
        type_category: TypeCategory,
        type_id: impl Into<Id>,
        sequence: BoundingBoxSequence,
    ) -> Self {
        Self {
            id: id.into(),
            video_id: video_id.into(),
            body: AnnotationBody::Type {
                persona_id: persona_id.into(),
                type_category,
                type_id: type_id.into(),
            },
            sequence,
        }
    }

    pub fn kind(&self) -> AnnotationKind {
        self.body.kind()
    }

    /// The persona this annotation belongs to, if it is a type annotation.
    pub fn persona_id(&self) -> Option<&Id> {
        match &self.body {
            AnnotationBody::Type { persona_id, .. } => Some(persona_id),
            AnnotationBody::Object { .. } => None,
        }
    }
}
