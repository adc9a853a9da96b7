//! Exchange records: the tagged union carried by import/export lines.
//!
//! Each line of the exchange format is `{"type": ..., "data": {...}}`,
//! which maps directly onto serde's adjacently tagged representation.
//! Non-annotation payloads are typed once here rather than accessed as
//! loose JSON; unknown payload fields round-trip through `extra`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::annotation::{Annotation, AnnotationBody};
use super::ids::{Id, RecordKind};

/// A persona, collection, or world object record.
///
/// All of these kinds share the same required shape: an id and a non-empty
/// `name`. Anything else the producing system attached is preserved
/// verbatim in `extra`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamedRecord {
    pub id: Id,
    pub name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl NamedRecord {
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// A video record. Videos need no name; annotations reference them by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl VideoRecord {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            name: None,
            extra: BTreeMap::new(),
        }
    }
}

/// One record of the exchange format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum Record {
    Annotation(Annotation),
    Video(VideoRecord),
    Persona(NamedRecord),
    Collection(NamedRecord),
    WorldEntity(NamedRecord),
    WorldEvent(NamedRecord),
    WorldTime(NamedRecord),
    WorldLocation(NamedRecord),
}

/// A foreign identifier referenced by a record.
///
/// `kind` is `None` for references whose target lives outside the tracked
/// record kinds (persona ontology type ids); those are still rewritten by
/// the identifier remapper but are not checked by the conflict detector.
#[derive(Clone, Debug, PartialEq)]
pub struct Reference {
    pub kind: Option<RecordKind>,
    pub id: Id,
}

impl Record {
    /// The record kind, matching the exchange `type` tag.
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Annotation(_) => RecordKind::Annotation,
            Record::Video(_) => RecordKind::Video,
            Record::Persona(_) => RecordKind::Persona,
            Record::Collection(_) => RecordKind::Collection,
            Record::WorldEntity(_) => RecordKind::WorldEntity,
            Record::WorldEvent(_) => RecordKind::WorldEvent,
            Record::WorldTime(_) => RecordKind::WorldTime,
            Record::WorldLocation(_) => RecordKind::WorldLocation,
        }
    }

    /// The record's own identifier.
    pub fn id(&self) -> &Id {
        match self {
            Record::Annotation(a) => &a.id,
            Record::Video(v) => &v.id,
            Record::Persona(n)
            | Record::Collection(n)
            | Record::WorldEntity(n)
            | Record::WorldEvent(n)
            | Record::WorldTime(n)
            | Record::WorldLocation(n) => &n.id,
        }
    }

    /// Rewrites the record's own identifier.
    pub fn set_id(&mut self, id: Id) {
        match self {
            Record::Annotation(a) => a.id = id,
            Record::Video(v) => v.id = id,
            Record::Persona(n)
            | Record::Collection(n)
            | Record::WorldEntity(n)
            | Record::WorldEvent(n)
            | Record::WorldTime(n)
            | Record::WorldLocation(n) => n.id = id,
        }
    }

    /// The foreign identifiers this record references.
    ///
    /// This is the single table of reference fields per record kind; the
    /// dependency graph builder and the identifier remapper both go
    /// through it, so adding a field here updates both.
    pub fn references(&self) -> Vec<Reference> {
        match self {
            Record::Annotation(a) => {
                let mut refs = vec![Reference {
                    kind: Some(RecordKind::Video),
                    id: a.video_id.clone(),
                }];
                match &a.body {
                    AnnotationBody::Object {
                        linked_kind,
                        linked_id,
                    } => refs.push(Reference {
                        kind: Some(linked_kind.record_kind()),
                        id: linked_id.clone(),
                    }),
                    AnnotationBody::Type {
                        persona_id,
                        type_id,
                        ..
                    } => {
                        refs.push(Reference {
                            kind: Some(RecordKind::Persona),
                            id: persona_id.clone(),
                        });
                        refs.push(Reference {
                            kind: None,
                            id: type_id.clone(),
                        });
                    }
                }
                refs
            }
            // Videos, personas, collections, and world objects carry no
            // typed reference fields.
            _ => Vec::new(),
        }
    }

    /// Rewrites every reference field whose current value appears in
    /// `mapping`. The record's own id is not touched; callers remap that
    /// through [`Record::set_id`] when resolving the owning conflict.
    pub fn remap_references(&mut self, mapping: &BTreeMap<Id, Id>) {
        if mapping.is_empty() {
            return;
        }
        for slot in self.reference_slots_mut() {
            if let Some(new_id) = mapping.get(slot) {
                *slot = new_id.clone();
            }
        }
    }

    fn reference_slots_mut(&mut self) -> Vec<&mut Id> {
        match self {
            Record::Annotation(a) => {
                let mut slots = vec![&mut a.video_id];
                match &mut a.body {
                    AnnotationBody::Object { linked_id, .. } => slots.push(linked_id),
                    AnnotationBody::Type {
                        persona_id,
                        type_id,
                        ..
                    } => {
                        slots.push(persona_id);
                        slots.push(type_id);
                    }
                }
                slots
            }
            _ => Vec::new(),
        }
    }
}
