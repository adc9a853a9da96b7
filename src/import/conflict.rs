//! Phase 4: conflict detection.
//!
//! Conflicts are detected against a snapshot of the store's id sets plus
//! ids seen earlier in the same batch. They are collected as data — never
//! raised — and handed to the resolution phase.

use std::collections::BTreeSet;
use std::fmt;

use crate::model::{Id, RecordKind, Reference};
use crate::store::Store;

use super::graph::DependencyGraph;
use super::parse::ParsedRecord;
use super::resolve::Resolution;

/// Per-kind id sets snapshotted from the store before conflict detection.
#[derive(Clone, Debug, Default)]
pub struct ExistingIds {
    sets: std::collections::BTreeMap<RecordKind, BTreeSet<Id>>,
}

impl ExistingIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots every tracked kind from the store.
    pub fn from_store<S: Store + ?Sized>(store: &S) -> Self {
        let mut snapshot = Self::new();
        for kind in RecordKind::all() {
            snapshot.sets.insert(kind, store.existing_ids(kind));
        }
        snapshot
    }

    /// Registers an id as existing. Test setup convenience.
    pub fn insert(&mut self, kind: RecordKind, id: impl Into<Id>) {
        self.sets.entry(kind).or_default().insert(id.into());
    }

    pub fn contains(&self, kind: RecordKind, id: &Id) -> bool {
        self.sets.get(&kind).is_some_and(|set| set.contains(id))
    }
}

/// What kind of collision a conflict describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictKind {
    /// The record's id already exists in the store or earlier in the batch.
    DuplicateId,
    /// The record references an id absent from both store and batch.
    MissingDependency,
}

/// A detected identifier collision or dangling reference.
///
/// `resolution` is filled in by the resolution phase so the caller can
/// audit what happened to every conflict, even auto-resolved ones.
#[derive(Clone, Debug)]
pub struct Conflict {
    pub kind: ConflictKind,
    /// 1-based exchange line of the conflicting record.
    pub line: usize,
    pub record_kind: RecordKind,
    pub record_id: Id,
    /// The dangling reference, for missing-dependency conflicts.
    pub missing: Option<Reference>,
    pub resolution: Option<Resolution>,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConflictKind::DuplicateId => write!(
                f,
                "line {}: {} '{}' already exists",
                self.line, self.record_kind, self.record_id
            )?,
            ConflictKind::MissingDependency => {
                write!(
                    f,
                    "line {}: {} '{}' references missing",
                    self.line, self.record_kind, self.record_id
                )?;
                if let Some(missing) = &self.missing {
                    match missing.kind {
                        Some(kind) => write!(f, " {} '{}'", kind, missing.id)?,
                        None => write!(f, " id '{}'", missing.id)?,
                    }
                }
            }
        }
        if let Some(resolution) = &self.resolution {
            write!(f, " ({})", resolution)?;
        }
        Ok(())
    }
}

/// Detects duplicate-id and missing-dependency conflicts for one batch.
pub fn detect_conflicts(
    records: &[ParsedRecord],
    graph: &DependencyGraph,
    existing: &ExistingIds,
) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    // The whole batch counts as present for dependency purposes: a record
    // may reference another that appears later in the file.
    let batch_ids: BTreeSet<(RecordKind, &Id)> = records
        .iter()
        .map(|p| (p.record.kind(), p.record.id()))
        .collect();

    let mut seen: BTreeSet<(RecordKind, &Id)> = BTreeSet::new();

    for parsed in records {
        let kind = parsed.record.kind();
        let id = parsed.record.id();

        if existing.contains(kind, id) || seen.contains(&(kind, id)) {
            conflicts.push(Conflict {
                kind: ConflictKind::DuplicateId,
                line: parsed.line,
                record_kind: kind,
                record_id: id.clone(),
                missing: None,
                resolution: None,
            });
        } else {
            seen.insert((kind, id));
        }

        for reference in graph.references(parsed.line) {
            // References without a tracked kind (ontology type ids) are
            // outside the snapshot and cannot be checked here.
            let Some(ref_kind) = reference.kind else {
                continue;
            };
            let in_store = existing.contains(ref_kind, &reference.id);
            let in_batch = batch_ids.contains(&(ref_kind, &reference.id));
            if !in_store && !in_batch {
                conflicts.push(Conflict {
                    kind: ConflictKind::MissingDependency,
                    line: parsed.line,
                    record_kind: kind,
                    record_id: id.clone(),
                    missing: Some(reference.clone()),
                    resolution: None,
                });
            }
        }
    }

    conflicts
}
