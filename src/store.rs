//! Collaborator traits for the persistent store, plus an in-memory
//! reference implementation.
//!
//! The import committer and the export engine never talk to a database
//! directly; they consume these traits. The store promises two things:
//! per-kind id sets for conflict detection, and an atomic transaction the
//! commit phase runs inside. [`MemoryStore`] implements both for tests and
//! the CLI.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::SeqlabelError;
use crate::model::{Annotation, Id, Record, RecordKind};

/// One atomic unit of work against the store.
///
/// Both operations stage writes inside the enclosing transaction; nothing
/// is observable outside it until [`Store::with_transaction`] returns `Ok`.
pub trait Transaction {
    /// Inserts a new record. Fails if the id is already present.
    fn insert(&mut self, record: Record) -> Result<(), SeqlabelError>;

    /// Overwrites the record with the same kind and id, or inserts it if
    /// absent.
    fn replace(&mut self, record: Record) -> Result<(), SeqlabelError>;
}

/// The persistent store as seen by this crate.
pub trait Store {
    /// The ids currently persisted for one record kind.
    fn existing_ids(&self, kind: RecordKind) -> BTreeSet<Id>;

    /// Runs `f` as one atomic transaction: either every staged write
    /// becomes visible, or (on any `Err` from `f`) none do.
    fn with_transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Transaction) -> Result<(), SeqlabelError>,
    ) -> Result<(), SeqlabelError>;
}

/// An in-memory store keyed by record kind and id.
///
/// Transactions operate on a working copy that replaces the live map only
/// on success, which gives the required all-or-nothing semantics without
/// any locking.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    records: BTreeMap<RecordKind, BTreeMap<Id, Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record directly, outside any transaction. Test and CLI
    /// setup only; the import pipeline always goes through a transaction.
    pub fn seed(&mut self, record: Record) {
        self.records
            .entry(record.kind())
            .or_default()
            .insert(record.id().clone(), record);
    }

    /// Looks up one record.
    pub fn get(&self, kind: RecordKind, id: &Id) -> Option<&Record> {
        self.records.get(&kind).and_then(|m| m.get(id))
    }

    /// Number of records of one kind.
    pub fn len(&self, kind: RecordKind) -> usize {
        self.records.get(&kind).map_or(0, |m| m.len())
    }

    /// Returns true if the store holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.records.values().all(|m| m.is_empty())
    }

    /// All persisted annotations, in id order. Input to the export engine.
    pub fn annotations(&self) -> Vec<Annotation> {
        self.records
            .get(&RecordKind::Annotation)
            .map(|m| {
                m.values()
                    .filter_map(|r| match r {
                        Record::Annotation(a) => Some(a.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

struct MemoryTransaction {
    working: BTreeMap<RecordKind, BTreeMap<Id, Record>>,
}

impl Transaction for MemoryTransaction {
    fn insert(&mut self, record: Record) -> Result<(), SeqlabelError> {
        let by_id = self.working.entry(record.kind()).or_default();
        if by_id.contains_key(record.id()) {
            return Err(SeqlabelError::Commit {
                message: format!(
                    "insert of {} '{}' collides with an existing record",
                    record.kind(),
                    record.id()
                ),
            });
        }
        by_id.insert(record.id().clone(), record);
        Ok(())
    }

    fn replace(&mut self, record: Record) -> Result<(), SeqlabelError> {
        self.working
            .entry(record.kind())
            .or_default()
            .insert(record.id().clone(), record);
        Ok(())
    }
}

impl Store for MemoryStore {
    fn existing_ids(&self, kind: RecordKind) -> BTreeSet<Id> {
        self.records
            .get(&kind)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn with_transaction(
        &mut self,
        f: &mut dyn FnMut(&mut dyn Transaction) -> Result<(), SeqlabelError>,
    ) -> Result<(), SeqlabelError> {
        let mut txn = MemoryTransaction {
            working: self.records.clone(),
        };
        f(&mut txn)?;
        self.records = txn.working;
        Ok(())
    }
}
