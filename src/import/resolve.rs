//! Phases 5 and 6: conflict resolution and identifier remapping.
//!
//! Resolution is policy-driven and pure: it consumes the parsed batch plus
//! the detected conflicts and produces the records that will be committed,
//! each tagged with its commit action. Nothing here touches the store.

use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::error::SeqlabelError;
use crate::model::Id;

use super::conflict::{Conflict, ConflictKind};
use super::parse::ParsedRecord;

/// How duplicate-id conflicts are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Drop the incoming record; the existing one is untouched.
    #[default]
    Skip,
    /// Overwrite the existing record with the incoming one.
    Replace,
    /// Keep both: assign the incoming record a fresh id and rewrite every
    /// in-batch reference to the old id.
    CreateNew,
}

/// How missing-dependency conflicts are resolved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingDependencyPolicy {
    /// Drop the dependent record; the rest of the batch proceeds.
    #[default]
    SkipItem,
    /// Abort the whole job with zero writes.
    FailImport,
}

/// The per-conflict-type resolution configuration of one import job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportPolicy {
    pub duplicates: DuplicatePolicy,
    pub missing_dependencies: MissingDependencyPolicy,
}

/// What actually happened to a conflicting record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Dropped as a duplicate.
    Skipped,
    /// Will overwrite the existing record at commit.
    Replaced,
    /// Kept under a fresh id; in-batch references follow.
    Remapped { new_id: Id },
    /// Dropped because a dependency was missing.
    SkippedDependent,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Skipped => write!(f, "skipped"),
            Resolution::Replaced => write!(f, "replaced existing"),
            Resolution::Remapped { new_id } => write!(f, "assigned new id {}", new_id),
            Resolution::SkippedDependent => write!(f, "skipped, dependency missing"),
        }
    }
}

/// How a surviving record is applied at commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitAction {
    Insert,
    Replace,
}

/// The output of resolution: surviving records plus the audited conflicts.
#[derive(Clone, Debug)]
pub struct ResolvedBatch {
    /// Records to commit, in file order, each with its commit action.
    pub records: Vec<(ParsedRecord, CommitAction)>,
    /// Every detected conflict, now carrying its resolution.
    pub conflicts: Vec<Conflict>,
    /// Records dropped by resolution.
    pub skipped: usize,
    /// Old id → new id assignments made for `create-new` resolutions.
    pub remapped: BTreeMap<Id, Id>,
}

/// Applies the policy to every conflict, rewrites remapped identifiers
/// across the whole remaining batch, and returns the records to commit.
pub fn resolve_conflicts(
    records: Vec<ParsedRecord>,
    mut conflicts: Vec<Conflict>,
    policy: &ImportPolicy,
) -> Result<ResolvedBatch, SeqlabelError> {
    if policy.missing_dependencies == MissingDependencyPolicy::FailImport {
        let missing: Vec<Conflict> = conflicts
            .iter()
            .filter(|c| c.kind == ConflictKind::MissingDependency)
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(SeqlabelError::DependenciesMissing { conflicts: missing });
        }
    }

    // Conflicts are keyed by line: a batch can carry the same id twice, so
    // the line is the only unambiguous handle on a record instance.
    let mut dropped_lines: BTreeMap<usize, Resolution> = BTreeMap::new();
    let mut replace_lines: Vec<usize> = Vec::new();
    let mut new_ids_by_line: BTreeMap<usize, Id> = BTreeMap::new();
    let mut remapped: BTreeMap<Id, Id> = BTreeMap::new();

    for conflict in &mut conflicts {
        let resolution = match conflict.kind {
            ConflictKind::MissingDependency => {
                // FailImport was handled above; what remains is SkipItem.
                dropped_lines
                    .entry(conflict.line)
                    .or_insert(Resolution::SkippedDependent);
                Resolution::SkippedDependent
            }
            ConflictKind::DuplicateId => match policy.duplicates {
                DuplicatePolicy::Skip => {
                    dropped_lines
                        .entry(conflict.line)
                        .or_insert(Resolution::Skipped);
                    Resolution::Skipped
                }
                DuplicatePolicy::Replace => {
                    replace_lines.push(conflict.line);
                    Resolution::Replaced
                }
                DuplicatePolicy::CreateNew => {
                    let new_id = Id::random();
                    new_ids_by_line.insert(conflict.line, new_id.clone());
                    remapped.insert(conflict.record_id.clone(), new_id.clone());
                    Resolution::Remapped { new_id }
                }
            },
        };
        conflict.resolution = Some(resolution);
    }

    let mut kept: Vec<(ParsedRecord, CommitAction)> = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for mut parsed in records {
        // A record can be both a duplicate and a dependent of a missing
        // id; dropping wins over any duplicate resolution.
        if dropped_lines.contains_key(&parsed.line) {
            skipped += 1;
            continue;
        }

        if let Some(new_id) = new_ids_by_line.get(&parsed.line) {
            debug!(
                "remapping {} '{}' -> '{}'",
                parsed.record.kind(),
                parsed.record.id(),
                new_id
            );
            parsed.record.set_id(new_id.clone());
        }

        let action = if replace_lines.contains(&parsed.line) {
            CommitAction::Replace
        } else {
            CommitAction::Insert
        };
        kept.push((parsed, action));
    }

    // Rewrite references to remapped ids across the entire surviving
    // batch, regardless of where the referencing record sits in the file.
    if !remapped.is_empty() {
        for (parsed, _) in &mut kept {
            parsed.record.remap_references(&remapped);
        }
    }

    // A duplicate whose line got dropped by a missing dependency keeps its
    // audit trail consistent: the drop is what actually happened.
    for conflict in &mut conflicts {
        if let Some(resolution) = dropped_lines.get(&conflict.line) {
            conflict.resolution = Some(resolution.clone());
        }
    }

    Ok(ResolvedBatch {
        records: kept,
        conflicts,
        skipped,
        remapped,
    })
}
