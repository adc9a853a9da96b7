//! The import pipeline.
//!
//! A state machine over one import job with explicit phases:
//! parse → validate → dependency graph → conflict detection → resolution →
//! identifier remapping → commit. Phases 1–6 are pure; only the final
//! commit performs I/O, inside one atomic store transaction. Anything
//! malformed or invalid before commit blocks all writes and reports the
//! complete problem list in one response.

mod conflict;
mod graph;
mod parse;
mod resolve;

pub use conflict::{detect_conflicts, Conflict, ConflictKind, ExistingIds};
pub use graph::DependencyGraph;
pub use parse::{parse_lines, parse_lines_lenient, LineIssue, ParsedRecord};
pub use resolve::{
    resolve_conflicts, CommitAction, DuplicatePolicy, ImportPolicy, MissingDependencyPolicy,
    ResolvedBatch, Resolution,
};

use std::io::BufRead;

use log::{debug, info};

use crate::error::SeqlabelError;
use crate::model::Record;
use crate::store::Store;
use crate::validation::{validate_annotation, Severity};

/// The outcome of a committed import job.
///
/// `conflicts` lists every detected conflict with its resolution, even
/// auto-resolved ones, so the caller can audit what happened.
#[derive(Clone, Debug, Default)]
pub struct ImportSummary {
    /// Records inserted.
    pub imported: usize,
    /// Records dropped by a skip resolution.
    pub skipped: usize,
    /// Records that overwrote an existing one.
    pub replaced: usize,
    /// Always zero on a successful import; failures are errors, not counts.
    pub errors: usize,
    pub conflicts: Vec<Conflict>,
}

/// The outcome of a store-independent dry validation of an exchange file.
#[derive(Clone, Debug, Default)]
pub struct ImportValidation {
    /// True when no line carries an error (warnings allowed).
    pub valid: bool,
    pub issues: Vec<LineIssue>,
}

impl ImportValidation {
    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }
}

/// Validates an exchange file without touching any store: parse errors,
/// schema errors, and sequence invariant violations, all keyed by line.
pub fn validate_import<R: BufRead>(reader: R) -> Result<ImportValidation, SeqlabelError> {
    let (records, mut issues) = parse_lines_lenient(reader)?;

    for parsed in &records {
        collect_sequence_issues(parsed, &mut issues);
    }
    issues.sort_by_key(|i| i.line);

    let valid = issues.iter().all(|i| i.severity != Severity::Error);
    Ok(ImportValidation { valid, issues })
}

/// Runs one import job end to end against the store.
///
/// Returns the summary on success. Any parse, schema, or validation
/// problem — and any commit failure — aborts with zero net writes.
pub fn run_import<R: BufRead, S: Store>(
    reader: R,
    store: &mut S,
    policy: &ImportPolicy,
) -> Result<ImportSummary, SeqlabelError> {
    // Phase 1: parse. Aborts with every problem line.
    let records = parse_lines(reader)?;
    debug!("parsed {} record(s)", records.len());

    // Phase 2: validate every annotation sequence; aggregate across the
    // whole batch before deciding.
    let mut issues = Vec::new();
    for parsed in &records {
        collect_sequence_issues(parsed, &mut issues);
    }
    if issues.iter().any(|i| i.severity == Severity::Error) {
        return Err(SeqlabelError::ImportValidation { errors: issues });
    }

    // Phase 3: dependency graph over the whole batch.
    let graph = DependencyGraph::build(&records);

    // Phase 4: conflicts against the store snapshot plus the batch itself.
    let existing = ExistingIds::from_store(store);
    let conflicts = detect_conflicts(&records, &graph, &existing);
    debug!("detected {} conflict(s)", conflicts.len());

    // Phases 5 + 6: resolve by policy and remap identifiers.
    let resolved = resolve_conflicts(records, conflicts, policy)?;

    // Phase 7: commit everything that survived in one transaction.
    let mut imported = 0usize;
    let mut replaced = 0usize;
    store.with_transaction(&mut |txn| {
        for (parsed, action) in &resolved.records {
            match action {
                CommitAction::Insert => {
                    txn.insert(parsed.record.clone())?;
                    imported += 1;
                }
                CommitAction::Replace => {
                    txn.replace(parsed.record.clone())?;
                    replaced += 1;
                }
            }
        }
        Ok(())
    })?;

    info!(
        "import committed: {} inserted, {} replaced, {} skipped",
        imported, replaced, resolved.skipped
    );

    Ok(ImportSummary {
        imported,
        skipped: resolved.skipped,
        replaced,
        errors: 0,
        conflicts: resolved.conflicts,
    })
}

fn collect_sequence_issues(parsed: &ParsedRecord, issues: &mut Vec<LineIssue>) {
    if let Record::Annotation(annotation) = &parsed.record {
        let report = validate_annotation(annotation, None);
        for issue in &report.issues {
            let line_issue = match issue.severity {
                Severity::Error => LineIssue::error(parsed.line, issue.to_string()),
                Severity::Warning => LineIssue::warning(parsed.line, issue.to_string()),
            };
            issues.push(line_issue);
        }
    }
}
