use thiserror::Error;

use crate::import::{Conflict, LineIssue};

/// The main error type for seqlabel operations.
///
/// Conflicts (duplicate ids, missing dependencies) are deliberately NOT
/// errors: they are data, resolved by policy and reported in the import
/// summary. Everything here blocks writes entirely.
#[derive(Debug, Error)]
pub enum SeqlabelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or schema-invalid exchange lines. Carries every offending
    /// line so the caller can fix the whole file in one pass.
    #[error("import file rejected: {} problem line(s)", errors.len())]
    ImportParse { errors: Vec<LineIssue> },

    /// Sequence invariant violations aggregated across the whole batch.
    #[error("import batch failed validation with {} issue(s)", errors.len())]
    ImportValidation { errors: Vec<LineIssue> },

    /// Missing dependencies under the fail-import policy. Carries every
    /// unresolved dependency conflict in the batch.
    #[error("{} missing dependenc(ies) with fail-import policy", conflicts.len())]
    DependenciesMissing { conflicts: Vec<Conflict> },

    /// Transaction or I/O failure during commit. The store has rolled the
    /// whole job back; the caller must resubmit it.
    #[error("commit failed: {message}")]
    Commit { message: String },

    /// The interpolated export would exceed the configured frame ceiling.
    #[error("export would materialize {requested} frames, over the ceiling of {limit}")]
    FrameCeilingExceeded { requested: u64, limit: u64 },

    /// CLI validation outcome: the file had errors (or warnings under
    /// `--strict`). The report was already printed.
    #[error("validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
}
