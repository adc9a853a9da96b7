//! Seqlabel: bounding-box sequence annotation core.
//!
//! Seqlabel models video annotations as keyframed bounding-box sequences,
//! derives intermediate frames with a pluggable-easing interpolation
//! engine, validates sequences exhaustively, and moves them in and out of
//! a line-oriented exchange format with policy-driven conflict resolution.
//!
//! # Modules
//!
//! - [`model`]: sequence and exchange record types
//! - [`interp`]: keyframe interpolation engine
//! - [`validation`]: sequence validation and error reporting
//! - [`import`]: the phased import pipeline (parse through atomic commit)
//! - [`export`]: keyframes-only and fully-interpolated export
//! - [`store`]: persistence seam plus the in-memory reference store
//! - [`error`]: error types for seqlabel operations

pub mod error;
pub mod export;
pub mod import;
pub mod interp;
pub mod model;
pub mod store;
pub mod validation;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::SeqlabelError;

use export::{ExportFilter, ExportOptions};
use import::{validate_import, ImportPolicy};
use model::{AnnotationKind, Id};
use store::MemoryStore;
use validation::Severity;

/// The seqlabel CLI application.
#[derive(Parser)]
#[command(name = "seqlabel")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate an exchange file for errors and warnings.
    Validate(ValidateArgs),
    /// Re-export an exchange file, optionally fully interpolated.
    Export(ExportArgs),
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// Exchange file to validate.
    input: PathBuf,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the export subcommand.
#[derive(clap::Args)]
struct ExportArgs {
    /// Exchange file to load and re-export.
    input: PathBuf,

    /// Emit one record per visible frame instead of keyframes only.
    #[arg(long)]
    include_interpolated: bool,

    /// Keep only type annotations belonging to this persona.
    #[arg(long)]
    persona: Option<String>,

    /// Keep only annotations on this video.
    #[arg(long)]
    video: Option<String>,

    /// Keep only annotations of this kind ('object' or 'type').
    #[arg(long)]
    kind: Option<String>,

    /// Ceiling on frames an interpolated export may materialize.
    #[arg(long, default_value_t = 500_000)]
    max_frames: u64,
}

/// Run the seqlabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), SeqlabelError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Export(args)) => run_export_cmd(args),
        None => {
            println!("seqlabel {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Bounding-box sequence annotation core.");
            println!();
            println!("Run 'seqlabel --help' for usage information.");
            Ok(())
        }
    }
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), SeqlabelError> {
    let reader = BufReader::new(File::open(&args.input)?);
    let result = validate_import(reader)?;

    let error_count = result.error_count();
    let warning_count = result.warning_count();

    match args.output.as_str() {
        "json" => {
            // Simple JSON output for programmatic use
            println!("{{");
            println!("  \"valid\": {},", result.valid);
            println!("  \"error_count\": {},", error_count);
            println!("  \"warning_count\": {},", warning_count);
            println!("  \"issues\": [");
            for (i, issue) in result.issues.iter().enumerate() {
                let comma = if i < result.issues.len() - 1 { "," } else { "" };
                let severity = match issue.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                println!("    {{");
                println!("      \"line\": {},", issue.line);
                println!("      \"severity\": \"{}\",", severity);
                println!(
                    "      \"message\": \"{}\"",
                    issue.message.replace('\\', "\\\\").replace('"', "\\\"")
                );
                println!("    }}{}", comma);
            }
            println!("  ]");
            println!("}}");
        }
        _ => {
            for issue in &result.issues {
                println!("{}", issue);
            }
            println!(
                "{} error(s), {} warning(s)",
                error_count, warning_count
            );
        }
    }

    if error_count > 0 || (args.strict && warning_count > 0) {
        Err(SeqlabelError::ValidationFailed {
            error_count,
            warning_count,
        })
    } else {
        Ok(())
    }
}

/// Execute the export subcommand.
///
/// Loads the input through the full import pipeline into a memory store,
/// then streams the filtered annotations to stdout. Stats go to stderr so
/// the exchange output stays clean for piping.
fn run_export_cmd(args: ExportArgs) -> Result<(), SeqlabelError> {
    let kind = match args.kind.as_deref() {
        None => None,
        Some("object") => Some(AnnotationKind::Object),
        Some("type") => Some(AnnotationKind::Type),
        Some(other) => {
            return Err(SeqlabelError::UnsupportedFormat(format!(
                "'{}' (supported kinds: object, type)",
                other
            )));
        }
    };

    let reader = BufReader::new(File::open(&args.input)?);
    let mut store = MemoryStore::new();
    let summary = import::run_import(reader, &mut store, &ImportPolicy::default())?;
    if summary.skipped > 0 {
        eprintln!(
            "note: {} record(s) skipped during load (unresolved conflicts)",
            summary.skipped
        );
    }

    let filter = ExportFilter {
        persona_id: args.persona.map(Id::new),
        video_id: args.video.map(Id::new),
        kind,
    };
    let options = ExportOptions {
        include_interpolated: args.include_interpolated,
        max_interpolated_frames: args.max_frames,
    };

    let annotations = store.annotations();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stats = export::run_export(&annotations, &filter, &options, &mut out)?;
    out.flush()?;

    eprintln!(
        "exported {} annotation(s) from {} sequence(s): {} keyframe(s), {} interpolated frame(s), {} byte(s)",
        stats.annotation_count,
        stats.sequence_count,
        stats.keyframe_count,
        stats.interpolated_frame_count,
        stats.total_bytes
    );
    Ok(())
}
