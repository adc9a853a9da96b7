//! Phase 1: parsing the line-oriented exchange format.
//!
//! Each input line is a JSON object `{"type": ..., "data": {...}}`. Lines
//! are checked individually and every problem is collected with its
//! 1-based line number, so one pass over the response fixes the whole
//! file.

use std::fmt;
use std::io::BufRead;

use serde_json::Value;

use crate::error::SeqlabelError;
use crate::model::Record;
use crate::validation::Severity;

/// A record paired with the exchange line it came from.
#[derive(Clone, Debug)]
pub struct ParsedRecord {
    /// 1-based line number in the input.
    pub line: usize,
    pub record: Record,
}

/// One problem tied to an input line.
#[derive(Clone, Debug)]
pub struct LineIssue {
    /// 1-based line number in the input.
    pub line: usize,
    pub severity: Severity,
    pub message: String,
}

impl LineIssue {
    pub fn error(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for LineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(f, "[{}] line {}: {}", severity, self.line, self.message)
    }
}

/// Parses every line, collecting records and per-line issues side by side.
///
/// Blank lines are skipped. Used by [`crate::import::validate_import`],
/// which wants the full picture even when some lines are broken.
pub fn parse_lines_lenient<R: BufRead>(
    reader: R,
) -> Result<(Vec<ParsedRecord>, Vec<LineIssue>), SeqlabelError> {
    let mut records = Vec::new();
    let mut issues = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let text = line?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_line(trimmed) {
            Ok(record) => records.push(ParsedRecord {
                line: line_no,
                record,
            }),
            Err(message) => issues.push(LineIssue::error(line_no, message)),
        }
    }

    Ok((records, issues))
}

/// Parses every line, aborting with the complete problem list if any line
/// is malformed or schema-invalid. No partial batch escapes this phase.
pub fn parse_lines<R: BufRead>(reader: R) -> Result<Vec<ParsedRecord>, SeqlabelError> {
    let (records, issues) = parse_lines_lenient(reader)?;
    if issues.is_empty() {
        Ok(records)
    } else {
        Err(SeqlabelError::ImportParse { errors: issues })
    }
}

fn parse_line(text: &str) -> Result<Record, String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("malformed JSON: {}", e))?;

    let object = value
        .as_object()
        .ok_or_else(|| "line is not a JSON object".to_string())?;

    // Distinguish the envelope errors from payload schema errors; the
    // messages differ even though both are fatal.
    match object.get("type") {
        None => return Err("record is missing 'type'".to_string()),
        Some(Value::String(_)) => {}
        Some(_) => return Err("record 'type' is not a string".to_string()),
    }
    if !object.contains_key("data") {
        return Err("record is missing 'data'".to_string());
    }

    serde_json::from_value(value).map_err(|e| format!("invalid record: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecordKind;
    use std::io::Cursor;

    #[test]
    fn test_parses_records_with_line_numbers() {
        let input = "\n{\"type\":\"persona\",\"data\":{\"id\":\"p1\",\"name\":\"P\"}}\n\n{\"type\":\"video\",\"data\":{\"id\":\"v1\"}}\n";
        let records = parse_lines(Cursor::new(input)).expect("parse succeeds");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[0].record.kind(), RecordKind::Persona);
        assert_eq!(records[1].line, 4);
        assert_eq!(records[1].record.kind(), RecordKind::Video);
    }

    #[test]
    fn test_malformed_json_reports_line() {
        let input = "{\"type\":\"video\",\"data\":{\"id\":\"v1\"}}\nnot json\n";
        let err = parse_lines(Cursor::new(input)).unwrap_err();
        match err {
            SeqlabelError::ImportParse { errors } => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].line, 2);
                assert!(errors[0].message.contains("malformed JSON"));
            }
            other => panic!("expected ImportParse, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_type_and_data_both_named() {
        let input = "{\"data\":{}}\n{\"type\":\"video\"}\n";
        let err = parse_lines(Cursor::new(input)).unwrap_err();
        match err {
            SeqlabelError::ImportParse { errors } => {
                assert_eq!(errors.len(), 2);
                assert!(errors[0].message.contains("missing 'type'"));
                assert!(errors[1].message.contains("missing 'data'"));
            }
            other => panic!("expected ImportParse, got {other:?}"),
        }
    }

    #[test]
    fn test_schema_error_for_missing_required_field() {
        // world-entity requires a name.
        let input = "{\"type\":\"world-entity\",\"data\":{\"id\":\"e1\"}}\n";
        let err = parse_lines(Cursor::new(input)).unwrap_err();
        match err {
            SeqlabelError::ImportParse { errors } => {
                assert_eq!(errors[0].line, 1);
                assert!(errors[0].message.contains("invalid record"));
            }
            other => panic!("expected ImportParse, got {other:?}"),
        }
    }

    #[test]
    fn test_all_problem_lines_collected() {
        let input = "garbage\n{\"type\":\"video\",\"data\":{\"id\":\"v1\"}}\n{\"bad\":true}\n";
        let (records, issues) =
            parse_lines_lenient(Cursor::new(input)).expect("lenient parse never aborts");
        assert_eq!(records.len(), 1);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].line, 1);
        assert_eq!(issues[1].line, 3);
    }
}
