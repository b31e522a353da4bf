//! CSV rendering of audit records.
//!
//! The checkpoint and the final export share this format: semicolon
//! delimited, UTF-8 with a BOM prefix so spreadsheet tools pick the right
//! encoding, codes forced to text with a leading apostrophe so "01.12"
//! keeps its leading zero.

use std::path::Path;

use anyhow::{Context, Result};

use crate::model::AuditRecord;

/// Byte-order mark written at the start of every output file.
pub const BOM: char = '\u{feff}';
/// Output field delimiter. Fixed regardless of the input delimiter.
pub const DELIMITER: char = ';';
/// Header row of checkpoint and export files.
pub const HEADER: &str = "Index_Entry;Code;Is_Consistent;Justification;Confidence_Score;Heading_Ref";

/// RFC-4180 quoting: fields containing the delimiter, quotes or line breaks
/// are wrapped in quotes with inner quotes doubled.
fn escape(field: &str) -> String {
    if field.contains(DELIMITER) || field.contains('"') || field.contains('\n') || field.contains('\r')
    {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Defeat numeric auto-coercion in spreadsheet tools.
fn force_text(code: &str) -> String {
    format!("'{code}")
}

fn render_row(record: &AuditRecord) -> String {
    let verdict = record
        .judgment
        .is_consistent
        .map(|v| v.to_string())
        .unwrap_or_default();
    let justification = record.judgment.justification.as_deref().unwrap_or("");
    let confidence = record
        .judgment
        .confidence_score
        .map(|c| c.to_string())
        .unwrap_or_default();
    [
        escape(&record.entry),
        escape(&force_text(&record.code)),
        verdict,
        escape(justification),
        confidence,
        escape(&record.heading),
    ]
    .join(&DELIMITER.to_string())
}

/// Render the full file content: BOM, header, one row per record in
/// encounter order. A shorter record slice renders to a strict textual
/// prefix of a longer one, which is what makes checkpoints prefixes of the
/// final export.
pub fn render(records: &[AuditRecord]) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str(HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&render_row(record));
        out.push('\n');
    }
    out
}

/// Write the rendered records atomically: temp file in the same directory,
/// then rename, so no partial state is ever observable at `path`.
pub fn write_csv(path: &Path, records: &[AuditRecord]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, render(records))
        .with_context(|| format!("failed to write {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("failed to rename {} into place", temp_path.display()))?;
    Ok(())
}
