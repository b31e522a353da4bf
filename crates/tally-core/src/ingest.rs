//! Reading the two input tables.
//!
//! The tables are delimited text with a header row, exported from the source
//! spreadsheets by the operator. The reader understands RFC-4180 style
//! quoting (doubled inner quotes, fields spanning newlines) and tolerates a
//! UTF-8 BOM. Only named-column access is exposed; extra columns are
//! ignored.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::model::{AuditTask, ReferenceEntry};
use crate::reference::ReferenceStore;

/// Entry-text column of the entries table.
pub const COL_ENTRY: &str = "INDEX ENTRY";
/// Code column of both tables.
pub const COL_CODE: &str = "CODE";
/// Heading column of the notes table.
pub const COL_HEADING: &str = "HEADING";
/// Inclusion notes column.
pub const COL_INCLUDES: &str = "Includes";
/// Secondary inclusion notes column.
pub const COL_INCLUDES_ALSO: &str = "IncludesAlso";
/// Exclusion notes column.
pub const COL_EXCLUDES: &str = "Excludes";

/// Sentinel for a missing heading.
pub const SENTINEL_HEADING: &str = "N/A";
/// Sentinel for missing inclusion/exclusion notes.
pub const SENTINEL_NOTES: &str = "None";

/// A parsed table: header row plus data rows.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse delimited content. The first record is the header row.
    pub fn parse(content: &str, delimiter: char) -> Self {
        let mut records = parse_records(content, delimiter);
        let headers = if records.is_empty() {
            Vec::new()
        } else {
            records.remove(0).iter().map(|h| h.trim().to_string()).collect()
        };
        Self {
            headers,
            rows: records,
        }
    }

    /// Index of a named column, exact match on the trimmed header.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell content, empty for short rows.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map_or("", String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Record-splitting state machine. Quoted fields may contain the delimiter,
/// quotes (doubled) and newlines; CRs outside quotes are dropped.
fn parse_records(content: &str, delimiter: char) -> Vec<Vec<String>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
        } else if c == '"' {
            in_quotes = true;
        } else if c == delimiter {
            record.push(std::mem::take(&mut field));
        } else if c == '\n' {
            record.push(std::mem::take(&mut field));
            let blank = record.len() == 1 && record[0].is_empty();
            if blank {
                record.clear();
            } else {
                records.push(std::mem::take(&mut record));
            }
        } else if c != '\r' {
            field.push(c);
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

fn read_table(path: &Path, delimiter: char) -> Result<Table> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read table {}", path.display()))?;
    Ok(Table::parse(&content, delimiter))
}

/// Load the ordered entry source, codes trimmed, optionally truncated.
pub fn load_entries(path: &Path, delimiter: char, limit: Option<usize>) -> Result<Vec<AuditTask>> {
    let table = read_table(path, delimiter)?;
    let entry_col = table
        .column(COL_ENTRY)
        .with_context(|| format!("{}: missing column '{}'", path.display(), COL_ENTRY))?;
    let code_col = table
        .column(COL_CODE)
        .with_context(|| format!("{}: missing column '{}'", path.display(), COL_CODE))?;

    let count = match limit {
        Some(n) => table.row_count().min(n),
        None => table.row_count(),
    };

    let mut tasks = Vec::with_capacity(count);
    for row in 0..count {
        tasks.push(AuditTask {
            position: row,
            entry: table.cell(row, entry_col).to_string(),
            code: table.cell(row, code_col).trim().to_string(),
        });
    }
    Ok(tasks)
}

/// Load the notes table into the reference store.
///
/// `CODE` is required; the descriptive columns are optional and fall back to
/// the "N/A"/"None" sentinels, as do empty cells, so prompts always see a
/// complete shape. Rows without a code are dropped.
pub fn load_reference(path: &Path, delimiter: char) -> Result<ReferenceStore> {
    let table = read_table(path, delimiter)?;
    let code_col = table
        .column(COL_CODE)
        .with_context(|| format!("{}: missing column '{}'", path.display(), COL_CODE))?;
    if table.row_count() == 0 {
        bail!("{}: reference table has no data rows", path.display());
    }

    let heading_col = table.column(COL_HEADING);
    let includes_col = table.column(COL_INCLUDES);
    let includes_also_col = table.column(COL_INCLUDES_ALSO);
    let excludes_col = table.column(COL_EXCLUDES);

    let field = |row: usize, col: Option<usize>, sentinel: &str| -> String {
        let value = col.map_or("", |c| table.cell(row, c));
        if value.trim().is_empty() {
            sentinel.to_string()
        } else {
            value.to_string()
        }
    };

    let mut rows = Vec::with_capacity(table.row_count());
    for row in 0..table.row_count() {
        let code = table.cell(row, code_col).trim().to_string();
        if code.is_empty() {
            continue;
        }
        rows.push(ReferenceEntry {
            code,
            heading: field(row, heading_col, SENTINEL_HEADING),
            includes: field(row, includes_col, SENTINEL_NOTES),
            includes_also: field(row, includes_also_col, SENTINEL_NOTES),
            excludes: field(row, excludes_col, SENTINEL_NOTES),
        });
    }
    Ok(ReferenceStore::load(rows))
}
