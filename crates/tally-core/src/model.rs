//! Domain types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Reference notes for one classification code.
///
/// Built once at startup from the notes table and read-only afterwards.
/// Missing source cells are replaced at load time ("N/A" for the heading,
/// "None" for the other fields) so prompts always see a complete shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub code: String,
    pub heading: String,
    pub includes: String,
    pub includes_also: String,
    pub excludes: String,
}

/// One index row to audit: free text plus its assigned code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTask {
    /// 0-based row position in the entry source.
    pub position: usize,
    pub entry: String,
    /// Whitespace-trimmed at load.
    pub code: String,
}

/// The model's structured answer.
///
/// Decoding is permissive: an absent or mistyped field becomes `None`, it
/// never fails the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Judgment {
    pub is_consistent: Option<bool>,
    pub justification: Option<String>,
    pub confidence_score: Option<f64>,
}

impl Judgment {
    /// Extract the decision fields from a parsed JSON object.
    pub fn from_value(value: &serde_json::Value) -> Self {
        Self {
            is_consistent: value.get("is_consistent").and_then(|v| v.as_bool()),
            justification: value
                .get("justification")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            confidence_score: value.get("confidence_score").and_then(|v| v.as_f64()),
        }
    }
}

/// One output row: task fields, judgment fields, matched reference heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub entry: String,
    pub code: String,
    pub judgment: Judgment,
    pub heading: String,
}

/// Counts reported at the end of a run and in the summary sidecar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Tasks taken from the entry source (including skips).
    pub processed: usize,
    /// Tasks with a parsed judgment.
    pub judged: usize,
    /// Join-misses.
    pub skipped: usize,
    /// Tasks given up on (dropped or error-recorded).
    pub abandoned: usize,
    /// Abandoned tasks that produced a sentinel record.
    pub error_recorded: usize,
    /// Total judgment calls made, retries included.
    pub attempts: u64,
}
