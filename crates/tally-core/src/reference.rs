//! In-memory lookup from classification code to reference notes.

use std::collections::HashMap;

use crate::model::ReferenceEntry;

/// Code-to-notes map built once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    entries: HashMap<String, ReferenceEntry>,
}

impl ReferenceStore {
    /// Build the store from loaded rows.
    ///
    /// Codes are not unique-enforced: the first row for a code wins and
    /// later duplicates are ignored.
    pub fn load(rows: impl IntoIterator<Item = ReferenceEntry>) -> Self {
        let mut entries = HashMap::new();
        for row in rows {
            entries.entry(row.code.clone()).or_insert(row);
        }
        Self { entries }
    }

    /// Exact-match lookup on the trimmed code.
    ///
    /// A miss is a normal silent outcome (the task is skipped), not an
    /// error.
    pub fn lookup(&self, code: &str) -> Option<&ReferenceEntry> {
        self.entries.get(code.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
