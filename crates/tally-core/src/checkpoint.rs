//! Periodic durable snapshots of the accumulated records.
//!
//! A checkpoint is a full-snapshot overwrite of the whole record set so
//! far, in the same format as the final export. Simplicity over
//! efficiency, acceptable at this batch scale; the write is atomic so the
//! file is always a complete, well-formed prefix of the final result set.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::model::AuditRecord;
use crate::report::csv;

/// Writes the record set to a fixed path every `interval` processed tasks.
#[derive(Debug, Clone)]
pub struct Checkpointer {
    path: PathBuf,
    interval: usize,
}

impl Checkpointer {
    /// An interval of 0 disables checkpointing.
    pub fn new(path: impl Into<PathBuf>, interval: usize) -> Self {
        Self {
            path: path.into(),
            interval,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot the records when `position` (1-based count of processed
    /// tasks, skips included) hits the cadence. Returns whether a write
    /// happened. I/O failures are non-fatal: the run continues and the
    /// next cadence retries the same full snapshot.
    pub fn maybe_checkpoint(&self, position: usize, records: &[AuditRecord]) -> bool {
        if self.interval == 0 || position == 0 || position % self.interval != 0 {
            return false;
        }
        match csv::write_csv(&self.path, records) {
            Ok(()) => {
                debug!(
                    position,
                    records = records.len(),
                    path = %self.path.display(),
                    "checkpoint written"
                );
                true
            }
            Err(e) => {
                warn!(error = %e, position, "checkpoint write failed, continuing");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuditRecord, Judgment};

    fn record(code: &str) -> AuditRecord {
        AuditRecord {
            entry: format!("entry for {code}"),
            code: code.to_string(),
            judgment: Judgment {
                is_consistent: Some(true),
                justification: Some("ok".to_string()),
                confidence_score: None,
            },
            heading: "heading".to_string(),
        }
    }

    #[test]
    fn writes_only_on_cadence() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = Checkpointer::new(dir.path().join("partial.csv"), 3);
        let records = vec![record("01.12")];

        assert!(!checkpointer.maybe_checkpoint(1, &records));
        assert!(!checkpointer.maybe_checkpoint(2, &records));
        assert!(!checkpointer.path().exists());
        assert!(checkpointer.maybe_checkpoint(3, &records));
        assert!(checkpointer.path().exists());
        assert!(!checkpointer.maybe_checkpoint(4, &records));
        assert!(checkpointer.maybe_checkpoint(6, &records));
    }

    #[test]
    fn zero_interval_disables_checkpointing() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = Checkpointer::new(dir.path().join("partial.csv"), 0);
        assert!(!checkpointer.maybe_checkpoint(10, &[record("01.12")]));
        assert!(!checkpointer.path().exists());
    }

    #[test]
    fn snapshot_matches_rendered_records() {
        let dir = tempfile::tempdir().unwrap();
        let checkpointer = Checkpointer::new(dir.path().join("partial.csv"), 2);
        let records = vec![record("01.12"), record("01.13")];

        assert!(checkpointer.maybe_checkpoint(2, &records));

        let content = std::fs::read_to_string(checkpointer.path()).unwrap();
        assert_eq!(content, csv::render(&records));
    }

    #[test]
    fn failed_write_is_non_fatal_and_keeps_the_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.csv");
        let checkpointer = Checkpointer::new(&path, 1);

        assert!(checkpointer.maybe_checkpoint(1, &[record("01.12")]));
        let before = std::fs::read_to_string(&path).unwrap();

        // Unwritable target: the previous snapshot must survive.
        let blocked = Checkpointer::new(dir.path().join("missing").join("partial.csv"), 1);
        assert!(!blocked.maybe_checkpoint(2, &[record("01.13")]));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
