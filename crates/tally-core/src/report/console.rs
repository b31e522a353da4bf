//! Operator-facing output on stderr.
//!
//! Progress and summary lines are plain prints, not log records: they are
//! the run's user interface and must not depend on the log filter.

use std::path::Path;
use std::sync::Arc;

use crate::model::RunStats;
use crate::report::progress::{ProgressEvent, ProgressSink};

/// Format a single progress line. Deterministic, unit-testable.
#[must_use]
pub fn format_progress_line(event: &ProgressEvent) -> String {
    format!(
        "[{}/{}] {} {}",
        event.done,
        event.total,
        event.code,
        event.outcome.label()
    )
}

/// Write a progress line to stderr.
pub fn emit_progress_line(line: &str) {
    eprintln!("{line}");
}

/// Sink printing one line per resolved task to stderr.
pub fn stderr_progress_sink() -> ProgressSink {
    Arc::new(|event: ProgressEvent| emit_progress_line(&format_progress_line(&event)))
}

/// Print the end-of-run summary block to stderr.
pub fn print_summary(stats: &RunStats, export: &Path) {
    eprintln!();
    eprintln!("Audit complete: {} tasks processed", stats.processed);
    eprintln!("  judged         {}", stats.judged);
    eprintln!("  skipped        {}", stats.skipped);
    eprintln!("  abandoned      {}", stats.abandoned);
    eprintln!("  error-recorded {}", stats.error_recorded);
    eprintln!("  attempts       {}", stats.attempts);
    eprintln!("Results written to {}", export.display());
}
