//! Progress events emitted by the runner, one per resolved task, so an
//! operator can gauge the failure rate and abort manually. The console
//! layer consumes them through a sink.

use std::sync::Arc;

/// How one task was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Valid judgment obtained.
    Judged,
    /// Join-miss, no reference entry for the code.
    Skipped,
    /// Given up, no record written.
    Abandoned,
    /// Given up, sentinel record written.
    ErrorRecorded,
}

impl TaskOutcome {
    pub fn label(self) -> &'static str {
        match self {
            Self::Judged => "judged",
            Self::Skipped => "skipped",
            Self::Abandoned => "abandoned",
            Self::ErrorRecorded => "error-recorded",
        }
    }
}

/// One progress update: position in the run, the task's code, and how the
/// task ended.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Tasks resolved so far, this one included (1-based).
    pub done: usize,
    pub total: usize,
    pub code: String,
    pub outcome: TaskOutcome,
}

/// Sink for progress events. The runner calls this after each task.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
