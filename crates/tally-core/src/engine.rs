//! The sequential audit driver.
//!
//! One task is fully resolved (judged, skipped, or abandoned) before the
//! next begins; the only suspension point is the retry controller's backoff
//! sleep. The growing record collection is touched by this one driver only,
//! so there is nothing to lock. On process termination the last checkpoint
//! is the recovery point.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::checkpoint::Checkpointer;
use crate::config::{AuditConfig, FailurePolicy};
use crate::model::{AuditRecord, AuditTask, Judgment, RunStats};
use crate::prompt;
use crate::providers::LlmClient;
use crate::reference::ReferenceStore;
use crate::report::progress::{ProgressEvent, ProgressSink, TaskOutcome};
use crate::retry::{RetryController, TaskResolution};

/// What a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// Records in task encounter order.
    pub records: Vec<AuditRecord>,
    pub stats: RunStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Drives the entry source to completion against one judgment client.
pub struct AuditRunner {
    client: Arc<dyn LlmClient>,
    controller: RetryController,
    store: ReferenceStore,
    checkpointer: Checkpointer,
    system_prompt: String,
    scheme: Option<String>,
    failure_policy: FailurePolicy,
    progress: Option<ProgressSink>,
}

impl AuditRunner {
    pub fn new(
        client: Arc<dyn LlmClient>,
        config: &AuditConfig,
        store: ReferenceStore,
        system_prompt: String,
    ) -> Self {
        Self {
            client,
            controller: RetryController::new(config.retry_policy()),
            store,
            checkpointer: Checkpointer::new(config.checkpoint_path(), config.checkpoint_interval),
            system_prompt,
            scheme: config.scheme.clone(),
            failure_policy: config.on_permanent_failure,
            progress: None,
        }
    }

    /// Emit a progress event after each resolved task.
    pub fn with_progress(mut self, sink: ProgressSink) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Process every task in order. Never fails: terminal per-task failures
    /// are absorbed by the failure policy, and checkpoint I/O errors only
    /// warn. The caller exports the returned records.
    pub async fn run(&self, tasks: &[AuditTask]) -> RunOutcome {
        let started_at = Utc::now();
        let total = tasks.len();
        let mut records: Vec<AuditRecord> = Vec::new();
        let mut stats = RunStats::default();

        for task in tasks {
            stats.processed += 1;

            let outcome = match self.store.lookup(&task.code) {
                None => {
                    debug!(code = %task.code, position = task.position, "no reference entry, skipping");
                    stats.skipped += 1;
                    TaskOutcome::Skipped
                }
                Some(reference) => {
                    let user = prompt::build_user_prompt(task, reference, self.scheme.as_deref());
                    match self
                        .controller
                        .run_task(self.client.as_ref(), &self.system_prompt, &user)
                        .await
                    {
                        TaskResolution::Judged { judgment, attempts } => {
                            stats.attempts += u64::from(attempts);
                            stats.judged += 1;
                            records.push(AuditRecord {
                                entry: task.entry.clone(),
                                code: task.code.clone(),
                                judgment,
                                heading: reference.heading.clone(),
                            });
                            TaskOutcome::Judged
                        }
                        TaskResolution::Abandoned { error, attempts } => {
                            stats.attempts += u64::from(attempts);
                            stats.abandoned += 1;
                            warn!(code = %task.code, error = %error, attempts, "task abandoned");
                            match self.failure_policy {
                                FailurePolicy::Drop => TaskOutcome::Abandoned,
                                FailurePolicy::RecordError => {
                                    stats.error_recorded += 1;
                                    records.push(AuditRecord {
                                        entry: task.entry.clone(),
                                        code: task.code.clone(),
                                        judgment: Judgment {
                                            is_consistent: None,
                                            justification: Some(format!("ERROR: {error}")),
                                            confidence_score: None,
                                        },
                                        heading: reference.heading.clone(),
                                    });
                                    TaskOutcome::ErrorRecorded
                                }
                            }
                        }
                    }
                }
            };

            if let Some(sink) = &self.progress {
                sink(ProgressEvent {
                    done: stats.processed,
                    total,
                    code: task.code.clone(),
                    outcome,
                });
            }
            // Cadence counts every processed task, skips included.
            self.checkpointer.maybe_checkpoint(stats.processed, &records);
        }

        info!(
            judged = stats.judged,
            skipped = stats.skipped,
            abandoned = stats.abandoned,
            "entry source exhausted"
        );
        RunOutcome {
            records,
            stats,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
