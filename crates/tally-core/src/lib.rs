//! Core pipeline of `tally`: audits the consistency between a
//! classification index and the reference explanatory notes of its codes,
//! one language-model judgment per entry.
//!
//! The flow is strictly sequential: the entry source is joined against the
//! [`ReferenceStore`], matched tasks go through the prompt builder to an
//! [`LlmClient`] guarded by the [`RetryController`], and resolved records
//! accumulate in the [`AuditRunner`], which checkpoints periodically and
//! hands the final set back for export.

pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod errors;
pub mod ingest;
pub mod judge;
pub mod model;
pub mod prompt;
pub mod providers;
pub mod reference;
pub mod report;
pub mod retry;

pub use config::{AuditConfig, FailurePolicy};
pub use engine::{AuditRunner, RunOutcome};
pub use errors::{ProviderError, ProviderResult};
pub use model::{AuditRecord, AuditTask, Judgment, ReferenceEntry, RunStats};
pub use providers::{FakeClient, LlmClient, OpenAiClient};
pub use reference::ReferenceStore;
pub use retry::{RetryController, RetryPolicy, TaskResolution};
