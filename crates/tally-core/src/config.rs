//! Run configuration.
//!
//! One `AuditConfig` is constructed at process start (CLI args plus
//! environment) and passed by reference into constructors. There is no
//! ambient global state.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Final export name for a full run.
pub const EXPORT_NAME: &str = "index_audit.csv";
/// Final export name when the entry source was truncated to a test subset.
pub const EXPORT_TEST_NAME: &str = "index_audit_test.csv";
/// Rolling checkpoint written during the run.
pub const CHECKPOINT_NAME: &str = "partial_results.csv";
/// Machine-readable run summary written next to the export.
pub const SUMMARY_NAME: &str = "summary.json";

/// What to do with a task that failed permanently (budget exhausted or a
/// non-transient error).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Produce no record; the loss is accepted.
    #[default]
    Drop,
    /// Emit a sentinel record with a null verdict and the error text, so the
    /// failed subset can be re-run later.
    RecordError,
}

/// Everything a run needs, with overridable policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier to request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer credential. Absence is not validated upfront; it surfaces as
    /// an authentication failure on the first call.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Human label of the classification under audit, interpolated into the
    /// prompts (e.g. "NACE Rev. 2.1").
    #[serde(default)]
    pub scheme: Option<String>,

    /// Optional file whose content replaces the built-in system prompt.
    #[serde(default)]
    pub system_prompt: Option<PathBuf>,

    /// Truncate the entry source to `test_limit` rows and switch the export
    /// name.
    #[serde(default)]
    pub test_mode: bool,

    /// Row budget for test mode.
    #[serde(default = "default_test_limit")]
    pub test_limit: usize,

    /// Total attempt budget per task (first try included).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff step: attempt `n` failing transiently sleeps
    /// `backoff_secs * n` before the next try.
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Write a full-snapshot checkpoint every this many processed tasks.
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    /// Terminal-failure policy.
    #[serde(default)]
    pub on_permanent_failure: FailurePolicy,

    /// Judgment provider: "openai" or "fake".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Field delimiter of the input tables.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Directory receiving checkpoint, export and summary files.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

fn default_endpoint() -> String {
    "http://localhost:8000/v1".to_string()
}

fn default_model() -> String {
    "default".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_test_limit() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_secs() -> u64 {
    30
}

fn default_checkpoint_interval() -> usize {
    10
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_delimiter() -> char {
    ';'
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout(),
            scheme: None,
            system_prompt: None,
            test_mode: false,
            test_limit: default_test_limit(),
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff_secs(),
            checkpoint_interval: default_checkpoint_interval(),
            on_permanent_failure: FailurePolicy::default(),
            provider: default_provider(),
            delimiter: default_delimiter(),
            out_dir: default_out_dir(),
        }
    }
}

impl AuditConfig {
    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the output directory.
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Retry knobs as the named policy the controller consumes.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_step: Duration::from_secs(self.backoff_secs),
        }
    }

    /// Destination of the final export, test-mode dependent.
    pub fn export_path(&self) -> PathBuf {
        let name = if self.test_mode {
            EXPORT_TEST_NAME
        } else {
            EXPORT_NAME
        };
        self.out_dir.join(name)
    }

    /// Destination of the rolling checkpoint.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.out_dir.join(CHECKPOINT_NAME)
    }

    /// Destination of the run summary sidecar.
    pub fn summary_path(&self) -> PathBuf {
        self.out_dir.join(SUMMARY_NAME)
    }
}
