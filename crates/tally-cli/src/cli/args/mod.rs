use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tally_core::FailurePolicy;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Audits a classification index against the reference explanatory notes of its codes with an LLM judge"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the audit over an entries table and a notes table
    Audit(AuditArgs),
    Version,
}

/// Terminal-failure policy, as a CLI value.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Produce no record for the failed task
    Drop,
    /// Emit a sentinel record with the error text
    RecordError,
}

impl From<FailureMode> for FailurePolicy {
    fn from(mode: FailureMode) -> Self {
        match mode {
            FailureMode::Drop => FailurePolicy::Drop,
            FailureMode::RecordError => FailurePolicy::RecordError,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// OpenAI-compatible chat-completions endpoint
    Openai,
    /// Offline canned verdicts (smoke runs, tests)
    Fake,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Self::Openai => "openai",
            Self::Fake => "fake",
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct AuditArgs {
    /// Entries table (columns: INDEX ENTRY, CODE)
    #[arg(long)]
    pub entries: PathBuf,

    /// Reference notes table (columns: CODE, HEADING, Includes, IncludesAlso, Excludes)
    #[arg(long)]
    pub notes: PathBuf,

    /// Base URL of the judgment endpoint
    #[arg(long, env = "TALLY_ENDPOINT", default_value = "http://localhost:8000/v1")]
    pub endpoint: String,

    /// Model identifier to request
    #[arg(long, env = "TALLY_MODEL", default_value = "default")]
    pub model: String,

    /// Bearer credential; a missing key surfaces as an auth failure on the first call
    #[arg(long, env = "TALLY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Process only the first --limit rows and switch the export name
    #[arg(long)]
    pub test_mode: bool,

    /// Row budget for test mode
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Directory receiving checkpoint, export and summary files
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Field delimiter of the input tables
    #[arg(long, default_value_t = ';')]
    pub delimiter: char,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    pub timeout_secs: u64,

    /// Total attempt budget per task, first try included
    #[arg(long, default_value_t = 3)]
    pub max_attempts: u32,

    /// Linear backoff step in seconds between transient retries
    #[arg(long, default_value_t = 30)]
    pub backoff_secs: u64,

    /// Write a checkpoint every this many processed tasks (0 disables)
    #[arg(long, default_value_t = 10)]
    pub checkpoint_every: usize,

    /// What to do with a task that failed permanently
    #[arg(long, value_enum, default_value_t = FailureMode::Drop)]
    pub on_permanent_failure: FailureMode,

    /// Human label of the classification, interpolated into the prompts
    #[arg(long)]
    pub scheme: Option<String>,

    /// File whose content replaces the built-in system prompt
    #[arg(long)]
    pub system_prompt: Option<PathBuf>,

    /// Judgment provider
    #[arg(long, value_enum, default_value_t = Provider::Openai)]
    pub provider: Provider,
}
