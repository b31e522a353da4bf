//! Machine-readable run summary, written next to the export.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::AuditConfig;
use crate::engine::RunOutcome;
use crate::model::RunStats;

/// Current schema version for summary.json.
pub const SCHEMA_VERSION: u32 = 1;

/// What a finished run looked like: provenance, totals, timing, and where
/// the export went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Schema version for compatibility detection.
    pub schema_version: u32,
    pub provider: String,
    pub model: String,
    pub test_mode: bool,
    pub stats: RunStats,
    /// RFC 3339 timestamps.
    pub started_at: String,
    pub finished_at: String,
    pub export: String,
}

impl RunSummary {
    pub fn new(config: &AuditConfig, outcome: &RunOutcome) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            provider: config.provider.clone(),
            model: config.model.clone(),
            test_mode: config.test_mode,
            stats: outcome.stats.clone(),
            started_at: outcome.started_at.to_rfc3339(),
            finished_at: outcome.finished_at.to_rfc3339(),
            export: config.export_path().display().to_string(),
        }
    }
}

/// Write the summary sidecar. Callers treat a failure here as a warning,
/// not a run failure: the export already succeeded.
pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(summary)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
