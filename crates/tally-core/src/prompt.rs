//! Prompt construction.
//!
//! Pure and deterministic: identical inputs produce byte-identical output.
//! The reference fields already carry their load-time sentinels, so the
//! model always sees a complete, uniformly shaped block.

use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{AuditTask, ReferenceEntry};

/// Built-in system text. States the response contract the model must obey.
pub fn default_system_prompt(scheme: Option<&str>) -> String {
    let expert = match scheme {
        Some(scheme) => format!("an expert auditor of the {scheme} classification"),
        None => "an expert auditor of statistical classifications".to_string(),
    };
    format!(
        "You are {expert}. Judge whether an index entry is consistent with \
         the reference explanatory notes of its assigned code. Respond with \
         a single JSON object and nothing else: \
         {{\"is_consistent\": <bool>, \"justification\": \"<short reason>\", \
         \"confidence_score\": <number between 0 and 1>}}."
    )
}

/// Resolve the system text: override file if configured and present,
/// built-in default otherwise. A configured-but-missing file falls back to
/// the default; an existing file that cannot be read is an error.
pub fn load_system_prompt(path: Option<&Path>, scheme: Option<&str>) -> Result<String> {
    match path {
        Some(path) if path.exists() => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read system prompt {}", path.display())),
        _ => Ok(default_system_prompt(scheme)),
    }
}

/// Serialize one task and its matched reference into the user block.
pub fn build_user_prompt(task: &AuditTask, reference: &ReferenceEntry, scheme: Option<&str>) -> String {
    let notes_header = match scheme {
        Some(scheme) => format!("REFERENCE EXPLANATORY NOTES ({scheme})"),
        None => "REFERENCE EXPLANATORY NOTES".to_string(),
    };
    format!(
        "### DATA TO AUDIT\n\
         - **INDEX ENTRY:** {entry}\n\
         - **ASSIGNED CODE:** {code}\n\n\
         ### {notes_header}\n\
         - **HEADING:** {heading}\n\
         - **INCLUDES:** {includes}\n\
         - **INCLUDES ALSO:** {includes_also}\n\
         - **EXCLUDES:** {excludes}\n\n\
         ### TASK\n\
         Evaluate the consistency of the INDEX ENTRY with the REFERENCE \
         EXPLANATORY NOTES.\n\
         Return the result in the required JSON format.",
        entry = task.entry,
        code = task.code,
        heading = reference.heading,
        includes = reference.includes,
        includes_also = reference.includes_also,
        excludes = reference.excludes,
    )
}
