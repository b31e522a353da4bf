//! Decoding the model's raw answer into a [`Judgment`].
//!
//! Models routinely wrap the JSON payload in markdown fences despite the
//! contract; the decoration is stripped before parsing. Anything that is
//! not a single JSON object after stripping is a protocol failure, which
//! the retry controller treats as permanent.

use crate::errors::{ProviderError, ProviderResult};
use crate::model::Judgment;

/// Strip markdown code-fence decoration surrounding the payload, with or
/// without a language tag.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse the fence-stripped text as a single JSON object and extract the
/// decision fields.
pub fn extract_judgment(raw: &str) -> ProviderResult<Judgment> {
    let text = strip_code_fences(raw);
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| ProviderError::Protocol {
            message: format!("response is not valid JSON: {e}"),
        })?;
    if !value.is_object() {
        return Err(ProviderError::Protocol {
            message: "response is not a JSON object".to_string(),
        });
    }
    Ok(Judgment::from_value(&value))
}
