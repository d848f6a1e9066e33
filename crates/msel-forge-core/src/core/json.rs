// crates/msel-forge-core/src/core/json.rs
// ============================================================================
// Module: MSEL Forge Tolerant JSON Extraction
// Description: Locate and parse the first balanced JSON object in model text.
// Purpose: Recover structured agent outputs from noisy completions.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Language models wrap JSON in prose and code fences. This module locates
//! the first balanced `{...}` object in a completion, honoring string
//! literals and escapes, strips Markdown code fences, and parses the result.
//! Extraction is pure and deterministic; callers decide what a parse failure
//! means for their agent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while extracting a JSON object from model text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonExtractError {
    /// No balanced JSON object was found in the text.
    #[error("no json object found in model output")]
    NotFound,
    /// A candidate object was found but failed to parse.
    #[error("json object failed to parse: {0}")]
    Parse(String),
}

// ============================================================================
// SECTION: Extraction
// ============================================================================

/// Extracts and parses the first balanced JSON object from model text.
///
/// Code fences are stripped before scanning. String literals and escape
/// sequences are honored while balancing braces.
///
/// # Errors
///
/// Returns [`JsonExtractError::NotFound`] when no balanced object exists and
/// [`JsonExtractError::Parse`] when the candidate is not valid JSON.
pub fn extract_json_object(text: &str) -> Result<Value, JsonExtractError> {
    let stripped = strip_code_fences(text);
    let candidate = first_balanced_object(&stripped).ok_or(JsonExtractError::NotFound)?;
    serde_json::from_str(candidate).map_err(|err| JsonExtractError::Parse(err.to_string()))
}

/// Removes Markdown code-fence lines (```json, ```) from the text.
fn strip_code_fences(text: &str) -> String {
    text.lines().filter(|line| !line.trim_start().starts_with("```")).collect::<Vec<_>>().join("\n")
}

/// Returns the first balanced `{...}` slice, honoring strings and escapes.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (index, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..=start + index]);
                }
            }
            _ => {}
        }
    }
    None
}

// ============================================================================
// SECTION: Field Helpers
// ============================================================================

/// Reads a string field, tolerating absence.
#[must_use]
pub fn opt_str(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

/// Reads a boolean field, tolerating absence and defaulting.
#[must_use]
pub fn bool_or(value: &Value, field: &str, default: bool) -> bool {
    value.get(field).and_then(Value::as_bool).unwrap_or(default)
}

/// Reads a string-array field, dropping non-string entries.
#[must_use]
pub fn str_list(value: &Value, field: &str) -> Vec<String> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items.iter().filter_map(Value::as_str).map(str::to_string).collect::<Vec<String>>()
        })
        .unwrap_or_default()
}
