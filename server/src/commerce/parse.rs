//! Permissive JSON parsing for platform responses.
//!
//! Plugins and themes routinely prepend notices, BOMs or stray whitespace
//! to AJAX output. A strict parse is tried first; failing that, the
//! outermost `{...}` or `[...]` span is parsed on its own.

use serde_json::Value;

use super::types::CommerceError;

const SNIPPET_CHARS: usize = 200;

/// Parse a platform body, falling back to the embedded JSON span.
///
/// # Errors
///
/// [`CommerceError::NotJson`] when no JSON value can be recovered.
pub fn parse_permissive(text: &str) -> Result<Value, CommerceError> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }
    embedded_span(trimmed)
        .and_then(|span| serde_json::from_str(span).ok())
        .ok_or_else(|| CommerceError::NotJson { snippet: snippet(text) })
}

/// Best-effort parse of an error body; never fails.
#[must_use]
pub fn parse_error_body(text: &str) -> Option<Value> {
    parse_permissive(text).ok()
}

/// First `SNIPPET_CHARS` characters, for logs and error payloads.
#[must_use]
pub fn snippet(text: &str) -> String {
    text.chars().take(SNIPPET_CHARS).collect()
}

fn embedded_span(text: &str) -> Option<&str> {
    let start = text.find(['{', '['])?;
    let close = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
