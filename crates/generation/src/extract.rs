//! Code extraction from raw model responses
//!
//! Locates the first fenced code block in the response and returns its body
//! with the fence markers, language tag, and surrounding whitespace removed.
//! When the model emits several blocks the first one wins; that is a
//! deliberate tie-break matching the prompt contract ("exactly one block"),
//! not an oversight. The extractor never interprets the code - semantics are
//! the sandbox's job.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::types::GeneratedCode;

/// Extraction failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// The response contains no fenced code block (or only an empty one).
    /// Responses without a fence are rejected rather than executed as-is:
    /// leniency here would widen the execution surface.
    #[error("no fenced code block found in model response")]
    NoCodeFound,
}

static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    // Opening fence with optional language tag, non-greedy body, closing fence.
    Regex::new(r"(?s)```[ \t]*[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)```").expect("fence regex compiles")
});

/// Extract the first fenced code block from a raw model response.
///
/// Pure function - no IO, no validation of the code's meaning.
pub fn extract_code(raw: &str) -> Result<GeneratedCode, ExtractError> {
    let captures = FENCED_BLOCK.captures(raw).ok_or(ExtractError::NoCodeFound)?;
    let body = captures
        .get(1)
        .map(|m| m.as_str().trim())
        .unwrap_or_default();

    if body.is_empty() {
        return Err(ExtractError::NoCodeFound);
    }

    Ok(GeneratedCode::new(body))
}
