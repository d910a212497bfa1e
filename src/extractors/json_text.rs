use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.+?)```").expect("code block pattern"));

/// No valid JSON document could be found in the text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed JSON in response")]
pub struct MalformedResponse;

/// Pull a JSON document out of free-form model output.
///
/// Tries, in order, and returns the first candidate that parses:
/// 1. the whole trimmed text
/// 2. the contents of the first fenced code block
/// 3. the span from the first `{` to the last `}`
/// 4. the span from the first `[` to the last `]`
pub fn extract_json(text: &str) -> Result<&str, MalformedResponse> {
    let trimmed = text.trim();
    if is_valid_json(trimmed) {
        return Ok(trimmed);
    }

    if let Some(block) = CODE_BLOCK.captures(text).and_then(|c| c.get(1)) {
        let inner = block.as_str().trim();
        if is_valid_json(inner) {
            return Ok(inner);
        }
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let Some(span) = bracketed(trimmed, open, close) {
            if is_valid_json(span) {
                return Ok(span);
            }
        }
    }

    Err(MalformedResponse)
}

pub fn is_valid_json(text: &str) -> bool {
    serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok()
}

fn bracketed(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    text.get(start..end + close.len_utf8())
}
