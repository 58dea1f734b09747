//! Recovery of a JSON record from free-text annotator output.
//!
//! Responses are supposed to be a single JSON object but arrive wrapped in
//! markdown fences, surrounded by explanatory prose, or with stray text
//! glued onto the end. Strategies are tried in order, first success wins:
//! parse the whole text, parse a fenced block, scan for the first balanced
//! brace span. Failure is always explicit; there is no fabricated empty
//! record on the failure path.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::coerce::{coerce_record, ExtractedRecord};
use crate::error::ExtractError;

static JSON_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid regex"));

static ANY_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```\s*(.*?)\s*```").expect("valid regex"));

/// Extracts and coerces the first JSON object found in `raw`.
///
/// # Errors
///
/// [`ExtractError::EmptyInput`] when the input has no content at all, and
/// [`ExtractError::NoJsonObject`] when no strategy recovers a parseable
/// object. The two are deliberately distinct so callers can tell "nothing
/// to analyze" from "analysis output was unusable".
pub fn extract(raw: &str) -> Result<ExtractedRecord, ExtractError> {
    let scrubbed = scrub_hallucinations(raw);
    let text = scrubbed.trim();
    if text.is_empty() {
        return Err(ExtractError::EmptyInput);
    }

    let record = find_object(text).ok_or(ExtractError::NoJsonObject)?;
    Ok(coerce_record(record))
}

/// Best-effort cleanup of known model-output artifacts.
///
/// Strips a leading byte-order mark, drops control characters other than
/// tabs and line breaks, and collapses consecutive duplicate prose lines
/// (a fingerprint of looping generations). Heuristic only: extraction must
/// not depend on it, and JSON content passes through unchanged.
#[must_use]
pub fn scrub_hallucinations(raw: &str) -> String {
    let cleaned: String = raw
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();

    let mut kept: Vec<&str> = Vec::new();
    for line in cleaned.lines() {
        if is_prose_line(line) && kept.last() == Some(&line) {
            continue;
        }
        kept.push(line);
    }
    kept.join("\n")
}

/// A line with no JSON punctuation at all is treated as prose.
fn is_prose_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !trimmed.contains(['{', '}', '[', ']', '"', ':'])
        && trimmed.chars().any(char::is_alphabetic)
}

fn find_object(text: &str) -> Option<Map<String, Value>> {
    if text.starts_with('{') && text.ends_with('}') {
        if let Some(record) = parse_object_lenient(text) {
            return Some(record);
        }
    }

    if let Some(candidate) = fenced_candidate(text) {
        if let Some(record) = parse_object_lenient(candidate) {
            tracing::debug!("extracted record from fenced block");
            return Some(record);
        }
    }

    if let Some(candidate) = first_balanced_object(text) {
        if let Some(record) = parse_object_lenient(candidate) {
            tracing::debug!("extracted record by brace scan");
            return Some(record);
        }
    }

    None
}

/// Contents of the first markdown fence worth trying: a ```json block, or
/// an untagged block that at least looks like an object.
fn fenced_candidate(text: &str) -> Option<&str> {
    if let Some(caps) = JSON_FENCE_RE.captures(text) {
        return caps.get(1).map(|m| m.as_str());
    }
    let candidate = ANY_FENCE_RE.captures(text)?.get(1)?.as_str();
    (candidate.starts_with('{') && candidate.ends_with('}')).then_some(candidate)
}

/// Strict parse with trailing-junk repair.
///
/// An EOF error means the object itself is incomplete; repair must not
/// invent a closing for it, so only non-EOF failures go through
/// [`repair_trailing`].
fn parse_object_lenient(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(record)) => Some(record),
        Ok(_) => None,
        Err(err) if err.is_eof() => None,
        Err(_) => repair_trailing(candidate),
    }
}

/// Retries prefixes ending at each closing brace or bracket, shortest
/// first, accepting the first prefix that parses as an object. Recovers a
/// well-formed record with stray text appended after it.
fn repair_trailing(text: &str) -> Option<Map<String, Value>> {
    for (i, byte) in text.bytes().enumerate() {
        if byte != b'}' && byte != b']' {
            continue;
        }
        if let Ok(Value::Object(record)) = serde_json::from_str::<Value>(&text[..=i]) {
            tracing::debug!(
                kept = i + 1,
                total = text.len(),
                "repaired record by dropping trailing bytes"
            );
            return Some(record);
        }
    }
    None
}

/// Finds the first substring starting at `{` that returns to brace depth
/// zero, ignoring braces inside string literals.
fn first_balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut begin: Option<usize> = None;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == b'"' {
                in_string = false;
            }
            continue;
        }
        match byte {
            b'"' if begin.is_some() => in_string = true,
            b'{' => {
                if begin.is_none() {
                    begin = Some(i);
                }
                depth += 1;
            }
            b'}' => {
                if let Some(start) = begin {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    None
}
