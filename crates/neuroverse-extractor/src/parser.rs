//! Forgiving parser for model-produced dump item arrays
//!
//! Models asked for `[{"text": .., "tag": .., "priority": ..}]` return
//! something close to it most of the time. This module recovers as many
//! items as it can and silently drops the rest; it never fails.
//!
//! 1. Everything from the first `[` to the last `]` is taken as the array.
//!    No such span means no items.
//! 2. If that span is valid JSON it is used directly.
//! 3. Otherwise every flat `{ .. }` object (one without an inner `{`) is
//!    recovered on its own, tolerating unquoted values, a blank key in place
//!    of `"tag"`, a missing opening quote, and missing commas between
//!    properties.
//!
//! Objects nested inside an item are not supported in step 3: the inner
//! object is scanned as if it were an item and the outer one is lost.

use crate::error::ExtractorError;
use neuroverse_domain::{DumpItem, Priority, Tag};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Keys that may carry the tag, in lookup order
///
/// Some models emit the tag under an empty key (`"":"cost"`).
const TAG_KEYS: [&str; 2] = ["tag", ""];

/// Recover dump items from raw model output, in source order
pub fn extract_items(raw: &str) -> Vec<DumpItem> {
    let Some(span) = bracketed_span(raw) else {
        debug!("No array found in {} chars of model output", raw.len());
        return Vec::new();
    };

    if let Ok(values) = serde_json::from_str::<Vec<Value>>(span) {
        return values
            .iter()
            .enumerate()
            .filter_map(|(idx, value)| {
                let item = value.as_object().and_then(item_from_object);
                if item.is_none() {
                    warn!("Dropping element {}: no usable text", idx);
                }
                item
            })
            .collect();
    }

    debug!("Array is not valid JSON, recovering objects individually");
    flat_objects(span)
        .into_iter()
        .enumerate()
        .filter_map(|(idx, body)| {
            let item = item_from_body(body);
            if item.is_none() {
                warn!("Dropping object {}: no usable text", idx);
            }
            item
        })
        .collect()
}

/// Serialize items as a well-formed JSON array
///
/// Feeding the output back through [`extract_items`] yields the same items.
pub fn serialize_items(items: &[DumpItem]) -> Result<String, ExtractorError> {
    Ok(serde_json::to_string(items)?)
}

fn bracketed_span(raw: &str) -> Option<&str> {
    let start = raw.find('[')?;
    let end = raw.rfind(']')?;
    (end > start).then(|| &raw[start..=end])
}

fn item_from_object(object: &Map<String, Value>) -> Option<DumpItem> {
    let text = object.get("text")?.as_str()?;

    let tag = TAG_KEYS
        .iter()
        .filter_map(|key| object.get(*key))
        .filter_map(Value::as_str)
        .find_map(Tag::parse)
        .unwrap_or_default();

    let priority = object
        .get("priority")
        .and_then(Value::as_str)
        .and_then(Priority::parse)
        .unwrap_or_default();

    DumpItem::new(text, tag, priority)
}

/// Bodies of every `{ .. }` pair with no `{` or `}` inside
fn flat_objects(span: &str) -> Vec<&str> {
    let mut bodies = Vec::new();
    let mut open = None;

    for (i, byte) in span.bytes().enumerate() {
        match byte {
            b'{' => open = Some(i + 1),
            b'}' => {
                if let Some(start) = open.take() {
                    bodies.push(&span[start..i]);
                }
            }
            _ => {}
        }
    }

    bodies
}

fn item_from_body(body: &str) -> Option<DumpItem> {
    let text = value_after(body, "text")?;

    let tag = TAG_KEYS
        .iter()
        .filter_map(|key| value_after(body, key))
        .find_map(|value| Tag::parse(&value))
        .unwrap_or_default();

    let priority = value_after(body, "priority")
        .and_then(|value| Priority::parse(&value))
        .unwrap_or_default();

    DumpItem::new(text, tag, priority)
}

/// Value of `key` inside a flat object body, repaired
fn value_after(body: &str, key: &str) -> Option<String> {
    value_start(body, key).map(read_value)
}

/// Text following `"key":`
///
/// A match counts only in key position: at the start of the body, or after a
/// `,` or a closing `"` (the latter covers a missing comma).
fn value_start<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!("\"{}\"", key);
    let mut from = 0;

    while let Some(found) = body[from..].find(&pattern) {
        let at = from + found;
        let before = body[..at].trim_end();

        if before.is_empty() || before.ends_with(',') || before.ends_with('"') {
            let after = body[at + pattern.len()..].trim_start();
            if let Some(value) = after.strip_prefix(':') {
                return Some(value);
            }
        }
        from = at + 1;
    }

    None
}

fn read_value(rest: &str) -> String {
    let rest = rest.trim_start();

    match rest.strip_prefix('"') {
        Some(quoted) => match closing_quote(quoted) {
            Some(end) => {
                let literal = &rest[..end + 2];
                serde_json::from_str::<String>(literal)
                    .unwrap_or_else(|_| quoted[..end].to_string())
            }
            None => strip_noise(quoted),
        },
        // Bare token or missing opening quote: runs up to the next quote
        None => {
            let end = rest.find('"').unwrap_or(rest.len());
            strip_noise(&rest[..end])
        }
    }
}

/// Byte offset of the first unescaped `"`
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, byte) in s.bytes().enumerate() {
        match byte {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'"' => return Some(i),
            _ => {}
        }
    }
    None
}

fn strip_noise(s: &str) -> String {
    s.trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '"' | ',' | '}'))
        .trim_start()
        .to_string()
}
