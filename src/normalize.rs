//! Coercion of raw generated text into the canonical value stored with a cache entry.
//!
//! Providers answer with plain prose, JSON documents, JSON string literals that
//! wrap another JSON document, or bare numbers. [`normalize`] maps all of these
//! onto a [`serde_json::Value`] so that stored responses are never JSON-in-a-string.
//! It cannot fail: every interpretation that does not apply falls through to the
//! next one, ending with the trimmed text itself.

use serde_json::{Number, Value};

/// Maximum number of quoted-string layers peeled off a single payload.
pub const MAX_UNWRAP_DEPTH: usize = 10;

pub fn normalize(raw: &str) -> Value {
    let trimmed = raw.trim();

    if let Some(value) = unwrap_json(trimmed) {
        return value;
    }

    if let Some(number) = coerce_number(trimmed) {
        return Value::Number(number);
    }

    Value::String(trimmed.to_string())
}

/// Parses `text` as JSON, re-parsing as long as the result is a string.
///
/// Returns `None` only when the very first parse fails. A later failed parse
/// yields the last string that was successfully decoded.
fn unwrap_json(text: &str) -> Option<Value> {
    let mut current: Value = serde_json::from_str(text).ok()?;

    for _ in 0..MAX_UNWRAP_DEPTH {
        let Value::String(inner) = &current else {
            return Some(current);
        };
        match serde_json::from_str::<Value>(inner) {
            Ok(next) => current = next,
            Err(_) => break,
        }
    }

    Some(current)
}

/// Reads integer literals the JSON grammar rejects, such as `+7` or `007`.
/// Digits are kept verbatim, so integers wider than 64 bits stay exact.
fn coerce_number(text: &str) -> Option<Number> {
    if text.contains('.') {
        return text.parse::<f64>().ok().and_then(Number::from_f64);
    }

    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Some(Number::from(0));
    }
    format!("{}{}", sign, significant).parse::<Number>().ok()
}
