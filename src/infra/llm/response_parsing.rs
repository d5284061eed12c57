use serde_json::{Map, Value};
use tracing::debug;

const MAX_ERROR_MESSAGE_LEN: usize = 256;

/// Keys checked, in priority order, when the endpoint answers with a JSON object.
pub const CANDIDATE_KEYS: &[&str] = &["response", "result", "output", "text", "data", "message"];

pub(crate) fn truncate_message(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

/// Best-effort plain-text answer from a raw response body.
///
/// Probes `object -> candidate keys -> first string value -> raw body`, then
/// unquotes a result that is itself a JSON string literal. Never fails; an
/// empty string means nothing usable was returned.
pub fn extract_text(raw_body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(raw_body).ok();

    let selected = match parsed.as_ref() {
        Some(Value::Object(map)) => lookup_candidate_keys(map).or_else(|| first_string_value(map)),
        Some(Value::String(text)) => {
            debug!("response body is a bare JSON string");
            Some(text.as_str())
        }
        Some(_) | None => None,
    };

    let text = selected.unwrap_or_else(|| {
        debug!("falling back to raw response body");
        raw_body
    });

    unquote_json_string(text)
}

fn lookup_candidate_keys(map: &Map<String, Value>) -> Option<&str> {
    CANDIDATE_KEYS.iter().find_map(|key| {
        let text = non_blank_str(map.get(*key)?)?;
        debug!(key = *key, "response text found under candidate key");
        Some(text)
    })
}

fn first_string_value(map: &Map<String, Value>) -> Option<&str> {
    map.iter().find_map(|(key, value)| {
        let text = non_blank_str(value)?;
        debug!(key = key.as_str(), "response text found under first string value");
        Some(text)
    })
}

fn non_blank_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|text| !text.trim().is_empty())
}

/// Decodes `text` when, once trimmed, it is wrapped in a matching `"` or `'`
/// pair and parses as a JSON string literal. Otherwise returns `text` as-is.
pub fn unquote_json_string(text: &str) -> String {
    let trimmed = text.trim();
    if !is_quote_wrapped(trimmed) {
        return text.to_string();
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(unquoted)) => unquoted,
        _ => text.to_string(),
    }
}

fn is_quote_wrapped(text: &str) -> bool {
    ['"', '\''].iter().any(|quote| {
        text.len() >= 2 && text.starts_with(*quote) && text.ends_with(*quote)
    })
}
