use crate::utils::text::truncate_utf8_prefix;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

const DEFAULT_REDACTION: &str = "[REDACTED]";
const INLINE_REDACTION: &str = "***REDACTED***";

static SENSITIVE_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "token",
        "publictoken",
        "public_token",
        "publickey",
        "public_key",
        "apikey",
        "api_key",
        "authorization",
        "password",
        "secret",
    ]
    .into_iter()
    .collect()
});

static INLINE_REDACTION_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\b(Bearer)\s+([A-Za-z0-9._~+/=-]{6,})").expect("inline redaction regex"),
            "$1 ***REDACTED***",
        ),
        (
            Regex::new(r#"\b(token|apikey|api[_-]?key|public[_-]?key|secret)\b\s*([:=])\s*([^\s"'&,]+)"#)
                .expect("inline redaction regex"),
            "$1$2***REDACTED***",
        ),
    ]
});

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = normalize_key(key);
    if normalized.is_empty() {
        return false;
    }
    SENSITIVE_KEYS.contains(normalized.as_str())
        || normalized.contains("secret")
        || normalized.ends_with("token")
}

fn truncate_string(value: &str, max_length: usize) -> String {
    if max_length == usize::MAX || value.len() <= max_length {
        return value.to_string();
    }
    format!("{}...", truncate_utf8_prefix(value, max_length))
}

fn redact_inline_secrets(value: &str, extra: Option<&[String]>) -> String {
    let mut out = value.to_string();
    for (re, replacement) in INLINE_REDACTION_PATTERNS.iter() {
        if re.is_match(&out) {
            out = re.replace_all(&out, *replacement).to_string();
        }
    }

    if let Some(values) = extra {
        for raw in values {
            let needle = raw.trim();
            // very short values would shred unrelated text
            if needle.len() < 6 {
                continue;
            }
            out = out.replace(needle, INLINE_REDACTION);
        }
    }

    out
}

pub fn redact_text(value: &str, max_string: usize, extra_secrets: Option<&[String]>) -> String {
    let redacted = redact_inline_secrets(value, extra_secrets);
    truncate_string(&redacted, max_string)
}

pub fn redact_object(value: &Value, max_string: usize, extra_secrets: Option<&[String]>) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
        Value::String(text) => Value::String(redact_text(text, max_string, extra_secrets)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| redact_object(item, max_string, extra_secrets))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, entry) in map.iter() {
                if is_sensitive_key(key) && !entry.is_null() {
                    out.insert(key.clone(), Value::String(DEFAULT_REDACTION.to_string()));
                    continue;
                }
                out.insert(key.clone(), redact_object(entry, max_string, extra_secrets));
            }
            Value::Object(out)
        }
    }
}
