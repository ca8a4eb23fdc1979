//! Normalizes upstream bodies into the node's output record.
//!
//! The web unlocker does not reliably label its content type, so the format
//! is inferred from whether the body parses as JSON plus the format that was
//! requested.

use crate::constants::binary::{PNG_FILE_NAME, PNG_MIME_TYPE, SCREENSHOT_MESSAGE};
use crate::constants::upstream::ERROR_MESSAGE_FIELDS;
use crate::node::operation::OutputFormat;
use crate::utils::text::first_nonblank;
use base64::Engine;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryAttachment {
    /// Base64 (standard alphabet, padded).
    pub data: String,
    pub mime_type: String,
    pub file_name: String,
}

impl BinaryAttachment {
    pub fn png_screenshot(bytes: &[u8]) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type: PNG_MIME_TYPE.to_string(),
            file_name: PNG_FILE_NAME.to_string(),
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(self.data.as_bytes())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseRecord {
    pub json: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary: Option<BinaryAttachment>,
}

impl ResponseRecord {
    pub fn json(json: Value) -> Self {
        Self { json, binary: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::json(json!({ "error": message.into() }))
    }
}

/// What a body turned out to be once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Json,
    Text,
    Png,
}

impl BodyKind {
    /// Whether a reply `Content-Type` agrees with the inferred kind.
    pub fn matches_content_type(self, content_type: &str) -> bool {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match self {
            BodyKind::Json => mime == "application/json" || mime.ends_with("+json"),
            BodyKind::Png => mime == PNG_MIME_TYPE,
            BodyKind::Text => mime.starts_with("text/"),
        }
    }
}

pub fn parse_json_body(body: &[u8]) -> Option<Value> {
    serde_json::from_slice(body).ok()
}

/// Parsed JSON when possible, otherwise the body as text.
pub fn fetched_data(body: &[u8]) -> (BodyKind, Value) {
    match parse_json_body(body) {
        Some(parsed) => (BodyKind::Json, parsed),
        None => (
            BodyKind::Text,
            Value::String(String::from_utf8_lossy(body).into_owned()),
        ),
    }
}

pub fn search_engine_record(body: &[u8]) -> (BodyKind, ResponseRecord) {
    match fetched_data(body) {
        (BodyKind::Json, parsed) => (BodyKind::Json, ResponseRecord::json(parsed)),
        (kind, text) => (kind, ResponseRecord::json(json!({ "raw": text }))),
    }
}

pub fn universal_scrape_record(body: &[u8], format: OutputFormat) -> (BodyKind, ResponseRecord) {
    if let Some(parsed) = parse_json_body(body) {
        return (BodyKind::Json, ResponseRecord::json(parsed));
    }
    match format {
        OutputFormat::Png => (
            BodyKind::Png,
            ResponseRecord {
                json: json!({
                    "message": SCREENSHOT_MESSAGE,
                    "format": OutputFormat::Png.as_str(),
                }),
                binary: Some(BinaryAttachment::png_screenshot(body)),
            },
        ),
        OutputFormat::Html => (
            BodyKind::Text,
            ResponseRecord::json(json!({ "html": String::from_utf8_lossy(body) })),
        ),
    }
}

pub fn smart_scrape_record(
    url: &str,
    instructions: &str,
    body: &[u8],
) -> (BodyKind, ResponseRecord) {
    let (kind, raw) = fetched_data(body);
    let record = ResponseRecord::json(json!({
        "url": url,
        "instructions": instructions,
        "raw": raw,
    }));
    (kind, record)
}

/// Best-effort human-readable message from an upstream error body.
pub fn upstream_error_message(body: &[u8]) -> Option<String> {
    let parsed = parse_json_body(body)?;
    first_nonblank(
        ERROR_MESSAGE_FIELDS
            .iter()
            .map(|field| parsed.get(*field).and_then(Value::as_str)),
    )
    .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];

    #[test]
    fn json_body_is_returned_unchanged_for_any_format() {
        let body = br#"{"code":200,"data":{"title":"Example"}}"#;
        for format in [OutputFormat::Html, OutputFormat::Png] {
            let (kind, record) = universal_scrape_record(body, format);
            assert_eq!(kind, BodyKind::Json);
            assert_eq!(record.json, json!({"code": 200, "data": {"title": "Example"}}));
            assert!(record.binary.is_none());
        }
    }

    #[test]
    fn non_json_png_becomes_binary_attachment() {
        let (kind, record) = universal_scrape_record(PNG_MAGIC, OutputFormat::Png);
        assert_eq!(kind, BodyKind::Png);
        assert_eq!(
            record.json,
            json!({"message": "Screenshot captured successfully", "format": "png"})
        );
        let binary = record.binary.expect("binary attachment");
        assert_eq!(binary.mime_type, "image/png");
        assert_eq!(binary.file_name, "screenshot.png");
        assert_eq!(binary.decode().unwrap(), PNG_MAGIC);
    }

    #[test]
    fn non_json_html_is_wrapped_exactly() {
        let (kind, record) =
            universal_scrape_record(b"<html><body>hi</body></html>", OutputFormat::Html);
        assert_eq!(kind, BodyKind::Text);
        assert_eq!(record.json, json!({"html": "<html><body>hi</body></html>"}));
        assert!(record.binary.is_none());
    }

    #[test]
    fn smart_scrape_has_three_keys() {
        let (_, record) = smart_scrape_record("https://a.test", "get price", b"<p>9.99</p>");
        let obj = record.json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["url"], "https://a.test");
        assert_eq!(obj["instructions"], "get price");
        assert_eq!(obj["raw"], "<p>9.99</p>");

        let (kind, record) = smart_scrape_record("https://a.test", "x", br#"{"html":"<p/>"}"#);
        assert_eq!(kind, BodyKind::Json);
        assert_eq!(record.json["raw"], json!({"html": "<p/>"}));
    }

    #[test]
    fn search_record_wraps_non_json() {
        let (kind, record) = search_engine_record(br#"{"organic":[]}"#);
        assert_eq!((kind, record.json), (BodyKind::Json, json!({"organic": []})));
        let (kind, record) = search_engine_record(b"oops");
        assert_eq!((kind, record.json), (BodyKind::Text, json!({"raw": "oops"})));
    }

    #[test]
    fn record_serializes_binary_in_camel_case() {
        let (_, record) = universal_scrape_record(PNG_MAGIC, OutputFormat::Png);
        let value = serde_json::to_value(record).unwrap();
        assert_eq!(value["binary"]["mimeType"], "image/png");
        assert_eq!(value["binary"]["fileName"], "screenshot.png");
        let plain = serde_json::to_value(ResponseRecord::error("boom")).unwrap();
        assert_eq!(plain, json!({"json": {"error": "boom"}}));
    }

    #[test]
    fn content_type_agreement_ignores_parameters() {
        assert!(BodyKind::Json.matches_content_type("application/json; charset=utf-8"));
        assert!(BodyKind::Png.matches_content_type("image/png"));
        assert!(BodyKind::Text.matches_content_type("text/html"));
        assert!(!BodyKind::Json.matches_content_type("text/html"));
        assert!(!BodyKind::Png.matches_content_type("application/octet-stream"));
    }

    #[test]
    fn error_message_checks_fields_in_order() {
        assert_eq!(
            upstream_error_message(br#"{"code":401,"msg":"","message":"Invalid token"}"#),
            Some("Invalid token".to_string())
        );
        assert_eq!(
            upstream_error_message(br#"{"msg":"quota","message":"other"}"#),
            Some("quota".to_string())
        );
        assert_eq!(upstream_error_message(b"<html>502</html>"), None);
        assert_eq!(upstream_error_message(br#"{"status":"bad"}"#), None);
    }
}
