//! Operation → upstream form-field mapping.
//!
//! The upstream form parser is string-typed and case-sensitive, so every
//! quirk lives in its own small function here.

use crate::errors::NodeError;
use crate::node::operation::{OutputFormat, SearchEngineKind};
use serde::Serialize;

/// Which upstream base URL a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    ScraperApi,
    WebUnlocker,
}

/// Ordered string-valued form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    fields: Vec<(String, String)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.fields.push((key.to_string(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn encode(&self) -> Result<String, NodeError> {
        serde_urlencoded::to_string(&self.fields)
            .map_err(|err| NodeError::internal(format!("Failed to encode form payload: {}", err)))
    }

    /// Field map for logs; values are the same strings sent upstream.
    pub fn to_value(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Python-style booleans; the upstream rejects `true`/`1`.
pub fn js_render_flag(enabled: bool) -> &'static str {
    if enabled {
        "True"
    } else {
        "False"
    }
}

pub fn result_count_key(engine: SearchEngineKind) -> &'static str {
    match engine {
        SearchEngineKind::Bing => "count",
        SearchEngineKind::Google | SearchEngineKind::Yandex | SearchEngineKind::DuckDuckGo => {
            "num"
        }
    }
}

pub fn query_key(engine: SearchEngineKind) -> &'static str {
    match engine {
        SearchEngineKind::Yandex => "text",
        SearchEngineKind::Google | SearchEngineKind::Bing | SearchEngineKind::DuckDuckGo => "q",
    }
}

pub fn search_engine_payload(query: &str, engine: SearchEngineKind, num: u32) -> FormPayload {
    let mut payload = FormPayload::new();
    payload.push("engine", engine.as_str());
    payload.push("json", "1");
    payload.push(result_count_key(engine), num.to_string());
    payload.push(query_key(engine), query);
    payload
}

pub fn universal_scrape_payload(url: &str, js_render: bool, format: OutputFormat) -> FormPayload {
    let mut payload = FormPayload::new();
    payload.push("url", url);
    payload.push("js_render", js_render_flag(js_render));
    payload.push("type", format.as_str());
    payload
}

/// Smart scrape always renders JavaScript and fetches HTML.
pub fn smart_scrape_payload(url: &str) -> FormPayload {
    universal_scrape_payload(url, true, OutputFormat::Html)
}
