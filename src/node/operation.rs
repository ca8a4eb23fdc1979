use crate::constants::limits::{SEARCH_NUM_DEFAULT, SEARCH_NUM_MAX, SEARCH_NUM_MIN};
use crate::errors::NodeError;
use crate::services::validation::{Parameters, Validation};
use crate::utils::operation_errors::unknown_operation_error;
use crate::utils::target_url::normalize_target_url;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    SearchEngine,
    UniversalScrape,
    SmartScrape,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::SearchEngine,
        Operation::UniversalScrape,
        Operation::SmartScrape,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::SearchEngine => "searchEngine",
            Operation::UniversalScrape => "universalScrape",
            Operation::SmartScrape => "smartScrape",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Operation::SearchEngine => "Search Engine",
            Operation::UniversalScrape => "Universal Scrape",
            Operation::SmartScrape => "Smart Scrape",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, NodeError> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == trimmed)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|op| op.as_str()).collect();
                unknown_operation_error(trimmed, &known)
            })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngineKind {
    Google,
    Bing,
    Yandex,
    DuckDuckGo,
}

impl SearchEngineKind {
    pub const ALL: [SearchEngineKind; 4] = [
        SearchEngineKind::Google,
        SearchEngineKind::Bing,
        SearchEngineKind::Yandex,
        SearchEngineKind::DuckDuckGo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchEngineKind::Google => "google",
            SearchEngineKind::Bing => "bing",
            SearchEngineKind::Yandex => "yandex",
            SearchEngineKind::DuckDuckGo => "duckduckgo",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, NodeError> {
        let normalized = raw.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|engine| engine.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|e| e.as_str()).collect();
                NodeError::invalid_params(format!("Unsupported search engine: {}", raw.trim()))
                    .with_hint(format!("Use one of: {}.", known.join(", ")))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Png,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 2] = [OutputFormat::Html, OutputFormat::Png];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Png => "png",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, NodeError> {
        match raw.trim().to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "png" => Ok(OutputFormat::Png),
            _ => Err(NodeError::invalid_params(format!(
                "Unsupported output format: {}",
                raw.trim()
            ))
            .with_hint("Use one of: html, png.")),
        }
    }
}

/// One work item's fully validated request. URLs are already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    SearchEngine {
        query: String,
        engine: SearchEngineKind,
        num: u32,
    },
    UniversalScrape {
        url: String,
        js_render: bool,
        output_format: OutputFormat,
    },
    SmartScrape {
        url: String,
        instructions: String,
    },
}

impl OperationRequest {
    pub fn operation(&self) -> Operation {
        match self {
            OperationRequest::SearchEngine { .. } => Operation::SearchEngine,
            OperationRequest::UniversalScrape { .. } => Operation::UniversalScrape,
            OperationRequest::SmartScrape { .. } => Operation::SmartScrape,
        }
    }

    pub fn from_parameters(
        params: &Parameters,
        validation: &Validation,
    ) -> Result<Self, NodeError> {
        let raw_operation = validation.ensure_required_string(
            params,
            "operation",
            "Operation parameter is required.",
        )?;
        let operation = Operation::parse(&raw_operation)?;
        let required = |key: &str, label: &str| {
            validation.ensure_required_string(
                params,
                key,
                &format!(
                    "{} parameter is required for {} operation.",
                    label,
                    operation.display_name()
                ),
            )
        };

        match operation {
            Operation::SearchEngine => {
                let query = required("query", "Query")?;
                let engine = validation
                    .ensure_optional_string(params, "engine")?
                    .map(|raw| SearchEngineKind::parse(&raw))
                    .transpose()?
                    .unwrap_or(SearchEngineKind::Google);
                let num = validation.ensure_bounded_int(
                    params,
                    "num",
                    SEARCH_NUM_DEFAULT,
                    SEARCH_NUM_MIN,
                    SEARCH_NUM_MAX,
                )?;
                Ok(OperationRequest::SearchEngine { query, engine, num })
            }
            Operation::UniversalScrape => {
                let url = required("url", "URL")?;
                let js_render = validation.ensure_bool(params, "jsRender", true)?;
                let output_format = validation
                    .ensure_optional_string(params, "outputFormat")?
                    .map(|raw| OutputFormat::parse(&raw))
                    .transpose()?
                    .unwrap_or(OutputFormat::Html);
                Ok(OperationRequest::UniversalScrape {
                    url: normalize_target_url(&url),
                    js_render,
                    output_format,
                })
            }
            Operation::SmartScrape => {
                let url = required("url", "URL")?;
                let instructions = required("instructions", "Instructions")?;
                Ok(OperationRequest::SmartScrape {
                    url: normalize_target_url(&url),
                    instructions,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NodeErrorKind;

    fn parse(value: serde_json::Value) -> Result<OperationRequest, NodeError> {
        let params = value.as_object().cloned().unwrap_or_default();
        OperationRequest::from_parameters(&params, &Validation::new())
    }

    #[test]
    fn search_engine_defaults() {
        let request = parse(serde_json::json!({
            "operation": "searchEngine",
            "query": "rust async",
        }))
        .unwrap();
        assert_eq!(
            request,
            OperationRequest::SearchEngine {
                query: "rust async".to_string(),
                engine: SearchEngineKind::Google,
                num: 10,
            }
        );
    }

    #[test]
    fn search_engine_accepts_any_engine_case() {
        let request = parse(serde_json::json!({
            "operation": "searchEngine",
            "query": "q",
            "engine": "DuckDuckGo",
            "num": "50",
        }))
        .unwrap();
        assert_eq!(
            request,
            OperationRequest::SearchEngine {
                query: "q".to_string(),
                engine: SearchEngineKind::DuckDuckGo,
                num: 50,
            }
        );
    }

    #[test]
    fn search_engine_rejects_out_of_range_num_and_unknown_engine() {
        let err = parse(serde_json::json!({"operation": "searchEngine", "query": "q", "num": 51}))
            .unwrap_err();
        assert_eq!(err.kind, NodeErrorKind::InvalidParams);
        let err = parse(serde_json::json!({"operation": "searchEngine", "query": "q", "engine": "ask"}))
            .unwrap_err();
        assert_eq!(err.message, "Unsupported search engine: ask");
    }

    #[test]
    fn blank_required_fields_name_the_operation() {
        let cases = [
            (
                serde_json::json!({"operation": "searchEngine", "query": "  "}),
                "Query parameter is required for Search Engine operation.",
            ),
            (
                serde_json::json!({"operation": "universalScrape", "url": ""}),
                "URL parameter is required for Universal Scrape operation.",
            ),
            (
                serde_json::json!({"operation": "smartScrape", "instructions": "x"}),
                "URL parameter is required for Smart Scrape operation.",
            ),
            (
                serde_json::json!({"operation": "smartScrape", "url": "a.com", "instructions": "\n\t"}),
                "Instructions parameter is required for Smart Scrape operation.",
            ),
        ];
        for (input, expected) in cases {
            let err = parse(input).unwrap_err();
            assert_eq!(err.kind, NodeErrorKind::InvalidParams);
            assert_eq!(err.message, expected);
        }
    }

    #[test]
    fn universal_scrape_normalizes_url_and_defaults() {
        let request = parse(serde_json::json!({
            "operation": "universalScrape",
            "url": "example.com",
        }))
        .unwrap();
        assert_eq!(
            request,
            OperationRequest::UniversalScrape {
                url: "https://example.com".to_string(),
                js_render: true,
                output_format: OutputFormat::Html,
            }
        );
    }

    #[test]
    fn smart_scrape_keeps_instructions_verbatim() {
        let request = parse(serde_json::json!({
            "operation": "smartScrape",
            "url": "http://shop.test/item",
            "instructions": "  Extract price\n",
        }))
        .unwrap();
        assert_eq!(
            request,
            OperationRequest::SmartScrape {
                url: "http://shop.test/item".to_string(),
                instructions: "  Extract price\n".to_string(),
            }
        );
    }

    #[test]
    fn unknown_operation_is_reported() {
        let err = parse(serde_json::json!({"operation": "crawl"})).unwrap_err();
        assert_eq!(err.kind, NodeErrorKind::UnknownOperation);
        assert_eq!(err.message, "Unknown operation: crawl");
    }
}
