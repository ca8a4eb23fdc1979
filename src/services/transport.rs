use crate::config::NodeConfig;
use crate::constants::headers::{ACCEPT, FORM_CONTENT_TYPE};
use crate::constants::limits::ERROR_BODY_PREVIEW_BYTES;
use crate::constants::network::REQUEST_PATH;
use crate::errors::NodeError;
use crate::node::payload::{Endpoint, FormPayload};
use crate::node::response::upstream_error_message;
use crate::services::logger::Logger;
use crate::utils::text::body_preview;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};

/// Raw upstream reply for a 2xx status.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs a form-encoded payload to `<endpoint base>/request`. Non-2xx
    /// statuses come back as errors.
    async fn post_form(
        &self,
        endpoint: Endpoint,
        payload: &FormPayload,
        auth: &HeaderMap,
    ) -> Result<UpstreamResponse, NodeError>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    logger: Logger,
    client: Client,
    scraper_api_base_url: String,
    web_unlocker_base_url: String,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(logger: Logger, config: &NodeConfig) -> Result<Self, NodeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("thordata-node/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| NodeError::internal(format!("Failed to build HTTP client: {}", err)))?;
        Ok(Self {
            logger: logger.child("transport"),
            client,
            scraper_api_base_url: config.scraper_api_base_url.clone(),
            web_unlocker_base_url: config.web_unlocker_base_url.clone(),
            timeout: config.timeout,
        })
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        let base = match endpoint {
            Endpoint::ScraperApi => &self.scraper_api_base_url,
            Endpoint::WebUnlocker => &self.web_unlocker_base_url,
        };
        format!("{}{}", base.trim_end_matches('/'), REQUEST_PATH)
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> NodeError {
        if err.is_timeout() {
            return NodeError::timeout(format!(
                "Thordata API Error (Network): Request timed out after {} ms",
                self.timeout.as_millis()
            ));
        }
        NodeError::network(format!("Thordata API Error (Network): {}", err))
    }
}

/// `Thordata API Error (<status>): <message>` for a non-2xx reply.
pub fn upstream_status_error(status: StatusCode, body: &[u8]) -> NodeError {
    let message = upstream_error_message(body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "Request failed".to_string());
    NodeError::upstream(format!(
        "Thordata API Error ({}): {}",
        status.as_u16(),
        message
    ))
    .with_details(serde_json::json!({
        "status": status.as_u16(),
        "body_preview": body_preview(body, ERROR_BODY_PREVIEW_BYTES),
    }))
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_form(
        &self,
        endpoint: Endpoint,
        payload: &FormPayload,
        auth: &HeaderMap,
    ) -> Result<UpstreamResponse, NodeError> {
        let url = self.endpoint_url(endpoint);
        let body = payload.encode()?;

        let mut headers = auth.clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        headers.insert(reqwest::header::ACCEPT, HeaderValue::from_static(ACCEPT));

        self.logger.debug(
            "POST",
            Some(&serde_json::json!({"url": url, "form": payload.to_value()})),
        );
        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|err| self.map_reqwest_error(err))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.map_reqwest_error(err))?;

        self.logger.debug(
            "Upstream replied",
            Some(&serde_json::json!({
                "url": url,
                "status": status.as_u16(),
                "content_type": content_type,
                "bytes": bytes.len(),
                "duration_ms": started.elapsed().as_millis() as u64,
            })),
        );

        if !status.is_success() {
            return Err(upstream_status_error(status, &bytes));
        }

        Ok(UpstreamResponse {
            status: status.as_u16(),
            content_type,
            body: bytes.to_vec(),
        })
    }
}
