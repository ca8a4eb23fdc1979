use crate::errors::NodeError;
use crate::node::operation::{Operation, OperationRequest, OutputFormat, SearchEngineKind};
use crate::node::payload::{
    search_engine_payload, smart_scrape_payload, universal_scrape_payload, Endpoint,
};
use crate::node::response::{
    search_engine_record, smart_scrape_record, universal_scrape_record, BodyKind, ResponseRecord,
};
use crate::services::logger::Logger;
use crate::services::transport::{Transport, UpstreamResponse};
use reqwest::header::HeaderMap;
use std::sync::Arc;

/// Runs one validated operation against the Thordata endpoints.
#[derive(Clone)]
pub struct ThordataManager {
    logger: Logger,
    transport: Arc<dyn Transport>,
}

impl ThordataManager {
    pub fn new(logger: Logger, transport: Arc<dyn Transport>) -> Self {
        Self {
            logger: logger.child("thordata"),
            transport,
        }
    }

    pub async fn handle_operation(
        &self,
        request: &OperationRequest,
        auth: &HeaderMap,
    ) -> Result<ResponseRecord, NodeError> {
        match request {
            OperationRequest::SearchEngine { query, engine, num } => {
                self.search_engine(query, *engine, *num, auth).await
            }
            OperationRequest::UniversalScrape {
                url,
                js_render,
                output_format,
            } => {
                self.universal_scrape(url, *js_render, *output_format, auth)
                    .await
            }
            OperationRequest::SmartScrape { url, instructions } => {
                self.smart_scrape(url, instructions, auth).await
            }
        }
    }

    async fn search_engine(
        &self,
        query: &str,
        engine: SearchEngineKind,
        num: u32,
        auth: &HeaderMap,
    ) -> Result<ResponseRecord, NodeError> {
        let payload = search_engine_payload(query, engine, num);
        let response = self
            .transport
            .post_form(Endpoint::ScraperApi, &payload, auth)
            .await?;
        let (kind, record) = search_engine_record(&response.body);
        self.log_reply(Operation::SearchEngine, &response, kind);
        Ok(record)
    }

    async fn universal_scrape(
        &self,
        url: &str,
        js_render: bool,
        output_format: OutputFormat,
        auth: &HeaderMap,
    ) -> Result<ResponseRecord, NodeError> {
        let payload = universal_scrape_payload(url, js_render, output_format);
        let response = self
            .transport
            .post_form(Endpoint::WebUnlocker, &payload, auth)
            .await?;
        let (kind, record) = universal_scrape_record(&response.body, output_format);
        self.log_reply(Operation::UniversalScrape, &response, kind);
        if kind == BodyKind::Png {
            self.logger.debug(
                "Screenshot captured",
                Some(&serde_json::json!({"url": url, "bytes": response.body.len()})),
            );
        }
        Ok(record)
    }

    async fn smart_scrape(
        &self,
        url: &str,
        instructions: &str,
        auth: &HeaderMap,
    ) -> Result<ResponseRecord, NodeError> {
        let payload = smart_scrape_payload(url);
        let response = self
            .transport
            .post_form(Endpoint::WebUnlocker, &payload, auth)
            .await?;
        let (kind, record) = smart_scrape_record(url, instructions, &response.body);
        self.log_reply(Operation::SmartScrape, &response, kind);
        Ok(record)
    }

    /// The body kind is inferred by parsing; the reply's own label is logged
    /// next to it, and a disagreement is flagged.
    fn log_reply(&self, operation: Operation, response: &UpstreamResponse, kind: BodyKind) {
        let agrees = response
            .content_type
            .as_deref()
            .map(|ct| kind.matches_content_type(ct));
        let meta = serde_json::json!({
            "operation": operation,
            "status": response.status,
            "content_type": response.content_type,
            "inferred": kind,
            "bytes": response.body.len(),
        });
        if agrees == Some(false) {
            self.logger
                .debug("Content-Type disagrees with parsed body", Some(&meta));
        } else {
            self.logger.debug("Reply normalized", Some(&meta));
        }
    }
}
