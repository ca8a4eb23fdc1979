#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thordata_node::app::App;
use thordata_node::config::NodeConfig;
use thordata_node::credentials::ThordataCredentials;
use thordata_node::errors::NodeError;
use thordata_node::node::payload::{Endpoint, FormPayload};
use thordata_node::services::dispatcher::WorkItem;
use thordata_node::services::logger::{LogLevel, Logger};
use thordata_node::services::transport::{Transport, UpstreamResponse};
use wiremock::MockServer;

pub static ENV_LOCK: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

pub const TOKEN: &str = "td_test_token_42";
pub const SERP_PATH: &str = "/serp/request";
pub const UNLOCKER_PATH: &str = "/unlock/request";

pub fn credentials() -> ThordataCredentials {
    ThordataCredentials::new(TOKEN)
}

pub fn quiet_logger() -> Logger {
    let mut logger = Logger::new("test");
    logger.set_level(LogLevel::Error);
    logger
}

pub fn items(parameters: Vec<Value>) -> Vec<WorkItem> {
    parameters
        .into_iter()
        .map(|value| WorkItem::new(value.as_object().cloned().unwrap_or_default()))
        .collect()
}

/// Both endpoints on one mock server, told apart by path prefix.
pub fn config_for(server: &MockServer) -> NodeConfig {
    let uri = server.uri();
    NodeConfig::default().with_base_urls(&format!("{}/serp", uri), &format!("{}/unlock", uri))
}

pub fn app_for(server: &MockServer) -> App {
    let config = config_for(server);
    let transport = thordata_node::services::transport::ReqwestTransport::new(quiet_logger(), &config)
        .expect("transport");
    App::with_transport(config, quiet_logger(), Arc::new(transport)).expect("app")
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: Endpoint,
    pub payload: FormPayload,
    pub auth: HeaderMap,
}

/// In-memory transport: records every call and replays scripted replies.
/// Once the script runs out it answers `{}` with status 200.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    replies: Mutex<VecDeque<Result<UpstreamResponse, NodeError>>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply_body(&self, body: &[u8]) {
        self.push(Ok(UpstreamResponse {
            status: 200,
            content_type: None,
            body: body.to_vec(),
        }));
    }

    pub fn reply_error(&self, error: NodeError) {
        self.push(Err(error));
    }

    fn push(&self, reply: Result<UpstreamResponse, NodeError>) {
        self.replies.lock().expect("replies").push_back(reply);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls").clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post_form(
        &self,
        endpoint: Endpoint,
        payload: &FormPayload,
        auth: &HeaderMap,
    ) -> Result<UpstreamResponse, NodeError> {
        self.calls.lock().expect("calls").push(RecordedCall {
            endpoint,
            payload: payload.clone(),
            auth: auth.clone(),
        });
        self.replies
            .lock()
            .expect("replies")
            .pop_front()
            .unwrap_or_else(|| {
                Ok(UpstreamResponse {
                    status: 200,
                    content_type: None,
                    body: b"{}".to_vec(),
                })
            })
    }
}

pub fn app_with(transport: Arc<RecordingTransport>) -> App {
    App::with_transport(NodeConfig::default(), quiet_logger(), transport).expect("app")
}
