use crate::app::App;
use crate::config::NodeConfig;
use crate::credentials::ThordataCredentials;
use crate::errors::{ErrorCode, NodeError, NodeErrorKind, RpcError};
use crate::host::catalog::{credential_descriptor, node_descriptor};
use crate::host::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::node::operation::Operation;
use crate::services::dispatcher::WorkItem;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

const PROTOCOL_VERSION: &str = "2024-11-01";
const SERVER_NAME: &str = "thordata-node";

/// `node/execute` params. A bare array is accepted as `items`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    #[serde(default)]
    pub items: Vec<WorkItem>,
    #[serde(default)]
    pub credentials: Option<Value>,
    #[serde(default)]
    pub continue_on_fail: Option<bool>,
}

impl ExecuteRequest {
    pub fn from_value(value: Value) -> Result<Self, NodeError> {
        let parsed = match value {
            Value::Null => Ok(Self::default()),
            Value::Array(_) => serde_json::from_value(value).map(|items| Self {
                items,
                ..Self::default()
            }),
            other => serde_json::from_value(other),
        };
        parsed.map_err(|err| {
            NodeError::invalid_params(format!("Invalid execute request: {}", err))
                .with_hint("Expected {items: [{parameters: {...}}], credentials?, continueOnFail?}.")
        })
    }
}

pub fn map_node_error(error: &NodeError) -> RpcError {
    let code = match error.kind {
        NodeErrorKind::Config => ErrorCode::ConfigurationError,
        NodeErrorKind::InvalidParams | NodeErrorKind::UnknownOperation => ErrorCode::InvalidParams,
        NodeErrorKind::Upstream | NodeErrorKind::Network => ErrorCode::UpstreamFailure,
        NodeErrorKind::Timeout => ErrorCode::RequestTimeout,
        NodeErrorKind::Internal => ErrorCode::InternalError,
    };
    RpcError::new(code, error.message.clone())
}

fn failure_from_node_error(id: Value, error: &NodeError) -> JsonRpcResponse {
    let rpc = map_node_error(error);
    JsonRpcResponse::failure_with_data(
        id,
        rpc.code.as_i32(),
        rpc.message,
        serde_json::to_value(error).ok(),
    )
}

pub struct NodeServer {
    app: App,
}

impl NodeServer {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    fn handle_initialize(&self) -> Value {
        let operations: Vec<&str> = Operation::ALL.iter().map(|op| op.as_str()).collect();
        serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {
                "operations": operations,
                "continueOnFail": self.app.config.continue_on_fail,
                "timeoutMs": self.app.config.timeout.as_millis() as u64,
            },
        })
    }

    pub async fn handle_execute(&self, params: Value) -> Result<Value, NodeError> {
        let request = ExecuteRequest::from_value(params)?;
        let credentials = ThordataCredentials::resolve(request.credentials.as_ref())?;
        let records = self
            .app
            .execute(&request.items, &credentials, request.continue_on_fail)
            .await?;
        Ok(serde_json::json!({ "items": records }))
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.method.starts_with("notifications/") && request.id.is_none() {
            return None;
        }
        let id = request.id.clone()?;
        let response = match request.method.as_str() {
            "notifications/initialized" => JsonRpcResponse::success(id, serde_json::json!({})),
            "initialize" => JsonRpcResponse::success(id, self.handle_initialize()),
            "node/describe" => JsonRpcResponse::success(id, node_descriptor().clone()),
            "credentials/describe" => {
                JsonRpcResponse::success(id, credential_descriptor().clone())
            }
            "node/execute" => match self.handle_execute(request.params).await {
                Ok(result) => JsonRpcResponse::success(id, result),
                Err(err) => {
                    self.app.logger.error(
                        "node/execute failed",
                        Some(&serde_json::json!({"kind": err.kind, "message": err.message})),
                    );
                    failure_from_node_error(id, &err)
                }
            },
            _ => JsonRpcResponse::failure(
                id,
                ErrorCode::MethodNotFound.as_i32(),
                "Method not found".to_string(),
            ),
        };
        Some(response)
    }

    /// One protocol line in, at most one response out.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let parsed: Value = match serde_json::from_str(trimmed) {
            Ok(value) => value,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::ParseError.as_i32(),
                    "Parse error".to_string(),
                ))
            }
        };
        let request: JsonRpcRequest = match serde_json::from_value(parsed) {
            Ok(req) => req,
            Err(_) => {
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    ErrorCode::InvalidRequest.as_i32(),
                    "Invalid request".to_string(),
                ))
            }
        };
        self.handle_request(request).await
    }

    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), NodeError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut writer = writer;
        while let Some(line) = lines.next_line().await? {
            if let Some(response) = self.handle_line(&line).await {
                let payload = serde_json::to_string(&response)?;
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        Ok(())
    }

    pub async fn run_stdio(&self) -> Result<(), NodeError> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = BufWriter::new(tokio::io::stdout());
        self.serve(reader, writer).await
    }
}

pub async fn run_stdio(config: NodeConfig) -> Result<(), NodeError> {
    let server = NodeServer::new(App::initialize(config)?);
    server.run_stdio().await
}
