use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeErrorKind {
    Config,
    InvalidParams,
    UnknownOperation,
    Upstream,
    Network,
    Timeout,
    Internal,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeError {
    pub kind: NodeErrorKind,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl NodeError {
    pub fn new(kind: NodeErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Config, "CONFIG", message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::InvalidParams, "INVALID_PARAMS", message)
    }

    pub fn unknown_operation(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::UnknownOperation, "UNKNOWN_OPERATION", message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Upstream, "UPSTREAM", message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Network, "NETWORK", message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Timeout, "TIMEOUT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(NodeErrorKind::Internal, "INTERNAL", message)
    }

    pub fn status(&self) -> Option<u16> {
        self.details
            .as_ref()
            .and_then(|d| d.get("status"))
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
    }
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for NodeError {}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        NodeError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        NodeError::internal(format!("JSON error: {}", err))
    }
}
