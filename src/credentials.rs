//! Thordata API credentials and the header-injection rule applied to every
//! upstream call.
//!
//! The same token is sent as `Authorization: Bearer`, `token` and `apikey`.
//! The upstream has been observed to accept any of the three; trimming this
//! down to one header is pending confirmation of which one it requires.

use crate::constants::{env, headers};
use crate::errors::NodeError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

pub const CREDENTIAL_NAME: &str = "thordataApi";
const TOKEN_REQUIRED: &str =
    "Thordata Scraper Token is required. Please configure it in credentials.";

#[derive(Clone, Default)]
pub struct ThordataCredentials {
    pub token: String,
    pub public_token: Option<String>,
    pub public_key: Option<String>,
}

/// Credentials object as the host sends it; any field may be absent or null.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuppliedCredentials {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    public_token: Option<String>,
    #[serde(default)]
    public_key: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl fmt::Debug for ThordataCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |present: bool| if present { "[REDACTED]" } else { "<unset>" };
        f.debug_struct("ThordataCredentials")
            .field("token", &mask(!self.token.trim().is_empty()))
            .field("public_token", &mask(self.public_token.is_some()))
            .field("public_key", &mask(self.public_key.is_some()))
            .finish()
    }
}

impl ThordataCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            public_token: None,
            public_key: None,
        }
    }

    pub fn from_env() -> Self {
        let read = |key: &str| non_blank(std::env::var(key).ok());
        Self {
            token: read(env::TOKEN).unwrap_or_default(),
            public_token: read(env::PUBLIC_TOKEN),
            public_key: read(env::PUBLIC_KEY),
        }
    }

    /// Host-supplied fields win; blank, null or absent ones fall back to env.
    pub fn resolve(supplied: Option<&Value>) -> Result<Self, NodeError> {
        let supplied: SuppliedCredentials = match supplied {
            None | Some(Value::Null) => SuppliedCredentials::default(),
            Some(value) => serde_json::from_value(value.clone()).map_err(|err| {
                NodeError::config(format!("credentials must be an object: {}", err))
            })?,
        };
        let env = Self::from_env();
        Ok(Self {
            token: non_blank(supplied.token).unwrap_or(env.token),
            public_token: non_blank(supplied.public_token).or(env.public_token),
            public_key: non_blank(supplied.public_key).or(env.public_key),
        })
    }

    /// Re-checks the required token; the host does not guarantee it.
    pub fn ensure_token(&self) -> Result<&str, NodeError> {
        let token = self.token.trim();
        if token.is_empty() {
            return Err(NodeError::config(TOKEN_REQUIRED)
                .with_hint(format!("Set the credential token or {}.", env::TOKEN)));
        }
        Ok(token)
    }

    pub fn auth_headers(&self) -> Result<HeaderMap, NodeError> {
        let token = self.ensure_token()?;
        let invalid = || NodeError::config("Thordata Scraper Token contains invalid header characters");
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| invalid())?;
        let mut raw = HeaderValue::from_str(token).map_err(|_| invalid())?;
        bearer.set_sensitive(true);
        raw.set_sensitive(true);

        let mut map = HeaderMap::new();
        map.insert(AUTHORIZATION, bearer);
        map.insert(HeaderName::from_static(headers::TOKEN), raw.clone());
        map.insert(HeaderName::from_static(headers::API_KEY), raw);
        Ok(map)
    }

    /// Literal secret values, for log scrubbing.
    pub fn secret_values(&self) -> Vec<String> {
        [
            Some(self.token.clone()),
            self.public_token.clone(),
            self.public_key.clone(),
        ]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
    }
}
