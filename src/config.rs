use crate::constants::{env, network};
use crate::errors::NodeError;
use crate::utils::feature_flags::env_flag;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be an absolute http(s) URL, got '{value}'")]
    InvalidBaseUrl { key: &'static str, value: String },
    #[error("{key} must be a positive integer (milliseconds), got '{value}'")]
    InvalidTimeout { key: &'static str, value: String },
}

impl From<ConfigError> for NodeError {
    fn from(err: ConfigError) -> Self {
        NodeError::config(err.to_string())
    }
}

/// Runtime settings shared by every execution of the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub scraper_api_base_url: String,
    pub web_unlocker_base_url: String,
    pub timeout: Duration,
    pub continue_on_fail: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            scraper_api_base_url: network::SCRAPER_API_BASE_URL.to_string(),
            web_unlocker_base_url: network::WEB_UNLOCKER_BASE_URL.to_string(),
            timeout: Duration::from_millis(network::TIMEOUT_REQUEST_MS),
            continue_on_fail: false,
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            scraper_api_base_url: read_base_url(
                env::SCRAPER_API_BASE_URL,
                defaults.scraper_api_base_url,
            )?,
            web_unlocker_base_url: read_base_url(
                env::WEB_UNLOCKER_BASE_URL,
                defaults.web_unlocker_base_url,
            )?,
            timeout: read_timeout(env::TIMEOUT_MS, defaults.timeout)?,
            continue_on_fail: env_flag(env::CONTINUE_ON_FAIL).unwrap_or(defaults.continue_on_fail),
        })
    }

    pub fn with_base_urls(mut self, scraper_api: &str, web_unlocker: &str) -> Self {
        self.scraper_api_base_url = trim_base_url(scraper_api);
        self.web_unlocker_base_url = trim_base_url(web_unlocker);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }
}

fn trim_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn read_base_url(key: &'static str, fallback: String) -> Result<String, ConfigError> {
    let Some(raw) = std::env::var(key).ok().filter(|v| !v.trim().is_empty()) else {
        return Ok(fallback);
    };
    let parsed = Url::parse(raw.trim()).map_err(|_| ConfigError::InvalidBaseUrl {
        key,
        value: raw.clone(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl { key, value: raw });
    }
    Ok(trim_base_url(&raw))
}

fn read_timeout(key: &'static str, fallback: Duration) -> Result<Duration, ConfigError> {
    let Some(raw) = std::env::var(key).ok().filter(|v| !v.trim().is_empty()) else {
        return Ok(fallback);
    };
    match raw.trim().parse::<u64>() {
        Ok(ms) => timeout_from_millis(key, ms),
        Err(_) => Err(ConfigError::InvalidTimeout { key, value: raw }),
    }
}

/// A zero timeout is rejected wherever it comes from.
pub fn timeout_from_millis(key: &'static str, ms: u64) -> Result<Duration, ConfigError> {
    if ms == 0 {
        return Err(ConfigError::InvalidTimeout {
            key,
            value: ms.to_string(),
        });
    }
    Ok(Duration::from_millis(ms))
}
