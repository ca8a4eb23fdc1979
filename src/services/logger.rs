use crate::constants::limits::LOG_BODY_PREVIEW_BYTES;
use crate::utils::redact::{redact_object, redact_text};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    fn from_env() -> Self {
        match std::env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "error" => LogLevel::Error,
            "warn" => LogLevel::Warn,
            "debug" => LogLevel::Debug,
            _ => LogLevel::Info,
        }
    }

    fn rank(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Warn => 1,
            LogLevel::Info => 2,
            LogLevel::Debug => 3,
        }
    }

    fn allows(self, other: LogLevel) -> bool {
        other.rank() <= self.rank()
    }

    fn label(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

/// Context-scoped stderr logger. Stdout stays reserved for protocol output.
#[derive(Debug, Clone)]
pub struct Logger {
    context: String,
    level: LogLevel,
    secrets: Arc<Vec<String>>,
}

impl Logger {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
            level: LogLevel::from_env(),
            secrets: Arc::new(Vec::new()),
        }
    }

    pub fn child(&self, suffix: &str) -> Self {
        let context = if suffix.is_empty() {
            self.context.clone()
        } else {
            format!("{}:{}", self.context, suffix)
        };
        Self {
            context,
            level: self.level,
            secrets: self.secrets.clone(),
        }
    }

    /// Returns a logger that scrubs the given literal values from every line.
    pub fn with_secrets(&self, secrets: Vec<String>) -> Self {
        let mut merged = (*self.secrets).clone();
        merged.extend(secrets.into_iter().filter(|s| !s.trim().is_empty()));
        Self {
            context: self.context.clone(),
            level: self.level,
            secrets: Arc::new(merged),
        }
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    fn render(&self, message: &str, meta: Option<&serde_json::Value>) -> String {
        let secrets = Some(self.secrets.as_slice());
        let message = redact_text(message, usize::MAX, secrets);
        let meta_suffix = meta
            .filter(|m| !m.is_null())
            .map(|m| format!(" {}", redact_object(m, LOG_BODY_PREVIEW_BYTES, secrets)))
            .unwrap_or_default();
        format!("{}{}", message, meta_suffix)
    }

    fn log(&self, level: LogLevel, message: &str, meta: Option<&serde_json::Value>) {
        if !self.level.allows(level) {
            return;
        }
        let timestamp = chrono::Utc::now().to_rfc3339();
        eprintln!(
            "[{}] {} [{}] {}",
            timestamp,
            level.label(),
            self.context,
            self.render(message, meta)
        );
    }

    pub fn error(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Error, message, meta);
    }

    pub fn warn(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Warn, message, meta);
    }

    pub fn info(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Info, message, meta);
    }

    pub fn debug(&self, message: &str, meta: Option<&serde_json::Value>) {
        self.log(LogLevel::Debug, message, meta);
    }
}

#[cfg(test)]
mod tests {
    use super::{LogLevel, Logger};

    #[test]
    fn child_extends_context_and_keeps_secrets() {
        let mut root = Logger::new("thordata").with_secrets(vec!["tok_abcdef".to_string()]);
        root.set_level(LogLevel::Debug);
        let child = root.child("dispatcher");
        assert_eq!(child.context, "thordata:dispatcher");
        assert_eq!(child.level, LogLevel::Debug);
        assert!(!child.render("sent tok_abcdef", None).contains("tok_abcdef"));
        assert_eq!(root.child("").context, "thordata");
    }

    #[test]
    fn level_filters_lower_priority() {
        assert!(LogLevel::Error.allows(LogLevel::Error));
        assert!(!LogLevel::Error.allows(LogLevel::Info));
        assert!(LogLevel::Debug.allows(LogLevel::Warn));
        assert!(!LogLevel::Info.allows(LogLevel::Debug));
    }

    #[test]
    fn render_scrubs_registered_secrets() {
        let logger = Logger::new("thordata").with_secrets(vec!["secret-token-123".to_string()]);
        let line = logger.render(
            "calling with secret-token-123",
            Some(&serde_json::json!({"note": "secret-token-123", "token": "x"})),
        );
        assert!(!line.contains("secret-token-123"));
        assert!(line.contains("[REDACTED]"));
    }
}
