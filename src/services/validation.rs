use crate::errors::NodeError;
use crate::utils::feature_flags::{is_falsy, is_truthy};
use crate::utils::text::is_blank;
use serde_json::{Map, Value};

pub type Parameters = Map<String, Value>;

#[derive(Clone)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    /// Non-blank string parameter, returned untrimmed.
    pub fn ensure_required_string(
        &self,
        params: &Parameters,
        key: &str,
        message: &str,
    ) -> Result<String, NodeError> {
        let text = params
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !is_blank(s))
            .ok_or_else(|| {
                NodeError::invalid_params(message).with_details(serde_json::json!({"field": key}))
            })?;
        Ok(text.to_string())
    }

    pub fn ensure_optional_string(
        &self,
        params: &Parameters,
        key: &str,
    ) -> Result<Option<String>, NodeError> {
        match params.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) if is_blank(s) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
            Some(_) => Err(NodeError::invalid_params(format!("{} must be a string", key))),
        }
    }

    pub fn ensure_bool(
        &self,
        params: &Parameters,
        key: &str,
        fallback: bool,
    ) -> Result<bool, NodeError> {
        match params.get(key) {
            None | Some(Value::Null) => Ok(fallback),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) if is_truthy(s) => Ok(true),
            Some(Value::String(s)) if is_falsy(s) => Ok(false),
            Some(_) => Err(NodeError::invalid_params(format!("{} must be a boolean", key))),
        }
    }

    /// Integer in `[min, max]`; numeric strings are accepted and a blank one
    /// means the fallback.
    pub fn ensure_bounded_int(
        &self,
        params: &Parameters,
        key: &str,
        fallback: u32,
        min: u32,
        max: u32,
    ) -> Result<u32, NodeError> {
        let out_of_range = || {
            NodeError::invalid_params(format!(
                "{} must be an integer between {} and {}",
                key, min, max
            ))
        };
        let numeric = match params.get(key) {
            None | Some(Value::Null) => return Ok(fallback),
            Some(Value::String(s)) if is_blank(s) => return Ok(fallback),
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            Some(_) => None,
        }
        .ok_or_else(out_of_range)?;
        if numeric < i64::from(min) || numeric > i64::from(max) {
            return Err(out_of_range());
        }
        Ok(numeric as u32)
    }
}

impl Default for Validation {
    fn default() -> Self {
        Self::new()
    }
}
