use crate::errors::NodeError;
use crate::node::operation::{Operation, OutputFormat, SearchEngineKind};
use crate::services::validation::Parameters;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyOption {
    pub name: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(default)]
    pub show: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub default: Value,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<PropertyOption>,
    #[serde(default)]
    pub display_options: Option<DisplayOptions>,
}

impl PropertyDef {
    /// Properties without an `operation` display rule are shown everywhere.
    pub fn is_visible_for(&self, operation: &str) -> bool {
        match self
            .display_options
            .as_ref()
            .and_then(|opts| opts.show.get("operation"))
        {
            Some(operations) => operations.iter().any(|op| op == operation),
            None => true,
        }
    }

    pub fn option_values(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter_map(|opt| opt.value.as_str())
            .collect()
    }
}

static DESCRIPTOR: Lazy<Value> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/node_descriptor.json"));
    serde_json::from_str(raw).expect("node_descriptor.json must be valid JSON")
});

static PROPERTIES: Lazy<Vec<PropertyDef>> = Lazy::new(|| {
    serde_json::from_value(DESCRIPTOR["node"]["properties"].clone())
        .expect("node_descriptor.json properties must be well-formed")
});

pub fn node_descriptor() -> &'static Value {
    &DESCRIPTOR["node"]
}

pub fn credential_descriptor() -> &'static Value {
    &DESCRIPTOR["credentials"]
}

pub fn property(name: &str) -> Option<&'static PropertyDef> {
    PROPERTIES.iter().find(|prop| prop.name == name)
}

pub fn visible_properties(operation: Operation) -> Vec<&'static PropertyDef> {
    PROPERTIES
        .iter()
        .filter(|prop| prop.is_visible_for(operation.as_str()))
        .collect()
}

/// Fills absent or null parameters with the descriptor defaults, the way the
/// editor would have. A present-but-blank value is left for validation.
pub fn apply_defaults(params: &Parameters) -> Parameters {
    let mut out = params.clone();
    let missing = |map: &Parameters, key: &str| matches!(map.get(key), None | Some(Value::Null));

    if missing(&out, "operation") {
        if let Some(default) = property("operation").map(|p| p.default.clone()) {
            out.insert("operation".to_string(), default);
        }
    }
    let Some(operation) = out.get("operation").and_then(Value::as_str).map(str::to_string) else {
        return out;
    };

    for prop in PROPERTIES.iter() {
        if prop.name == "operation" || !prop.is_visible_for(&operation) {
            continue;
        }
        if prop.default.is_null() || !missing(&out, &prop.name) {
            continue;
        }
        out.insert(prop.name.clone(), prop.default.clone());
    }
    out
}

fn option_mismatch(property_name: &str, expected: &[&str]) -> Option<Value> {
    let declared = property(property_name)
        .map(PropertyDef::option_values)
        .unwrap_or_default();
    let missing: Vec<&str> = expected
        .iter()
        .copied()
        .filter(|value| !declared.contains(value))
        .collect();
    let unknown: Vec<&str> = declared
        .iter()
        .copied()
        .filter(|value| !expected.contains(value))
        .collect();
    if missing.is_empty() && unknown.is_empty() {
        return None;
    }
    Some(serde_json::json!({
        "property": property_name,
        "missing": missing,
        "unknown": unknown,
    }))
}

/// Every option the descriptor offers must have a code path, and vice versa.
pub fn validate_wiring() -> Result<(), NodeError> {
    let operations: Vec<&str> = Operation::ALL.iter().map(|op| op.as_str()).collect();
    let engines: Vec<&str> = SearchEngineKind::ALL.iter().map(|e| e.as_str()).collect();
    let formats: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.as_str()).collect();

    let problems: Vec<Value> = [
        option_mismatch("operation", &operations),
        option_mismatch("engine", &engines),
        option_mismatch("outputFormat", &formats),
    ]
    .into_iter()
    .flatten()
    .collect();

    if problems.is_empty() {
        return Ok(());
    }
    Err(NodeError::internal("Node descriptor wiring is incomplete")
        .with_hint("Every option in node_descriptor.json must map to a handled variant.")
        .with_details(serde_json::json!({ "problems": problems })))
}
