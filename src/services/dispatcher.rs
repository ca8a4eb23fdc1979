use crate::credentials::ThordataCredentials;
use crate::errors::NodeError;
use crate::host::catalog::apply_defaults;
use crate::managers::thordata::ThordataManager;
use crate::node::operation::OperationRequest;
use crate::node::response::ResponseRecord;
use crate::services::logger::Logger;
use crate::services::validation::{Parameters, Validation};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;

/// One incoming item. Only its resolved parameters matter to the node.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkItem {
    #[serde(default)]
    pub parameters: Parameters,
}

impl WorkItem {
    pub fn new(parameters: Parameters) -> Self {
        Self { parameters }
    }
}

/// Runs a batch of work items strictly in order, one upstream call at a time.
#[derive(Clone)]
pub struct Dispatcher {
    logger: Logger,
    validation: Validation,
    manager: ThordataManager,
}

impl Dispatcher {
    pub fn new(logger: Logger, validation: Validation, manager: ThordataManager) -> Self {
        Self {
            logger: logger.child("dispatcher"),
            validation,
            manager,
        }
    }

    /// Output has the same length and order as `items` unless the batch
    /// aborts. Missing credentials abort regardless of `continue_on_fail`.
    pub async fn execute(
        &self,
        items: &[WorkItem],
        credentials: &ThordataCredentials,
        continue_on_fail: bool,
    ) -> Result<Vec<ResponseRecord>, NodeError> {
        let auth = credentials.auth_headers()?;
        let run_id = uuid::Uuid::new_v4().to_string();
        let logger = self.logger.with_secrets(credentials.secret_values());

        logger.debug(
            "Batch started",
            Some(&serde_json::json!({
                "run_id": run_id,
                "items": items.len(),
                "continue_on_fail": continue_on_fail,
            })),
        );

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let started = Instant::now();
            match self.execute_item(&item.parameters, &auth).await {
                Ok((operation, record)) => {
                    logger.info(
                        "Item completed",
                        Some(&serde_json::json!({
                            "run_id": run_id,
                            "item_index": index,
                            "operation": operation,
                            "binary": record.binary.is_some(),
                            "duration_ms": started.elapsed().as_millis() as u64,
                        })),
                    );
                    records.push(record);
                }
                Err(err) if continue_on_fail => {
                    logger.warn(
                        "Item failed, continuing",
                        Some(&serde_json::json!({
                            "run_id": run_id,
                            "item_index": index,
                            "kind": err.kind,
                            "message": err.message,
                        })),
                    );
                    records.push(ResponseRecord::error(err.message));
                }
                Err(err) => {
                    logger.error(
                        "Item failed, aborting batch",
                        Some(&serde_json::json!({
                            "run_id": run_id,
                            "item_index": index,
                            "kind": err.kind,
                            "message": err.message,
                        })),
                    );
                    return Err(annotate_item_index(err, index));
                }
            }
        }
        Ok(records)
    }

    async fn execute_item(
        &self,
        raw: &Parameters,
        auth: &HeaderMap,
    ) -> Result<(&'static str, ResponseRecord), NodeError> {
        let params = apply_defaults(raw);
        let request = OperationRequest::from_parameters(&params, &self.validation)?;
        let record = self.manager.handle_operation(&request, auth).await?;
        Ok((request.operation().as_str(), record))
    }
}

fn annotate_item_index(err: NodeError, index: usize) -> NodeError {
    let mut details = match err.details.clone() {
        Some(Value::Object(map)) => map,
        Some(other) => {
            let mut map = serde_json::Map::new();
            map.insert("cause".to_string(), other);
            map
        }
        None => serde_json::Map::new(),
    };
    details.insert("item_index".to_string(), Value::from(index));
    err.with_details(Value::Object(details))
}

#[cfg(test)]
mod tests {
    use super::annotate_item_index;
    use crate::errors::NodeError;
    use serde_json::json;

    #[test]
    fn item_index_is_merged_into_existing_details() {
        let err = NodeError::upstream("Thordata API Error (401): bad token")
            .with_details(json!({"status": 401}));
        let annotated = annotate_item_index(err, 2);
        assert_eq!(annotated.status(), Some(401));
        assert_eq!(annotated.details.unwrap()["item_index"], 2);
    }

    #[test]
    fn item_index_is_added_when_details_are_absent() {
        let annotated = annotate_item_index(NodeError::invalid_params("x"), 0);
        assert_eq!(annotated.details, Some(json!({"item_index": 0})));
    }
}
