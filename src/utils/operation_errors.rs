use crate::errors::NodeError;
use crate::utils::suggest::suggest;

pub fn unknown_operation_error(operation: &str, known_operations: &[&str]) -> NodeError {
    let suggestions = suggest(operation, known_operations, 3);
    let list_hint = format!("Use one of: {}.", known_operations.join(", "));
    let hint = if suggestions.is_empty() {
        list_hint
    } else {
        format!("Did you mean: {}? {}", suggestions.join(", "), list_hint)
    };

    NodeError::unknown_operation(format!("Unknown operation: {}", operation))
        .with_hint(hint)
        .with_details(serde_json::json!({
            "known_operations": known_operations,
            "did_you_mean": suggestions,
        }))
}
