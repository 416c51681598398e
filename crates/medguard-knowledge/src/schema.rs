//! Structural checks for oracle responses.
//!
//! A response that decodes as JSON is validated against the artifact's
//! JSON Schema before any typed decoding, so the log names every shape
//! violation instead of only serde's first error.

use serde_json::{json, Value};

/// Shape of a risk-map response. Every field is optional and may be `null`.
pub fn risk_map_schema() -> Value {
    let medication_lists = json!({
        "type": ["object", "null"],
        "additionalProperties": {
            "type": "array",
            "items": { "type": "string" }
        }
    });
    json!({
        "type": "object",
        "properties": {
            "allergy_map": medication_lists,
            "pregnancy_map": {
                "type": ["array", "null"],
                "items": { "type": "string" }
            },
            "condition_map": medication_lists
        }
    })
}

/// Shape of a dose response. Individual entries are checked one by one
/// during decoding, so only the envelope is constrained here.
pub fn dose_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "medication_doses": { "type": ["array", "null"] }
        }
    })
}

/// Every violation of `schema` by `instance`, as human-readable messages.
///
/// An empty vector means the instance conforms.
pub fn shape_violations(schema: &Value, instance: &Value) -> Vec<String> {
    match jsonschema::validator_for(schema) {
        Ok(validator) => validator
            .iter_errors(instance)
            .map(|error| format!("at '{}': {}", error.instance_path, error))
            .collect(),
        Err(e) => vec![format!("invalid JSON Schema document: {e}")],
    }
}
