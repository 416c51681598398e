//! Patient record and execution identity types.
//!
//! A `PatientRecord` is produced by upstream extraction and suggestion
//! stages and is never mutated by the filter. Every field tolerates being
//! absent or `null`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::{age_from_value, lenient_age, null_as_default};

/// Unique identifier for a single filter run.
///
/// Appears in every log event and audit record the run produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub uuid::Uuid);

impl ExecutionId {
    /// Create a new, unique execution ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Structured patient attributes plus the candidate medication list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Known allergies, as recorded upstream (any case).
    #[serde(default, deserialize_with = "null_as_default")]
    pub allergies: Vec<String>,

    /// Known conditions, as recorded upstream (any case).
    #[serde(default, deserialize_with = "null_as_default")]
    pub conditions: Vec<String>,

    /// Age in whole years; 0 when unknown.
    #[serde(default, deserialize_with = "lenient_age")]
    pub age: u32,

    #[serde(default, deserialize_with = "null_as_default")]
    pub pregnant: bool,

    /// Candidate medications, in the order the suggestion stage produced them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggested_meds: Vec<String>,
}

impl PatientRecord {
    /// Return true if the patient has `allergy` (case-insensitive).
    pub fn has_allergy(&self, allergy: &str) -> bool {
        contains_folded(&self.allergies, allergy)
    }

    /// Return true if the patient has `condition` (case-insensitive).
    pub fn has_condition(&self, condition: &str) -> bool {
        contains_folded(&self.conditions, condition)
    }

    /// Lower-cased conditions with duplicates removed, first occurrence kept.
    pub fn normalized_conditions(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            let folded = condition.to_lowercase();
            if !out.contains(&folded) {
                out.push(folded);
            }
        }
        out
    }

    /// Assemble a record from upstream stage outputs.
    ///
    /// Demographics, allergies, and conditions come from the extraction
    /// stage; candidates come from the suggestion stage's `valid_drugs`.
    /// Non-string list items are skipped and an unusable `age` becomes 0.
    pub fn from_stage_outputs(extraction: &Value, suggestion: &Value) -> Self {
        Self {
            allergies: string_list(extraction.get("allergies")),
            conditions: string_list(extraction.get("conditions")),
            age: extraction.get("age").map(age_from_value).unwrap_or(0),
            pregnant: extraction
                .get("pregnant")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            suggested_meds: string_list(suggestion.get("valid_drugs")),
        }
    }
}

fn contains_folded(values: &[String], needle: &str) -> bool {
    let needle = needle.to_lowercase();
    values.iter().any(|v| v.to_lowercase() == needle)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
