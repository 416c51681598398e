//! Guard rule types and configuration schema.
//!
//! A guard rule flags a medication from patient attributes alone, without
//! consulting the generated risk map. The pediatric-NSAID rule is compiled
//! in; further rules can be declared in TOML and run after it.

use serde::{Deserialize, Serialize};

use medguard_contracts::{patient::PatientRecord, risk::lists_medication};

/// A single guard rule.
///
/// Fires when the patient has `condition`, the medication is one of
/// `medications`, and (if `max_age` is set) the patient is younger than
/// `max_age`. All name comparisons are case-insensitive.
///
/// Example in TOML:
/// ```toml
/// [[rules]]
/// id = "pediatric-influenza-aspirin"
/// description = "Aspirin in children with influenza"
/// condition = "influenza"
/// medications = ["aspirin"]
/// max_age = 19
/// reason = "Reye's syndrome risk in children with influenza"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardRule {
    /// Stable identifier used in logs and configuration errors.
    pub id: String,

    pub description: String,

    /// Condition the patient must have.
    pub condition: String,

    /// Medications the rule applies to.
    pub medications: Vec<String>,

    /// Exclusive upper age bound in years. Absent means any age.
    #[serde(default)]
    pub max_age: Option<u32>,

    /// Reason emitted when the rule fires, verbatim.
    pub reason: String,
}

impl GuardRule {
    /// The always-on pediatric asthma / NSAID rule.
    pub fn pediatric_asthma_nsaid() -> Self {
        Self {
            id: "pediatric-asthma-nsaid".to_string(),
            description: "NSAIDs in patients under 18 with asthma".to_string(),
            condition: "asthma".to_string(),
            medications: vec![
                "ibuprofen".to_string(),
                "naproxen".to_string(),
                "aspirin".to_string(),
            ],
            max_age: Some(18),
            reason: "NSAID risk in pediatric asthma".to_string(),
        }
    }

    /// Return true if this rule flags `medication` for `patient`.
    pub fn applies(&self, patient: &PatientRecord, medication: &str) -> bool {
        let age_matches = self.max_age.map_or(true, |limit| patient.age < limit);
        age_matches
            && patient.has_condition(&self.condition)
            && lists_medication(&self.medications, medication)
    }

    /// Describe the first structural problem with this rule, if any.
    pub(crate) fn problem(&self) -> Option<String> {
        if self.id.trim().is_empty() {
            return Some("guard rule has an empty id".to_string());
        }
        if self.condition.trim().is_empty() {
            return Some(format!("guard rule '{}' has an empty condition", self.id));
        }
        if self.medications.iter().all(|m| m.trim().is_empty()) {
            return Some(format!("guard rule '{}' lists no medications", self.id));
        }
        if self.reason.trim().is_empty() {
            return Some(format!("guard rule '{}' has an empty reason", self.id));
        }
        None
    }
}

/// The top-level structure deserialized from a guard rule file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardRuleConfig {
    /// Additional rules, evaluated in declaration order after the built-in ones.
    #[serde(default)]
    pub rules: Vec<GuardRule>,
}
