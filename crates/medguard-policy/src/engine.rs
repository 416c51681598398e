//! The safety rule evaluator.
//!
//! `SafetyRuleEngine` implements `SafetyEvaluator` from medguard-core.
//!
//! Evaluation order for one candidate (every applicable reason is kept):
//!
//! 1. Allergy map, in key order: patient has the allergy and the candidate
//!    is listed → `"Patient is allergic to <allergy as stored in the map>"`
//! 2. Pregnancy map: patient is pregnant and the candidate is listed →
//!    `"Unsafe during pregnancy"`
//! 3. Condition map, per distinct patient condition: the candidate is listed
//!    under that condition → `"May worsen <condition, lower-cased>"`
//! 4. Guard rules, built-in first, then configured ones in declaration order

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use medguard_contracts::{
    error::{MedguardError, MedguardResult},
    patient::PatientRecord,
    risk::{lists_medication, RiskMap},
};
use medguard_core::traits::SafetyEvaluator;

use crate::rule::{GuardRule, GuardRuleConfig};

/// Deterministic, case-insensitive safety evaluation.
///
/// ```rust,ignore
/// use medguard_policy::SafetyRuleEngine;
///
/// let engine = SafetyRuleEngine::from_file(Path::new("policies/guard_rules.toml"))?;
/// ```
#[derive(Debug, Clone)]
pub struct SafetyRuleEngine {
    guard_rules: Vec<GuardRule>,
}

impl SafetyRuleEngine {
    /// An engine with only the built-in guard rules.
    pub fn new() -> Self {
        Self {
            guard_rules: vec![GuardRule::pediatric_asthma_nsaid()],
        }
    }

    /// Built-in rules plus `extra`, in that order.
    ///
    /// Returns `MedguardError::ConfigError` for an incomplete rule or an id
    /// used twice (including an id that shadows a built-in rule).
    pub fn with_rules(extra: Vec<GuardRule>) -> MedguardResult<Self> {
        let mut engine = Self::new();
        let mut seen: HashSet<String> =
            engine.guard_rules.iter().map(|r| r.id.clone()).collect();

        for rule in extra {
            if let Some(reason) = rule.problem() {
                return Err(MedguardError::ConfigError { reason });
            }
            if !seen.insert(rule.id.clone()) {
                return Err(MedguardError::ConfigError {
                    reason: format!("duplicate guard rule id '{}'", rule.id),
                });
            }
            engine.guard_rules.push(rule);
        }
        Ok(engine)
    }

    /// Parse `s` as TOML guard rules and append them to the built-in set.
    pub fn from_toml_str(s: &str) -> MedguardResult<Self> {
        let config: GuardRuleConfig = toml::from_str(s).map_err(|e| MedguardError::ConfigError {
            reason: format!("failed to parse guard rule TOML: {}", e),
        })?;
        Self::with_rules(config.rules)
    }

    /// Read the file at `path` and parse it as guard rule configuration.
    pub fn from_file(path: &Path) -> MedguardResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MedguardError::ConfigError {
            reason: format!("failed to read guard rule file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// All guard rules in evaluation order.
    pub fn guard_rules(&self) -> &[GuardRule] {
        &self.guard_rules
    }
}

impl Default for SafetyRuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SafetyEvaluator for SafetyRuleEngine {
    fn evaluate(&self, patient: &PatientRecord, medication: &str, map: &RiskMap) -> Vec<String> {
        let mut reasons = Vec::new();

        // ── Rule 1: allergies ────────────────────────────────────────────────
        for (allergy, unsafe_meds) in &map.allergy_map {
            if patient.has_allergy(allergy) && lists_medication(unsafe_meds, medication) {
                reasons.push(format!("Patient is allergic to {}", allergy));
            }
        }

        // ── Rule 2: pregnancy ────────────────────────────────────────────────
        if patient.pregnant && lists_medication(&map.pregnancy_map, medication) {
            reasons.push("Unsafe during pregnancy".to_string());
        }

        // ── Rule 3: conditions ───────────────────────────────────────────────
        for condition in patient.normalized_conditions() {
            let worsens = map
                .condition_map
                .iter()
                .filter(|(name, _)| name.to_lowercase() == condition)
                .any(|(_, meds)| lists_medication(meds, medication));
            if worsens {
                reasons.push(format!("May worsen {}", condition));
            }
        }

        // ── Rule 4: guard rules, independent of the map ──────────────────────
        for rule in &self.guard_rules {
            if rule.applies(patient, medication) {
                debug!(rule_id = %rule.id, medication = %medication, "guard rule fired");
                reasons.push(rule.reason.clone());
            }
        }

        reasons
    }
}
