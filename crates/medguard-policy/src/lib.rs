//! # medguard-policy
//!
//! Deterministic safety rules for the medguard filter.
//!
//! ## Overview
//!
//! [`SafetyRuleEngine`] implements the
//! [`SafetyEvaluator`](medguard_core::traits::SafetyEvaluator) trait. It
//! checks one candidate medication against a patient record and a risk map
//! and returns every reason the candidate is unsafe. An empty list means the
//! candidate is approved.
//!
//! Guard rules fire from patient attributes alone, so they still apply when
//! the risk map is empty (for example after an oracle outage). The
//! pediatric asthma / NSAID rule is always present; more can be declared in
//! TOML:
//!
//! ```rust,ignore
//! use std::path::Path;
//! use medguard_policy::SafetyRuleEngine;
//!
//! let engine = SafetyRuleEngine::from_file(Path::new("policies/guard_rules.toml"))?;
//! // Pass `engine` to `medguard_core::MedicationFilter::new(...)`.
//! ```

pub mod engine;
pub mod rule;

pub use engine::SafetyRuleEngine;
pub use rule::{GuardRule, GuardRuleConfig};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use medguard_contracts::{error::MedguardError, patient::PatientRecord, risk::RiskMap};
    use medguard_core::traits::SafetyEvaluator;

    use crate::{GuardRule, SafetyRuleEngine};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn patient(allergies: &[&str], conditions: &[&str], age: u32, pregnant: bool) -> PatientRecord {
        PatientRecord {
            allergies: allergies.iter().map(|s| s.to_string()).collect(),
            conditions: conditions.iter().map(|s| s.to_string()).collect(),
            age,
            pregnant,
            suggested_meds: Vec::new(),
        }
    }

    fn entries(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, meds)| (k.to_string(), meds.iter().map(|m| m.to_string()).collect()))
            .collect()
    }

    fn map(
        allergy: &[(&str, &[&str])],
        pregnancy: &[&str],
        condition: &[(&str, &[&str])],
    ) -> RiskMap {
        RiskMap {
            allergy_map: entries(allergy),
            pregnancy_map: pregnancy.iter().map(|m| m.to_string()).collect(),
            condition_map: entries(condition),
        }
    }

    fn evaluate(patient: &PatientRecord, medication: &str, risk: &RiskMap) -> Vec<String> {
        SafetyRuleEngine::new().evaluate(patient, medication, risk)
    }

    // ── 1. allergy rule ───────────────────────────────────────────────────────

    #[test]
    fn test_allergy_reason_uses_map_key() {
        let p = patient(&["penicillin"], &[], 40, false);
        let risk = map(&[("Penicillin", &["amoxicillin"])], &[], &[]);

        let reasons = evaluate(&p, "Amoxicillin", &risk);
        assert_eq!(reasons, vec!["Patient is allergic to Penicillin".to_string()]);
    }

    #[test]
    fn test_allergy_ignored_when_patient_not_allergic() {
        let p = patient(&["latex"], &[], 40, false);
        let risk = map(&[("penicillin", &["amoxicillin"])], &[], &[]);

        assert!(evaluate(&p, "amoxicillin", &risk).is_empty());
    }

    #[test]
    fn test_every_matching_allergy_contributes() {
        let p = patient(&["penicillin", "sulfa"], &[], 40, false);
        let risk = map(
            &[("penicillin", &["combo"]), ("sulfa", &["COMBO"])],
            &[],
            &[],
        );

        let reasons = evaluate(&p, "Combo", &risk);
        assert_eq!(
            reasons,
            vec![
                "Patient is allergic to penicillin".to_string(),
                "Patient is allergic to sulfa".to_string(),
            ]
        );
    }

    // ── 2. pregnancy rule ─────────────────────────────────────────────────────

    #[test]
    fn test_pregnancy_rule() {
        let risk = map(&[], &["Isotretinoin"], &[]);

        let pregnant = patient(&[], &[], 28, true);
        assert_eq!(
            evaluate(&pregnant, "isotretinoin", &risk),
            vec!["Unsafe during pregnancy".to_string()]
        );

        let not_pregnant = patient(&[], &[], 28, false);
        assert!(evaluate(&not_pregnant, "isotretinoin", &risk).is_empty());
    }

    // ── 3. condition rule ─────────────────────────────────────────────────────

    #[test]
    fn test_condition_reason_is_lower_cased() {
        let p = patient(&[], &["Hypertension"], 60, false);
        let risk = map(&[], &[], &[("hypertension", &["pseudoephedrine"])]);

        assert_eq!(
            evaluate(&p, "Pseudoephedrine", &risk),
            vec!["May worsen hypertension".to_string()]
        );
    }

    #[test]
    fn test_condition_keys_match_case_insensitively() {
        let p = patient(&[], &["hypertension"], 60, false);
        let risk = map(&[], &[], &[("Hypertension", &["pseudoephedrine"])]);

        assert_eq!(
            evaluate(&p, "pseudoephedrine", &risk),
            vec!["May worsen hypertension".to_string()]
        );
    }

    #[test]
    fn test_duplicate_conditions_yield_one_reason() {
        let p = patient(&[], &["Asthma", "asthma"], 40, false);
        let risk = map(&[], &[], &[("asthma", &["propranolol"])]);

        assert_eq!(
            evaluate(&p, "propranolol", &risk),
            vec!["May worsen asthma".to_string()]
        );
    }

    // ── 4. guard rules ────────────────────────────────────────────────────────

    #[test]
    fn test_pediatric_nsaid_fires_without_map() {
        let p = patient(&[], &["Asthma"], 10, false);

        let reasons = evaluate(&p, "IBUPROFEN", &RiskMap::default());
        assert_eq!(reasons, vec!["NSAID risk in pediatric asthma".to_string()]);
    }

    #[test]
    fn test_pediatric_nsaid_age_bound_is_exclusive() {
        let risk = RiskMap::default();

        assert!(!evaluate(&patient(&[], &["asthma"], 17, false), "naproxen", &risk).is_empty());
        assert!(evaluate(&patient(&[], &["asthma"], 18, false), "naproxen", &risk).is_empty());
        assert!(evaluate(&patient(&[], &["asthma"], 45, false), "aspirin", &risk).is_empty());
    }

    #[test]
    fn test_pediatric_nsaid_skips_other_medications() {
        let p = patient(&[], &["asthma"], 10, false);
        assert!(evaluate(&p, "montelukast", &RiskMap::default()).is_empty());
    }

    // ── 5. ordering and accumulation ──────────────────────────────────────────

    #[test]
    fn test_all_reasons_in_rule_order() {
        let p = patient(&["nsaids"], &["asthma"], 12, true);
        let risk = map(
            &[("nsaids", &["ibuprofen"])],
            &["ibuprofen"],
            &[("asthma", &["ibuprofen"])],
        );

        let reasons = evaluate(&p, "Ibuprofen", &risk);
        assert_eq!(
            reasons,
            vec![
                "Patient is allergic to nsaids".to_string(),
                "Unsafe during pregnancy".to_string(),
                "May worsen asthma".to_string(),
                "NSAID risk in pediatric asthma".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_map_approves_unguarded_candidate() {
        let p = patient(&["penicillin"], &["diabetes"], 50, true);
        assert!(evaluate(&p, "metformin", &RiskMap::default()).is_empty());
    }

    // ── 6. configured guard rules ─────────────────────────────────────────────

    const INFLUENZA_RULES: &str = r#"
[[rules]]
id = "pediatric-influenza-aspirin"
description = "Aspirin in children with influenza"
condition = "influenza"
medications = ["aspirin"]
max_age = 19
reason = "Reye's syndrome risk in children with influenza"
"#;

    #[test]
    fn test_configured_rules_follow_builtin() {
        let engine = SafetyRuleEngine::from_toml_str(INFLUENZA_RULES).expect("valid rules");
        let ids: Vec<&str> = engine.guard_rules().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["pediatric-asthma-nsaid", "pediatric-influenza-aspirin"]);

        let p = patient(&[], &["asthma", "Influenza"], 8, false);
        let reasons = engine.evaluate(&p, "Aspirin", &RiskMap::default());
        assert_eq!(
            reasons,
            vec![
                "NSAID risk in pediatric asthma".to_string(),
                "Reye's syndrome risk in children with influenza".to_string(),
            ]
        );
    }

    #[test]
    fn test_rule_without_age_bound_applies_to_adults() {
        let rule = GuardRule {
            id: "warfarin-ulcer".to_string(),
            description: "Anticoagulant with active ulcer".to_string(),
            condition: "peptic ulcer".to_string(),
            medications: vec!["warfarin".to_string()],
            max_age: None,
            reason: "Bleeding risk with peptic ulcer".to_string(),
        };
        let engine = SafetyRuleEngine::with_rules(vec![rule]).expect("valid rule");

        let p = patient(&[], &["Peptic Ulcer"], 70, false);
        assert_eq!(
            engine.evaluate(&p, "warfarin", &RiskMap::default()),
            vec!["Bleeding risk with peptic ulcer".to_string()]
        );
    }

    #[test]
    fn test_builtin_rule_cannot_be_shadowed() {
        let toml = r#"
[[rules]]
id = "pediatric-asthma-nsaid"
description = "override"
condition = "asthma"
medications = ["ibuprofen"]
reason = "overridden"
"#;
        match SafetyRuleEngine::from_toml_str(toml) {
            Err(MedguardError::ConfigError { reason }) => {
                assert!(reason.contains("duplicate"), "unexpected reason: {}", reason);
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_incomplete_rule_rejected() {
        let toml = r#"
[[rules]]
id = "empty-meds"
description = "no medications"
condition = "asthma"
medications = []
reason = "unused"
"#;
        match SafetyRuleEngine::from_toml_str(toml) {
            Err(MedguardError::ConfigError { reason }) => {
                assert!(reason.contains("empty-meds"), "unexpected reason: {}", reason);
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_toml_parse_error() {
        match SafetyRuleEngine::from_toml_str("[[rules]\nid = ") {
            Err(MedguardError::ConfigError { .. }) => {}
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_toml_keeps_builtin_only() {
        let engine = SafetyRuleEngine::from_toml_str("").expect("empty file is valid");
        assert_eq!(engine.guard_rules().len(), 1);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let path = std::path::Path::new("/nonexistent/medguard/guard_rules.toml");
        match SafetyRuleEngine::from_file(path) {
            Err(MedguardError::ConfigError { reason }) => {
                assert!(reason.contains("failed to read"));
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }
}
