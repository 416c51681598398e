//! Scenario 1: Pediatric asthma
//!
//! A 9-year-old with asthma and influenza is offered two NSAIDs, a
//! leukotriene antagonist, and acetaminophen. The scripted oracle misses the
//! NSAID risk entirely and names propranolol, which nobody suggested.
//!
//! Walk-through:
//!   1. Risk map and doses are generated; propranolol is dropped
//!   2. The built-in guard rule rejects ibuprofen and aspirin anyway
//!   3. The configured influenza rule adds a second reason for aspirin
//!   4. Montelukast and acetaminophen are approved with their doses

use std::sync::Arc;

use medguard_audit::InMemoryAuditWriter;
use medguard_contracts::{error::MedguardResult, request::Precomputed};
use medguard_oracle::ScriptedOracle;
use medguard_policy::SafetyRuleEngine;

use crate::mock_data::{pediatric_asthma_patient, pediatric_doses, pediatric_risk_map};
use crate::scenarios::{
    print_patient, print_report, scripted_filter, verify_journal, ScenarioRun, DOSE_MARKER,
    RISK_MAP_MARKER,
};

/// Extra guard rules shipped with the reference scenarios.
pub const GUARD_RULES: &str = include_str!("../../policies/guard_rules.toml");

pub fn execute() -> MedguardResult<ScenarioRun> {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .reply(RISK_MAP_MARKER, pediatric_risk_map())
            .reply(DOSE_MARKER, pediatric_doses()),
    );
    let engine = SafetyRuleEngine::from_toml_str(GUARD_RULES)?;
    let journal = InMemoryAuditWriter::new("pediatric-asthma");
    let filter = scripted_filter(Arc::clone(&oracle), Box::new(engine), &journal);

    let patient = pediatric_asthma_patient();
    let report = filter.run(&patient, Precomputed::none())?;

    Ok(ScenarioRun {
        patient,
        report,
        journal,
        oracle_calls: oracle.calls(),
    })
}

pub fn run_scenario() -> MedguardResult<()> {
    println!("=== Scenario 1: Pediatric Asthma (guard rules) ===");
    println!();

    let run = execute()?;
    print_patient(&run.patient);
    print_report(&run.report);
    verify_journal(&run.journal)?;

    println!();
    println!("  Scenario 1 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use medguard_contracts::decision::ArtifactSource;

    use super::*;

    #[test]
    fn test_nsaids_rejected_despite_oracle_miss() {
        let run = execute().unwrap();
        let result = &run.report.result;

        let rejected: Vec<&str> = result.unapproved.iter().map(|u| u.med.as_str()).collect();
        assert_eq!(rejected, vec!["Ibuprofen", "Aspirin"]);
        assert_eq!(
            result.unapproved[0].reasons,
            vec!["NSAID risk in pediatric asthma".to_string()]
        );
        assert_eq!(
            result.unapproved[1].reasons,
            vec![
                "NSAID risk in pediatric asthma".to_string(),
                "Reye's syndrome risk in children with influenza".to_string(),
            ]
        );
    }

    #[test]
    fn test_safe_candidates_carry_doses() {
        let run = execute().unwrap();
        let approved = &run.report.result.approved;

        assert_eq!(approved.len(), 2);
        assert_eq!(approved[0].med, "Montelukast");
        assert_eq!(approved[0].dosage, "5 mg");
        assert_eq!(approved[1].med, "Acetaminophen");
        assert_eq!(approved[1].frequency, "every 4-6 hours as needed");
    }

    #[test]
    fn test_one_call_per_artifact_and_journal_verifies() {
        let run = execute().unwrap();

        assert_eq!(run.oracle_calls, 2);
        assert_eq!(run.report.risk_map_source, ArtifactSource::Generated);
        assert!(!run.report.degraded());
        assert!(run.journal.verify_integrity());
        assert_eq!(run.journal.export_log().unwrap().len(), 1);
    }
}
