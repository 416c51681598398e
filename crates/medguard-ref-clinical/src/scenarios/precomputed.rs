//! Scenario 5: Precomputed artifacts
//!
//! An upstream stage already produced the risk map and dose table and sends
//! them along with the patient. The oracle is wired to fail every request,
//! so the scenario only succeeds if it is never consulted. Warfarin has no
//! dose entry and is rejected by a configured guard rule for peptic ulcer.

use std::sync::Arc;

use medguard_audit::InMemoryAuditWriter;
use medguard_contracts::{error::MedguardResult, request::FilterRequest};
use medguard_core::{FilterSettings, OracleFailurePolicy};
use medguard_oracle::{ScriptedOracle, ScriptedReply};
use medguard_policy::SafetyRuleEngine;

use crate::mock_data::precomputed_request_json;
use crate::scenarios::{
    pediatric_asthma::GUARD_RULES, print_patient, print_report, scripted_filter, verify_journal,
    ScenarioRun,
};

pub fn execute() -> MedguardResult<ScenarioRun> {
    let oracle = Arc::new(ScriptedOracle::new().otherwise(ScriptedReply::Unreachable));
    let engine = SafetyRuleEngine::from_toml_str(GUARD_RULES)?;
    let journal = InMemoryAuditWriter::new("precomputed");

    // Propagate so that any oracle call would fail the run outright.
    let filter = scripted_filter(Arc::clone(&oracle), Box::new(engine), &journal).with_settings(
        FilterSettings {
            on_oracle_failure: OracleFailurePolicy::Propagate,
            ..FilterSettings::default()
        },
    );

    let request = FilterRequest::from_json_str(&precomputed_request_json())?;
    let (patient, precomputed) = request.into_parts();
    let report = filter.run(&patient, precomputed)?;

    Ok(ScenarioRun {
        patient,
        report,
        journal,
        oracle_calls: oracle.calls(),
    })
}

pub fn run_scenario() -> MedguardResult<()> {
    println!("=== Scenario 5: Precomputed Artifacts ===");
    println!();

    let run = execute()?;
    print_patient(&run.patient);
    print_report(&run.report);
    println!("  Oracle requests:  {}", run.oracle_calls);
    verify_journal(&run.journal)?;

    println!();
    println!("  Scenario 5 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use medguard_contracts::decision::ArtifactSource;

    use super::*;

    #[test]
    fn test_oracle_never_consulted() {
        let run = execute().unwrap();

        assert_eq!(run.oracle_calls, 0);
        assert_eq!(run.report.risk_map_source, ArtifactSource::Precomputed);
        assert_eq!(run.report.dose_source, ArtifactSource::Precomputed);
        assert!(!run.report.degraded());
    }

    #[test]
    fn test_precomputed_maps_drive_decisions() {
        let run = execute().unwrap();
        let result = &run.report.result;

        let approved: Vec<&str> = result.approved.iter().map(|a| a.med.as_str()).collect();
        assert_eq!(approved, vec!["Metformin"]);
        assert_eq!(result.approved[0].frequency, "twice daily with meals");

        assert_eq!(result.unapproved.len(), 2);
        assert_eq!(result.unapproved[0].med, "Warfarin");
        assert_eq!(
            result.unapproved[0].reasons,
            vec!["Bleeding risk with active peptic ulcer".to_string()]
        );
        assert_eq!(result.unapproved[1].med, "Prednisone");
        assert_eq!(result.unapproved[1].reasons, vec!["May worsen type 2 diabetes".to_string()]);
    }
}
