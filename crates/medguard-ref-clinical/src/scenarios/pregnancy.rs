//! Scenario 2: Pregnancy
//!
//! A pregnant patient with chronic hypertension is offered three
//! antihypertensives. The oracle flags the ACE inhibitor for pregnancy. Its
//! dose answer gives nifedipine a bare number and no frequency.

use std::sync::Arc;

use medguard_audit::InMemoryAuditWriter;
use medguard_contracts::{error::MedguardResult, request::Precomputed};
use medguard_oracle::ScriptedOracle;
use medguard_policy::SafetyRuleEngine;

use crate::mock_data::{pregnancy_doses, pregnancy_risk_map, pregnant_hypertensive_patient};
use crate::scenarios::{
    print_patient, print_report, scripted_filter, verify_journal, ScenarioRun, DOSE_MARKER,
    RISK_MAP_MARKER,
};

pub fn execute() -> MedguardResult<ScenarioRun> {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .reply(RISK_MAP_MARKER, pregnancy_risk_map())
            .reply(DOSE_MARKER, pregnancy_doses()),
    );
    let journal = InMemoryAuditWriter::new("pregnancy");
    let filter = scripted_filter(
        Arc::clone(&oracle),
        Box::new(SafetyRuleEngine::new()),
        &journal,
    );

    let patient = pregnant_hypertensive_patient();
    let report = filter.run(&patient, Precomputed::none())?;

    Ok(ScenarioRun {
        patient,
        report,
        journal,
        oracle_calls: oracle.calls(),
    })
}

pub fn run_scenario() -> MedguardResult<()> {
    println!("=== Scenario 2: Pregnancy ===");
    println!();

    let run = execute()?;
    print_patient(&run.patient);
    print_report(&run.report);
    verify_journal(&run.journal)?;

    println!();
    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ace_inhibitor_unsafe_during_pregnancy() {
        let run = execute().unwrap();
        let result = &run.report.result;

        assert_eq!(result.unapproved.len(), 1);
        assert_eq!(result.unapproved[0].med, "Lisinopril");
        assert_eq!(result.unapproved[0].reasons, vec!["Unsafe during pregnancy".to_string()]);
    }

    #[test]
    fn test_numeric_dose_rendered_and_missing_frequency_defaults() {
        let run = execute().unwrap();
        let nifedipine = run
            .report
            .result
            .approved
            .iter()
            .find(|a| a.med == "Nifedipine")
            .expect("nifedipine should be approved");

        assert_eq!(nifedipine.dosage, "30");
        assert_eq!(nifedipine.frequency, "N/A");
    }
}
