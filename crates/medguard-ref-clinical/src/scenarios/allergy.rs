//! Scenario 3: Multiple allergies
//!
//! A patient allergic to penicillin and sulfa needs an antibiotic. The
//! oracle maps each allergy to the matching candidate; the allergy keys and
//! candidate names differ in case from the patient record.

use std::sync::Arc;

use medguard_audit::InMemoryAuditWriter;
use medguard_contracts::{error::MedguardResult, request::Precomputed};
use medguard_oracle::ScriptedOracle;
use medguard_policy::SafetyRuleEngine;

use crate::mock_data::{allergy_doses, allergy_risk_map, multi_allergy_patient};
use crate::scenarios::{
    print_patient, print_report, scripted_filter, verify_journal, ScenarioRun, DOSE_MARKER,
    RISK_MAP_MARKER,
};

pub fn execute() -> MedguardResult<ScenarioRun> {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .reply(RISK_MAP_MARKER, allergy_risk_map())
            .reply(DOSE_MARKER, allergy_doses()),
    );
    let journal = InMemoryAuditWriter::new("allergy");
    let filter = scripted_filter(
        Arc::clone(&oracle),
        Box::new(SafetyRuleEngine::new()),
        &journal,
    );

    let patient = multi_allergy_patient();
    let report = filter.run(&patient, Precomputed::none())?;

    Ok(ScenarioRun {
        patient,
        report,
        journal,
        oracle_calls: oracle.calls(),
    })
}

pub fn run_scenario() -> MedguardResult<()> {
    println!("=== Scenario 3: Multiple Allergies ===");
    println!();

    let run = execute()?;
    print_patient(&run.patient);
    print_report(&run.report);
    verify_journal(&run.journal)?;

    println!();
    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}
